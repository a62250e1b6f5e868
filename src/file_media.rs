//! FileMedia - byte sources holding compressed Brotli payloads.
//!
//! Containers know where a compressed entry starts, how many bytes it
//! occupies and how large it decompresses to. [`PayloadRange`] carries that
//! and the sources here read and decode it.

use crate::error::{BrotliError, Result};
use std::io::{Read, Seek, SeekFrom};

/// Location and sizes of a compressed payload inside its source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PayloadRange {
    /// Offset of the first compressed byte.
    pub offset: u64,
    /// Compressed length in bytes.
    pub compressed_len: u64,
    /// Declared uncompressed length.
    pub uncompressed_len: usize,
}

impl PayloadRange {
    /// Check that the range lies within a source of `length` bytes.
    pub fn validate(&self, length: u64) -> Result<()> {
        match self.offset.checked_add(self.compressed_len) {
            Some(end) if end <= length => Ok(()),
            _ => Err(BrotliError::InvalidRange {
                offset: self.offset,
                length,
            }),
        }
    }
}

/// Local file implementation.
#[derive(Debug, Clone)]
pub struct LocalFileMedia {
    path: String,
    name: String,
    length: u64,
}

impl LocalFileMedia {
    pub fn new(path: &str) -> std::io::Result<Self> {
        let metadata = std::fs::metadata(path)?;
        let name = std::path::Path::new(path)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
            .to_string();

        Ok(Self {
            path: path.to_string(),
            name,
            length: metadata.len(),
        })
    }

    pub fn length(&self) -> u64 {
        self.length
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Read the compressed bytes of a payload.
    pub fn read_payload_sync(&self, range: PayloadRange) -> Result<Vec<u8>> {
        range.validate(self.length)?;
        let mut file = std::fs::File::open(&self.path)?;
        file.seek(SeekFrom::Start(range.offset))?;
        let mut buffer = vec![0u8; range.compressed_len as usize];
        file.read_exact(&mut buffer)?;
        Ok(buffer)
    }

    /// Read and decompress a payload.
    pub fn decompress_sync(&self, range: PayloadRange) -> Result<Vec<u8>> {
        let compressed = self.read_payload_sync(range)?;
        crate::decompress(&compressed, range.uncompressed_len)
    }
}

// Async FileMedia trait (requires 'async' feature)
#[cfg(feature = "async")]
use std::future::Future;
#[cfg(feature = "async")]
use std::pin::Pin;

/// Abstract source that can provide compressed payloads asynchronously.
///
/// Implement this trait for custom byte sources (e.g., HTTP range requests).
/// The library provides [`LocalFileMedia`] for local files.
#[cfg(feature = "async")]
#[cfg_attr(docsrs, doc(cfg(feature = "async")))]
pub trait FileMedia: Send + Sync {
    fn length(&self) -> u64;
    fn name(&self) -> &str;
    fn read_payload(
        &self,
        range: PayloadRange,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<u8>>> + Send + '_>>;
}

#[cfg(feature = "async")]
impl FileMedia for LocalFileMedia {
    fn length(&self) -> u64 {
        self.length
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn read_payload(
        &self,
        range: PayloadRange,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<u8>>> + Send + '_>> {
        let path = self.path.clone();
        let length = self.length;
        Box::pin(async move {
            use tokio::io::{AsyncReadExt, AsyncSeekExt};
            range.validate(length)?;
            let mut file = tokio::fs::File::open(&path).await?;
            file.seek(SeekFrom::Start(range.offset)).await?;
            let mut buffer = vec![0u8; range.compressed_len as usize];
            file.read_exact(&mut buffer).await?;
            Ok(buffer)
        })
    }
}

/// Read a payload from any [`FileMedia`] and decompress it.
#[cfg(feature = "async")]
#[cfg_attr(docsrs, doc(cfg(feature = "async")))]
pub async fn decompress_media(media: &dyn FileMedia, range: PayloadRange) -> Result<Vec<u8>> {
    let compressed = media.read_payload(range).await?;
    tracing::debug!(
        "Decompressing {} bytes from {} at offset {}",
        compressed.len(),
        media.name(),
        range.offset
    );
    crate::decompress(&compressed, range.uncompressed_len)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const TEXT: &[u8] = b"Payloads are located by offset and length inside a container. \
Payloads are located by offset and length inside a container.";

    /// Write `prefix`, a compressed copy of `TEXT`, then `suffix` to a file.
    fn container_file(tag: &str, prefix: &[u8], suffix: &[u8]) -> (String, PayloadRange) {
        let mut writer = brotli::CompressorWriter::new(Vec::new(), 4096, 9, 22);
        writer.write_all(TEXT).unwrap();
        let compressed = writer.into_inner();

        let path = std::env::temp_dir().join(format!(
            "brotli-stream-{}-{}.bin",
            tag,
            std::process::id()
        ));
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(prefix).unwrap();
        file.write_all(&compressed).unwrap();
        file.write_all(suffix).unwrap();

        let range = PayloadRange {
            offset: prefix.len() as u64,
            compressed_len: compressed.len() as u64,
            uncompressed_len: TEXT.len(),
        };
        (path.to_string_lossy().into_owned(), range)
    }

    #[test]
    fn test_range_validation() {
        let range = PayloadRange {
            offset: 10,
            compressed_len: 20,
            uncompressed_len: 0,
        };
        assert!(range.validate(30).is_ok());
        assert!(matches!(
            range.validate(29),
            Err(BrotliError::InvalidRange {
                offset: 10,
                length: 29
            })
        ));

        let overflow = PayloadRange {
            offset: u64::MAX,
            compressed_len: 2,
            uncompressed_len: 0,
        };
        assert!(overflow.validate(u64::MAX).is_err());
    }

    #[test]
    fn test_decompress_sync() {
        let (path, range) = container_file("sync", b"HEADER", b"TRAILER");
        let media = LocalFileMedia::new(&path).unwrap();

        assert!(media.name().starts_with("brotli-stream-sync"));
        assert_eq!(media.length(), 6 + range.compressed_len + 7);
        assert_eq!(media.decompress_sync(range).unwrap(), TEXT);

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_wrong_declared_length() {
        let (path, mut range) = container_file("length", b"", b"");
        range.uncompressed_len += 1;
        let media = LocalFileMedia::new(&path).unwrap();

        // The declared size leaves room for one byte the stream never produces.
        assert!(matches!(
            media.decompress_sync(range),
            Err(BrotliError::LengthMismatch { .. })
        ));

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_range_past_end() {
        let (path, mut range) = container_file("range", b"xx", b"");
        range.compressed_len += 1;
        let media = LocalFileMedia::new(&path).unwrap();

        assert!(matches!(
            media.read_payload_sync(range),
            Err(BrotliError::InvalidRange { .. })
        ));

        std::fs::remove_file(&path).unwrap();
    }

    #[cfg(feature = "async")]
    #[tokio::test]
    async fn test_decompress_media() {
        let (path, range) = container_file("async", b"\x00\x01\x02", b"");
        let media = LocalFileMedia::new(&path).unwrap();

        let data = decompress_media(&media, range).await.unwrap();
        assert_eq!(data, TEXT);

        std::fs::remove_file(&path).unwrap();
    }
}
