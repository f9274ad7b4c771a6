use std::io;
use std::path::Path;

use thiserror::Error;

use crate::protocol;

/// A validated ROM image, ready to be split into 256-byte chunks.
///
/// The bytes are kept exactly as read; region bit-reversal is applied per
/// packet, not here.
#[derive(Debug)]
pub struct RomImage {
    data: Vec<u8>,
}

#[derive(Error, Debug)]
pub enum RomError {
    #[error("io: {0}")]
    Io(#[from] io::Error),

    #[error("ROM is empty")]
    Empty,

    #[error(
        "ROM is too large: {size} bytes, the Flash HuCard holds at most {max} bytes",
        max = protocol::FLASH_SIZE
    )]
    TooLarge { size: usize },

    #[error(
        "ROM seems to contain a header: file size must be a multiple of {chunk}, but {size} % {chunk} = {remainder}",
        chunk = protocol::CHUNK_SIZE
    )]
    Misaligned { size: usize, remainder: usize },
}

impl RomImage {
    pub fn load(path: &Path) -> Result<Self, RomError> {
        Self::from_bytes(std::fs::read(path)?)
    }

    pub fn from_bytes(data: Vec<u8>) -> Result<Self, RomError> {
        if data.is_empty() {
            return Err(RomError::Empty);
        }
        if data.len() > protocol::FLASH_SIZE {
            return Err(RomError::TooLarge { size: data.len() });
        }
        if !data.len().is_multiple_of(protocol::CHUNK_SIZE) {
            return Err(RomError::Misaligned {
                size: data.len(),
                remainder: data.len() % protocol::CHUNK_SIZE,
            });
        }
        Ok(Self { data })
    }

    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn byte_count(&self) -> usize {
        self.data.len()
    }

    pub fn packet_count(&self) -> usize {
        self.data.len() / protocol::CHUNK_SIZE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Write;

    use tempfile::NamedTempFile;

    #[test]
    fn test_accepts_aligned_rom() {
        let rom = RomImage::from_bytes(vec![0xAB; 512]).unwrap();
        assert_eq!(rom.byte_count(), 512);
        assert_eq!(rom.packet_count(), 2);
        assert_eq!(rom.bytes()[0], 0xAB);
    }

    #[test]
    fn test_accepts_full_capacity() {
        let rom = RomImage::from_bytes(vec![0u8; protocol::FLASH_SIZE]).unwrap();
        assert_eq!(rom.packet_count(), 4096);
    }

    #[test]
    fn test_rejects_empty() {
        assert!(matches!(
            RomImage::from_bytes(Vec::new()),
            Err(RomError::Empty)
        ));
    }

    #[test]
    fn test_rejects_oversized() {
        let err = RomImage::from_bytes(vec![0u8; 2_097_152]).unwrap_err();
        assert!(matches!(err, RomError::TooLarge { size: 2_097_152 }));
    }

    #[test]
    fn test_rejects_misaligned() {
        let err = RomImage::from_bytes(vec![0u8; 300]).unwrap_err();
        match err {
            RomError::Misaligned { size, remainder } => {
                assert_eq!(size, 300);
                assert_eq!(remainder, 44);
            }
            _ => panic!("expected Misaligned, got {err:?}"),
        }
    }

    #[test]
    fn test_load_from_file() {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(&[0x42; 256]).unwrap();

        let rom = RomImage::load(f.path()).unwrap();
        assert_eq!(rom.byte_count(), 256);
        assert_eq!(rom.packet_count(), 1);
    }

    #[test]
    fn test_load_missing_file() {
        let err = RomImage::load(Path::new("/nonexistent/game.pce")).unwrap_err();
        assert!(matches!(err, RomError::Io(_)));
    }
}
