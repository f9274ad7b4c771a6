use thiserror::Error;

use crate::bits;
use crate::checksum::{self, ChecksumError};
use crate::protocol;
use crate::rom::RomImage;

#[derive(Error, Debug)]
pub enum PacketError {
    #[error(
        "address out of range: {offset} (flash holds {max} bytes)",
        max = protocol::FLASH_SIZE
    )]
    AddressOutOfRange { offset: usize },

    #[error(
        "chunk offset must be a multiple of {chunk}, was {offset}",
        chunk = protocol::CHUNK_SIZE
    )]
    MisalignedOffset { offset: usize },

    #[error(
        "chunk at offset {offset} runs past the end of the ROM ({len} bytes)"
    )]
    ChunkOutOfBounds { offset: usize, len: usize },

    #[error("checksum: {0}")]
    Checksum(#[from] ChecksumError),
}

/// Splits a flash byte offset into its three wire bytes, most significant
/// first. Only the low 21 bits are ever non-zero for a 1 MiB card, but the
/// full 24-bit range is carried.
pub fn encode_address(offset: usize) -> Result<[u8; 3], PacketError> {
    if offset > protocol::FLASH_SIZE {
        return Err(PacketError::AddressOutOfRange { offset });
    }
    Ok([
        ((offset >> 16) & 0xFF) as u8,
        ((offset >> 8) & 0xFF) as u8,
        (offset & 0xFF) as u8,
    ])
}

/// One 261-byte write packet: command byte, 3 address bytes, 256 payload
/// bytes, trailing checksum over address + payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    buf: [u8; protocol::PACKET_SIZE],
}

impl Packet {
    /// Builds the packet for the 256-byte chunk at `offset`. With
    /// `reverse_bits` set every payload byte is bit-order reversed for use in
    /// a Japanese PC Engine.
    pub fn build(rom: &RomImage, offset: usize, reverse_bits: bool) -> Result<Self, PacketError> {
        if !offset.is_multiple_of(protocol::CHUNK_SIZE) {
            return Err(PacketError::MisalignedOffset { offset });
        }
        let bytes = rom.bytes();
        let end = offset
            .checked_add(protocol::CHUNK_SIZE)
            .filter(|&end| end <= bytes.len())
            .ok_or(PacketError::ChunkOutOfBounds {
                offset,
                len: bytes.len(),
            })?;

        let mut buf = [0u8; protocol::PACKET_SIZE];
        buf[0] = protocol::CMD_WRITE;
        buf[1..4].copy_from_slice(&encode_address(offset)?);

        let payload = &mut buf[4..4 + protocol::CHUNK_SIZE];
        for (dst, src) in payload.iter_mut().zip(&bytes[offset..end]) {
            *dst = if reverse_bits {
                bits::reverse(*src)
            } else {
                *src
            };
        }

        // Checksum spans the address and payload bytes, not the command byte.
        buf[protocol::PACKET_SIZE - 1] =
            checksum::checksum(&buf, 1, protocol::ADDRESS_SIZE + protocol::CHUNK_SIZE)?;

        Ok(Self { buf })
    }

    pub fn bytes(&self) -> &[u8] {
        &self.buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::protocol::{CHUNK_SIZE, FLASH_SIZE, PACKET_SIZE};

    #[test]
    fn test_encode_address_matches_increment_reference() {
        // Walk a byte-at-a-time carry counter across the whole flash range
        // and check the shift-based codec against it at every offset.
        let (mut msb, mut mid, mut lsb) = (0u8, 0u8, 0u8);
        for offset in 0..=FLASH_SIZE {
            assert_eq!(encode_address(offset).unwrap(), [msb, mid, lsb]);

            lsb = lsb.wrapping_add(1);
            if lsb == 0 {
                mid = mid.wrapping_add(1);
                if mid == 0 {
                    msb = msb.wrapping_add(1);
                }
            }
        }
    }

    #[test]
    fn test_encode_address_boundary() {
        assert_eq!(encode_address(0).unwrap(), [0x00, 0x00, 0x00]);
        assert_eq!(encode_address(FLASH_SIZE).unwrap(), [0x10, 0x00, 0x00]);
        assert!(matches!(
            encode_address(FLASH_SIZE + 1),
            Err(PacketError::AddressOutOfRange { .. })
        ));
    }

    fn rom_of(bytes: Vec<u8>) -> RomImage {
        RomImage::from_bytes(bytes).unwrap()
    }

    #[test]
    fn test_zero_rom_single_packet() {
        let rom = rom_of(vec![0x00; 256]);
        let packet = Packet::build(&rom, 0, false).unwrap();

        let mut expected = [0x00u8; PACKET_SIZE];
        expected[0] = 0x5A;
        assert_eq!(packet.bytes(), &expected);
    }

    #[test]
    fn test_packet_layout() {
        let data: Vec<u8> = (0..512).map(|i| (i % 251) as u8).collect();
        let rom = rom_of(data.clone());

        let packet = Packet::build(&rom, 256, false).unwrap();
        let buf = packet.bytes();

        assert_eq!(buf.len(), 261);
        assert_eq!(buf[0], 0x5A);
        assert_eq!(&buf[1..4], &[0x00, 0x01, 0x00]);
        assert_eq!(&buf[4..260], &data[256..512]);

        let sum = crate::checksum::checksum(buf, 1, 259).unwrap();
        assert_eq!(buf[260], sum);
    }

    #[test]
    fn test_build_is_deterministic() {
        let rom = rom_of((0..=255).collect());
        let a = Packet::build(&rom, 0, true).unwrap();
        let b = Packet::build(&rom, 0, true).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_reversed_payload() {
        let rom = rom_of(vec![0x0F; 256]);
        let packet = Packet::build(&rom, 0, true).unwrap();
        let buf = packet.bytes();

        assert!(buf[4..260].iter().all(|b| *b == 0xF0));
        // 256 * 0xF0 wraps to zero, and the address bytes are zero too.
        assert_eq!(buf[260], 0x00);
    }

    #[test]
    fn test_rejects_misaligned_offset() {
        let rom = rom_of(vec![0u8; 512]);
        assert!(matches!(
            Packet::build(&rom, 100, false),
            Err(PacketError::MisalignedOffset { offset: 100 })
        ));
    }

    #[test]
    fn test_rejects_chunk_past_end() {
        let rom = rom_of(vec![0u8; 256]);
        assert!(matches!(
            Packet::build(&rom, 256, false),
            Err(PacketError::ChunkOutOfBounds { offset: 256, .. })
        ));
    }

    #[test]
    fn test_last_chunk_of_full_card() {
        let rom = rom_of(vec![0xFF; FLASH_SIZE]);
        let packet = Packet::build(&rom, FLASH_SIZE - CHUNK_SIZE, false).unwrap();
        assert_eq!(&packet.bytes()[1..4], &[0x0F, 0xFF, 0x00]);
    }
}
