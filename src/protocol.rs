use std::time::Duration;

/// Capacity of the Flash HuCard in bytes (1 MiB).
pub const FLASH_SIZE: usize = 1_048_576;

pub const CHUNK_SIZE: usize = 256;
pub const ADDRESS_SIZE: usize = 3;
pub const PACKET_SIZE: usize = 1 + ADDRESS_SIZE + CHUNK_SIZE + 1; // 261

/// Command byte that opens every write packet.
pub const CMD_WRITE: u8 = 0x5A;

// TODO: confirm the ack/nak byte values against the flasher firmware once
// hardware is available; only packet construction has been observed so far.
pub const ACK: u8 = 0x06;
pub const NAK: u8 = 0x15;

pub const BAUD_RATE: u32 = 256_000;
pub const IO_TIMEOUT: Duration = Duration::from_secs(30);

/// Minimum host buffer sizes the link expects. Modern OS serial drivers
/// exceed both; kept here because the device protocol assumes them.
pub const READ_BUFFER_MIN: usize = 1024;
pub const WRITE_BUFFER_MIN: usize = 512;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_packet_fits_write_buffer() {
        assert_eq!(PACKET_SIZE, 261);
        assert!(PACKET_SIZE <= WRITE_BUFFER_MIN);
        assert!(PACKET_SIZE <= READ_BUFFER_MIN);
    }

    #[test]
    fn test_flash_is_whole_number_of_chunks() {
        assert_eq!(FLASH_SIZE % CHUNK_SIZE, 0);
        assert_eq!(FLASH_SIZE / CHUNK_SIZE, 4096);
    }
}
