//! Flash HuCard serial flasher for the PC Engine / TurboGrafx-16.
//!
//! Splits a validated ROM image into 256-byte chunks, frames each chunk as a
//! 261-byte write packet (command byte, 3-byte big-endian address, payload,
//! additive checksum), and drives the packets one at a time over a serial
//! link with a per-packet acknowledge/retry cycle. Payload bytes can be
//! bit-order reversed so a card keyed for the TurboGrafx-16 works in a
//! Japanese PC Engine.

pub mod bits;
pub mod checksum;
pub mod event;
pub mod flasher;
pub mod packet;
pub mod ports;
pub mod protocol;
pub mod rom;
pub mod transport;

pub use event::FlashEvent;
pub use flasher::{flash_file, flash_rom, CancelToken, FlashError, FlashErrorKind, FlashOptions};
pub use rom::{RomError, RomImage};
