use std::fmt;
use std::io;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use thiserror::Error;

use crate::event::FlashEvent;
use crate::packet::{Packet, PacketError};
use crate::protocol;
use crate::rom::{RomError, RomImage};
use crate::transport::{SerialTransport, Transport, TransportError};

#[derive(Debug, Clone)]
pub struct FlashOptions {
    /// Bit-reverse every payload byte for use in a Japanese PC Engine.
    pub reverse_bits: bool,

    /// Attempts per packet before the transfer is abandoned.
    pub retries: u32,

    pub cancel: CancelToken,
}

impl Default for FlashOptions {
    fn default() -> Self {
        Self {
            reverse_bits: false,
            retries: 3,
            cancel: CancelToken::new(),
        }
    }
}

/// Cooperative abort signal. Clone it, hand one copy to the flasher, and
/// trip it from anywhere; the transfer stops at the next packet boundary.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FlashErrorKind {
    Validation,
    Argument,
    Transport,
    Protocol,
    Cancelled,
}

#[derive(Error, Debug)]
pub enum FlashError {
    #[error("invalid ROM: {source}")]
    InvalidRom {
        #[source]
        source: RomError,
    },

    #[error(transparent)]
    OpenPort(#[from] TransportError),

    #[error("packet build failed at addr=0x{addr:06X}: {source}")]
    BuildPacket {
        addr: usize,
        #[source]
        source: PacketError,
    },

    #[error("serial I/O failed at addr=0x{addr:06X}: {source}")]
    Io {
        addr: usize,
        #[source]
        source: io::Error,
    },

    #[error("no valid acknowledgment at addr=0x{addr:06X} after {attempts} attempts: {last}")]
    AckExhausted {
        addr: usize,
        attempts: u32,
        last: AckFailure,
    },

    #[error("flash cancelled")]
    Cancelled,
}

impl FlashError {
    pub fn kind(&self) -> FlashErrorKind {
        match self {
            FlashError::InvalidRom { .. } => FlashErrorKind::Validation,
            FlashError::OpenPort(_) | FlashError::Io { .. } => FlashErrorKind::Transport,
            FlashError::BuildPacket { .. } => FlashErrorKind::Argument,
            FlashError::AckExhausted { .. } => FlashErrorKind::Protocol,
            FlashError::Cancelled => FlashErrorKind::Cancelled,
        }
    }
}

/// Why a packet was not acknowledged.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum AckFailure {
    Nak,
    Unexpected(u8),
    TimedOut,
}

impl fmt::Display for AckFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AckFailure::Nak => write!(f, "device sent nak"),
            AckFailure::Unexpected(b) => write!(f, "unexpected response byte 0x{b:02X}"),
            AckFailure::TimedOut => write!(f, "timed out waiting for acknowledgment"),
        }
    }
}

/// Loads and validates the ROM at `rom_path`, then flashes it through the
/// serial port `port_name`. Validation happens before the port is touched,
/// so a bad image has no side effects.
pub fn flash_file<F>(
    rom_path: &Path,
    port_name: &str,
    opts: &FlashOptions,
    mut on_event: F,
) -> Result<(), FlashError>
where
    F: FnMut(FlashEvent),
{
    let rom = RomImage::load(rom_path).map_err(|e| FlashError::InvalidRom { source: e })?;
    on_event(FlashEvent::RomLoaded {
        bytes: rom.byte_count(),
        packets: rom.packet_count(),
    });

    let transport = SerialTransport::open(port_name)?;

    flash_rom(&rom, transport, opts, on_event)
}

/// Drives the whole transfer over an already-open transport. The transport
/// is owned for the duration of the session and closed exactly once,
/// whatever the outcome.
pub fn flash_rom<T, F>(
    rom: &RomImage,
    mut transport: T,
    opts: &FlashOptions,
    mut on_event: F,
) -> Result<(), FlashError>
where
    T: Transport,
    F: FnMut(FlashEvent),
{
    on_event(FlashEvent::PortOpened {
        port: transport.port_name().to_string(),
    });

    let result = run_transfer(rom, &mut transport, opts, &mut on_event);

    let port = transport.port_name().to_string();
    transport.close();
    on_event(FlashEvent::PortClosed { port });

    result
}

fn run_transfer<T, F>(
    rom: &RomImage,
    transport: &mut T,
    opts: &FlashOptions,
    on_event: &mut F,
) -> Result<(), FlashError>
where
    T: Transport,
    F: FnMut(FlashEvent),
{
    let total = rom.packet_count();

    for index in 0..total {
        let addr = index * protocol::CHUNK_SIZE;

        if opts.cancel.is_cancelled() {
            return Err(FlashError::Cancelled);
        }

        let packet = Packet::build(rom, addr, opts.reverse_bits)
            .map_err(|e| FlashError::BuildPacket { addr, source: e })?;

        send_acknowledged(transport, &packet, addr, opts, on_event)?;

        on_event(FlashEvent::Packet { index, total, addr });
    }

    on_event(FlashEvent::Done);
    Ok(())
}

/// One send/await-ack cycle, resending on nak, garbage, or read timeout
/// until the attempt budget runs out. Write failures and non-timeout read
/// failures abort immediately; the device state is undefined after that.
fn send_acknowledged<T, F>(
    transport: &mut T,
    packet: &Packet,
    addr: usize,
    opts: &FlashOptions,
    on_event: &mut F,
) -> Result<(), FlashError>
where
    T: Transport,
    F: FnMut(FlashEvent),
{
    let attempts = opts.retries.max(1);
    let mut attempt: u32 = 0;

    loop {
        attempt += 1;

        transport
            .send(packet.bytes())
            .map_err(|e| FlashError::Io { addr, source: e })?;

        let failure = match transport.recv_byte() {
            Ok(protocol::ACK) => return Ok(()),
            Ok(protocol::NAK) => AckFailure::Nak,
            Ok(byte) => AckFailure::Unexpected(byte),
            Err(e) if e.kind() == io::ErrorKind::TimedOut => AckFailure::TimedOut,
            Err(e) => return Err(FlashError::Io { addr, source: e }),
        };

        if attempt >= attempts {
            return Err(FlashError::AckExhausted {
                addr,
                attempts: attempt,
                last: failure,
            });
        }

        tracing::debug!(addr, attempt, %failure, "resending packet");
        on_event(FlashEvent::Retry {
            addr,
            attempt,
            retries: attempts,
            reason: failure.to_string(),
        });
    }
}
