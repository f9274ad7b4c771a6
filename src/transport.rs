use std::io::{self, Read, Write};

use thiserror::Error;

use crate::protocol;

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("unable to open serial port '{port}': {source}")]
    Open {
        port: String,
        #[source]
        source: serialport::Error,
    },
}

/// One exclusively-owned serial link to the flasher for the duration of a
/// session. The orchestrator is the only caller; it closes the link exactly
/// once on every exit path.
pub trait Transport {
    fn port_name(&self) -> &str;

    /// Writes the whole buffer, bounded by the link write timeout.
    fn send(&mut self, bytes: &[u8]) -> io::Result<()>;

    /// Reads one acknowledgment byte, bounded by the link read timeout.
    /// Expiry surfaces as `io::ErrorKind::TimedOut`.
    fn recv_byte(&mut self) -> io::Result<u8>;

    /// Releases the link. Errors during release are not recoverable and are
    /// swallowed, matching the device's fire-and-forget session end.
    fn close(&mut self);
}

pub struct SerialTransport {
    port: Option<Box<dyn serialport::SerialPort>>,
    name: String,
}

impl SerialTransport {
    /// Opens `port_name` with the fixed link parameters the flasher expects:
    /// 256000 baud, 8 data bits, no parity, one stop bit, 30 s timeouts.
    pub fn open(port_name: &str) -> Result<Self, TransportError> {
        let port = serialport::new(port_name, protocol::BAUD_RATE)
            .data_bits(serialport::DataBits::Eight)
            .parity(serialport::Parity::None)
            .stop_bits(serialport::StopBits::One)
            .flow_control(serialport::FlowControl::None)
            .timeout(protocol::IO_TIMEOUT)
            .open()
            .map_err(|e| TransportError::Open {
                port: port_name.to_string(),
                source: e,
            })?;

        tracing::debug!(port = port_name, baud = protocol::BAUD_RATE, "serial port open");

        Ok(Self {
            port: Some(port),
            name: port_name.to_string(),
        })
    }
}

impl Transport for SerialTransport {
    fn port_name(&self) -> &str {
        &self.name
    }

    fn send(&mut self, bytes: &[u8]) -> io::Result<()> {
        let port = self.port.as_mut().ok_or_else(closed)?;
        port.write_all(bytes)?;
        port.flush()
    }

    fn recv_byte(&mut self) -> io::Result<u8> {
        let port = self.port.as_mut().ok_or_else(closed)?;
        let mut byte = [0u8; 1];
        port.read_exact(&mut byte)?;
        Ok(byte[0])
    }

    fn close(&mut self) {
        if let Some(mut port) = self.port.take() {
            let _ = port.flush();
            tracing::debug!(port = self.name.as_str(), "serial port closed");
        }
    }
}

fn closed() -> io::Error {
    io::Error::new(io::ErrorKind::NotConnected, "serial port already closed")
}
