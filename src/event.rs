/// Progress notifications emitted by the transfer. The flasher core never
/// writes to a stream itself; callers render these however they like.
#[derive(Debug, Clone)]
pub enum FlashEvent {
    RomLoaded {
        bytes: usize,
        packets: usize,
    },
    PortOpened {
        port: String,
    },
    /// A packet has been written and acknowledged by the device.
    Packet {
        index: usize,
        total: usize,
        addr: usize,
    },
    Retry {
        addr: usize,
        attempt: u32,
        retries: u32,
        reason: String,
    },
    Done,
    PortClosed {
        port: String,
    },
}
