use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum JsonProgressArg {
    /// Emit a JSON event for every acknowledged packet.
    Packets,
    /// Emit fewer JSON events by throttling packet output to percent changes.
    Percent,
    /// Do not emit per-packet progress events.
    None,
}

#[derive(Parser)]
#[command(name = "huflash")]
#[command(about = "Flash HuCard flasher CLI (PC Engine / TurboGrafx-16)")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Flash a ROM image to the card through a serial port.
    Flash(FlashArgs),

    /// List serial ports on this machine.
    List(ListArgs),
}

#[derive(Parser)]
pub struct FlashArgs {
    /// Path to the ROM image (.pce, header stripped).
    pub rom: PathBuf,

    /// Serial port the flasher is connected to (e.g. COM3 or /dev/ttyUSB0).
    #[arg(long, short)]
    pub port: String,

    /// Flash for use in a Japanese PC Engine (bit-reverses every payload byte).
    #[arg(long, short)]
    pub japan: bool,

    /// Attempts per packet before giving up.
    #[arg(long, default_value_t = 3)]
    pub retries: u32,

    /// Validate the ROM and report packet geometry without opening the port.
    #[arg(long)]
    pub dry_run: bool,

    /// Emit JSON line events to stdout.
    #[arg(long)]
    pub json: bool,

    /// JSON progress verbosity.
    ///
    /// - packets: emit every acknowledged packet (most verbose)
    /// - percent: emit fewer progress events
    /// - none: no per-packet progress events
    #[arg(long, value_enum, default_value_t = JsonProgressArg::Percent, requires = "json")]
    pub json_progress: JsonProgressArg,

    /// Reduce output (only errors).
    #[arg(long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// More logs to stderr.
    #[arg(long, short)]
    pub verbose: bool,
}

#[derive(Parser)]
pub struct ListArgs {
    /// Emit JSON line output.
    #[arg(long)]
    pub json: bool,
}
