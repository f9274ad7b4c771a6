use huflash::flasher::{self, FlashError, FlashErrorKind, FlashOptions};
use huflash::rom::RomImage;

use crate::cli;
use crate::exit_codes;
use crate::output::{DryRunSummary, Event, FlashPlan, Reporter};

pub fn run(args: cli::FlashArgs, out: &mut dyn Reporter) -> i32 {
    let opts = FlashOptions {
        reverse_bits: args.japan,
        retries: args.retries,
        ..Default::default()
    };

    if args.dry_run {
        return dry_run(&args, out);
    }

    out.emit(Event::Starting(FlashPlan {
        rom: args.rom.display().to_string(),
        port: args.port.clone(),
        region: region(args.japan),
    }));

    let r = flasher::flash_file(&args.rom, &args.port, &opts, |ev| out.emit(Event::Flash(ev)));

    match r {
        Ok(()) => exit_codes::EXIT_OK,
        Err(e) => {
            let code = map_flash_error(&e);
            out.emit(Event::Error {
                code,
                message: e.to_string(),
            });
            code
        }
    }
}

fn dry_run(args: &cli::FlashArgs, out: &mut dyn Reporter) -> i32 {
    match RomImage::load(&args.rom) {
        Ok(rom) => {
            out.emit(Event::DryRun(DryRunSummary {
                rom: args.rom.display().to_string(),
                bytes: rom.byte_count(),
                packets: rom.packet_count(),
                reverse_bits: args.japan,
            }));
            exit_codes::EXIT_OK
        }
        Err(e) => {
            out.emit(Event::Error {
                code: exit_codes::EXIT_INVALID_ROM,
                message: e.to_string(),
            });
            exit_codes::EXIT_INVALID_ROM
        }
    }
}

fn region(japan: bool) -> &'static str {
    if japan {
        "Japanese PC Engine"
    } else {
        "NA TurboGrafx-16"
    }
}

fn map_flash_error(e: &FlashError) -> i32 {
    match e.kind() {
        FlashErrorKind::Validation => exit_codes::EXIT_INVALID_ROM,
        FlashErrorKind::Argument => exit_codes::EXIT_UNEXPECTED,
        FlashErrorKind::Transport => exit_codes::EXIT_PORT_FAILED,
        FlashErrorKind::Protocol => exit_codes::EXIT_PROTOCOL_FAILED,
        FlashErrorKind::Cancelled => exit_codes::EXIT_CANCELLED,
    }
}
