use std::io::{IsTerminal, Write};

use huflash::event::FlashEvent;
use huflash::ports;

use crate::output::{format_port_line, DryRunSummary, Event, FlashPlan, OutputOptions, Reporter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Quiet,
    Verbose,
    Progress,
}

pub struct HumanOutput {
    opts: OutputOptions,
    is_tty: bool,
    progress_active: bool,
    last_percent: Option<u64>,
}

impl HumanOutput {
    pub fn new(opts: OutputOptions) -> Self {
        Self {
            opts,
            is_tty: std::io::stderr().is_terminal(),
            progress_active: false,
            last_percent: None,
        }
    }

    fn mode(&self) -> Mode {
        if self.opts.quiet {
            Mode::Quiet
        } else if self.opts.verbose {
            Mode::Verbose
        } else {
            Mode::Progress
        }
    }

    fn finish_line(&mut self) {
        if self.progress_active {
            eprintln!();
            self.progress_active = false;
        }
    }

    fn println(&mut self, msg: &str) {
        if self.mode() == Mode::Quiet {
            return;
        }
        self.finish_line();
        eprintln!("{msg}");
    }

    fn progress_update(&mut self, percent: u64, i: usize, n: usize, addr: usize) {
        if self.mode() != Mode::Progress {
            return;
        }

        if self.is_tty {
            eprint!("\r  writing {percent:3}% ({i}/{n}) @ 0x{addr:06X}");
            let _ = std::io::stderr().flush();
            self.progress_active = true;
            self.last_percent = Some(percent);
            return;
        }

        let last = self.last_percent.unwrap_or(0);
        if percent == 0 || percent == 100 || percent >= last + 10 {
            self.last_percent = Some(percent);
            self.println(&format!("  writing {percent:3}% ({i}/{n})"));
        }
    }

    fn on_flash_event(&mut self, ev: FlashEvent) {
        match ev {
            FlashEvent::RomLoaded { bytes, packets } => {
                if self.mode() != Mode::Quiet {
                    self.println(&format!("ROM loaded: {bytes} bytes ({packets} packets)"));
                }
            }
            FlashEvent::PortOpened { port } => {
                if self.mode() != Mode::Quiet {
                    self.println(&format!("port open: {port}"));
                    self.last_percent = None;
                }
            }
            FlashEvent::Packet { index, total, addr } => {
                if self.mode() == Mode::Verbose {
                    self.println(&format!(
                        "packet {}/{} @ 0x{addr:06X} acknowledged",
                        index + 1,
                        total
                    ));
                } else if self.mode() == Mode::Progress {
                    let percent = ((index + 1) as u64 * 100).saturating_div(total.max(1) as u64);
                    self.progress_update(percent, index + 1, total, addr);
                }
            }
            FlashEvent::Retry {
                addr,
                attempt,
                retries,
                reason,
            } => {
                if self.mode() != Mode::Quiet {
                    self.finish_line();
                    self.println(&format!(
                        "retry at 0x{addr:06X} ({attempt}/{retries}): {reason}"
                    ));
                }
            }
            FlashEvent::Done => {
                if self.mode() != Mode::Quiet {
                    self.finish_line();
                    self.println("flash complete - you can remove the card");
                }
            }
            FlashEvent::PortClosed { port } => {
                if self.mode() == Mode::Verbose {
                    self.println(&format!("port closed: {port}"));
                }
            }
        }
    }
}

impl Reporter for HumanOutput {
    fn emit(&mut self, event: Event) {
        match event {
            Event::Starting(plan) => emit_starting(&plan, self),
            Event::Flash(ev) => self.on_flash_event(ev),
            Event::DryRun(summary) => emit_dry_run(summary, self),
            Event::ListPorts(ports) => emit_list_ports(&ports, self),
            Event::Error { code: _, message } => {
                self.finish_line();
                eprintln!("error: {message}");
            }
        }
    }

    fn finish(&mut self) {
        self.finish_line();
    }
}

fn emit_starting(plan: &FlashPlan, out: &mut HumanOutput) {
    out.println(&format!(
        "Flashing {} to the Flash HuCard on {}, for use in a {}...",
        plan.rom, plan.port, plan.region
    ));
}

fn emit_list_ports(ports: &[ports::PortInfo], out: &mut HumanOutput) {
    if ports.is_empty() {
        out.println("No serial ports found");
        return;
    }

    for (i, p) in ports.iter().enumerate() {
        out.println(&format_port_line(i, p));
    }
}

fn emit_dry_run(summary: DryRunSummary, out: &mut HumanOutput) {
    out.println("Dry run OK");
    out.println(&format!(
        "ROM: {} ({} bytes, {} packets)",
        summary.rom, summary.bytes, summary.packets
    ));
    out.println(&format!(
        "Payload: {}",
        if summary.reverse_bits {
            "bit-reversed (Japanese PC Engine)"
        } else {
            "as-is (NA TurboGrafx-16)"
        }
    ));
}
