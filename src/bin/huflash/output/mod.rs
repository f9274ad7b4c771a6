use crate::cli;

use huflash::{event::FlashEvent, ports};

pub mod human;
pub mod json;

#[cfg(test)]
mod tests;

#[derive(Debug, Clone, Copy)]
pub struct OutputOptions {
    pub verbose: bool,
    pub quiet: bool,
    pub json_progress: JsonProgressMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonProgressMode {
    Packets,
    Percent,
    None,
}

#[derive(Debug, Clone)]
pub struct FlashPlan {
    pub rom: String,
    pub port: String,
    pub region: &'static str,
}

#[derive(Debug, Clone)]
pub struct DryRunSummary {
    pub rom: String,
    pub bytes: usize,
    pub packets: usize,
    pub reverse_bits: bool,
}

#[derive(Debug, Clone)]
pub enum Event {
    Starting(FlashPlan),
    Flash(FlashEvent),
    DryRun(DryRunSummary),
    ListPorts(Vec<ports::PortInfo>),
    Error { code: i32, message: String },
}

pub trait Reporter {
    fn emit(&mut self, event: Event);
    fn finish(&mut self);
}

pub fn make_for_flash(args: &cli::FlashArgs) -> Box<dyn Reporter> {
    let json_progress = match args.json_progress {
        cli::JsonProgressArg::Packets => JsonProgressMode::Packets,
        cli::JsonProgressArg::Percent => JsonProgressMode::Percent,
        cli::JsonProgressArg::None => JsonProgressMode::None,
    };
    let opts = OutputOptions {
        verbose: args.verbose,
        quiet: args.quiet,
        json_progress,
    };
    if args.json {
        Box::new(json::JsonOutput::new(opts))
    } else {
        Box::new(human::HumanOutput::new(opts))
    }
}

pub fn make_for_list(args: &cli::ListArgs) -> Box<dyn Reporter> {
    let opts = OutputOptions {
        verbose: false,
        quiet: false,
        json_progress: JsonProgressMode::Packets,
    };
    if args.json {
        Box::new(json::JsonOutput::new(opts))
    } else {
        Box::new(human::HumanOutput::new(opts))
    }
}

pub fn format_port_line(index: usize, p: &ports::PortInfo) -> String {
    match &p.usb {
        Some(usb) => format!(
            "[{index}] {} usb {:04X}:{:04X} {}",
            p.port_name,
            usb.vid,
            usb.pid,
            usb.product.as_deref().unwrap_or("")
        ),
        None => format!("[{index}] {}", p.port_name),
    }
}

pub fn port_to_value(index: usize, p: &ports::PortInfo) -> serde_json::Value {
    let mut v = serde_json::to_value(p)
        .unwrap_or_else(|_| serde_json::Value::Object(serde_json::Map::new()));
    if let serde_json::Value::Object(obj) = &mut v {
        obj.insert("index".to_string(), serde_json::Value::from(index as u64));
    }
    v
}
