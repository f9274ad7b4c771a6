use std::collections::BTreeMap;

use huflash::event::FlashEvent;
use huflash::ports;

use crate::output::{
    port_to_value, DryRunSummary, Event, FlashPlan, JsonProgressMode, OutputOptions, Reporter,
};

#[derive(serde::Serialize)]
pub struct JsonEvent {
    schema: u32,
    event: &'static str,
    #[serde(flatten)]
    fields: BTreeMap<&'static str, serde_json::Value>,
}

impl JsonEvent {
    pub fn status(event: &'static str) -> Self {
        Self {
            schema: 1,
            event,
            fields: BTreeMap::new(),
        }
    }

    pub fn with_u64(mut self, k: &'static str, v: u64) -> Self {
        self.fields.insert(k, serde_json::Value::from(v));
        self
    }

    pub fn with_str(mut self, k: &'static str, v: &str) -> Self {
        self.fields.insert(k, serde_json::Value::from(v));
        self
    }

    pub fn with_bool(mut self, k: &'static str, v: bool) -> Self {
        self.fields.insert(k, serde_json::Value::from(v));
        self
    }

    pub fn with_value(mut self, k: &'static str, v: serde_json::Value) -> Self {
        self.fields.insert(k, v);
        self
    }
}

pub struct JsonOutput {
    opts: OutputOptions,
    last_percent: Option<u64>,
}

impl JsonOutput {
    pub fn new(opts: OutputOptions) -> Self {
        Self {
            opts,
            last_percent: None,
        }
    }

    fn json_event(&mut self, ev: JsonEvent) {
        // JSON lines to stdout.
        println!(
            "{}",
            serde_json::to_string(&ev).unwrap_or_else(|_| "{}".to_string())
        );
    }

    fn error_event(&mut self, code: i32, msg: &str) {
        self.json_event(
            JsonEvent::status("error")
                .with_u64("code", code as u64)
                .with_str("message", msg),
        );

        if self.opts.verbose {
            eprintln!("error: {msg}");
        }
    }

    fn emit_flash(&mut self, ev: FlashEvent) {
        match &ev {
            FlashEvent::PortOpened { .. } => {
                self.last_percent = None;
            }
            FlashEvent::Packet { index, total, .. } => match self.opts.json_progress {
                JsonProgressMode::Packets => {}
                JsonProgressMode::None => return,
                JsonProgressMode::Percent => {
                    let total_u64 = (*total).max(1) as u64;
                    let percent = ((*index + 1) as u64).saturating_mul(100) / total_u64;
                    let should_emit = *index == 0
                        || *index + 1 == *total
                        || self.last_percent.map(|p| p != percent).unwrap_or(true);
                    if !should_emit {
                        return;
                    }
                    self.last_percent = Some(percent);
                }
            },
            _ => {}
        }

        self.json_event(flash_event_to_json(ev));
    }
}

impl Reporter for JsonOutput {
    fn emit(&mut self, event: Event) {
        match event {
            Event::Starting(plan) => self.json_event(starting_to_json(&plan)),
            Event::Flash(ev) => self.emit_flash(ev),
            Event::DryRun(summary) => self.json_event(dry_run_to_json(summary)),
            Event::ListPorts(ports) => self.json_event(list_to_json(&ports)),
            Event::Error { code, message } => self.error_event(code, &message),
        }
    }

    fn finish(&mut self) {}
}

pub fn flash_event_to_json(ev: FlashEvent) -> JsonEvent {
    match ev {
        FlashEvent::RomLoaded { bytes, packets } => JsonEvent::status("rom_loaded")
            .with_u64("bytes", bytes as u64)
            .with_u64("packets", packets as u64),
        FlashEvent::PortOpened { port } => JsonEvent::status("port_open").with_str("port", &port),
        FlashEvent::Packet { index, total, addr } => JsonEvent::status("packet")
            .with_u64("i", index as u64)
            .with_u64("n", total as u64)
            .with_u64("addr", addr as u64),
        FlashEvent::Retry {
            addr,
            attempt,
            retries,
            reason,
        } => JsonEvent::status("retry")
            .with_u64("addr", addr as u64)
            .with_u64("attempt", attempt as u64)
            .with_u64("retries", retries as u64)
            .with_str("reason", &reason),
        FlashEvent::Done => JsonEvent::status("done"),
        FlashEvent::PortClosed { port } => {
            JsonEvent::status("port_closed").with_str("port", &port)
        }
    }
}

fn starting_to_json(plan: &FlashPlan) -> JsonEvent {
    JsonEvent::status("starting")
        .with_str("rom", &plan.rom)
        .with_str("port", &plan.port)
        .with_str("region", plan.region)
}

pub fn dry_run_to_json(summary: DryRunSummary) -> JsonEvent {
    JsonEvent::status("dry_run")
        .with_str("rom", &summary.rom)
        .with_u64("bytes", summary.bytes as u64)
        .with_u64("packets", summary.packets as u64)
        .with_bool("reverse_bits", summary.reverse_bits)
}

pub fn list_to_json(ports: &[ports::PortInfo]) -> JsonEvent {
    JsonEvent::status("list")
        .with_u64("count", ports.len() as u64)
        .with_value(
            "ports",
            serde_json::Value::Array(
                ports
                    .iter()
                    .enumerate()
                    .map(|(i, p)| port_to_value(i, p))
                    .collect(),
            ),
        )
}
