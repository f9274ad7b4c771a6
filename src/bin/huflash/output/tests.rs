use huflash::event::FlashEvent;
use huflash::ports::{PortInfo, UsbInfo};

use super::format_port_line;

#[test]
fn json_event_has_schema_and_event() {
    let ev = super::json::flash_event_to_json(FlashEvent::RomLoaded {
        bytes: 512,
        packets: 2,
    });
    let v = serde_json::to_value(&ev).unwrap();
    assert_eq!(v.get("schema").and_then(|v| v.as_u64()), Some(1));
    assert_eq!(v.get("event").and_then(|v| v.as_str()), Some("rom_loaded"));
    assert_eq!(v.get("bytes").and_then(|v| v.as_u64()), Some(512));
    assert_eq!(v.get("packets").and_then(|v| v.as_u64()), Some(2));
}

#[test]
fn packet_event_carries_address() {
    let ev = super::json::flash_event_to_json(FlashEvent::Packet {
        index: 3,
        total: 8,
        addr: 768,
    });
    let v = serde_json::to_value(&ev).unwrap();
    assert_eq!(v.get("event").and_then(|v| v.as_str()), Some("packet"));
    assert_eq!(v.get("addr").and_then(|v| v.as_u64()), Some(768));
}

#[test]
fn port_lines_include_usb_metadata() {
    let plain = PortInfo {
        port_name: "/dev/ttyS0".to_string(),
        usb: None,
    };
    assert_eq!(format_port_line(0, &plain), "[0] /dev/ttyS0");

    let usb = PortInfo {
        port_name: "COM7".to_string(),
        usb: Some(UsbInfo {
            vid: 0x0403,
            pid: 0x6001,
            serial_number: None,
            manufacturer: None,
            product: Some("FT232R".to_string()),
        }),
    };
    let line = format_port_line(1, &usb);
    assert!(line.contains("COM7"));
    assert!(line.contains("0403:6001"));
    assert!(line.contains("FT232R"));
}
