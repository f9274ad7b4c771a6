use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PortInfo {
    pub port_name: String,
    pub usb: Option<UsbInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UsbInfo {
    pub vid: u16,
    pub pid: u16,
    pub serial_number: Option<String>,
    pub manufacturer: Option<String>,
    pub product: Option<String>,
}

#[derive(Error, Debug)]
#[error("serial port discovery failed: {0}")]
pub struct DiscoverError(#[from] serialport::Error);

/// Lists every serial port on the host, sorted by name. The flasher presents
/// itself as a plain serial device, so nothing is filtered out here.
pub fn list_ports() -> Result<Vec<PortInfo>, DiscoverError> {
    Ok(summarize(serialport::available_ports()?))
}

fn summarize(ports: Vec<serialport::SerialPortInfo>) -> Vec<PortInfo> {
    let mut out: Vec<PortInfo> = ports
        .into_iter()
        .map(|p| {
            let usb = match p.port_type {
                serialport::SerialPortType::UsbPort(usb) => Some(UsbInfo {
                    vid: usb.vid,
                    pid: usb.pid,
                    serial_number: usb.serial_number,
                    manufacturer: usb.manufacturer,
                    product: usb.product,
                }),
                _ => None,
            };
            PortInfo {
                port_name: p.port_name,
                usb,
            }
        })
        .collect();

    out.sort_by(|a, b| a.port_name.cmp(&b.port_name));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    use serialport::{SerialPortInfo, SerialPortType, UsbPortInfo};

    fn usb_port(name: &str, pid: u16) -> SerialPortInfo {
        SerialPortInfo {
            port_name: name.to_string(),
            port_type: SerialPortType::UsbPort(UsbPortInfo {
                vid: 0x0403,
                pid,
                serial_number: None,
                manufacturer: Some("FTDI".to_string()),
                product: None,
            }),
        }
    }

    #[test]
    fn test_summarize_sorts_by_name() {
        let ports = vec![
            usb_port("COM7", 0x6001),
            SerialPortInfo {
                port_name: "COM3".to_string(),
                port_type: SerialPortType::Unknown,
            },
        ];

        let out = summarize(ports);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].port_name, "COM3");
        assert!(out[0].usb.is_none());
        assert_eq!(out[1].port_name, "COM7");
        assert_eq!(out[1].usb.as_ref().unwrap().pid, 0x6001);
    }
}
