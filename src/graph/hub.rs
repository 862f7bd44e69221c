//! Hub sequencer output handles and their canonical port codes.
//!
//! A hub handle is the raw output port id on the hub instrument. The hub port
//! code is the short code written into exported definitions.

use std::fmt;

/// Number of CV and gate outputs on the hub.
pub const ANALOG_CHANNELS: u8 = 4;

pub const HANDLE_MIDI_A: &str = "midi_a";
pub const HANDLE_MIDI_B: &str = "midi_b";
pub const HANDLE_MIDI_C: &str = "midi_c";
pub const HANDLE_MIDI_D: &str = "midi_d";
pub const HANDLE_USB_HOST: &str = "usb_host";
pub const HANDLE_USB_DEVICE: &str = "usb_device";

/// Prefix of the CV output handles `cv_1`..`cv_4`.
pub const CV_HANDLE_PREFIX: &str = "cv_";
/// Prefix of the gate output handles `gate_1`..`gate_4`.
pub const GATE_HANDLE_PREFIX: &str = "gate_";

/// Canonical hub output port code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HubPortCode {
    A,
    B,
    C,
    D,
    UsbHost,
    UsbDevice,
    Cv(u8),
    Gate(u8),
    /// A CV output paired with the same-numbered gate output.
    CvGate(u8),
}

impl HubPortCode {
    /// Maps a transport (MIDI/USB) hub handle to its code.
    ///
    /// Returns None for handles the table does not know about.
    pub fn from_transport_handle(handle: &str) -> Option<Self> {
        match handle {
            HANDLE_MIDI_A => Some(HubPortCode::A),
            HANDLE_MIDI_B => Some(HubPortCode::B),
            HANDLE_MIDI_C => Some(HubPortCode::C),
            HANDLE_MIDI_D => Some(HubPortCode::D),
            HANDLE_USB_HOST => Some(HubPortCode::UsbHost),
            HANDLE_USB_DEVICE => Some(HubPortCode::UsbDevice),
            _ => None,
        }
    }

    /// Maps an analog (CV/gate) hub handle to its code.
    pub fn from_analog_handle(handle: &str) -> Option<Self> {
        if let Some(n) = handle.strip_prefix(CV_HANDLE_PREFIX).and_then(analog_channel) {
            Some(HubPortCode::Cv(n))
        } else {
            handle
                .strip_prefix(GATE_HANDLE_PREFIX)
                .and_then(analog_channel)
                .map(HubPortCode::Gate)
        }
    }

    /// Returns true for CV, gate and combined codes.
    pub fn is_analog(&self) -> bool {
        matches!(
            self,
            HubPortCode::Cv(_) | HubPortCode::Gate(_) | HubPortCode::CvGate(_)
        )
    }
}

fn analog_channel(digits: &str) -> Option<u8> {
    digits
        .parse::<u8>()
        .ok()
        .filter(|n| (1..=ANALOG_CHANNELS).contains(n))
}

impl fmt::Display for HubPortCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HubPortCode::A => f.write_str("A"),
            HubPortCode::B => f.write_str("B"),
            HubPortCode::C => f.write_str("C"),
            HubPortCode::D => f.write_str("D"),
            HubPortCode::UsbHost => f.write_str("USBH"),
            HubPortCode::UsbDevice => f.write_str("USBD"),
            HubPortCode::Cv(n) => write!(f, "CV{}", n),
            HubPortCode::Gate(n) => write!(f, "G{}", n),
            HubPortCode::CvGate(n) => write!(f, "CVG{}", n),
        }
    }
}
