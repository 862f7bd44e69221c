//! Port definitions for studio instruments.
//!
//! Ports are the connection points on instruments where MIDI, USB, audio and
//! CV signals flow in and out.

use serde::{Deserialize, Serialize};

/// The medium carried by a port or connection.
///
/// - **Midi**: 5-pin / TRS MIDI
/// - **Usb**: USB MIDI, the second transport-capable medium
/// - **Audio**: line-level audio
/// - **Cv**: control voltage and gate signals
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Medium {
    Midi,
    Usb,
    Audio,
    Cv,
}

impl Medium {
    /// Returns true if this medium forwards routing identity downstream.
    ///
    /// Only MIDI and USB connections carry hub port identity through an
    /// instrument's thru; audio and CV terminate routing resolution.
    pub fn is_transport(&self) -> bool {
        matches!(self, Medium::Midi | Medium::Usb)
    }

    /// Checks if a connection from this medium to another is valid.
    ///
    /// Connections must carry the same medium on both ends.
    pub fn can_connect_to(&self, target: Medium) -> bool {
        *self == target
    }

    /// Returns a human-readable name for the medium.
    pub fn name(&self) -> &'static str {
        match self {
            Medium::Midi => "MIDI",
            Medium::Usb => "USB",
            Medium::Audio => "Audio",
            Medium::Cv => "CV",
        }
    }
}

/// Direction of a port on an instrument.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PortDirection {
    /// An input port that receives signals.
    Input,
    /// An output port that sends signals.
    Output,
}

impl PortDirection {
    /// Returns a human-readable name for the port direction.
    pub fn name(&self) -> &'static str {
        match self {
            PortDirection::Input => "Input",
            PortDirection::Output => "Output",
        }
    }
}

/// A port on an instrument.
///
/// The id is unique within the owning instrument and direction. The direction
/// itself is implied by which list (inputs or outputs) holds the port.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Port {
    /// Identifier, unique within the instrument and direction.
    pub id: String,
    /// Label displayed to the user.
    pub label: String,
    /// The medium this port accepts or produces.
    pub medium: Medium,
}

impl Port {
    /// Creates a new port.
    pub fn new(id: impl Into<String>, label: impl Into<String>, medium: Medium) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            medium,
        }
    }

    /// Creates a MIDI port.
    pub fn midi(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(id, label, Medium::Midi)
    }

    /// Creates a USB port.
    pub fn usb(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(id, label, Medium::Usb)
    }

    /// Creates an audio port.
    pub fn audio(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(id, label, Medium::Audio)
    }

    /// Creates a CV port.
    pub fn cv(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(id, label, Medium::Cv)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_direction_names() {
        assert_eq!(PortDirection::Input.name(), "Input");
        assert_eq!(PortDirection::Output.name(), "Output");
    }

    #[test]
    fn test_transport_media() {
        assert!(Medium::Midi.is_transport());
        assert!(Medium::Usb.is_transport());
        assert!(!Medium::Audio.is_transport());
        assert!(!Medium::Cv.is_transport());
    }

    #[test]
    fn test_media_only_connect_to_themselves() {
        assert!(Medium::Cv.can_connect_to(Medium::Cv));
        assert!(!Medium::Midi.can_connect_to(Medium::Usb));
        assert!(!Medium::Audio.can_connect_to(Medium::Cv));
    }

    #[test]
    fn test_medium_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Medium::Usb).unwrap(), "\"usb\"");
        let medium: Medium = serde_json::from_str("\"cv\"").unwrap();
        assert_eq!(medium, Medium::Cv);
    }

    #[test]
    fn test_port_constructors() {
        let port = Port::midi("midi_in", "MIDI In");
        assert_eq!(port.id, "midi_in");
        assert_eq!(port.label, "MIDI In");
        assert_eq!(port.medium, Medium::Midi);
        assert_eq!(Port::audio("out", "Out").medium, Medium::Audio);
    }
}
