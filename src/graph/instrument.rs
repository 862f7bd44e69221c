//! Instruments and their per-instrument parameter data.
//!
//! An instrument is a node in the studio graph. Besides its ports it carries
//! everything the hub sequencer needs to drive it: MIDI channel, track type,
//! CC and NRPN maps, assign slots, automation lanes and drum lanes.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::port::{Port, PortDirection};

/// Maximum number of assign slots per instrument.
pub const MAX_ASSIGNS: usize = 8;

/// Maximum number of automation lanes per instrument.
pub const MAX_AUTOMATION_LANES: usize = 64;

/// Maximum number of drum lane rows per instrument.
pub const MAX_DRUM_LANES: usize = 8;

/// Maximum length of a cleaned parameter name.
pub const MAX_PARAM_NAME_LEN: usize = 12;

/// Stable identifier of an instrument within a studio.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstrumentId(String);

impl InstrumentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InstrumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for InstrumentId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for InstrumentId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Track type on the hub sequencer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TrackType {
    #[default]
    Poly,
    Drum,
    Mpe,
}

impl TrackType {
    /// Returns the keyword used in definition files.
    pub fn keyword(&self) -> &'static str {
        match self {
            TrackType::Poly => "POLY",
            TrackType::Drum => "DRUM",
            TrackType::Mpe => "MPE",
        }
    }
}

/// A MIDI CC parameter exposed by an instrument.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CcMapping {
    pub cc_number: u8,
    /// Cleaned short name, at most 12 characters.
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<u8>,
}

impl CcMapping {
    /// Creates a mapping, cleaning the name and keeping the original as the
    /// full name when cleaning changed it.
    pub fn new(cc_number: u8, name: &str) -> Self {
        let cleaned = clean_param_name(name);
        let full_name = (cleaned != name).then(|| name.to_string());
        Self {
            cc_number,
            name: cleaned,
            full_name,
            section: None,
            default_value: None,
        }
    }

    pub fn with_section(mut self, section: impl Into<String>) -> Self {
        self.section = Some(section.into());
        self
    }
}

/// An NRPN parameter exposed by an instrument.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NrpnMapping {
    pub msb: u8,
    pub lsb: u8,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<u16>,
}

impl NrpnMapping {
    pub fn new(msb: u8, lsb: u8, name: &str) -> Self {
        Self {
            msb,
            lsb,
            name: clean_param_name(name),
            section: None,
            default_value: None,
        }
    }

    pub fn with_section(mut self, section: impl Into<String>) -> Self {
        self.section = Some(section.into());
        self
    }
}

/// One of the eight assignable encoder slots.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignSlot {
    /// 1-based slot number.
    pub slot: u8,
    pub cc_number: u8,
    pub name: String,
    pub default_value: u8,
}

/// What an automation lane controls.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AutomationTarget {
    #[serde(rename = "CC")]
    Cc {
        #[serde(rename = "ccNumber")]
        cc_number: u8,
    },
    #[serde(rename = "PB")]
    PitchBend,
    #[serde(rename = "AT")]
    Aftertouch,
    #[serde(rename = "CV")]
    Cv {
        /// CV output 1-4.
        #[serde(rename = "cvNumber")]
        cv_number: u8,
    },
    #[serde(rename = "NRPN")]
    Nrpn {
        msb: u8,
        lsb: u8,
        /// Bit depth, 7 or 14.
        depth: u8,
    },
}

/// An automation lane slot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutomationLane {
    /// 1-based slot number.
    pub slot: u8,
    #[serde(flatten)]
    pub target: AutomationTarget,
}

/// Output channel of a drum lane row.
///
/// Serialized as its definition-file string: `"1"`-`"16"`, `"G1"`-`"G4"`,
/// `"CV1"`-`"CV4"` or `"CVG1"`-`"CVG4"`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum LaneChannel {
    Midi(u8),
    Gate(u8),
    Cv(u8),
    CvGate(u8),
}

impl fmt::Display for LaneChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LaneChannel::Midi(n) => write!(f, "{}", n),
            LaneChannel::Gate(n) => write!(f, "G{}", n),
            LaneChannel::Cv(n) => write!(f, "CV{}", n),
            LaneChannel::CvGate(n) => write!(f, "CVG{}", n),
        }
    }
}

impl std::str::FromStr for LaneChannel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parse = |digits: &str, max: u8| {
            digits
                .parse::<u8>()
                .ok()
                .filter(|n| (1..=max).contains(n))
                .ok_or_else(|| format!("invalid lane channel: {}", s))
        };
        // Longest prefix first: "CVG" before "CV".
        if let Some(rest) = s.strip_prefix("CVG") {
            parse(rest, 4).map(LaneChannel::CvGate)
        } else if let Some(rest) = s.strip_prefix("CV") {
            parse(rest, 4).map(LaneChannel::Cv)
        } else if let Some(rest) = s.strip_prefix('G') {
            parse(rest, 4).map(LaneChannel::Gate)
        } else {
            parse(s, 16).map(LaneChannel::Midi)
        }
    }
}

impl TryFrom<String> for LaneChannel {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<LaneChannel> for String {
    fn from(channel: LaneChannel) -> Self {
        channel.to_string()
    }
}

/// A drum lane row. Only meaningful for [`TrackType::Drum`] instruments.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrumLane {
    /// 1-based row number, 1-8.
    pub row: u8,
    #[serde(default)]
    pub trig: Option<u8>,
    #[serde(default)]
    pub chan: Option<LaneChannel>,
    #[serde(default)]
    pub note: Option<u8>,
    pub name: String,
}

impl DrumLane {
    pub fn new(row: u8, name: impl Into<String>) -> Self {
        Self {
            row,
            trig: None,
            chan: None,
            note: None,
            name: name.into(),
        }
    }

    pub fn with_note(mut self, note: u8) -> Self {
        self.note = Some(note);
        self
    }

    pub fn with_trig(mut self, trig: u8) -> Self {
        self.trig = Some(trig);
        self
    }

    pub fn with_chan(mut self, chan: LaneChannel) -> Self {
        self.chan = Some(chan);
        self
    }
}

/// Errors raised by slot editing operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SlotError {
    #[error("cannot add more than {max} {kind}")]
    Capacity { kind: &'static str, max: usize },

    #[error("{kind} {slot} is out of range 1..={max}")]
    OutOfRange {
        kind: &'static str,
        slot: u8,
        max: usize,
    },

    #[error("no {kind} at slot {slot}")]
    NoSuchSlot { kind: &'static str, slot: u8 },
}

/// A node in the studio graph.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Instrument {
    pub id: InstrumentId,
    pub name: String,
    pub manufacturer: String,
    /// MIDI channel 1-16. Ignored for analog-only routes.
    pub midi_channel: u8,
    pub track_type: TrackType,
    #[serde(default)]
    pub inputs: Vec<Port>,
    #[serde(default)]
    pub outputs: Vec<Port>,
    #[serde(default)]
    pub cc_mappings: Vec<CcMapping>,
    #[serde(default)]
    pub nrpn_mappings: Vec<NrpnMapping>,
    #[serde(default)]
    pub assigns: Vec<AssignSlot>,
    #[serde(default)]
    pub automation_lanes: Vec<AutomationLane>,
    #[serde(default)]
    pub drum_lanes: Vec<DrumLane>,
    /// Marks the hub sequencer. Exactly one per studio.
    #[serde(default)]
    pub is_hub: bool,
    /// The instrument blocks MIDI echo, so loops through it are not feedback.
    #[serde(default)]
    pub local_off: bool,
    #[serde(default)]
    pub show_cv_ports: bool,
}

impl Instrument {
    /// Creates an instrument with no ports or parameter data.
    pub fn new(
        id: impl Into<InstrumentId>,
        name: impl Into<String>,
        manufacturer: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            manufacturer: manufacturer.into(),
            midi_channel: 1,
            track_type: TrackType::Poly,
            inputs: Vec::new(),
            outputs: Vec::new(),
            cc_mappings: Vec::new(),
            nrpn_mappings: Vec::new(),
            assigns: Vec::new(),
            automation_lanes: Vec::new(),
            drum_lanes: Vec::new(),
            is_hub: false,
            local_off: false,
            show_cv_ports: false,
        }
    }

    pub fn with_channel(mut self, channel: u8) -> Self {
        self.midi_channel = channel;
        self
    }

    pub fn with_track_type(mut self, track_type: TrackType) -> Self {
        self.track_type = track_type;
        self
    }

    pub fn with_input(mut self, port: Port) -> Self {
        self.inputs.push(port);
        self
    }

    pub fn with_output(mut self, port: Port) -> Self {
        self.outputs.push(port);
        self
    }

    pub fn with_local_off(mut self, local_off: bool) -> Self {
        self.local_off = local_off;
        self
    }

    /// Looks up a port by id in the given direction.
    pub fn port(&self, id: &str, direction: PortDirection) -> Option<&Port> {
        let ports = match direction {
            PortDirection::Input => &self.inputs,
            PortDirection::Output => &self.outputs,
        };
        ports.iter().find(|p| p.id == id)
    }

    // ========================================================================
    // Assign slots
    // ========================================================================

    /// Appends an assign slot, numbered after the existing ones.
    pub fn add_assign(
        &mut self,
        cc_number: u8,
        name: &str,
        default_value: u8,
    ) -> Result<u8, SlotError> {
        if self.assigns.len() >= MAX_ASSIGNS {
            return Err(SlotError::Capacity {
                kind: "assign slots",
                max: MAX_ASSIGNS,
            });
        }
        let slot = self.assigns.len() as u8 + 1;
        self.assigns.push(AssignSlot {
            slot,
            cc_number,
            name: clean_param_name(name),
            default_value,
        });
        Ok(slot)
    }

    /// Removes an assign slot and renumbers the rest.
    pub fn remove_assign(&mut self, slot: u8) -> Result<AssignSlot, SlotError> {
        let index = self
            .assigns
            .iter()
            .position(|a| a.slot == slot)
            .ok_or(SlotError::NoSuchSlot {
                kind: "assign",
                slot,
            })?;
        let removed = self.assigns.remove(index);
        renumber(&mut self.assigns, |a, n| a.slot = n);
        Ok(removed)
    }

    // ========================================================================
    // Automation lanes
    // ========================================================================

    /// Appends an automation lane, numbered after the existing ones.
    pub fn add_automation_lane(&mut self, target: AutomationTarget) -> Result<u8, SlotError> {
        if self.automation_lanes.len() >= MAX_AUTOMATION_LANES {
            return Err(SlotError::Capacity {
                kind: "automation lanes",
                max: MAX_AUTOMATION_LANES,
            });
        }
        let slot = self.automation_lanes.len() as u8 + 1;
        self.automation_lanes.push(AutomationLane { slot, target });
        Ok(slot)
    }

    /// Removes an automation lane and renumbers the rest.
    pub fn remove_automation_lane(&mut self, slot: u8) -> Result<AutomationLane, SlotError> {
        let index = self
            .automation_lanes
            .iter()
            .position(|l| l.slot == slot)
            .ok_or(SlotError::NoSuchSlot {
                kind: "automation lane",
                slot,
            })?;
        let removed = self.automation_lanes.remove(index);
        renumber(&mut self.automation_lanes, |l, n| l.slot = n);
        Ok(removed)
    }

    /// Moves the lane at slot `from` so it ends up at slot `to`.
    pub fn move_automation_lane(&mut self, from: u8, to: u8) -> Result<(), SlotError> {
        let len = self.automation_lanes.len();
        let index = self
            .automation_lanes
            .iter()
            .position(|l| l.slot == from)
            .ok_or(SlotError::NoSuchSlot {
                kind: "automation lane",
                slot: from,
            })?;
        if to == 0 || to as usize > len {
            return Err(SlotError::OutOfRange {
                kind: "automation lane",
                slot: to,
                max: len,
            });
        }
        let lane = self.automation_lanes.remove(index);
        self.automation_lanes.insert(to as usize - 1, lane);
        renumber(&mut self.automation_lanes, |l, n| l.slot = n);
        Ok(())
    }

    // ========================================================================
    // Drum lanes
    // ========================================================================

    /// Inserts a drum lane row, replacing any existing lane on the same row.
    pub fn set_drum_lane(&mut self, lane: DrumLane) -> Result<(), SlotError> {
        if lane.row == 0 || lane.row as usize > MAX_DRUM_LANES {
            return Err(SlotError::OutOfRange {
                kind: "drum lane",
                slot: lane.row,
                max: MAX_DRUM_LANES,
            });
        }
        match self.drum_lanes.iter_mut().find(|l| l.row == lane.row) {
            Some(existing) => *existing = lane,
            None => {
                self.drum_lanes.push(lane);
                self.drum_lanes.sort_by_key(|l| l.row);
            }
        }
        Ok(())
    }

    /// Removes the drum lane on the given row.
    pub fn remove_drum_lane(&mut self, row: u8) -> Result<DrumLane, SlotError> {
        let index = self
            .drum_lanes
            .iter()
            .position(|l| l.row == row)
            .ok_or(SlotError::NoSuchSlot {
                kind: "drum lane",
                slot: row,
            })?;
        Ok(self.drum_lanes.remove(index))
    }
}

/// Numbers items 1..N. Items past slot 255 all share slot 255.
fn renumber<T>(items: &mut [T], mut set: impl FnMut(&mut T, u8)) {
    for (i, item) in items.iter_mut().enumerate() {
        set(item, u8::try_from(i + 1).unwrap_or(u8::MAX));
    }
}

/// Cleans a parameter name for the hub's 12-character display.
///
/// Control characters are dropped, surrounding whitespace trimmed and the
/// result truncated to [`MAX_PARAM_NAME_LEN`] characters.
pub fn clean_param_name(name: &str) -> String {
    let filtered: String = name.chars().filter(|c| !c.is_control()).collect();
    filtered
        .trim()
        .chars()
        .take(MAX_PARAM_NAME_LEN)
        .collect::<String>()
        .trim_end()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn synth() -> Instrument {
        Instrument::new("inst-1", "Prophet", "Sequential")
    }

    #[test]
    fn test_clean_param_name() {
        assert_eq!(clean_param_name("  Cutoff  "), "Cutoff");
        assert_eq!(clean_param_name("Filter Envelope Amount"), "Filter Envel");
        assert_eq!(clean_param_name("Res\tonance"), "Resonance");
        assert_eq!(clean_param_name("Osc 1 Level "), "Osc 1 Level");
    }

    #[test]
    fn test_cc_mapping_keeps_full_name_when_truncated() {
        let short = CcMapping::new(74, "Cutoff");
        assert_eq!(short.name, "Cutoff");
        assert!(short.full_name.is_none());

        let long = CcMapping::new(71, "Filter Resonance");
        assert_eq!(long.name, "Filter Reson");
        assert_eq!(long.full_name.as_deref(), Some("Filter Resonance"));
    }

    #[test]
    fn test_assign_capacity() {
        let mut inst = synth();
        for i in 0..MAX_ASSIGNS {
            assert_eq!(inst.add_assign(i as u8, "Knob", 0).unwrap(), i as u8 + 1);
        }
        let err = inst.add_assign(99, "Extra", 0).unwrap_err();
        assert_eq!(
            err,
            SlotError::Capacity {
                kind: "assign slots",
                max: MAX_ASSIGNS
            }
        );
    }

    #[test]
    fn test_remove_assign_renumbers() {
        let mut inst = synth();
        inst.add_assign(10, "A", 0).unwrap();
        inst.add_assign(11, "B", 0).unwrap();
        inst.add_assign(12, "C", 0).unwrap();

        let removed = inst.remove_assign(2).unwrap();
        assert_eq!(removed.cc_number, 11);
        let slots: Vec<(u8, u8)> = inst.assigns.iter().map(|a| (a.slot, a.cc_number)).collect();
        assert_eq!(slots, vec![(1, 10), (2, 12)]);

        assert!(inst.remove_assign(5).is_err());
    }

    #[test]
    fn test_automation_lane_capacity() {
        let mut inst = synth();
        for _ in 0..MAX_AUTOMATION_LANES {
            inst.add_automation_lane(AutomationTarget::PitchBend).unwrap();
        }
        assert!(inst.add_automation_lane(AutomationTarget::Aftertouch).is_err());
        assert_eq!(inst.automation_lanes.last().unwrap().slot, 64);
    }

    #[test]
    fn test_move_automation_lane() {
        let mut inst = synth();
        inst.add_automation_lane(AutomationTarget::Cc { cc_number: 1 }).unwrap();
        inst.add_automation_lane(AutomationTarget::PitchBend).unwrap();
        inst.add_automation_lane(AutomationTarget::Aftertouch).unwrap();

        inst.move_automation_lane(3, 1).unwrap();
        assert_eq!(inst.automation_lanes[0].target, AutomationTarget::Aftertouch);
        assert_eq!(inst.automation_lanes[1].target, AutomationTarget::Cc { cc_number: 1 });
        let slots: Vec<u8> = inst.automation_lanes.iter().map(|l| l.slot).collect();
        assert_eq!(slots, vec![1, 2, 3]);

        assert!(inst.move_automation_lane(1, 4).is_err());
        assert!(inst.move_automation_lane(9, 1).is_err());
    }

    #[test]
    fn test_remove_automation_lane_renumbers() {
        let mut inst = synth();
        inst.add_automation_lane(AutomationTarget::Cc { cc_number: 1 }).unwrap();
        inst.add_automation_lane(AutomationTarget::Cv { cv_number: 2 }).unwrap();
        inst.remove_automation_lane(1).unwrap();
        assert_eq!(inst.automation_lanes.len(), 1);
        assert_eq!(inst.automation_lanes[0].slot, 1);
        assert_eq!(inst.automation_lanes[0].target, AutomationTarget::Cv { cv_number: 2 });
    }

    #[test]
    fn test_oversized_lane_list_renumbers_without_overflow() {
        let mut inst = synth();
        inst.automation_lanes = (0..300)
            .map(|_| AutomationLane {
                slot: 1,
                target: AutomationTarget::PitchBend,
            })
            .collect();

        inst.remove_automation_lane(1).unwrap();
        assert_eq!(inst.automation_lanes.len(), 299);
        assert_eq!(inst.automation_lanes[0].slot, 1);
        assert_eq!(inst.automation_lanes[254].slot, 255);
        assert_eq!(inst.automation_lanes[298].slot, 255);

        inst.move_automation_lane(2, 1).unwrap();
        assert_eq!(inst.automation_lanes[1].slot, 2);
        assert!(inst.add_automation_lane(AutomationTarget::Aftertouch).is_err());
    }

    #[test]
    fn test_set_drum_lane_replaces_row() {
        let mut inst = synth().with_track_type(TrackType::Drum);
        inst.set_drum_lane(DrumLane::new(2, "Snare").with_note(38)).unwrap();
        inst.set_drum_lane(DrumLane::new(1, "Kick").with_note(36)).unwrap();
        inst.set_drum_lane(DrumLane::new(2, "Clap").with_note(39)).unwrap();

        assert_eq!(inst.drum_lanes.len(), 2);
        assert_eq!(inst.drum_lanes[0].name, "Kick");
        assert_eq!(inst.drum_lanes[1].name, "Clap");

        assert!(inst.set_drum_lane(DrumLane::new(9, "Tom")).is_err());
        assert!(inst.set_drum_lane(DrumLane::new(0, "Tom")).is_err());
        assert_eq!(inst.remove_drum_lane(1).unwrap().name, "Kick");
    }

    #[test]
    fn test_lane_channel_parse_and_display() {
        assert_eq!("10".parse::<LaneChannel>().unwrap(), LaneChannel::Midi(10));
        assert_eq!("G3".parse::<LaneChannel>().unwrap(), LaneChannel::Gate(3));
        assert_eq!("CV2".parse::<LaneChannel>().unwrap(), LaneChannel::Cv(2));
        assert_eq!("CVG4".parse::<LaneChannel>().unwrap(), LaneChannel::CvGate(4));
        assert!("17".parse::<LaneChannel>().is_err());
        assert!("G5".parse::<LaneChannel>().is_err());
        assert!("X1".parse::<LaneChannel>().is_err());
        assert_eq!(LaneChannel::CvGate(1).to_string(), "CVG1");
        assert_eq!(LaneChannel::Midi(16).to_string(), "16");
    }

    #[test]
    fn test_automation_lane_json_shape() {
        let lane = AutomationLane {
            slot: 3,
            target: AutomationTarget::Nrpn { msb: 1, lsb: 2, depth: 14 },
        };
        let json = serde_json::to_value(&lane).unwrap();
        assert_eq!(json["type"], "NRPN");
        assert_eq!(json["slot"], 3);
        assert_eq!(json["depth"], 14);

        let cc: AutomationLane =
            serde_json::from_str(r#"{"slot":1,"type":"CC","ccNumber":74}"#).unwrap();
        assert_eq!(cc.target, AutomationTarget::Cc { cc_number: 74 });
    }

    #[test]
    fn test_port_lookup_by_direction() {
        let inst = synth()
            .with_input(Port::midi("in", "MIDI In"))
            .with_output(Port::midi("thru", "MIDI Thru"));
        assert!(inst.port("in", PortDirection::Input).is_some());
        assert!(inst.port("in", PortDirection::Output).is_none());
        assert!(inst.port("thru", PortDirection::Output).is_some());
    }
}
