//! Graph module
//!
//! The studio graph model: instruments, their ports and parameter data,
//! connections, the hub device, and the studio container that applies
//! mutations.

mod connection;
mod hub;
mod instrument;
mod port;
mod studio;
mod templates;
mod validation;

pub use connection::{Connection, ConnectionId};
pub use hub::{
    HubPortCode, ANALOG_CHANNELS, CV_HANDLE_PREFIX, GATE_HANDLE_PREFIX, HANDLE_MIDI_A,
    HANDLE_MIDI_B, HANDLE_MIDI_C, HANDLE_MIDI_D, HANDLE_USB_DEVICE, HANDLE_USB_HOST,
};
pub use instrument::{
    clean_param_name, AssignSlot, AutomationLane, AutomationTarget, CcMapping, DrumLane,
    Instrument, InstrumentId, LaneChannel, NrpnMapping, SlotError, TrackType, MAX_ASSIGNS,
    MAX_AUTOMATION_LANES, MAX_DRUM_LANES, MAX_PARAM_NAME_LEN,
};
pub use port::{Medium, Port, PortDirection};
pub use studio::{Preset, Studio, StudioError};
pub use templates::InstrumentTemplate;
pub use validation::{validate_connection, validate_endpoints, ConnectionError};
