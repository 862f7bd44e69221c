//! Connection validation for the studio graph.
//!
//! Checks that a proposed connection joins an existing output port to an
//! existing input port carrying the same medium.

use thiserror::Error;

use super::instrument::{Instrument, InstrumentId};
use super::port::{Medium, PortDirection};

/// Errors that can occur when attempting to connect ports.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ConnectionError {
    /// The two ports carry different media.
    #[error("{} cannot connect to {}", .from.name(), .to.name())]
    IncompatibleMedia { from: Medium, to: Medium },

    #[error("unknown instrument: {0}")]
    UnknownInstrument(InstrumentId),

    #[error(
        "instrument {instrument} has no {} port '{port}'",
        .direction.name().to_lowercase()
    )]
    UnknownPort {
        instrument: InstrumentId,
        port: String,
        direction: PortDirection,
    },
}

/// Validates whether a connection between two media is allowed.
pub fn validate_connection(from: Medium, to: Medium) -> Result<(), ConnectionError> {
    if from.can_connect_to(to) {
        Ok(())
    } else {
        Err(ConnectionError::IncompatibleMedia { from, to })
    }
}

/// Resolves both endpoints and returns the medium the connection would carry.
pub fn validate_endpoints(
    source: Option<&Instrument>,
    source_id: &InstrumentId,
    source_port: &str,
    target: Option<&Instrument>,
    target_id: &InstrumentId,
    target_port: &str,
) -> Result<Medium, ConnectionError> {
    let source = source.ok_or_else(|| ConnectionError::UnknownInstrument(source_id.clone()))?;
    let target = target.ok_or_else(|| ConnectionError::UnknownInstrument(target_id.clone()))?;

    let out = source
        .port(source_port, PortDirection::Output)
        .ok_or_else(|| ConnectionError::UnknownPort {
            instrument: source_id.clone(),
            port: source_port.to_string(),
            direction: PortDirection::Output,
        })?;
    let inp = target
        .port(target_port, PortDirection::Input)
        .ok_or_else(|| ConnectionError::UnknownPort {
            instrument: target_id.clone(),
            port: target_port.to_string(),
            direction: PortDirection::Input,
        })?;

    validate_connection(out.medium, inp.medium)?;
    Ok(out.medium)
}
