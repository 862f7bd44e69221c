//! Connections between instrument ports.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::instrument::InstrumentId;
use super::port::Medium;

/// Identifier of a connection.
///
/// Derived from all four endpoint values, so two structurally identical
/// connections always share an id.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionId(String);

impl ConnectionId {
    /// Builds the id for the given endpoints.
    pub fn from_endpoints(
        source: &InstrumentId,
        source_port: &str,
        target: &InstrumentId,
        target_port: &str,
    ) -> Self {
        Self(format!("{}:{}->{}:{}", source, source_port, target, target_port))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A directed edge from one instrument's output port to another's input port.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub id: ConnectionId,
    /// Source instrument.
    pub source: InstrumentId,
    /// Output port id on the source instrument.
    pub source_port: String,
    /// Destination instrument.
    pub target: InstrumentId,
    /// Input port id on the destination instrument.
    pub target_port: String,
    /// Medium carried; equals both endpoint ports' medium.
    pub medium: Medium,
}

impl Connection {
    /// Creates a connection with its endpoint-derived id.
    pub fn new(
        source: impl Into<InstrumentId>,
        source_port: impl Into<String>,
        target: impl Into<InstrumentId>,
        target_port: impl Into<String>,
        medium: Medium,
    ) -> Self {
        let source = source.into();
        let source_port = source_port.into();
        let target = target.into();
        let target_port = target_port.into();
        Self {
            id: ConnectionId::from_endpoints(&source, &source_port, &target, &target_port),
            source,
            source_port,
            target,
            target_port,
            medium,
        }
    }

    /// Returns true if either endpoint is the given instrument.
    pub fn touches(&self, instrument: &InstrumentId) -> bool {
        self.source == *instrument || self.target == *instrument
    }
}
