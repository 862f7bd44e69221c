//! The studio graph container.
//!
//! Owns instruments, connections and presets, allocates instrument ids from
//! an explicit sequence, and applies the graph mutations the editor performs.
//! Analysis and export run on the current snapshot through the convenience
//! methods at the bottom.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::analysis::{self, CycleReport, ResolvedRoute};
use crate::export::{self, DefinitionFile};

use super::connection::{Connection, ConnectionId};
use super::instrument::{Instrument, InstrumentId};
use super::port::{Port, PortDirection};
use super::templates::InstrumentTemplate;
use super::validation::{validate_endpoints, ConnectionError};

/// Prefix of sequence-allocated instrument ids.
const INSTRUMENT_ID_PREFIX: &str = "inst-";

/// A saved instrument configuration the user can add again later.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preset {
    pub id: String,
    pub name: String,
    pub instrument: Instrument,
}

/// Errors raised by studio mutations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StudioError {
    #[error("the hub instrument cannot be removed")]
    HubNotRemovable,

    #[error("a studio has exactly one hub instrument")]
    DuplicateHub,

    #[error("unknown instrument: {0}")]
    UnknownInstrument(InstrumentId),

    #[error(transparent)]
    Connection(#[from] ConnectionError),
}

/// The studio graph.
#[derive(Clone, Debug)]
pub struct Studio {
    instruments: Vec<Instrument>,
    connections: Vec<Connection>,
    presets: Vec<Preset>,
    /// Next number handed out as `inst-{n}`.
    next_instrument_id: u64,
}

impl Default for Studio {
    fn default() -> Self {
        Self::new()
    }
}

impl Studio {
    /// Creates a studio holding only the hub instrument.
    pub fn new() -> Self {
        let mut studio = Self {
            instruments: Vec::new(),
            connections: Vec::new(),
            presets: Vec::new(),
            next_instrument_id: 1,
        };
        let id = studio.allocate_id();
        studio.instruments.push(InstrumentTemplate::Hub.build(id));
        studio
    }

    /// Rebuilds a studio from loaded parts.
    ///
    /// The id sequence resumes after the highest `inst-N` id present. If no
    /// instrument is flagged as hub, a fresh hub is added; if several are,
    /// only the first keeps the flag. Connections sharing an id are collapsed
    /// to the first occurrence.
    pub fn from_parts(
        instruments: Vec<Instrument>,
        connections: Vec<Connection>,
        presets: Vec<Preset>,
    ) -> Self {
        let mut seen_ids: HashSet<ConnectionId> = HashSet::new();
        let before = connections.len();
        let connections: Vec<Connection> = connections
            .into_iter()
            .filter(|c| seen_ids.insert(c.id.clone()))
            .collect();
        if connections.len() != before {
            log::warn!(
                "dropped {} duplicate connection(s)",
                before - connections.len()
            );
        }

        let next_instrument_id = instruments
            .iter()
            .filter_map(|i| i.id.as_str().strip_prefix(INSTRUMENT_ID_PREFIX))
            .filter_map(|n| n.parse::<u64>().ok())
            .max()
            .map_or(1, |max| max + 1);

        let mut studio = Self {
            instruments,
            connections,
            presets,
            next_instrument_id,
        };

        let mut seen_hub = false;
        for inst in &mut studio.instruments {
            if inst.is_hub {
                if seen_hub {
                    log::warn!("clearing extra hub flag on {}", inst.id);
                    inst.is_hub = false;
                }
                seen_hub = true;
            }
        }
        if !seen_hub {
            let id = studio.allocate_id();
            log::warn!("no hub instrument found, adding {}", id);
            studio.instruments.insert(0, InstrumentTemplate::Hub.build(id));
        }

        studio
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Instruments in declaration order.
    pub fn instruments(&self) -> &[Instrument] {
        &self.instruments
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    pub fn presets(&self) -> &[Preset] {
        &self.presets
    }

    pub fn instrument(&self, id: &InstrumentId) -> Option<&Instrument> {
        self.instruments.iter().find(|i| i.id == *id)
    }

    /// The hub instrument.
    pub fn hub(&self) -> Option<&Instrument> {
        self.instruments.iter().find(|i| i.is_hub)
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    fn allocate_id(&mut self) -> InstrumentId {
        let id = InstrumentId::new(format!("{}{}", INSTRUMENT_ID_PREFIX, self.next_instrument_id));
        self.next_instrument_id += 1;
        id
    }

    /// Adds an instrument built from a template.
    pub fn add_from_template(
        &mut self,
        template: InstrumentTemplate,
    ) -> Result<InstrumentId, StudioError> {
        if template == InstrumentTemplate::Hub {
            return Err(StudioError::DuplicateHub);
        }
        let id = self.allocate_id();
        self.instruments.push(template.build(id.clone()));
        Ok(id)
    }

    /// Adds an instrument (e.g. from a preset), assigning it a fresh id.
    ///
    /// The hub flag is cleared: a studio never gains a second hub.
    pub fn add_instrument(&mut self, mut instrument: Instrument) -> InstrumentId {
        let id = self.allocate_id();
        instrument.id = id.clone();
        instrument.is_hub = false;
        self.instruments.push(instrument);
        id
    }

    /// Removes an instrument and every connection touching it.
    pub fn remove_instrument(&mut self, id: &InstrumentId) -> Result<Instrument, StudioError> {
        let index = self
            .instruments
            .iter()
            .position(|i| i.id == *id)
            .ok_or_else(|| StudioError::UnknownInstrument(id.clone()))?;
        if self.instruments[index].is_hub {
            return Err(StudioError::HubNotRemovable);
        }
        self.connections.retain(|c| !c.touches(id));
        Ok(self.instruments.remove(index))
    }

    /// Connects an output port to an input port.
    ///
    /// Adding a connection that already exists returns its id unchanged.
    pub fn add_connection(
        &mut self,
        source: &InstrumentId,
        source_port: &str,
        target: &InstrumentId,
        target_port: &str,
    ) -> Result<ConnectionId, StudioError> {
        let medium = validate_endpoints(
            self.instrument(source),
            source,
            source_port,
            self.instrument(target),
            target,
            target_port,
        )?;

        let conn = Connection::new(
            source.clone(),
            source_port,
            target.clone(),
            target_port,
            medium,
        );
        let id = conn.id.clone();
        if !self.connections.iter().any(|c| c.id == id) {
            log::debug!("connected {}", id);
            self.connections.push(conn);
        }
        Ok(id)
    }

    /// Removes a connection. Returns false if it did not exist.
    pub fn remove_connection(&mut self, id: &ConnectionId) -> bool {
        let before = self.connections.len();
        self.connections.retain(|c| c.id != *id);
        self.connections.len() != before
    }

    /// Edits an instrument in place.
    ///
    /// The id and hub flag are restored after the edit. Connections left
    /// pointing at ports the edit removed are dropped.
    pub fn update_instrument(
        &mut self,
        id: &InstrumentId,
        edit: impl FnOnce(&mut Instrument),
    ) -> Result<(), StudioError> {
        let inst = self
            .instruments
            .iter_mut()
            .find(|i| i.id == *id)
            .ok_or_else(|| StudioError::UnknownInstrument(id.clone()))?;
        let is_hub = inst.is_hub;
        edit(inst);
        inst.id = id.clone();
        inst.is_hub = is_hub;
        self.prune_orphaned_connections();
        Ok(())
    }

    /// Replaces an instrument's ports and prunes orphaned connections.
    ///
    /// Returns the number of connections removed.
    pub fn set_ports(
        &mut self,
        id: &InstrumentId,
        inputs: Vec<Port>,
        outputs: Vec<Port>,
    ) -> Result<usize, StudioError> {
        let inst = self
            .instruments
            .iter_mut()
            .find(|i| i.id == *id)
            .ok_or_else(|| StudioError::UnknownInstrument(id.clone()))?;
        inst.inputs = inputs;
        inst.outputs = outputs;
        Ok(self.prune_orphaned_connections())
    }

    fn prune_orphaned_connections(&mut self) -> usize {
        let instruments = &self.instruments;
        let has_port = |id: &InstrumentId, port: &str, direction: PortDirection| {
            instruments
                .iter()
                .find(|i| i.id == *id)
                .is_some_and(|i| i.port(port, direction).is_some())
        };

        let before = self.connections.len();
        self.connections.retain(|c| {
            has_port(&c.source, &c.source_port, PortDirection::Output)
                && has_port(&c.target, &c.target_port, PortDirection::Input)
        });
        let pruned = before - self.connections.len();
        if pruned > 0 {
            log::debug!("pruned {} orphaned connection(s)", pruned);
        }
        pruned
    }

    pub fn add_preset(&mut self, preset: Preset) {
        self.presets.push(preset);
    }

    // ========================================================================
    // Analysis and export
    // ========================================================================

    /// Feedback loop report for the current graph.
    pub fn cycle_report(&self) -> CycleReport {
        analysis::detect(&self.instruments, &self.connections)
    }

    /// Whether connecting `source` to `target` would close a loop.
    pub fn would_create_cycle(&self, source: &InstrumentId, target: &InstrumentId) -> bool {
        analysis::would_create_cycle(&self.connections, source, target)
    }

    /// Resolved hub routes for every connected instrument.
    pub fn routes(&self) -> Vec<ResolvedRoute> {
        let routing = analysis::trace(&self.instruments, &self.connections);
        analysis::resolve(&self.instruments, &self.connections, &routing)
    }

    /// Rendered definition files for every resolved route.
    pub fn definitions(&self) -> Vec<DefinitionFile> {
        export::render_all(&self.instruments, &self.connections)
    }
}
