//! Resolution of hub port codes per instrument.
//!
//! Combines the routing trace with direct CV/gate patching from the hub and
//! merges same-numbered CV and gate outputs feeding one instrument into a
//! single combined code.

use crate::graph::{Connection, HubPortCode, Instrument, InstrumentId, Medium};

use super::routing::RoutingTrace;

/// One exportable route: an instrument driven from one hub port.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedRoute {
    pub instrument: InstrumentId,
    pub hub_port_code: HubPortCode,
    pub is_analog: bool,
}

impl ResolvedRoute {
    fn new(instrument: InstrumentId, hub_port_code: HubPortCode) -> Self {
        Self {
            instrument,
            is_analog: hub_port_code.is_analog(),
            hub_port_code,
        }
    }
}

/// Resolves the final list of (instrument, hub port code) routes.
///
/// Routes are ordered by instrument declaration order; within an instrument,
/// transport codes come first (sorted by handle), then analog codes in
/// connection order. Unrecognized hub handles are dropped.
pub fn resolve(
    instruments: &[Instrument],
    connections: &[Connection],
    trace: &RoutingTrace,
) -> Vec<ResolvedRoute> {
    let hub_id = instruments.iter().find(|i| i.is_hub).map(|i| &i.id);
    let mut routes = Vec::new();

    for inst in instruments.iter().filter(|i| !i.is_hub) {
        let mut codes: Vec<HubPortCode> = Vec::new();

        for handle in trace.get(&inst.id).into_iter().flatten() {
            match HubPortCode::from_transport_handle(handle) {
                Some(code) if !codes.contains(&code) => codes.push(code),
                Some(_) => {}
                None => log::debug!("dropping unknown hub handle '{}' for {}", handle, inst.id),
            }
        }

        if let Some(hub_id) = hub_id {
            let analog = connections.iter().filter(|c| {
                c.source == *hub_id && c.target == inst.id && c.medium == Medium::Cv
            });
            for conn in analog {
                match HubPortCode::from_analog_handle(&conn.source_port) {
                    Some(code) if !codes.contains(&code) => codes.push(code),
                    Some(_) => {}
                    None => log::debug!(
                        "dropping unknown analog hub handle '{}' for {}",
                        conn.source_port,
                        inst.id
                    ),
                }
            }
        }

        routes.extend(
            pair_cv_gates(&codes)
                .into_iter()
                .map(|code| ResolvedRoute::new(inst.id.clone(), code)),
        );
    }

    routes
}

/// Replaces each `CV{n}` + `G{n}` pair with `CVG{n}`.
///
/// The combined code takes the position of the CV code. Unpaired CV and gate
/// codes pass through unchanged.
fn pair_cv_gates(codes: &[HubPortCode]) -> Vec<HubPortCode> {
    let mut paired = Vec::with_capacity(codes.len());
    for &code in codes {
        match code {
            HubPortCode::Cv(n) if codes.contains(&HubPortCode::Gate(n)) => {
                paired.push(HubPortCode::CvGate(n));
            }
            HubPortCode::Gate(n) if codes.contains(&HubPortCode::Cv(n)) => {}
            other => paired.push(other),
        }
    }
    paired
}
