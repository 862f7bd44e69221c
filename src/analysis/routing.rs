//! Routing trace from the hub's transport outputs.
//!
//! Follows MIDI and USB connections breadth-first from the hub, carrying the
//! hub output handle each path started from, to find which hub outputs every
//! downstream instrument is reachable from (directly or through thru chains).

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};

use crate::graph::{Connection, Instrument, InstrumentId};

/// Raw output port id on the hub instrument.
pub type HubHandle = String;

/// Downstream instrument -> hub handles it is reachable from.
pub type RoutingTrace = BTreeMap<InstrumentId, BTreeSet<HubHandle>>;

/// Traces which hub outputs reach each instrument over transport connections.
///
/// Returns an empty map when there is no hub. The hub itself never appears in
/// the result: connections back into it do not propagate. Visited state is
/// keyed by (instrument, handle), so two handles converging on one instrument
/// are both kept and both propagate onward.
pub fn trace(instruments: &[Instrument], connections: &[Connection]) -> RoutingTrace {
    let mut result = RoutingTrace::new();
    let Some(hub) = instruments.iter().find(|i| i.is_hub) else {
        log::debug!("no hub instrument, nothing to trace");
        return result;
    };

    let known: HashSet<&InstrumentId> = instruments.iter().map(|i| &i.id).collect();
    let routable = |conn: &Connection| {
        conn.medium.is_transport() && conn.target != hub.id && known.contains(&conn.target)
    };

    let mut adjacency: HashMap<&InstrumentId, Vec<&InstrumentId>> = HashMap::new();
    for conn in connections.iter().filter(|c| routable(*c)) {
        adjacency.entry(&conn.source).or_default().push(&conn.target);
    }

    let mut visited: HashSet<(&InstrumentId, &str)> = HashSet::new();
    let mut queue: VecDeque<(&InstrumentId, &str)> = VecDeque::new();

    for conn in connections
        .iter()
        .filter(|c| c.source == hub.id && routable(*c))
    {
        let entry = (&conn.target, conn.source_port.as_str());
        if visited.insert(entry) {
            queue.push_back(entry);
        }
    }

    while let Some((node, handle)) = queue.pop_front() {
        result
            .entry(node.clone())
            .or_default()
            .insert(handle.to_string());

        for &next in adjacency.get(node).into_iter().flatten() {
            if visited.insert((next, handle)) {
                queue.push_back((next, handle));
            }
        }
    }

    log::debug!("routing trace reached {} instrument(s)", result.len());
    result
}
