//! Feedback loop detection over the studio graph.
//!
//! A loop in MIDI routing makes notes echo forever, so every graph mutation
//! is followed by a fresh [`detect`] over the current snapshot. Instruments
//! flagged local-off break echo, and a loop running through one of them is
//! not reported.

use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

use crate::graph::{Connection, ConnectionId, Instrument, InstrumentId};

/// Outcome of a cycle search.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub has_cycle: bool,
    /// Connections forming the reported cycle. Empty when `has_cycle` is false.
    pub cycle_connections: BTreeSet<ConnectionId>,
    /// Instruments on the reported cycle, in traversal order.
    pub cycle_instruments: Vec<InstrumentId>,
}

impl CycleReport {
    /// A report with no cycle.
    pub fn none() -> Self {
        Self::default()
    }

    /// Returns true if the given connection is part of the reported cycle.
    pub fn contains(&self, id: &ConnectionId) -> bool {
        self.cycle_connections.contains(id)
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    OnStack,
    Done,
}

struct Frame {
    node: usize,
    /// Next outgoing edge to explore.
    next: usize,
    /// Connection that led to this node, None for a search root.
    via: Option<usize>,
}

/// Searches the graph for a feedback loop.
///
/// Depth-first, with an explicit stack, starting from instruments in
/// declaration order and following outgoing connections in declaration
/// order. The first cycle found decides the result: if any instrument on it
/// is local-off, no cycle is reported at all.
///
/// Connections naming unknown instruments are ignored.
pub fn detect(instruments: &[Instrument], connections: &[Connection]) -> CycleReport {
    let index: HashMap<&InstrumentId, usize> = instruments
        .iter()
        .enumerate()
        .map(|(i, inst)| (&inst.id, i))
        .collect();

    // Outgoing connection indices per instrument, with resolved targets.
    let mut adjacency: Vec<Vec<(usize, usize)>> = vec![Vec::new(); instruments.len()];
    for (ci, conn) in connections.iter().enumerate() {
        if let (Some(&from), Some(&to)) = (index.get(&conn.source), index.get(&conn.target)) {
            adjacency[from].push((ci, to));
        }
    }

    let mut marks = vec![Mark::Unvisited; instruments.len()];

    for root in 0..instruments.len() {
        if marks[root] != Mark::Unvisited {
            continue;
        }
        marks[root] = Mark::OnStack;
        let mut stack = vec![Frame {
            node: root,
            next: 0,
            via: None,
        }];

        while let Some(top) = stack.len().checked_sub(1) {
            let node = stack[top].node;
            let Some(&(conn_index, target)) = adjacency[node].get(stack[top].next) else {
                marks[node] = Mark::Done;
                stack.pop();
                continue;
            };
            stack[top].next += 1;

            match marks[target] {
                Mark::Unvisited => {
                    marks[target] = Mark::OnStack;
                    stack.push(Frame {
                        node: target,
                        next: 0,
                        via: Some(conn_index),
                    });
                }
                Mark::OnStack => {
                    // Back-edge: the cycle is the stack from `target` up.
                    let start = stack
                        .iter()
                        .position(|f| f.node == target)
                        .unwrap_or(top);
                    let path = &stack[start..];
                    let mut edges: Vec<usize> = path[1..].iter().filter_map(|f| f.via).collect();
                    edges.push(conn_index);
                    let nodes: Vec<usize> = path.iter().map(|f| f.node).collect();
                    return report_cycle(instruments, connections, &nodes, &edges);
                }
                Mark::Done => {}
            }
        }
    }

    CycleReport::none()
}

fn report_cycle(
    instruments: &[Instrument],
    connections: &[Connection],
    nodes: &[usize],
    edges: &[usize],
) -> CycleReport {
    if let Some(&breaker) = nodes.iter().find(|&&n| instruments[n].local_off) {
        log::debug!(
            "cycle through {} suppressed: local off",
            instruments[breaker].id
        );
        return CycleReport::none();
    }

    let report = CycleReport {
        has_cycle: true,
        cycle_connections: edges.iter().map(|&e| connections[e].id.clone()).collect(),
        cycle_instruments: nodes.iter().map(|&n| instruments[n].id.clone()).collect(),
    };
    log::debug!(
        "feedback loop detected across {} connection(s)",
        report.cycle_connections.len()
    );
    report
}

/// Answers whether connecting `source` to `target` would close a loop.
///
/// True when `target` already reaches `source` by a forward path, or when
/// both are the same instrument. Local-off is not consulted: this is a
/// connect-time check, and [`detect`] decides what is reported afterwards.
pub fn would_create_cycle(
    connections: &[Connection],
    source: &InstrumentId,
    target: &InstrumentId,
) -> bool {
    if source == target {
        return true;
    }

    let mut adjacency: HashMap<&InstrumentId, Vec<&InstrumentId>> = HashMap::new();
    for conn in connections {
        adjacency.entry(&conn.source).or_default().push(&conn.target);
    }

    let mut visited: HashSet<&InstrumentId> = HashSet::new();
    let mut queue = VecDeque::from([target]);
    visited.insert(target);

    while let Some(current) = queue.pop_front() {
        for &next in adjacency.get(current).into_iter().flatten() {
            if next == source {
                return true;
            }
            if visited.insert(next) {
                queue.push_back(next);
            }
        }
    }

    false
}
