//! Analysis module
//!
//! Read-only passes over a studio graph snapshot: feedback loop detection,
//! routing trace from the hub, and hub port code resolution.

pub mod cycle;
pub mod resolve;
pub mod routing;

pub use cycle::{detect, would_create_cycle, CycleReport};
pub use resolve::{resolve, ResolvedRoute};
pub use routing::{trace, HubHandle, RoutingTrace};
