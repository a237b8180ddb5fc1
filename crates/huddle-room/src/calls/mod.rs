//! Call orchestration: per-peer sessions driven by presence and inbound calls.
//!
//! Presence and the negotiation stack never touch sessions directly; they
//! post [`CallCommand`]s onto the orchestrator's queue, which a single loop
//! consumes in order.

mod orchestrator;
mod types;


pub use orchestrator::CallOrchestrator;
pub use types::{CallCommand, CallSession};
