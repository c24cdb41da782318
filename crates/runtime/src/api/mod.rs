//! Public runtime API surface.
//!
//! Gathers the types exposed to consumers of the runtime crate so the
//! scheduler and state modules can stay focused on coordination.

pub mod errors;
pub mod handle;

pub use errors::{Result, RuntimeError};
pub use handle::{AttackRequest, CombatHandle, CombatStatus};
