//! Role-based navigation gating.

pub mod policies;
pub mod role_gate;

pub use policies::{RolePredicate, RoutePolicies};
pub use role_gate::{Access, GateDecision, RoleGate};
