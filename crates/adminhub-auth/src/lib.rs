//! # adminhub-auth
//!
//! Client-side session lifecycle for the AdminHub dashboard.
//!
//! ## Modules
//!
//! - `token`: single bearer token storage, claim decoding, session generation
//! - `refresh`: periodic proactive token renewal
//! - `idle`: inactivity warning and forced logout
//! - `gate`: role-based navigation decisions
//! - `session`: per-login orchestration of the above
//! - `events`: session event publishing
//! - `task`: cancellable background task handles

pub mod events;
pub mod gate;
pub mod idle;
pub mod refresh;
pub mod session;
pub mod task;
pub mod token;

pub use events::SessionEvents;
pub use gate::{Access, GateDecision, RoleGate, RolePredicate, RoutePolicies};
pub use idle::{ActivityHub, ActivityKind, IdleMonitor, IdlePhase, IdleSettings, IdleState};
pub use refresh::{RefreshSettings, SessionRefreshScheduler, TickOutcome};
pub use session::SessionManager;
pub use token::{Claims, MemoryTokenStorage, TokenError, TokenStore};
