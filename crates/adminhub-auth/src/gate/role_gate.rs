//! Navigation authorization decisions.

use adminhub_core::config::GateConfig;
use adminhub_core::types::{Destination, RoleId};

use super::policies::RoutePolicies;

/// Who is asking to navigate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// No session.
    Anonymous,
    /// A live session, with its role if known.
    Authenticated(Option<RoleId>),
}

/// Result of gating a navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// Proceed to the requested destination.
    Allow,
    /// Navigate to the given destination instead.
    DenyRedirect(Destination),
}

impl GateDecision {
    /// Whether navigation may proceed.
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }

    /// Redirect target of a denial.
    pub fn redirect(&self) -> Option<&Destination> {
        match self {
            Self::Allow => None,
            Self::DenyRedirect(target) => Some(target),
        }
    }
}

/// Decides whether the current role may enter a destination.
///
/// Pure: no I/O and no session state. Destinations without a registered
/// route are open to every authenticated user; that default is a policy
/// choice carried over from the dashboard, not an oversight.
#[derive(Debug, Clone)]
pub struct RoleGate {
    /// Route to predicate mapping.
    policies: RoutePolicies,
    /// Public entry point for users without a session.
    login: Destination,
    /// Target for authenticated users lacking the role.
    not_authorized: Destination,
}

impl RoleGate {
    /// Creates a gate with explicit redirect targets.
    pub fn new(policies: RoutePolicies, login: Destination, not_authorized: Destination) -> Self {
        Self {
            policies,
            login,
            not_authorized,
        }
    }

    /// Creates a gate from configuration.
    pub fn from_config(config: &GateConfig) -> Self {
        Self::new(
            RoutePolicies::from_rules(&config.routes),
            Destination::new(&config.login_path),
            Destination::new(&config.not_authorized_path),
        )
    }

    /// Gates `destination` for a decoded role; `None` means no session.
    pub fn decide(&self, role: Option<RoleId>, destination: &Destination) -> GateDecision {
        match role {
            None => self.decide_access(Access::Anonymous, destination),
            Some(role) => self.decide_access(Access::Authenticated(Some(role)), destination),
        }
    }

    /// Gates `destination` for an explicit access level.
    pub fn decide_access(&self, access: Access, destination: &Destination) -> GateDecision {
        let role = match access {
            Access::Anonymous => return GateDecision::DenyRedirect(self.login.clone()),
            Access::Authenticated(role) => role,
        };

        match self.policies.lookup(destination) {
            Some(predicate) if !predicate.permits(role) => {
                GateDecision::DenyRedirect(self.not_authorized.clone())
            }
            _ => GateDecision::Allow,
        }
    }

    /// The public entry point.
    pub fn login(&self) -> &Destination {
        &self.login
    }

    /// The not-authorized destination.
    pub fn not_authorized(&self) -> &Destination {
        &self.not_authorized
    }

    /// Returns a reference to the underlying policies.
    pub fn policies(&self) -> &RoutePolicies {
        &self.policies
    }
}

impl Default for RoleGate {
    fn default() -> Self {
        Self::from_config(&GateConfig::default())
    }
}
