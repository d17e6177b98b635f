//! Destination to role-predicate mapping.

use std::collections::BTreeSet;

use adminhub_core::config::RouteRule;
use adminhub_core::types::{Destination, RoleId};

/// Which roles may enter a destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RolePredicate {
    /// Any signed-in user, with or without a known role.
    AnyAuthenticated,
    /// Only the listed roles.
    OneOf(BTreeSet<RoleId>),
}

impl RolePredicate {
    /// Predicate admitting exactly the given roles.
    pub fn one_of(roles: impl IntoIterator<Item = RoleId>) -> Self {
        Self::OneOf(roles.into_iter().collect())
    }

    /// Checks an authenticated user's role against the predicate.
    pub fn permits(&self, role: Option<RoleId>) -> bool {
        match self {
            Self::AnyAuthenticated => true,
            Self::OneOf(allowed) => role.is_some_and(|r| allowed.contains(&r)),
        }
    }
}

/// Static map of destinations to role predicates.
///
/// Lookups use the exact path first, then the longest registered path
/// that contains the destination on a segment boundary.
#[derive(Debug, Clone, Default)]
pub struct RoutePolicies {
    /// Registered routes.
    routes: Vec<(Destination, RolePredicate)>,
}

impl RoutePolicies {
    /// Creates an empty policy set: every destination is open to any
    /// authenticated role.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds policies from configured route rules.
    pub fn from_rules(rules: &[RouteRule]) -> Self {
        let mut policies = Self::new();
        for rule in rules {
            policies.register(
                Destination::new(&rule.path),
                RolePredicate::one_of(rule.roles.iter().copied().map(RoleId)),
            );
        }
        policies
    }

    /// Registers or replaces the predicate for a route.
    pub fn register(&mut self, route: Destination, predicate: RolePredicate) {
        match self.routes.iter_mut().find(|(r, _)| *r == route) {
            Some((_, existing)) => *existing = predicate,
            None => self.routes.push((route, predicate)),
        }
    }

    /// Builder-style [`RoutePolicies::register`].
    pub fn with_route(mut self, route: impl Into<Destination>, predicate: RolePredicate) -> Self {
        self.register(route.into(), predicate);
        self
    }

    /// Predicate governing `destination`, if any route covers it.
    pub fn lookup(&self, destination: &Destination) -> Option<&RolePredicate> {
        self.routes
            .iter()
            .filter(|(route, _)| destination.is_under(route))
            .max_by_key(|(route, _)| route.segments().count())
            .map(|(_, predicate)| predicate)
    }

    /// Number of registered routes.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Whether no routes are registered.
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_predicate_permits() {
        let admins = RolePredicate::one_of([RoleId(1)]);
        assert!(admins.permits(Some(RoleId(1))));
        assert!(!admins.permits(Some(RoleId(2))));
        assert!(!admins.permits(None));
        assert!(RolePredicate::AnyAuthenticated.permits(None));
    }

    #[test]
    fn test_longest_prefix_wins() {
        let policies = RoutePolicies::new()
            .with_route("/licenses", RolePredicate::one_of([RoleId(1), RoleId(2)]))
            .with_route("/licenses/keys", RolePredicate::one_of([RoleId(1)]));

        let lookup = |p: &str| policies.lookup(&Destination::new(p)).cloned();
        assert_eq!(lookup("/licenses/keys/9"), Some(RolePredicate::one_of([RoleId(1)])));
        assert_eq!(lookup("/licenses/12"), Some(RolePredicate::one_of([RoleId(1), RoleId(2)])));
        assert_eq!(lookup("/licensees"), None);
        assert_eq!(lookup("/dashboard"), None);
    }

    #[test]
    fn test_register_replaces_existing_route() {
        let mut policies = RoutePolicies::new();
        policies.register(Destination::new("/users"), RolePredicate::one_of([RoleId(1)]));
        policies.register(Destination::new("/users/"), RolePredicate::one_of([RoleId(3)]));
        assert_eq!(policies.len(), 1);
        assert_eq!(
            policies.lookup(&Destination::new("/users")),
            Some(&RolePredicate::one_of([RoleId(3)]))
        );
    }

    #[test]
    fn test_from_rules() {
        let rules = vec![RouteRule {
            path: "payments".into(),
            roles: vec![1, 4],
        }];
        let policies = RoutePolicies::from_rules(&rules);
        assert_eq!(
            policies.lookup(&Destination::new("/payments/2024")),
            Some(&RolePredicate::one_of([RoleId(1), RoleId(4)]))
        );
    }
}
