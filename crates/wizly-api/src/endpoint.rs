// ── Read endpoints polled on every refresh cycle ──

use serde::{Deserialize, Serialize};

/// One of the six fixed read resources exposed under `/api`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Endpoint {
    Status,
    Users,
    Invitations,
    Libraries,
    Servers,
    ApiKeys,
}

impl Endpoint {
    /// Every endpoint, in refresh order.
    pub const ALL: [Self; 6] = [
        Self::Status,
        Self::Users,
        Self::Invitations,
        Self::Libraries,
        Self::Servers,
        Self::ApiKeys,
    ];

    /// Path relative to the `/api` prefix.
    pub fn path(self) -> &'static str {
        match self {
            Self::Status => "/status",
            Self::Users => "/users",
            Self::Invitations => "/invitations",
            Self::Libraries => "/libraries",
            Self::Servers => "/servers",
            Self::ApiKeys => "/api-keys",
        }
    }

    /// Snake-case name, also the snapshot key.
    pub fn name(self) -> &'static str {
        self.into()
    }

    /// Plural entity name a payload may wrap its list under
    /// (`{"users": [...]}`).
    pub fn entity_key(self) -> &'static str {
        self.name()
    }

    /// `false` only for `status`, which carries no record list.
    pub fn is_list(self) -> bool {
        !matches!(self, Self::Status)
    }

    /// Stable position inside [`Endpoint::ALL`].
    pub fn index(self) -> usize {
        match self {
            Self::Status => 0,
            Self::Users => 1,
            Self::Invitations => 2,
            Self::Libraries => 3,
            Self::Servers => 4,
            Self::ApiKeys => 5,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn names_and_paths() {
        assert_eq!(Endpoint::ApiKeys.name(), "api_keys");
        assert_eq!(Endpoint::ApiKeys.path(), "/api-keys");
        assert_eq!(Endpoint::Libraries.entity_key(), "libraries");
        assert_eq!(Endpoint::from_str("invitations").unwrap(), Endpoint::Invitations);
        assert!(!Endpoint::Status.is_list());
    }

    #[test]
    fn index_matches_all_order() {
        for (i, endpoint) in Endpoint::ALL.iter().enumerate() {
            assert_eq!(endpoint.index(), i);
        }
    }
}
