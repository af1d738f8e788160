//! Acting principals and roles
//!
//! A [`Principal`] is the authenticated actor behind a request. Its [`Identity`]
//! carries the natural key the authorization policy compares against
//! (license number for doctors and pharmacists, SSN for patients).

use crate::domain::ids::{LicenseNumber, Ssn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Role claimed by a token and held by a principal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Doctor,
    Patient,
    Pharmacist,
}

impl Role {
    /// Wire name used in the `user_type` token claim
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Doctor => "doctor",
            Role::Patient => "patient",
            Role::Pharmacist => "pharmacist",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "doctor" => Ok(Role::Doctor),
            "patient" => Ok(Role::Patient),
            "pharmacist" => Ok(Role::Pharmacist),
            other => Err(format!("Unknown role: {other}")),
        }
    }
}

/// Role-specific identity attributes of a principal
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
    Doctor(LicenseNumber),
    Patient(Ssn),
    Pharmacist(LicenseNumber),
}

/// An authenticated actor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    /// Surrogate id of the backing account record
    pub id: i64,

    /// Login email
    pub email: String,

    /// Role and natural key
    pub identity: Identity,

    /// Whether the backing account is active
    pub is_active: bool,
}

impl Principal {
    /// Role of this principal
    pub fn role(&self) -> Role {
        match self.identity {
            Identity::Doctor(_) => Role::Doctor,
            Identity::Patient(_) => Role::Patient,
            Identity::Pharmacist(_) => Role::Pharmacist,
        }
    }
}

/// Outcome of identity resolution across all credential channels
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// No channel produced an active principal
    Unauthenticated,

    /// A channel resolved to this principal
    Resolved(Principal),
}

impl Resolution {
    /// Returns the principal if resolution succeeded
    pub fn principal(&self) -> Option<&Principal> {
        match self {
            Resolution::Resolved(principal) => Some(principal),
            Resolution::Unauthenticated => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("doctor", Role::Doctor)]
    #[test_case("patient", Role::Patient)]
    #[test_case("pharmacist", Role::Pharmacist)]
    fn test_role_round_trips_wire_name(wire: &str, role: Role) {
        assert_eq!(wire.parse::<Role>().unwrap(), role);
        assert_eq!(role.as_str(), wire);
    }

    #[test]
    fn test_unknown_role_rejected() {
        assert!("admin".parse::<Role>().is_err());
        assert!("Doctor".parse::<Role>().is_err());
    }

    #[test]
    fn test_principal_role_follows_identity() {
        let principal = Principal {
            id: 7,
            email: "p@example.com".to_string(),
            identity: Identity::Patient(Ssn::new("111-11-1111").unwrap()),
            is_active: true,
        };
        assert_eq!(principal.role(), Role::Patient);
        assert!(Resolution::Resolved(principal).principal().is_some());
        assert!(Resolution::Unauthenticated.principal().is_none());
    }
}
