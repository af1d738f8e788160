//! Natural-key identifier types with validation
//!
//! Patients are addressed by SSN, doctors and pharmacists by license number and
//! medications by name. Each key is a newtype so they cannot be mixed up at call sites.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Social security number identifying a patient
///
/// # Examples
///
/// ```
/// use pharmacy::domain::ids::Ssn;
/// use std::str::FromStr;
///
/// let ssn = Ssn::from_str("111-11-1111").unwrap();
/// assert_eq!(ssn.as_str(), "111-11-1111");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Ssn(String);

impl Ssn {
    /// Creates a new Ssn, rejecting blank input
    pub fn new(ssn: impl Into<String>) -> Result<Self, String> {
        let ssn = ssn.into().trim().to_string();
        if ssn.is_empty() {
            return Err("SSN cannot be empty".to_string());
        }
        Ok(Self(ssn))
    }

    /// Returns the SSN as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// License number identifying a doctor or a pharmacist
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LicenseNumber(String);

impl LicenseNumber {
    /// Creates a new LicenseNumber, rejecting blank input
    pub fn new(license: impl Into<String>) -> Result<Self, String> {
        let license = license.into().trim().to_string();
        if license.is_empty() {
            return Err("License number cannot be empty".to_string());
        }
        Ok(Self(license))
    }

    /// Returns the license number as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Unique catalog name of a medication
///
/// Names are compared exactly; "Amoxicillin" and "amoxicillin" are different keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MedicationName(String);

impl MedicationName {
    /// Creates a new MedicationName, rejecting blank input
    pub fn new(name: impl Into<String>) -> Result<Self, String> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err("Medication name cannot be empty".to_string());
        }
        Ok(Self(name))
    }

    /// Returns the medication name as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

macro_rules! natural_key_impls {
    ($ty:ident) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $ty {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }

        impl TryFrom<String> for $ty {
            type Error = String;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$ty> for String {
            fn from(value: $ty) -> Self {
                value.0
            }
        }

        impl AsRef<str> for $ty {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

natural_key_impls!(Ssn);
natural_key_impls!(LicenseNumber);
natural_key_impls!(MedicationName);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ssn_creation_trims() {
        let ssn = Ssn::new("  111-11-1111 ").unwrap();
        assert_eq!(ssn.as_str(), "111-11-1111");
    }

    #[test]
    fn test_empty_keys_fail() {
        assert!(Ssn::new("").is_err());
        assert!(LicenseNumber::new("   ").is_err());
        assert!(MedicationName::new("").is_err());
    }

    #[test]
    fn test_license_from_str() {
        let license: LicenseNumber = "D1".parse().unwrap();
        assert_eq!(license.to_string(), "D1");
    }

    #[test]
    fn test_serde_is_transparent_and_validating() {
        let name = MedicationName::new("Amoxicillin").unwrap();
        let json = serde_json::to_string(&name).unwrap();
        assert_eq!(json, "\"Amoxicillin\"");

        let back: MedicationName = serde_json::from_str(&json).unwrap();
        assert_eq!(back, name);

        assert!(serde_json::from_str::<MedicationName>("\"  \"").is_err());
    }
}
