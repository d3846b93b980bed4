//! # Architecture
//!
//! The (hypervisor, processor architecture) pair used to pick between
//! variants of the same gene. Either axis may be the wildcard `any`.
//!
//! Textual forms: `any`, `<hypervisor>` (processor `any`), and
//! `<hypervisor>/<processor>`. `any/<processor>` is accepted on input.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::IdentifierError;

/// Wildcard tag for either axis.
pub const ANY: &str = "any";

/// Hypervisor × processor architecture.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Architecture {
    hypervisor: String,
    processor: String,
}

impl Architecture {
    /// Create an architecture from its two tags, normalizing to lower case.
    ///
    /// # Errors
    ///
    /// Returns [`IdentifierError::InvalidArchitecture`] if a tag is empty or
    /// not alphanumeric.
    pub fn new(hypervisor: &str, processor: &str) -> Result<Self, IdentifierError> {
        let hypervisor = hypervisor.trim().to_ascii_lowercase();
        let processor = processor.trim().to_ascii_lowercase();
        for tag in [&hypervisor, &processor] {
            if tag.is_empty() || !tag.bytes().all(|b| b.is_ascii_alphanumeric()) {
                return Err(IdentifierError::InvalidArchitecture {
                    value: format!("{hypervisor}/{processor}"),
                    reason: format!("tag \"{tag}\" must be non-empty and alphanumeric"),
                });
            }
        }
        Ok(Self {
            hypervisor,
            processor,
        })
    }

    /// The fully unconstrained architecture `any/any`.
    pub fn any() -> Self {
        Self {
            hypervisor: ANY.to_string(),
            processor: ANY.to_string(),
        }
    }

    /// `hyperv/amd64`, the architecture catlets are built for unless a
    /// caller asks otherwise.
    pub fn hyperv_amd64() -> Self {
        Self {
            hypervisor: "hyperv".to_string(),
            processor: "amd64".to_string(),
        }
    }

    /// Parse `any`, `<hypervisor>` or `<hypervisor>/<processor>`.
    ///
    /// # Errors
    ///
    /// Returns [`IdentifierError::InvalidArchitecture`] for malformed input.
    pub fn parse(value: &str) -> Result<Self, IdentifierError> {
        let parts: Vec<&str> = value.trim().split('/').collect();
        match parts.as_slice() {
            [hypervisor] => Self::new(hypervisor, ANY),
            [hypervisor, processor] => Self::new(hypervisor, processor),
            _ => Err(IdentifierError::InvalidArchitecture {
                value: value.to_string(),
                reason: "expected <hypervisor>[/<processor>]".to_string(),
            }),
        }
    }

    /// The hypervisor tag.
    pub fn hypervisor(&self) -> &str {
        &self.hypervisor
    }

    /// The processor architecture tag.
    pub fn processor(&self) -> &str {
        &self.processor
    }

    /// Whether the hypervisor axis is the wildcard.
    pub fn is_any_hypervisor(&self) -> bool {
        self.hypervisor == ANY
    }

    /// Whether the processor axis is the wildcard.
    pub fn is_any_processor(&self) -> bool {
        self.processor == ANY
    }

    /// Whether both axes are the wildcard.
    pub fn is_any(&self) -> bool {
        self.is_any_hypervisor() && self.is_any_processor()
    }

    /// Same architecture with the processor axis widened to `any`.
    pub fn with_any_processor(&self) -> Self {
        Self {
            hypervisor: self.hypervisor.clone(),
            processor: ANY.to_string(),
        }
    }

    /// Same architecture with the hypervisor axis widened to `any`.
    pub fn with_any_hypervisor(&self) -> Self {
        Self {
            hypervisor: ANY.to_string(),
            processor: self.processor.clone(),
        }
    }

    /// Whether the hypervisor axes match (equal, or either is `any`).
    pub fn hypervisor_matches(&self, other: &Self) -> bool {
        self.is_any_hypervisor() || other.is_any_hypervisor() || self.hypervisor == other.hypervisor
    }

    /// Whether the processor axes match (equal, or either is `any`).
    pub fn processor_matches(&self, other: &Self) -> bool {
        self.is_any_processor() || other.is_any_processor() || self.processor == other.processor
    }

    /// Two architectures are compatible iff both axes match.
    pub fn is_compatible_with(&self, other: &Self) -> bool {
        self.hypervisor_matches(other) && self.processor_matches(other)
    }
}

impl Default for Architecture {
    fn default() -> Self {
        Self::any()
    }
}

impl fmt::Display for Architecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_any() {
            f.write_str(ANY)
        } else {
            write!(f, "{}/{}", self.hypervisor, self.processor)
        }
    }
}

impl FromStr for Architecture {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Architecture {
    type Error = IdentifierError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Architecture> for String {
    fn from(arch: Architecture) -> Self {
        arch.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arch(s: &str) -> Architecture {
        Architecture::parse(s).unwrap()
    }

    #[test]
    fn parse_forms() {
        assert!(arch("any").is_any());
        assert_eq!(arch("HyperV"), Architecture::new("hyperv", "any").unwrap());
        assert_eq!(arch("hyperv/x64").processor(), "x64");
        assert!(Architecture::parse("a/b/c").is_err());
        assert!(Architecture::parse("hyper-v").is_err());
        assert!(Architecture::parse("").is_err());
    }

    #[test]
    fn display_collapses_any() {
        assert_eq!(Architecture::any().to_string(), "any");
        assert_eq!(arch("hyperv").to_string(), "hyperv/any");
        assert_eq!(arch("hyperv/amd64").to_string(), "hyperv/amd64");
    }

    #[test]
    fn compatibility_rules() {
        let target = arch("hyperv/x64");
        assert!(target.is_compatible_with(&Architecture::any()));
        assert!(target.is_compatible_with(&arch("hyperv")));
        assert!(target.is_compatible_with(&arch("any/x64")));
        assert!(!target.is_compatible_with(&arch("kvm/x64")));
        assert!(!target.is_compatible_with(&arch("hyperv/arm64")));
    }

    #[test]
    fn widening() {
        let target = arch("hyperv/x64");
        assert_eq!(target.with_any_processor(), arch("hyperv"));
        assert_eq!(target.with_any_hypervisor(), arch("any/x64"));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn any_is_compatible_with_everything(hv in "[a-z0-9]{1,8}", proc in "[a-z0-9]{1,8}") {
                let a = Architecture::new(&hv, &proc).unwrap();
                prop_assert!(a.is_compatible_with(&Architecture::any()));
                prop_assert!(Architecture::any().is_compatible_with(&a));
            }

            #[test]
            fn compatibility_is_symmetric(
                a_hv in "(any|hyperv|kvm)", a_proc in "(any|x64|arm64)",
                b_hv in "(any|hyperv|kvm)", b_proc in "(any|x64|arm64)",
            ) {
                let a = Architecture::new(&a_hv, &a_proc).unwrap();
                let b = Architecture::new(&b_hv, &b_proc).unwrap();
                prop_assert_eq!(a.is_compatible_with(&b), b.is_compatible_with(&a));
            }
        }
    }
}
