//! # Catlet Configuration Model
//!
//! The declarative configuration of a catlet, as written by users, stored
//! inside catlet genes, and produced by the resolution pipeline.
//!
//! Every mergeable field is optional so that breeding can distinguish an
//! unset child field (inherit) from one explicitly set. Serialized field
//! names are snake_case; empty lists and unset options are omitted.

use serde::{Deserialize, Serialize};

/// How a child entry combines with the same-named parent entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationType {
    /// Unset child fields inherit the parent's values.
    #[default]
    Merge,
    /// Drop the parent's entry.
    Remove,
    /// Replace the parent's entry wholesale with the child's.
    Overwrite,
}

/// Declared type of a variable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariableType {
    /// Any string.
    #[default]
    String,
    /// A finite decimal number.
    Number,
    /// Exactly `true` or `false`.
    Boolean,
}

impl VariableType {
    /// Returns the lowercase type name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
        }
    }
}

/// Kind of virtual drive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CatletDriveType {
    /// Virtual hard disk; may be sourced from a volume gene.
    #[default]
    Vhd,
    /// Virtual hard disk shared between catlets.
    SharedVhd,
    /// Virtual hard disk set.
    VhdSet,
    /// Optical drive.
    Dvd,
    /// Physical disk pass-through.
    Phd,
}

/// The configuration of a catlet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatletConfig {
    /// Catlet name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Project the catlet belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    /// Environment of the catlet.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,
    /// Storage store identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store: Option<String>,
    /// Storage location identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Guest host name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    /// Parent geneset (`org/set[/tag]`) whose catlet gene this catlet breeds from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    /// Processor configuration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu: Option<CatletCpuConfig>,
    /// Memory configuration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory: Option<CatletMemoryConfig>,
    /// Virtual drives.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub drives: Vec<CatletDriveConfig>,
    /// Virtual network adapters.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub network_adapters: Vec<CatletNetworkAdapterConfig>,
    /// Network attachments.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub networks: Vec<CatletNetworkConfig>,
    /// Hypervisor capabilities.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub capabilities: Vec<CatletCapabilityConfig>,
    /// Catlet-level variables.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub variables: Vec<VariableConfig>,
    /// Fodder fragments and fodder gene references.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fodder: Vec<FodderConfig>,
}

/// Processor configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatletCpuConfig {
    /// Number of virtual processors.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,
}

/// Memory configuration, in MiB.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatletMemoryConfig {
    /// Startup memory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub startup: Option<u64>,
    /// Minimum dynamic memory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<u64>,
    /// Maximum dynamic memory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum: Option<u64>,
}

/// A virtual drive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatletDriveConfig {
    /// Drive name; the merge key.
    pub name: String,
    /// How this entry combines with a same-named parent drive.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mutation: Option<MutationType>,
    /// Drive kind.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub drive_type: Option<CatletDriveType>,
    /// Storage location identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Storage store identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store: Option<String>,
    /// Volume gene reference or an opaque local path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Size in GiB.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

/// A virtual network adapter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatletNetworkAdapterConfig {
    /// Adapter name; the merge key.
    pub name: String,
    /// How this entry combines with a same-named parent adapter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mutation: Option<MutationType>,
    /// Static MAC address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mac_address: Option<String>,
}

/// A network attachment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatletNetworkConfig {
    /// Network name; the merge key.
    pub name: String,
    /// How this entry combines with a same-named parent network.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mutation: Option<MutationType>,
    /// Adapter connected to the network.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adapter_name: Option<String>,
    /// IPv4 subnet selection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subnet_v4: Option<CatletSubnetConfig>,
    /// IPv6 subnet selection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subnet_v6: Option<CatletSubnetConfig>,
}

/// Subnet selection of a network attachment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatletSubnetConfig {
    /// Subnet name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// IP pool name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_pool: Option<String>,
}

/// A hypervisor capability (e.g. `nested_virtualization`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatletCapabilityConfig {
    /// Capability name; the merge key.
    pub name: String,
    /// How this entry combines with a same-named parent capability.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mutation: Option<MutationType>,
    /// Capability details.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<String>>,
}

/// A variable declaration or binding.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableConfig {
    /// Variable name.
    pub name: String,
    /// Declared type; `string` when unset.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub variable_type: Option<VariableType>,
    /// Value, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Whether the value must be treated as secret.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret: Option<bool>,
    /// Whether a value must be supplied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
}

impl VariableConfig {
    /// Declared type, defaulting to [`VariableType::String`].
    pub fn effective_type(&self) -> VariableType {
        self.variable_type.unwrap_or_default()
    }

    /// Whether the variable is secret.
    pub fn is_secret(&self) -> bool {
        self.secret.unwrap_or(false)
    }

    /// Whether the variable is required.
    pub fn is_required(&self) -> bool {
        self.required.unwrap_or(false)
    }
}

/// A fodder fragment, or a reference to a fodder gene.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FodderConfig {
    /// Fragment name; first half of the merge identity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Fodder gene reference; second half of the merge identity. Unset for
    /// local fodder.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// How this entry combines with the parent entry of the same identity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mutation: Option<MutationType>,
    /// Content type (e.g. `cloud-config`, `shellscript`).
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub fodder_type: Option<String>,
    /// File name the content is delivered as.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    /// The fragment content; may contain `{{ variable }}` placeholders.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Whether the content must be treated as secret.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret: Option<bool>,
    /// Marks this entry as a removal of matching fodder.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remove: Option<bool>,
    /// Fodder-local variables, or bindings for a fodder gene's variables.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub variables: Vec<VariableConfig>,
}

impl FodderConfig {
    /// Whether this entry asks for matching fodder to be removed.
    pub fn is_removal(&self) -> bool {
        self.remove.unwrap_or(false)
    }

    /// Whether the content is secret.
    pub fn is_secret(&self) -> bool {
        self.secret.unwrap_or(false)
    }
}

/// Content of a fodder gene, as published by package authors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FodderGeneConfig {
    /// Gene name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Variables shared by all fragments of the gene.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub variables: Vec<VariableConfig>,
    /// The fragments.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fodder: Vec<FodderConfig>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_snake_case_config() {
        let json = r#"{
            "parent": "dbosoft/utt/latest",
            "cpu": {"count": 2},
            "drives": [{"name": "sda", "type": "shared_vhd", "size": 50}],
            "networks": [{"name": "default", "adapter_name": "eth0",
                          "subnet_v4": {"name": "main", "ip_pool": "default"}}],
            "capabilities": [{"name": "nested_virtualization", "mutation": "remove"}],
            "variables": [{"name": "x", "type": "boolean", "value": "true"}],
            "fodder": [{"name": "f", "type": "cloud-config", "content": "x", "remove": false}]
        }"#;
        let config: CatletConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.parent.as_deref(), Some("dbosoft/utt/latest"));
        assert_eq!(config.cpu.unwrap().count, Some(2));
        assert_eq!(config.drives[0].drive_type, Some(CatletDriveType::SharedVhd));
        assert_eq!(
            config.networks[0].subnet_v4.as_ref().unwrap().ip_pool.as_deref(),
            Some("default")
        );
        assert_eq!(config.capabilities[0].mutation, Some(MutationType::Remove));
        assert_eq!(config.variables[0].effective_type(), VariableType::Boolean);
        assert_eq!(config.fodder[0].fodder_type.as_deref(), Some("cloud-config"));
        assert!(!config.fodder[0].is_removal());
    }

    #[test]
    fn serialize_omits_unset_fields() {
        let config = CatletConfig {
            name: Some("cat".to_string()),
            ..Default::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(json, r#"{"name":"cat"}"#);
    }

    #[test]
    fn variable_defaults() {
        let v = VariableConfig {
            name: "v".to_string(),
            ..Default::default()
        };
        assert_eq!(v.effective_type(), VariableType::String);
        assert!(!v.is_secret());
        assert!(!v.is_required());
    }

    #[test]
    fn fodder_gene_config_parses() {
        let json = r#"{
            "name": "test-fodder",
            "variables": [{"name": "v", "required": true}],
            "fodder": [{"name": "food1", "content": "a"}, {"name": "food2", "content": "b"}]
        }"#;
        let gene: FodderGeneConfig = serde_json::from_str(json).unwrap();
        assert_eq!(gene.fodder.len(), 2);
        assert!(gene.variables[0].is_required());
    }
}
