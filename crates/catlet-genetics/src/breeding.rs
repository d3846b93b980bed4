//! # Breeding
//!
//! Merges a parent configuration and a child configuration into one.
//!
//! ## Rules
//!
//! - **Scalars** (naming, placement, cpu, memory): the child's value wins
//!   when set.
//! - **Named lists** (capabilities, drives, network adapters, networks):
//!   merged by name. The child entry's `mutation` decides what happens to a
//!   same-named parent entry: `merge` fills the child's unset fields from
//!   the parent, `overwrite` replaces it, `remove` drops it. Parent-only
//!   entries are kept, child-only entries appended.
//! - **Fodder**: named entries are merged by (`name`, `source`) with
//!   [`merge_fodder`]. Unnamed entries are kept as they are.
//! - **Variables**: merged by name; the child's declaration replaces the
//!   parent's.
//!
//! Parent entries that implicitly come from the parent's catlet gene get
//! an explicit source: a `vhd` drive without source becomes
//! `gene:<parent>:<drive>`, and local fodder becomes
//! `gene:<parent>:catlet`.

use catlet_core::{
    format_gene_reference, CatletCapabilityConfig, CatletConfig, CatletCpuConfig,
    CatletDriveConfig, CatletDriveType, CatletMemoryConfig, CatletNetworkAdapterConfig,
    CatletNetworkConfig, FodderConfig, GeneName, GeneSetIdentifier, MutationType, VariableConfig,
};

use crate::error::{aggregate_all, GeneticsResult, ResultExt};

/// An entry of a list merged by name.
pub trait NamedEntry: Clone {
    /// The merge key.
    fn name(&self) -> &str;
    /// The requested mutation.
    fn mutation(&self) -> Option<MutationType>;
    /// Drop the mutation once it has been applied.
    fn clear_mutation(&mut self);
    /// Fill unset fields of `self` from `parent`.
    fn inherit(&self, parent: &Self) -> Self;
}

macro_rules! named_entry {
    ($ty:ty, |$child:ident, $parent:ident| $inherit:expr) => {
        impl NamedEntry for $ty {
            fn name(&self) -> &str {
                &self.name
            }

            fn mutation(&self) -> Option<MutationType> {
                self.mutation
            }

            fn clear_mutation(&mut self) {
                self.mutation = None;
            }

            fn inherit(&self, parent: &Self) -> Self {
                let $child = self;
                let $parent = parent;
                $inherit
            }
        }
    };
}

named_entry!(CatletCapabilityConfig, |child, parent| CatletCapabilityConfig {
    name: child.name.clone(),
    mutation: None,
    details: child.details.clone().or_else(|| parent.details.clone()),
});

named_entry!(CatletDriveConfig, |child, parent| CatletDriveConfig {
    name: child.name.clone(),
    mutation: None,
    drive_type: child.drive_type.or(parent.drive_type),
    location: child.location.clone().or_else(|| parent.location.clone()),
    store: child.store.clone().or_else(|| parent.store.clone()),
    source: child.source.clone().or_else(|| parent.source.clone()),
    size: child.size.or(parent.size),
});

named_entry!(CatletNetworkAdapterConfig, |child, parent| CatletNetworkAdapterConfig {
    name: child.name.clone(),
    mutation: None,
    mac_address: child
        .mac_address
        .clone()
        .or_else(|| parent.mac_address.clone()),
});

named_entry!(CatletNetworkConfig, |child, parent| CatletNetworkConfig {
    name: child.name.clone(),
    mutation: None,
    adapter_name: child
        .adapter_name
        .clone()
        .or_else(|| parent.adapter_name.clone()),
    subnet_v4: child.subnet_v4.clone().or_else(|| parent.subnet_v4.clone()),
    subnet_v6: child.subnet_v6.clone().or_else(|| parent.subnet_v6.clone()),
});

/// Merge two lists by name, applying each child entry's mutation.
pub fn merge_by_name<T: NamedEntry>(parent: &[T], child: &[T]) -> Vec<T> {
    let mut merged = Vec::with_capacity(parent.len() + child.len());
    for entry in parent {
        let Some(override_) = child.iter().find(|c| c.name() == entry.name()) else {
            merged.push(entry.clone());
            continue;
        };
        match override_.mutation().unwrap_or_default() {
            MutationType::Remove => {}
            MutationType::Overwrite => {
                let mut replaced = override_.clone();
                replaced.clear_mutation();
                merged.push(replaced);
            }
            MutationType::Merge => merged.push(override_.inherit(entry)),
        }
    }
    for entry in child {
        if parent.iter().any(|p| p.name() == entry.name())
            || entry.mutation() == Some(MutationType::Remove)
        {
            continue;
        }
        let mut added = entry.clone();
        added.clear_mutation();
        merged.push(added);
    }
    merged
}

/// Merge `later` onto `earlier`, two fodder entries of the same identity.
///
/// - A removal marker (`remove = true` without content) or a `remove`
///   mutation yields a marker.
/// - An `overwrite` mutation replaces the earlier entry.
/// - Otherwise set fields of `later` win. Variables are replaced wholesale
///   when `later` supplies content and merged by name otherwise.
pub fn merge_fodder(earlier: &FodderConfig, later: &FodderConfig) -> FodderConfig {
    let is_marker = (later.is_removal() && later.content.is_none())
        || later.mutation == Some(MutationType::Remove);
    if is_marker {
        return FodderConfig {
            name: later.name.clone(),
            source: later.source.clone(),
            remove: Some(true),
            ..Default::default()
        };
    }
    if later.mutation == Some(MutationType::Overwrite) {
        return FodderConfig {
            mutation: None,
            ..later.clone()
        };
    }

    let variables = if later.content.is_some() {
        later.variables.clone()
    } else {
        merge_variables(&earlier.variables, &later.variables)
    };
    FodderConfig {
        name: later.name.clone().or_else(|| earlier.name.clone()),
        source: later.source.clone().or_else(|| earlier.source.clone()),
        mutation: None,
        fodder_type: later
            .fodder_type
            .clone()
            .or_else(|| earlier.fodder_type.clone()),
        filename: later.filename.clone().or_else(|| earlier.filename.clone()),
        content: later.content.clone().or_else(|| earlier.content.clone()),
        secret: later.secret.or(earlier.secret),
        remove: later.remove,
        variables,
    }
}

/// Merge variable declarations by name. A later declaration replaces an
/// earlier one; new names are appended.
pub fn merge_variables(
    earlier: &[VariableConfig],
    later: &[VariableConfig],
) -> Vec<VariableConfig> {
    let mut merged: Vec<VariableConfig> = earlier
        .iter()
        .map(|e| {
            later
                .iter()
                .find(|l| l.name == e.name)
                .unwrap_or(e)
                .clone()
        })
        .collect();
    merged.extend(
        later
            .iter()
            .filter(|l| !earlier.iter().any(|e| e.name == l.name))
            .cloned(),
    );
    merged
}

/// Merge identity of a fodder entry. Unnamed fodder has none and is never
/// merged; whole-source removal of unnamed references happens when feeding.
pub fn fodder_key(fodder: &FodderConfig) -> Option<(&str, Option<&str>)> {
    Some((fodder.name.as_deref()?, fodder.source.as_deref()))
}

/// Merge a sequence of fodder entries: entries sharing an identity are
/// folded left to right with [`merge_fodder`] into the position of the
/// first one.
pub fn merge_fodder_list<'a>(
    entries: impl IntoIterator<Item = &'a FodderConfig>,
) -> Vec<FodderConfig> {
    let mut merged: Vec<FodderConfig> = Vec::new();
    let mut keys: Vec<Option<(String, Option<String>)>> = Vec::new();
    for entry in entries {
        let key = fodder_key(entry).map(|(n, s)| (n.to_string(), s.map(str::to_string)));
        let existing = key
            .as_ref()
            .and_then(|k| keys.iter().position(|other| other.as_ref() == Some(k)));
        match existing {
            Some(index) => {
                let folded = merge_fodder(&merged[index], entry);
                merged[index] = folded;
            }
            None => {
                merged.push(entry.clone());
                keys.push(key);
            }
        }
    }
    merged
}

fn breed_fodder(
    parent: &[FodderConfig],
    child: &[FodderConfig],
    parent_id: &GeneSetIdentifier,
) -> Vec<FodderConfig> {
    // Merging keeps first positions, so the parent's entries come first.
    let parent_entries = merge_fodder_list(parent).len();
    let mut merged = merge_fodder_list(parent.iter().chain(child));
    let catlet_source = format_gene_reference(parent_id, &GeneName::catlet());
    for entry in merged.iter_mut().take(parent_entries) {
        let overridden = fodder_key(entry)
            .is_some_and(|key| child.iter().any(|c| fodder_key(c) == Some(key)));
        if entry.source.is_none() && !overridden {
            entry.source = Some(catlet_source.clone());
        }
    }
    merged
}

fn attribute_parent_drives(
    drives: &[CatletDriveConfig],
    parent_id: &GeneSetIdentifier,
) -> GeneticsResult<Vec<CatletDriveConfig>> {
    aggregate_all(drives.iter().map(|drive| -> GeneticsResult<CatletDriveConfig> {
        let is_vhd = drive.drive_type.unwrap_or_default() == CatletDriveType::Vhd;
        let mut drive = drive.clone();
        if is_vhd && drive.source.is_none() {
            let name = GeneName::new(&drive.name).with_context(|| {
                format!("invalid drive name at Drives[Name={}]", drive.name)
            })?;
            drive.source = Some(format_gene_reference(parent_id, &name));
        }
        Ok(drive)
    }))
}

fn breed_cpu(
    parent: &Option<CatletCpuConfig>,
    child: &Option<CatletCpuConfig>,
) -> Option<CatletCpuConfig> {
    match (parent, child) {
        (Some(p), Some(c)) => Some(CatletCpuConfig {
            count: c.count.or(p.count),
        }),
        (p, c) => c.clone().or_else(|| p.clone()),
    }
}

fn breed_memory(
    parent: &Option<CatletMemoryConfig>,
    child: &Option<CatletMemoryConfig>,
) -> Option<CatletMemoryConfig> {
    match (parent, child) {
        (Some(p), Some(c)) => Some(CatletMemoryConfig {
            startup: c.startup.or(p.startup),
            minimum: c.minimum.or(p.minimum),
            maximum: c.maximum.or(p.maximum),
        }),
        (p, c) => c.clone().or_else(|| p.clone()),
    }
}

/// Breed `child` with its resolved `parent`, stored in the geneset
/// `parent_id`.
///
/// # Errors
///
/// Every parent `vhd` drive without a source whose name is not a valid gene
/// name, since its disk cannot be attributed to the parent's catlet gene.
pub fn breed(
    parent: &CatletConfig,
    child: &CatletConfig,
    parent_id: &GeneSetIdentifier,
) -> GeneticsResult<CatletConfig> {
    let inherit = |c: &Option<String>, p: &Option<String>| c.clone().or_else(|| p.clone());
    let parent_drives = attribute_parent_drives(&parent.drives, parent_id)?;

    Ok(CatletConfig {
        name: inherit(&child.name, &parent.name),
        project: inherit(&child.project, &parent.project),
        environment: inherit(&child.environment, &parent.environment),
        store: inherit(&child.store, &parent.store),
        location: inherit(&child.location, &parent.location),
        hostname: inherit(&child.hostname, &parent.hostname),
        parent: child.parent.clone(),
        cpu: breed_cpu(&parent.cpu, &child.cpu),
        memory: breed_memory(&parent.memory, &child.memory),
        drives: merge_by_name(&parent_drives, &child.drives),
        network_adapters: merge_by_name(&parent.network_adapters, &child.network_adapters),
        networks: merge_by_name(&parent.networks, &child.networks),
        capabilities: merge_by_name(&parent.capabilities, &child.capabilities),
        variables: merge_variables(&parent.variables, &child.variables),
        fodder: breed_fodder(&parent.fodder, &child.fodder, parent_id),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parent_id() -> GeneSetIdentifier {
        GeneSetIdentifier::parse("dbosoft/utt/1.0").unwrap()
    }

    fn capability(
        name: &str,
        details: &[&str],
        mutation: Option<MutationType>,
    ) -> CatletCapabilityConfig {
        CatletCapabilityConfig {
            name: name.to_string(),
            mutation,
            details: Some(details.iter().map(|d| d.to_string()).collect()),
        }
    }

    fn fodder(name: &str, source: Option<&str>, content: Option<&str>) -> FodderConfig {
        FodderConfig {
            name: Some(name.to_string()),
            source: source.map(str::to_string),
            content: content.map(str::to_string),
            ..Default::default()
        }
    }

    fn var(name: &str, value: &str) -> VariableConfig {
        VariableConfig {
            name: name.to_string(),
            value: Some(value.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn scalars_inherit_when_unset() {
        let parent = CatletConfig {
            name: Some("parent".into()),
            project: Some("p".into()),
            hostname: Some("host".into()),
            cpu: Some(CatletCpuConfig { count: Some(4) }),
            memory: Some(CatletMemoryConfig {
                startup: Some(2048),
                minimum: Some(512),
                maximum: None,
            }),
            ..Default::default()
        };
        let child = CatletConfig {
            name: Some("child".into()),
            memory: Some(CatletMemoryConfig {
                startup: Some(4096),
                ..Default::default()
            }),
            ..Default::default()
        };
        let bred = breed(&parent, &child, &parent_id()).unwrap();
        assert_eq!(bred.name.as_deref(), Some("child"));
        assert_eq!(bred.project.as_deref(), Some("p"));
        assert_eq!(bred.hostname.as_deref(), Some("host"));
        assert_eq!(bred.cpu, Some(CatletCpuConfig { count: Some(4) }));
        let memory = bred.memory.unwrap();
        assert_eq!(memory.startup, Some(4096));
        assert_eq!(memory.minimum, Some(512));
    }

    #[test]
    fn capabilities_union_with_child_precedence() {
        let parent = CatletConfig {
            capabilities: vec![
                capability("nested_virtualization", &["a"], None),
                capability("secure_boot", &["template:MicrosoftUEFI"], None),
                capability("tpm", &[], None),
                capability("dynamic_memory", &["x"], None),
            ],
            ..Default::default()
        };
        let child = CatletConfig {
            capabilities: vec![
                capability("secure_boot", &["off"], None),
                capability("tpm", &[], Some(MutationType::Remove)),
                capability("dynamic_memory", &["y"], Some(MutationType::Overwrite)),
                capability("new_one", &[], None),
            ],
            ..Default::default()
        };
        let bred = breed(&parent, &child, &parent_id()).unwrap();
        let names: Vec<&str> = bred.capabilities.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["nested_virtualization", "secure_boot", "dynamic_memory", "new_one"]
        );
        assert_eq!(bred.capabilities[1].details, Some(vec!["off".to_string()]));
        assert_eq!(bred.capabilities[2].details, Some(vec!["y".to_string()]));
        assert!(bred.capabilities.iter().all(|c| c.mutation.is_none()));
    }

    #[test]
    fn parent_vhd_without_source_points_at_the_parent_gene() {
        let parent = CatletConfig {
            drives: vec![
                CatletDriveConfig {
                    name: "sda".into(),
                    size: Some(100),
                    ..Default::default()
                },
                CatletDriveConfig {
                    name: "cd".into(),
                    drive_type: Some(CatletDriveType::Dvd),
                    ..Default::default()
                },
            ],
            ..Default::default()
        };
        let child = CatletConfig {
            drives: vec![CatletDriveConfig {
                name: "sda".into(),
                size: Some(200),
                ..Default::default()
            }],
            ..Default::default()
        };
        let bred = breed(&parent, &child, &parent_id()).unwrap();
        assert_eq!(bred.drives[0].source.as_deref(), Some("gene:dbosoft/utt/1.0:sda"));
        assert_eq!(bred.drives[0].size, Some(200));
        assert_eq!(bred.drives[1].source, None);
    }

    #[test]
    fn local_parent_fodder_is_attributed_to_the_parent_catlet() {
        let parent = CatletConfig {
            fodder: vec![
                fodder("setup", None, Some("parent")),
                fodder("kept", None, Some("kept")),
            ],
            ..Default::default()
        };
        let child = CatletConfig {
            fodder: vec![fodder("setup", None, Some("child"))],
            ..Default::default()
        };
        let bred = breed(&parent, &child, &parent_id()).unwrap();
        assert_eq!(bred.fodder.len(), 2);
        assert_eq!(bred.fodder[0].content.as_deref(), Some("child"));
        assert_eq!(bred.fodder[0].source, None);
        assert_eq!(
            bred.fodder[1].source.as_deref(),
            Some("gene:dbosoft/utt/1.0:catlet")
        );
    }

    #[test]
    fn fodder_merge_replaces_variables_with_content() {
        let mut earlier = fodder("f", Some("gene:a/b/1.0:x"), Some("old"));
        earlier.variables = vec![var("a", "1"), var("b", "2")];
        earlier.filename = Some("file.yml".into());

        let mut with_content = fodder("f", Some("gene:a/b/1.0:x"), Some("new"));
        with_content.variables = vec![var("c", "3")];
        let merged = merge_fodder(&earlier, &with_content);
        assert_eq!(merged.content.as_deref(), Some("new"));
        assert_eq!(merged.filename.as_deref(), Some("file.yml"));
        assert_eq!(merged.variables, vec![var("c", "3")]);

        let mut without_content = fodder("f", Some("gene:a/b/1.0:x"), None);
        without_content.variables = vec![var("b", "20"), var("c", "3")];
        let merged = merge_fodder(&earlier, &without_content);
        assert_eq!(merged.content.as_deref(), Some("old"));
        assert_eq!(
            merged.variables,
            vec![var("a", "1"), var("b", "20"), var("c", "3")]
        );
    }

    #[test]
    fn removal_marker_is_inherited_as_marker() {
        let parent = CatletConfig {
            fodder: vec![fodder("food1", Some("gene:acme/food/1.0:food"), None)],
            ..Default::default()
        };
        let mut marker = fodder("food1", Some("gene:acme/food/1.0:food"), None);
        marker.remove = Some(true);
        let child = CatletConfig {
            fodder: vec![marker],
            ..Default::default()
        };
        let bred = breed(&parent, &child, &parent_id()).unwrap();
        assert_eq!(bred.fodder.len(), 1);
        assert!(bred.fodder[0].is_removal());
        assert_eq!(bred.fodder[0].content, None);
    }

    #[test]
    fn unnamed_local_fodder_is_never_merged() {
        let entries = vec![
            FodderConfig {
                content: Some("a".into()),
                ..Default::default()
            },
            FodderConfig {
                content: Some("b".into()),
                ..Default::default()
            },
        ];
        assert_eq!(merge_fodder_list(&entries).len(), 2);
    }

    #[test]
    fn unnamed_parent_fodder_survives_attribution() {
        let parent: CatletConfig =
            serde_json::from_str(r#"{"fodder":[{"content":"first"},{"content":"second"}]}"#)
                .unwrap();
        let bred = breed(&parent, &CatletConfig::default(), &parent_id()).unwrap();
        let contents: Vec<_> = bred.fodder.iter().map(|f| f.content.as_deref()).collect();
        assert_eq!(contents, vec![Some("first"), Some("second")]);
        assert!(bred
            .fodder
            .iter()
            .all(|f| f.source.as_deref() == Some("gene:dbosoft/utt/1.0:catlet")));
    }

    #[test]
    fn unnamed_entries_of_one_source_are_not_merged() {
        let source = Some("gene:acme/food/1.0:food".to_string());
        let entries = vec![
            FodderConfig {
                source: source.clone(),
                content: Some("a".into()),
                ..Default::default()
            },
            FodderConfig {
                source,
                content: Some("b".into()),
                ..Default::default()
            },
        ];
        assert_eq!(merge_fodder_list(&entries).len(), 2);
        assert_eq!(fodder_key(&entries[0]), None);
    }

    #[test]
    fn parent_drive_with_invalid_gene_name_is_an_error() {
        let parent = CatletConfig {
            drives: vec![
                CatletDriveConfig {
                    name: "data_1".into(),
                    ..Default::default()
                },
                CatletDriveConfig {
                    name: "sda".into(),
                    ..Default::default()
                },
            ],
            ..Default::default()
        };
        let err = breed(&parent, &CatletConfig::default(), &parent_id()).unwrap_err();
        assert!(format!("{err}").contains("Drives[Name=data_1]"));
        assert!(matches!(
            err.root_cause(),
            crate::error::GeneticsError::Identifier(_)
        ));

        let sourced = CatletConfig {
            drives: vec![CatletDriveConfig {
                name: "data_1".into(),
                source: Some("C:\\disks\\data.vhdx".into()),
                ..Default::default()
            }],
            ..Default::default()
        };
        assert!(breed(&sourced, &CatletConfig::default(), &parent_id()).is_ok());
    }

    #[test]
    fn variables_replace_by_name() {
        let parent = CatletConfig {
            variables: vec![var("a", "1"), var("b", "2")],
            ..Default::default()
        };
        let child = CatletConfig {
            variables: vec![var("b", "x"), var("c", "3")],
            ..Default::default()
        };
        let bred = breed(&parent, &child, &parent_id()).unwrap();
        assert_eq!(bred.variables, vec![var("a", "1"), var("b", "x"), var("c", "3")]);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn unset_child_scalars_are_inherited(
                name in proptest::option::of("[a-z]{1,8}"),
                project in proptest::option::of("[a-z]{1,8}"),
                hostname in proptest::option::of("[a-z]{1,8}"),
                count in proptest::option::of(1u32..64),
            ) {
                let parent = CatletConfig {
                    name: Some("p-name".into()),
                    project: Some("p-project".into()),
                    hostname: Some("p-host".into()),
                    cpu: Some(CatletCpuConfig { count: Some(2) }),
                    ..Default::default()
                };
                let child = CatletConfig {
                    name: name.clone(),
                    project: project.clone(),
                    hostname: hostname.clone(),
                    cpu: Some(CatletCpuConfig { count }),
                    ..Default::default()
                };
                let bred = breed(&parent, &child, &parent_id()).unwrap();
                prop_assert_eq!(bred.name, name.or(Some("p-name".into())));
                prop_assert_eq!(bred.project, project.or(Some("p-project".into())));
                prop_assert_eq!(bred.hostname, hostname.or(Some("p-host".into())));
                prop_assert_eq!(bred.cpu.and_then(|c| c.count), count.or(Some(2)));
            }

            #[test]
            fn capability_union_contains_every_surviving_name(
                parent_names in proptest::collection::btree_set("[a-z]{1,6}", 0..6),
                child_names in proptest::collection::btree_set("[a-z]{1,6}", 0..6),
            ) {
                let parent = CatletConfig {
                    capabilities: parent_names.iter().map(|n| capability(n, &["p"], None)).collect(),
                    ..Default::default()
                };
                let child = CatletConfig {
                    capabilities: child_names.iter().map(|n| capability(n, &["c"], None)).collect(),
                    ..Default::default()
                };
                let bred = breed(&parent, &child, &parent_id()).unwrap();
                let expected: std::collections::BTreeSet<&String> =
                    parent_names.iter().chain(child_names.iter()).collect();
                prop_assert_eq!(bred.capabilities.len(), expected.len());
                for capability in &bred.capabilities {
                    let wanted = if child_names.contains(&capability.name) { "c" } else { "p" };
                    prop_assert_eq!(capability.details.clone(), Some(vec![wanted.to_string()]));
                }
            }
        }
    }
}
