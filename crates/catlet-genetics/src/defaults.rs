//! # Late Defaults
//!
//! Applied once the pedigree has been bred into a single configuration:
//! fills the values every provisioned catlet needs and strips mutation
//! markers that have already been applied.

use catlet_core::{
    CatletConfig, CatletCpuConfig, CatletDriveType, CatletMemoryConfig,
    CatletNetworkAdapterConfig, CatletNetworkConfig, MutationType,
};

/// Catlet name when none is set.
pub const DEFAULT_CATLET_NAME: &str = "catlet";
/// Processor count when none is set.
pub const DEFAULT_CPU_COUNT: u32 = 1;
/// Startup memory in MiB when none is set.
pub const DEFAULT_STARTUP_MEMORY: u64 = 1024;
/// Network attached when the configuration has none.
pub const DEFAULT_NETWORK_NAME: &str = "default";
/// Adapter networks are connected to when none is named.
pub const DEFAULT_ADAPTER_NAME: &str = "eth0";

fn is_removed(mutation: Option<MutationType>) -> bool {
    mutation == Some(MutationType::Remove)
}

/// Apply late defaults to a bred configuration.
pub fn apply_late_defaults(config: &CatletConfig) -> CatletConfig {
    let mut result = config.clone();

    result
        .name
        .get_or_insert_with(|| DEFAULT_CATLET_NAME.to_string());

    let cpu = result.cpu.get_or_insert_with(CatletCpuConfig::default);
    cpu.count.get_or_insert(DEFAULT_CPU_COUNT);

    let memory = result.memory.get_or_insert_with(CatletMemoryConfig::default);
    memory.startup.get_or_insert(DEFAULT_STARTUP_MEMORY);

    result.drives.retain(|d| !is_removed(d.mutation));
    for drive in &mut result.drives {
        drive.mutation = None;
        drive.drive_type.get_or_insert(CatletDriveType::Vhd);
    }

    result.capabilities.retain(|c| !is_removed(c.mutation));
    for capability in &mut result.capabilities {
        capability.mutation = None;
    }

    result.networks.retain(|n| !is_removed(n.mutation));
    if result.networks.is_empty() {
        result.networks.push(CatletNetworkConfig {
            name: DEFAULT_NETWORK_NAME.to_string(),
            ..Default::default()
        });
    }
    for network in &mut result.networks {
        network.mutation = None;
        network
            .adapter_name
            .get_or_insert_with(|| DEFAULT_ADAPTER_NAME.to_string());
    }

    result.network_adapters.retain(|a| !is_removed(a.mutation));
    for adapter in &mut result.network_adapters {
        adapter.mutation = None;
    }
    for network in &result.networks {
        let Some(adapter_name) = &network.adapter_name else {
            continue;
        };
        if !result
            .network_adapters
            .iter()
            .any(|a| &a.name == adapter_name)
        {
            result.network_adapters.push(CatletNetworkAdapterConfig {
                name: adapter_name.clone(),
                ..Default::default()
            });
        }
    }

    result
}
