/*!
Hôte factice pour tester la logique du plugin sans hôte réel

Implémentations contrôlées des capacités hôte (`MetricsSource`,
`PluginRegistry`) plus une fixture de snapshot plausible.
*/

use std::time::Duration;

use corvid_plugin_serverinfo::metrics::{
    CollectionError, DiskUsage, MetricsSnapshot, MetricsSource,
};
use corvid_plugin_serverinfo::registry::{PluginRegistry, PluginStatus, RegistryError};

/// Initialise le logging des tests (double init tolérée).
pub fn init_test_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Snapshot de référence, valeurs arbitraires mais plausibles.
pub fn sample_snapshot() -> MetricsSnapshot {
    MetricsSnapshot {
        cpu_percent: 12.5,
        cpu_count: 8,
        mem_total_bytes: 16 * 1024 * 1024 * 1024,
        mem_used_bytes: 6 * 1024 * 1024 * 1024,
        process_mem_bytes: Some(48 * 1024 * 1024),
        hostname: "corvid-host".to_string(),
        platform: "Debian GNU/Linux 12 / 6.1.0 / x86_64".to_string(),
        runtime_version: "0.1.0".to_string(),
        pid: 4242,
        load_avg: Some([0.42, 0.36, 0.30]),
        disk: Some(DiskUsage {
            mount_point: "/".to_string(),
            total_bytes: 512 * 1024 * 1024 * 1024,
            used_bytes: 128 * 1024 * 1024 * 1024,
        }),
        uptime: Duration::from_secs(3725),
    }
}

/// Source de métriques contrôlée par le test.
pub struct FakeMetricsSource {
    snapshot: Option<MetricsSnapshot>,
}

impl FakeMetricsSource {
    /// Renvoie toujours le même snapshot.
    pub fn returning(snapshot: MetricsSnapshot) -> Self {
        Self {
            snapshot: Some(snapshot),
        }
    }

    /// Échoue à chaque collecte.
    pub fn failing() -> Self {
        Self { snapshot: None }
    }
}

impl MetricsSource for FakeMetricsSource {
    fn collect(&self) -> Result<MetricsSnapshot, CollectionError> {
        self.snapshot
            .clone()
            .ok_or(CollectionError::Unsupported("fake"))
    }
}

/// Registre de plugins contrôlé par le test.
pub struct FakePluginRegistry {
    plugins: Option<Vec<PluginStatus>>,
}

impl FakePluginRegistry {
    pub fn with_plugins(plugins: Vec<PluginStatus>) -> Self {
        Self {
            plugins: Some(plugins),
        }
    }

    /// Hôte sans registre exposé.
    pub fn unavailable() -> Self {
        Self { plugins: None }
    }
}

impl PluginRegistry for FakePluginRegistry {
    fn list_plugins(&self) -> Result<Vec<PluginStatus>, RegistryError> {
        self.plugins.clone().ok_or(RegistryError::Unavailable)
    }
}
