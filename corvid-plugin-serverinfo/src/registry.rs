//! Vue sur le registre de plugins de l'hôte.
//!
//! L'hôte publie l'état complet du registre sur `corvid/plugins/state@v1`
//! (retained + à chaque changement) ; le plugin ne fait que conserver la
//! dernière publication et la resservir à la demande.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// Etat d'un plugin tel qu'annoncé par l'hôte
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginStatus {
    pub name: String,
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// L'hôte n'a jamais exposé son registre sur le bus
    #[error("plugin registry unavailable")]
    Unavailable,
}

/// Capacité hôte : énumérer les plugins installés et leur état
pub trait PluginRegistry: Send + Sync {
    /// Ordre d'énumération de l'hôte préservé tel quel.
    fn list_plugins(&self) -> Result<Vec<PluginStatus>, RegistryError>;
}

/// Cache du registre alimenté par les publications de l'hôte.
pub struct BusPluginRegistry {
    plugins: Mutex<Option<Vec<PluginStatus>>>,
}

impl BusPluginRegistry {
    pub fn new() -> Self {
        Self {
            plugins: Mutex::new(None),
        }
    }

    /// Remplace l'état connu par la dernière publication de l'hôte.
    pub fn apply_state(&self, plugins: Vec<PluginStatus>) {
        *self.plugins.lock() = Some(plugins);
    }
}

impl Default for BusPluginRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl PluginRegistry for BusPluginRegistry {
    fn list_plugins(&self) -> Result<Vec<PluginStatus>, RegistryError> {
        self.plugins.lock().clone().ok_or(RegistryError::Unavailable)
    }
}
