/*!
# Corvid Plugin ServerInfo

Plugin Corvid qui répond aux commandes d'état serveur:
- métriques système et processus (CPU, mémoire, disque, charge)
- état activé/désactivé des plugins installés sur l'hôte

Le coeur (dispatch, rapport) ne dépend de l'hôte qu'à travers les traits
`MetricsSource` et `PluginRegistry`, ce qui permet de le tester sans hôte réel.
*/

pub mod bus;
pub mod config;
pub mod dispatch;
pub mod metrics;
pub mod registry;
pub mod report;

pub use bus::ServerInfoPlugin;
pub use dispatch::{Dispatcher, RequestKind};
pub use metrics::{MetricsSnapshot, MetricsSource, SystemMetricsSource};
pub use registry::{PluginRegistry, PluginStatus};
