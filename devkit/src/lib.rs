/*!
# Corvid DevKit - Stubs et Utilitaires pour Développement

Bibliothèque facilitant le développement de plugins Corvid avec:
- Stub du bus MQTT pour tester sans broker
- Hôte factice (source de métriques et registre de plugins contrôlés)
- Constructeurs de payloads conformes aux contrats du bus
*/

pub mod bus_stub;
pub mod fakes;

pub use bus_stub::{CorvidMessageBuilder, MockBusClient};
pub use fakes::{sample_snapshot, FakeMetricsSource, FakePluginRegistry};
