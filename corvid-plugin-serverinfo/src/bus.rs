//! Contrats du bus Corvid et traitement des événements entrants.
//!
//! Topics consommés :
//! - `corvid/messages/event@v1` : chaque message de chat reçu par l'hôte
//! - `corvid/plugins/state@v1`  : état complet du registre de plugins
//!
//! Topic produit :
//! - `corvid/messages/send@v1`  : réponses texte routées par l'hôte

use std::sync::Arc;
use std::time::SystemTime;

use serde::{Deserialize, Serialize};

use crate::dispatch::Dispatcher;
use crate::metrics::{MetricsSource, SystemMetricsSource};
use crate::registry::{BusPluginRegistry, PluginStatus};

pub const TOPIC_MESSAGE_EVENT: &str = "corvid/messages/event@v1";
pub const TOPIC_MESSAGE_SEND: &str = "corvid/messages/send@v1";
pub const TOPIC_PLUGIN_STATE: &str = "corvid/plugins/state@v1";

/// Message de chat publié par l'hôte
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageEvent {
    pub message_id: String,
    pub channel: String,
    pub text: String,
    #[serde(default)]
    pub sender: Option<String>,
}

/// Réponse publiée vers l'hôte
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageSend {
    pub reply_to: String,
    pub channel: String,
    pub text: String,
    pub ts: String,
}

/// Etat du registre publié par l'hôte
#[derive(Debug, Deserialize)]
pub struct PluginStateV1 {
    pub plugins: Vec<PluginStatus>,
    #[serde(default)]
    pub ts: Option<String>,
}

/// Le plugin complet : dispatcher + cache du registre.
pub struct ServerInfoPlugin {
    dispatcher: Dispatcher,
    registry: Arc<BusPluginRegistry>,
}

impl ServerInfoPlugin {
    /// Plugin de production, métriques sysinfo. Le chrono d'uptime démarre ici.
    pub fn new() -> Self {
        Self::with_metrics(Arc::new(SystemMetricsSource::new()))
    }

    /// Injection d'une source de métriques (tests sans hôte réel).
    pub fn with_metrics(metrics: Arc<dyn MetricsSource>) -> Self {
        let registry = Arc::new(BusPluginRegistry::new());
        let dispatcher = Dispatcher::new(metrics, registry.clone());
        Self {
            dispatcher,
            registry,
        }
    }

    /// Traite une publication du bus. `Some(réponse)` uniquement pour un
    /// événement de message dont le texte correspond à une commande connue.
    /// Un payload invalide est journalisé puis ignoré : l'hôte route bien
    /// d'autres trafics sur ces topics que nos commandes.
    pub fn handle_publish(&self, topic: &str, payload: &[u8]) -> Option<MessageSend> {
        match topic {
            TOPIC_PLUGIN_STATE => {
                match serde_json::from_slice::<PluginStateV1>(payload) {
                    Ok(state) => {
                        eprintln!(
                            "[serverinfo] plugin state updated ({} plugins)",
                            state.plugins.len()
                        );
                        self.registry.apply_state(state.plugins);
                    }
                    Err(e) => eprintln!("[serverinfo] invalid plugin state payload: {e}"),
                }
                None
            }
            TOPIC_MESSAGE_EVENT => {
                let event = match serde_json::from_slice::<MessageEvent>(payload) {
                    Ok(event) => event,
                    Err(e) => {
                        eprintln!("[serverinfo] invalid message event payload: {e}");
                        return None;
                    }
                };
                let text = self.dispatcher.dispatch(&event.text)?;
                Some(MessageSend {
                    reply_to: event.message_id,
                    channel: event.channel,
                    text,
                    ts: humantime::format_rfc3339(SystemTime::now()).to_string(),
                })
            }
            _ => None,
        }
    }
}

impl Default for ServerInfoPlugin {
    fn default() -> Self {
        Self::new()
    }
}
