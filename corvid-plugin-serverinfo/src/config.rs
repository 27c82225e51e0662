//! Connexion au bus de l'hôte, configurée par variables d'environnement.

use std::env;

/// Paramètres du broker MQTT de l'hôte
#[derive(Debug, Clone)]
pub struct BusConfig {
    pub host: String,
    pub port: u16,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            host: "localhost".into(),
            port: 1883,
        }
    }
}

impl BusConfig {
    /// Lit CORVID_MQTT_HOST / CORVID_MQTT_PORT, exportées par l'hôte au
    /// lancement du plugin. Valeur invalide => défaut, jamais d'échec.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let host = env::var("CORVID_MQTT_HOST").unwrap_or(defaults.host);
        let port = match env::var("CORVID_MQTT_PORT") {
            Ok(raw) => raw.parse().unwrap_or_else(|_| {
                eprintln!("[serverinfo] CORVID_MQTT_PORT invalide: {raw}");
                defaults.port
            }),
            Err(_) => defaults.port,
        };
        Self { host, port }
    }
}
