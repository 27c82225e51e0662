/*!
Stub du bus Corvid pour développement sans broker

Enregistre les publications et abonnements du code testé et permet de
simuler la réception d'événements comme le ferait la boucle MQTT réelle.
*/

use std::sync::{Arc, Mutex};
use std::time::SystemTime;

use anyhow::Result;
use rumqttc::QoS;
use serde_json::{json, Value};
use tokio::sync::mpsc;

#[derive(Debug, Clone)]
pub struct BusMessage {
    pub topic: String,
    pub payload: Vec<u8>,
    pub qos: QoS,
    pub retain: bool,
}

/// Client bus factice, compatible avec l'usage que le plugin fait
/// de `rumqttc::AsyncClient` (publish / subscribe).
#[derive(Clone)]
pub struct MockBusClient {
    published_messages: Arc<Mutex<Vec<BusMessage>>>,
    subscriptions: Arc<Mutex<Vec<String>>>,
    message_sender: Arc<Mutex<Option<mpsc::UnboundedSender<BusMessage>>>>,
}

impl MockBusClient {
    pub fn new() -> Self {
        Self {
            published_messages: Arc::new(Mutex::new(Vec::new())),
            subscriptions: Arc::new(Mutex::new(Vec::new())),
            message_sender: Arc::new(Mutex::new(None)),
        }
    }

    /// Canal de réception des événements simulés (côté plugin testé).
    pub fn setup_receiver(&self) -> mpsc::UnboundedReceiver<BusMessage> {
        let (sender, receiver) = mpsc::unbounded_channel();
        *self.message_sender.lock().unwrap() = Some(sender);
        receiver
    }

    /// Enregistre une publication du code testé.
    pub async fn publish<S, V>(&self, topic: S, qos: QoS, retain: bool, payload: V) -> Result<()>
    where
        S: Into<String>,
        V: Into<Vec<u8>>,
    {
        let message = BusMessage {
            topic: topic.into(),
            payload: payload.into(),
            qos,
            retain,
        };

        self.published_messages.lock().unwrap().push(message.clone());
        log::info!("[stub] published to {}: {} bytes", message.topic, message.payload.len());
        Ok(())
    }

    /// Enregistre un abonnement du code testé.
    pub async fn subscribe<S: Into<String>>(&self, topic: S, _qos: QoS) -> Result<()> {
        let topic = topic.into();
        self.subscriptions.lock().unwrap().push(topic.clone());
        log::info!("[stub] subscribed to {topic}");
        Ok(())
    }

    /// Simule la réception d'une publication de l'hôte.
    pub async fn simulate_incoming<S, V>(&self, topic: S, payload: V) -> Result<()>
    where
        S: Into<String>,
        V: Into<Vec<u8>>,
    {
        let message = BusMessage {
            topic: topic.into(),
            payload: payload.into(),
            qos: QoS::AtLeastOnce,
            retain: false,
        };

        if let Some(sender) = self.message_sender.lock().unwrap().as_ref() {
            sender
                .send(message.clone())
                .map_err(|e| anyhow::anyhow!("send error: {e}"))?;
        }

        log::info!("[stub] simulated incoming on {}", message.topic);
        Ok(())
    }

    /// Toutes les publications enregistrées (assertions de tests).
    pub fn get_published_messages(&self) -> Vec<BusMessage> {
        self.published_messages.lock().unwrap().clone()
    }

    /// Abonnements enregistrés (assertions de tests).
    pub fn get_subscriptions(&self) -> Vec<String> {
        self.subscriptions.lock().unwrap().clone()
    }

    /// Publications sur un topic donné.
    pub fn find_messages_by_topic(&self, topic: &str) -> Vec<BusMessage> {
        self.published_messages
            .lock()
            .unwrap()
            .iter()
            .filter(|msg| msg.topic == topic)
            .cloned()
            .collect()
    }

    /// Dernier message d'un topic, décodé en JSON.
    pub fn get_last_json_message<T>(&self, topic: &str) -> Result<Option<T>>
    where
        T: for<'de> serde::Deserialize<'de>,
    {
        let messages = self.find_messages_by_topic(topic);
        if let Some(last_msg) = messages.last() {
            let parsed: T = serde_json::from_slice(&last_msg.payload)?;
            Ok(Some(parsed))
        } else {
            Ok(None)
        }
    }

    /// Reset des messages et abonnements enregistrés.
    pub fn clear(&self) {
        self.published_messages.lock().unwrap().clear();
        self.subscriptions.lock().unwrap().clear();
    }
}

impl Default for MockBusClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Constructeurs de payloads conformes aux contrats du bus Corvid.
pub struct CorvidMessageBuilder;

impl CorvidMessageBuilder {
    /// Événement messages/event@v1 tel que publié par l'hôte.
    pub fn message_event_v1(message_id: &str, channel: &str, text: &str) -> Value {
        json!({
            "message_id": message_id,
            "channel": channel,
            "text": text,
            "sender": "tester"
        })
    }

    /// État plugins/state@v1 tel que publié par l'hôte.
    /// `version` à `None` produit un champ null, comme un hôte qui ne
    /// versionne pas ses plugins.
    pub fn plugin_state_v1(plugins: &[(&str, bool, Option<&str>)]) -> Value {
        let entries: Vec<Value> = plugins
            .iter()
            .map(|(name, enabled, version)| {
                json!({
                    "name": name,
                    "enabled": enabled,
                    "version": version
                })
            })
            .collect();
        json!({
            "plugins": entries,
            "ts": humantime::format_rfc3339(SystemTime::now()).to_string()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stub_records_publish_and_subscribe() {
        let client = MockBusClient::new();

        client.subscribe("test/topic", QoS::AtLeastOnce).await.unwrap();
        assert_eq!(client.get_subscriptions(), vec!["test/topic"]);

        let payload = b"test message";
        client
            .publish("test/topic", QoS::AtLeastOnce, false, payload.to_vec())
            .await
            .unwrap();

        let messages = client.get_published_messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].topic, "test/topic");
        assert_eq!(messages[0].payload, payload);
    }

    #[tokio::test]
    async fn simulated_incoming_reaches_the_receiver() {
        let client = MockBusClient::new();
        let mut receiver = client.setup_receiver();

        client
            .simulate_incoming("corvid/messages/event@v1", b"{}".to_vec())
            .await
            .unwrap();

        let delivered = receiver.recv().await.unwrap();
        assert_eq!(delivered.topic, "corvid/messages/event@v1");
    }

    #[tokio::test]
    async fn last_json_message_is_decoded() {
        let client = MockBusClient::new();
        let data = json!({"text": "réponse", "number": 42});
        client
            .publish(
                "json/topic",
                QoS::AtLeastOnce,
                false,
                serde_json::to_vec(&data).unwrap(),
            )
            .await
            .unwrap();

        let parsed: Option<Value> = client.get_last_json_message("json/topic").unwrap();
        assert_eq!(parsed.unwrap()["number"], 42);
    }

    #[test]
    fn builders_follow_the_bus_contracts() {
        let event = CorvidMessageBuilder::message_event_v1("m-1", "group:42", "/serverinfo");
        assert_eq!(event["message_id"], "m-1");
        assert_eq!(event["text"], "/serverinfo");

        let state =
            CorvidMessageBuilder::plugin_state_v1(&[("astral-dice", true, Some("1.2.0")), ("night-watch", false, None)]);
        assert_eq!(state["plugins"][0]["name"], "astral-dice");
        assert_eq!(state["plugins"][0]["version"], "1.2.0");
        assert_eq!(state["plugins"][1]["enabled"], false);
        assert!(state["plugins"][1]["version"].is_null());
    }
}
