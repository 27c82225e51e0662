/**
 * CORVID PLUGIN SERVERINFO - Rapport d'état serveur à la demande
 *
 * RÔLE :
 * Plugin autonome qui répond aux commandes serverinfo / 服务器信息 / 插件状态
 * avec un rapport texte : métriques système (CPU, mémoire, disque, charge)
 * et état activé/désactivé des plugins installés sur l'hôte.
 *
 * FONCTIONNEMENT :
 * - Écoute bus : corvid/messages/event@v1 (messages de chat),
 *   corvid/plugins/state@v1 (registre publié par l'hôte)
 * - Publie : corvid/messages/send@v1 (réponses routées par l'hôte)
 * - Aucun état persistant : tout est recalculé à chaque requête,
 *   seul l'instant de démarrage sert au calcul de l'uptime
 *
 * UTILITÉ DANS CORVID :
 * 🎯 Diagnostic : état de la machine du bot en une commande de chat
 * 🎯 Visibilité : quels plugins tournent, lesquels sont désactivés
 * 🎯 Résilience : toute erreur de collecte devient une ligne d'échec,
 *    jamais un crash du processus
 */

use anyhow::Result;
use rumqttc::{AsyncClient, Event, Incoming, MqttOptions, QoS};
use tokio::time::{sleep, Duration};

use corvid_plugin_serverinfo::bus::{
    ServerInfoPlugin, TOPIC_MESSAGE_EVENT, TOPIC_MESSAGE_SEND, TOPIC_PLUGIN_STATE,
};
use corvid_plugin_serverinfo::config::BusConfig;

#[tokio::main]
async fn main() -> Result<()> {
    // Charger les variables d'environnement depuis .env (si présent)
    dotenvy::dotenv().ok();

    eprintln!("[serverinfo] corvid plugin serverinfo starting...");
    let cfg = BusConfig::from_env();
    let plugin = ServerInfoPlugin::new();

    // Configuration MQTT
    let mut mqttopts = MqttOptions::new("corvid-plugin-serverinfo", &cfg.host, cfg.port);
    mqttopts.set_keep_alive(Duration::from_secs(30));

    let (client, mut eventloop) = AsyncClient::new(mqttopts, 10);

    // S'abonner aux événements de messages et à l'état du registre
    client.subscribe(TOPIC_PLUGIN_STATE, QoS::AtLeastOnce).await?;
    client.subscribe(TOPIC_MESSAGE_EVENT, QoS::AtLeastOnce).await?;

    eprintln!(
        "[serverinfo] connected to {}:{}, listening for commands...",
        cfg.host, cfg.port
    );

    // Boucle principale de traitement des publications
    loop {
        match eventloop.poll().await {
            Ok(Event::Incoming(Incoming::Publish(publish))) => {
                if let Some(reply) = plugin.handle_publish(&publish.topic, &publish.payload) {
                    match serde_json::to_vec(&reply) {
                        Ok(payload) => {
                            if let Err(e) = client
                                .publish(TOPIC_MESSAGE_SEND, QoS::AtLeastOnce, false, payload)
                                .await
                            {
                                eprintln!("[serverinfo] failed to publish reply: {e:?}");
                            }
                        }
                        Err(e) => eprintln!("[serverinfo] failed to encode reply: {e}"),
                    }
                }
            }
            Ok(_) => {
                // Autres événements MQTT ignorés
            }
            Err(e) => {
                eprintln!("[serverinfo] MQTT error: {e:?}");
                sleep(Duration::from_secs(1)).await;
            }
        }
    }
}
