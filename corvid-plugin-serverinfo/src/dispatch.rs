//! Résolution des commandes et orchestration d'une requête.
//!
//! Trois actions terminales (info, plugins, all), pas d'état intermédiaire.
//! Toute erreur de collecte est absorbée ici et convertie en ligne d'échec
//! fixe : rien ne remonte jusqu'à l'hôte.

use std::sync::Arc;

use crate::metrics::MetricsSource;
use crate::registry::PluginRegistry;
use crate::report;

/// Ligne renvoyée quand la collecte de métriques échoue
pub const INFO_FAILURE: &str = "无法获取服务器信息";
/// Ligne renvoyée quand le registre de plugins est indisponible
pub const PLUGINS_FAILURE: &str = "无法获取插件状态";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Info,
    Plugins,
    All,
}

/// Table d'alias : correspondance exacte, sensible à la casse, après
/// suppression d'un éventuel préfixe `/`. Tout autre texte est ignoré.
pub fn resolve_command(text: &str) -> Option<RequestKind> {
    let text = text.trim();
    let text = text.strip_prefix('/').unwrap_or(text);
    match text {
        "serverinfo" | "serverinfo info" | "服务器信息" => Some(RequestKind::Info),
        "serverinfo plugins" | "插件状态" => Some(RequestKind::Plugins),
        "serverinfo all" => Some(RequestKind::All),
        _ => None,
    }
}

pub struct Dispatcher {
    metrics: Arc<dyn MetricsSource>,
    registry: Arc<dyn PluginRegistry>,
}

impl Dispatcher {
    pub fn new(metrics: Arc<dyn MetricsSource>, registry: Arc<dyn PluginRegistry>) -> Self {
        Self { metrics, registry }
    }

    /// Traite un texte de commande. `None` = texte non reconnu, pas de réponse.
    pub fn dispatch(&self, text: &str) -> Option<String> {
        let kind = resolve_command(text)?;
        Some(self.answer(kind))
    }

    fn answer(&self, kind: RequestKind) -> String {
        match kind {
            RequestKind::Info => match self.metrics.collect() {
                Ok(snapshot) => report::format_info(&snapshot),
                Err(e) => {
                    eprintln!("[serverinfo] metrics collection failed: {e}");
                    INFO_FAILURE.to_string()
                }
            },
            RequestKind::Plugins => match self.registry.list_plugins() {
                Ok(plugins) => report::format_plugins(&plugins),
                Err(e) => {
                    eprintln!("[serverinfo] plugin registry query failed: {e}");
                    PLUGINS_FAILURE.to_string()
                }
            },
            RequestKind::All => {
                let snapshot = match self.metrics.collect() {
                    Ok(snapshot) => snapshot,
                    Err(e) => {
                        eprintln!("[serverinfo] metrics collection failed: {e}");
                        return INFO_FAILURE.to_string();
                    }
                };
                let plugins = match self.registry.list_plugins() {
                    Ok(plugins) => plugins,
                    Err(e) => {
                        eprintln!("[serverinfo] plugin registry query failed: {e}");
                        return PLUGINS_FAILURE.to_string();
                    }
                };
                report::format_all(&snapshot, &plugins)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::{CollectionError, DiskUsage, MetricsSnapshot};
    use crate::registry::{PluginStatus, RegistryError};
    use std::time::Duration;

    struct StaticMetrics(MetricsSnapshot);

    impl MetricsSource for StaticMetrics {
        fn collect(&self) -> Result<MetricsSnapshot, CollectionError> {
            Ok(self.0.clone())
        }
    }

    struct FailingMetrics;

    impl MetricsSource for FailingMetrics {
        fn collect(&self) -> Result<MetricsSnapshot, CollectionError> {
            Err(CollectionError::Unsupported("test"))
        }
    }

    struct StaticRegistry(Vec<PluginStatus>);

    impl PluginRegistry for StaticRegistry {
        fn list_plugins(&self) -> Result<Vec<PluginStatus>, RegistryError> {
            Ok(self.0.clone())
        }
    }

    struct NoRegistry;

    impl PluginRegistry for NoRegistry {
        fn list_plugins(&self) -> Result<Vec<PluginStatus>, RegistryError> {
            Err(RegistryError::Unavailable)
        }
    }

    fn snapshot() -> MetricsSnapshot {
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

    fn status(name: &str, enabled: bool, version: Option<&str>) -> PluginStatus {
        PluginStatus {
            name: name.to_string(),
            enabled,
            version: version.map(str::to_string),
        }
    }

    fn dispatcher() -> Dispatcher {
        Dispatcher::new(
            Arc::new(StaticMetrics(snapshot())),
            Arc::new(StaticRegistry(vec![
                status("astral-dice", true, Some("1.2.0")),
                status("night-watch", false, None),
            ])),
        )
    }

    #[test]
    fn alias_table_matches_documented_commands() {
        let cases = [
            ("serverinfo", RequestKind::Info),
            ("serverinfo info", RequestKind::Info),
            ("/serverinfo", RequestKind::Info),
            ("/serverinfo info", RequestKind::Info),
            ("服务器信息", RequestKind::Info),
            ("/服务器信息", RequestKind::Info),
            ("serverinfo plugins", RequestKind::Plugins),
            ("/serverinfo plugins", RequestKind::Plugins),
            ("插件状态", RequestKind::Plugins),
            ("/插件状态", RequestKind::Plugins),
            ("serverinfo all", RequestKind::All),
            ("/serverinfo all", RequestKind::All),
        ];
        for (text, expected) in cases {
            assert_eq!(resolve_command(text), Some(expected), "alias {text}");
        }
    }

    #[test]
    fn anything_else_resolves_to_nothing() {
        for text in [
            "hello",
            "serverinfo extra",
            "SERVERINFO",
            "服务器信息吗",
            "server info",
            "",
        ] {
            assert_eq!(resolve_command(text), None, "text {text:?}");
        }
    }

    #[test]
    fn info_reply_contains_metric_sections() {
        let reply = dispatcher().dispatch("/serverinfo").unwrap();
        for needle in ["CPU占用率", "系统内存占用", "进程内存占用", "磁盘"] {
            assert!(reply.contains(needle), "missing {needle}");
        }
    }

    #[test]
    fn plugins_reply_lists_each_plugin_once() {
        let reply = dispatcher().dispatch("插件状态").unwrap();
        assert_eq!(reply.matches("astral-dice").count(), 1);
        assert_eq!(reply.matches("night-watch").count(), 1);
    }

    #[test]
    fn collection_failure_becomes_fixed_line() {
        let dispatcher = Dispatcher::new(
            Arc::new(FailingMetrics),
            Arc::new(StaticRegistry(vec![])),
        );
        assert_eq!(dispatcher.dispatch("serverinfo").as_deref(), Some(INFO_FAILURE));
        assert_eq!(
            dispatcher.dispatch("serverinfo all").as_deref(),
            Some(INFO_FAILURE)
        );
    }

    #[test]
    fn registry_failure_becomes_fixed_line() {
        let dispatcher = Dispatcher::new(
            Arc::new(StaticMetrics(snapshot())),
            Arc::new(NoRegistry),
        );
        assert_eq!(
            dispatcher.dispatch("插件状态").as_deref(),
            Some(PLUGINS_FAILURE)
        );
        assert_eq!(
            dispatcher.dispatch("serverinfo all").as_deref(),
            Some(PLUGINS_FAILURE)
        );
    }

    #[test]
    fn unrecognized_text_yields_no_reply() {
        assert!(dispatcher().dispatch("hello").is_none());
    }
}
