//! Mise en forme des rapports texte renvoyés dans le chat.
//!
//! Fonctions pures : même entrée, même sortie, aucune E/S.

use std::time::Duration;

use crate::metrics::MetricsSnapshot;
use crate::registry::PluginStatus;

/// Section 服务器信息 : une ligne par champ du snapshot.
/// Les champs optionnels indisponibles sont rendus 不可用 plutôt qu'omis.
pub fn format_info(snapshot: &MetricsSnapshot) -> String {
    let mut lines = vec!["服务器信息：".to_string()];
    lines.push(format!("- 主机名：{}", snapshot.hostname));
    lines.push(format!("- 平台：{}", snapshot.platform));
    lines.push(format!("- 插件版本：{}", snapshot.runtime_version));
    lines.push(format!("- 进程 PID：{}", snapshot.pid));
    lines.push(format!(
        "- 运行时长（本插件）：{}",
        format_uptime(snapshot.uptime)
    ));
    lines.push(format!("- CPU 核心数：{}", snapshot.cpu_count));
    lines.push(format!("- CPU占用率：{:.1}%", snapshot.cpu_percent));

    let mem_percent = if snapshot.mem_total_bytes > 0 {
        snapshot.mem_used_bytes as f64 / snapshot.mem_total_bytes as f64 * 100.0
    } else {
        0.0
    };
    lines.push(format!(
        "- 系统内存占用：{} / {} ({:.1}%)",
        format_bytes(snapshot.mem_used_bytes),
        format_bytes(snapshot.mem_total_bytes),
        mem_percent
    ));

    match snapshot.process_mem_bytes {
        Some(bytes) => lines.push(format!("- 进程内存占用：{}", format_bytes(bytes))),
        None => lines.push("- 进程内存占用：不可用".to_string()),
    }
    match snapshot.load_avg {
        Some([one, five, fifteen]) => {
            lines.push(format!("- 系统负载：{one:.2} / {five:.2} / {fifteen:.2}"))
        }
        None => lines.push("- 系统负载：不可用".to_string()),
    }
    match &snapshot.disk {
        Some(disk) => lines.push(format!(
            "- 磁盘（当前目录 {}）：已用 {} / 总计 {}",
            disk.mount_point,
            format_bytes(disk.used_bytes),
            format_bytes(disk.total_bytes)
        )),
        None => lines.push("- 磁盘（当前目录）：不可用".to_string()),
    }

    lines.join("\n")
}

/// Section 插件状态 : résumé puis listes triées (insensible à la casse).
pub fn format_plugins(plugins: &[PluginStatus]) -> String {
    let mut enabled: Vec<&PluginStatus> = plugins.iter().filter(|p| p.enabled).collect();
    let mut disabled: Vec<&PluginStatus> = plugins.iter().filter(|p| !p.enabled).collect();
    enabled.sort_by_key(|p| p.name.to_lowercase());
    disabled.sort_by_key(|p| p.name.to_lowercase());

    let mut lines = vec![format!(
        "插件状态：启用 {} / 总计 {}",
        enabled.len(),
        plugins.len()
    )];
    lines.push("已启用插件：".to_string());
    if enabled.is_empty() {
        lines.push("- 无".to_string());
    } else {
        lines.extend(enabled.iter().map(|p| plugin_line(p)));
    }
    if !disabled.is_empty() {
        lines.push("未启用插件：".to_string());
        lines.extend(disabled.iter().map(|p| plugin_line(p)));
    }

    lines.join("\n")
}

/// Rapport combiné : 服务器信息 puis 插件状态.
pub fn format_all(snapshot: &MetricsSnapshot, plugins: &[PluginStatus]) -> String {
    format!("{}\n\n{}", format_info(snapshot), format_plugins(plugins))
}

fn plugin_line(plugin: &PluginStatus) -> String {
    match &plugin.version {
        Some(version) => format!("- {} ({})", plugin.name, version),
        None => format!("- {}", plugin.name),
    }
}

fn format_uptime(uptime: Duration) -> String {
    // Tronqué à la seconde, sinon humantime détaille jusqu'aux nanos
    humantime::format_duration(Duration::from_secs(uptime.as_secs())).to_string()
}

fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    format!("{:.1}{}", size, UNITS[unit])
}
