//! System metrics collection for the serverinfo plugin.
//!
//! One snapshot per request:
//! - CPU usage and core count
//! - system and process memory
//! - load averages (Unix only)
//! - disk usage for the partition holding the current working directory
//! - plugin uptime (time since this collector was created, not host uptime)

use std::time::{Duration, Instant};

use parking_lot::Mutex;
use sysinfo::{Disks, System};

/// Erreurs de collecte quand une statistique de base est inaccessible
#[derive(Debug, thiserror::Error)]
pub enum CollectionError {
    #[error("{0} statistics unavailable on this platform")]
    Unsupported(&'static str),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Point-in-time capture of host and process metrics.
///
/// Built fresh on every request, never mutated, dropped after formatting.
#[derive(Debug, Clone)]
pub struct MetricsSnapshot {
    /// Global CPU usage, clamped to 0..=100.
    pub cpu_percent: f32,
    pub cpu_count: usize,
    pub mem_total_bytes: u64,
    pub mem_used_bytes: u64,
    /// Resident memory of this process; `None` when the pid cannot be resolved.
    pub process_mem_bytes: Option<u64>,
    pub hostname: String,
    pub platform: String,
    /// Build version of the plugin itself.
    pub runtime_version: String,
    pub pid: u32,
    /// 1/5/15 minute load averages; `None` where the platform has no such concept.
    pub load_avg: Option<[f64; 3]>,
    /// Usage of the partition containing the current working directory.
    pub disk: Option<DiskUsage>,
    /// Time since plugin initialization.
    pub uptime: Duration,
}

/// Usage d'une partition montée
#[derive(Debug, Clone)]
pub struct DiskUsage {
    pub mount_point: String,
    pub total_bytes: u64,
    pub used_bytes: u64,
}

/// Capacité hôte : fournir un instantané de métriques
pub trait MetricsSource: Send + Sync {
    fn collect(&self) -> Result<MetricsSnapshot, CollectionError>;
}

/// Implémentation de production, adossée à sysinfo.
///
/// Garde un `System` vivant entre deux requêtes : la mesure CPU est un delta
/// par rapport au refresh précédent et non une lecture à froid.
pub struct SystemMetricsSource {
    started_at: Instant,
    sys: Mutex<System>,
}

impl SystemMetricsSource {
    pub fn new() -> Self {
        let mut sys = System::new();
        // Premier refresh = base de calcul pour les mesures CPU suivantes
        sys.refresh_cpu_usage();
        sys.refresh_memory();

        Self {
            started_at: Instant::now(),
            sys: Mutex::new(sys),
        }
    }
}

impl Default for SystemMetricsSource {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsSource for SystemMetricsSource {
    fn collect(&self) -> Result<MetricsSnapshot, CollectionError> {
        let mut sys = self.sys.lock();
        sys.refresh_cpu_usage();
        sys.refresh_memory();

        let cpu_count = sys.cpus().len();
        if cpu_count == 0 {
            return Err(CollectionError::Unsupported("cpu"));
        }
        let cpu_percent = sys.global_cpu_info().cpu_usage().clamp(0.0, 100.0);

        let mem_total_bytes = sys.total_memory();
        if mem_total_bytes == 0 {
            return Err(CollectionError::Unsupported("memory"));
        }
        let mem_used_bytes = sys.used_memory();

        let process_mem_bytes = sysinfo::get_current_pid().ok().and_then(|pid| {
            sys.refresh_process(pid);
            sys.process(pid).map(|p| p.memory())
        });

        let load_avg = if cfg!(unix) {
            let load = System::load_average();
            Some([load.one, load.five, load.fifteen])
        } else {
            None
        };

        Ok(MetricsSnapshot {
            cpu_percent,
            cpu_count,
            mem_total_bytes,
            mem_used_bytes,
            process_mem_bytes,
            hostname: gethostname::gethostname().to_string_lossy().to_string(),
            platform: platform_string(),
            runtime_version: env!("CARGO_PKG_VERSION").to_string(),
            pid: std::process::id(),
            load_avg,
            disk: cwd_disk_usage()?,
            uptime: self.started_at.elapsed(),
        })
    }
}

fn platform_string() -> String {
    let os = System::long_os_version()
        .or_else(System::name)
        .unwrap_or_else(|| "unknown".to_string());
    let kernel = System::kernel_version().unwrap_or_else(|| "unknown".to_string());
    format!("{os} / {kernel} / {}", std::env::consts::ARCH)
}

/// Partition du répertoire courant = point de montage le plus long qui
/// préfixe le cwd. Aucun montage correspondant => `None`.
fn cwd_disk_usage() -> Result<Option<DiskUsage>, CollectionError> {
    let cwd = std::env::current_dir()?;
    let disks = Disks::new_with_refreshed_list();

    let mut best: Option<DiskUsage> = None;
    let mut best_len = 0usize;
    for disk in disks.list() {
        let mount = disk.mount_point();
        if !cwd.starts_with(mount) {
            continue;
        }
        let len = mount.as_os_str().len();
        if best.is_none() || len > best_len {
            best_len = len;
            best = Some(DiskUsage {
                mount_point: mount.display().to_string(),
                total_bytes: disk.total_space(),
                used_bytes: disk.total_space().saturating_sub(disk.available_space()),
            });
        }
    }

    Ok(best)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collect_reports_basic_resources() {
        let source = SystemMetricsSource::new();
        let snapshot = source.collect().unwrap();

        assert!(snapshot.cpu_count > 0);
        assert!((0.0..=100.0).contains(&snapshot.cpu_percent));
        assert!(snapshot.mem_total_bytes > 0);
        assert!(snapshot.mem_used_bytes <= snapshot.mem_total_bytes);
        assert!(!snapshot.hostname.is_empty());
        assert!(!snapshot.platform.is_empty());
        assert_eq!(snapshot.pid, std::process::id());
    }

    #[test]
    fn uptime_never_decreases() {
        let source = SystemMetricsSource::new();
        let first = source.collect().unwrap();
        let second = source.collect().unwrap();
        assert!(second.uptime >= first.uptime);
    }
}
