use std::time::{Duration, Instant};

#[cfg(feature = "cli")]
use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, System};

#[derive(Debug, Clone)]
pub struct PhaseStats {
    pub memory_mb: u64,
    pub peak_memory_mb: u64,
    pub cpu_usage: f32,
    pub elapsed: Duration,
}

/// Optional per-phase process statistics for a run.
#[cfg(feature = "cli")]
pub struct SystemMonitor {
    system: std::sync::Mutex<System>,
    pid: Option<Pid>,
    start: Instant,
    peak_memory_mb: std::sync::atomic::AtomicU64,
    enabled: bool,
}

#[cfg(feature = "cli")]
impl SystemMonitor {
    pub fn new(enabled: bool) -> Self {
        let pid = sysinfo::get_current_pid().ok();
        if enabled && pid.is_none() {
            tracing::warn!("Could not determine current PID, process stats disabled");
        }

        Self {
            system: std::sync::Mutex::new(System::new()),
            pid,
            start: Instant::now(),
            peak_memory_mb: std::sync::atomic::AtomicU64::new(0),
            enabled: enabled && pid.is_some(),
        }
    }

    pub fn sample(&self) -> Option<PhaseStats> {
        use std::sync::atomic::Ordering;

        if !self.enabled {
            return None;
        }
        let pid = self.pid?;
        let mut system = self.system.lock().ok()?;
        system.refresh_processes_specifics(
            ProcessesToUpdate::Some(&[pid]),
            true,
            ProcessRefreshKind::nothing().with_memory().with_cpu(),
        );
        let process = system.process(pid)?;

        let memory_mb = process.memory() / 1024 / 1024;
        let peak = self
            .peak_memory_mb
            .fetch_max(memory_mb, Ordering::Relaxed)
            .max(memory_mb);

        Some(PhaseStats {
            memory_mb,
            peak_memory_mb: peak,
            cpu_usage: process.cpu_usage(),
            elapsed: self.start.elapsed(),
        })
    }

    pub fn log_phase(&self, phase: &str) {
        if let Some(stats) = self.sample() {
            tracing::info!(
                "📊 {} - CPU: {:.1}%, Memory: {}MB, Peak: {}MB, Elapsed: {:?}",
                phase,
                stats.cpu_usage,
                stats.memory_mb,
                stats.peak_memory_mb,
                stats.elapsed
            );
        }
    }

    pub fn log_final(&self) {
        if let Some(stats) = self.sample() {
            tracing::info!(
                "📊 Run finished in {:?}, peak memory {}MB",
                stats.elapsed,
                stats.peak_memory_mb
            );
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

#[cfg(not(feature = "cli"))]
pub struct SystemMonitor {
    start: Instant,
}

#[cfg(not(feature = "cli"))]
impl SystemMonitor {
    pub fn new(_enabled: bool) -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn sample(&self) -> Option<PhaseStats> {
        None
    }

    pub fn log_phase(&self, _phase: &str) {}

    pub fn log_final(&self) {
        tracing::debug!("Run finished in {:?}", self.start.elapsed());
    }

    pub fn is_enabled(&self) -> bool {
        false
    }
}

impl Default for SystemMonitor {
    fn default() -> Self {
        Self::new(false)
    }
}
