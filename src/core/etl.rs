use crate::core::report::terminal_summary;
use crate::core::Pipeline;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

/// What a finished run hands back to the binary.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub output_path: String,
    /// Plain-text report for the terminal.
    pub summary: String,
}

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub async fn run(&self) -> Result<RunOutput> {
        tracing::info!("Starting league analysis");
        self.monitor.log_phase("start");

        tracing::info!("Extracting league data...");
        let snapshot = self.pipeline.extract().await?;
        tracing::info!(
            "Extracted {} managers for gameweek {} ({} with top-N detail)",
            snapshot.rows.len(),
            snapshot.gameweek,
            snapshot.top_n_activity.len()
        );
        self.monitor.log_phase("extract");

        tracing::info!("Aggregating statistics...");
        let report = self.pipeline.transform(snapshot).await?;
        let summary = terminal_summary(&report);
        self.monitor.log_phase("transform");

        tracing::info!("Writing output bundle...");
        let output_path = self.pipeline.load(report).await?;
        tracing::info!("Output saved to: {}", output_path);
        self.monitor.log_phase("load");
        self.monitor.log_final();

        Ok(RunOutput {
            output_path,
            summary,
        })
    }
}
