use crate::domain::api::{
    Bootstrap, ElementId, EntryHistory, EntryPicks, EntrySummary, LeaguePage, ManagerId, Transfer,
};
use crate::domain::model::{AnalysisMode, LeagueReport, LeagueSnapshot};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn base_url(&self) -> &str;
    fn league_id(&self) -> u64;
    /// `None` means "resolve the current gameweek from the API".
    fn gameweek(&self) -> Option<u32>;
    fn top_n(&self) -> usize;
    fn mode(&self) -> AnalysisMode;
    /// Explicit cap on standings rows; quick mode falls back to `top_n`.
    fn limit(&self) -> Option<usize>;
    fn manager_filter(&self) -> Option<&[ManagerId]>;
    fn output_path(&self) -> &str;
    fn concurrent_requests(&self) -> usize;
    fn analysis_concurrency(&self) -> usize;
    fn page_timeout(&self) -> Duration;
    fn entry_timeout(&self) -> Duration;

    fn standings_limit(&self) -> Option<usize> {
        match (self.limit(), self.mode()) {
            (Some(limit), _) => Some(limit),
            (None, AnalysisMode::Quick) => Some(self.top_n()),
            (None, AnalysisMode::Full) => None,
        }
    }
}

/// Read-only view of the fantasy API used by every pipeline stage.
#[async_trait]
pub trait FplApi: Send + Sync {
    async fn league_page(&self, league_id: u64, page: u32) -> Result<LeaguePage>;
    async fn entry_summary(&self, entry: ManagerId) -> Result<EntrySummary>;
    async fn entry_history(&self, entry: ManagerId) -> Result<EntryHistory>;
    async fn entry_picks(&self, entry: ManagerId, gameweek: u32) -> Result<EntryPicks>;
    async fn entry_transfers(&self, entry: ManagerId) -> Result<Vec<Transfer>>;
    async fn bootstrap(&self) -> Result<Bootstrap>;
    /// Points an element scored in `gameweek`.
    async fn element_points(&self, element: ElementId, gameweek: u32) -> Result<i64>;

    async fn overall_rank(&self, entry: ManagerId) -> Result<Option<u64>> {
        Ok(self.entry_summary(entry).await?.summary_overall_rank)
    }
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<LeagueSnapshot>;
    async fn transform(&self, snapshot: LeagueSnapshot) -> Result<LeagueReport>;
    async fn load(&self, report: LeagueReport) -> Result<String>;
}
