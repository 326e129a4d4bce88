use crate::adapters::FplClient;
use crate::core::points::adjust_points;
use crate::core::report::{analysis_json, standings_csv, standings_tsv};
use crate::core::standings::{StandingsFetcher, StandingsOptions};
use crate::core::stats::summarize;
use crate::core::top_n::{aggregate, fetch_activity, select_top_n};
use crate::core::{ConfigProvider, Pipeline, Storage};
use crate::domain::api::Bootstrap;
use crate::domain::model::{
    AnalysisMode, LeagueReport, LeagueSnapshot, ManagerRow, PlayerDirectory,
};
use crate::domain::ports::FplApi;
use crate::utils::error::{LeagueError, Result};
use chrono::Utc;
use std::io::Write;
use zip::write::{FileOptions, ZipWriter};

pub const STANDINGS_CSV: &str = "standings.csv";
pub const STANDINGS_TSV: &str = "standings.tsv";
pub const ANALYSIS_JSON: &str = "analysis.json";

/// Name of the zip bundle written by `load`.
pub fn bundle_name(league_id: u64, gameweek: u32) -> String {
    format!("league_{}_gw{}.zip", league_id, gameweek)
}

pub struct LeaguePipeline<S: Storage, C: ConfigProvider, A: FplApi = FplClient> {
    storage: S,
    config: C,
    api: A,
}

impl<S: Storage, C: ConfigProvider> LeaguePipeline<S, C, FplClient> {
    pub fn new(storage: S, config: C) -> Result<Self> {
        let api = FplClient::from_config(&config)?;
        Ok(Self::with_api(storage, config, api))
    }
}

impl<S: Storage, C: ConfigProvider, A: FplApi> LeaguePipeline<S, C, A> {
    pub fn with_api(storage: S, config: C, api: A) -> Self {
        Self {
            storage,
            config,
            api,
        }
    }

    pub fn config(&self) -> &C {
        &self.config
    }

    async fn load_bootstrap(&self) -> Option<Bootstrap> {
        match self.api.bootstrap().await {
            Ok(bootstrap) => Some(bootstrap),
            Err(e) => {
                tracing::warn!("Could not load player data: {}", e);
                None
            }
        }
    }

    fn resolve_gameweek(&self, bootstrap: Option<&Bootstrap>) -> Result<u32> {
        if let Some(gw) = self.config.gameweek() {
            return Ok(gw);
        }
        let gw = bootstrap
            .and_then(Bootstrap::current_gameweek)
            .ok_or_else(|| LeagueError::MissingConfigError {
                field: "gameweek".to_string(),
            })?;
        tracing::info!("Resolved current gameweek: {}", gw);
        Ok(gw)
    }
}

fn name_captains(rows: &mut [ManagerRow], players: &PlayerDirectory) {
    for row in rows {
        row.captain_name = row
            .captain
            .and_then(|e| players.name(e))
            .map(str::to_string);
        row.vice_captain_name = row
            .vice_captain
            .and_then(|e| players.name(e))
            .map(str::to_string);
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider, A: FplApi> Pipeline for LeaguePipeline<S, C, A> {
    async fn extract(&self) -> Result<LeagueSnapshot> {
        let league_id = self.config.league_id();
        let mode = self.config.mode();
        let top_n = self.config.top_n();

        let bootstrap = self.load_bootstrap().await;
        let gameweek = self.resolve_gameweek(bootstrap.as_ref())?;
        let players: Option<PlayerDirectory> = bootstrap.map(|b| {
            b.elements
                .into_iter()
                .map(|element| (element.id, element.web_name))
                .collect()
        });

        let options = StandingsOptions::new(league_id)
            .with_gameweek(gameweek)
            .with_limit(self.config.standings_limit())
            .with_manager_filter(self.config.manager_filter())
            .with_concurrency(self.config.concurrent_requests());
        let mut rows = StandingsFetcher::new(&self.api, options).fetch().await?;

        if mode == AnalysisMode::Full {
            adjust_points(
                &self.api,
                &mut rows,
                gameweek,
                self.config.analysis_concurrency(),
            )
            .await;
        }

        let top_n_activity = match &players {
            Some(directory) => {
                name_captains(&mut rows, directory);
                let ids = select_top_n(&rows, top_n)?;
                fetch_activity(&self.api, &ids, gameweek, self.config.analysis_concurrency())
                    .await
            }
            None => {
                tracing::warn!("Player data unavailable, skipping top {} analysis", top_n);
                Vec::new()
            }
        };

        Ok(LeagueSnapshot {
            league_id,
            gameweek,
            mode,
            top_n,
            rows,
            players,
            top_n_activity,
        })
    }

    async fn transform(&self, snapshot: LeagueSnapshot) -> Result<LeagueReport> {
        let LeagueSnapshot {
            league_id,
            gameweek,
            mode,
            top_n,
            rows,
            players,
            top_n_activity,
        } = snapshot;

        let top_n_analysis = players
            .as_ref()
            .map(|directory| aggregate(&top_n_activity, gameweek, directory));
        let summary = summarize(&rows, top_n);

        tracing::debug!("Rendering standings table for {} managers", rows.len());
        let standings_csv = standings_csv(&rows, gameweek, mode)?;
        let standings_tsv = standings_tsv(&rows, gameweek, mode)?;

        Ok(LeagueReport {
            league_id,
            gameweek,
            mode,
            generated_at: Utc::now(),
            rows,
            top_n: top_n_analysis,
            summary,
            standings_csv,
            standings_tsv,
        })
    }

    async fn load(&self, report: LeagueReport) -> Result<String> {
        let file_name = bundle_name(report.league_id, report.gameweek);
        let output_path = format!("{}/{}", self.config.output_path(), file_name);

        let zip_data = {
            let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));

            zip.start_file::<_, ()>(STANDINGS_CSV, FileOptions::default())?;
            zip.write_all(report.standings_csv.as_bytes())?;

            zip.start_file::<_, ()>(STANDINGS_TSV, FileOptions::default())?;
            zip.write_all(report.standings_tsv.as_bytes())?;

            zip.start_file::<_, ()>(ANALYSIS_JSON, FileOptions::default())?;
            zip.write_all(analysis_json(&report)?.as_bytes())?;

            let cursor = zip.finish()?;
            cursor.into_inner()
        };

        tracing::debug!("Writing ZIP file ({} bytes) to storage", zip_data.len());
        self.storage.write_file(&file_name, &zip_data).await?;

        tracing::debug!("ZIP file saved successfully");
        Ok(output_path)
    }
}
