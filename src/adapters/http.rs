use crate::domain::api::{
    Bootstrap, ElementId, ElementSummary, EntryHistory, EntryPicks, EntrySummary, LeaguePage,
    ManagerId, Transfer,
};
use crate::domain::ports::{ConfigProvider, FplApi};
use crate::utils::error::{LeagueError, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::{OnceCell, RwLock};
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://fantasy.premierleague.com/api/";
pub const DEFAULT_PAGE_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_ENTRY_TIMEOUT: Duration = Duration::from_secs(5);

const USER_AGENT: &str = concat!("mini-league-etl/", env!("CARGO_PKG_VERSION"));

/// reqwest-backed client for the fantasy API.
///
/// Holds the caches that live for a single run: overall ranks per entry, the
/// bootstrap payload, picks per (entry, gameweek) and element points per
/// (element, gameweek). Failed lookups are never cached.
pub struct FplClient {
    client: Client,
    base: Url,
    page_timeout: Duration,
    entry_timeout: Duration,
    overall_ranks: RwLock<HashMap<ManagerId, Option<u64>>>,
    picks: RwLock<HashMap<(ManagerId, u32), EntryPicks>>,
    element_points: RwLock<HashMap<(ElementId, u32), i64>>,
    bootstrap: OnceCell<Bootstrap>,
}

impl FplClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let mut normalized = base_url.trim().to_string();
        if !normalized.ends_with('/') {
            normalized.push('/');
        }

        let client = Client::builder().user_agent(USER_AGENT).build()?;

        Ok(Self {
            client,
            base: Url::parse(&normalized)?,
            page_timeout: DEFAULT_PAGE_TIMEOUT,
            entry_timeout: DEFAULT_ENTRY_TIMEOUT,
            overall_ranks: RwLock::new(HashMap::new()),
            picks: RwLock::new(HashMap::new()),
            element_points: RwLock::new(HashMap::new()),
            bootstrap: OnceCell::new(),
        })
    }

    pub fn with_timeouts(mut self, page_timeout: Duration, entry_timeout: Duration) -> Self {
        self.page_timeout = page_timeout;
        self.entry_timeout = entry_timeout;
        self
    }

    pub fn from_config<C: ConfigProvider>(config: &C) -> Result<Self> {
        Ok(Self::new(config.base_url())?
            .with_timeouts(config.page_timeout(), config.entry_timeout()))
    }

    pub fn base_url(&self) -> &str {
        self.base.as_str()
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        timeout: Duration,
    ) -> Result<T> {
        let url = self.base.join(path)?;
        tracing::debug!("GET {} {:?}", url, query);

        let response = self
            .client
            .get(url.clone())
            .query(query)
            .timeout(timeout)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(LeagueError::NotFoundError {
                resource: url.path().to_string(),
            });
        }
        if !status.is_success() {
            return Err(LeagueError::HttpStatusError {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl FplApi for FplClient {
    async fn league_page(&self, league_id: u64, page: u32) -> Result<LeaguePage> {
        self.get_json(
            &format!("leagues-classic/{}/standings/", league_id),
            &[("page_standings", page.to_string())],
            self.page_timeout,
        )
        .await
    }

    async fn entry_summary(&self, entry: ManagerId) -> Result<EntrySummary> {
        self.get_json(&format!("entry/{}/", entry), &[], self.entry_timeout)
            .await
    }

    async fn entry_history(&self, entry: ManagerId) -> Result<EntryHistory> {
        self.get_json(&format!("entry/{}/history/", entry), &[], self.entry_timeout)
            .await
    }

    // Standings, points and top-N all read the same picks in a full run.
    async fn entry_picks(&self, entry: ManagerId, gameweek: u32) -> Result<EntryPicks> {
        if let Some(picks) = self.picks.read().await.get(&(entry, gameweek)) {
            return Ok(picks.clone());
        }

        let picks: EntryPicks = self
            .get_json(
                &format!("entry/{}/event/{}/picks/", entry, gameweek),
                &[],
                self.entry_timeout,
            )
            .await?;

        self.picks
            .write()
            .await
            .insert((entry, gameweek), picks.clone());
        Ok(picks)
    }

    async fn entry_transfers(&self, entry: ManagerId) -> Result<Vec<Transfer>> {
        self.get_json(&format!("entry/{}/transfers/", entry), &[], self.entry_timeout)
            .await
    }

    async fn bootstrap(&self) -> Result<Bootstrap> {
        let bootstrap = self
            .bootstrap
            .get_or_try_init(|| async {
                tracing::info!("Fetching bootstrap-static data");
                self.get_json::<Bootstrap>("bootstrap-static/", &[], self.page_timeout)
                    .await
            })
            .await?;
        Ok(bootstrap.clone())
    }

    async fn element_points(&self, element: ElementId, gameweek: u32) -> Result<i64> {
        if let Some(points) = self.element_points.read().await.get(&(element, gameweek)) {
            return Ok(*points);
        }

        let summary: ElementSummary = self
            .get_json(
                &format!("element-summary/{}/", element),
                &[],
                self.entry_timeout,
            )
            .await?;
        let points = summary.points_in(gameweek);

        self.element_points
            .write()
            .await
            .insert((element, gameweek), points);
        Ok(points)
    }

    async fn overall_rank(&self, entry: ManagerId) -> Result<Option<u64>> {
        if let Some(rank) = self.overall_ranks.read().await.get(&entry) {
            return Ok(*rank);
        }

        let rank = self.entry_summary(entry).await?.summary_overall_rank;
        self.overall_ranks.write().await.insert(entry, rank);
        Ok(rank)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let client = FplClient::new("http://127.0.0.1:9999/api").unwrap();
        assert_eq!(client.base_url(), "http://127.0.0.1:9999/api/");
        assert_eq!(
            client.base.join("entry/1/history/").unwrap().as_str(),
            "http://127.0.0.1:9999/api/entry/1/history/"
        );
    }

    #[test]
    fn test_invalid_base_url_is_rejected() {
        assert!(matches!(
            FplClient::new("not a url"),
            Err(LeagueError::UrlError(_))
        ));
    }
}
