//! In-memory stand-in for the fantasy API used by unit tests.

use crate::domain::api::{
    Bootstrap, ElementId, EntryHistory, EntryPicks, EntrySummary, LeaguePage, ManagerId, Transfer,
};
use crate::domain::ports::FplApi;
use crate::utils::error::{LeagueError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Page(u32),
    History(ManagerId),
    Picks(ManagerId),
    Transfers(ManagerId),
    Element(ElementId),
}

/// Anything not inserted answers with a 404.
#[derive(Default)]
pub struct FakeApi {
    pub pages: HashMap<u32, LeaguePage>,
    pub overall_ranks: HashMap<ManagerId, Option<u64>>,
    pub histories: HashMap<ManagerId, EntryHistory>,
    pub picks: HashMap<(ManagerId, u32), EntryPicks>,
    pub transfers: HashMap<ManagerId, Vec<Transfer>>,
    pub bootstrap: Option<Bootstrap>,
    pub element_points: HashMap<(ElementId, u32), i64>,
    calls: Mutex<Vec<Call>>,
}

fn missing<T>(resource: String) -> Result<T> {
    Err(LeagueError::NotFoundError { resource })
}

impl FakeApi {
    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    pub fn page_calls(&self) -> Vec<u32> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter_map(|c| match c {
                Call::Page(page) => Some(*page),
                _ => None,
            })
            .collect()
    }

    pub fn history_calls(&self) -> Vec<ManagerId> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter_map(|c| match c {
                Call::History(id) => Some(*id),
                _ => None,
            })
            .collect()
    }

    pub fn picks_calls(&self) -> Vec<ManagerId> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter_map(|c| match c {
                Call::Picks(id) => Some(*id),
                _ => None,
            })
            .collect()
    }

    pub fn element_calls(&self) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| matches!(c, Call::Element(_)))
            .count()
    }

    pub fn activity_calls(&self) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| matches!(c, Call::Picks(_) | Call::Transfers(_)))
            .count()
    }
}

#[async_trait]
impl FplApi for FakeApi {
    async fn league_page(&self, league_id: u64, page: u32) -> Result<LeaguePage> {
        self.record(Call::Page(page));
        match self.pages.get(&page) {
            Some(data) => Ok(data.clone()),
            None => missing(format!("leagues-classic/{}/standings/?page={}", league_id, page)),
        }
    }

    async fn entry_summary(&self, entry: ManagerId) -> Result<EntrySummary> {
        match self.overall_ranks.get(&entry) {
            Some(rank) => Ok(EntrySummary {
                id: entry,
                summary_overall_rank: *rank,
                summary_overall_points: None,
            }),
            None => missing(format!("entry/{}/", entry)),
        }
    }

    async fn entry_history(&self, entry: ManagerId) -> Result<EntryHistory> {
        self.record(Call::History(entry));
        match self.histories.get(&entry) {
            Some(history) => Ok(history.clone()),
            None => missing(format!("entry/{}/history/", entry)),
        }
    }

    async fn entry_picks(&self, entry: ManagerId, gameweek: u32) -> Result<EntryPicks> {
        self.record(Call::Picks(entry));
        match self.picks.get(&(entry, gameweek)) {
            Some(picks) => Ok(picks.clone()),
            None => missing(format!("entry/{}/event/{}/picks/", entry, gameweek)),
        }
    }

    async fn entry_transfers(&self, entry: ManagerId) -> Result<Vec<Transfer>> {
        self.record(Call::Transfers(entry));
        match self.transfers.get(&entry) {
            Some(transfers) => Ok(transfers.clone()),
            None => missing(format!("entry/{}/transfers/", entry)),
        }
    }

    async fn bootstrap(&self) -> Result<Bootstrap> {
        match &self.bootstrap {
            Some(bootstrap) => Ok(bootstrap.clone()),
            None => missing("bootstrap-static/".to_string()),
        }
    }

    async fn element_points(&self, element: ElementId, gameweek: u32) -> Result<i64> {
        self.record(Call::Element(element));
        match self.element_points.get(&(element, gameweek)) {
            Some(points) => Ok(*points),
            None => missing(format!("element-summary/{}/", element)),
        }
    }
}
