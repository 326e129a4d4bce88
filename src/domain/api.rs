//! Payloads returned by the fantasy API.
//!
//! Only the fields the pipeline reads are modelled. Everything is defaulted so
//! that partially populated responses (the API is eventually consistent around
//! gameweek deadlines) still decode.

use serde::{Deserialize, Serialize};
use std::fmt;

pub type ManagerId = u64;
pub type ElementId = u32;

/// Number of managers the standings endpoint returns per page.
pub const MANAGERS_PER_PAGE: usize = 50;

/// Squad slots 12-15 are the bench.
pub const LAST_STARTING_POSITION: u32 = 11;

/// Slot filled by the assistant manager while the manager chip is active.
pub const MANAGER_CHIP_POSITION: u32 = 16;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct LeaguePage {
    pub league: Option<LeagueInfo>,
    pub standings: Option<StandingsPage>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct LeagueInfo {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct StandingsPage {
    pub has_next: bool,
    pub page: u32,
    pub results: Vec<StandingEntry>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct StandingEntry {
    pub entry: ManagerId,
    pub player_name: String,
    pub entry_name: String,
    pub rank: u32,
    pub last_rank: u32,
    pub total: i64,
    pub event_total: i64,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct EntrySummary {
    pub id: ManagerId,
    pub summary_overall_rank: Option<u64>,
    pub summary_overall_points: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct EntryHistory {
    pub current: Vec<GameweekHistory>,
}

impl EntryHistory {
    pub fn gameweek(&self, gw: u32) -> Option<&GameweekHistory> {
        self.current.iter().find(|row| row.event == gw)
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct GameweekHistory {
    pub event: u32,
    pub points: i64,
    pub total_points: i64,
    pub overall_rank: Option<u64>,
    pub event_transfers: u32,
    pub event_transfers_cost: i64,
    pub points_on_bench: i64,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct EntryPicks {
    pub active_chip: Option<Chip>,
    pub entry_history: Option<PicksEntryHistory>,
    pub picks: Vec<Pick>,
}

impl EntryPicks {
    pub fn captain(&self) -> Option<&Pick> {
        self.picks.iter().find(|p| p.is_captain)
    }

    pub fn vice_captain(&self) -> Option<&Pick> {
        self.picks.iter().find(|p| p.is_vice_captain)
    }

    pub fn bench(&self) -> impl Iterator<Item = &Pick> {
        self.picks
            .iter()
            .filter(|p| p.position > LAST_STARTING_POSITION)
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct PicksEntryHistory {
    pub event: u32,
    pub points: i64,
    pub event_transfers_cost: i64,
    pub points_on_bench: i64,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Pick {
    pub element: ElementId,
    pub position: u32,
    pub multiplier: u32,
    pub is_captain: bool,
    pub is_vice_captain: bool,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Transfer {
    pub element_in: ElementId,
    pub element_out: ElementId,
    pub event: u32,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Bootstrap {
    pub elements: Vec<Element>,
    pub events: Vec<Event>,
}

impl Bootstrap {
    pub fn current_gameweek(&self) -> Option<u32> {
        self.events.iter().find(|e| e.is_current).map(|e| e.id)
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Element {
    pub id: ElementId,
    pub web_name: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Event {
    pub id: u32,
    pub is_current: bool,
    pub finished: bool,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ElementSummary {
    pub history: Vec<ElementRound>,
}

impl ElementSummary {
    /// Points scored in `gw`, 0 when the player has no row for it.
    pub fn points_in(&self, gw: u32) -> i64 {
        self.history
            .iter()
            .find(|r| r.round == gw)
            .map(|r| r.total_points)
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ElementRound {
    pub round: u32,
    pub total_points: i64,
}

/// A one-off gameweek chip, keyed by the API's short code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(from = "String", into = "String")]
pub enum Chip {
    Wildcard,
    TripleCaptain,
    BenchBoost,
    FreeHit,
    Manager,
    Other(String),
}

impl Chip {
    pub fn code(&self) -> &str {
        match self {
            Chip::Wildcard => "wildcard",
            Chip::TripleCaptain => "3xc",
            Chip::BenchBoost => "bboost",
            Chip::FreeHit => "freehit",
            Chip::Manager => "manager",
            Chip::Other(code) => code,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Chip::Wildcard => "Wildcard",
            Chip::TripleCaptain => "Triple Captain",
            Chip::BenchBoost => "Bench Boost",
            Chip::FreeHit => "Free Hit",
            Chip::Manager => "Manager",
            Chip::Other(code) => code,
        }
    }
}

impl From<String> for Chip {
    fn from(code: String) -> Self {
        match code.as_str() {
            "wildcard" => Chip::Wildcard,
            "3xc" => Chip::TripleCaptain,
            "bboost" => Chip::BenchBoost,
            "freehit" => Chip::FreeHit,
            "manager" => Chip::Manager,
            _ => Chip::Other(code),
        }
    }
}

impl From<Chip> for String {
    fn from(chip: Chip) -> Self {
        chip.code().to_string()
    }
}

impl fmt::Display for Chip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
