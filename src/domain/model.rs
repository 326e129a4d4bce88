use crate::domain::api::{Chip, ElementId, EntryPicks, ManagerId, StandingEntry, Transfer};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const TEAM_URL_BASE: &str = "https://fantasy.premierleague.com/entry";

/// One manager's line in the league table, filled in stage by stage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ManagerRow {
    pub manager_id: ManagerId,
    pub manager_name: String,
    pub team_name: String,
    pub rank: u32,
    pub last_rank: u32,
    pub rank_change: Option<i64>,
    pub pct_rank_change: Option<f64>,
    pub total: i64,
    pub gw_points: i64,
    pub net_points: Option<i64>,
    pub overall_rank: Option<u64>,
    pub prev_overall_rank: Option<u64>,
    pub overall_rank_change: Option<i64>,
    pub overall_rank_change_pct: Option<f64>,
    pub chip_used: Option<Chip>,
    pub transfer_penalty: i64,
    pub points_on_bench: Option<i64>,
    pub captain: Option<ElementId>,
    pub vice_captain: Option<ElementId>,
    pub captain_name: Option<String>,
    pub vice_captain_name: Option<String>,
}

impl ManagerRow {
    pub fn from_standing(entry: &StandingEntry) -> Self {
        let mut row = Self {
            manager_id: entry.entry,
            manager_name: entry.player_name.clone(),
            team_name: entry.entry_name.clone(),
            total: entry.total,
            gw_points: entry.event_total,
            ..Default::default()
        };
        row.set_league_ranks(entry.rank, entry.last_rank);
        row
    }

    /// Sets league rank and recomputes the week-on-week deltas.
    pub fn set_league_ranks(&mut self, rank: u32, last_rank: u32) {
        self.rank = rank;
        self.last_rank = last_rank;
        if last_rank == 0 {
            self.rank_change = None;
            self.pct_rank_change = None;
        } else {
            let change = i64::from(last_rank) - i64::from(rank);
            self.rank_change = Some(change);
            self.pct_rank_change = Some(round2(change as f64 / f64::from(last_rank) * 100.0));
        }
    }

    /// Sets overall ranks for this and the previous gameweek and derives the change.
    pub fn set_overall_ranks(&mut self, current: Option<u64>, previous: Option<u64>) {
        self.overall_rank = current;
        self.prev_overall_rank = previous;
        self.overall_rank_change = None;
        self.overall_rank_change_pct = None;

        if let (Some(current), Some(previous)) = (current, previous) {
            let change = previous as i64 - current as i64;
            self.overall_rank_change = Some(change);
            if previous > 0 {
                let pct = change as f64 / previous as f64 * 100.0;
                self.overall_rank_change_pct = Some(round2(pct));
            }
        }
    }

    pub fn team_url(&self, gameweek: u32) -> String {
        format!("{}/{}/event/{}", TEAM_URL_BASE, self.manager_id, gameweek)
    }

    pub fn manager_ref(&self) -> ManagerRef {
        ManagerRef {
            manager_id: self.manager_id,
            manager_name: self.manager_name.clone(),
            team_name: self.team_name.clone(),
            rank: self.rank,
        }
    }
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManagerRef {
    pub manager_id: ManagerId,
    pub manager_name: String,
    pub team_name: String,
    pub rank: u32,
}

/// Element ID to display name, from the bootstrap payload.
#[derive(Debug, Clone, Default)]
pub struct PlayerDirectory {
    names: HashMap<ElementId, String>,
}

impl PlayerDirectory {
    pub fn new(names: HashMap<ElementId, String>) -> Self {
        Self { names }
    }

    pub fn name(&self, element: ElementId) -> Option<&str> {
        self.names.get(&element).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl FromIterator<(ElementId, String)> for PlayerDirectory {
    fn from_iter<I: IntoIterator<Item = (ElementId, String)>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Raw per-manager data gathered for the top-N analysis.
#[derive(Debug, Clone, Default)]
pub struct ManagerActivity {
    pub manager_id: ManagerId,
    pub picks: Option<EntryPicks>,
    pub transfers: Option<Vec<Transfer>>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChipCounts {
    pub wildcard: usize,
    pub triple_captain: usize,
    pub bench_boost: usize,
    pub free_hit: usize,
    pub manager: usize,
}

impl ChipCounts {
    /// Counts a known chip. Returns false for chips it does not track.
    pub fn record(&mut self, chip: &Chip) -> bool {
        let slot = match chip {
            Chip::Wildcard => &mut self.wildcard,
            Chip::TripleCaptain => &mut self.triple_captain,
            Chip::BenchBoost => &mut self.bench_boost,
            Chip::FreeHit => &mut self.free_hit,
            Chip::Manager => &mut self.manager,
            Chip::Other(_) => return false,
        };
        *slot += 1;
        true
    }

    pub fn get(&self, chip: &Chip) -> usize {
        match chip {
            Chip::Wildcard => self.wildcard,
            Chip::TripleCaptain => self.triple_captain,
            Chip::BenchBoost => self.bench_boost,
            Chip::FreeHit => self.free_hit,
            Chip::Manager => self.manager,
            Chip::Other(_) => 0,
        }
    }

    pub fn total(&self) -> usize {
        self.wildcard + self.triple_captain + self.bench_boost + self.free_hit + self.manager
    }

    /// Chips used at least once, as (chip, count).
    pub fn used(&self) -> Vec<(Chip, usize)> {
        [
            Chip::Wildcard,
            Chip::TripleCaptain,
            Chip::BenchBoost,
            Chip::FreeHit,
            Chip::Manager,
        ]
        .into_iter()
        .map(|chip| {
            let count = self.get(&chip);
            (chip, count)
        })
        .filter(|(_, count)| *count > 0)
        .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerCount {
    pub element: ElementId,
    pub web_name: String,
    pub count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TopNAnalysis {
    pub managers_analyzed: usize,
    pub chip_counts: ChipCounts,
    pub captains: Vec<PlayerCount>,
    pub transfers_in: Vec<PlayerCount>,
    pub transfers_out: Vec<PlayerCount>,
    pub triple_captains: Vec<PlayerCount>,
    pub manager_picks: Vec<PlayerCount>,
}

/// Every manager tied at the extreme value of one metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Highlight<T> {
    pub value: T,
    pub managers: Vec<ManagerRef>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TopNAverages {
    pub managers: usize,
    pub avg_gw_points: Option<f64>,
    pub avg_net_points: Option<f64>,
    pub avg_overall_rank: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LeagueSummary {
    pub top_gw_points: Option<Highlight<i64>>,
    pub top_net_points_without_chips: Option<Highlight<i64>>,
    pub most_improved_rank: Option<Highlight<i64>>,
    pub biggest_rank_drop: Option<Highlight<i64>>,
    pub most_improved_rank_pct: Option<Highlight<f64>>,
    pub biggest_rank_drop_pct: Option<Highlight<f64>>,
    pub most_improved_overall_rank: Option<Highlight<i64>>,
    pub biggest_overall_rank_drop: Option<Highlight<i64>>,
    pub most_improved_overall_rank_pct: Option<Highlight<f64>>,
    pub biggest_overall_rank_drop_pct: Option<Highlight<f64>>,
    pub top_n_averages: TopNAverages,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisMode {
    /// Only the top N managers are fetched; no points adjustment.
    Quick,
    /// The whole league is fetched and every manager's points are adjusted.
    Full,
}

/// Everything the extract phase pulled from the API.
#[derive(Debug, Clone)]
pub struct LeagueSnapshot {
    pub league_id: u64,
    pub gameweek: u32,
    pub mode: AnalysisMode,
    pub top_n: usize,
    pub rows: Vec<ManagerRow>,
    pub players: Option<PlayerDirectory>,
    pub top_n_activity: Vec<ManagerActivity>,
}

/// Transform output: aggregated tables ready to be rendered and stored.
#[derive(Debug, Clone, Serialize)]
pub struct LeagueReport {
    pub league_id: u64,
    pub gameweek: u32,
    pub mode: AnalysisMode,
    pub generated_at: DateTime<Utc>,
    pub rows: Vec<ManagerRow>,
    pub top_n: Option<TopNAnalysis>,
    pub summary: LeagueSummary,
    #[serde(skip)]
    pub standings_csv: String,
    #[serde(skip)]
    pub standings_tsv: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rank_change_without_previous_rank() {
        let row = ManagerRow::from_standing(&StandingEntry {
            entry: 1,
            rank: 4,
            last_rank: 0,
            ..Default::default()
        });
        assert_eq!(row.rank_change, None);
        assert_eq!(row.pct_rank_change, None);
    }

    #[test]
    fn test_rank_change_and_percentage() {
        let row = ManagerRow::from_standing(&StandingEntry {
            entry: 1,
            rank: 2,
            last_rank: 3,
            ..Default::default()
        });
        assert_eq!(row.rank_change, Some(1));
        assert_eq!(row.pct_rank_change, Some(33.33));

        let dropped = ManagerRow::from_standing(&StandingEntry {
            entry: 2,
            rank: 9,
            last_rank: 6,
            ..Default::default()
        });
        assert_eq!(dropped.rank_change, Some(-3));
        assert_eq!(dropped.pct_rank_change, Some(-50.0));
    }

    #[test]
    fn test_overall_rank_change() {
        let mut row = ManagerRow::default();
        row.set_overall_ranks(Some(90_000), Some(120_000));
        assert_eq!(row.overall_rank_change, Some(30_000));
        assert_eq!(row.overall_rank_change_pct, Some(25.0));

        row.set_overall_ranks(Some(5), None);
        assert_eq!(row.overall_rank, Some(5));
        assert_eq!(row.overall_rank_change, None);
        assert_eq!(row.overall_rank_change_pct, None);

        row.set_overall_ranks(Some(5), Some(0));
        assert_eq!(row.overall_rank_change, Some(-5));
        assert_eq!(row.overall_rank_change_pct, None);
    }

    #[test]
    fn test_chip_counts_ignore_unknown_chips() {
        let mut counts = ChipCounts::default();
        assert!(counts.record(&Chip::BenchBoost));
        assert!(counts.record(&Chip::BenchBoost));
        assert!(counts.record(&Chip::FreeHit));
        assert!(!counts.record(&Chip::Other("mystery".to_string())));

        assert_eq!(counts.total(), 3);
        assert_eq!(
            counts.used(),
            vec![(Chip::BenchBoost, 2), (Chip::FreeHit, 1)]
        );
    }

    #[test]
    fn test_team_url() {
        let row = ManagerRow {
            manager_id: 42,
            ..Default::default()
        };
        assert_eq!(
            row.team_url(7),
            "https://fantasy.premierleague.com/entry/42/event/7"
        );
    }
}
