use crate::core::fanout::{log_fetch_failure, scatter_gather};
use crate::domain::api::{
    EntryPicks, GameweekHistory, LeaguePage, ManagerId, StandingEntry, MANAGERS_PER_PAGE,
};
use crate::domain::model::ManagerRow;
use crate::domain::ports::FplApi;
use crate::utils::error::{LeagueError, Result};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone)]
pub struct StandingsOptions {
    pub league_id: u64,
    pub gameweek: Option<u32>,
    pub limit: Option<usize>,
    pub manager_filter: Option<HashSet<ManagerId>>,
    pub concurrency: usize,
}

impl StandingsOptions {
    pub fn new(league_id: u64) -> Self {
        Self {
            league_id,
            gameweek: None,
            limit: None,
            manager_filter: None,
            concurrency: 10,
        }
    }

    pub fn with_gameweek(mut self, gameweek: u32) -> Self {
        self.gameweek = Some(gameweek);
        self
    }

    pub fn with_limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_manager_filter(mut self, ids: Option<&[ManagerId]>) -> Self {
        self.manager_filter = ids.map(|ids| ids.iter().copied().collect());
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Page cap implied by `limit`. Not used when filtering, since filtered
    /// managers can sit on any page.
    fn max_pages(&self) -> Option<u32> {
        match (&self.manager_filter, self.limit) {
            (None, Some(limit)) => Some(limit.div_ceil(MANAGERS_PER_PAGE) as u32),
            _ => None,
        }
    }

    fn keeps(&self, entry: &StandingEntry) -> bool {
        self.manager_filter
            .as_ref()
            .map_or(true, |ids| ids.contains(&entry.entry))
    }
}

/// Gameweek detail gathered for one manager.
#[derive(Debug, Clone, Default)]
struct GameweekDetail {
    current: Option<GameweekHistory>,
    previous: Option<GameweekHistory>,
    picks: Option<EntryPicks>,
}

#[derive(Debug, Clone)]
enum Enrichment {
    OverallRank(Option<u64>),
    Gameweek(GameweekDetail),
}

/// Paginates a classic league and enriches every row with overall-rank,
/// chip and captain detail fetched in parallel per page.
pub struct StandingsFetcher<'a, A: FplApi + ?Sized> {
    api: &'a A,
    options: StandingsOptions,
}

impl<'a, A: FplApi + ?Sized> StandingsFetcher<'a, A> {
    pub fn new(api: &'a A, options: StandingsOptions) -> Self {
        Self { api, options }
    }

    pub async fn fetch(&self) -> Result<Vec<ManagerRow>> {
        let league_id = self.options.league_id;
        let max_pages = self.options.max_pages();
        let mut rows: Vec<ManagerRow> = Vec::new();
        let mut seen: HashSet<ManagerId> = HashSet::new();
        let mut page = 1u32;

        tracing::info!("Fetching league {} standings", league_id);

        loop {
            let page_data = match self.api.league_page(league_id, page).await {
                Ok(data) => data,
                Err(e) => {
                    tracing::warn!("Failed to fetch standings page {}: {}. Stopping.", page, e);
                    break;
                }
            };

            let (page_rows, has_next) = self.process_page(page_data, &mut seen).await;
            rows.extend(page_rows);
            tracing::info!("Page {} done, {} managers collected", page, rows.len());

            match &self.options.manager_filter {
                None => {
                    if let Some(limit) = self.options.limit {
                        if rows.len() >= limit {
                            rows.truncate(limit);
                            break;
                        }
                    }
                }
                Some(ids) => {
                    if seen.len() >= ids.len() {
                        tracing::debug!("All {} filtered managers found", ids.len());
                        break;
                    }
                }
            }

            if max_pages.is_some_and(|max| page >= max) || !has_next {
                break;
            }
            page += 1;
        }

        if rows.is_empty() {
            tracing::warn!("No managers found for league {}", league_id);
            return Err(LeagueError::NoStandingsError { league_id });
        }

        if let Some(ids) = &self.options.manager_filter {
            rerank_by_total(&mut rows);
            if let Some(limit) = self.options.limit {
                rows.truncate(limit);
            }
            tracing::info!("Kept {} of {} filtered managers", rows.len(), ids.len());
        }

        tracing::info!("Total managers retrieved: {}", rows.len());
        Ok(rows)
    }

    async fn process_page(
        &self,
        page: LeaguePage,
        seen: &mut HashSet<ManagerId>,
    ) -> (Vec<ManagerRow>, bool) {
        let Some(standings) = page.standings else {
            tracing::warn!("Invalid or empty standings page received");
            return (Vec::new(), false);
        };
        let has_next = standings.has_next;

        let entries: Vec<&StandingEntry> = standings
            .results
            .iter()
            .filter(|entry| self.options.keeps(entry))
            .collect();
        if entries.is_empty() {
            return (Vec::new(), has_next);
        }

        let ids: Vec<ManagerId> = entries.iter().map(|entry| entry.entry).collect();
        seen.extend(ids.iter().copied());

        let enrichments: HashMap<ManagerId, Enrichment> =
            scatter_gather(ids, self.options.concurrency, |id| self.enrich(id)).await;

        let rows = entries
            .into_iter()
            .map(|entry| {
                let mut row = ManagerRow::from_standing(entry);
                if let Some(enrichment) = enrichments.get(&entry.entry) {
                    apply_enrichment(&mut row, enrichment);
                }
                row
            })
            .collect();

        (rows, has_next)
    }

    async fn enrich(&self, entry: ManagerId) -> Enrichment {
        match self.options.gameweek {
            Some(gw) if gw > 1 => Enrichment::Gameweek(self.gameweek_detail(entry, gw).await),
            _ => {
                let rank = match self.api.overall_rank(entry).await {
                    Ok(rank) => rank,
                    Err(e) => {
                        log_fetch_failure("overall rank", entry, &e);
                        None
                    }
                };
                Enrichment::OverallRank(rank)
            }
        }
    }

    async fn gameweek_detail(&self, entry: ManagerId, gw: u32) -> GameweekDetail {
        let history = match self.api.entry_history(entry).await {
            Ok(history) => history,
            Err(e) => {
                log_fetch_failure("history", entry, &e);
                return GameweekDetail::default();
            }
        };

        let current = history.gameweek(gw).cloned();
        let previous = history.gameweek(gw - 1).cloned();

        // Chip and captain only matter once the gameweek shows up in history.
        let picks = if current.is_some() {
            match self.api.entry_picks(entry, gw).await {
                Ok(picks) => Some(picks),
                Err(e) => {
                    log_fetch_failure("picks", entry, &e);
                    None
                }
            }
        } else {
            None
        };

        GameweekDetail {
            current,
            previous,
            picks,
        }
    }
}

fn apply_enrichment(row: &mut ManagerRow, enrichment: &Enrichment) {
    match enrichment {
        Enrichment::OverallRank(rank) => row.set_overall_ranks(*rank, None),
        Enrichment::Gameweek(detail) => {
            row.set_overall_ranks(
                detail.current.as_ref().and_then(|gw| gw.overall_rank),
                detail.previous.as_ref().and_then(|gw| gw.overall_rank),
            );
            if let Some(current) = &detail.current {
                row.transfer_penalty = current.event_transfers_cost;
                row.points_on_bench = Some(current.points_on_bench);
            }
            if let Some(picks) = &detail.picks {
                row.chip_used = picks.active_chip.clone();
                row.captain = picks.captain().map(|p| p.element);
                row.vice_captain = picks.vice_captain().map(|p| p.element);
            }
        }
    }
}

/// Orders a filtered subset by season total and renumbers its rank from 1.
/// League rank deltas are left as reported by the league.
pub fn rerank_by_total(rows: &mut [ManagerRow]) {
    rows.sort_by(|a, b| b.total.cmp(&a.total));
    for (index, row) in rows.iter_mut().enumerate() {
        row.rank = index as u32 + 1;
    }
}
