use crate::core::fanout::{log_fetch_failure, scatter_gather};
use crate::domain::api::{Chip, ElementId, ManagerId, MANAGER_CHIP_POSITION};
use crate::domain::model::{
    ChipCounts, ManagerActivity, ManagerRow, PlayerCount, PlayerDirectory, TopNAnalysis,
};
use crate::domain::ports::FplApi;
use crate::utils::error::{LeagueError, Result};
use std::collections::HashMap;

/// Length of the captain and transfer leaderboards.
pub const LEADERBOARD_LEN: usize = 10;

/// IDs of the `min(n, len)` best-ranked managers, best first.
pub fn select_top_n(rows: &[ManagerRow], n: usize) -> Result<Vec<ManagerId>> {
    if n == 0 {
        return Err(LeagueError::InvalidConfigValueError {
            field: "top_n".to_string(),
            value: n.to_string(),
            reason: "N must be greater than 0".to_string(),
        });
    }

    let mut ranked: Vec<&ManagerRow> = rows.iter().collect();
    ranked.sort_by_key(|row| row.rank);
    Ok(ranked.into_iter().take(n).map(|row| row.manager_id).collect())
}

/// Picks and transfer history for each manager, in the order given.
/// Either part is left empty when its request fails.
pub async fn fetch_activity<A: FplApi + ?Sized>(
    api: &A,
    ids: &[ManagerId],
    gw: u32,
    concurrency: usize,
) -> Vec<ManagerActivity> {
    tracing::info!("Fetching detailed data for top {} managers", ids.len());

    let mut results = scatter_gather(ids.iter().copied(), concurrency, |id| async move {
        let (picks, transfers) = tokio::join!(api.entry_picks(id, gw), api.entry_transfers(id));
        ManagerActivity {
            manager_id: id,
            picks: picks
                .map_err(|e| log_fetch_failure("picks", id, &e))
                .ok(),
            transfers: transfers
                .map_err(|e| log_fetch_failure("transfers", id, &e))
                .ok(),
        }
    })
    .await;

    ids.iter().filter_map(|id| results.remove(id)).collect()
}

#[derive(Debug, Default, Clone, Copy)]
struct PlayerTally {
    captain: usize,
    vice_captain: usize,
    transfers_in: usize,
    transfers_out: usize,
}

/// Captain, transfer and chip statistics across the fetched managers.
pub fn aggregate(
    activity: &[ManagerActivity],
    gw: u32,
    players: &PlayerDirectory,
) -> TopNAnalysis {
    let mut chip_counts = ChipCounts::default();
    let mut tallies: HashMap<ElementId, PlayerTally> = HashMap::new();
    let mut triple_captains: HashMap<ElementId, usize> = HashMap::new();
    let mut manager_picks: HashMap<ElementId, usize> = HashMap::new();

    for manager in activity {
        if let Some(picks) = &manager.picks {
            if let Some(chip) = &picks.active_chip {
                if !chip_counts.record(chip) {
                    tracing::warn!(
                        "Unknown chip '{}' used by manager {}",
                        chip.code(),
                        manager.manager_id
                    );
                }
            }

            for pick in &picks.picks {
                let tally = tallies.entry(pick.element).or_default();
                if pick.is_captain {
                    tally.captain += 1;
                }
                if pick.is_vice_captain {
                    tally.vice_captain += 1;
                }
            }

            match &picks.active_chip {
                Some(Chip::TripleCaptain) => {
                    if let Some(captain) = picks.captain() {
                        *triple_captains.entry(captain.element).or_default() += 1;
                    }
                }
                Some(Chip::Manager) => {
                    if let Some(pick) = picks
                        .picks
                        .iter()
                        .find(|p| p.position == MANAGER_CHIP_POSITION)
                    {
                        *manager_picks.entry(pick.element).or_default() += 1;
                    }
                }
                _ => {}
            }
        }

        if let Some(transfers) = &manager.transfers {
            for transfer in transfers.iter().filter(|t| t.event == gw) {
                if transfer.element_in != 0 {
                    tallies.entry(transfer.element_in).or_default().transfers_in += 1;
                }
                if transfer.element_out != 0 {
                    tallies.entry(transfer.element_out).or_default().transfers_out += 1;
                }
            }
        }
    }

    let column = |select: fn(&PlayerTally) -> usize| {
        tallies
            .iter()
            .map(move |(element, tally)| (*element, select(tally)))
    };

    let analysis = TopNAnalysis {
        managers_analyzed: activity
            .iter()
            .filter(|m| m.picks.is_some() || m.transfers.is_some())
            .count(),
        chip_counts,
        captains: leaderboard(column(|t| t.captain), players, Some(LEADERBOARD_LEN)),
        transfers_in: leaderboard(column(|t| t.transfers_in), players, Some(LEADERBOARD_LEN)),
        transfers_out: leaderboard(column(|t| t.transfers_out), players, Some(LEADERBOARD_LEN)),
        triple_captains: leaderboard(triple_captains, players, None),
        manager_picks: leaderboard(manager_picks, players, None),
    };

    let vice_captains = tallies.values().filter(|t| t.vice_captain > 0).count();
    tracing::debug!(
        "Top-N analysis: {} players tallied, {} distinct vice-captains",
        tallies.len(),
        vice_captains
    );
    analysis
}

/// Non-zero counts with a known name, highest first, ties by element ID.
fn leaderboard(
    counts: impl IntoIterator<Item = (ElementId, usize)>,
    players: &PlayerDirectory,
    limit: Option<usize>,
) -> Vec<PlayerCount> {
    let mut board: Vec<PlayerCount> = counts
        .into_iter()
        .filter(|(_, count)| *count > 0)
        .filter_map(|(element, count)| {
            players.name(element).map(|name| PlayerCount {
                element,
                web_name: name.to_string(),
                count,
            })
        })
        .collect();

    board.sort_by(|a, b| b.count.cmp(&a.count).then(a.element.cmp(&b.element)));
    if let Some(limit) = limit {
        board.truncate(limit);
    }
    board
}
