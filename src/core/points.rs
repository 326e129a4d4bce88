use crate::core::fanout::{log_element_failure, log_fetch_failure, scatter_gather};
use crate::domain::api::{Chip, ElementId, EntryPicks, ManagerId};
use crate::domain::model::ManagerRow;
use crate::domain::ports::FplApi;
use futures::future::join_all;
use std::sync::atomic::{AtomicUsize, Ordering};

const PROGRESS_EVERY: usize = 10;

/// Gameweek points with transfer hits and chip bonuses taken back out.
pub fn net_points(raw_points: i64, transfer_cost: i64, chip_effect: i64) -> i64 {
    raw_points - transfer_cost - chip_effect
}

async fn element_points_or_zero<A: FplApi + ?Sized>(api: &A, element: ElementId, gw: u32) -> i64 {
    match api.element_points(element, gw).await {
        Ok(points) => points,
        Err(e) => {
            log_element_failure(element, gw, &e);
            0
        }
    }
}

/// Points the active chip added on top of a normal gameweek.
///
/// Bench Boost adds every bench player's score; Triple Captain adds the
/// captain's score once more. Other chips do not change the points.
pub async fn chip_effect<A: FplApi + ?Sized>(api: &A, picks: &EntryPicks, gw: u32) -> i64 {
    match &picks.active_chip {
        Some(Chip::BenchBoost) => {
            let bench = picks
                .bench()
                .map(|pick| element_points_or_zero(api, pick.element, gw));
            join_all(bench).await.into_iter().sum()
        }
        Some(Chip::TripleCaptain) => match picks.captain() {
            Some(captain) => element_points_or_zero(api, captain.element, gw).await,
            None => 0,
        },
        _ => 0,
    }
}

/// Net points for one manager, `None` when their picks are unavailable.
pub async fn manager_net_points<A: FplApi + ?Sized>(
    api: &A,
    entry: ManagerId,
    gw: u32,
) -> Option<i64> {
    let picks = match api.entry_picks(entry, gw).await {
        Ok(picks) => picks,
        Err(e) => {
            log_fetch_failure("picks", entry, &e);
            return None;
        }
    };

    let history = picks.entry_history.clone().unwrap_or_default();
    let effect = chip_effect(api, &picks, gw).await;
    Some(net_points(history.points, history.event_transfers_cost, effect))
}

/// Fills `net_points` for every row, falling back to the raw gameweek
/// points when a manager's picks cannot be fetched.
pub async fn adjust_points<A: FplApi + ?Sized>(
    api: &A,
    rows: &mut [ManagerRow],
    gw: u32,
    concurrency: usize,
) {
    let total = rows.len();
    let done = AtomicUsize::new(0);
    tracing::info!("Calculating adjusted points for {} managers", total);

    let ids: Vec<ManagerId> = rows.iter().map(|row| row.manager_id).collect();
    let results = scatter_gather(ids, concurrency, |id| {
        let done = &done;
        async move {
            let result = manager_net_points(api, id, gw).await;
            let finished = done.fetch_add(1, Ordering::Relaxed) + 1;
            if finished % PROGRESS_EVERY == 0 {
                tracing::debug!("Adjusted points for {}/{} managers", finished, total);
            }
            result
        }
    })
    .await;

    let mut fallbacks = 0usize;
    for row in rows.iter_mut() {
        let adjusted = match results.get(&row.manager_id).copied().flatten() {
            Some(points) => points,
            None => {
                fallbacks += 1;
                row.gw_points
            }
        };
        row.net_points = Some(adjusted);
    }

    if fallbacks > 0 {
        tracing::warn!("{} of {} managers kept raw gameweek points", fallbacks, total);
    }
    tracing::info!("Adjusted points calculation complete");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::testing::FakeApi;
    use crate::domain::api::{Pick, PicksEntryHistory};

    fn squad(captain: ElementId) -> Vec<Pick> {
        (1..=15)
            .map(|position| Pick {
                element: position * 100,
                position,
                multiplier: if position > 11 { 0 } else { 1 },
                is_captain: position * 100 == captain,
                is_vice_captain: false,
            })
            .collect()
    }

    fn picks(chip: Option<Chip>, points: i64, cost: i64) -> EntryPicks {
        EntryPicks {
            active_chip: chip,
            entry_history: Some(PicksEntryHistory {
                event: 8,
                points,
                event_transfers_cost: cost,
                points_on_bench: 0,
            }),
            picks: squad(300),
        }
    }

    #[test]
    fn test_net_points_arithmetic() {
        assert_eq!(net_points(72, 4, 0), 68);
        assert_eq!(net_points(90, 8, 15), 67);
        assert_eq!(net_points(20, 12, 0), 8);
    }

    #[tokio::test]
    async fn test_bench_boost_subtracts_bench_points() {
        let mut api = FakeApi::default();
        api.element_points.insert((1200, 8), 2);
        api.element_points.insert((1300, 8), 6);
        api.element_points.insert((1400, 8), 1);
        // 1500 is unavailable and counts as 0.
        api.picks.insert((1, 8), picks(Some(Chip::BenchBoost), 80, 4));

        assert_eq!(manager_net_points(&api, 1, 8).await, Some(80 - 4 - 9));
        assert_eq!(api.element_calls(), 4);
    }

    #[tokio::test]
    async fn test_triple_captain_subtracts_captain_once() {
        let mut api = FakeApi::default();
        api.element_points.insert((300, 8), 13);
        api.picks.insert((1, 8), picks(Some(Chip::TripleCaptain), 95, 0));

        assert_eq!(manager_net_points(&api, 1, 8).await, Some(82));
        assert_eq!(api.element_calls(), 1);
    }

    #[tokio::test]
    async fn test_other_chips_have_no_effect() {
        let mut api = FakeApi::default();
        api.picks.insert((1, 8), picks(Some(Chip::FreeHit), 70, 0));
        api.picks.insert((2, 8), picks(Some(Chip::Wildcard), 55, 0));
        api.picks.insert((3, 8), picks(None, 61, 8));

        assert_eq!(manager_net_points(&api, 1, 8).await, Some(70));
        assert_eq!(manager_net_points(&api, 2, 8).await, Some(55));
        assert_eq!(manager_net_points(&api, 3, 8).await, Some(53));
        assert_eq!(api.element_calls(), 0);
    }

    #[tokio::test]
    async fn test_adjust_points_falls_back_to_raw_points() {
        let mut api = FakeApi::default();
        api.picks.insert((1, 8), picks(None, 64, 4));

        let mut rows = vec![
            ManagerRow {
                manager_id: 1,
                gw_points: 64,
                ..Default::default()
            },
            ManagerRow {
                manager_id: 2,
                gw_points: 47,
                ..Default::default()
            },
        ];

        adjust_points(&api, &mut rows, 8, 4).await;

        assert_eq!(rows[0].net_points, Some(60));
        assert_eq!(rows[1].net_points, Some(47));
    }
}
