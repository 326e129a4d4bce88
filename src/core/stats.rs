use crate::domain::api::Chip;
use crate::domain::model::{Highlight, LeagueSummary, ManagerRow, TopNAverages};

#[derive(Debug, Clone, Copy)]
enum Extreme {
    Max,
    Min,
}

/// Every row tied at the extreme value of `metric`. Rows without a value are skipped.
fn highlight<T, F>(rows: &[ManagerRow], metric: F, extreme: Extreme) -> Option<Highlight<T>>
where
    T: Copy + PartialOrd,
    F: Fn(&ManagerRow) -> Option<T>,
{
    let values: Vec<(&ManagerRow, T)> = rows
        .iter()
        .filter_map(|row| metric(row).map(|value| (row, value)))
        .collect();

    let best = values
        .iter()
        .map(|(_, value)| *value)
        .reduce(|best, value| match extreme {
            Extreme::Max if value > best => value,
            Extreme::Min if value < best => value,
            _ => best,
        })?;

    Some(Highlight {
        value: best,
        managers: values
            .iter()
            .filter(|(_, value)| *value == best)
            .map(|(row, _)| row.manager_ref())
            .collect(),
    })
}

fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / count as f64)
}

/// Averages over the `top_n` best-ranked rows.
pub fn top_n_averages(rows: &[ManagerRow], top_n: usize) -> TopNAverages {
    let mut ranked: Vec<&ManagerRow> = rows.iter().collect();
    ranked.sort_by_key(|row| row.rank);
    ranked.truncate(top_n);

    TopNAverages {
        managers: ranked.len(),
        avg_gw_points: mean(ranked.iter().map(|row| row.gw_points as f64)),
        avg_net_points: mean(ranked.iter().filter_map(|row| row.net_points).map(|p| p as f64)),
        avg_overall_rank: mean(ranked.iter().filter_map(|row| row.overall_rank).map(|r| r as f64)),
    }
}

/// League-wide highlights for the gameweek.
///
/// Net points leaders exclude managers who played Free Hit and are only
/// reported once the points adjustment has filled `net_points`.
pub fn summarize(rows: &[ManagerRow], top_n: usize) -> LeagueSummary {
    let without_free_hit = |row: &ManagerRow| match row.chip_used {
        Some(Chip::FreeHit) => None,
        _ => row.net_points,
    };

    LeagueSummary {
        top_gw_points: highlight(rows, |r| Some(r.gw_points), Extreme::Max),
        top_net_points_without_chips: highlight(rows, without_free_hit, Extreme::Max),
        most_improved_rank: highlight(rows, |r| r.rank_change, Extreme::Max),
        biggest_rank_drop: highlight(rows, |r| r.rank_change, Extreme::Min),
        most_improved_rank_pct: highlight(rows, |r| finite(r.pct_rank_change), Extreme::Max),
        biggest_rank_drop_pct: highlight(rows, |r| finite(r.pct_rank_change), Extreme::Min),
        most_improved_overall_rank: highlight(rows, |r| r.overall_rank_change, Extreme::Max),
        biggest_overall_rank_drop: highlight(rows, |r| r.overall_rank_change, Extreme::Min),
        most_improved_overall_rank_pct: highlight(
            rows,
            |r| finite(r.overall_rank_change_pct),
            Extreme::Max,
        ),
        biggest_overall_rank_drop_pct: highlight(
            rows,
            |r| finite(r.overall_rank_change_pct),
            Extreme::Min,
        ),
        top_n_averages: top_n_averages(rows, top_n),
    }
}
