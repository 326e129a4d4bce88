use crate::domain::model::{
    AnalysisMode, Highlight, LeagueReport, ManagerRef, ManagerRow, PlayerCount, TopNAnalysis,
};
use crate::utils::error::{LeagueError, Result};
use std::fmt::{Display, Write as _};

const TEAM_URL_COLUMN: &str = "Team URL";
const NET_POINTS_COLUMN: &str = "Net Points";

const COLUMNS: [&str; 18] = [
    "Rank",
    "Manager",
    "Team",
    "ID",
    TEAM_URL_COLUMN,
    "GW Points",
    NET_POINTS_COLUMN,
    "Captain",
    "Vice Captain",
    "Chip",
    "Transfer Cost",
    "Bench Points",
    "Overall Rank",
    "OR Change",
    "OR Change %",
    "Rank Change",
    "Rank Change %",
    "Total",
];

/// Standings column headers for the given mode. Net points only exist in full mode.
pub fn standings_headers(mode: AnalysisMode) -> Vec<&'static str> {
    COLUMNS
        .iter()
        .copied()
        .filter(|column| mode == AnalysisMode::Full || *column != NET_POINTS_COLUMN)
        .collect()
}

fn cell<T: Display>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn pct_cell(value: Option<f64>) -> String {
    value.map(|v| format!("{:.2}", v)).unwrap_or_default()
}

fn player_cell(name: &Option<String>, element: Option<u32>) -> String {
    match (name, element) {
        (Some(name), _) => name.clone(),
        (None, Some(element)) => element.to_string(),
        (None, None) => String::new(),
    }
}

fn standings_record(row: &ManagerRow, gameweek: u32, mode: AnalysisMode) -> Vec<String> {
    let mut record = vec![
        row.rank.to_string(),
        row.manager_name.clone(),
        row.team_name.clone(),
        row.manager_id.to_string(),
        row.team_url(gameweek),
        row.gw_points.to_string(),
    ];
    if mode == AnalysisMode::Full {
        record.push(cell(row.net_points));
    }
    record.extend([
        player_cell(&row.captain_name, row.captain),
        player_cell(&row.vice_captain_name, row.vice_captain),
        row.chip_used
            .as_ref()
            .map(|chip| chip.label().to_string())
            .unwrap_or_default(),
        row.transfer_penalty.to_string(),
        cell(row.points_on_bench),
        cell(row.overall_rank),
        cell(row.overall_rank_change),
        pct_cell(row.overall_rank_change_pct),
        cell(row.rank_change),
        pct_cell(row.pct_rank_change),
        row.total.to_string(),
    ]);
    record
}

/// Renders the standings table with the given field delimiter.
pub fn render_standings(
    rows: &[ManagerRow],
    gameweek: u32,
    mode: AnalysisMode,
    delimiter: u8,
) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(Vec::new());

    writer.write_record(standings_headers(mode))?;
    for row in rows {
        writer.write_record(standings_record(row, gameweek, mode))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| LeagueError::IoError(e.into_error()))?;
    String::from_utf8(bytes).map_err(|e| LeagueError::ProcessingError {
        message: format!("standings table is not valid UTF-8: {}", e),
    })
}

pub fn standings_csv(rows: &[ManagerRow], gameweek: u32, mode: AnalysisMode) -> Result<String> {
    render_standings(rows, gameweek, mode, b',')
}

pub fn standings_tsv(rows: &[ManagerRow], gameweek: u32, mode: AnalysisMode) -> Result<String> {
    render_standings(rows, gameweek, mode, b'\t')
}

/// The analysis document stored next to the tables.
pub fn analysis_json(report: &LeagueReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

fn padded_line<'a>(values: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    let cells: Vec<String> = values
        .zip(widths)
        .map(|(value, width)| format!("{:<width$}", value, width = *width))
        .collect();
    let mut line = cells.join("  ").trim_end().to_string();
    line.push('\n');
    line
}

fn text_table(headers: &[&str], records: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for record in records {
        for (width, value) in widths.iter_mut().zip(record) {
            *width = (*width).max(value.chars().count());
        }
    }

    let rules: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();

    let mut out = padded_line(headers.iter().copied(), &widths);
    out.push_str(&padded_line(rules.iter().map(String::as_str), &widths));
    for record in records {
        out.push_str(&padded_line(record.iter().map(String::as_str), &widths));
    }
    out
}

fn managers(refs: &[ManagerRef]) -> String {
    refs.iter()
        .map(|m| format!("{} ({})", m.manager_name, m.team_name))
        .collect::<Vec<_>>()
        .join(", ")
}

fn write_highlight<T: Display>(out: &mut String, title: &str, highlight: &Option<Highlight<T>>) {
    match highlight {
        Some(h) => {
            let _ = writeln!(out, "  {}: {} - {}", title, h.value, managers(&h.managers));
        }
        None => {
            let _ = writeln!(out, "  {}: n/a", title);
        }
    }
}

fn write_players(out: &mut String, title: &str, players: &[PlayerCount]) {
    let _ = writeln!(out, "{}:", title);
    if players.is_empty() {
        out.push_str("  none\n");
    }
    for player in players {
        let _ = writeln!(out, "  {:<20} {}", player.web_name, player.count);
    }
}

fn write_top_n(out: &mut String, analysis: &TopNAnalysis) {
    let _ = writeln!(out, "\nTop {} managers analysed", analysis.managers_analyzed);

    out.push_str("Chip usage:\n");
    let used = analysis.chip_counts.used();
    if used.is_empty() {
        out.push_str("  none\n");
    }
    for (chip, count) in used {
        let _ = writeln!(out, "  {:<20} {}", chip.label(), count);
    }

    write_players(out, "Most captained", &analysis.captains);
    write_players(out, "Most transferred in", &analysis.transfers_in);
    write_players(out, "Most transferred out", &analysis.transfers_out);
    if !analysis.triple_captains.is_empty() {
        write_players(out, "Triple captain picks", &analysis.triple_captains);
    }
    if !analysis.manager_picks.is_empty() {
        write_players(out, "Manager chip picks", &analysis.manager_picks);
    }
}

fn average(value: Option<f64>) -> String {
    value.map(|v| format!("{:.2}", v)).unwrap_or_else(|| "n/a".to_string())
}

/// Plain-text rendering of the report for the terminal.
pub fn terminal_summary(report: &LeagueReport) -> String {
    let mode = match report.mode {
        AnalysisMode::Quick => "quick",
        AnalysisMode::Full => "full",
    };
    let mut out = format!(
        "League {} - Gameweek {} ({} analysis)\n\n",
        report.league_id, report.gameweek, mode
    );

    // The URL column is too wide for a terminal.
    let url_index = standings_headers(report.mode)
        .iter()
        .position(|h| *h == TEAM_URL_COLUMN);
    let headers: Vec<&str> = standings_headers(report.mode)
        .into_iter()
        .filter(|h| *h != TEAM_URL_COLUMN)
        .collect();
    let records: Vec<Vec<String>> = report
        .rows
        .iter()
        .map(|row| {
            let mut record = standings_record(row, report.gameweek, report.mode);
            if let Some(index) = url_index {
                record.remove(index);
            }
            record
        })
        .collect();
    out.push_str(&text_table(&headers, &records));

    if let Some(analysis) = &report.top_n {
        write_top_n(&mut out, analysis);
    }

    let summary = &report.summary;
    out.push_str("\nHighlights:\n");
    write_highlight(&mut out, "Top points (raw)", &summary.top_gw_points);
    if report.mode == AnalysisMode::Full {
        write_highlight(
            &mut out,
            "Top points (without chips)",
            &summary.top_net_points_without_chips,
        );
    }
    write_highlight(&mut out, "Most improved rank", &summary.most_improved_rank);
    write_highlight(&mut out, "Biggest rank drop", &summary.biggest_rank_drop);
    write_highlight(&mut out, "Most improved rank (%)", &summary.most_improved_rank_pct);
    write_highlight(&mut out, "Biggest rank drop (%)", &summary.biggest_rank_drop_pct);
    write_highlight(
        &mut out,
        "Most improved overall rank",
        &summary.most_improved_overall_rank,
    );
    write_highlight(
        &mut out,
        "Biggest overall rank drop",
        &summary.biggest_overall_rank_drop,
    );
    write_highlight(
        &mut out,
        "Most improved overall rank (%)",
        &summary.most_improved_overall_rank_pct,
    );
    write_highlight(
        &mut out,
        "Biggest overall rank drop (%)",
        &summary.biggest_overall_rank_drop_pct,
    );

    let averages = &summary.top_n_averages;
    let _ = writeln!(out, "\nAverages for top {} managers:", averages.managers);
    let _ = writeln!(out, "  GW points:    {}", average(averages.avg_gw_points));
    if report.mode == AnalysisMode::Full {
        let _ = writeln!(out, "  Net points:   {}", average(averages.avg_net_points));
    }
    let _ = writeln!(out, "  Overall rank: {}", average(averages.avg_overall_rank));

    out
}
