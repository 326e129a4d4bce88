use httpmock::prelude::*;
use httpmock::Mock;
use mini_league_etl::{CliConfig, EtlEngine, LeaguePipeline, LocalStorage};
use serde_json::json;
use std::io::Read;
use tempfile::TempDir;

const LEAGUE: u64 = 777;
const GW: u32 = 5;

fn config(server: &MockServer, output_path: &str, full: bool) -> CliConfig {
    CliConfig {
        league_id: LEAGUE,
        gameweek: None,
        top_n: 2,
        full,
        limit: None,
        manager_ids: vec![],
        base_url: format!("{}/api/", server.base_url()),
        output_path: output_path.to_string(),
        concurrent_requests: 4,
        analysis_concurrency: 4,
        page_timeout_secs: 5,
        entry_timeout_secs: 5,
        verbose: false,
        json_logs: false,
        monitor: false,
    }
}

fn standing(id: u64, rank: u32, last_rank: u32, total: i64, event_total: i64) -> serde_json::Value {
    json!({
        "entry": id,
        "player_name": format!("Manager {}", id),
        "entry_name": format!("Team {}", id),
        "rank": rank,
        "last_rank": last_rank,
        "total": total,
        "event_total": event_total
    })
}

fn picks(chip: Option<&str>, points: i64, cost: i64) -> serde_json::Value {
    let picks: Vec<serde_json::Value> = (1..=15)
        .map(|position| {
            let multiplier = match position {
                1 => 2,
                12.. => 0,
                _ => 1,
            };
            json!({
                "element": position,
                "position": position,
                "multiplier": multiplier,
                "is_captain": position == 1,
                "is_vice_captain": position == 2
            })
        })
        .collect();
    json!({
        "active_chip": chip,
        "entry_history": {"event": GW, "points": points, "event_transfers_cost": cost, "points_on_bench": 6},
        "picks": picks
    })
}

fn history(previous_rank: u64, rank: u64, cost: i64) -> serde_json::Value {
    json!({
        "current": [
            {"event": GW - 1, "points": 50, "total_points": 300, "overall_rank": previous_rank,
             "event_transfers": 0, "event_transfers_cost": 0, "points_on_bench": 2},
            {"event": GW, "points": 70, "total_points": 370, "overall_rank": rank,
             "event_transfers": 1, "event_transfers_cost": cost, "points_on_bench": 6}
        ]
    })
}

/// Returns the picks mock of the league leader.
async fn mock_league(server: &MockServer) -> Mock<'_> {
    let elements: Vec<serde_json::Value> = (1..=15)
        .map(|id| json!({"id": id, "web_name": format!("P{}", id)}))
        .collect();
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/bootstrap-static/");
            then.status(200).json_body(json!({
                "elements": elements,
                "events": [
                    {"id": GW - 1, "is_current": false, "finished": true},
                    {"id": GW, "is_current": true, "finished": false}
                ]
            }));
        })
        .await;

    server
        .mock_async(|when, then| {
            when.method(GET)
                .path(format!("/api/leagues-classic/{}/standings/", LEAGUE))
                .query_param("page_standings", "1");
            then.status(200).json_body(json!({
                "league": {"id": LEAGUE, "name": "Integration League"},
                "standings": {
                    "has_next": false,
                    "page": 1,
                    "results": [
                        standing(101, 1, 2, 400, 75),
                        standing(102, 2, 1, 390, 60),
                        standing(103, 3, 3, 350, 40)
                    ]
                }
            }));
        })
        .await;

    let histories = [
        (101u64, 20_000u64, 10_000u64, 4i64),
        (102, 15_000, 18_000, 0),
        (103, 30_000, 30_000, 0),
    ];
    for (id, previous, rank, cost) in histories {
        server
            .mock_async(|when, then| {
                when.method(GET).path(format!("/api/entry/{}/history/", id));
                then.status(200).json_body(history(previous, rank, cost));
            })
            .await;
    }

    let leader_picks = server
        .mock_async(|when, then| {
            when.method(GET).path(format!("/api/entry/101/event/{}/picks/", GW));
            then.status(200).json_body(picks(Some("bboost"), 75, 4));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path(format!("/api/entry/102/event/{}/picks/", GW));
            then.status(200).json_body(picks(Some("3xc"), 60, 0));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path(format!("/api/entry/103/event/{}/picks/", GW));
            then.status(404);
        })
        .await;

    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/entry/101/transfers/");
            then.status(200)
                .json_body(json!([{"element_in": 3, "element_out": 4, "event": GW}]));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/entry/102/transfers/");
            then.status(500);
        })
        .await;

    for (element, points) in [(1u32, 12i64), (12, 2), (13, 3), (14, 0), (15, 1)] {
        server
            .mock_async(|when, then| {
                when.method(GET)
                    .path(format!("/api/element-summary/{}/", element));
                then.status(200).json_body(json!({
                    "history": [{"round": GW, "total_points": points}]
                }));
            })
            .await;
    }

    leader_picks
}

fn read_entry(archive: &mut zip::ZipArchive<std::io::Cursor<Vec<u8>>>, name: &str) -> String {
    let mut content = String::new();
    archive
        .by_name(name)
        .unwrap()
        .read_to_string(&mut content)
        .unwrap();
    content
}

#[tokio::test]
async fn test_end_to_end_full_analysis() {
    let temp_dir = TempDir::new().unwrap();
    let output_path = temp_dir.path().to_str().unwrap().to_string();

    let server = MockServer::start_async().await;
    let leader_picks = mock_league(&server).await;

    let storage = LocalStorage::new(output_path.clone());
    let pipeline = LeaguePipeline::new(storage, config(&server, &output_path, true)).unwrap();
    let engine = EtlEngine::new_with_monitoring(pipeline, false);

    let output = engine.run().await.unwrap();

    assert!(output.output_path.ends_with("league_777_gw5.zip"));
    assert!(output.summary.contains("League 777 - Gameweek 5 (full analysis)"));
    assert!(output.summary.contains("Manager 101"));
    // Standings, points and top-N share one picks download.
    assert_eq!(leader_picks.hits_async().await, 1);

    let full_path = temp_dir.path().join("league_777_gw5.zip");
    assert!(full_path.exists());

    let zip_data = std::fs::read(&full_path).unwrap();
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(zip_data)).unwrap();
    assert_eq!(archive.len(), 3);

    let csv_content = read_entry(&mut archive, "standings.csv");
    let mut reader = csv::Reader::from_reader(csv_content.as_bytes());
    let headers = reader.headers().unwrap().clone();
    let column = |name: &str| headers.iter().position(|h| h == name).unwrap();
    let records: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();

    assert_eq!(records.len(), 3);
    let net = column("Net Points");
    // 75 - 4 - (2 + 3 + 0 + 1) for the bench boost.
    assert_eq!(&records[0][net], "65");
    // 60 - 12 for the triple captain.
    assert_eq!(&records[1][net], "48");
    // No picks: raw points.
    assert_eq!(&records[2][net], "40");

    assert_eq!(&records[0][column("Chip")], "Bench Boost");
    assert_eq!(&records[0][column("Captain")], "P1");
    assert_eq!(&records[0][column("Transfer Cost")], "4");
    assert_eq!(&records[0][column("OR Change")], "10000");
    assert_eq!(&records[0][column("OR Change %")], "50.00");
    assert_eq!(&records[1][column("Rank Change")], "-1");
    assert_eq!(&records[2][column("Chip")], "");

    let tsv_content = read_entry(&mut archive, "standings.tsv");
    assert_eq!(tsv_content.lines().count(), 4);

    let json_content = read_entry(&mut archive, "analysis.json");
    let analysis: serde_json::Value = serde_json::from_str(&json_content).unwrap();
    assert_eq!(analysis["gameweek"], 5);
    assert_eq!(analysis["top_n"]["chip_counts"]["bench_boost"], 1);
    assert_eq!(analysis["top_n"]["chip_counts"]["triple_captain"], 1);
    assert_eq!(analysis["top_n"]["captains"][0]["web_name"], "P1");
    assert_eq!(analysis["top_n"]["captains"][0]["count"], 2);
    assert_eq!(analysis["top_n"]["transfers_in"][0]["web_name"], "P3");
    assert_eq!(analysis["top_n"]["triple_captains"][0]["element"], 1);
    assert_eq!(
        analysis["summary"]["top_net_points_without_chips"]["managers"][0]["manager_id"],
        101
    );
}

#[tokio::test]
async fn test_quick_analysis_skips_points_adjustment() {
    let temp_dir = TempDir::new().unwrap();
    let output_path = temp_dir.path().to_str().unwrap().to_string();

    let server = MockServer::start_async().await;
    mock_league(&server).await;

    let storage = LocalStorage::new(output_path.clone());
    let pipeline = LeaguePipeline::new(storage, config(&server, &output_path, false)).unwrap();
    let output = EtlEngine::new(pipeline).run().await.unwrap();

    let zip_data = std::fs::read(temp_dir.path().join("league_777_gw5.zip")).unwrap();
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(zip_data)).unwrap();
    let csv_content = read_entry(&mut archive, "standings.csv");

    assert!(!csv_content.contains("Net Points"));
    assert_eq!(csv_content.lines().count(), 3);
    assert!(output.summary.contains("(quick analysis)"));
}

#[tokio::test]
async fn test_missing_league_fails() {
    let temp_dir = TempDir::new().unwrap();
    let output_path = temp_dir.path().to_str().unwrap().to_string();

    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/bootstrap-static/");
            then.status(200).json_body(json!({
                "elements": [],
                "events": [{"id": 1, "is_current": true, "finished": false}]
            }));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET)
                .path(format!("/api/leagues-classic/{}/standings/", LEAGUE));
            then.status(404);
        })
        .await;

    let storage = LocalStorage::new(output_path.clone());
    let pipeline = LeaguePipeline::new(storage, config(&server, &output_path, false)).unwrap();
    let err = EtlEngine::new(pipeline).run().await.unwrap_err();

    assert!(matches!(
        err,
        mini_league_etl::LeagueError::NoStandingsError { league_id: LEAGUE }
    ));
    assert!(!temp_dir.path().join("league_777_gw1.zip").exists());
}
