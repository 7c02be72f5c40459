use pretty_assertions::assert_eq;

use fpb_scraper::{extract_standings, StandingsRow};

const STANDINGS_HTML: &str = include_str!("fixtures/standings_sub16.html");
const STANDINGS_JSON: &str = include_str!("fixtures/standings_sub16.json");

fn teams(rows: &[StandingsRow]) -> Vec<&str> {
    rows.iter().map(|r| r.team.as_str()).collect()
}

#[test]
fn test_only_groups_with_filtered_team() {
    let rows = extract_standings(STANDINGS_HTML, "Sub16 Masculinos", "GAIA");

    assert_eq!(teams(&rows), vec!["Sporting CP", "FC Gaia", "Illiabum"]);
    assert_eq!(
        rows[1],
        StandingsRow {
            competition: "Sub16 Masculinos".to_string(),
            group: "3.ª FASE - GRUPO Z".to_string(),
            team: "FC Gaia".to_string(),
            position: 2,
            games_played: 8,
            wins: 6,
            losses: 2,
            points: 14,
        }
    );
}

#[test]
fn test_filter_is_case_insensitive() {
    let upper = extract_standings(STANDINGS_HTML, "Sub16", "GAIA");
    let lower = extract_standings(STANDINGS_HTML, "Sub16", "gaia");
    assert_eq!(upper, lower);
}

#[test]
fn test_empty_filter_keeps_every_group() {
    let rows = extract_standings(STANDINGS_HTML, "Sub16", "");
    assert_eq!(rows.len(), 6);
    assert_eq!(rows[0].group, "2.ª FASE - GRUPO A");
    assert_eq!(rows[0].team, "SL Benfica");
    assert_eq!(rows[1].team, "CD Póvoa");
}

#[test]
fn test_unknown_team_yields_nothing() {
    assert!(extract_standings(STANDINGS_HTML, "Sub16", "OLIVAIS").is_empty());
}

#[test]
fn test_json_wrapped_payload() {
    let from_json = extract_standings(STANDINGS_JSON, "Sub16 Masculinos", "GAIA");
    let from_html = extract_standings(STANDINGS_HTML, "Sub16 Masculinos", "GAIA");
    assert_eq!(from_json, from_html);
}

#[test]
fn test_non_html_payload() {
    assert!(extract_standings("", "Sub16", "GAIA").is_empty());
    assert!(extract_standings(r#"{"error": "not found"}"#, "Sub16", "GAIA").is_empty());
}
