use scraper::{ElementRef, Html, Selector};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::types::StandingsRow;

const SECTION_SELECTOR: &str = "div.accordion";
const TITLE_SELECTOR: &str = ".accordion-title";
const CONTENT_SELECTOR: &str = ".accordion-content";
const TABLE_SELECTORS: [&str; 2] = ["table.standings", "table.table-striped"];
const JSON_HTML_FIELDS: [&str; 4] = ["html", "content", "data", "view"];
const MIN_CELLS: usize = 6;

fn selector(css: &str) -> Selector {
    Selector::parse(css).unwrap()
}

fn cell_text(cell: &ElementRef) -> String {
    cell.text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// The aggregator serves group tables either as plain HTML or as a JSON
/// document carrying the HTML. Anything that does not parse as such JSON is
/// returned unchanged.
pub fn unwrap_fragment(body: &str) -> String {
    let trimmed = body.trim_start();
    if !(trimmed.starts_with('{') || trimmed.starts_with('"')) {
        return body.to_string();
    }

    match serde_json::from_str::<Value>(trimmed) {
        Ok(Value::String(html)) => html,
        Ok(Value::Object(map)) => JSON_HTML_FIELDS
            .iter()
            .find_map(|field| map.get(*field).and_then(Value::as_str))
            .map(str::to_string)
            .unwrap_or_else(|| {
                warn!("JSON standings payload without an HTML field");
                String::new()
            }),
        _ => body.to_string(),
    }
}

/// Parses one standings table row. Rows with fewer than six cells or any
/// non-integer numeric column are rejected.
fn parse_row(
    cells: &[ElementRef],
    competition: &str,
    group: &str,
) -> Result<StandingsRow, String> {
    if cells.len() < MIN_CELLS {
        return Err(format!("expected {} cells, found {}", MIN_CELLS, cells.len()));
    }

    let int = |idx: usize, column: &str| -> Result<i32, String> {
        let text = cell_text(&cells[idx]);
        text.parse::<i32>()
            .map_err(|_| format!("invalid {} value {:?}", column, text))
    };

    Ok(StandingsRow {
        competition: competition.to_string(),
        group: group.to_string(),
        team: cell_text(&cells[1]),
        position: int(0, "position")?,
        games_played: int(2, "games")?,
        wins: int(3, "wins")?,
        losses: int(4, "losses")?,
        points: int(5, "points")?,
    })
}

fn find_table<'a>(content: &ElementRef<'a>) -> Option<ElementRef<'a>> {
    TABLE_SELECTORS
        .iter()
        .find_map(|css| content.select(&selector(css)).next())
}

/// Extracts the standings of every group in which a team matching
/// `team_filter` (case-insensitive substring) plays. Matching groups are
/// returned whole; an empty filter keeps every group.
pub fn extract_standings(html: &str, competition: &str, team_filter: &str) -> Vec<StandingsRow> {
    let fragment = unwrap_fragment(html);
    let document = Html::parse_document(&fragment);

    let title_selector = selector(TITLE_SELECTOR);
    let content_selector = selector(CONTENT_SELECTOR);
    let body_selector = selector("tbody");
    let row_selector = selector("tr");
    let cell_selector = selector("td");

    let filter = team_filter.trim().to_uppercase();
    let mut standings = Vec::new();
    let mut sections = 0;

    for section in document.select(&selector(SECTION_SELECTOR)) {
        sections += 1;

        let group = match section.select(&title_selector).next() {
            Some(title) => cell_text(&title),
            None => continue,
        };

        let body = section
            .select(&content_selector)
            .next()
            .and_then(|content| find_table(&content))
            .and_then(|table| table.select(&body_selector).next());
        let body = match body {
            Some(b) => b,
            None => {
                debug!("Group {:?} has no standings table", group);
                continue;
            }
        };

        let mut group_rows = Vec::new();
        let mut has_team_of_interest = false;

        for row in body.select(&row_selector) {
            let cells: Vec<_> = row.select(&cell_selector).collect();
            if cells.len() < MIN_CELLS {
                debug!("Skipping short row in {:?} ({} cells)", group, cells.len());
                continue;
            }

            // A team admits its group even when its own row is unreadable.
            if cell_text(&cells[1]).to_uppercase().contains(&filter) {
                has_team_of_interest = true;
            }

            match parse_row(&cells, competition, &group) {
                Ok(parsed) => group_rows.push(parsed),
                Err(reason) => {
                    warn!("Discarding standings row in {:?}: {}", group, reason);
                }
            }
        }

        if has_team_of_interest {
            info!(
                "Found {} in group {:?} ({}), keeping {} rows",
                team_filter,
                group,
                competition,
                group_rows.len()
            );
            standings.extend(group_rows);
        }
    }

    info!(
        "Extracted {} standings rows from {} groups for {}",
        standings.len(),
        sections,
        competition
    );

    standings
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section(title: &str, rows: &str) -> String {
        format!(
            r#"<div class="accordion">
                 <div class="accordion-title">{}</div>
                 <div class="accordion-content">
                   <table class="standings"><thead><tr><th>#</th></tr></thead><tbody>{}</tbody></table>
                 </div>
               </div>"#,
            title, rows
        )
    }

    fn row(cols: [&str; 6]) -> String {
        let cells: String = cols.iter().map(|c| format!("<td>{}</td>", c)).collect();
        format!("<tr>{}</tr>", cells)
    }

    #[test]
    fn test_unwrap_fragment() {
        assert_eq!(unwrap_fragment("<div>x</div>"), "<div>x</div>");
        assert_eq!(unwrap_fragment(r#""<div>x</div>""#), "<div>x</div>");
        assert_eq!(unwrap_fragment(r#"{"html": "<div>x</div>"}"#), "<div>x</div>");
        assert_eq!(unwrap_fragment(r#"{"view": "<p>y</p>", "ok": true}"#), "<p>y</p>");
        assert_eq!(unwrap_fragment(r#"{"ok": true}"#), "");
        assert_eq!(unwrap_fragment("{ not json"), "{ not json");
    }

    #[test]
    fn test_keeps_whole_matching_group() {
        let html = section(
            "3.ª FASE - GRUPO Z",
            &[
                row(["1", "Sporting CP", "10", "9", "1", "19"]),
                row(["2", "FC Gaia", "10", "7", "3", "17"]),
                row(["3", "CD Póvoa", "10", "2", "8", "12"]),
            ]
            .concat(),
        );
        let rows = extract_standings(&html, "Sub16", "gaia");
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].team, "Sporting CP");
        assert_eq!(rows[0].group, "3.ª FASE - GRUPO Z");
        assert_eq!(rows[1].points, 17);
        assert_eq!(rows[2].position, 3);
        assert!(rows.iter().all(|r| r.competition == "Sub16"));
    }

    #[test]
    fn test_drops_groups_without_team_of_interest() {
        let html = [
            section("GRUPO A", &row(["1", "Benfica", "4", "4", "0", "8"])),
            section("GRUPO B", &row(["1", "FC Gaia", "4", "3", "1", "7"])),
        ]
        .concat();
        let rows = extract_standings(&html, "Sub14", "GAIA");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].group, "GRUPO B");
    }

    #[test]
    fn test_non_numeric_points_discard_the_row() {
        let html = section(
            "GRUPO A",
            &[
                row(["1", "FC Gaia", "4", "3", "1", "7"]),
                row(["2", "Benfica", "4", "2", "2", "-"]),
            ]
            .concat(),
        );
        let rows = extract_standings(&html, "Sub18", "GAIA");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].team, "FC Gaia");
    }

    #[test]
    fn test_unreadable_filtered_row_still_admits_group() {
        let html = section(
            "GRUPO Z",
            &[
                row(["1", "Sporting CP", "8", "7", "1", "15"]),
                row(["2", "FC Gaia", "8", "6", "2", "-"]),
            ]
            .concat(),
        );
        let rows = extract_standings(&html, "Sub16", "GAIA");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].team, "Sporting CP");
        assert_eq!(rows[0].group, "GRUPO Z");
    }

    #[test]
    fn test_short_rows_are_ignored() {
        let html = section(
            "GRUPO A",
            "<tr><td>1</td><td>FC Gaia</td><td>4</td></tr>",
        );
        assert!(extract_standings(&html, "Sub18", "GAIA").is_empty());
    }

    #[test]
    fn test_section_without_title_or_table_is_skipped() {
        let html = r#"
            <div class="accordion"><div class="accordion-content"><table class="standings"><tbody>
              <tr><td>1</td><td>FC Gaia</td><td>1</td><td>1</td><td>0</td><td>2</td></tr>
            </tbody></table></div></div>
            <div class="accordion"><div class="accordion-title">GRUPO X</div></div>"#;
        assert!(extract_standings(html, "Seniores", "GAIA").is_empty());
    }

    #[test]
    fn test_table_striped_fallback() {
        let html = r#"<div class="accordion"><div class="accordion-title">FASE 1</div>
            <div class="accordion-content"><table class="table table-striped"><tbody>
              <tr><td>1</td><td>FC Gaia</td><td>2</td><td>2</td><td>0</td><td>4</td></tr>
            </tbody></table></div></div>"#;
        let rows = extract_standings(html, "Seniores", "gaia");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].wins, 2);
    }
}
