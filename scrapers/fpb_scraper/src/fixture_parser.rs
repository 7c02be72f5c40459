use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info, warn};

use crate::{
    types::{FixtureRecord, FixtureStatus, TimeField, UNKNOWN_TEAM},
    utils,
};

const DAY_SELECTOR: &str = "div.day-wrapper";
const DATE_SELECTOR: &str = "h3.date";
const GAME_SELECTOR: &str = "a.game-wrapper-a";
const RESULT_SELECTOR: &str = ".results_wrapper h3.results_text";
const VICTORY_SELECTOR: &str = ".victory_font";
const COMPETITION_SELECTOR: &str = ".competition span";
const VENUE_SELECTOR: &str = ".location-wrapper b";
const IMAGE_SELECTOR: &str = "img[src]";

/// Ordered lookup strategies for the fields whose markup differs between
/// page variants. Within each list the first selector yielding non-empty
/// text wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionProfile {
    pub name: &'static str,
    pub time_field: &'static [&'static str],
    pub team_container: &'static str,
    pub team_name: &'static [&'static str],
}

impl ExtractionProfile {
    /// Calendar/results pages with `.team-container` blocks.
    pub fn current() -> Self {
        Self {
            name: "current",
            time_field: &[".hour h3", ".time", ".schedule-time"],
            team_container: ".team-container",
            team_name: &[".sigla", ".fullName", ".team-name"],
        }
    }

    /// Older page layout where each side is a `.team` block with a
    /// `.team-name` and the kickoff lives in `.time`.
    pub fn legacy() -> Self {
        Self {
            name: "legacy",
            time_field: &[".time", ".schedule-time", ".hour h3"],
            team_container: ".team",
            team_name: &[".team-name", ".sigla", ".fullName"],
        }
    }

    pub fn detect(document: &Html) -> Self {
        if document.select(&selector(".team-container")).next().is_some() {
            Self::current()
        } else if document.select(&selector(".team-name")).next().is_some() {
            Self::legacy()
        } else {
            Self::current()
        }
    }
}

fn selector(css: &str) -> Selector {
    Selector::parse(css).unwrap()
}

/// Element text with whitespace runs collapsed to single spaces.
fn clean_text(element: &ElementRef) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Tries each selector in order; the first element with non-empty text wins.
fn first_text(scope: &ElementRef, strategies: &[&str]) -> Option<String> {
    strategies.iter().find_map(|css| {
        scope
            .select(&selector(css))
            .map(|el| clean_text(&el))
            .find(|text| !text.is_empty())
    })
}

/// Extracts every fixture from an fpb.pt calendar (`is_agenda`) or results
/// page. Never fails: days without a readable date and malformed games are
/// skipped.
pub fn extract_fixtures(html: &str, is_agenda: bool, season: &str) -> Vec<FixtureRecord> {
    let document = Html::parse_document(html);
    let profile = ExtractionProfile::detect(&document);
    extract_with_profile(&document, &profile, is_agenda, season)
}

pub fn extract_with_profile(
    document: &Html,
    profile: &ExtractionProfile,
    is_agenda: bool,
    season: &str,
) -> Vec<FixtureRecord> {
    let parser = FixtureParser {
        profile,
        is_agenda,
        season,
    };

    let day_selector = selector(DAY_SELECTOR);
    let date_selector = selector(DATE_SELECTOR);
    let game_selector = selector(GAME_SELECTOR);

    let mut fixtures = Vec::new();
    let mut skipped_days = 0;
    let mut skipped_games = 0;

    for day in document.select(&day_selector) {
        let date = day
            .select(&date_selector)
            .next()
            .map(|el| clean_text(&el))
            .and_then(|text| utils::parse_date(&text));

        let date = match date {
            Some(d) => d,
            None => {
                skipped_days += 1;
                continue;
            }
        };

        for game in day.select(&game_selector) {
            match parser.parse_game(&game, date) {
                Some(fixture) => fixtures.push(fixture),
                None => skipped_games += 1,
            }
        }
    }

    if skipped_days > 0 {
        warn!("Skipped {} day blocks without a parseable date", skipped_days);
    }
    info!(
        "Extracted {} fixtures ({} layout, agenda={}, season={}, {} games skipped)",
        fixtures.len(),
        profile.name,
        is_agenda,
        season,
        skipped_games
    );

    fixtures
}

struct FixtureParser<'a> {
    profile: &'a ExtractionProfile,
    is_agenda: bool,
    season: &'a str,
}

impl FixtureParser<'_> {
    fn parse_game(&self, game: &ElementRef, date: chrono::NaiveDate) -> Option<FixtureRecord> {
        let (home_team, away_team) = match self.extract_teams(game) {
            Some(teams) => teams,
            None => {
                debug!("Skipping game on {}: fewer than two team blocks", date);
                return None;
            }
        };

        let time_field = first_text(game, self.profile.time_field)
            .map(|raw| utils::classify_time_field(&raw))
            .unwrap_or(TimeField::Neither);

        let mut status = FixtureStatus::Scheduled;
        let mut scores = None;

        if !self.is_agenda {
            if let Some(pair) = self.extract_result_scores(game) {
                status = FixtureStatus::Finished;
                scores = Some(pair);
            }
        }

        let time = match time_field {
            TimeField::Time(time) => Some(time),
            TimeField::Score(home, away) => {
                status = FixtureStatus::Finished;
                if scores.is_none() {
                    scores = Some((home, away));
                }
                None
            }
            TimeField::Neither => None,
        };

        if game.select(&selector(VICTORY_SELECTOR)).next().is_some() {
            status = FixtureStatus::Finished;
        }

        let (division, competition) = utils::split_competition(
            game.select(&selector(COMPETITION_SELECTOR))
                .next()
                .map(|el| clean_text(&el))
                .as_deref(),
        );

        let venue = game
            .select(&selector(VENUE_SELECTOR))
            .next()
            .map(|el| clean_text(&el))
            .filter(|v| !v.is_empty());

        let (home_logo_url, away_logo_url) = self.extract_logos(game);

        Some(FixtureRecord {
            identity_key: utils::identity_key(date, &home_team, &away_team),
            date,
            time,
            home_team,
            away_team,
            home_score: scores.map(|(home, _)| home),
            away_score: scores.map(|(_, away)| away),
            division,
            competition,
            venue,
            home_logo_url,
            away_logo_url,
            status,
            season: self.season.to_string(),
        })
    }

    fn extract_teams(&self, game: &ElementRef) -> Option<(String, String)> {
        let containers: Vec<_> = game.select(&selector(self.profile.team_container)).collect();
        if containers.len() < 2 {
            return None;
        }

        let name = |container: &ElementRef| {
            first_text(container, self.profile.team_name)
                .unwrap_or_else(|| UNKNOWN_TEAM.to_string())
        };

        Some((name(&containers[0]), name(&containers[1])))
    }

    fn extract_result_scores(&self, game: &ElementRef) -> Option<(i32, i32)> {
        let texts: Vec<String> = game
            .select(&selector(RESULT_SELECTOR))
            .map(|el| clean_text(&el))
            .collect();
        if texts.len() < 2 {
            return None;
        }

        match (texts[0].parse::<i32>(), texts[1].parse::<i32>()) {
            (Ok(home), Ok(away)) => Some((home, away)),
            _ => {
                debug!("Non-numeric result pair: {:?} / {:?}", texts[0], texts[1]);
                None
            }
        }
    }

    fn extract_logos(&self, game: &ElementRef) -> (Option<String>, Option<String>) {
        let logos: Vec<&str> = game
            .select(&selector(IMAGE_SELECTOR))
            .filter_map(|img| img.value().attr("src"))
            .filter(|src| src.contains("CLU") || src.contains("clubes"))
            .collect();

        if logos.len() >= 2 {
            (Some(logos[0].to_string()), Some(logos[1].to_string()))
        } else {
            (None, None)
        }
    }
}
