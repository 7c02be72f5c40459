use serde::{Deserialize, Serialize};
use std::env;

use crate::error::ScrapeError;

pub const FPB_CALENDAR_BASE: &str = "https://www.fpb.pt/calendario";
pub const FPB_RESULTS_BASE: &str = "https://www.fpb.pt/resultados";
pub const STANDINGS_BASE: &str = "https://resultados.tugabasket.com/getCompetitionDetails";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub max_connections: u32,
    pub fixtures_table: String,
    pub standings_table: String,
    pub metadata_table: String,
    pub batch_size: usize,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: 5,
            fixtures_table: "games_2025_2026".to_string(),
            standings_table: "classificacoes_2025_2026".to_string(),
            metadata_table: "metadata".to_string(),
            batch_size: 100,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RateLimits {
    pub requests_per_second: u32,
}

impl Default for RateLimits {
    fn default() -> Self {
        Self {
            requests_per_second: 2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScrapingConfig {
    pub user_agent: String,
    pub request_timeout_secs: u64,
}

impl Default for ScrapingConfig {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// A competition whose standings are scraped from the results aggregator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Competition {
    pub name: String,
    pub competition_id: u32,
}

impl Competition {
    pub fn new(name: &str, competition_id: u32) -> Self {
        Self {
            name: name.to_string(),
            competition_id,
        }
    }

    pub fn standings_url(&self) -> String {
        format!("{}?competitionId={}", STANDINGS_BASE, self.competition_id)
    }
}

/// Where the fixtures of one season live and which table they go to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SeasonTarget {
    pub season: String,
    pub agenda_url: String,
    pub results_url: String,
    pub fixtures_table: String,
}

impl SeasonTarget {
    /// Club calendar/results pages filtered by season, e.g. `epoca=2023/2024`.
    pub fn for_club(club_id: u32, season: &str) -> Self {
        let query = format!("?clube={}&epoca={}", club_id, urlencoding::encode(season));
        Self {
            season: season.to_string(),
            agenda_url: format!("{}{}", club_page(FPB_CALENDAR_BASE, club_id), query),
            results_url: format!("{}{}", club_page(FPB_RESULTS_BASE, club_id), query),
            fixtures_table: season_table("games", season),
        }
    }
}

fn club_page(base: &str, club_id: u32) -> String {
    format!("{}/clube_{}/", base, club_id)
}

/// `games` + `2023/2024` → `games_2023_2024`.
pub fn season_table(prefix: &str, season: &str) -> String {
    let suffix: String = season
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    format!("{}_{}", prefix, suffix)
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScraperConfig {
    pub database: DatabaseConfig,
    pub rate_limits: RateLimits,
    pub scraping: ScrapingConfig,
    pub club_id: u32,
    pub current_season: String,
    pub agenda_url: String,
    pub results_url: String,
    pub team_filter: String,
    pub competitions: Vec<Competition>,
    pub past_seasons: Vec<String>,
}

impl ScraperConfig {
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(url) = env::var("DATABASE_URL") {
            config.database.url = Some(url);
        }
        if let Ok(table) = env::var("FIXTURES_TABLE") {
            config.database.fixtures_table = table;
        }
        if let Ok(table) = env::var("STANDINGS_TABLE") {
            config.database.standings_table = table;
        }
        if let Ok(table) = env::var("METADATA_TABLE") {
            config.database.metadata_table = table;
        }
        if let Some(size) = env::var("SYNC_BATCH_SIZE").ok().and_then(|s| s.parse::<usize>().ok()) {
            config.database.batch_size = size;
        }
        if let Some(rps) = env::var("RATE_LIMIT_RPS").ok().and_then(|r| r.parse::<u32>().ok()) {
            config.rate_limits.requests_per_second = rps;
        }
        if let Ok(user_agent) = env::var("SCRAPER_USER_AGENT") {
            config.scraping.user_agent = user_agent;
        }
        if let Some(timeout) = env::var("SCRAPER_TIMEOUT_SECS").ok().and_then(|t| t.parse::<u64>().ok()) {
            config.scraping.request_timeout_secs = timeout;
        }
        if let Some(club_id) = env::var("FPB_CLUB_ID").ok().and_then(|c| c.parse::<u32>().ok()) {
            config.club_id = club_id;
            config.agenda_url = club_page(FPB_CALENDAR_BASE, club_id);
            config.results_url = club_page(FPB_RESULTS_BASE, club_id);
        }
        if let Ok(season) = env::var("CURRENT_SEASON") {
            config.current_season = season;
        }
        if let Ok(url) = env::var("AGENDA_URL") {
            config.agenda_url = url;
        }
        if let Ok(url) = env::var("RESULTADOS_URL") {
            config.results_url = url;
        }
        if let Ok(filter) = env::var("TEAM_FILTER") {
            config.team_filter = filter;
        }

        config
    }

    pub fn database_url(&self) -> Result<&str, ScrapeError> {
        self.database
            .url
            .as_deref()
            .filter(|url| !url.is_empty())
            .ok_or_else(|| ScrapeError::Config("DATABASE_URL must be set".to_string()))
    }

    /// The current season's pages, honouring URL overrides.
    pub fn current_target(&self) -> SeasonTarget {
        SeasonTarget {
            season: self.current_season.clone(),
            agenda_url: self.agenda_url.clone(),
            results_url: self.results_url.clone(),
            fixtures_table: self.database.fixtures_table.clone(),
        }
    }

    pub fn season_target(&self, season: &str) -> SeasonTarget {
        if season == self.current_season {
            self.current_target()
        } else {
            SeasonTarget::for_club(self.club_id, season)
        }
    }
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig::default(),
            rate_limits: RateLimits::default(),
            scraping: ScrapingConfig::default(),
            club_id: 119,
            current_season: "2025/2026".to_string(),
            agenda_url: club_page(FPB_CALENDAR_BASE, 119),
            results_url: club_page(FPB_RESULTS_BASE, 119),
            team_filter: "GAIA".to_string(),
            competitions: vec![
                Competition::new("Camp. Distrital Sub14", 11038),
                Competition::new("Camp. Distrital Sub16", 11040),
                Competition::new("Camp. Distrital Sub18", 11042),
                Competition::new("Camp. Nacional 1.ª Div. (Seniores)", 10904),
            ],
            past_seasons: vec![
                "2022/2023".to_string(),
                "2023/2024".to_string(),
                "2024/2025".to_string(),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_season_target_for_club() {
        let target = SeasonTarget::for_club(119, "2023/2024");
        assert_eq!(
            target.agenda_url,
            "https://www.fpb.pt/calendario/clube_119/?clube=119&epoca=2023%2F2024"
        );
        assert_eq!(
            target.results_url,
            "https://www.fpb.pt/resultados/clube_119/?clube=119&epoca=2023%2F2024"
        );
        assert_eq!(target.fixtures_table, "games_2023_2024");
    }

    #[test]
    fn test_current_season_uses_configured_urls() {
        let config = ScraperConfig::default();
        let target = config.season_target("2025/2026");
        assert_eq!(target.agenda_url, "https://www.fpb.pt/calendario/clube_119/");
        assert_eq!(target.fixtures_table, "games_2025_2026");

        let past = config.season_target("2024/2025");
        assert_eq!(past.fixtures_table, "games_2024_2025");
    }

    #[test]
    fn test_standings_url() {
        let competition = Competition::new("Camp. Distrital Sub14", 11038);
        assert_eq!(
            competition.standings_url(),
            "https://resultados.tugabasket.com/getCompetitionDetails?competitionId=11038"
        );
    }

    #[test]
    fn test_database_url_required() {
        let config = ScraperConfig::default();
        assert!(matches!(config.database_url(), Err(ScrapeError::Config(_))));
    }
}
