use tracing::{error, info, warn};

use crate::{
    config::{Competition, SeasonTarget},
    fetch::HtmlFetcher,
    fixture_parser,
    standings_parser,
    store::RecordStore,
    sync::{SyncReport, Synchronizer},
    types::{FixtureRecord, StandingsRow},
};

/// Fetch → extract → sync for both page kinds. A page that cannot be
/// fetched is logged and skipped; the run carries on.
pub struct ScrapeRunner<F: HtmlFetcher, S: RecordStore> {
    fetcher: F,
    sync: Synchronizer<S>,
}

impl<F: HtmlFetcher, S: RecordStore> ScrapeRunner<F, S> {
    pub fn new(fetcher: F, sync: Synchronizer<S>) -> Self {
        Self { fetcher, sync }
    }

    pub fn synchronizer(&self) -> &Synchronizer<S> {
        &self.sync
    }

    pub async fn fetch_fixtures(&self, url: &str, is_agenda: bool, season: &str) -> Vec<FixtureRecord> {
        match self.fetcher.fetch_html(url).await {
            Ok(html) => fixture_parser::extract_fixtures(&html, is_agenda, season),
            Err(e) => {
                error!("Failed to fetch {}: {}", url, e);
                Vec::new()
            }
        }
    }

    pub async fn fetch_standings(&self, competition: &Competition, team_filter: &str) -> Vec<StandingsRow> {
        let url = competition.standings_url();
        match self.fetcher.fetch_html(&url).await {
            Ok(html) => standings_parser::extract_standings(&html, &competition.name, team_filter),
            Err(e) => {
                error!("Could not get HTML content for {}: {}", competition.name, e);
                Vec::new()
            }
        }
    }

    /// Agenda first, then results, each synced on its own so a results
    /// snapshot overwrites the scheduled version of the same game.
    pub async fn scrape_games(&self, target: &SeasonTarget) -> SyncReport {
        info!("Scraping season {} into {}", target.season, target.fixtures_table);
        let mut report = SyncReport::default();

        let agenda = self.fetch_fixtures(&target.agenda_url, true, &target.season).await;
        report.merge(&self.sync.sync_fixtures(&target.fixtures_table, agenda).await);

        let results = self.fetch_fixtures(&target.results_url, false, &target.season).await;
        report.merge(&self.sync.sync_fixtures(&target.fixtures_table, results).await);

        if report.failed_batches > 0 {
            warn!(
                "Season {}: {} fixture batches failed",
                target.season, report.failed_batches
            );
        }
        report
    }

    pub async fn scrape_standings(
        &self,
        table: &str,
        competitions: &[Competition],
        team_filter: &str,
        replace: bool,
    ) -> SyncReport {
        if replace && !self.sync.clear_standings(table).await {
            warn!("Continuing without clearing {}", table);
        }

        let mut rows = Vec::new();
        for competition in competitions {
            info!("Processing {}...", competition.name);
            rows.extend(self.fetch_standings(competition, team_filter).await);
        }

        self.sync.sync_standings(table, rows).await
    }
}
