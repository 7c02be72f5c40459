use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use dotenv::dotenv;
use indicatif::{ProgressBar, ProgressStyle};
use std::{fs, io, path::PathBuf};
use tracing::info;

use fpb_scraper::{
    config::{ScraperConfig, SeasonTarget},
    export, extract_fixtures, extract_standings,
    fetch::WebHtmlFetcher,
    pipeline::ScrapeRunner,
    store::PgStore,
    sync::Synchronizer,
};

#[derive(Debug, Parser)]
#[command(author, version, about = "FPB fixtures and standings scraper", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PageKind {
    Games,
    Standings,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Scrape agenda and results pages for one season
    Games {
        /// Season label, e.g. 2025/2026
        #[arg(long)]
        season: Option<String>,
        /// Table to upsert fixtures into
        #[arg(long)]
        table: Option<String>,
        #[arg(long)]
        agenda_url: Option<String>,
        #[arg(long)]
        results_url: Option<String>,
    },
    /// Scrape standings for every configured competition
    Standings {
        #[arg(long)]
        table: Option<String>,
        /// Keep only groups with a team containing this text
        #[arg(long)]
        team_filter: Option<String>,
        /// Clear the standings table before loading
        #[arg(long)]
        replace: bool,
    },
    /// Scrape games for past seasons, one after another
    History {
        /// Only this season instead of every configured one
        #[arg(long)]
        season: Option<String>,
    },
    /// Extract records from a saved page and write them as CSV
    ParseFile(ParseFileArgs),
}

#[derive(Debug, Args)]
struct ParseFileArgs {
    /// Path to the HTML (or JSON-wrapped HTML) file
    #[arg(short, long)]
    file: PathBuf,
    #[arg(short, long, value_enum)]
    kind: PageKind,
    /// Treat the page as an agenda (calendar) page
    #[arg(long)]
    agenda: bool,
    #[arg(long)]
    season: Option<String>,
    #[arg(long, default_value = "Unknown")]
    competition: String,
    #[arg(long)]
    team_filter: Option<String>,
    /// CSV output path; stdout when omitted
    #[arg(short, long)]
    output: Option<PathBuf>,
}

async fn build_runner(config: &ScraperConfig) -> Result<ScrapeRunner<WebHtmlFetcher, PgStore>> {
    let database_url = config.database_url()?;
    let fetcher = WebHtmlFetcher::new(config).context("Failed to create HTTP client")?;
    let store = PgStore::connect(database_url, config.database.max_connections)
        .await
        .context("Failed to connect to database")?;
    Ok(ScrapeRunner::new(
        fetcher,
        Synchronizer::new(store, config.database.batch_size),
    ))
}

fn parse_file(config: &ScraperConfig, args: ParseFileArgs) -> Result<()> {
    let ParseFileArgs {
        file,
        kind,
        agenda,
        season,
        competition,
        team_filter,
        output,
    } = args;

    let html = fs::read_to_string(&file).with_context(|| format!("Failed to read {:?}", file))?;
    let season = season.unwrap_or_else(|| config.current_season.clone());
    let team_filter = team_filter.unwrap_or_else(|| config.team_filter.clone());

    let written = match (kind, output) {
        (PageKind::Games, Some(path)) => {
            export::write_csv(fs::File::create(&path)?, &extract_fixtures(&html, agenda, &season))?
        }
        (PageKind::Games, None) => {
            export::write_csv(io::stdout().lock(), &extract_fixtures(&html, agenda, &season))?
        }
        (PageKind::Standings, Some(path)) => export::write_csv(
            fs::File::create(&path)?,
            &extract_standings(&html, &competition, &team_filter),
        )?,
        (PageKind::Standings, None) => export::write_csv(
            io::stdout().lock(),
            &extract_standings(&html, &competition, &team_filter),
        )?,
    };

    info!("Wrote {} records from {:?}", written, file);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = ScraperConfig::from_env();

    match cli.command {
        Commands::Games {
            season,
            table,
            agenda_url,
            results_url,
        } => {
            let season = season.unwrap_or_else(|| config.current_season.clone());
            let mut target = config.season_target(&season);
            if let Some(table) = table {
                target.fixtures_table = table;
            }
            if let Some(url) = agenda_url {
                target.agenda_url = url;
            }
            if let Some(url) = results_url {
                target.results_url = url;
            }

            info!("Agenda URL: {}", target.agenda_url);
            info!("Resultados URL: {}", target.results_url);

            let runner = build_runner(&config).await?;
            let report = runner.scrape_games(&target).await;
            info!("Games sync finished: {:?}", report);

            if season == config.current_season {
                runner
                    .synchronizer()
                    .record_last_run(&config.database.metadata_table)
                    .await;
            }
        }
        Commands::Standings {
            table,
            team_filter,
            replace,
        } => {
            let table = table.unwrap_or_else(|| config.database.standings_table.clone());
            let team_filter = team_filter.unwrap_or_else(|| config.team_filter.clone());

            let runner = build_runner(&config).await?;
            let report = runner
                .scrape_standings(&table, &config.competitions, &team_filter, replace)
                .await;
            info!("Standings sync finished: {:?}", report);
        }
        Commands::History { season } => {
            let seasons = match season {
                Some(season) => vec![season],
                None => config.past_seasons.clone(),
            };
            let targets: Vec<SeasonTarget> = seasons
                .iter()
                .map(|season| config.season_target(season))
                .collect();

            let runner = build_runner(&config).await?;
            let pb = ProgressBar::new(targets.len() as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} seasons {msg}")
                    .context("Invalid progress bar template")?,
            );

            for target in &targets {
                pb.set_message(target.season.clone());
                let report = runner.scrape_games(target).await;
                info!("Season {}: {:?}", target.season, report);
                pb.inc(1);
            }
            pb.finish_with_message("History seed completed");
        }
        Commands::ParseFile(args) => parse_file(&config, args)?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const AGENDA_HTML: &str = include_str!("../tests/fixtures/fpb_agenda.html");

    #[test]
    fn test_parse_file_arguments() {
        let cli = Cli::try_parse_from([
            "fpb_scraper",
            "parse-file",
            "--file",
            "agenda.html",
            "--kind",
            "games",
            "--agenda",
            "--season",
            "2024/2025",
        ])
        .unwrap();

        match cli.command {
            Commands::ParseFile(args) => {
                assert_eq!(args.file, PathBuf::from("agenda.html"));
                assert!(matches!(args.kind, PageKind::Games));
                assert!(args.agenda);
                assert_eq!(args.season.as_deref(), Some("2024/2025"));
                assert_eq!(args.competition, "Unknown");
                assert_eq!(args.output, None);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_file_writes_csv() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("agenda.html");
        let output = dir.path().join("agenda.csv");
        fs::write(&input, AGENDA_HTML).unwrap();

        let args = ParseFileArgs {
            file: input,
            kind: PageKind::Games,
            agenda: true,
            season: None,
            competition: "Unknown".to_string(),
            team_filter: None,
            output: Some(output.clone()),
        };
        parse_file(&ScraperConfig::default(), args).unwrap();

        let csv = fs::read_to_string(output).unwrap();
        let mut lines = csv.lines();
        assert!(lines.next().unwrap().starts_with("slug,data,hora"));
        assert_eq!(lines.count(), 3);
        assert!(csv.contains("2025-11-22-fcg-gcp,2025-11-22,18:30,FCG,GCP"));
        assert!(csv.contains("AGENDADO,2025/2026"));
    }
}
