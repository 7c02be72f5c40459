use chrono::{DateTime, Utc};
use sqlx::{
    postgres::{PgPool, PgPoolOptions},
    Postgres, QueryBuilder,
};
use tracing::{debug, info};

use crate::{
    error::ScrapeError,
    types::{FixtureRecord, StandingsRow},
};

pub const LAST_SCRAPE_KEY: &str = "last_scrape";

/// Persistence seam for the synchronizer. Implementations must treat each
/// call as one batch: either the whole slice is written or an error is
/// returned.
#[allow(async_fn_in_trait)]
pub trait RecordStore {
    async fn upsert_fixtures(&self, table: &str, fixtures: &[FixtureRecord]) -> Result<u64, ScrapeError>;
    async fn upsert_standings(&self, table: &str, rows: &[StandingsRow]) -> Result<u64, ScrapeError>;
    async fn clear_standings(&self, table: &str) -> Result<u64, ScrapeError>;
    async fn record_last_run(&self, table: &str, at: DateTime<Utc>) -> Result<(), ScrapeError>;
}

/// Table names are interpolated into SQL, so only plain identifiers pass.
pub fn checked_table(table: &str) -> Result<&str, ScrapeError> {
    let valid = !table.is_empty()
        && !table.starts_with(|c: char| c.is_ascii_digit())
        && table.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(table)
    } else {
        Err(ScrapeError::Config(format!("Invalid table name: {:?}", table)))
    }
}

pub fn fixtures_upsert_query<'a>(
    table: &str,
    fixtures: &'a [FixtureRecord],
) -> Result<QueryBuilder<'a, Postgres>, ScrapeError> {
    let table = checked_table(table)?;
    let mut builder = QueryBuilder::new(format!(
        "INSERT INTO {} (slug, data, hora, equipa_casa, equipa_fora, resultado_casa, resultado_fora, \
         escalao, competicao, local, logotipo_casa, logotipo_fora, status, epoca) ",
        table
    ));

    builder.push_values(fixtures, |mut row, fixture| {
        row.push_bind(fixture.identity_key.clone())
            .push_bind(fixture.date)
            .push_bind(fixture.time.clone())
            .push_bind(fixture.home_team.clone())
            .push_bind(fixture.away_team.clone())
            .push_bind(fixture.home_score)
            .push_bind(fixture.away_score)
            .push_bind(fixture.division.clone())
            .push_bind(fixture.competition.clone())
            .push_bind(fixture.venue.clone())
            .push_bind(fixture.home_logo_url.clone())
            .push_bind(fixture.away_logo_url.clone())
            .push_bind(fixture.status.as_str())
            .push_bind(fixture.season.clone());
    });

    builder.push(
        " ON CONFLICT (slug) DO UPDATE SET \
         data = EXCLUDED.data, hora = EXCLUDED.hora, \
         equipa_casa = EXCLUDED.equipa_casa, equipa_fora = EXCLUDED.equipa_fora, \
         resultado_casa = EXCLUDED.resultado_casa, resultado_fora = EXCLUDED.resultado_fora, \
         escalao = EXCLUDED.escalao, competicao = EXCLUDED.competicao, local = EXCLUDED.local, \
         logotipo_casa = EXCLUDED.logotipo_casa, logotipo_fora = EXCLUDED.logotipo_fora, \
         status = EXCLUDED.status, epoca = EXCLUDED.epoca",
    );

    Ok(builder)
}

pub fn standings_upsert_query<'a>(
    table: &str,
    rows: &'a [StandingsRow],
) -> Result<QueryBuilder<'a, Postgres>, ScrapeError> {
    let table = checked_table(table)?;
    let mut builder = QueryBuilder::new(format!(
        "INSERT INTO {} (competicao, grupo, equipa, posicao, jogos, vitorias, derrotas, pontos) ",
        table
    ));

    builder.push_values(rows, |mut row, standing| {
        row.push_bind(standing.competition.clone())
            .push_bind(standing.group.clone())
            .push_bind(standing.team.clone())
            .push_bind(standing.position)
            .push_bind(standing.games_played)
            .push_bind(standing.wins)
            .push_bind(standing.losses)
            .push_bind(standing.points);
    });

    builder.push(
        " ON CONFLICT (competicao, grupo, equipa) DO UPDATE SET \
         posicao = EXCLUDED.posicao, jogos = EXCLUDED.jogos, vitorias = EXCLUDED.vitorias, \
         derrotas = EXCLUDED.derrotas, pontos = EXCLUDED.pontos",
    );

    Ok(builder)
}

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, ScrapeError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        info!("Connected to database");
        Ok(Self { pool })
    }
}

impl RecordStore for PgStore {
    async fn upsert_fixtures(&self, table: &str, fixtures: &[FixtureRecord]) -> Result<u64, ScrapeError> {
        if fixtures.is_empty() {
            return Ok(0);
        }
        let mut query = fixtures_upsert_query(table, fixtures)?;
        let result = query.build().execute(&self.pool).await?;
        debug!("Upserted {} fixtures into {}", result.rows_affected(), table);
        Ok(result.rows_affected())
    }

    async fn upsert_standings(&self, table: &str, rows: &[StandingsRow]) -> Result<u64, ScrapeError> {
        if rows.is_empty() {
            return Ok(0);
        }
        let mut query = standings_upsert_query(table, rows)?;
        let result = query.build().execute(&self.pool).await?;
        debug!("Upserted {} standings rows into {}", result.rows_affected(), table);
        Ok(result.rows_affected())
    }

    async fn clear_standings(&self, table: &str) -> Result<u64, ScrapeError> {
        let table = checked_table(table)?;
        let result = sqlx::query(&format!("DELETE FROM {}", table))
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn record_last_run(&self, table: &str, at: DateTime<Utc>) -> Result<(), ScrapeError> {
        let table = checked_table(table)?;
        sqlx::query(&format!(
            r#"
            INSERT INTO {} (key, value, updated_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value, updated_at = EXCLUDED.updated_at
            "#,
            table
        ))
        .bind(LAST_SCRAPE_KEY)
        .bind(at.to_rfc3339())
        .bind(at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
