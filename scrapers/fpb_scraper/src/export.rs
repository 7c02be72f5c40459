use std::io::Write;

use serde::Serialize;

use crate::error::ScrapeError;

/// Writes records as CSV with a header row taken from the serialized
/// field names (the store's column names).
pub fn write_csv<W: Write, T: Serialize>(writer: W, records: &[T]) -> Result<usize, ScrapeError> {
    let mut wtr = csv::Writer::from_writer(writer);
    for record in records {
        wtr.serialize(record)?;
    }
    wtr.flush()?;
    Ok(records.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FixtureRecord, FixtureStatus, StandingsRow};
    use chrono::NaiveDate;

    #[test]
    fn test_fixture_csv_uses_column_names() {
        let fixture = FixtureRecord {
            identity_key: "2025-10-15-fcg-abc".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 10, 15).unwrap(),
            time: Some("12:15".to_string()),
            home_team: "FCG".to_string(),
            away_team: "ABC".to_string(),
            home_score: None,
            away_score: None,
            division: "Sub16".to_string(),
            competition: "Camp. Distrital".to_string(),
            venue: None,
            home_logo_url: None,
            away_logo_url: None,
            status: FixtureStatus::Scheduled,
            season: "2025/2026".to_string(),
        };

        let mut out = Vec::new();
        assert_eq!(write_csv(&mut out, &[fixture]).unwrap(), 1);
        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();

        assert_eq!(
            lines.next().unwrap(),
            "slug,data,hora,equipa_casa,equipa_fora,resultado_casa,resultado_fora,escalao,competicao,local,logotipo_casa,logotipo_fora,status,epoca"
        );
        assert_eq!(
            lines.next().unwrap(),
            "2025-10-15-fcg-abc,2025-10-15,12:15,FCG,ABC,,,Sub16,Camp. Distrital,,,,AGENDADO,2025/2026"
        );
    }

    #[test]
    fn test_standings_csv() {
        let row = StandingsRow {
            competition: "Sub14".to_string(),
            group: "GRUPO A".to_string(),
            team: "FC Gaia".to_string(),
            position: 1,
            games_played: 4,
            wins: 4,
            losses: 0,
            points: 8,
        };
        let mut out = Vec::new();
        write_csv(&mut out, &[row]).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("competicao,grupo,equipa,posicao,jogos,vitorias,derrotas,pontos\n"));
        assert!(text.contains("Sub14,GRUPO A,FC Gaia,1,4,4,0,8"));
    }
}
