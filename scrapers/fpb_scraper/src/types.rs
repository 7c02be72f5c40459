use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Placeholder used when a team container holds no readable name.
pub const UNKNOWN_TEAM: &str = "Desconhecido";

/// Placeholder for a missing division/competition label.
pub const UNKNOWN_LABEL: &str = "Unknown";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum FixtureStatus {
    #[serde(rename = "AGENDADO")]
    Scheduled,
    #[serde(rename = "FINALIZADO")]
    Finished,
}

impl FixtureStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FixtureStatus::Scheduled => "AGENDADO",
            FixtureStatus::Finished => "FINALIZADO",
        }
    }
}

/// One scheduled or completed game. Serialized field names match the
/// columns of the fixtures table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FixtureRecord {
    #[serde(rename = "slug")]
    pub identity_key: String,
    #[serde(rename = "data")]
    pub date: NaiveDate,
    #[serde(rename = "hora")]
    pub time: Option<String>,
    #[serde(rename = "equipa_casa")]
    pub home_team: String,
    #[serde(rename = "equipa_fora")]
    pub away_team: String,
    #[serde(rename = "resultado_casa")]
    pub home_score: Option<i32>,
    #[serde(rename = "resultado_fora")]
    pub away_score: Option<i32>,
    #[serde(rename = "escalao")]
    pub division: String,
    #[serde(rename = "competicao")]
    pub competition: String,
    #[serde(rename = "local")]
    pub venue: Option<String>,
    #[serde(rename = "logotipo_casa")]
    pub home_logo_url: Option<String>,
    #[serde(rename = "logotipo_fora")]
    pub away_logo_url: Option<String>,
    pub status: FixtureStatus,
    #[serde(rename = "epoca")]
    pub season: String,
}

/// One team's line in a competition group table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StandingsRow {
    #[serde(rename = "competicao")]
    pub competition: String,
    #[serde(rename = "grupo")]
    pub group: String,
    #[serde(rename = "equipa")]
    pub team: String,
    #[serde(rename = "posicao")]
    pub position: i32,
    #[serde(rename = "jogos")]
    pub games_played: i32,
    #[serde(rename = "vitorias")]
    pub wins: i32,
    #[serde(rename = "derrotas")]
    pub losses: i32,
    #[serde(rename = "pontos")]
    pub points: i32,
}

impl StandingsRow {
    /// Upsert key of the standings table.
    pub fn key(&self) -> (String, String, String) {
        (self.competition.clone(), self.group.clone(), self.team.clone())
    }
}

/// What a single time/score display field turned out to hold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeField {
    Time(String),
    Score(i32, i32),
    Neither,
}
