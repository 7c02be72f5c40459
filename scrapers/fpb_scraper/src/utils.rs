use std::sync::OnceLock;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use regex::Regex;

use crate::types::{TimeField, UNKNOWN_LABEL};

const MONTHS: [(&str, u32); 12] = [
    ("JAN", 1),
    ("FEV", 2),
    ("MAR", 3),
    ("ABR", 4),
    ("MAI", 5),
    ("JUN", 6),
    ("JUL", 7),
    ("AGO", 8),
    ("SET", 9),
    ("OUT", 10),
    ("NOV", 11),
    ("DEZ", 12),
];

fn time_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d{1,2}):(\d{2})").unwrap())
}

fn score_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*(\d+)\s*-\s*(\d+)\s*$").unwrap())
}

/// Month number for a Portuguese month name or abbreviation.
/// Unknown names map to January.
pub fn month_number(name: &str) -> u32 {
    let upper = name.trim().to_uppercase();
    let prefix: String = upper.chars().take(3).collect();
    MONTHS
        .iter()
        .find(|(abbr, _)| *abbr == upper || *abbr == prefix)
        .map(|(_, month)| *month)
        .unwrap_or(1)
}

/// Parses headings such as "15 OUT 2025" or "3 fev 2024".
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let parts: Vec<&str> = text.split_whitespace().collect();
    if parts.len() < 3 {
        return None;
    }

    let day = parts[0].parse::<u32>().ok()?;
    let month = month_number(parts[1]);
    let year = parts[2].parse::<i32>().ok()?;

    NaiveDate::from_ymd_opt(year, month, day)
}

/// Classifies the overloaded kickoff/result field.
///
/// "12H15" is a time, "80 - 70" is a final score, anything else
/// ("A DEFINIR", "ADIADO", empty) is neither.
pub fn classify_time_field(raw: &str) -> TimeField {
    let upper = raw.trim().to_uppercase();
    let normalized = upper.replace('H', ":");

    if let Some(caps) = time_regex().captures(&normalized) {
        return TimeField::Time(format!("{:0>2}:{}", &caps[1], &caps[2]));
    }

    if !upper.contains(':') {
        if let Ok((home, away)) = parse_score(&upper) {
            return TimeField::Score(home, away);
        }
    }

    TimeField::Neither
}

pub fn parse_score(score: &str) -> Result<(i32, i32)> {
    let caps = score_regex()
        .captures(score)
        .with_context(|| format!("Invalid score format: {}", score))?;

    let home_score = caps[1]
        .parse::<i32>()
        .with_context(|| format!("Invalid home score: {}", &caps[1]))?;
    let away_score = caps[2]
        .parse::<i32>()
        .with_context(|| format!("Invalid away score: {}", &caps[2]))?;

    Ok((home_score, away_score))
}

/// Splits "<division> | <competition>". Without a separator both halves
/// carry the whole text.
pub fn split_competition(text: Option<&str>) -> (String, String) {
    match text.map(str::trim).filter(|t| !t.is_empty()) {
        None => (UNKNOWN_LABEL.to_string(), UNKNOWN_LABEL.to_string()),
        Some(text) => match text.split_once('|') {
            Some((division, competition)) => {
                (division.trim().to_string(), competition.trim().to_string())
            }
            None => (text.to_string(), text.to_string()),
        },
    }
}

fn fold_char(c: char) -> Option<&'static str> {
    let folded = match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' | 'ă' | 'ą' => "a",
        'ç' | 'ć' | 'č' => "c",
        'ď' | 'đ' => "d",
        'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ė' | 'ę' | 'ě' => "e",
        'ğ' => "g",
        'ì' | 'í' | 'î' | 'ï' | 'ī' | 'į' | 'ı' => "i",
        'ł' | 'ľ' => "l",
        'ñ' | 'ń' | 'ň' => "n",
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' | 'ō' | 'ő' => "o",
        'ŕ' | 'ř' => "r",
        'ś' | 'š' | 'ş' => "s",
        'ß' => "ss",
        'ť' | 'ţ' => "t",
        'ù' | 'ú' | 'û' | 'ü' | 'ū' | 'ů' | 'ű' => "u",
        'ý' | 'ÿ' => "y",
        'ź' | 'ż' | 'ž' => "z",
        'æ' => "ae",
        'œ' => "oe",
        'ª' => "a",
        'º' => "o",
        _ => return None,
    };
    Some(folded)
}

/// Lower-cases and replaces accented Latin letters with their ASCII base.
/// Case folding uses Unicode tables, never the process locale.
pub fn fold_diacritics(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars().flat_map(char::to_lowercase) {
        match fold_char(c) {
            Some(folded) => out.push_str(folded),
            None => out.push(c),
        }
    }
    out
}

/// URL-safe slug: only `[a-z0-9]` and single hyphens, no hyphen at either end.
/// Non-ASCII characters left after folding are dropped.
pub fn slugify(s: &str) -> String {
    let folded = fold_diacritics(s);
    let mut slug = String::with_capacity(folded.len());
    let mut pending_hyphen = false;

    for c in folded.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c);
        } else if c.is_whitespace() || c == '_' || c == '-' {
            pending_hyphen = true;
        }
    }

    slug
}

pub fn identity_key(date: NaiveDate, home: &str, away: &str) -> String {
    slugify(&format!("{}-{}-{}", date.format("%Y-%m-%d"), home, away))
}
