//! Shaping a person's credits into a display list: dedup, search, sort.
use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::tmdb::CreditRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortMode {
    #[default]
    Year,
    Rating,
    Title,
}

impl SortMode {
    pub const ALL: [SortMode; 3] = [SortMode::Year, SortMode::Rating, SortMode::Title];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortMode::Year => "year",
            SortMode::Rating => "rating",
            SortMode::Title => "title",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SortMode::Year => "Year",
            SortMode::Rating => "Rating",
            SortMode::Title => "Title",
        }
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortMode {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "year" => Ok(SortMode::Year),
            "rating" => Ok(SortMode::Rating),
            "title" => Ok(SortMode::Title),
            other => {
                let valid: Vec<&str> = SortMode::ALL.iter().map(SortMode::as_str).collect();
                Err(anyhow!(
                    "sort mode must be one of {}, got '{}'",
                    valid.join(", "),
                    other
                ))
            }
        }
    }
}

/// Keeps the first record seen for each id, in input order.
pub fn dedup_by_identity(records: Vec<CreditRecord>) -> Vec<CreditRecord> {
    let mut seen = HashSet::with_capacity(records.len());
    records
        .into_iter()
        .filter(|record| seen.insert(record.id))
        .collect()
}

/// Case-insensitive substring match on title or character.
///
/// A blank query hands the input back untouched.
pub fn filter_by_substring(records: Vec<CreditRecord>, query: &str) -> Vec<CreditRecord> {
    if query.trim().is_empty() {
        return records;
    }
    let needle = query.to_lowercase();
    records
        .into_iter()
        .filter(|record| matches_query(record, &needle))
        .collect()
}

fn matches_query(record: &CreditRecord, needle: &str) -> bool {
    record.title.to_lowercase().contains(needle)
        || record
            .character
            .as_deref()
            .map(|c| c.to_lowercase().contains(needle))
            .unwrap_or(false)
}

/// Returns a new, stably sorted list; the input is left as is.
pub fn sort_by_mode(records: &[CreditRecord], mode: SortMode) -> Vec<CreditRecord> {
    let mut sorted = records.to_vec();
    match mode {
        // Empty dates are the smallest strings, so they land last.
        SortMode::Year => sorted.sort_by(|a, b| b.release_date.cmp(&a.release_date)),
        SortMode::Rating => sorted.sort_by(|a, b| {
            b.vote_average
                .partial_cmp(&a.vote_average)
                .unwrap_or(Ordering::Equal)
        }),
        SortMode::Title => sorted.sort_by(|a, b| locale_cmp(&a.title, &b.title)),
    }
    sorted
}

/// Filter first, then sort.
pub fn shape(records: Vec<CreditRecord>, query: &str, mode: SortMode) -> Vec<CreditRecord> {
    let filtered = filter_by_substring(records, query);
    sort_by_mode(&filtered, mode)
}

pub fn release_year(date: &str) -> &str {
    date.split('-').next().unwrap_or_default()
}

/// Collation close to a default-locale `localeCompare`: base letters first,
/// then accents, then lowercase before uppercase.
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
    primary_key(a)
        .cmp(&primary_key(b))
        .then_with(|| secondary_key(a).cmp(&secondary_key(b)))
        .then_with(|| case_key(a).cmp(&case_key(b)))
}

fn primary_key(s: &str) -> String {
    s.nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase()
}

fn secondary_key(s: &str) -> String {
    s.nfd().collect::<String>().to_lowercase()
}

fn case_key(s: &str) -> Vec<bool> {
    s.chars().map(char::is_uppercase).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credit(id: u32, title: &str) -> CreditRecord {
        CreditRecord {
            id,
            title: title.to_string(),
            character: None,
            release_date: String::new(),
            vote_average: 0.0,
            poster_path: None,
            backdrop_path: None,
            overview: String::new(),
            genre_ids: Vec::new(),
        }
    }

    fn ids(records: &[CreditRecord]) -> Vec<u32> {
        records.iter().map(|r| r.id).collect()
    }

    #[test]
    fn dedup_keeps_first_occurrence() {
        let out = dedup_by_identity(vec![credit(1, "A"), credit(2, "B"), credit(1, "A2")]);
        assert_eq!(out, vec![credit(1, "A"), credit(2, "B")]);
    }

    #[test]
    fn dedup_of_empty_is_empty() {
        assert!(dedup_by_identity(Vec::new()).is_empty());
        assert!(shape(Vec::new(), "tom", SortMode::Title).is_empty());
    }

    #[test]
    fn blank_query_returns_input_unchanged() {
        let input = vec![credit(3, "Zulu"), credit(1, "Alpha")];
        assert_eq!(filter_by_substring(input.clone(), ""), input);
        assert_eq!(filter_by_substring(input.clone(), "   "), input);
    }

    #[test]
    fn filter_matches_title_or_character_case_insensitively() {
        let mut hagen = credit(1, "The Godfather");
        hagen.character = Some("Tom Hagen".to_string());
        let mut kilgore = credit(2, "Apocalypse Now");
        kilgore.character = Some("Lt. Col. Bill Kilgore".to_string());
        let tender = credit(3, "Tender Mercies");

        let out = filter_by_substring(vec![hagen, kilgore, tender], "TOM");
        assert_eq!(ids(&out), vec![1]);

        let mut tomb = credit(4, "Tombstone");
        tomb.character = None;
        let out = filter_by_substring(vec![tomb], "tom");
        assert_eq!(ids(&out), vec![4]);
    }

    #[test]
    fn absent_character_never_matches() {
        let out = filter_by_substring(vec![credit(1, "Network")], "hagen");
        assert!(out.is_empty());
    }

    #[test]
    fn filter_is_idempotent() {
        let mut a = credit(1, "The Godfather");
        a.character = Some("Tom Hagen".to_string());
        let input = vec![a, credit(2, "THX 1138"), credit(3, "Tomorrow")];
        let once = filter_by_substring(input, "to");
        let twice = filter_by_substring(once.clone(), "to");
        assert_eq!(once, twice);
    }

    #[test]
    fn rating_sort_is_descending_and_stable() {
        let mut a = credit(1, "A");
        a.vote_average = 5.0;
        let mut b = credit(2, "B");
        b.vote_average = 8.5;
        let mut c = credit(3, "C");
        c.vote_average = 8.5;
        let input = vec![a, b, c];
        assert_eq!(ids(&sort_by_mode(&input, SortMode::Rating)), vec![2, 3, 1]);
        assert_eq!(ids(&input), vec![1, 2, 3]);
    }

    #[test]
    fn year_sort_puts_missing_dates_last() {
        let mut a = credit(1, "A");
        a.release_date = "1972-03-01".to_string();
        let mut b = credit(2, "B");
        b.release_date = "1962-12-25".to_string();
        let c = credit(3, "C");
        let sorted = sort_by_mode(&[c, b, a], SortMode::Year);
        assert_eq!(ids(&sorted), vec![1, 2, 3]);
    }

    #[test]
    fn title_sort_is_ascending() {
        let input = vec![credit(1, "The Godfather"), credit(2, "Apocalypse Now")];
        let titles: Vec<_> = sort_by_mode(&input, SortMode::Title)
            .into_iter()
            .map(|r| r.title)
            .collect();
        assert_eq!(titles, vec!["Apocalypse Now", "The Godfather"]);
    }

    #[test]
    fn title_sort_ignores_case_and_accents_first() {
        let input = vec![
            credit(1, "zebra"),
            credit(2, "Éclair"),
            credit(3, "apple"),
            credit(4, "Eagle"),
        ];
        let sorted = sort_by_mode(&input, SortMode::Title);
        assert_eq!(ids(&sorted), vec![3, 4, 2, 1]);
    }

    #[test]
    fn title_sort_keeps_equal_titles_in_input_order() {
        let input = vec![credit(7, "Hamlet"), credit(5, "Hamlet")];
        assert_eq!(ids(&sort_by_mode(&input, SortMode::Title)), vec![7, 5]);
    }

    #[test]
    fn locale_cmp_orders_lowercase_before_uppercase() {
        assert_eq!(locale_cmp("a", "A"), Ordering::Less);
        assert_eq!(locale_cmp("a", "B"), Ordering::Less);
        assert_eq!(locale_cmp("e", "é"), Ordering::Less);
    }

    #[test]
    fn sort_mode_parses_and_defaults_to_year() {
        assert_eq!(SortMode::default(), SortMode::Year);
        assert_eq!("Rating".parse::<SortMode>().unwrap(), SortMode::Rating);
        let err = "runtime".parse::<SortMode>().unwrap_err().to_string();
        assert!(err.contains("year, rating, title"));
        assert!(err.contains("runtime"));
        assert_eq!(SortMode::Title.label(), "Title");
    }

    #[test]
    fn release_year_takes_leading_segment() {
        assert_eq!(release_year("1972-03-15"), "1972");
        assert_eq!(release_year(""), "");
    }
}
