//! The heuristic entity recognizer for piiguard.
//!
//! Combines a place-name gazetteer with capitalisation, honorific,
//! corporate-suffix and calendar cues. Like a general-purpose tagger it
//! reports entity text and a label only; callers locate offsets themselves.

extern crate alloc;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;

use crate::lexicon::{
    is_one_of, Gazetteer, PlaceHit, GEO_FEATURES, GIVEN_NAMES, HONORIFICS, LEADING_STOPWORDS,
    MONTHS, NATIONALITIES, ORG_SUFFIXES,
};
use crate::scoring::{calculate_evidence, Evidence, EvidenceWeights};
use crate::tokenizer::{gap, is_joinable, tokenize, Token};
use crate::EvidenceScore;

/// Label set reported by the recognizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityLabel {
    Person,
    Org,
    /// Geo-political entity: countries, states, cities.
    Gpe,
    /// Non-political locations: rivers, mountains, parks.
    Loc,
    Date,
    /// Nationalities and other group adjectives.
    Norp,
}

impl EntityLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityLabel::Person => "PERSON",
            EntityLabel::Org => "ORG",
            EntityLabel::Gpe => "GPE",
            EntityLabel::Loc => "LOC",
            EntityLabel::Date => "DATE",
            EntityLabel::Norp => "NORP",
        }
    }
}

/// A recognized entity.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub text: String,
    pub label: EntityLabel,
    pub score: EvidenceScore,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognizerError {
    /// The gazetteer automaton could not be built.
    LexiconBuild,
}

impl fmt::Display for RecognizerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecognizerError::LexiconBuild => write!(f, "failed to build the place-name gazetteer"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for RecognizerError {}

/// The main recognizer. Stateless after construction and safe to share.
#[derive(Debug)]
pub struct Recognizer {
    gazetteer: Gazetteer,
    weights: EvidenceWeights,
    min_evidence: f64,
}

impl Recognizer {
    /// Creates a recognizer that only reports candidates whose evidence
    /// score reaches `min_evidence`.
    pub fn new(min_evidence: f64) -> Result<Self, RecognizerError> {
        let gazetteer = Gazetteer::new().ok_or(RecognizerError::LexiconBuild)?;
        Ok(Self {
            gazetteer,
            weights: EvidenceWeights::default(),
            min_evidence,
        })
    }

    /// Recognizes entities in `text`. Gazetteer places come first, then
    /// token-level entities in reading order.
    pub fn recognize(&self, text: &str) -> Vec<Entity> {
        let tokens = tokenize(text);
        let places = self.gazetteer.scan(text);
        let mut entities = Vec::new();

        for hit in &places {
            let evidence = Evidence { gazetteer: true, ..Default::default() };
            self.push(&mut entities, &text[hit.start..hit.end], EntityLabel::Gpe, &evidence);
        }

        let mut i = 0;
        while i < tokens.len() {
            if in_place(&places, &tokens[i]) {
                i += 1;
                continue;
            }

            if let Some(last) = match_date(text, &tokens, i) {
                let evidence = Evidence { calendar: true, ..Default::default() };
                let span = &text[tokens[i].start..tokens[last].end];
                self.push(&mut entities, span, EntityLabel::Date, &evidence);
                i = last + 1;
                continue;
            }

            if !tokens[i].is_capitalized() {
                i += 1;
                continue;
            }

            let mut j = i + 1;
            while j < tokens.len()
                && tokens[j].is_capitalized()
                && !in_place(&places, &tokens[j])
                && joins(text, &tokens[j - 1], &tokens[j])
            {
                j += 1;
            }

            self.classify_run(text, &tokens[i..j], &mut entities);
            i = j;
        }

        entities
    }

    fn classify_run(&self, text: &str, run: &[Token<'_>], entities: &mut Vec<Entity>) {
        let skip = run
            .iter()
            .take_while(|t| is_one_of(t.text, LEADING_STOPWORDS))
            .count();
        let run = &run[skip..];
        let Some(first) = run.first() else { return; };
        let len = run.len();

        if is_one_of(first.text, HONORIFICS) && len >= 2 {
            let names = &run[1..len.min(4)];
            let evidence = Evidence {
                honorific: true,
                given_name: is_one_of(names[0].text, GIVEN_NAMES),
                capitalized_followers: names.len() - 1,
                ..Default::default()
            };
            self.push(entities, span_text(text, names), EntityLabel::Person, &evidence);
            return;
        }

        if len >= 2 && is_one_of(run[len - 1].text, ORG_SUFFIXES) {
            let evidence = Evidence {
                org_suffix: true,
                capitalized_followers: len - 1,
                ..Default::default()
            };
            self.push(entities, span_text(text, run), EntityLabel::Org, &evidence);
            return;
        }

        if let Some(k) = run.iter().position(|t| is_one_of(t.text, GIVEN_NAMES)) {
            let names = &run[k..len.min(k + 3)];
            let evidence = Evidence {
                given_name: true,
                capitalized_followers: names.len() - 1,
                ..Default::default()
            };
            self.push(entities, span_text(text, names), EntityLabel::Person, &evidence);
            return;
        }

        if len >= 2 && is_one_of(run[len - 1].text, GEO_FEATURES) {
            let evidence = Evidence {
                geo_feature: true,
                capitalized_followers: len - 1,
                ..Default::default()
            };
            self.push(entities, span_text(text, run), EntityLabel::Loc, &evidence);
            return;
        }

        if len == 1 && is_one_of(first.text, NATIONALITIES) {
            let evidence = Evidence { gazetteer: true, ..Default::default() };
            self.push(entities, first.text, EntityLabel::Norp, &evidence);
        }
    }

    fn push(&self, entities: &mut Vec<Entity>, span: &str, label: EntityLabel, evidence: &Evidence) {
        let score = calculate_evidence(evidence, &self.weights);
        if score >= self.min_evidence {
            entities.push(Entity { text: span.to_string(), label, score });
        }
    }
}

fn in_place(places: &[PlaceHit], token: &Token<'_>) -> bool {
    places.iter().any(|p| token.start >= p.start && token.end <= p.end)
}

fn span_text<'a>(text: &'a str, run: &[Token<'_>]) -> &'a str {
    match (run.first(), run.last()) {
        (Some(first), Some(last)) => &text[first.start..last.end],
        _ => "",
    }
}

/// Decides whether `right` continues the capitalised run ending at `left`.
fn joins(text: &str, left: &Token<'_>, right: &Token<'_>) -> bool {
    if is_joinable(text, left, right) {
        return true;
    }
    let between = gap(text, left, right);
    (between == ". " && is_one_of(left.text, HONORIFICS))
        || (between == ", " && is_one_of(right.text, ORG_SUFFIXES))
}

/// Matches `March 3`, `March 3, 2024`, `March 2024` or `12/05/2023`
/// starting at token `i`. Returns the index of the last date token.
fn match_date(text: &str, tokens: &[Token<'_>], i: usize) -> Option<usize> {
    let first = &tokens[i];

    if is_one_of(first.text, MONTHS) {
        let mut last = i;
        if let Some(day) = tokens.get(i + 1) {
            let is_day = day.text.len() <= 2 && day.as_number().is_some_and(|d| (1..=31).contains(&d));
            if is_day && is_joinable(text, first, day) {
                last = i + 1;
            }
        }
        if let Some(year) = tokens.get(last + 1) {
            let between = gap(text, &tokens[last], year);
            let is_year = year.text.len() == 4 && year.as_number().is_some_and(|y| (1000..=2999).contains(&y));
            if is_year && (between == " " || between == ", ") {
                last += 1;
            }
        }
        return (last > i).then_some(last);
    }

    if first.is_numeric() && first.text.len() <= 2 {
        let (Some(mid), Some(year)) = (tokens.get(i + 1), tokens.get(i + 2)) else { return None; };
        let numeric_form = mid.is_numeric()
            && mid.text.len() <= 2
            && year.is_numeric()
            && year.text.len() == 4
            && gap(text, first, mid) == "/"
            && gap(text, mid, year) == "/";
        if numeric_form {
            return Some(i + 2);
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn find<'a>(entities: &'a [Entity], label: EntityLabel) -> Vec<&'a str> {
        entities.iter().filter(|e| e.label == label).map(|e| e.text.as_str()).collect()
    }

    #[test]
    fn test_recognizes_mixed_sentence() {
        let recognizer = Recognizer::new(0.5).unwrap();
        let text = "Dr. Jane Doe met John Smith of Acme Corp in New York on March 3, 2024.";
        let entities = recognizer.recognize(text);

        assert_eq!(find(&entities, EntityLabel::Gpe), alloc::vec!["New York"]);
        assert_eq!(find(&entities, EntityLabel::Person), alloc::vec!["Jane Doe", "John Smith"]);
        assert_eq!(find(&entities, EntityLabel::Org), alloc::vec!["Acme Corp"]);
        assert_eq!(find(&entities, EntityLabel::Date), alloc::vec!["March 3, 2024"]);
    }

    #[test]
    fn test_salutation_is_not_part_of_name() {
        let recognizer = Recognizer::new(0.5).unwrap();
        let entities = recognizer.recognize("Dear John, thanks for the update.");
        assert_eq!(find(&entities, EntityLabel::Person), alloc::vec!["John"]);
    }

    #[test]
    fn test_possessive_stops_name() {
        let recognizer = Recognizer::new(0.5).unwrap();
        let entities = recognizer.recognize("John Smith's SSN is 123-45-6789.");
        assert_eq!(find(&entities, EntityLabel::Person), alloc::vec!["John Smith"]);
        assert!(find(&entities, EntityLabel::Org).is_empty());
    }

    #[test]
    fn test_org_suffix_after_comma() {
        let recognizer = Recognizer::new(0.5).unwrap();
        let entities = recognizer.recognize("Invoices from Globex, Inc. arrive monthly.");
        assert_eq!(find(&entities, EntityLabel::Org), alloc::vec!["Globex, Inc"]);
    }

    #[test]
    fn test_numeric_date_and_locations() {
        let recognizer = Recognizer::new(0.5).unwrap();
        let entities = recognizer.recognize("Rafting the Hudson River on 07/04/2023 with German guides.");
        assert_eq!(find(&entities, EntityLabel::Date), alloc::vec!["07/04/2023"]);
        assert_eq!(find(&entities, EntityLabel::Norp), alloc::vec!["German"]);
        assert_eq!(find(&entities, EntityLabel::Loc), alloc::vec!["Hudson River"]);
    }

    #[test]
    fn test_lone_month_is_not_a_date() {
        let recognizer = Recognizer::new(0.5).unwrap();
        let entities = recognizer.recognize("We ship in March regardless.");
        assert!(find(&entities, EntityLabel::Date).is_empty());
    }

    #[test]
    fn test_high_threshold_suppresses_weak_candidates() {
        let recognizer = Recognizer::new(0.95).unwrap();
        let entities = recognizer.recognize("Dear John, see you soon.");
        assert!(entities.is_empty());
    }
}
