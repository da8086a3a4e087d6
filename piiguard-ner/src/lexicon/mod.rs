// piiguard-ner/src/lexicon/mod.rs
//! Word lists and the place-name gazetteer used by the recognizer.
use daachorse::{DoubleArrayAhoCorasick, DoubleArrayAhoCorasickBuilder, MatchKind};
extern crate alloc;
use alloc::vec::Vec;
use core::fmt;

pub const HONORIFICS: &[&str] = &["Mr", "Mrs", "Ms", "Miss", "Dr", "Prof", "Sir", "Madam"];

pub const GIVEN_NAMES: &[&str] = &[
    "Aaron", "Adam", "Alice", "Amanda", "Amy", "Andrew", "Angela", "Anna", "Anthony",
    "Barbara", "Benjamin", "Betty", "Brian", "Carol", "Charles", "Christopher", "Daniel",
    "David", "Deborah", "Donald", "Dorothy", "Edward", "Elizabeth", "Emily", "Emma",
    "Eric", "Frank", "Gary", "George", "Hannah", "Helen", "Jack", "James", "Jane",
    "Jason", "Jennifer", "Jessica", "John", "Joseph", "Joshua", "Karen", "Kevin",
    "Laura", "Linda", "Lisa", "Margaret", "Maria", "Mark", "Mary", "Matthew", "Michael",
    "Michelle", "Nancy", "Olivia", "Patricia", "Paul", "Peter", "Rachel", "Richard",
    "Robert", "Ronald", "Sarah", "Sandra", "Steven", "Susan", "Thomas", "Timothy",
    "William",
];

pub const ORG_SUFFIXES: &[&str] = &[
    "Inc", "Incorporated", "Corp", "Corporation", "LLC", "LLP", "Ltd", "Limited", "Co",
    "Company", "Group", "Holdings", "Bank", "University", "Foundation", "Institute",
    "Partners", "GmbH", "PLC",
];

pub const GEO_FEATURES: &[&str] = &[
    "River", "Lake", "Mountain", "Mountains", "Ocean", "Sea", "Valley", "Island",
    "Islands", "Bay", "Desert", "Forest", "Canyon", "Park", "County",
];

pub const MONTHS: &[&str] = &[
    "January", "February", "March", "April", "May", "June", "July", "August",
    "September", "October", "November", "December", "Jan", "Feb", "Mar", "Apr",
    "Jun", "Jul", "Aug", "Sep", "Sept", "Oct", "Nov", "Dec",
];

pub const NATIONALITIES: &[&str] = &[
    "American", "British", "Canadian", "Chinese", "French", "German", "Indian",
    "Italian", "Japanese", "Mexican", "Spanish", "Russian", "Brazilian", "Irish",
];

/// Capitalised words that commonly open a sentence or a salutation and
/// should not be read as part of a name.
pub const LEADING_STOPWORDS: &[&str] = &[
    "A", "An", "The", "Dear", "Hi", "Hello", "Contact", "Call", "Email", "Please",
    "Our", "We", "I", "At", "In", "From", "To", "With", "For", "On", "By", "And",
    "Ask", "Thanks", "Regards", "Send", "Visit", "Meet",
];

const PLACES: &[&str] = &[
    "United States", "United Kingdom", "New York", "Los Angeles", "San Francisco",
    "San Diego", "New Jersey", "New Mexico", "North Carolina", "South Carolina",
    "Las Vegas", "Hong Kong", "New Zealand", "South Africa", "Washington",
    "California", "Texas", "Florida", "Illinois", "Ohio", "Georgia", "Michigan",
    "Oregon", "Nevada", "Arizona", "Colorado", "Virginia", "Massachusetts",
    "Minnesota", "Chicago", "Boston", "Seattle", "Houston", "Denver", "Atlanta",
    "Miami", "Dallas", "Portland", "London", "Paris", "Berlin", "Madrid", "Rome",
    "Tokyo", "Beijing", "Toronto", "Sydney", "Dublin", "Mumbai", "Canada", "Mexico",
    "France", "Germany", "Spain", "Italy", "Japan", "China", "India", "Brazil",
    "Ireland", "England", "Scotland", "Wales", "Australia", "Europe", "Asia", "Africa",
];

pub fn is_one_of(word: &str, list: &[&str]) -> bool {
    list.contains(&word)
}

/// A hit reported by the gazetteer: byte range of a known place name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaceHit {
    pub start: usize,
    pub end: usize,
}

/// Finds known place names with word-boundary awareness.
pub struct Gazetteer {
    automaton: DoubleArrayAhoCorasick<u32>,
}

impl fmt::Debug for Gazetteer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Gazetteer")
         .field("automaton", &"<DoubleArrayAhoCorasick>")
         .field("places", &PLACES.len())
         .finish()
    }
}

impl Gazetteer {
    /// Builds the automaton over the built-in place list. Returns `None`
    /// only if the automaton cannot be constructed.
    pub fn new() -> Option<Self> {
        let automaton = DoubleArrayAhoCorasickBuilder::new()
            .match_kind(MatchKind::LeftmostLongest)
            .build(PLACES)
            .ok()?;
        Some(Self { automaton })
    }

    /// Scans `text` for place names. Employs word-boundary checks so that
    /// "Rome" does not match inside "Romeo".
    pub fn scan(&self, text: &str) -> Vec<PlaceHit> {
        let bytes = text.as_bytes();
        let mut hits = Vec::new();

        for matched in self.automaton.leftmost_find_iter(bytes) {
            let m_start = matched.start();
            let m_end = matched.end();

            let prefix_ok = m_start == 0 || !bytes[m_start - 1].is_ascii_alphanumeric();
            let suffix_ok = m_end == bytes.len() || !bytes[m_end].is_ascii_alphanumeric();

            if prefix_ok && suffix_ok {
                hits.push(PlaceHit { start: m_start, end: m_end });
            }
        }
        hits
    }
}
