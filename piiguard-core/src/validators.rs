// File: piiguard-core/src/validators.rs
//! Programmatic validation functions for specific PII types.
//!
//! Regular expressions only establish the shape of a candidate. These
//! functions reject shapes that cannot be real values (reserved SSN areas,
//! failed checksums, out-of-range octets) to reduce false positives.
//!
//! License: MIT OR APACHE 2.0

use std::borrow::Cow;
use std::collections::HashSet;
use std::fmt;
use once_cell::sync::Lazy;

/// The validators a pattern rule may reference by name in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidatorKind {
    Ssn,
    Luhn,
    Ipv4,
    UkNino,
}

impl ValidatorKind {
    /// Resolves the configuration name of a validator.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "ssn" => Some(ValidatorKind::Ssn),
            "luhn" => Some(ValidatorKind::Luhn),
            "ipv4" => Some(ValidatorKind::Ipv4),
            "uk_nino" => Some(ValidatorKind::UkNino),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ValidatorKind::Ssn => "ssn",
            ValidatorKind::Luhn => "luhn",
            ValidatorKind::Ipv4 => "ipv4",
            ValidatorKind::UkNino => "uk_nino",
        }
    }

    /// Runs the validator against the matched text.
    pub fn validate(&self, matched: &str) -> bool {
        match self {
            ValidatorKind::Ssn => is_valid_ssn_programmatically(matched),
            ValidatorKind::Luhn => is_valid_credit_card_programmatically(matched),
            ValidatorKind::Ipv4 => is_valid_ipv4(matched),
            ValidatorKind::UkNino => is_valid_uk_nino_programmatically(matched),
        }
    }
}

impl fmt::Display for ValidatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Validates the area number of a US SSN.
///
/// Areas `000`, `666` and `900`-`999` are never issued. Group and serial
/// numbers are not checked.
///
/// # Arguments
///
/// * `ssn` - The SSN string slice to validate. Expected format "XXX-XX-XXXX".
pub fn is_valid_ssn_programmatically(ssn: &str) -> bool {
    let Some(area) = ssn.get(0..3) else { return false; };
    if !area.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }

    !(area == "000" || area == "666" || area.starts_with('9'))
}

// Use a `once_cell` to create a static HashSet for efficient lookups.
static INVALID_NINO_PREFIXES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    let mut set = HashSet::new();
    set.extend(["BF", "BG", "EH", "GB", "JE", "NK", "KN", "LI", "NT", "TN", "ZZ"]);
    set
});

static INVALID_NINO_PREFIX_CHARS: Lazy<HashSet<char>> = Lazy::new(|| {
    let mut set = HashSet::new();
    set.extend(['D', 'F', 'I', 'Q', 'U', 'V', 'O']);
    set
});

static VALID_NINO_SUFFIX_CHARS: Lazy<HashSet<char>> = Lazy::new(|| {
    let mut set = HashSet::new();
    set.extend(['A', 'B', 'C', 'D']);
    set
});

/// Validates a UK National Insurance Number (NINO) against HMRC rules.
///
/// # Arguments
///
/// * `nino` - Expected format "AA######A", spaces allowed.
pub fn is_valid_uk_nino_programmatically(nino: &str) -> bool {
    const NINO_LENGTH: usize = 9;

    let nino_normalized: Cow<str> = if nino.chars().any(|c: char| c.is_ascii_lowercase()) {
        Cow::Owned(nino.to_uppercase())
    } else {
        Cow::Borrowed(nino)
    };

    let compact = nino_normalized.chars().filter(|c| !c.is_whitespace()).collect::<String>();
    if compact.len() != NINO_LENGTH || !compact.is_ascii() {
        return false;
    }

    let mut chars = compact.chars();

    let (Some(first), Some(second)) = (chars.next(), chars.next()) else { return false; };
    if !first.is_ascii_alphabetic() || !second.is_ascii_alphabetic() {
        return false;
    }

    if INVALID_NINO_PREFIXES.contains(&compact[0..2]) {
        return false;
    }
    if INVALID_NINO_PREFIX_CHARS.contains(&first) || INVALID_NINO_PREFIX_CHARS.contains(&second) {
        return false;
    }

    if !chars.by_ref().take(6).all(|c| c.is_ascii_digit()) {
        return false;
    }

    let Some(suffix) = chars.next() else { return false; };
    VALID_NINO_SUFFIX_CHARS.contains(&suffix) && chars.next().is_none()
}

/// Validates a digit string using the Luhn (mod 10) algorithm.
///
/// Every second digit counting from the rightmost one is doubled, and 9 is
/// subtracted from doubled values above 9. The sum must be divisible by 10.
pub fn is_valid_luhn(num_str: &str) -> bool {
    let mut sum = 0;
    let mut alternate = false;

    for c in num_str.chars().rev() {
        let Some(mut digit) = c.to_digit(10) else { return false; };

        if alternate {
            digit *= 2;
            if digit > 9 {
                digit -= 9;
            }
        }
        sum += digit;
        alternate = !alternate;
    }

    sum % 10 == 0
}

/// Validates a card number: strips separators, requires 13 to 19 digits,
/// then applies the Luhn checksum.
pub fn is_valid_credit_card_programmatically(cc_number: &str) -> bool {
    let digits: String = cc_number.chars().filter(|c| c.is_ascii_digit()).collect();
    if !(13..=19).contains(&digits.len()) {
        return false;
    }
    is_valid_luhn(&digits)
}

/// Validates a dotted-quad IPv4 address: exactly four octets, each 0-255.
pub fn is_valid_ipv4(ip: &str) -> bool {
    let octets: Vec<&str> = ip.split('.').collect();
    octets.len() == 4
        && octets.iter().all(|o| {
            !o.is_empty() && o.len() <= 3 && o.bytes().all(|b| b.is_ascii_digit()) && o.parse::<u16>().is_ok_and(|v| v <= 255)
        })
}
