/*!
 * Locale identifiers and ISO 639 language code helpers.
 *
 * `LocaleId` is the key used for targets, property scopes and output
 * locales. Tags are normalised on construction (`fr_ca` becomes `fr-CA`);
 * checking the language part against ISO 639 is a separate, explicit step
 * because filters must accept whatever the document declares.
 */

use std::fmt;
use std::str::FromStr;

use anyhow::{Result, anyhow};
use isolang::Language;
use serde::{Deserialize, Serialize};

use crate::errors::LocaleError;

/// Normalised locale tag such as `en`, `fr-CA` or `zh-Hant-TW`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LocaleId(String);

impl LocaleId {
    /// Parse and normalise a tag; `_` is accepted as a separator
    pub fn new(tag: &str) -> Result<Self, LocaleError> {
        let trimmed = tag.trim();
        if trimmed.is_empty()
            || !trimmed
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(LocaleError::InvalidTag(tag.to_string()));
        }

        let mut normalized = Vec::new();
        for (i, part) in trimmed.split(|c| c == '-' || c == '_').enumerate() {
            if part.is_empty() {
                return Err(LocaleError::InvalidTag(tag.to_string()));
            }
            let part = if i == 0 {
                part.to_ascii_lowercase()
            } else if part.len() == 2 && part.chars().all(|c| c.is_ascii_alphabetic()) {
                part.to_ascii_uppercase()
            } else if part.len() == 4 && part.chars().all(|c| c.is_ascii_alphabetic()) {
                let mut script = part.to_ascii_lowercase();
                script[..1].make_ascii_uppercase();
                script
            } else {
                part.to_string()
            };
            normalized.push(part);
        }

        Ok(Self(normalized.join("-")))
    }

    /// The tag as a string
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Language subtag, always lower case
    pub fn language(&self) -> &str {
        self.0.split('-').next().unwrap_or(&self.0)
    }

    /// Region subtag when present
    pub fn region(&self) -> Option<&str> {
        self.0
            .split('-')
            .skip(1)
            .find(|p| p.len() == 2 || (p.len() == 3 && p.chars().all(|c| c.is_ascii_digit())))
    }

    /// Whether both locales share the same language, ignoring regions
    pub fn same_language(&self, other: &LocaleId) -> bool {
        language_codes_match(self.language(), other.language())
    }

    /// Check the language subtag against ISO 639-1 / 639-2
    pub fn validate(&self) -> Result<()> {
        validate_language_code(self.language())
            .map(|_| ())
            .map_err(|_| anyhow!("Unknown language in locale '{}'", self.0))
    }
}

impl fmt::Display for LocaleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for LocaleId {
    type Err = LocaleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for LocaleId {
    type Error = LocaleError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<LocaleId> for String {
    fn from(value: LocaleId) -> Self {
        value.0
    }
}

/// Language code type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LanguageCodeType {
    /// ISO 639-1 (2-letter) code
    Part1,
    /// ISO 639-2/T (3-letter) code
    Part2T,
    /// ISO 639-2/B (3-letter) code
    Part2B,
}

// ISO 639-2/B codes that differ from their 639-2/T form
fn part2b_to_part2t(code: &str) -> Option<&'static str> {
    let mapped = match code {
        "fre" => "fra",
        "ger" => "deu",
        "dut" => "nld",
        "gre" => "ell",
        "chi" => "zho",
        "cze" => "ces",
        "ice" => "isl",
        "alb" => "sqi",
        "arm" => "hye",
        "baq" => "eus",
        "bur" => "mya",
        "per" => "fas",
        "geo" => "kat",
        "may" => "msa",
        "mac" => "mkd",
        "rum" => "ron",
        "slo" => "slk",
        "wel" => "cym",
        _ => return None,
    };
    Some(mapped)
}

fn lookup(code: &str) -> Option<Language> {
    let normalized = code.trim().to_lowercase();
    match normalized.len() {
        2 => Language::from_639_1(&normalized),
        3 => {
            let part2t = part2b_to_part2t(&normalized).unwrap_or(&normalized);
            Language::from_639_3(part2t)
        }
        _ => None,
    }
}

/// Validate if a language code is a valid ISO 639-1 or ISO 639-2 code
pub fn validate_language_code(code: &str) -> Result<LanguageCodeType> {
    let normalized = code.trim().to_lowercase();

    if normalized.len() == 2 && Language::from_639_1(&normalized).is_some() {
        return Ok(LanguageCodeType::Part1);
    }
    if normalized.len() == 3 {
        if Language::from_639_3(&normalized).is_some() {
            return Ok(LanguageCodeType::Part2T);
        }
        if part2b_to_part2t(&normalized).is_some() {
            return Ok(LanguageCodeType::Part2B);
        }
    }

    Err(anyhow!("Invalid language code: {}", code))
}

/// Normalize a language code to ISO 639-2/T (3-letter) format
pub fn normalize_to_part2t(code: &str) -> Result<String> {
    lookup(code)
        .map(|lang| lang.to_639_3().to_string())
        .ok_or_else(|| anyhow!("Cannot normalize invalid language code: {}", code))
}

/// Check whether two language codes name the same language
pub fn language_codes_match(code1: &str, code2: &str) -> bool {
    match (lookup(code1), lookup(code2)) {
        (Some(a), Some(b)) => a == b,
        _ => code1.trim().eq_ignore_ascii_case(code2.trim()),
    }
}

/// English name of the language behind a code
pub fn get_language_name(code: &str) -> Result<String> {
    lookup(code)
        .map(|lang| lang.to_name().to_string())
        .ok_or_else(|| anyhow!("Invalid language code: {}", code))
}
