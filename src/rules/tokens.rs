//! Amount and date token parsing.

use crate::error::{Error, Result};
use chrono::NaiveDate;
use regex::Regex;

/// Date format used in contract text (DD.MM.YYYY).
pub const DATE_FORMAT: &str = "%d.%m.%Y";

/// Compiled token patterns shared by the rules.
#[derive(Debug, Clone)]
pub(crate) struct TokenPatterns {
    amount: Regex,
    date: Regex,
    duration: Regex,
}

impl TokenPatterns {
    pub(crate) fn new() -> Self {
        Self {
            amount: Regex::new(r"([0-9\s]+) ?₽").unwrap(),
            date: Regex::new(r"([0-9]{2}\.[0-9]{2}\.[0-9]{4})").unwrap(),
            duration: Regex::new(r"(?i)срок действия.*?([0-9]+).*?мес").unwrap(),
        }
    }

    /// All ruble amounts in document order.
    pub(crate) fn ruble_amounts(&self, text: &str) -> Result<Vec<u64>> {
        self.amount
            .captures_iter(text)
            .map(|caps| parse_amount(&caps[1]))
            .collect()
    }

    /// Date tokens in document order, unparsed.
    pub(crate) fn date_tokens<'t>(&self, text: &'t str) -> Vec<&'t str> {
        self.date
            .captures_iter(text)
            .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
            .collect()
    }

    /// Contract term in months, if a "срок действия ... N ... мес" phrase exists.
    pub(crate) fn duration_months(&self, text: &str) -> Result<Option<u64>> {
        match self.duration.captures(text) {
            Some(caps) => {
                let digits = &caps[1];
                digits
                    .parse::<u64>()
                    .map(Some)
                    .map_err(|_| Error::InvalidNumber(digits.to_string()))
            }
            None => Ok(None),
        }
    }
}

/// Convert an amount token such as `"1 500 000 "` to an integer.
pub fn parse_amount(token: &str) -> Result<u64> {
    let digits: String = token.chars().filter(|c| *c != ' ').collect();
    digits
        .trim()
        .parse::<u64>()
        .map_err(|_| Error::InvalidAmount(token.to_string()))
}

/// Parse a DD.MM.YYYY date strictly.
pub fn parse_date(token: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(token, DATE_FORMAT).map_err(|_| Error::InvalidDate(token.to_string()))
}
