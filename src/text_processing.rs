//! # Text Processing Module
//!
//! Turns one free-text ingredient line into a structured quantity / unit / name
//! triple.
//!
//! ## Features
//!
//! - Leading quantity detection: integers, decimals with `.` or `,`, simple
//!   fractions (`1/2`) and mixed numbers (`1 1/2`)
//! - Unit word detection against the German/English alias table in [`crate::units`]
//! - Lines without a usable quantity keep their whole text as the ingredient name
//!
//! Parsing never fails loudly: an unusable line yields `None` and the caller
//! decides what to do with it.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::errors::{AppError, AppResult};
use crate::units::{CanonicalUnit, UnitAliasTable};

// Alternation order matters: the regex crate picks the leftmost alternative
// that matches, so the mixed number must come before the bare fraction and
// the bare fraction before the plain number.
lazy_static! {
    static ref QUANTITY_REGEX: Regex = Regex::new(
        r"^(?P<quantity>-?\d+(?:[.,]\d+)?\s+\d+/\d+|-?\d+/\d+|-?\d+(?:[.,]\d+)?)"
    )
    .expect("Quantity pattern should be valid");
    static ref DEFAULT_UNITS: UnitAliasTable = UnitAliasTable::load();
}

/// Structured result of parsing one ingredient line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedLine {
    /// Numeric quantity, `None` when the line has no leading quantity
    pub quantity: Option<f64>,
    /// Canonical unit when the word after the quantity is a known unit
    pub unit: Option<CanonicalUnit>,
    /// Lower-cased, trimmed ingredient name (never empty)
    pub name: String,
    /// The line exactly as it was given
    pub raw: String,
}

impl ParsedLine {
    /// Canonical unit code, or `""` when no unit was recognized
    pub fn unit_token(&self) -> &'static str {
        self.unit.map(|u| u.as_str()).unwrap_or("")
    }
}

/// Configuration options for line parsing
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ParserConfig {
    /// Maximum length for ingredient names (cut at a word boundary if longer)
    pub max_ingredient_length: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            max_ingredient_length: 255,
        }
    }
}

impl ParserConfig {
    /// Validate parser configuration parameters
    pub fn validate(&self) -> AppResult<()> {
        if self.max_ingredient_length == 0 {
            return Err(AppError::Config(
                "max_ingredient_length must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

fn parse_number(token: &str) -> Option<f64> {
    token.replace(',', ".").parse::<f64>().ok()
}

fn parse_fraction(token: &str) -> Option<f64> {
    let (numerator, denominator) = token.split_once('/')?;
    let numerator = numerator.parse::<f64>().ok()?;
    let denominator = denominator.parse::<f64>().ok()?;
    if denominator == 0.0 {
        return None;
    }
    Some(numerator / denominator)
}

/// Convert a quantity token to its numeric value
///
/// Accepts the same grammars the line parser matches: mixed numbers
/// (`"1 1/2"`), simple fractions (`"3/4"`) and integers or decimals using
/// either `.` or `,` as separator. A leading `-` applies to the whole value.
///
/// # Examples
///
/// ```rust
/// use shopping_list::text_processing::parse_quantity;
///
/// assert_eq!(parse_quantity("1 1/2"), Some(1.5));
/// assert_eq!(parse_quantity("1/4"), Some(0.25));
/// assert_eq!(parse_quantity("2,5"), Some(2.5));
/// assert_eq!(parse_quantity("1/0"), None);
/// assert_eq!(parse_quantity("some"), None);
/// ```
pub fn parse_quantity(token: &str) -> Option<f64> {
    let token = token.trim();
    let (sign, magnitude) = match token.strip_prefix('-') {
        Some(rest) => (-1.0, rest),
        None => (1.0, token),
    };

    let value = match magnitude.split_once(char::is_whitespace) {
        Some((whole, fraction)) => parse_number(whole)? + parse_fraction(fraction.trim())?,
        None if magnitude.contains('/') => parse_fraction(magnitude)?,
        None => parse_number(magnitude)?,
    };

    Some(sign * value)
}

/// Parser for free-text ingredient lines
#[derive(Debug, Clone)]
pub struct LineParser {
    units: UnitAliasTable,
    config: ParserConfig,
}

impl Default for LineParser {
    fn default() -> Self {
        Self::new()
    }
}

impl LineParser {
    /// Create a parser using the process-wide unit alias table
    ///
    /// The table is built once from the built-in aliases plus the optional
    /// `config/unit_aliases.json` extension.
    pub fn new() -> Self {
        Self {
            units: DEFAULT_UNITS.clone(),
            config: ParserConfig::default(),
        }
    }

    /// Create a parser with an explicit alias table
    pub fn with_units(units: UnitAliasTable) -> Self {
        Self {
            units,
            config: ParserConfig::default(),
        }
    }

    /// Create a parser with custom configuration
    ///
    /// # Examples
    ///
    /// ```rust
    /// use shopping_list::text_processing::{LineParser, ParserConfig};
    ///
    /// let parser = LineParser::with_config(ParserConfig { max_ingredient_length: 50 })?;
    /// # Ok::<(), shopping_list::errors::AppError>(())
    /// ```
    pub fn with_config(config: ParserConfig) -> AppResult<Self> {
        config.validate()?;
        debug!(
            max_ingredient_length = config.max_ingredient_length,
            "Creating LineParser with custom config"
        );
        Ok(Self {
            units: DEFAULT_UNITS.clone(),
            config,
        })
    }

    /// Parse one ingredient line
    ///
    /// Returns `None` for lines that carry no ingredient: blank lines, and
    /// lines whose name is empty once the quantity and unit are removed
    /// (e.g. `"250"`).
    ///
    /// # Examples
    ///
    /// ```rust
    /// use shopping_list::text_processing::LineParser;
    ///
    /// let parser = LineParser::new();
    ///
    /// let line = parser.parse_line("1 1/2 cups milk").unwrap();
    /// assert_eq!(line.quantity, Some(1.5));
    /// assert_eq!(line.unit_token(), "cup");
    /// assert_eq!(line.name, "milk");
    ///
    /// let line = parser.parse_line("salt").unwrap();
    /// assert_eq!(line.quantity, None);
    /// assert_eq!(line.unit_token(), "");
    /// assert_eq!(line.name, "salt");
    ///
    /// assert!(parser.parse_line("   ").is_none());
    /// ```
    pub fn parse_line(&self, line: &str) -> Option<ParsedLine> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            trace!("Skipping blank ingredient line");
            return None;
        }

        let (quantity, remainder) = self.split_quantity(trimmed);
        let (unit, name) = self.split_unit(remainder);

        let name = self.normalize_name(name);
        if name.is_empty() {
            debug!(raw = %line, "Ingredient line has no name after quantity and unit");
            return None;
        }

        trace!(
            raw = %line,
            quantity = ?quantity,
            unit = ?unit,
            name = %name,
            "Parsed ingredient line"
        );

        Some(ParsedLine {
            quantity,
            unit,
            name,
            raw: line.to_string(),
        })
    }

    /// Parse every line of a multi-line block, dropping unusable lines
    pub fn parse_lines(&self, text: &str) -> Vec<ParsedLine> {
        text.lines().filter_map(|line| self.parse_line(line)).collect()
    }

    fn split_quantity<'a>(&self, trimmed: &'a str) -> (Option<f64>, &'a str) {
        let Some(m) = QUANTITY_REGEX.captures(trimmed).and_then(|c| c.name("quantity")) else {
            return (None, trimmed);
        };

        match parse_quantity(m.as_str()) {
            Some(value) => (Some(value), trimmed[m.end()..].trim_start()),
            None => {
                debug!(token = %m.as_str(), "Quantity token is not a usable number");
                (None, trimmed)
            }
        }
    }

    fn split_unit<'a>(&self, remainder: &'a str) -> (Option<CanonicalUnit>, &'a str) {
        match remainder.split_once(char::is_whitespace) {
            Some((word, rest)) if !rest.trim().is_empty() => match self.units.lookup(word) {
                Some(unit) => (Some(unit), rest),
                None => (None, remainder),
            },
            _ => (None, remainder),
        }
    }

    fn normalize_name(&self, name: &str) -> String {
        let mut name = name.trim().to_lowercase();

        if name.chars().count() > self.config.max_ingredient_length {
            let original = name.clone();
            let truncated: String = name.chars().take(self.config.max_ingredient_length).collect();
            name = match truncated.rfind(' ') {
                Some(last_space) => truncated[..last_space].trim_end().to_string(),
                None => truncated,
            };
            warn!(
                limit = self.config.max_ingredient_length,
                original = %original,
                truncated = %name,
                "Ingredient name truncated due to length limit"
            );
        }

        name
    }
}
