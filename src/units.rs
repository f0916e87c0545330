//! # Unit Canonicalization
//!
//! Maps free-text unit words (German and English, singular and plural, common
//! abbreviations) onto a closed set of canonical unit codes. Lookups are exact
//! string matches after lower-casing; anything not in the table is not a unit.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::fs;
use std::str::FromStr;
use tracing::{debug, info, warn};

use crate::errors::{AppError, AppResult};

/// Canonical unit codes every recognized unit word normalizes to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CanonicalUnit {
    G,
    Kg,
    Ml,
    L,
    Cup,
    Tbsp,
    Tsp,
    Stk,
    Oz,
    Lb,
    #[serde(rename = "prise")]
    Pinch,
    Pck,
}

impl CanonicalUnit {
    pub const ALL: [CanonicalUnit; 12] = [
        CanonicalUnit::G,
        CanonicalUnit::Kg,
        CanonicalUnit::Ml,
        CanonicalUnit::L,
        CanonicalUnit::Cup,
        CanonicalUnit::Tbsp,
        CanonicalUnit::Tsp,
        CanonicalUnit::Stk,
        CanonicalUnit::Oz,
        CanonicalUnit::Lb,
        CanonicalUnit::Pinch,
        CanonicalUnit::Pck,
    ];

    /// The short code used as merge key and catalog key
    pub fn as_str(&self) -> &'static str {
        match self {
            CanonicalUnit::G => "g",
            CanonicalUnit::Kg => "kg",
            CanonicalUnit::Ml => "ml",
            CanonicalUnit::L => "l",
            CanonicalUnit::Cup => "cup",
            CanonicalUnit::Tbsp => "tbsp",
            CanonicalUnit::Tsp => "tsp",
            CanonicalUnit::Stk => "stk",
            CanonicalUnit::Oz => "oz",
            CanonicalUnit::Lb => "lb",
            CanonicalUnit::Pinch => "prise",
            CanonicalUnit::Pck => "pck",
        }
    }
}

impl fmt::Display for CanonicalUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CanonicalUnit {
    type Err = AppError;

    fn from_str(code: &str) -> Result<Self, Self::Err> {
        CanonicalUnit::ALL
            .iter()
            .copied()
            .find(|unit| unit.as_str() == code)
            .ok_or_else(|| AppError::Validation(format!("unknown unit code '{}'", code)))
    }
}

/// Built-in surface forms per canonical unit
const BUILTIN_ALIASES: &[(CanonicalUnit, &[&str])] = &[
    (
        CanonicalUnit::G,
        &["g", "g.", "gr", "gr.", "gram", "grams", "gramm", "gramme", "grammes"],
    ),
    (
        CanonicalUnit::Kg,
        &[
            "kg", "kg.", "kilo", "kilos", "kilogram", "kilograms", "kilogramm", "kilogramme",
        ],
    ),
    (
        CanonicalUnit::Ml,
        &["ml", "ml.", "milliliter", "milliliters", "millilitre", "millilitres"],
    ),
    (
        CanonicalUnit::L,
        &["l", "l.", "ltr", "ltr.", "liter", "liters", "litre", "litres"],
    ),
    (CanonicalUnit::Cup, &["cup", "cups", "tasse", "tassen"]),
    (
        CanonicalUnit::Tbsp,
        &[
            "tbsp", "tbsp.", "tbs", "tablespoon", "tablespoons", "el", "el.", "esslöffel",
            "essloeffel",
        ],
    ),
    (
        CanonicalUnit::Tsp,
        &[
            "tsp", "tsp.", "teaspoon", "teaspoons", "tl", "tl.", "teelöffel", "teeloeffel",
        ],
    ),
    (
        CanonicalUnit::Stk,
        &[
            "stk", "stk.", "stück", "stueck", "stücke", "stuecke", "piece", "pieces", "pc", "pcs",
        ],
    ),
    (CanonicalUnit::Oz, &["oz", "oz.", "ounce", "ounces"]),
    (CanonicalUnit::Lb, &["lb", "lb.", "lbs", "lbs.", "pound", "pounds"]),
    (
        CanonicalUnit::Pinch,
        &["prise", "prisen", "pinch", "pinches"],
    ),
    (
        CanonicalUnit::Pck,
        &[
            "pck", "pck.", "pkg", "pkg.", "packung", "packungen", "päckchen", "paeckchen",
            "package", "packages",
        ],
    ),
];

/// Additional unit aliases loaded from JSON
///
/// Expected structure in `config/unit_aliases.json`:
/// ```json
/// { "unit_aliases": { "tbsp": ["eßlöffel"], "g": ["grm"] } }
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct UnitAliasesConfig {
    pub unit_aliases: BTreeMap<String, Vec<String>>,
}

impl UnitAliasesConfig {
    /// Validate that every key is a canonical code and every alias is usable
    pub fn validate(&self) -> AppResult<()> {
        for (code, aliases) in &self.unit_aliases {
            code.parse::<CanonicalUnit>().map_err(|_| {
                AppError::Config(format!(
                    "unit_aliases key '{}' is not a canonical unit",
                    code
                ))
            })?;

            for (i, alias) in aliases.iter().enumerate() {
                if alias.trim().is_empty() {
                    return Err(AppError::Config(format!(
                        "unit_aliases.{}[{}] cannot be empty",
                        code, i
                    )));
                }
                if alias.chars().any(|c| c.is_control() || c.is_whitespace()) {
                    return Err(AppError::Config(format!(
                        "unit_aliases.{}[{}] '{}' must be a single word",
                        code, i, alias
                    )));
                }
            }
        }
        Ok(())
    }
}

fn read_aliases_file(path: &str) -> Option<UnitAliasesConfig> {
    let content = fs::read_to_string(path).ok()?;
    match serde_json::from_str::<UnitAliasesConfig>(&content) {
        Ok(config) => match config.validate() {
            Ok(()) => Some(config),
            Err(e) => {
                warn!("Ignoring invalid unit aliases config at '{}': {}", path, e);
                None
            }
        },
        Err(e) => {
            warn!("Failed to parse unit aliases config at '{}': {}", path, e);
            None
        }
    }
}

/// Load extra unit aliases from the environment-configured path or the fallback paths
pub fn load_unit_aliases_config() -> UnitAliasesConfig {
    if let Ok(config_path) = std::env::var("UNIT_ALIASES_CONFIG_PATH") {
        info!(
            "Loading unit aliases config from environment variable: {}",
            config_path
        );
        if let Some(config) = read_aliases_file(&config_path) {
            return config;
        }
        warn!(
            "Could not use unit aliases config '{}'. Falling back to default paths.",
            config_path
        );
    }

    let possible_paths = [
        "/app/config/unit_aliases.json", // Docker path
        "config/unit_aliases.json",      // Local development path
    ];

    for config_path in &possible_paths {
        if let Some(config) = read_aliases_file(config_path) {
            info!(
                "Successfully loaded unit aliases config from fallback path: {}",
                config_path
            );
            return config;
        }
    }

    debug!("No unit aliases config file found, using built-in aliases only");
    UnitAliasesConfig::default()
}

/// Lower-cased surface form -> canonical unit
#[derive(Debug, Clone)]
pub struct UnitAliasTable {
    aliases: HashMap<String, CanonicalUnit>,
}

impl UnitAliasTable {
    /// Table containing only the built-in German and English aliases
    pub fn builtin() -> Self {
        let aliases = BUILTIN_ALIASES
            .iter()
            .flat_map(|(unit, words)| words.iter().map(move |w| (w.to_string(), *unit)))
            .collect();
        Self { aliases }
    }

    /// Built-in aliases extended with a validated config
    pub fn with_config(config: &UnitAliasesConfig) -> AppResult<Self> {
        config.validate()?;
        let mut table = Self::builtin();
        for (code, words) in &config.unit_aliases {
            let unit: CanonicalUnit = code.parse()?;
            for word in words {
                if let Some(previous) = table.aliases.insert(word.to_lowercase(), unit) {
                    if previous != unit {
                        warn!(
                            alias = %word,
                            from = %previous,
                            to = %unit,
                            "Unit alias remapped by config"
                        );
                    }
                }
            }
        }
        Ok(table)
    }

    /// Built-in aliases plus whatever `load_unit_aliases_config` finds
    pub fn load() -> Self {
        let config = load_unit_aliases_config();
        Self::with_config(&config).unwrap_or_else(|e| {
            warn!("Unit aliases config rejected, using built-in table: {}", e);
            Self::builtin()
        })
    }

    /// Resolve a single word to its canonical unit
    pub fn lookup(&self, word: &str) -> Option<CanonicalUnit> {
        self.aliases.get(&word.to_lowercase()).copied()
    }

    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }
}

impl Default for UnitAliasTable {
    fn default() -> Self {
        Self::builtin()
    }
}
