//! # Reference Catalog
//!
//! Display labels for canonical unit codes and catalog ingredient keys, in
//! English and German. The catalog is an injected, read-only capability: the
//! aggregator and formatter only ever see the [`LabelCatalog`] trait, so tests
//! can hand in fixture catalogs.

use anyhow::Result;
use fluent_bundle::{FluentBundle, FluentResource};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use unic_langid::LanguageIdentifier;

use crate::config::CatalogConfig;

/// Languages the catalog carries labels for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    De,
}

impl Language {
    pub const ALL: [Language; 2] = [Language::En, Language::De];

    pub fn code(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::De => "de",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Detect the catalog language from a client language code
///
/// Region suffixes are ignored (`"de-AT"` -> German); anything unsupported
/// falls back to English.
pub fn detect_language(language_code: Option<&str>) -> Language {
    let Some(code) = language_code else {
        return Language::default();
    };

    let lang = code.split(['-', '_']).next().unwrap_or("").to_lowercase();
    Language::ALL
        .into_iter()
        .find(|l| l.code() == lang)
        .unwrap_or_default()
}

/// Read-only label lookup for unit and ingredient keys
pub trait LabelCatalog {
    /// Display label of a canonical unit code, if the catalog has one
    fn unit_label(&self, unit_key: &str, language: Language) -> Option<String>;

    /// Display label of a catalog ingredient key, if the catalog has one
    fn ingredient_label(&self, ingredient_key: &str, language: Language) -> Option<String>;
}

impl<T: LabelCatalog + ?Sized> LabelCatalog for &T {
    fn unit_label(&self, unit_key: &str, language: Language) -> Option<String> {
        (**self).unit_label(unit_key, language)
    }

    fn ingredient_label(&self, ingredient_key: &str, language: Language) -> Option<String> {
        (**self).ingredient_label(ingredient_key, language)
    }
}

/// HashMap-backed catalog, mostly used as a test fixture
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    units: HashMap<(String, Language), String>,
    ingredients: HashMap<(String, Language), String>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_unit_label(mut self, key: &str, language: Language, label: &str) -> Self {
        self.units
            .insert((key.to_string(), language), label.to_string());
        self
    }

    pub fn with_ingredient_label(mut self, key: &str, language: Language, label: &str) -> Self {
        self.ingredients
            .insert((key.to_string(), language), label.to_string());
        self
    }
}

impl LabelCatalog for InMemoryCatalog {
    fn unit_label(&self, unit_key: &str, language: Language) -> Option<String> {
        self.units.get(&(unit_key.to_string(), language)).cloned()
    }

    fn ingredient_label(&self, ingredient_key: &str, language: Language) -> Option<String> {
        self.ingredients
            .get(&(ingredient_key.to_string(), language))
            .cloned()
    }
}

/// Catalog backed by Fluent resources in `<locales_dir>/<lang>/catalog.ftl`
///
/// Message ids are `unit-<key>` and `ingredient-<key>`:
///
/// ```text
/// unit-tbsp = EL
/// ingredient-flour = Mehl
/// ```
pub struct FluentCatalog {
    bundles: HashMap<Language, FluentBundle<FluentResource>>,
}

impl FluentCatalog {
    /// Load the catalog from the crate's `locales` directory
    pub fn new() -> Result<Self> {
        let manifest_dir =
            std::env::var("CARGO_MANIFEST_DIR").unwrap_or_else(|_| ".".to_string());
        Self::from_dir(PathBuf::from(manifest_dir).join("locales"))
    }

    /// Load the catalog from the configured locales directory
    pub fn from_config(config: &CatalogConfig) -> Result<Self> {
        debug!(locales_dir = %config.locales_dir, "Loading catalog from config");
        Self::from_dir(&config.locales_dir)
    }

    /// Load the catalog from an explicit locales directory
    pub fn from_dir(locales_dir: impl AsRef<Path>) -> Result<Self> {
        let mut bundles = HashMap::new();
        for language in Language::ALL {
            let bundle = Self::create_bundle(locales_dir.as_ref(), language)?;
            bundles.insert(language, bundle);
        }
        Ok(Self { bundles })
    }

    fn create_bundle(
        locales_dir: &Path,
        language: Language,
    ) -> Result<FluentBundle<FluentResource>> {
        let locale: LanguageIdentifier = language.code().parse()?;
        let mut bundle = FluentBundle::new(vec![locale]);
        bundle.set_use_isolating(false);

        let resource_path = locales_dir.join(language.code()).join("catalog.ftl");
        match fs::read_to_string(&resource_path) {
            Ok(content) => match FluentResource::try_new(content) {
                Ok(resource) => {
                    if let Err(errors) = bundle.add_resource(resource) {
                        warn!(
                            path = %resource_path.display(),
                            errors = ?errors,
                            "Duplicate catalog messages ignored"
                        );
                    }
                }
                Err((_, errors)) => {
                    warn!(
                        path = %resource_path.display(),
                        errors = ?errors,
                        "Catalog resource has syntax errors"
                    );
                }
            },
            Err(e) => {
                warn!(
                    path = %resource_path.display(),
                    error = %e,
                    "Catalog resource not found, labels fall back to keys"
                );
            }
        }

        Ok(bundle)
    }

    fn message(&self, id: &str, language: Language) -> Option<String> {
        let bundle = self.bundles.get(&language)?;
        let pattern = bundle.get_message(id)?.value()?;

        let mut errors = vec![];
        let value = bundle.format_pattern(pattern, None, &mut errors);
        if !errors.is_empty() {
            debug!(id = %id, errors = ?errors, "Catalog message formatted with errors");
        }
        Some(value.into_owned())
    }
}

impl LabelCatalog for FluentCatalog {
    fn unit_label(&self, unit_key: &str, language: Language) -> Option<String> {
        self.message(&format!("unit-{}", unit_key), language)
    }

    fn ingredient_label(&self, ingredient_key: &str, language: Language) -> Option<String> {
        self.message(&format!("ingredient-{}", ingredient_key), language)
    }
}
