//! # Scaled Aggregation
//!
//! Merges the ingredient entries of several selected recipes into one entry per
//! distinct ingredient and unit, after scaling each recipe to the requested
//! number of servings.
//!
//! Catalog-linked entries merge on `(ingredient_key, unit_key)`; free-text
//! lines merge on `(unit_token, normalized_name)`. The two key spaces never
//! meet: a catalog `flour` and a free-text `flour` stay separate entries.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, trace};

use crate::errors::AppResult;
use crate::text_processing::LineParser;

/// Catalog-linked ingredient entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredIngredient {
    pub ingredient_key: String,
    pub unit_key: Option<String>,
    pub quantity: Option<f64>,
}

/// Ingredient entry as stored for a recipe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IngredientEntry {
    /// Authored against the reference catalog
    Structured(StructuredIngredient),
    /// Unmanaged free text, e.g. `"250g flour"`
    FreeText(String),
}

impl IngredientEntry {
    pub fn structured(ingredient_key: &str, unit_key: Option<&str>, quantity: Option<f64>) -> Self {
        IngredientEntry::Structured(StructuredIngredient {
            ingredient_key: ingredient_key.to_string(),
            unit_key: unit_key.map(str::to_string),
            quantity,
        })
    }

    pub fn free_text(line: &str) -> Self {
        IngredientEntry::FreeText(line.to_string())
    }
}

/// One requested recipe and the servings to scale it to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionItem {
    pub recipe_id: i64,
    pub servings: u32,
}

impl SelectionItem {
    pub fn new(recipe_id: i64, servings: u32) -> Self {
        Self {
            recipe_id,
            servings,
        }
    }
}

/// A recipe as returned by the owned-recipes lookup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRecipe {
    pub id: i64,
    /// Base serving count; `None` or non-positive disables scaling
    pub servings: Option<i32>,
    pub ingredients: Vec<IngredientEntry>,
}

/// Identity used to decide which contributions end up in the same entry
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MergeKey {
    Catalog {
        ingredient_key: String,
        unit_key: Option<String>,
    },
    FreeText {
        unit_token: String,
        name: String,
    },
}

/// The ingredient an entry is about, from exactly one key space
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IngredientRef {
    Catalog(String),
    FreeText(String),
}

/// One line of the consolidated list before formatting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedEntry {
    pub quantity: Option<f64>,
    pub unit_key: Option<String>,
    pub ingredient: IngredientRef,
}

impl MergedEntry {
    /// Catalog key, present only for catalog-linked entries
    pub fn ingredient_key(&self) -> Option<&str> {
        match &self.ingredient {
            IngredientRef::Catalog(key) => Some(key),
            IngredientRef::FreeText(_) => None,
        }
    }

    /// Free-text name, present only for free-text entries
    pub fn name(&self) -> Option<&str> {
        match &self.ingredient {
            IngredientRef::Catalog(_) => None,
            IngredientRef::FreeText(name) => Some(name),
        }
    }
}

/// Order-independent total of the known contributions to one entry
///
/// Contributions are summed smallest first, so the same multiset of values
/// yields the same floating-point result whatever order they arrived in.
/// `None` when nothing known was contributed.
pub fn sum_contributions(contributions: &mut [f64]) -> Option<f64> {
    if contributions.is_empty() {
        return None;
    }
    contributions.sort_by(f64::total_cmp);
    Some(contributions.iter().sum())
}

/// Ratio of requested servings to the recipe's base servings
///
/// A missing or non-positive base disables scaling.
pub fn scale_factor(requested_servings: u32, recipe_servings: Option<i32>) -> f64 {
    match recipe_servings {
        Some(base) if base > 0 => f64::from(requested_servings) / f64::from(base),
        _ => 1.0,
    }
}

/// A free-text line that carried no ingredient
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedLine {
    pub recipe_id: i64,
    pub raw: String,
}

/// Result of one aggregation pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregationOutcome {
    /// Merged entries in first-seen order
    pub entries: Vec<MergedEntry>,
    /// Selected recipe ids that were not in the owned set (sorted, unique)
    pub excluded_recipe_ids: Vec<i64>,
    /// Free-text lines dropped because they had no ingredient name
    pub skipped_lines: Vec<SkippedLine>,
}

/// Merges scaled ingredient entries across recipes
#[derive(Debug, Clone, Default)]
pub struct ShoppingListAggregator {
    parser: LineParser,
}

impl ShoppingListAggregator {
    pub fn new(parser: LineParser) -> Self {
        Self { parser }
    }

    /// Merge every selection item against the recipes the user owns
    ///
    /// Every item is processed independently, so the same recipe selected
    /// twice contributes twice. Items whose recipe is absent from
    /// `owned_recipes` contribute nothing and are reported in
    /// `excluded_recipe_ids`.
    pub fn aggregate(
        &self,
        selection: &[SelectionItem],
        owned_recipes: &[StoredRecipe],
    ) -> AggregationOutcome {
        let recipes: HashMap<i64, &StoredRecipe> =
            owned_recipes.iter().map(|r| (r.id, r)).collect();

        let mut outcome = AggregationOutcome::default();
        let mut index: HashMap<MergeKey, usize> = HashMap::new();
        let mut contributions: Vec<Vec<f64>> = Vec::new();
        let mut excluded = BTreeSet::new();

        for item in selection {
            let Some(recipe) = recipes.get(&item.recipe_id) else {
                debug!(recipe_id = item.recipe_id, "Recipe not owned or unknown, excluding");
                excluded.insert(item.recipe_id);
                continue;
            };

            let scale = scale_factor(item.servings, recipe.servings);
            trace!(
                recipe_id = recipe.id,
                requested = item.servings,
                base = ?recipe.servings,
                scale,
                "Scaling recipe"
            );

            for entry in &recipe.ingredients {
                let Some((key, merged)) = self.contribution(entry, scale) else {
                    if let IngredientEntry::FreeText(raw) = entry {
                        outcome.skipped_lines.push(SkippedLine {
                            recipe_id: recipe.id,
                            raw: raw.clone(),
                        });
                    }
                    continue;
                };

                let quantity = merged.quantity;
                let i = match index.get(&key) {
                    Some(&i) => i,
                    None => {
                        index.insert(key, outcome.entries.len());
                        outcome.entries.push(merged);
                        contributions.push(Vec::new());
                        outcome.entries.len() - 1
                    }
                };
                contributions[i].extend(quantity);
            }
        }

        for (entry, values) in outcome.entries.iter_mut().zip(contributions.iter_mut()) {
            entry.quantity = sum_contributions(values);
        }
        outcome.excluded_recipe_ids = excluded.into_iter().collect();
        outcome
    }

    /// Merge key and scaled single-contribution entry for one stored entry
    fn contribution(
        &self,
        entry: &IngredientEntry,
        scale: f64,
    ) -> Option<(MergeKey, MergedEntry)> {
        // Zero counts as "no usable quantity" so it never seeds an accumulator
        let scaled = |quantity: Option<f64>| quantity.map(|q| q * scale).filter(|q| *q != 0.0);

        match entry {
            IngredientEntry::Structured(s) => {
                let unit_key = s.unit_key.clone().filter(|u| !u.is_empty());
                let key = MergeKey::Catalog {
                    ingredient_key: s.ingredient_key.clone(),
                    unit_key: unit_key.clone(),
                };
                let merged = MergedEntry {
                    quantity: scaled(s.quantity),
                    unit_key,
                    ingredient: IngredientRef::Catalog(s.ingredient_key.clone()),
                };
                Some((key, merged))
            }
            IngredientEntry::FreeText(line) => {
                let parsed = self.parser.parse_line(line)?;
                let unit_token = parsed.unit_token();
                let key = MergeKey::FreeText {
                    unit_token: unit_token.to_string(),
                    name: parsed.name.clone(),
                };
                let merged = MergedEntry {
                    quantity: scaled(parsed.quantity),
                    unit_key: parsed.unit.map(|u| u.as_str().to_string()),
                    ingredient: IngredientRef::FreeText(parsed.name),
                };
                Some((key, merged))
            }
        }
    }
}

/// Loads the recipes a user has saved, restricted to the given ids
#[allow(async_fn_in_trait)]
pub trait RecipeStore {
    async fn load_owned_recipes(
        &self,
        user_id: i64,
        recipe_ids: &[i64],
    ) -> AppResult<Vec<StoredRecipe>>;
}

/// In-memory recipe store with an explicit save relation
#[derive(Debug, Clone, Default)]
pub struct InMemoryRecipeStore {
    recipes: HashMap<i64, StoredRecipe>,
    saved: HashMap<i64, BTreeSet<i64>>,
}

impl InMemoryRecipeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_recipe(&mut self, recipe: StoredRecipe) {
        self.recipes.insert(recipe.id, recipe);
    }

    pub fn save_for_user(&mut self, user_id: i64, recipe_id: i64) {
        self.saved.entry(user_id).or_default().insert(recipe_id);
    }
}

impl RecipeStore for InMemoryRecipeStore {
    async fn load_owned_recipes(
        &self,
        user_id: i64,
        recipe_ids: &[i64],
    ) -> AppResult<Vec<StoredRecipe>> {
        let Some(saved) = self.saved.get(&user_id) else {
            return Ok(Vec::new());
        };

        Ok(recipe_ids
            .iter()
            .filter(|id| saved.contains(*id))
            .filter_map(|id| self.recipes.get(id).cloned())
            .collect())
    }
}
