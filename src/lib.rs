//! # Shopping List
//!
//! Builds one consolidated shopping list from several saved recipes, each
//! scaled to a requested number of servings. Free-text ingredient lines are
//! parsed into quantity, canonical unit and name; catalog-linked entries keep
//! their keys. Entries merge per ingredient and unit, and are rendered with
//! labels from a localized reference catalog.

pub mod aggregation;
pub mod catalog;
pub mod config;
pub mod db;
pub mod errors;
pub mod formatting;
pub mod observability;
pub mod observability_config;
pub mod service;
pub mod text_processing;
pub mod units;
pub mod validation;

// Re-export types for easier access
pub use aggregation::{
    IngredientEntry, InMemoryRecipeStore, MergedEntry, RecipeStore, SelectionItem,
    ShoppingListAggregator, StoredRecipe,
};
pub use catalog::{FluentCatalog, InMemoryCatalog, LabelCatalog, Language};
pub use errors::{AppError, AppResult};
pub use service::{ShoppingList, ShoppingListService};
pub use text_processing::{LineParser, ParsedLine};
pub use units::{CanonicalUnit, UnitAliasTable};
