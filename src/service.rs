//! # Shopping List Service
//!
//! Request-level entry point: validates a selection, loads the recipes the
//! user owns in one store call, merges them and renders the result in the
//! requested language.

use serde::Serialize;
use std::collections::BTreeSet;
use std::time::Instant;
use tracing::{debug, info};

use crate::aggregation::{RecipeStore, SelectionItem, ShoppingListAggregator, SkippedLine};
use crate::catalog::{detect_language, FluentCatalog, LabelCatalog, Language};
use crate::config::AppConfig;
use crate::errors::{error_logging, AppError, AppResult};
use crate::formatting::{to_shopping_list_line, ShoppingListLine};
use crate::observability::record_aggregation_metrics;
use crate::text_processing::LineParser;
use crate::validation::validate_selection;

/// Consolidated shopping list returned to the caller
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ShoppingList {
    /// Rendered lines, sorted case-insensitively by their text
    pub lines: Vec<ShoppingListLine>,
    /// Selected recipes the user does not own or that do not exist
    pub excluded_recipe_ids: Vec<i64>,
    /// Free-text lines that carried no ingredient name
    pub skipped_lines: Vec<SkippedLine>,
}

impl ShoppingList {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Aggregates a user's selected recipes into a shopping list
pub struct ShoppingListService<S, C> {
    store: S,
    catalog: C,
    aggregator: ShoppingListAggregator,
    default_language: Language,
}

impl<S: RecipeStore> ShoppingListService<S, FluentCatalog> {
    /// Build a service with catalog, parser and default language taken from configuration
    pub fn from_config(store: S, config: &AppConfig) -> AppResult<Self> {
        let catalog = FluentCatalog::from_config(&config.catalog)
            .map_err(|e| AppError::Config(format!("Failed to load catalog: {:#}", e)))?;
        let parser = LineParser::with_config(config.parser.clone())?;

        Ok(Self::new(store, catalog, ShoppingListAggregator::new(parser))
            .with_default_language(config.catalog.default_language))
    }
}

impl<S: RecipeStore, C: LabelCatalog> ShoppingListService<S, C> {
    pub fn new(store: S, catalog: C, aggregator: ShoppingListAggregator) -> Self {
        Self {
            store,
            catalog,
            aggregator,
            default_language: Language::default(),
        }
    }

    /// Language used when a client does not send one
    pub fn with_default_language(mut self, language: Language) -> Self {
        self.default_language = language;
        self
    }

    /// Pick the catalog language for a client language code
    ///
    /// A missing code falls back to the configured default; an unsupported
    /// one falls back to English.
    pub fn resolve_language(&self, language_code: Option<&str>) -> Language {
        match language_code {
            Some(code) => detect_language(Some(code)),
            None => self.default_language,
        }
    }

    /// Build the shopping list for `items` on behalf of `user_id`
    ///
    /// Only malformed selections and storage failures are errors. Unknown or
    /// unowned recipes are reported in `excluded_recipe_ids`, and an empty
    /// selection yields an empty list.
    pub async fn aggregate(
        &self,
        user_id: i64,
        items: &[SelectionItem],
        language: Language,
    ) -> AppResult<ShoppingList> {
        let start = Instant::now();

        if let Err(key) = validate_selection(items) {
            error_logging::log_validation_error(
                &key,
                "aggregate_shopping_list",
                Some(user_id),
                None,
            );
            return Err(AppError::Validation(key.to_string()));
        }

        if items.is_empty() {
            debug!(user_id = %user_id, "Empty selection, nothing to aggregate");
            return Ok(ShoppingList::default());
        }

        let recipe_ids: Vec<i64> = items
            .iter()
            .map(|item| item.recipe_id)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let owned = self
            .store
            .load_owned_recipes(user_id, &recipe_ids)
            .await
            .inspect_err(|e| error_logging::log_aggregation_error(e, user_id, items.len()))?;

        let outcome = self.aggregator.aggregate(items, &owned);

        let mut lines: Vec<ShoppingListLine> = outcome
            .entries
            .iter()
            .map(|entry| to_shopping_list_line(entry, &self.catalog, language))
            .collect();
        // Ties on the text (a catalog and a free-text entry rendering alike)
        // are broken by the structured fields so the order never depends on
        // the selection order.
        lines.sort_by_cached_key(|line| {
            (
                line.raw.to_lowercase(),
                line.ingredient_key.clone(),
                line.unit_key.clone(),
            )
        });

        record_aggregation_metrics(
            items.len(),
            lines.len(),
            outcome.excluded_recipe_ids.len(),
            outcome.skipped_lines.len(),
            start.elapsed(),
        );

        info!(
            user_id = %user_id,
            selection_size = items.len(),
            owned_recipes = owned.len(),
            lines = lines.len(),
            excluded = outcome.excluded_recipe_ids.len(),
            skipped_lines = outcome.skipped_lines.len(),
            language = %language,
            "Shopping list aggregated"
        );

        Ok(ShoppingList {
            lines,
            excluded_recipe_ids: outcome.excluded_recipe_ids,
            skipped_lines: outcome.skipped_lines,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregation::{IngredientEntry, InMemoryRecipeStore, StoredRecipe};
    use crate::catalog::InMemoryCatalog;
    use crate::units::UnitAliasTable;

    struct FailingStore;

    impl RecipeStore for FailingStore {
        async fn load_owned_recipes(&self, _: i64, _: &[i64]) -> AppResult<Vec<StoredRecipe>> {
            Err(AppError::Database("connection refused".to_string()))
        }
    }

    fn aggregator() -> ShoppingListAggregator {
        ShoppingListAggregator::new(LineParser::with_units(UnitAliasTable::builtin()))
    }

    #[tokio::test]
    async fn test_lines_are_sorted_case_insensitively() {
        let mut store = InMemoryRecipeStore::new();
        store.add_recipe(StoredRecipe {
            id: 1,
            servings: None,
            ingredients: vec![
                IngredientEntry::free_text("zucchini"),
                IngredientEntry::structured("egg", None, Some(2.0)),
                IngredientEntry::free_text("apples"),
            ],
        });
        store.save_for_user(1, 1);
        let catalog = InMemoryCatalog::new().with_ingredient_label("egg", Language::En, "Eggs");
        let service = ShoppingListService::new(store, catalog, aggregator());

        let list = service
            .aggregate(1, &[SelectionItem::new(1, 1)], Language::En)
            .await
            .unwrap();
        let raw: Vec<&str> = list.lines.iter().map(|l| l.raw.as_str()).collect();
        assert_eq!(raw, vec!["2 Eggs", "apples", "zucchini"]);
    }

    #[tokio::test]
    async fn test_from_config_uses_catalog_settings() {
        let mut store = InMemoryRecipeStore::new();
        store.add_recipe(StoredRecipe {
            id: 1,
            servings: Some(2),
            ingredients: vec![IngredientEntry::structured("flour", Some("g"), Some(250.0))],
        });
        store.save_for_user(1, 1);

        let mut config = AppConfig::default();
        config.catalog.default_language = Language::De;
        config.catalog.locales_dir =
            concat!(env!("CARGO_MANIFEST_DIR"), "/locales").to_string();
        let service = ShoppingListService::from_config(store, &config).unwrap();

        let language = service.resolve_language(None);
        assert_eq!(language, Language::De);
        assert_eq!(service.resolve_language(Some("en-GB")), Language::En);

        let list = service
            .aggregate(1, &[SelectionItem::new(1, 4)], language)
            .await
            .unwrap();
        assert_eq!(list.lines[0].raw, "500 g Mehl");
    }

    #[test]
    fn test_from_config_rejects_invalid_parser_settings() {
        let mut config = AppConfig::default();
        config.parser.max_ingredient_length = 0;
        let result = ShoppingListService::from_config(InMemoryRecipeStore::new(), &config);
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[tokio::test]
    async fn test_catalog_and_free_text_ties_sort_the_same_either_way() {
        let mut store = InMemoryRecipeStore::new();
        store.add_recipe(StoredRecipe {
            id: 1,
            servings: None,
            ingredients: vec![IngredientEntry::free_text("2 eggs")],
        });
        store.add_recipe(StoredRecipe {
            id: 2,
            servings: None,
            ingredients: vec![IngredientEntry::structured("eggs", None, Some(2.0))],
        });
        store.save_for_user(1, 1);
        store.save_for_user(1, 2);
        let service = ShoppingListService::new(store, InMemoryCatalog::new(), aggregator());

        let forward_items = [SelectionItem::new(1, 1), SelectionItem::new(2, 1)];
        let backward_items = [SelectionItem::new(2, 1), SelectionItem::new(1, 1)];
        let forward = service.aggregate(1, &forward_items, Language::En).await.unwrap();
        let backward = service.aggregate(1, &backward_items, Language::En).await.unwrap();
        assert_eq!(forward, backward);
        assert_eq!(forward.lines[0].ingredient_key, None);
    }

    #[tokio::test]
    async fn test_store_errors_propagate() {
        let service = ShoppingListService::new(FailingStore, InMemoryCatalog::new(), aggregator());
        let result = service
            .aggregate(1, &[SelectionItem::new(1, 2)], Language::En)
            .await;
        assert!(matches!(result, Err(AppError::Database(_))));
    }

    #[tokio::test]
    async fn test_empty_selection_skips_the_store() {
        let service = ShoppingListService::new(FailingStore, InMemoryCatalog::new(), aggregator());
        let list = service.aggregate(1, &[], Language::En).await.unwrap();
        assert!(list.is_empty());
    }

    #[tokio::test]
    async fn test_zero_servings_is_rejected() {
        let service = ShoppingListService::new(FailingStore, InMemoryCatalog::new(), aggregator());
        let result = service
            .aggregate(1, &[SelectionItem::new(1, 0)], Language::En)
            .await;
        assert_eq!(
            result,
            Err(AppError::Validation("selection-invalid-servings".to_string()))
        );
    }
}
