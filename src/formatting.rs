//! Renders merged entries back into human-readable shopping list lines.

use serde::{Deserialize, Serialize};

use crate::aggregation::{IngredientRef, MergedEntry};
use crate::catalog::{LabelCatalog, Language};

/// One output line together with the structured data it was rendered from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShoppingListLine {
    pub raw: String,
    pub quantity: Option<f64>,
    pub unit_key: Option<String>,
    pub ingredient_key: Option<String>,
}

/// Format a quantity for display
///
/// Whole numbers have no decimal point; anything else is rounded to two
/// decimals with trailing zeros stripped.
///
/// ```rust
/// use shopping_list::formatting::format_quantity;
///
/// assert_eq!(format_quantity(400.0), "400");
/// assert_eq!(format_quantity(1.5), "1.5");
/// assert_eq!(format_quantity(0.333333), "0.33");
/// ```
pub fn format_quantity(quantity: f64) -> String {
    if quantity.fract() == 0.0 {
        return format!("{:.0}", quantity);
    }

    let fixed = format!("{:.2}", quantity);
    fixed
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string()
}

/// Render one merged entry as a display line
///
/// Labels come from the catalog; a key without a label is shown verbatim.
pub fn format_entry(
    entry: &MergedEntry,
    catalog: &impl LabelCatalog,
    language: Language,
) -> String {
    let ingredient_label = match &entry.ingredient {
        IngredientRef::Catalog(key) => catalog
            .ingredient_label(key, language)
            .unwrap_or_else(|| key.clone()),
        IngredientRef::FreeText(name) => name.clone(),
    };

    let quantity = match entry.quantity {
        Some(q) if q != 0.0 => q,
        _ => return ingredient_label,
    };

    let unit_label = entry
        .unit_key
        .as_deref()
        .map(|key| catalog.unit_label(key, language).unwrap_or_else(|| key.to_string()));

    match unit_label {
        Some(unit) => format!("{} {} {}", format_quantity(quantity), unit, ingredient_label),
        None => format!("{} {}", format_quantity(quantity), ingredient_label),
    }
}

/// Render an entry and keep its structured fields alongside the text
pub fn to_shopping_list_line(
    entry: &MergedEntry,
    catalog: &impl LabelCatalog,
    language: Language,
) -> ShoppingListLine {
    ShoppingListLine {
        raw: format_entry(entry, catalog, language),
        quantity: entry.quantity,
        unit_key: entry.unit_key.clone(),
        ingredient_key: entry.ingredient_key().map(str::to_string),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::InMemoryCatalog;

    fn catalog() -> InMemoryCatalog {
        InMemoryCatalog::new()
            .with_unit_label("tbsp", Language::De, "EL")
            .with_ingredient_label("flour", Language::De, "Mehl")
    }

    #[test]
    fn test_format_quantity() {
        assert_eq!(format_quantity(2.0), "2");
        assert_eq!(format_quantity(2.50), "2.5");
        assert_eq!(format_quantity(0.126), "0.13");
        assert_eq!(format_quantity(0.1), "0.1");
        assert_eq!(format_quantity(1.999), "2");
        assert_eq!(format_quantity(-3.0), "-3");
    }

    #[test]
    fn test_catalog_labels_are_used() {
        let entry = MergedEntry {
            quantity: Some(2.0),
            unit_key: Some("tbsp".to_string()),
            ingredient: IngredientRef::Catalog("flour".to_string()),
        };
        assert_eq!(format_entry(&entry, &catalog(), Language::De), "2 EL Mehl");
    }

    #[test]
    fn test_missing_labels_fall_back_to_keys() {
        let entry = MergedEntry {
            quantity: Some(0.5),
            unit_key: Some("tsp".to_string()),
            ingredient: IngredientRef::Catalog("cumin".to_string()),
        };
        assert_eq!(format_entry(&entry, &catalog(), Language::En), "0.5 tsp cumin");
    }

    #[test]
    fn test_unknown_or_zero_quantity_prints_label_only() {
        let mut entry = MergedEntry {
            quantity: None,
            unit_key: Some("tbsp".to_string()),
            ingredient: IngredientRef::FreeText("salt".to_string()),
        };
        assert_eq!(format_entry(&entry, &catalog(), Language::De), "salt");
        entry.quantity = Some(0.0);
        assert_eq!(format_entry(&entry, &catalog(), Language::De), "salt");
    }

    #[test]
    fn test_no_unit_omits_unit_segment() {
        let entry = MergedEntry {
            quantity: Some(3.0),
            unit_key: None,
            ingredient: IngredientRef::FreeText("eggs".to_string()),
        };
        let line = to_shopping_list_line(&entry, &catalog(), Language::En);
        assert_eq!(line.raw, "3 eggs");
        assert_eq!(line.unit_key, None);
        assert_eq!(line.ingredient_key, None);
    }
}
