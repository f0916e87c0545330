//! Validation module for request-boundary checks
//!
//! Malformed selections are rejected here, before they reach the aggregator.
//! Unknown or unowned recipe ids are *not* malformed: the aggregator drops
//! them. Validation errors are returned as short string keys that the
//! surrounding service can localize.

use crate::aggregation::SelectionItem;
use crate::errors::{AppError, AppResult};

/// Maximum number of items accepted in one selection
pub const MAX_SELECTION_ITEMS: usize = 100;

/// Maximum length of one authored ingredient line
pub const MAX_INGREDIENT_LINE_LENGTH: usize = 200;

/// Validate the shape of a selection
///
/// # Returns
/// * `Ok(())` - Selection is acceptable (an empty selection is acceptable)
/// * `Err(&str)` - Error key: "selection-too-large" or "selection-invalid-servings"
///
/// # Examples
/// ```
/// use shopping_list::aggregation::SelectionItem;
/// use shopping_list::validation::validate_selection;
///
/// assert!(validate_selection(&[SelectionItem::new(1, 4)]).is_ok());
/// assert!(validate_selection(&[]).is_ok());
/// assert_eq!(
///     validate_selection(&[SelectionItem::new(1, 0)]),
///     Err("selection-invalid-servings")
/// );
/// ```
pub fn validate_selection(items: &[SelectionItem]) -> Result<(), &'static str> {
    if items.len() > MAX_SELECTION_ITEMS {
        return Err("selection-too-large");
    }

    if items.iter().any(|item| item.servings == 0) {
        return Err("selection-invalid-servings");
    }

    Ok(())
}

/// Parse and validate a JSON selection body
///
/// Expects `[{"recipe_id": 1, "servings": 4}, ...]`. Non-numeric ids or
/// servings (including numeric strings) are rejected.
///
/// # Examples
/// ```
/// use shopping_list::validation::parse_selection_json;
///
/// let items = parse_selection_json(r#"[{"recipe_id": 3, "servings": 2}]"#)?;
/// assert_eq!(items[0].recipe_id, 3);
/// assert!(parse_selection_json(r#"[{"recipe_id": "3", "servings": 2}]"#).is_err());
/// # Ok::<(), shopping_list::errors::AppError>(())
/// ```
pub fn parse_selection_json(body: &str) -> AppResult<Vec<SelectionItem>> {
    let items: Vec<SelectionItem> = serde_json::from_str(body)?;
    validate_selection(&items).map_err(|key| AppError::Validation(key.to_string()))?;
    Ok(items)
}

/// Validate an ingredient line entered while authoring a recipe
///
/// # Returns
/// * `Ok(&str)` - The trimmed line
/// * `Err(&str)` - Error key: "line-empty" or "line-too-long"
pub fn validate_ingredient_line(line: &str) -> Result<&str, &'static str> {
    let trimmed = line.trim();

    if trimmed.is_empty() {
        return Err("line-empty");
    }

    if trimmed.chars().count() > MAX_INGREDIENT_LINE_LENGTH {
        return Err("line-too-long");
    }

    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_size_limit() {
        let items = vec![SelectionItem::new(1, 2); MAX_SELECTION_ITEMS + 1];
        assert_eq!(validate_selection(&items), Err("selection-too-large"));
        assert!(validate_selection(&items[..MAX_SELECTION_ITEMS]).is_ok());
    }

    #[test]
    fn test_unknown_recipe_ids_are_not_malformed() {
        assert!(validate_selection(&[SelectionItem::new(-5, 1)]).is_ok());
    }

    #[test]
    fn test_parse_selection_json_rejects_bad_shapes() {
        assert!(parse_selection_json("{}").is_err());
        assert!(parse_selection_json(r#"[{"recipe_id": 1}]"#).is_err());
        assert!(parse_selection_json(r#"[{"recipe_id": 1, "servings": -2}]"#).is_err());
        assert!(parse_selection_json(r#"[{"recipe_id": 1, "servings": "two"}]"#).is_err());
        assert_eq!(
            parse_selection_json(r#"[{"recipe_id": 1, "servings": 0}]"#),
            Err(AppError::Validation("selection-invalid-servings".to_string()))
        );
    }

    #[test]
    fn test_parse_selection_json_keeps_duplicates() {
        let body = r#"[{"recipe_id": 1, "servings": 2}, {"recipe_id": 1, "servings": 2}]"#;
        let items = parse_selection_json(body).unwrap();
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn test_validate_ingredient_line() {
        assert_eq!(validate_ingredient_line("  2 cups flour "), Ok("2 cups flour"));
        assert_eq!(validate_ingredient_line("   "), Err("line-empty"));
        assert_eq!(
            validate_ingredient_line(&"a".repeat(MAX_INGREDIENT_LINE_LENGTH + 1)),
            Err("line-too-long")
        );
    }
}
