//! Tests for the cart-to-export pipeline:
//! - aggregation of composition rows into shopping-list lines
//! - document assembly and line formatting
//! - filename convention

use chrono::{TimeZone, Utc};
use foodgram_sdk::{
    actions::{
        aggregate_shopping_list, validate_amounts, validate_cooking_time,
        validate_ingredient_entries, validate_tag_ids,
    },
    export::{
        format_rows, shopping_list_document, shopping_list_filename, DocumentRenderer,
        PassthroughRenderer,
    },
    schema::{IngredientEntry, RecipeIngredientRow, ShoppingListRow},
};

fn cart_row(recipe_id: i32, ingredient_id: i32, name: &str, unit: &str, amount: i32) -> RecipeIngredientRow {
    RecipeIngredientRow {
        recipe_id,
        ingredient_id,
        name: name.to_owned(),
        measurement_unit: unit.to_owned(),
        amount,
    }
}

// ============================================================================
// Aggregation
// ============================================================================

#[test]
fn test_cart_aggregation_sums_shared_ingredients() {
    let rows = vec![
        cart_row(1, 10, "flour", "g", 200),
        cart_row(1, 11, "milk", "ml", 250),
        cart_row(2, 10, "flour", "g", 300),
    ];

    let list = aggregate_shopping_list(&rows);

    assert_eq!(
        list,
        vec![
            ShoppingListRow {
                name: String::from("flour"),
                total_amount: 500,
                measurement_unit: String::from("g"),
            },
            ShoppingListRow {
                name: String::from("milk"),
                total_amount: 250,
                measurement_unit: String::from("ml"),
            },
        ]
    );
}

#[test]
fn test_aggregation_is_deterministic() {
    let forward = vec![
        cart_row(1, 10, "flour", "g", 200),
        cart_row(2, 11, "milk", "ml", 250),
    ];
    let reversed: Vec<RecipeIngredientRow> = forward.iter().rev().cloned().collect();

    assert_eq!(
        aggregate_shopping_list(&forward),
        aggregate_shopping_list(&reversed)
    );
}

// ============================================================================
// Document assembly
// ============================================================================

#[test]
fn test_full_pipeline_from_cart_rows_to_document() {
    let rows = vec![
        cart_row(1, 10, "flour", "g", 200),
        cart_row(2, 10, "flour", "g", 300),
        cart_row(2, 12, "sugar", "g", 50),
    ];

    let list = aggregate_shopping_list(&rows);
    assert_eq!(format_rows(&list), vec!["flour - 500 g", "sugar - 50 g"]);

    let document = shopping_list_document(&list);
    assert!(document.contains("<li>flour - 500 g</li>"));
    assert!(document.contains("<li>sugar - 50 g</li>"));

    let bytes = PassthroughRenderer.render(&document).unwrap();
    assert_eq!(bytes, document.as_bytes());
}

#[test]
fn test_export_filename_convention() {
    let date = Utc.with_ymd_and_hms(2026, 1, 5, 9, 0, 0).unwrap();
    assert_eq!(
        shopping_list_filename(date, "maria"),
        "shopping_list_2026-01-05_maria.pdf"
    );
}

// ============================================================================
// Composition validation entry points
// ============================================================================

#[test]
fn test_validation_pipeline_rejects_before_any_write() {
    assert!(validate_ingredient_entries(&[]).is_err());
    assert!(validate_amounts(&[IngredientEntry {
        ingredient_id: 1,
        amount: 0,
    }])
    .is_err());
    assert!(validate_tag_ids(&[]).is_err());
    assert!(validate_cooking_time(0).is_err());

    let entries = [
        IngredientEntry {
            ingredient_id: 1,
            amount: 100,
        },
        IngredientEntry {
            ingredient_id: 2,
            amount: 1,
        },
    ];
    assert!(validate_ingredient_entries(&entries).is_ok());
    assert!(validate_amounts(&entries).is_ok());
    assert!(validate_tag_ids(&[1, 2]).is_ok());
    assert!(validate_cooking_time(30).is_ok());
}
