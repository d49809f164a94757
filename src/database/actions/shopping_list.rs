use std::collections::BTreeMap;

use sqlx::{Pool, Postgres};

use crate::{
    error::Error,
    schema::{RecipeIngredientRow, ShoppingListRow, Uuid},
};

/// Pulls every composition row behind the user's shopping cart. Amounts
/// are not yet aggregated here.
pub async fn list_cart_ingredients(
    user_id: Uuid,
    pool: &Pool<Postgres>,
) -> Result<Vec<RecipeIngredientRow>, Error> {
    let rows: Vec<RecipeIngredientRow> = sqlx::query_as(
        "
        SELECT ri.recipe_id AS recipe_id, i.id AS ingredient_id, i.name AS name,
               i.measurement_unit AS measurement_unit, ri.amount AS amount
        FROM user_shopping_cart c
        INNER JOIN recipe_ingredients ri ON ri.recipe_id = c.recipe_id
        INNER JOIN ingredients i ON i.id = ri.ingredient_id
        WHERE c.user_id = $1
    ",
    )
    .bind(user_id)
    .fetch_all(&*pool)
    .await?;

    Ok(rows)
}

/// Groups composition rows by (ingredient name, measurement unit) and
/// sums the amounts. Output order is deterministic: ascending by name,
/// then unit.
pub fn aggregate_shopping_list(rows: &[RecipeIngredientRow]) -> Vec<ShoppingListRow> {
    let mut totals: BTreeMap<(String, String), i64> = BTreeMap::new();
    for row in rows {
        *totals
            .entry((row.name.clone(), row.measurement_unit.clone()))
            .or_insert(0) += i64::from(row.amount);
    }

    totals
        .into_iter()
        .map(|((name, measurement_unit), total_amount)| ShoppingListRow {
            name,
            total_amount,
            measurement_unit,
        })
        .collect()
}

/// An empty cart yields an empty list, never an error.
pub async fn build_shopping_list(
    user_id: Uuid,
    pool: &Pool<Postgres>,
) -> Result<Vec<ShoppingListRow>, Error> {
    let rows = list_cart_ingredients(user_id, pool).await?;

    Ok(aggregate_shopping_list(&rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(recipe_id: i32, ingredient_id: i32, name: &str, unit: &str, amount: i32) -> RecipeIngredientRow {
        RecipeIngredientRow {
            recipe_id,
            ingredient_id,
            name: name.to_owned(),
            measurement_unit: unit.to_owned(),
            amount,
        }
    }

    #[test]
    fn empty_cart_aggregates_to_empty_list() {
        assert_eq!(aggregate_shopping_list(&[]), vec![]);
    }

    #[test]
    fn same_ingredient_across_recipes_is_summed() {
        let rows = vec![
            row(1, 10, "flour", "g", 200),
            row(2, 10, "flour", "g", 300),
        ];
        assert_eq!(
            aggregate_shopping_list(&rows),
            vec![ShoppingListRow {
                name: String::from("flour"),
                total_amount: 500,
                measurement_unit: String::from("g"),
            }]
        );
    }

    #[test]
    fn same_name_with_different_unit_stays_separate() {
        let rows = vec![
            row(1, 10, "milk", "ml", 250),
            row(2, 11, "milk", "tbsp", 2),
        ];
        let list = aggregate_shopping_list(&rows);
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].measurement_unit, "ml");
        assert_eq!(list[1].measurement_unit, "tbsp");
    }

    #[test]
    fn output_is_sorted_by_name_then_unit() {
        let rows = vec![
            row(1, 12, "sugar", "g", 50),
            row(1, 10, "flour", "g", 200),
            row(2, 11, "milk", "ml", 250),
        ];
        let list = aggregate_shopping_list(&rows);
        let names: Vec<&str> = list.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["flour", "milk", "sugar"]);
    }

    #[test]
    fn totals_do_not_overflow_i32() {
        let rows = vec![
            row(1, 10, "rice", "g", i32::MAX),
            row(2, 10, "rice", "g", i32::MAX),
        ];
        let list = aggregate_shopping_list(&rows);
        assert_eq!(list[0].total_amount, i64::from(i32::MAX) * 2);
    }
}
