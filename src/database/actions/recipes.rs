use std::collections::HashSet;

use sqlx::{Pool, Postgres, QueryBuilder, Transaction};

use crate::{
    constants::{
        MAX_AMOUNT, MAX_COOKING_TIME, MAX_INGREDIENTS, MAX_TAGS, MIN_AMOUNT, MIN_COOKING_TIME,
        MIN_INGREDIENTS, MIN_TAGS, RECIPE_COUNT_PER_PAGE,
    },
    error::{Error, ValidationError},
    jwt::SessionData,
    pagination::PageContext,
    permissions::ActionType,
    schema::{
        IngredientEntry, NewRecipe, Recipe, RecipeIngredientRow, RecipeRow, RecipeUpdate, Uuid,
    },
};

// Validation pipeline. Pure checks first, catalog lookups after, so a
// rejected composition never touches the recipe tables.

pub fn validate_ingredient_entries(entries: &[IngredientEntry]) -> Result<(), ValidationError> {
    if entries.is_empty() {
        return Err(ValidationError::EmptyIngredients);
    }

    let mut seen = HashSet::new();
    for entry in entries {
        if !seen.insert(entry.ingredient_id) {
            return Err(ValidationError::DuplicateIngredient(entry.ingredient_id));
        }
    }

    if entries.len() < MIN_INGREDIENTS || entries.len() > MAX_INGREDIENTS {
        return Err(ValidationError::IngredientCountOutOfRange(entries.len()));
    }

    Ok(())
}

pub fn validate_amounts(entries: &[IngredientEntry]) -> Result<(), ValidationError> {
    for entry in entries {
        if entry.amount < MIN_AMOUNT || entry.amount > MAX_AMOUNT {
            return Err(ValidationError::AmountOutOfRange {
                ingredient_id: entry.ingredient_id,
                amount: entry.amount,
            });
        }
    }

    Ok(())
}

pub fn validate_tag_ids(tag_ids: &[Uuid]) -> Result<(), ValidationError> {
    if tag_ids.len() < MIN_TAGS || tag_ids.len() > MAX_TAGS {
        return Err(ValidationError::TagCountOutOfRange(tag_ids.len()));
    }

    let mut seen = HashSet::new();
    for id in tag_ids {
        if !seen.insert(*id) {
            return Err(ValidationError::DuplicateTag(*id));
        }
    }

    Ok(())
}

pub fn validate_cooking_time(cooking_time: i32) -> Result<(), ValidationError> {
    if cooking_time < MIN_COOKING_TIME || cooking_time > MAX_COOKING_TIME {
        return Err(ValidationError::CookingTimeOutOfRange(cooking_time));
    }

    Ok(())
}

async fn check_ingredients_exist(
    entries: &[IngredientEntry],
    pool: &Pool<Postgres>,
) -> Result<(), Error> {
    let ids: Vec<Uuid> = entries.iter().map(|e| e.ingredient_id).collect();
    let known: Vec<(i32,)> = sqlx::query_as("SELECT id FROM ingredients WHERE id = ANY($1)")
        .bind(&ids)
        .fetch_all(&*pool)
        .await?;
    let known: HashSet<i32> = known.into_iter().map(|row| row.0).collect();

    for id in ids {
        if !known.contains(&id) {
            return Err(ValidationError::UnknownIngredient(id).into());
        }
    }

    Ok(())
}

async fn check_tags_exist(tag_ids: &[Uuid], pool: &Pool<Postgres>) -> Result<(), Error> {
    let known: Vec<(i32,)> = sqlx::query_as("SELECT id FROM tags WHERE id = ANY($1)")
        .bind(tag_ids)
        .fetch_all(&*pool)
        .await?;
    let known: HashSet<i32> = known.into_iter().map(|row| row.0).collect();

    for id in tag_ids {
        if !known.contains(id) {
            return Err(Error::not_found("tag", *id));
        }
    }

    Ok(())
}

async fn insert_ingredient_rows(
    recipe_id: Uuid,
    entries: &[IngredientEntry],
    tr: &mut Transaction<'_, Postgres>,
) -> Result<(), Error> {
    let mut query_builder: QueryBuilder<Postgres> =
        QueryBuilder::new("INSERT INTO recipe_ingredients (recipe_id, ingredient_id, amount) ");

    query_builder.push_values(entries, |mut b, entry| {
        b.push_bind(recipe_id)
            .push_bind(entry.ingredient_id)
            .push_bind(entry.amount);
    });

    query_builder.build().execute(&mut **tr).await?;

    Ok(())
}

async fn insert_tag_rows(
    recipe_id: Uuid,
    tag_ids: &[Uuid],
    tr: &mut Transaction<'_, Postgres>,
) -> Result<(), Error> {
    let mut query_builder: QueryBuilder<Postgres> =
        QueryBuilder::new("INSERT INTO recipe_tags_map (recipe_id, tag_id) ");

    query_builder.push_values(tag_ids, |mut b, tag_id| {
        b.push_bind(recipe_id).push_bind(*tag_id);
    });

    query_builder.build().execute(&mut **tr).await?;

    Ok(())
}

/// Runs the full validation pipeline on a submitted composition, then
/// writes the recipe row and both join tables in one transaction.
pub async fn create_recipe(new: NewRecipe, pool: &Pool<Postgres>) -> Result<Recipe, Error> {
    validate_ingredient_entries(&new.ingredients)?;
    check_ingredients_exist(&new.ingredients, pool).await?;
    validate_amounts(&new.ingredients)?;
    validate_tag_ids(&new.tag_ids)?;
    check_tags_exist(&new.tag_ids, pool).await?;
    validate_cooking_time(new.cooking_time)?;

    if find_recipe(new.author_id, &new.name, pool).await?.is_some() {
        return Err(ValidationError::DuplicateRecipeName(new.name).into());
    }

    let mut tr = pool.begin().await?;

    let recipe: Recipe = sqlx::query_as(
        "
        INSERT INTO recipes (author_id, name, image, text, cooking_time)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *;
    ",
    )
    .bind(new.author_id)
    .bind(&new.name)
    .bind(&new.image)
    .bind(&new.text)
    .bind(new.cooking_time)
    .fetch_one(&mut *tr)
    .await?;

    insert_ingredient_rows(recipe.id, &new.ingredients, &mut tr).await?;
    insert_tag_rows(recipe.id, &new.tag_ids, &mut tr).await?;

    tr.commit().await?;
    log::debug!("created recipe {} for user {}", recipe.id, recipe.author_id);

    Ok(recipe)
}

/// Validates like `create_recipe`, then overwrites the recipe row and
/// replaces the submitted parts of the composition in one transaction.
/// The recipe row is locked for the duration so concurrent replaces
/// cannot interleave their delete and insert phases.
pub async fn update_recipe(
    id: Uuid,
    update: RecipeUpdate,
    pool: &Pool<Postgres>,
) -> Result<Recipe, Error> {
    let current = get_recipe(id, pool)
        .await?
        .ok_or(Error::not_found("recipe", id))?;

    if let Some(entries) = update.ingredients.as_deref() {
        validate_ingredient_entries(entries)?;
        check_ingredients_exist(entries, pool).await?;
        validate_amounts(entries)?;
    }
    if let Some(tag_ids) = update.tag_ids.as_deref() {
        validate_tag_ids(tag_ids)?;
        check_tags_exist(tag_ids, pool).await?;
    }
    if let Some(cooking_time) = update.cooking_time {
        validate_cooking_time(cooking_time)?;
    }
    if let Some(name) = update.name.as_deref() {
        let taken: Option<(i32,)> =
            sqlx::query_as("SELECT id FROM recipes WHERE author_id = $1 AND name = $2 AND id <> $3")
                .bind(current.author_id)
                .bind(name)
                .bind(id)
                .fetch_optional(&*pool)
                .await?;

        if taken.is_some() {
            return Err(ValidationError::DuplicateRecipeName(name.to_owned()).into());
        }
    }

    let name = update.name.unwrap_or(current.name);
    let text = update.text.unwrap_or(current.text);
    let image = update.image.or(current.image);
    let cooking_time = update.cooking_time.unwrap_or(current.cooking_time);

    let mut tr = pool.begin().await?;

    sqlx::query("SELECT id FROM recipes WHERE id = $1 FOR UPDATE")
        .bind(id)
        .execute(&mut *tr)
        .await?;

    let recipe: Recipe = sqlx::query_as(
        "
        UPDATE recipes SET name = $1, text = $2, image = $3, cooking_time = $4
        WHERE id = $5
        RETURNING *;
    ",
    )
    .bind(name)
    .bind(text)
    .bind(image)
    .bind(cooking_time)
    .bind(id)
    .fetch_one(&mut *tr)
    .await?;

    if let Some(entries) = update.ingredients.as_deref() {
        sqlx::query("DELETE FROM recipe_ingredients WHERE recipe_id = $1")
            .bind(id)
            .execute(&mut *tr)
            .await?;
        insert_ingredient_rows(id, entries, &mut tr).await?;
    }
    if let Some(tag_ids) = update.tag_ids.as_deref() {
        sqlx::query("DELETE FROM recipe_tags_map WHERE recipe_id = $1")
            .bind(id)
            .execute(&mut *tr)
            .await?;
        insert_tag_rows(id, tag_ids, &mut tr).await?;
    }

    tr.commit().await?;
    log::debug!("updated recipe {id}");

    Ok(recipe)
}

pub async fn delete_recipe(id: Uuid, pool: &Pool<Postgres>) -> Result<(), Error> {
    let mut tr = pool.begin().await?;

    sqlx::query("SELECT id FROM recipes WHERE id = $1 FOR UPDATE")
        .bind(id)
        .execute(&mut *tr)
        .await?;

    sqlx::query("DELETE FROM recipe_ingredients WHERE recipe_id = $1")
        .bind(id)
        .execute(&mut *tr)
        .await?;
    sqlx::query("DELETE FROM recipe_tags_map WHERE recipe_id = $1")
        .bind(id)
        .execute(&mut *tr)
        .await?;
    sqlx::query("DELETE FROM user_favorites WHERE recipe_id = $1")
        .bind(id)
        .execute(&mut *tr)
        .await?;
    sqlx::query("DELETE FROM user_shopping_cart WHERE recipe_id = $1")
        .bind(id)
        .execute(&mut *tr)
        .await?;

    let result = sqlx::query("DELETE FROM recipes WHERE id = $1")
        .bind(id)
        .execute(&mut *tr)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::not_found("recipe", id));
    }

    tr.commit().await?;
    log::debug!("deleted recipe {id}");

    Ok(())
}

pub async fn find_recipe(
    author_id: Uuid,
    name: &str,
    pool: &Pool<Postgres>,
) -> Result<Option<Uuid>, Error> {
    let row: Option<(i32,)> =
        sqlx::query_as("SELECT id FROM recipes WHERE author_id = $1 AND name = $2")
            .bind(author_id)
            .bind(name)
            .fetch_optional(&*pool)
            .await?;

    Ok(row.map(|r| r.0))
}

pub async fn get_recipe(id: Uuid, pool: &Pool<Postgres>) -> Result<Option<Recipe>, Error> {
    let row: Option<Recipe> = sqlx::query_as("SELECT * FROM recipes WHERE id = $1")
        .bind(id)
        .fetch_optional(&*pool)
        .await?;

    Ok(row)
}

pub async fn get_recipe_author(id: Uuid, pool: &Pool<Postgres>) -> Result<Option<String>, Error> {
    let row: Option<(String,)> = sqlx::query_as(
        "
        SELECT u.username
        FROM recipes r
        INNER JOIN users u ON u.id = r.author_id
        WHERE r.id = $1
    ",
    )
    .bind(id)
    .fetch_optional(&*pool)
    .await?;

    Ok(row.map(|x| x.0))
}

/// Resolves a recipe the session is allowed to modify. Admins may
/// modify any recipe, everyone else only their own.
pub async fn get_recipe_mut(
    id: Uuid,
    session: &SessionData,
    pool: &Pool<Postgres>,
) -> Result<Recipe, Error> {
    session.authenticate(ActionType::ManageOwnRecipes)?;
    let recipe = get_recipe(id, pool)
        .await?
        .ok_or(Error::not_found("recipe", id))?;

    if session.authenticate(ActionType::ManageAllRecipes).is_ok() {
        return Ok(recipe);
    }
    if recipe.author_id != session.user_id {
        return Err(Error::Unauthorized("recipe belongs to another user"));
    }

    Ok(recipe)
}

pub async fn fetch_recipes(
    search: String,
    author: Option<Uuid>,
    offset: i64,
    pool: &Pool<Postgres>,
) -> Result<PageContext<RecipeRow>, Error> {
    let rows: Vec<RecipeRow> = match author {
        Some(author) => {
            sqlx::query_as(
                "
                SELECT r.*, COUNT(*) OVER() AS count
                FROM recipes r
                WHERE r.author_id = $1 AND r.name ILIKE $2
                ORDER BY r.created_at DESC
                LIMIT $3 OFFSET $4
            ",
            )
            .bind(author)
            .bind(search)
            .bind(RECIPE_COUNT_PER_PAGE)
            .bind(offset)
            .fetch_all(&*pool)
            .await?
        }
        None => {
            sqlx::query_as(
                "
                SELECT r.*, COUNT(*) OVER() AS count
                FROM recipes r
                WHERE r.name ILIKE $1
                ORDER BY r.created_at DESC
                LIMIT $2 OFFSET $3
            ",
            )
            .bind(search)
            .bind(RECIPE_COUNT_PER_PAGE)
            .bind(offset)
            .fetch_all(&*pool)
            .await?
        }
    };

    let total_count = rows.first().map(|p| p.count).unwrap_or(0);
    let page = PageContext::from_rows(rows, total_count, RECIPE_COUNT_PER_PAGE, offset);

    Ok(page)
}

/// Lists a recipe's composition in insertion order, resolved against
/// the ingredient catalog.
pub async fn list_recipe_ingredients(
    recipe_id: Uuid,
    pool: &Pool<Postgres>,
) -> Result<Vec<RecipeIngredientRow>, Error> {
    let rows: Vec<RecipeIngredientRow> = sqlx::query_as(
        "
        SELECT ri.recipe_id AS recipe_id, i.id AS ingredient_id, i.name AS name,
               i.measurement_unit AS measurement_unit, ri.amount AS amount
        FROM recipe_ingredients ri
        INNER JOIN ingredients i ON i.id = ri.ingredient_id
        WHERE ri.recipe_id = $1
        ORDER BY i.name
    ",
    )
    .bind(recipe_id)
    .fetch_all(&*pool)
    .await?;

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{MAX_AMOUNT, MAX_COOKING_TIME, MAX_INGREDIENTS, MAX_TAGS};

    fn entry(ingredient_id: i32, amount: i32) -> IngredientEntry {
        IngredientEntry {
            ingredient_id,
            amount,
        }
    }

    #[test]
    fn empty_composition_is_rejected_first() {
        assert_eq!(
            validate_ingredient_entries(&[]),
            Err(ValidationError::EmptyIngredients)
        );
    }

    #[test]
    fn duplicate_ingredient_wins_over_count_check() {
        let entries: Vec<IngredientEntry> = (0..(MAX_INGREDIENTS as i32 + 1))
            .map(|_| entry(7, 100))
            .collect();
        assert_eq!(
            validate_ingredient_entries(&entries),
            Err(ValidationError::DuplicateIngredient(7))
        );
    }

    #[test]
    fn too_many_distinct_ingredients() {
        let entries: Vec<IngredientEntry> = (1..=(MAX_INGREDIENTS as i32 + 1))
            .map(|id| entry(id, 100))
            .collect();
        assert_eq!(
            validate_ingredient_entries(&entries),
            Err(ValidationError::IngredientCountOutOfRange(
                MAX_INGREDIENTS + 1
            ))
        );
    }

    #[test]
    fn amounts_are_inclusive_on_both_ends() {
        assert!(validate_amounts(&[entry(1, MIN_AMOUNT), entry(2, MAX_AMOUNT)]).is_ok());
        assert_eq!(
            validate_amounts(&[entry(1, MIN_AMOUNT - 1)]),
            Err(ValidationError::AmountOutOfRange {
                ingredient_id: 1,
                amount: MIN_AMOUNT - 1
            })
        );
        assert_eq!(
            validate_amounts(&[entry(1, MAX_AMOUNT + 1)]),
            Err(ValidationError::AmountOutOfRange {
                ingredient_id: 1,
                amount: MAX_AMOUNT + 1
            })
        );
    }

    #[test]
    fn tag_count_bounds_and_duplicates() {
        assert_eq!(
            validate_tag_ids(&[]),
            Err(ValidationError::TagCountOutOfRange(0))
        );

        let too_many: Vec<i32> = (1..=(MAX_TAGS as i32 + 1)).collect();
        assert_eq!(
            validate_tag_ids(&too_many),
            Err(ValidationError::TagCountOutOfRange(MAX_TAGS + 1))
        );

        assert_eq!(
            validate_tag_ids(&[3, 3]),
            Err(ValidationError::DuplicateTag(3))
        );
        assert!(validate_tag_ids(&[1, 2, 3]).is_ok());
    }

    #[test]
    fn cooking_time_is_inclusive_on_both_ends() {
        assert!(validate_cooking_time(MIN_COOKING_TIME).is_ok());
        assert!(validate_cooking_time(MAX_COOKING_TIME).is_ok());
        assert_eq!(
            validate_cooking_time(MIN_COOKING_TIME - 1),
            Err(ValidationError::CookingTimeOutOfRange(MIN_COOKING_TIME - 1))
        );
        assert_eq!(
            validate_cooking_time(MAX_COOKING_TIME + 1),
            Err(ValidationError::CookingTimeOutOfRange(MAX_COOKING_TIME + 1))
        );
    }
}
