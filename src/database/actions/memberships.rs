use sqlx::{Pool, Postgres};

use crate::{
    constants::RECIPE_COUNT_PER_PAGE,
    error::Error,
    pagination::PageContext,
    schema::{AddOutcome, RecipeRow, RecipeSummary, RemoveOutcome, Uuid},
};

/// Per-user recipe sets. Both sets share the same (user_id, recipe_id)
/// layout and the same idempotent add/remove semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MembershipSet {
    Favorites,
    ShoppingCart,
}

impl MembershipSet {
    fn table(self) -> &'static str {
        match self {
            MembershipSet::Favorites => "user_favorites",
            MembershipSet::ShoppingCart => "user_shopping_cart",
        }
    }
}

async fn get_recipe_summary(
    recipe_id: Uuid,
    pool: &Pool<Postgres>,
) -> Result<RecipeSummary, Error> {
    let row: Option<RecipeSummary> =
        sqlx::query_as("SELECT id, name, image, cooking_time FROM recipes WHERE id = $1")
            .bind(recipe_id)
            .fetch_optional(&*pool)
            .await?;

    row.ok_or(Error::not_found("recipe", recipe_id))
}

async fn add_membership(
    set: MembershipSet,
    user_id: Uuid,
    recipe_id: Uuid,
    pool: &Pool<Postgres>,
) -> Result<AddOutcome, Error> {
    let summary = get_recipe_summary(recipe_id, pool).await?;

    let result = sqlx::query(&format!(
        "INSERT INTO {} (user_id, recipe_id) VALUES ($1, $2) ON CONFLICT DO NOTHING;",
        set.table()
    ))
    .bind(user_id)
    .bind(recipe_id)
    .execute(&*pool)
    .await?;

    if result.rows_affected() == 0 {
        return Ok(AddOutcome::AlreadyPresent);
    }

    Ok(AddOutcome::Added(summary))
}

async fn remove_membership(
    set: MembershipSet,
    user_id: Uuid,
    recipe_id: Uuid,
    pool: &Pool<Postgres>,
) -> Result<RemoveOutcome, Error> {
    get_recipe_summary(recipe_id, pool).await?;

    let result = sqlx::query(&format!(
        "DELETE FROM {} WHERE user_id = $1 AND recipe_id = $2",
        set.table()
    ))
    .bind(user_id)
    .bind(recipe_id)
    .execute(&*pool)
    .await?;

    if result.rows_affected() == 0 {
        return Ok(RemoveOutcome::NotPresent);
    }

    Ok(RemoveOutcome::Removed)
}

async fn has_membership(
    set: MembershipSet,
    user_id: Uuid,
    recipe_id: Uuid,
    pool: &Pool<Postgres>,
) -> Result<bool, Error> {
    let row: Option<(i32,)> = sqlx::query_as(&format!(
        "SELECT recipe_id FROM {} WHERE user_id = $1 AND recipe_id = $2",
        set.table()
    ))
    .bind(user_id)
    .bind(recipe_id)
    .fetch_optional(&*pool)
    .await?;

    Ok(row.is_some())
}

async fn fetch_membership(
    set: MembershipSet,
    user_id: Uuid,
    offset: i64,
    pool: &Pool<Postgres>,
) -> Result<PageContext<RecipeRow>, Error> {
    let rows: Vec<RecipeRow> = sqlx::query_as(&format!(
        "
        SELECT r.*, COUNT(*) OVER() AS count
        FROM {} m
        INNER JOIN recipes r ON r.id = m.recipe_id
        WHERE m.user_id = $1
        ORDER BY r.name
        LIMIT $2 OFFSET $3
    ",
        set.table()
    ))
    .bind(user_id)
    .bind(RECIPE_COUNT_PER_PAGE)
    .bind(offset)
    .fetch_all(&*pool)
    .await?;

    let total_count = rows.first().map(|p| p.count).unwrap_or(0);
    let page = PageContext::from_rows(rows, total_count, RECIPE_COUNT_PER_PAGE, offset);

    Ok(page)
}

pub async fn add_to_favorites(
    user_id: Uuid,
    recipe_id: Uuid,
    pool: &Pool<Postgres>,
) -> Result<AddOutcome, Error> {
    add_membership(MembershipSet::Favorites, user_id, recipe_id, pool).await
}

pub async fn remove_from_favorites(
    user_id: Uuid,
    recipe_id: Uuid,
    pool: &Pool<Postgres>,
) -> Result<RemoveOutcome, Error> {
    remove_membership(MembershipSet::Favorites, user_id, recipe_id, pool).await
}

pub async fn is_favorite(
    user_id: Uuid,
    recipe_id: Uuid,
    pool: &Pool<Postgres>,
) -> Result<bool, Error> {
    has_membership(MembershipSet::Favorites, user_id, recipe_id, pool).await
}

pub async fn fetch_favorites(
    user_id: Uuid,
    offset: i64,
    pool: &Pool<Postgres>,
) -> Result<PageContext<RecipeRow>, Error> {
    fetch_membership(MembershipSet::Favorites, user_id, offset, pool).await
}

pub async fn add_to_cart(
    user_id: Uuid,
    recipe_id: Uuid,
    pool: &Pool<Postgres>,
) -> Result<AddOutcome, Error> {
    add_membership(MembershipSet::ShoppingCart, user_id, recipe_id, pool).await
}

pub async fn remove_from_cart(
    user_id: Uuid,
    recipe_id: Uuid,
    pool: &Pool<Postgres>,
) -> Result<RemoveOutcome, Error> {
    remove_membership(MembershipSet::ShoppingCart, user_id, recipe_id, pool).await
}

pub async fn is_in_cart(
    user_id: Uuid,
    recipe_id: Uuid,
    pool: &Pool<Postgres>,
) -> Result<bool, Error> {
    has_membership(MembershipSet::ShoppingCart, user_id, recipe_id, pool).await
}

pub async fn fetch_cart(
    user_id: Uuid,
    offset: i64,
    pool: &Pool<Postgres>,
) -> Result<PageContext<RecipeRow>, Error> {
    fetch_membership(MembershipSet::ShoppingCart, user_id, offset, pool).await
}
