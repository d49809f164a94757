use redis::aio::MultiplexedConnection;
use sqlx::{Pool, Postgres};

use crate::{
    cache::cache::{get_cache_value, set_cache_value, CacheKey, CachedRows},
    constants::INGREDIENT_COUNT_PER_PAGE,
    error::Error,
    pagination::PageContext,
    schema::{Ingredient, IngredientRow, Uuid},
};

pub async fn create_ingredient(
    name: &str,
    measurement_unit: &str,
    pool: &Pool<Postgres>,
) -> Result<Uuid, Error> {
    let row: Option<(i32,)> = sqlx::query_as(
        "
        INSERT INTO ingredients (name, measurement_unit)
        VALUES ($1, $2)
        ON CONFLICT DO NOTHING RETURNING id;
    ",
    )
    .bind(name)
    .bind(measurement_unit)
    .fetch_optional(&*pool)
    .await?;

    match row {
        Some(row) => Ok(row.0),
        None => Err(Error::Conflict(format!(
            "ingredient ({name}, {measurement_unit}) already exists"
        ))),
    }
}

pub async fn get_ingredient(id: Uuid, pool: &Pool<Postgres>) -> Result<Option<Ingredient>, Error> {
    let row: Option<Ingredient> = sqlx::query_as("SELECT * FROM ingredients WHERE id = $1")
        .bind(id)
        .fetch_optional(&*pool)
        .await?;

    Ok(row)
}

pub async fn find_ingredient(name: &str, pool: &Pool<Postgres>) -> Result<Option<Uuid>, Error> {
    let row: Option<(i32,)> =
        sqlx::query_as("SELECT id FROM ingredients WHERE LOWER(name) = LOWER($1)")
            .bind(name)
            .fetch_optional(&*pool)
            .await?;

    Ok(row.map(|r| r.0))
}

pub async fn list_ingredients(pool: &Pool<Postgres>) -> Result<Vec<Ingredient>, Error> {
    let rows: Vec<Ingredient> =
        sqlx::query_as("SELECT * FROM ingredients ORDER BY name, measurement_unit")
            .fetch_all(&*pool)
            .await?;

    Ok(rows)
}

/// Read-through variant of `list_ingredients` backed by the catalog
/// cache key. Cache failures fall back to the database.
pub async fn list_ingredients_cached(
    pool: &Pool<Postgres>,
    cache: &mut MultiplexedConnection,
) -> Result<Vec<Ingredient>, Error> {
    let key = CacheKey::IngredientCatalog.to_string();

    match get_cache_value::<_, CachedRows<Ingredient>>(key.as_str(), cache).await {
        Ok(Some(hit)) => {
            log::trace!("> Found {key}");
            return Ok(hit.rows);
        }
        Ok(None) => {}
        Err(e) => log::error!("> Failed to read {key}: {e}"),
    }

    log::trace!("> Fetching {key}");
    let rows = list_ingredients(pool).await?;
    if let Err(e) = set_cache_value(key.as_str(), CachedRows::new(rows.clone()), cache).await {
        log::error!("> Failed to write {key}: {e}");
    }

    Ok(rows)
}

pub async fn fetch_ingredients(
    search: String,
    offset: i64,
    pool: &Pool<Postgres>,
) -> Result<PageContext<IngredientRow>, Error> {
    let rows: Vec<IngredientRow> = sqlx::query_as(
        "
        SELECT i.*, COUNT(*) OVER() AS count
        FROM ingredients i
        WHERE i.name ILIKE $1
        ORDER BY i.name, i.measurement_unit
        LIMIT $2 OFFSET $3
    ",
    )
    .bind(search)
    .bind(INGREDIENT_COUNT_PER_PAGE)
    .bind(offset)
    .fetch_all(&*pool)
    .await?;

    let total_count = rows.first().map(|p| p.count).unwrap_or(0);
    let page = PageContext::from_rows(rows, total_count, INGREDIENT_COUNT_PER_PAGE, offset);

    Ok(page)
}
