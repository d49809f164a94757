use std::sync::OnceLock;

use redis::aio::MultiplexedConnection;
use regex::Regex;
use sqlx::{Pool, Postgres};

use crate::{
    cache::cache::{get_cache_value, set_cache_value, CacheKey, CachedRows},
    constants::TAG_COLOR_PATTERN,
    error::{Error, ValidationError},
    schema::{Tag, Uuid},
};

static TAG_COLOR_RE: OnceLock<Regex> = OnceLock::new();

fn tag_color_re() -> &'static Regex {
    TAG_COLOR_RE.get_or_init(|| Regex::new(TAG_COLOR_PATTERN).expect("valid hex color pattern"))
}

pub fn validate_tag_color(color: &str) -> Result<(), ValidationError> {
    if !tag_color_re().is_match(color) {
        return Err(ValidationError::InvalidTagColor(color.to_owned()));
    }

    Ok(())
}

pub async fn create_tag(
    name: &str,
    color: &str,
    slug: &str,
    pool: &Pool<Postgres>,
) -> Result<Uuid, Error> {
    validate_tag_color(color)?;

    let row: Option<(i32,)> = sqlx::query_as(
        "
        INSERT INTO tags (name, color, slug)
        VALUES ($1, $2, $3)
        ON CONFLICT DO NOTHING RETURNING id;
    ",
    )
    .bind(name)
    .bind(color)
    .bind(slug)
    .fetch_optional(&*pool)
    .await?;

    match row {
        Some(row) => Ok(row.0),
        None => Err(Error::Conflict(format!("tag {name} already exists"))),
    }
}

pub async fn get_tag(id: Uuid, pool: &Pool<Postgres>) -> Result<Option<Tag>, Error> {
    let row: Option<Tag> = sqlx::query_as("SELECT * FROM tags WHERE id = $1")
        .bind(id)
        .fetch_optional(&*pool)
        .await?;

    Ok(row)
}

pub async fn find_tag(slug: &str, pool: &Pool<Postgres>) -> Result<Option<Uuid>, Error> {
    let row: Option<(i32,)> = sqlx::query_as("SELECT id FROM tags WHERE slug = $1")
        .bind(slug)
        .fetch_optional(&*pool)
        .await?;

    Ok(row.map(|tag| tag.0))
}

pub async fn list_tags(pool: &Pool<Postgres>) -> Result<Vec<Tag>, Error> {
    let rows: Vec<Tag> = sqlx::query_as("SELECT * FROM tags ORDER BY name")
        .fetch_all(&*pool)
        .await?;

    Ok(rows)
}

/// Read-through variant of `list_tags` backed by the catalog cache
/// key. Cache failures fall back to the database.
pub async fn list_tags_cached(
    pool: &Pool<Postgres>,
    cache: &mut MultiplexedConnection,
) -> Result<Vec<Tag>, Error> {
    let key = CacheKey::TagCatalog.to_string();

    match get_cache_value::<_, CachedRows<Tag>>(key.as_str(), cache).await {
        Ok(Some(hit)) => {
            log::trace!("> Found {key}");
            return Ok(hit.rows);
        }
        Ok(None) => {}
        Err(e) => log::error!("> Failed to read {key}: {e}"),
    }

    log::trace!("> Fetching {key}");
    let rows = list_tags(pool).await?;
    if let Err(e) = set_cache_value(key.as_str(), CachedRows::new(rows.clone()), cache).await {
        log::error!("> Failed to write {key}: {e}");
    }

    Ok(rows)
}

pub async fn list_recipe_tags(recipe_id: Uuid, pool: &Pool<Postgres>) -> Result<Vec<Tag>, Error> {
    let rows: Vec<Tag> = sqlx::query_as(
        "
        SELECT t.*
        FROM recipe_tags_map m
        INNER JOIN tags t ON t.id = m.tag_id
        WHERE m.recipe_id = $1
        ORDER BY t.name
    ",
    )
    .bind(recipe_id)
    .fetch_all(&*pool)
    .await?;

    Ok(rows)
}
