use thiserror::Error;

use crate::constants::{
    MAX_AMOUNT, MAX_COOKING_TIME, MAX_INGREDIENTS, MAX_TAGS, MIN_AMOUNT, MIN_COOKING_TIME,
    MIN_INGREDIENTS, MIN_TAGS,
};

/// Rejection reasons for recipe composition input, in the order the
/// validation pipeline checks them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("a recipe requires at least one ingredient")]
    EmptyIngredients,
    #[error("ingredient {0} is listed more than once")]
    DuplicateIngredient(i32),
    #[error(
        "recipe must use between {min} and {max} ingredients, got {count}",
        min = MIN_INGREDIENTS,
        max = MAX_INGREDIENTS,
        count = .0
    )]
    IngredientCountOutOfRange(usize),
    #[error("ingredient {0} does not exist")]
    UnknownIngredient(i32),
    #[error(
        "amount {amount} for ingredient {ingredient_id} is outside {min}..={max}",
        min = MIN_AMOUNT,
        max = MAX_AMOUNT
    )]
    AmountOutOfRange { ingredient_id: i32, amount: i32 },
    #[error(
        "recipe must carry between {min} and {max} tags, got {count}",
        min = MIN_TAGS,
        max = MAX_TAGS,
        count = .0
    )]
    TagCountOutOfRange(usize),
    #[error("tag {0} is listed more than once")]
    DuplicateTag(i32),
    #[error(
        "cooking time {value} is outside {min}..={max} minutes",
        min = MIN_COOKING_TIME,
        max = MAX_COOKING_TIME,
        value = .0
    )]
    CookingTimeOutOfRange(i32),
    #[error("author already has a recipe named {0:?}")]
    DuplicateRecipeName(String),
    #[error("{0:?} is not a hex color")]
    InvalidTagColor(String),
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("{entity} {id} does not exist")]
    NotFound { entity: &'static str, id: i32 },
    #[error("conflicting write: {0}")]
    Conflict(String),
    #[error("storage error: {0}")]
    Storage(String),
    #[error("cache error: {0}")]
    Cache(String),
    #[error("unauthorized: {0}")]
    Unauthorized(&'static str),
    #[error("invalid session: {0}")]
    InvalidSession(&'static str),
}

impl Error {
    pub fn not_found(entity: &'static str, id: i32) -> Self {
        Self::NotFound { entity, id }
    }
}

impl From<sqlx::Error> for Error {
    fn from(value: sqlx::Error) -> Self {
        match value {
            sqlx::Error::Database(e) => match e.code().as_deref() {
                // unique_violation
                Some("23505") => Self::Conflict(format!("{e}")),
                // serialization_failure, surfaced by concurrent transactions
                Some("40001") => Self::Conflict(format!("{e}")),
                _ => Self::Storage(format!("{e}")),
            },
            sqlx::Error::RowNotFound => Self::Storage(String::from("row not found")),
            sqlx::Error::PoolTimedOut => Self::Storage(String::from("pool timed out")),
            sqlx::Error::PoolClosed => Self::Storage(String::from("pool closed")),
            sqlx::Error::WorkerCrashed => Self::Storage(String::from("worker crashed")),
            other => Self::Storage(format!("{other}")),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for Error {
    fn from(value: sqlx::migrate::MigrateError) -> Self {
        Self::Storage(format!("migration failed: {value}"))
    }
}

impl From<redis::RedisError> for Error {
    fn from(value: redis::RedisError) -> Self {
        Self::Cache(format!("{:?} - {:?}", value.code(), value.detail()))
    }
}
