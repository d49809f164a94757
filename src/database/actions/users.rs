use sqlx::{Pool, Postgres};

use crate::{
    authentication::{cryptography::verify_password, jwt::generate_jwt_session},
    error::Error,
    schema::{SubscriptionRow, User, Uuid},
};

pub async fn get_user(pool: &Pool<Postgres>, username: &str) -> Result<Option<User>, Error> {
    let row: Option<User> = sqlx::query_as("SELECT * FROM users WHERE username = $1")
        .bind(username)
        .fetch_optional(&*pool)
        .await?;

    Ok(row)
}

pub async fn get_user_by_id(pool: &Pool<Postgres>, user_id: Uuid) -> Result<Option<User>, Error> {
    let row: Option<User> = sqlx::query_as("SELECT * FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(&*pool)
        .await?;

    Ok(row)
}

/// Creates a user. `password` must already be an argon2 hash produced
/// by `cryptography::hash_password`. Returns false when the username or
/// email is taken.
pub async fn register_user(
    username: &str,
    email: &str,
    password: &str,
    pool: &Pool<Postgres>,
) -> Result<bool, Error> {
    let query = sqlx::query(
        "
        INSERT INTO users (username, email, password)
        VALUES ($1, $2, $3)
        ON CONFLICT DO NOTHING;
    ",
    )
    .bind(username)
    .bind(email)
    .bind(password)
    .execute(&*pool)
    .await?;

    Ok(query.rows_affected() > 0)
}

/// Verifies credentials and mints a session token. Unknown usernames
/// and wrong passwords are indistinguishable to the caller.
pub async fn login_user(
    username: &str,
    password: &str,
    pool: &Pool<Postgres>,
) -> Result<String, Error> {
    let user = get_user(pool, username)
        .await?
        .ok_or(Error::Unauthorized("invalid credentials"))?;

    let authenticated = verify_password(password, &user.password)
        .map_err(|_| Error::Unauthorized("invalid credentials"))?;
    if !authenticated {
        return Err(Error::Unauthorized("invalid credentials"));
    }

    generate_jwt_session(&user)
}

/// Idempotent. Returns false when the subscription already existed.
pub async fn subscribe(
    subscriber_id: Uuid,
    author_id: Uuid,
    pool: &Pool<Postgres>,
) -> Result<bool, Error> {
    if subscriber_id == author_id {
        return Err(Error::Conflict(String::from(
            "user cannot subscribe to themselves",
        )));
    }
    if get_user_by_id(pool, author_id).await?.is_none() {
        return Err(Error::not_found("user", author_id));
    }

    let result = sqlx::query(
        "
        INSERT INTO user_subscriptions (subscriber_id, author_id)
        VALUES ($1, $2)
        ON CONFLICT DO NOTHING;
    ",
    )
    .bind(subscriber_id)
    .bind(author_id)
    .execute(&*pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Idempotent. Returns false when there was nothing to remove.
pub async fn unsubscribe(
    subscriber_id: Uuid,
    author_id: Uuid,
    pool: &Pool<Postgres>,
) -> Result<bool, Error> {
    let result =
        sqlx::query("DELETE FROM user_subscriptions WHERE subscriber_id = $1 AND author_id = $2")
            .bind(subscriber_id)
            .bind(author_id)
            .execute(&*pool)
            .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn list_subscriptions(
    subscriber_id: Uuid,
    pool: &Pool<Postgres>,
) -> Result<Vec<SubscriptionRow>, Error> {
    let rows: Vec<SubscriptionRow> = sqlx::query_as(
        "
        SELECT s.author_id AS author_id, u.username AS author_username
        FROM user_subscriptions s
        INNER JOIN users u ON u.id = s.author_id
        WHERE s.subscriber_id = $1
        ORDER BY u.username
    ",
    )
    .bind(subscriber_id)
    .fetch_all(&*pool)
    .await?;

    Ok(rows)
}
