use sqlx::{postgres::PgPoolOptions, Pool, Postgres};

use super::error::Error;

pub async fn connect(database_url: &str, max_connections: u32) -> Result<Pool<Postgres>, Error> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;

    Ok(pool)
}

/// Applies the embedded migrations from `migrations/`.
pub async fn run_migrations(pool: &Pool<Postgres>) -> Result<(), Error> {
    log::info!("running pending database migrations");
    sqlx::migrate!().run(pool).await?;

    Ok(())
}
