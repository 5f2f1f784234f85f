//! Postgres storage for the siaga service: schema bootstrap, row models,
//! and the repository functions shared by the API and the shift-autogen
//! worker. The `mock` module exports mockall doubles of every repository
//! for handler tests.

pub mod models;
pub mod repositories;
pub mod schema;

pub mod mock;

use eyre::Result;
use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};

pub type DbPool = Pool<Postgres>;

pub async fn create_pool(database_url: &str) -> Result<DbPool> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;

    Ok(pool)
}
