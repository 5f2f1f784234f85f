use color_eyre::eyre::Result;
use dotenv::dotenv;
use siaga_api::config::ApiConfig;
use siaga_db::{create_pool, schema::initialize_database};
use siaga_notify::config::NotifyConfig;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    // Pull in .env for local development; deployed instances set real vars
    dotenv().ok();

    // Resolve server and delivery-channel configuration before any
    // connection is opened
    let config = ApiConfig::from_env()?;
    let notify = NotifyConfig::from_env()?;

    let db_pool = create_pool(&config.database_url).await?;
    initialize_database(&db_pool).await?;

    siaga_api::start_server(config, notify, db_pool).await?;

    Ok(())
}
