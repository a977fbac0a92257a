//! Fetch a person's movie credits and print the processed list.
//! Usage:
//!   cargo run --bin credits_dump -- [person_id] [query] [year|rating|title]
//! Requires TMDB_API_KEY in the environment (.env supported).

use anyhow::{anyhow, Context, Result};
use dotenvy::dotenv;
use filmography::config::{TmdbConfig, DEFAULT_PERSON_ID};
use filmography::credits::SortMode;
use filmography::images::ImageUrls;
use filmography::screens::{load_filmography, ScreenSlot, ScreenState};
use filmography::tmdb::TmdbClient;
use serde_json::json;
use std::env;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let mut args = env::args().skip(1);
    let person_id = match args.next() {
        Some(raw) => raw
            .parse::<u32>()
            .with_context(|| format!("person_id must be a number, got '{}'", raw))?,
        None => DEFAULT_PERSON_ID,
    };
    let query = args.next().unwrap_or_default();
    let sort = match args.next() {
        Some(raw) => raw.parse::<SortMode>()?,
        None => SortMode::default(),
    };

    let config = TmdbConfig::from_env()?;
    let client = TmdbClient::new(&config);
    let images = ImageUrls::new(config.image_base.clone());

    let screen = ScreenSlot::new();
    screen.load(load_filmography(&client, person_id)).await;
    let filmography = match screen.snapshot().await {
        ScreenState::Ready(filmography) => filmography,
        ScreenState::Failed(message) => return Err(anyhow!(message)),
        ScreenState::Loading => return Err(anyhow!("filmography did not finish loading")),
    };
    let view = filmography.view(&query, sort, &images);

    println!(
        "{}",
        serde_json::to_string_pretty(&json!({
            "person_id": person_id,
            "unique_credits": filmography.credits().len(),
            "view": view,
        }))?
    );
    Ok(())
}
