//! Query the catalog and print what the list and detail screens would receive.
//! Usage:
//!   cargo run --bin catalog_props -- popular [page]
//!   cargo run --bin catalog_props -- search <query>
//!   cargo run --bin catalog_props -- detail <tmdb_id>
//! Requires TMDB_API_KEY in the environment (.env supported).

use anyhow::{bail, Context, Result};
use cinelist::config::Config;
use cinelist::detail::{select_trailer, youtube_url, DetailSummary};
use cinelist::models::dedupe_by_id;
use cinelist::tmdb::{CatalogApi, TmdbClient};
use dotenvy::dotenv;
use serde_json::json;
use std::env;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_target(false)
        .compact()
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    let config = Config::from_env();
    if !config.has_credential() {
        bail!("TMDB_API_KEY not set");
    }
    let client = TmdbClient::from_config(&config)?;

    let output = match args.first().map(String::as_str) {
        Some("popular") => {
            let page = match args.get(1) {
                Some(raw) => raw.parse::<u32>().context("page must be a number")?,
                None => 1,
            };
            let data = client.fetch_popular(page).await?;
            let raw_count = data.results.len();
            let movies = dedupe_by_id(data.results);
            json!({
                "page": data.page,
                "total_pages": data.total_pages,
                "duplicates_dropped": raw_count - movies.len(),
                "movies": movies,
            })
        }
        Some("search") => {
            let query = args[1..].join(" ");
            if query.trim().is_empty() {
                bail!("search needs a query");
            }
            let data = client.search(query.trim()).await?;
            json!({ "query": query.trim(), "movies": dedupe_by_id(data.results) })
        }
        Some("detail") => {
            let id = args
                .get(1)
                .context("detail needs a TMDB id")?
                .parse::<i32>()
                .context("TMDB id must be a number")?;
            let detail = client.fetch_detail(id).await?;
            let summary = DetailSummary::from_detail(&detail);
            json!({
                "id": detail.movie.id,
                "title": detail.movie.title,
                "runtime": detail.runtime,
                "subtitle": summary.subtitle,
                "rating": summary.rating,
                "genres": summary.genres,
                "cast": summary.cast,
                "overview": summary.overview,
                "trailer": select_trailer(detail.videos()).map(youtube_url),
                "videos": detail.videos().len(),
            })
        }
        _ => bail!("usage: catalog_props popular [page] | search <query> | detail <id>"),
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
