use std::env;
use std::path::PathBuf;

pub const DEFAULT_BASE_URL: &str = "https://api.themoviedb.org/3";
pub const DEFAULT_LANGUAGE: &str = "en-US";

#[derive(Debug, Clone)]
pub struct Config {
    /// Empty when unset; catalog requests then fail with `MissingCredential`.
    pub api_key: String,
    pub base_url: String,
    pub language: String,
    pub favorites_path: PathBuf,
}

impl Config {
    pub fn from_env() -> Self {
        let api_key = env::var("TMDB_API_KEY").unwrap_or_default();
        let base_url = non_empty_var("TMDB_BASE_URL")
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        let language = non_empty_var("TMDB_LANGUAGE").unwrap_or_else(|| DEFAULT_LANGUAGE.to_string());
        let favorites_path = non_empty_var("CINELIST_FAVORITES")
            .map(PathBuf::from)
            .unwrap_or_else(default_favorites_path);
        Self {
            api_key: api_key.trim().to_string(),
            base_url,
            language,
            favorites_path,
        }
    }

    pub fn has_credential(&self) -> bool {
        !self.api_key.is_empty()
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn default_favorites_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("cinelist")
        .join("favorites.json")
}
