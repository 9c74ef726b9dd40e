use chrono::{Datelike, NaiveDate};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::HashSet;

const POSTER_BASE: &str = "https://image.tmdb.org/t/p/w500";
const BACKDROP_BASE: &str = "https://image.tmdb.org/t/p/w780";

pub type MovieId = i32;

/// A catalog entry. Identity is `id`; the remaining fields are whatever the
/// response that first introduced the movie carried.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub id: MovieId,
    pub title: String,
    #[serde(default)]
    pub overview: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default, deserialize_with = "lenient_score")]
    pub vote_average: f64,
    #[serde(default)]
    pub release_date: Option<String>,
}

impl Movie {
    pub fn poster_url(&self) -> Option<String> {
        self.poster_path
            .as_ref()
            .map(|p| format!("{POSTER_BASE}{p}"))
    }

    pub fn backdrop_url(&self) -> Option<String> {
        self.backdrop_path
            .as_ref()
            .map(|p| format!("{BACKDROP_BASE}{p}"))
    }

    pub fn formatted_rating(&self) -> String {
        format!("{:.1}", self.vote_average.clamp(0.0, 10.0))
    }

    pub fn release_year(&self) -> Option<i32> {
        self.release_date.as_deref().and_then(extract_year)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoviePage {
    #[serde(default = "first_page")]
    pub page: u32,
    #[serde(default)]
    pub total_pages: Option<u32>,
    #[serde(default)]
    pub results: Vec<Movie>,
}

impl MoviePage {
    pub fn single(results: Vec<Movie>) -> Self {
        Self {
            page: 1,
            total_pages: Some(1),
            results,
        }
    }
}

fn first_page() -> u32 {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovieDetail {
    #[serde(flatten)]
    pub movie: Movie,
    #[serde(default)]
    pub runtime: Option<u32>,
    #[serde(default)]
    pub genres: Vec<Genre>,
    // Credits and videos are best effort: a malformed block is dropped instead of
    // failing the whole record.
    #[serde(default, deserialize_with = "tolerant")]
    pub credits: Option<Credits>,
    #[serde(default, deserialize_with = "tolerant")]
    pub videos: Option<Videos>,
}

impl MovieDetail {
    pub fn videos(&self) -> &[Video] {
        self.videos
            .as_ref()
            .map(|v| v.results.as_slice())
            .unwrap_or_default()
    }

    pub fn cast(&self) -> &[CastMember] {
        self.credits
            .as_ref()
            .map(|c| c.cast.as_slice())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Genre {
    #[serde(default)]
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Credits {
    #[serde(default)]
    pub cast: Vec<CastMember>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CastMember {
    #[serde(default)]
    pub id: i32,
    pub name: String,
    #[serde(default)]
    pub character: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Videos {
    #[serde(default)]
    pub results: Vec<Video>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Video {
    pub key: String,
    #[serde(default)]
    pub name: String,
    pub site: String,
    #[serde(rename = "type")]
    pub video_type: String,
}

/// Keeps the first occurrence of every id, preserving order.
pub fn dedupe_by_id(movies: Vec<Movie>) -> Vec<Movie> {
    let mut seen = HashSet::new();
    movies.into_iter().filter(|m| seen.insert(m.id)).collect()
}

pub fn format_runtime(minutes: u32) -> String {
    let hours = minutes / 60;
    let rest = minutes % 60;
    if hours > 0 {
        format!("{hours}h {rest}m")
    } else {
        format!("{rest}m")
    }
}

fn extract_year(date: &str) -> Option<i32> {
    let date = date.trim();
    if let Ok(parsed) = NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        return Some(parsed.year());
    }
    let prefix = date.get(..4)?;
    if prefix.chars().all(|c| c.is_ascii_digit()) {
        prefix.parse().ok()
    } else {
        None
    }
}

// TMDB normally sends a float, but integers and numeric strings show up too.
fn lenient_score<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    })
}

fn tolerant<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}
