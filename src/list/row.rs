use crate::models::{format_runtime, Movie, MovieId};

#[derive(Debug, Clone, PartialEq)]
pub struct MovieRow {
    pub id: MovieId,
    pub title: String,
    pub overview: String,
    pub rating: String,
    pub year: Option<i32>,
    pub poster_url: Option<String>,
    pub is_favorite: bool,
    pub runtime_minutes: Option<u32>,
}

impl MovieRow {
    pub fn project(movie: &Movie, is_favorite: bool, runtime_minutes: Option<u32>) -> Self {
        Self {
            id: movie.id,
            title: movie.title.clone(),
            overview: movie.overview.clone(),
            rating: format!("★ {}", movie.formatted_rating()),
            year: movie.release_year(),
            poster_url: movie.poster_url(),
            is_favorite,
            runtime_minutes,
        }
    }

    pub fn runtime_text(&self) -> Option<String> {
        self.runtime_minutes.map(format_runtime)
    }

    /// `2019 • 1h 52m`, with missing parts left out.
    pub fn subtitle(&self) -> String {
        let parts: Vec<String> = self
            .year
            .map(|y| y.to_string())
            .into_iter()
            .chain(self.runtime_text())
            .collect();
        parts.join(" • ")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowAction {
    pub label: &'static str,
    pub is_favorite: bool,
}

impl RowAction {
    pub fn for_membership(is_favorite: bool) -> Self {
        let label = if is_favorite { "Unfavorite" } else { "Favorite" };
        Self { label, is_favorite }
    }
}
