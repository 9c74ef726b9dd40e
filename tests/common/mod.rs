#![allow(dead_code)]

use async_trait::async_trait;
use cinelist::detail::{DetailSummary, DetailView};
use cinelist::error::CatalogError;
use cinelist::favorites::FavoritesStorage;
use cinelist::list::{ListView, Navigator};
use cinelist::models::{Movie, MovieDetail, MovieId, MoviePage, Video, Videos};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;

pub fn movie(id: MovieId, title: &str) -> Movie {
    Movie {
        id,
        title: title.to_string(),
        overview: format!("{title} overview"),
        poster_path: Some(format!("/{id}.jpg")),
        backdrop_path: None,
        vote_average: 7.0,
        release_date: Some("2020-01-01".to_string()),
    }
}

pub fn movies(list: &[MovieId]) -> Vec<Movie> {
    list.iter().map(|id| movie(*id, &format!("Movie {id}"))).collect()
}

pub fn ids(list: &[Movie]) -> Vec<MovieId> {
    list.iter().map(|m| m.id).collect()
}

pub fn page(n: u32, total: u32, list: &[MovieId]) -> MoviePage {
    MoviePage {
        page: n,
        total_pages: Some(total),
        results: movies(list),
    }
}

pub fn detail(id: MovieId, runtime: Option<u32>, videos: Vec<Video>) -> MovieDetail {
    MovieDetail {
        movie: movie(id, &format!("Movie {id}")),
        runtime,
        genres: Vec::new(),
        credits: None,
        videos: Some(Videos { results: videos }),
    }
}

/// Scripted catalog. Searches whose query has a gate wait until it is opened.
#[derive(Default)]
pub struct FakeCatalog {
    pub popular: Mutex<HashMap<u32, Result<MoviePage, CatalogError>>>,
    pub searches: Mutex<HashMap<String, Result<MoviePage, CatalogError>>>,
    pub details: Mutex<HashMap<MovieId, Result<MovieDetail, CatalogError>>>,
    pub gates: Mutex<HashMap<String, Arc<Notify>>>,
    pub calls: Mutex<Vec<String>>,
}

impl FakeCatalog {
    pub fn with_popular(self, n: u32, result: Result<MoviePage, CatalogError>) -> Self {
        self.popular.lock().unwrap().insert(n, result);
        self
    }

    pub fn with_search(self, query: &str, result: Result<MoviePage, CatalogError>) -> Self {
        self.searches.lock().unwrap().insert(query.to_string(), result);
        self
    }

    pub fn with_detail(self, id: MovieId, result: Result<MovieDetail, CatalogError>) -> Self {
        self.details.lock().unwrap().insert(id, result);
        self
    }

    pub fn gate(&self, query: &str) -> Arc<Notify> {
        self.gates
            .lock()
            .unwrap()
            .entry(query.to_string())
            .or_insert_with(|| Arc::new(Notify::new()))
            .clone()
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_starting_with(&self, prefix: &str) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| c.starts_with(prefix))
            .collect()
    }
}

#[async_trait]
impl cinelist::tmdb::CatalogApi for FakeCatalog {
    async fn fetch_popular(&self, page: u32) -> Result<MoviePage, CatalogError> {
        self.calls.lock().unwrap().push(format!("popular:{page}"));
        self.popular
            .lock()
            .unwrap()
            .get(&page)
            .cloned()
            .unwrap_or(Err(CatalogError::Unknown))
    }

    async fn search(&self, query: &str) -> Result<MoviePage, CatalogError> {
        self.calls.lock().unwrap().push(format!("search:{query}"));
        let gate = self.gates.lock().unwrap().get(query).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        self.searches
            .lock()
            .unwrap()
            .get(query)
            .cloned()
            .unwrap_or_else(|| Ok(MoviePage::single(Vec::new())))
    }

    async fn fetch_detail(&self, id: MovieId) -> Result<MovieDetail, CatalogError> {
        self.calls.lock().unwrap().push(format!("detail:{id}"));
        self.details
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .unwrap_or(Err(CatalogError::Network("no route".to_string())))
    }
}

/// In-memory storage; `writes` is shared so tests can inspect it after handing the
/// storage to a store.
#[derive(Default)]
pub struct MemoryStorage {
    pub seed: Vec<Movie>,
    pub writes: Arc<Mutex<Vec<Vec<MovieId>>>>,
}

impl MemoryStorage {
    pub fn seeded(seed: Vec<Movie>) -> Self {
        Self {
            seed,
            writes: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl FavoritesStorage for MemoryStorage {
    fn load(&self) -> Vec<Movie> {
        self.seed.clone()
    }

    fn store(&self, favorites: &[Movie]) -> anyhow::Result<()> {
        self.writes.lock().unwrap().push(ids(favorites));
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingView {
    pub reloads: AtomicUsize,
    pub errors: Mutex<Vec<String>>,
}

impl RecordingView {
    pub fn reload_count(&self) -> usize {
        self.reloads.load(Ordering::SeqCst)
    }

    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().unwrap().clone()
    }
}

impl ListView for RecordingView {
    fn reload(&self) {
        self.reloads.fetch_add(1, Ordering::SeqCst);
    }

    fn show_error(&self, message: &str) {
        self.errors.lock().unwrap().push(message.to_string());
    }
}

#[derive(Default)]
pub struct RecordingNavigator {
    pub opened: Mutex<Vec<MovieId>>,
}

impl Navigator for RecordingNavigator {
    fn open_detail(&self, movie: Movie) {
        self.opened.lock().unwrap().push(movie.id);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DetailCall {
    Basic(MovieId),
    Details(DetailSummary),
    Trailer(Option<String>),
    Favorite(bool),
    NoTrailer,
}

#[derive(Default)]
pub struct RecordingDetailView {
    pub calls: Mutex<Vec<DetailCall>>,
}

impl RecordingDetailView {
    pub fn calls(&self) -> Vec<DetailCall> {
        self.calls.lock().unwrap().clone()
    }
}

impl DetailView for RecordingDetailView {
    fn show_basic_info(&self, movie: &Movie) {
        self.calls.lock().unwrap().push(DetailCall::Basic(movie.id));
    }
    fn show_details(&self, summary: &DetailSummary) {
        self.calls
            .lock()
            .unwrap()
            .push(DetailCall::Details(summary.clone()));
    }
    fn set_trailer(&self, url: Option<&str>) {
        self.calls
            .lock()
            .unwrap()
            .push(DetailCall::Trailer(url.map(str::to_string)));
    }
    fn update_favorite(&self, is_favorite: bool) {
        self.calls
            .lock()
            .unwrap()
            .push(DetailCall::Favorite(is_favorite));
    }
    fn show_no_trailer(&self) {
        self.calls.lock().unwrap().push(DetailCall::NoTrailer);
    }
}

pub async fn within<F: std::future::Future>(fut: F) -> F::Output {
    tokio::time::timeout(Duration::from_secs(2), fut)
        .await
        .expect("timed out waiting for an event")
}
