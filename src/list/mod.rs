//! The movie list: popular feed, search and favorites folded into one visible sequence.

use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

mod pager;
mod row;
mod runtime;
mod search;

pub use pager::FeedPager;
pub use row::{MovieRow, RowAction};
pub use runtime::RuntimeCache;
pub use search::{SearchController, SearchReply};

use crate::error::CatalogError;
use crate::favorites::{FavoritesChanged, FavoritesStore, FavoritesSubscription};
use crate::models::{Movie, MovieDetail, MovieId, MoviePage};
use crate::tmdb::CatalogApi;

pub const POPULAR_ERROR: &str = "Failed to load popular movies.";
pub const SEARCH_ERROR: &str = "Failed to search movies.";

pub trait ListView: Send + Sync {
    fn reload(&self);
    fn show_error(&self, message: &str);
}

pub trait Navigator: Send + Sync {
    fn open_detail(&self, movie: Movie);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Segment {
    #[default]
    Popular,
    Favorites,
}

#[derive(Debug)]
pub enum Completion {
    Popular {
        reset: bool,
        result: Result<MoviePage, CatalogError>,
    },
    Search {
        query: String,
        result: Result<MoviePage, CatalogError>,
    },
    Runtime {
        id: MovieId,
        result: Result<MovieDetail, CatalogError>,
    },
}

pub type CompletionSender = mpsc::UnboundedSender<Completion>;

#[derive(Debug)]
pub enum ListEvent {
    Completion(Completion),
    FavoritesChanged(FavoritesChanged),
}

pub struct ListOrchestrator {
    segment: Segment,
    query: Option<String>,
    pager: FeedPager,
    search: SearchController,
    runtimes: RuntimeCache,
    favorites: Arc<FavoritesStore>,
    subscription: FavoritesSubscription,
    view: Arc<dyn ListView>,
    navigator: Arc<dyn Navigator>,
    completions: mpsc::UnboundedReceiver<Completion>,
}

impl ListOrchestrator {
    pub fn new(
        catalog: Arc<dyn CatalogApi>,
        favorites: Arc<FavoritesStore>,
        view: Arc<dyn ListView>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        let (tx, completions) = mpsc::unbounded_channel();
        let subscription = favorites.subscribe();
        Self {
            segment: Segment::Popular,
            query: None,
            pager: FeedPager::new(catalog.clone(), tx.clone()),
            search: SearchController::new(catalog.clone(), tx.clone()),
            runtimes: RuntimeCache::new(catalog, tx),
            favorites,
            subscription,
            view,
            navigator,
            completions,
        }
    }

    pub fn segment(&self) -> Segment {
        self.segment
    }

    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.pager.is_loading()
    }

    pub fn load(&mut self) -> bool {
        self.pager.refresh(true)
    }

    pub fn load_more(&mut self) -> bool {
        self.pager.refresh(false)
    }

    pub fn set_segment(&mut self, segment: Segment) {
        self.segment = segment;
        // A query typed while in Favorites has never been sent to the catalog.
        if let (Segment::Popular, Some(query)) = (segment, self.query.as_deref()) {
            if self.search.current_query() != query {
                let query = query.to_string();
                // Results for the previous query must not show under this one.
                self.search.clear();
                self.search.search(&query);
            }
        }
        self.view.reload();
    }

    pub fn set_query(&mut self, query: &str) {
        let query = query.trim();
        if query.is_empty() {
            self.query = None;
            if self.segment == Segment::Popular {
                self.search.clear();
            }
            self.view.reload();
            return;
        }
        self.query = Some(query.to_string());
        match self.segment {
            Segment::Popular => self.search.search(query),
            Segment::Favorites => self.view.reload(),
        }
    }

    pub fn cancel_search(&mut self) {
        self.query = None;
        self.search.clear();
        self.view.reload();
    }

    pub fn visible(&self) -> Vec<Movie> {
        match (self.segment, self.query.as_deref()) {
            (Segment::Popular, None) => self.pager.movies().to_vec(),
            (Segment::Popular, Some(_)) => self.search.results().to_vec(),
            (Segment::Favorites, None) => self.favorites.all(),
            (Segment::Favorites, Some(query)) => filter_by_title(self.favorites.all(), query),
        }
    }

    pub fn row_count(&self) -> usize {
        match (self.segment, self.query.as_deref()) {
            (Segment::Popular, None) => self.pager.movies().len(),
            (Segment::Popular, Some(_)) => self.search.results().len(),
            (Segment::Favorites, None) => self.favorites.all().len(),
            (Segment::Favorites, Some(_)) => self.visible().len(),
        }
    }

    fn movie_at(&self, index: usize) -> Option<Movie> {
        match (self.segment, self.query.as_deref()) {
            (Segment::Popular, None) => self.pager.movies().get(index).cloned(),
            (Segment::Popular, Some(_)) => self.search.results().get(index).cloned(),
            (Segment::Favorites, _) => self.visible().into_iter().nth(index),
        }
    }

    /// Projects one row. Rendering a row is what triggers its runtime fetch.
    pub fn row_at(&mut self, index: usize) -> Option<MovieRow> {
        let movie = self.movie_at(index)?;
        let is_favorite = self.favorites.contains(movie.id);
        let runtime = self.runtimes.get(movie.id);
        self.runtimes.ensure_loaded(&movie);
        Some(MovieRow::project(&movie, is_favorite, runtime))
    }

    pub fn row_action(&self, index: usize) -> Option<RowAction> {
        let movie = self.movie_at(index)?;
        Some(RowAction::for_membership(self.favorites.contains(movie.id)))
    }

    pub fn select_row(&self, index: usize) -> bool {
        match self.movie_at(index) {
            Some(movie) => {
                info!("Opening detail for '{}' ({})", movie.title, movie.id);
                self.navigator.open_detail(movie);
                true
            }
            None => false,
        }
    }

    pub fn toggle_favorite(&mut self, index: usize) -> Option<bool> {
        let movie = self.movie_at(index)?;
        let is_favorite = self.favorites.toggle(&movie);
        self.view.reload();
        Some(is_favorite)
    }

    /// Waits for the next completion or favorites change. `None` once nothing can arrive.
    pub async fn next_event(&mut self) -> Option<ListEvent> {
        tokio::select! {
            Some(done) = self.completions.recv() => Some(ListEvent::Completion(done)),
            Some(change) = self.subscription.changed() => Some(ListEvent::FavoritesChanged(change)),
            else => None,
        }
    }

    pub fn handle(&mut self, event: ListEvent) {
        match event {
            ListEvent::Completion(done) => self.apply(done),
            ListEvent::FavoritesChanged(change) => {
                debug!("Favorites changed ({:?}), reloading list", change);
                self.view.reload();
            }
        }
    }

    pub async fn process_next(&mut self) -> bool {
        match self.next_event().await {
            Some(event) => {
                self.handle(event);
                true
            }
            None => false,
        }
    }

    fn apply(&mut self, done: Completion) {
        match done {
            Completion::Popular { reset, result } => match self.pager.apply(reset, result) {
                Ok(()) => self.view.reload(),
                Err(e) => {
                    warn!("Popular fetch failed: {}", e);
                    self.view.show_error(POPULAR_ERROR);
                }
            },
            Completion::Search { query, result } => match self.search.apply(&query, result) {
                SearchReply::Applied => self.view.reload(),
                SearchReply::Stale => {}
                SearchReply::Failed(e) => {
                    warn!("Search for '{}' failed: {}", query, e);
                    self.view.show_error(SEARCH_ERROR);
                }
            },
            Completion::Runtime { id, result } => {
                if self.runtimes.apply(id, result) {
                    self.view.reload();
                }
            }
        }
    }
}

fn filter_by_title(movies: Vec<Movie>, query: &str) -> Vec<Movie> {
    let needle = query.to_lowercase();
    movies
        .into_iter()
        .filter(|m| m.title.to_lowercase().contains(&needle))
        .collect()
}
