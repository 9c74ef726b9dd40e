//! Single-movie screen: full detail, trailer pick and the favorite toggle.

use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::debug;

use crate::error::CatalogError;
use crate::favorites::{FavoritesChanged, FavoritesStore, FavoritesSubscription};
use crate::models::{format_runtime, Movie, MovieDetail, Video};
use crate::tmdb::CatalogApi;

const CAST_LIMIT: usize = 5;

pub trait DetailView: Send + Sync {
    fn show_basic_info(&self, movie: &Movie);
    fn show_details(&self, summary: &DetailSummary);
    fn set_trailer(&self, url: Option<&str>);
    fn update_favorite(&self, is_favorite: bool);
    fn show_no_trailer(&self);
}

#[derive(Debug, Clone, PartialEq)]
pub struct DetailSummary {
    pub subtitle: String,
    pub rating: String,
    pub genres: String,
    pub cast: String,
    pub overview: String,
}

impl DetailSummary {
    pub fn from_detail(detail: &MovieDetail) -> Self {
        let subtitle = detail
            .movie
            .release_year()
            .map(|y| y.to_string())
            .into_iter()
            .chain(detail.runtime.filter(|m| *m > 0).map(format_runtime))
            .collect::<Vec<_>>()
            .join(" • ");

        let genres = if detail.genres.is_empty() {
            "Genres: —".to_string()
        } else {
            let names: Vec<&str> = detail.genres.iter().map(|g| g.name.as_str()).collect();
            format!("Genres: {}", names.join(", "))
        };

        let cast = if detail.cast().is_empty() {
            "Cast: —".to_string()
        } else {
            let names: Vec<String> = detail
                .cast()
                .iter()
                .take(CAST_LIMIT)
                .map(|c| match c.character.as_deref().filter(|ch| !ch.is_empty()) {
                    Some(character) => format!("{} ({})", c.name, character),
                    None => c.name.clone(),
                })
                .collect();
            format!("Cast: {}", names.join(", "))
        };

        let overview = if detail.movie.overview.trim().is_empty() {
            "No overview available.".to_string()
        } else {
            detail.movie.overview.clone()
        };

        Self {
            subtitle,
            rating: format!("★ {}", detail.movie.formatted_rating()),
            genres,
            cast,
            overview,
        }
    }
}

/// YouTube trailer, else YouTube teaser, else any YouTube video.
pub fn select_trailer(videos: &[Video]) -> Option<&Video> {
    videos
        .iter()
        .find(|v| is_youtube_of(v, "trailer"))
        .or_else(|| videos.iter().find(|v| is_youtube_of(v, "teaser")))
        .or_else(|| videos.iter().find(|v| is_youtube(v)))
}

fn is_youtube(video: &Video) -> bool {
    video.site.eq_ignore_ascii_case("youtube")
}

fn is_youtube_of(video: &Video, kind: &str) -> bool {
    is_youtube(video) && video.video_type.eq_ignore_ascii_case(kind)
}

pub fn youtube_url(video: &Video) -> String {
    format!("https://www.youtube.com/watch?v={}", video.key)
}

#[derive(Debug)]
pub enum DetailEvent {
    Loaded(Result<MovieDetail, CatalogError>),
    FavoritesChanged(FavoritesChanged),
}

pub struct DetailController {
    movie: Movie,
    catalog: Arc<dyn CatalogApi>,
    favorites: Arc<FavoritesStore>,
    subscription: FavoritesSubscription,
    view: Arc<dyn DetailView>,
    detail: Option<MovieDetail>,
    trailer_url: Option<String>,
    tx: mpsc::UnboundedSender<Result<MovieDetail, CatalogError>>,
    rx: mpsc::UnboundedReceiver<Result<MovieDetail, CatalogError>>,
}

impl DetailController {
    pub fn new(
        movie: Movie,
        catalog: Arc<dyn CatalogApi>,
        favorites: Arc<FavoritesStore>,
        view: Arc<dyn DetailView>,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let subscription = favorites.subscribe();
        Self {
            movie,
            catalog,
            favorites,
            subscription,
            view,
            detail: None,
            trailer_url: None,
            tx,
            rx,
        }
    }

    pub fn movie(&self) -> &Movie {
        &self.movie
    }

    pub fn detail(&self) -> Option<&MovieDetail> {
        self.detail.as_ref()
    }

    pub fn trailer_url(&self) -> Option<&str> {
        self.trailer_url.as_deref()
    }

    pub fn is_favorite(&self) -> bool {
        self.favorites.contains(self.movie.id)
    }

    pub fn start(&self) {
        self.view.show_basic_info(&self.movie);
        self.view.update_favorite(self.is_favorite());
        let catalog = self.catalog.clone();
        let tx = self.tx.clone();
        let id = self.movie.id;
        tokio::spawn(async move {
            let _ = tx.send(catalog.fetch_detail(id).await);
        });
    }

    pub fn toggle_favorite(&self) -> bool {
        let is_favorite = self.favorites.toggle(&self.movie);
        self.view.update_favorite(is_favorite);
        is_favorite
    }

    pub fn open_trailer(&self) -> Option<&str> {
        if self.trailer_url.is_none() {
            self.view.show_no_trailer();
        }
        self.trailer_url.as_deref()
    }

    pub async fn next_event(&mut self) -> Option<DetailEvent> {
        tokio::select! {
            Some(result) = self.rx.recv() => Some(DetailEvent::Loaded(result)),
            Some(change) = self.subscription.changed() => Some(DetailEvent::FavoritesChanged(change)),
            else => None,
        }
    }

    pub fn handle(&mut self, event: DetailEvent) {
        match event {
            DetailEvent::Loaded(Ok(detail)) => {
                self.trailer_url = select_trailer(detail.videos()).map(youtube_url);
                self.view.set_trailer(self.trailer_url.as_deref());
                self.view.show_details(&DetailSummary::from_detail(&detail));
                self.detail = Some(detail);
            }
            DetailEvent::Loaded(Err(e)) => {
                // Basic info stays on screen.
                debug!("Detail fetch for {} failed: {}", self.movie.id, e);
                self.trailer_url = None;
                self.view.set_trailer(None);
            }
            DetailEvent::FavoritesChanged(change) if change.id == self.movie.id => {
                self.view.update_favorite(change.is_favorite);
            }
            DetailEvent::FavoritesChanged(_) => {}
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
}
