use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

use super::{Completion, CompletionSender};
use crate::error::CatalogError;
use crate::models::{dedupe_by_id, Movie, MoviePage};
use crate::tmdb::CatalogApi;

pub struct FeedPager {
    catalog: Arc<dyn CatalogApi>,
    tx: CompletionSender,
    movies: Vec<Movie>,
    in_flight: bool,
    last_page: u32,
    total_pages: Option<u32>,
}

impl FeedPager {
    pub fn new(catalog: Arc<dyn CatalogApi>, tx: CompletionSender) -> Self {
        Self {
            catalog,
            tx,
            movies: Vec::new(),
            in_flight: false,
            last_page: 0,
            total_pages: None,
        }
    }

    pub fn movies(&self) -> &[Movie] {
        &self.movies
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight
    }

    pub fn has_more(&self) -> bool {
        self.total_pages.map_or(true, |total| self.last_page < total)
    }

    /// Starts a fetch of the first page (`reset`) or the next one. Returns whether a
    /// request was issued.
    pub fn refresh(&mut self, reset: bool) -> bool {
        if self.in_flight {
            debug!("Popular fetch already in flight, ignoring refresh");
            return false;
        }
        let page = if reset {
            1
        } else if self.has_more() {
            self.last_page + 1
        } else {
            debug!("No popular pages left after {}", self.last_page);
            return false;
        };
        self.in_flight = true;
        let catalog = self.catalog.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = catalog.fetch_popular(page).await;
            let _ = tx.send(Completion::Popular { reset, result });
        });
        true
    }

    /// Applies a finished fetch. On error the accumulated list is left as it was.
    pub fn apply(
        &mut self,
        reset: bool,
        result: Result<MoviePage, CatalogError>,
    ) -> Result<(), CatalogError> {
        self.in_flight = false;
        let page = result?;
        let incoming = dedupe_by_id(page.results);
        if reset {
            self.movies = incoming;
        } else {
            let existing: HashSet<_> = self.movies.iter().map(|m| m.id).collect();
            self.movies
                .extend(incoming.into_iter().filter(|m| !existing.contains(&m.id)));
        }
        self.last_page = page.page;
        self.total_pages = page.total_pages;
        debug!(
            "Popular page {} applied (reset={}), {} movies",
            page.page,
            reset,
            self.movies.len()
        );
        Ok(())
    }
}
