use std::sync::Arc;
use tracing::debug;

use super::{Completion, CompletionSender};
use crate::error::CatalogError;
use crate::models::{dedupe_by_id, Movie, MoviePage};
use crate::tmdb::CatalogApi;

#[derive(Debug, PartialEq)]
pub enum SearchReply {
    Applied,
    /// The reply was tagged with a query that is no longer current.
    Stale,
    Failed(CatalogError),
}

pub struct SearchController {
    catalog: Arc<dyn CatalogApi>,
    tx: CompletionSender,
    current_query: String,
    results: Vec<Movie>,
}

impl SearchController {
    pub fn new(catalog: Arc<dyn CatalogApi>, tx: CompletionSender) -> Self {
        Self {
            catalog,
            tx,
            current_query: String::new(),
            results: Vec::new(),
        }
    }

    pub fn current_query(&self) -> &str {
        &self.current_query
    }

    pub fn results(&self) -> &[Movie] {
        &self.results
    }

    pub fn search(&mut self, query: &str) {
        self.current_query = query.to_string();
        let catalog = self.catalog.clone();
        let tx = self.tx.clone();
        let query = query.to_string();
        tokio::spawn(async move {
            let result = catalog.search(&query).await;
            let _ = tx.send(Completion::Search { query, result });
        });
    }

    /// Forgets the current query and its results; replies still in flight become stale.
    pub fn clear(&mut self) {
        self.current_query.clear();
        self.results.clear();
    }

    pub fn apply(&mut self, query: &str, result: Result<MoviePage, CatalogError>) -> SearchReply {
        if query != self.current_query {
            debug!(
                "Dropping stale search reply for '{}' (current '{}')",
                query, self.current_query
            );
            return SearchReply::Stale;
        }
        match result {
            Ok(page) => {
                self.results = dedupe_by_id(page.results);
                SearchReply::Applied
            }
            Err(e) => SearchReply::Failed(e),
        }
    }
}
