use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::debug;

use super::{Completion, CompletionSender};
use crate::error::CatalogError;
use crate::models::{Movie, MovieDetail, MovieId};
use crate::tmdb::CatalogApi;

/// Lazily filled id -> runtime (minutes) map. Entries are never invalidated.
pub struct RuntimeCache {
    catalog: Arc<dyn CatalogApi>,
    tx: CompletionSender,
    runtimes: HashMap<MovieId, u32>,
    in_flight: HashSet<MovieId>,
    // Details that came back without a usable runtime; not asked for again.
    unavailable: HashSet<MovieId>,
}

impl RuntimeCache {
    pub fn new(catalog: Arc<dyn CatalogApi>, tx: CompletionSender) -> Self {
        Self {
            catalog,
            tx,
            runtimes: HashMap::new(),
            in_flight: HashSet::new(),
            unavailable: HashSet::new(),
        }
    }

    pub fn get(&self, id: MovieId) -> Option<u32> {
        self.runtimes.get(&id).copied()
    }

    /// Starts a detail fetch unless the runtime is known, pending, or known missing.
    pub fn ensure_loaded(&mut self, movie: &Movie) -> bool {
        let id = movie.id;
        if self.runtimes.contains_key(&id)
            || self.in_flight.contains(&id)
            || self.unavailable.contains(&id)
        {
            return false;
        }
        self.in_flight.insert(id);
        let catalog = self.catalog.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = catalog.fetch_detail(id).await;
            let _ = tx.send(Completion::Runtime { id, result });
        });
        true
    }

    pub fn apply(&mut self, id: MovieId, result: Result<MovieDetail, CatalogError>) -> bool {
        self.in_flight.remove(&id);
        match result {
            Ok(detail) => match detail.runtime.filter(|m| *m > 0) {
                Some(minutes) => {
                    self.runtimes.insert(id, minutes);
                    true
                }
                None => {
                    self.unavailable.insert(id);
                    false
                }
            },
            Err(e) => {
                // Enrichment only; a later render may try again.
                debug!("Runtime fetch for {} failed: {}", id, e);
                false
            }
        }
    }
}
