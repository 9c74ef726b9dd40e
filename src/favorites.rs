//! Persisted favorites with change broadcast.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::models::{Movie, MovieId};

const EVENT_CAPACITY: usize = 64;

pub trait FavoritesStorage: Send + Sync {
    /// Returns an empty list when nothing is stored or the stored data is unreadable.
    fn load(&self) -> Vec<Movie>;
    fn store(&self, favorites: &[Movie]) -> Result<()>;
}

#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FavoritesStorage for JsonFileStorage {
    fn load(&self) -> Vec<Movie> {
        let bytes = match fs::read(&self.path) {
            Ok(b) => b,
            Err(e) => {
                debug!("No favorites at {:?} ({})", self.path, e);
                return Vec::new();
            }
        };
        match serde_json::from_slice(&bytes) {
            Ok(list) => list,
            Err(e) => {
                warn!("Ignoring unreadable favorites file {:?}: {}", self.path, e);
                Vec::new()
            }
        }
    }

    fn store(&self, favorites: &[Movie]) -> Result<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create favorites directory {dir:?}"))?;
        }
        let data = serde_json::to_vec_pretty(favorites).context("Failed to encode favorites")?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, data).with_context(|| format!("Failed to write {tmp:?}"))?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("Failed to replace {:?}", self.path))?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FavoritesChanged {
    pub id: MovieId,
    pub is_favorite: bool,
}

/// In-memory favorites list, authoritative for the life of the process.
pub struct FavoritesStore {
    favorites: Mutex<Vec<Movie>>,
    storage: Box<dyn FavoritesStorage>,
    events: broadcast::Sender<FavoritesChanged>,
}

impl FavoritesStore {
    pub fn load(storage: Box<dyn FavoritesStorage>) -> Self {
        let favorites = storage.load();
        info!("Loaded {} favorites", favorites.len());
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            favorites: Mutex::new(favorites),
            storage,
            events,
        }
    }

    fn list(&self) -> MutexGuard<'_, Vec<Movie>> {
        self.favorites.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn all(&self) -> Vec<Movie> {
        self.list().clone()
    }

    pub fn contains(&self, id: MovieId) -> bool {
        self.list().iter().any(|m| m.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.list().is_empty()
    }

    pub fn toggle(&self, movie: &Movie) -> bool {
        let is_favorite = {
            let mut list = self.list();
            let now_favorite = match list.iter().position(|m| m.id == movie.id) {
                Some(index) => {
                    list.remove(index);
                    false
                }
                None => {
                    list.push(movie.clone());
                    true
                }
            };
            // Write failures leave the in-memory list as the source of truth.
            if let Err(e) = self.storage.store(&list) {
                warn!("Failed to persist favorites: {:#}", e);
            }
            now_favorite
        };
        debug!("Favorite {} -> {}", movie.id, is_favorite);
        // No receivers is not an error.
        let _ = self.events.send(FavoritesChanged {
            id: movie.id,
            is_favorite,
        });
        is_favorite
    }

    pub fn subscribe(&self) -> FavoritesSubscription {
        FavoritesSubscription {
            rx: self.events.subscribe(),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.events.receiver_count()
    }
}

/// A live subscription to favorites changes; dropping it unsubscribes.
pub struct FavoritesSubscription {
    rx: broadcast::Receiver<FavoritesChanged>,
}

impl FavoritesSubscription {
    /// Waits for the next change. `None` means the store is gone.
    pub async fn changed(&mut self) -> Option<FavoritesChanged> {
        loop {
            match self.rx.recv().await {
                Ok(ev) => return Some(ev),
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    debug!("Favorites subscriber lagged by {} events", n);
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    pub fn try_changed(&mut self) -> Option<FavoritesChanged> {
        loop {
            match self.rx.try_recv() {
                Ok(ev) => return Some(ev),
                Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
                Err(_) => return None,
            }
        }
    }
}
