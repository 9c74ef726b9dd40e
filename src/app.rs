use crate::config::Config;
use crate::detail::{DetailController, DetailEvent, DetailSummary, DetailView};
use crate::favorites::{FavoritesStore, JsonFileStorage};
use crate::list::{ListEvent, ListOrchestrator, ListView, MovieRow, Navigator, Segment};
use crate::models::Movie;
use crate::tmdb::{CatalogApi, TmdbClient};
use anyhow::Result;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

const HELP: &str = "commands: popular | favorites | search <text> | cancel | more | refresh | \
fav <row> | open <row> | trailer | back | help | quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Popular,
    Favorites,
    Search(String),
    Cancel,
    More,
    Refresh,
    Favorite(usize),
    Open(usize),
    Trailer,
    Back,
    Help,
    Quit,
}

/// Parses one input line. Row numbers are 1-based on screen.
pub fn parse_command(line: &str) -> Option<Command> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((w, r)) => (w, r.trim()),
        None => (line, ""),
    };
    let row = || {
        rest.parse::<usize>()
            .ok()
            .filter(|n| *n > 0)
            .map(|n| n - 1)
    };
    match word.to_lowercase().as_str() {
        "popular" | "p" => Some(Command::Popular),
        "favorites" | "f" => Some(Command::Favorites),
        "search" | "s" | "/" => Some(Command::Search(rest.to_string())),
        "cancel" | "c" => Some(Command::Cancel),
        "more" | "m" => Some(Command::More),
        "refresh" | "r" => Some(Command::Refresh),
        "fav" => row().map(Command::Favorite),
        "open" | "o" => row().map(Command::Open),
        "trailer" | "t" => Some(Command::Trailer),
        "back" | "b" => Some(Command::Back),
        "help" | "h" | "?" => Some(Command::Help),
        "quit" | "q" | "exit" => Some(Command::Quit),
        _ => None,
    }
}

#[derive(Default)]
pub struct TerminalListView {
    dirty: AtomicBool,
}

impl TerminalListView {
    fn take_dirty(&self) -> bool {
        self.dirty.swap(false, Ordering::AcqRel)
    }
}

impl ListView for TerminalListView {
    fn reload(&self) {
        self.dirty.store(true, Ordering::Release);
    }

    fn show_error(&self, message: &str) {
        eprintln!("! {message}");
    }
}

#[derive(Default)]
pub struct PendingNavigation {
    next: Mutex<Option<Movie>>,
}

impl PendingNavigation {
    fn take(&self) -> Option<Movie> {
        self.next
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}

impl Navigator for PendingNavigation {
    fn open_detail(&self, movie: Movie) {
        *self.next.lock().unwrap_or_else(PoisonError::into_inner) = Some(movie);
    }
}

pub struct TerminalDetailView;

impl DetailView for TerminalDetailView {
    fn show_basic_info(&self, movie: &Movie) {
        println!("\n== {} ==", movie.title);
        if let Some(year) = movie.release_year() {
            println!("{year}");
        }
    }

    fn show_details(&self, summary: &DetailSummary) {
        if !summary.subtitle.is_empty() {
            println!("{}", summary.subtitle);
        }
        println!("{}", summary.rating);
        println!("{}", summary.genres);
        println!("{}", summary.cast);
        println!("\n{}\n", summary.overview);
    }

    fn set_trailer(&self, url: Option<&str>) {
        match url {
            Some(_) => println!("[trailer available: type 'trailer']"),
            None => println!("[no trailer]"),
        }
    }

    fn update_favorite(&self, is_favorite: bool) {
        println!("{}", if is_favorite { "★ in favorites" } else { "☆ not in favorites" });
    }

    fn show_no_trailer(&self) {
        println!("No trailer available for this movie.");
    }
}

fn render_row(index: usize, row: &MovieRow) -> String {
    let star = if row.is_favorite { "★" } else { " " };
    let subtitle = row.subtitle();
    if subtitle.is_empty() {
        format!("{:>3}. {} {}  {}", index + 1, star, row.title, row.rating)
    } else {
        format!(
            "{:>3}. {} {}  {}  ({})",
            index + 1,
            star,
            row.title,
            row.rating,
            subtitle
        )
    }
}

fn render_list(list: &mut ListOrchestrator) {
    let heading = match list.segment() {
        Segment::Popular => "Popular",
        Segment::Favorites => "Favorites",
    };
    match list.query() {
        Some(q) => println!("\n-- {heading} / search \"{q}\" --"),
        None => println!("\n-- {heading} --"),
    }
    let count = list.row_count();
    if count == 0 {
        println!(
            "{}",
            if list.is_loading() { "(loading...)" } else { "(nothing to show)" }
        );
    }
    for index in 0..count {
        if let Some(row) = list.row_at(index) {
            println!("{}", render_row(index, &row));
        }
    }
}

enum Step {
    Input(Option<String>),
    List(Option<ListEvent>),
    Detail(Option<DetailEvent>),
    Shutdown,
}

pub async fn run() -> Result<()> {
    let config = Config::from_env();
    if !config.has_credential() {
        warn!("TMDB_API_KEY is not set; catalog requests will fail");
    }

    let catalog: Arc<dyn CatalogApi> = Arc::new(TmdbClient::from_config(&config)?);
    let storage = JsonFileStorage::new(config.favorites_path.clone());
    info!("Favorites file: {:?}", storage.path());
    let favorites = Arc::new(FavoritesStore::load(Box::new(storage)));
    let view = Arc::new(TerminalListView::default());
    let navigation = Arc::new(PendingNavigation::default());
    let mut list = ListOrchestrator::new(
        catalog.clone(),
        favorites.clone(),
        view.clone(),
        navigation.clone(),
    );
    let detail_view: Arc<dyn DetailView> = Arc::new(TerminalDetailView);
    let mut detail: Option<DetailController> = None;

    println!("{HELP}");
    list.load();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        if detail.is_none() && view.take_dirty() {
            render_list(&mut list);
        }

        let step = match detail.as_mut() {
            Some(screen) => tokio::select! {
                line = lines.next_line() => Step::Input(line?),
                event = screen.next_event() => Step::Detail(event),
                event = list.next_event() => Step::List(event),
                _ = tokio::signal::ctrl_c() => Step::Shutdown,
            },
            None => tokio::select! {
                line = lines.next_line() => Step::Input(line?),
                event = list.next_event() => Step::List(event),
                _ = tokio::signal::ctrl_c() => Step::Shutdown,
            },
        };

        match step {
            Step::Shutdown | Step::Input(None) => break,
            Step::List(Some(event)) => list.handle(event),
            Step::List(None) => break,
            Step::Detail(Some(event)) => {
                if let Some(screen) = detail.as_mut() {
                    screen.handle(event);
                }
            }
            Step::Detail(None) => detail = None,
            Step::Input(Some(line)) => {
                if line.trim().is_empty() {
                    continue;
                }
                let Some(command) = parse_command(&line) else {
                    println!("unknown command; {HELP}");
                    continue;
                };
                match command {
                    Command::Quit => break,
                    Command::Help => println!("{HELP}"),
                    Command::Back => {
                        detail = None;
                        view.reload();
                    }
                    Command::Trailer => match detail.as_ref().and_then(|d| d.open_trailer()) {
                        Some(url) => println!("{url}"),
                        None if detail.is_none() => println!("open a movie first"),
                        None => {}
                    },
                    Command::Favorite(_) if detail.is_some() => {
                        if let Some(screen) = detail.as_ref() {
                            screen.toggle_favorite();
                        }
                    }
                    other => {
                        detail = None;
                        apply_list_command(&mut list, other);
                        if let Some(movie) = navigation.take() {
                            let screen = DetailController::new(
                                movie,
                                catalog.clone(),
                                favorites.clone(),
                                detail_view.clone(),
                            );
                            screen.start();
                            detail = Some(screen);
                        } else {
                            view.reload();
                        }
                    }
                }
            }
        }
    }

    info!("Bye");
    Ok(())
}

fn apply_list_command(list: &mut ListOrchestrator, command: Command) {
    match command {
        Command::Popular => list.set_segment(Segment::Popular),
        Command::Favorites => list.set_segment(Segment::Favorites),
        Command::Search(q) => list.set_query(&q),
        Command::Cancel => list.cancel_search(),
        Command::More => {
            if !list.load_more() {
                println!("(no more pages right now)");
            }
        }
        Command::Refresh => {
            list.load();
        }
        Command::Favorite(row) => {
            if list.toggle_favorite(row).is_none() {
                println!("no row {}", row + 1);
            }
        }
        Command::Open(row) => {
            if !list.select_row(row) {
                println!("no row {}", row + 1);
            }
        }
        Command::Trailer | Command::Back | Command::Help | Command::Quit => {}
    }
}
