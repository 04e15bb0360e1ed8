//! Home-screen search controller.
//!
//! The controller owns a [`HomeState`] and is the only thing that mutates it.
//! The presentation layer forwards user events (`on_query_changed`,
//! `on_submit`, `select_history`, `on_scroll_near_end`, `clear`) and renders
//! whatever arrives on [`PaginationController::subscribe`].
//!
//! Fetches run on the blocking pool. State is locked only to plan a fetch and
//! to apply its response, never across an await. Every reset search and
//! every `clear` bumps `SearchState::generation`; a response whose ticket
//! carries an older generation is dropped instead of being merged into the
//! newer query's results.

use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::watch;

use crate::clients::ImageSearch;
use crate::history::HistoryStore;
use crate::models::{
    CoreError, FETCH_FAILED_MESSAGE, HistoryList, HomeState, NO_RESULTS_MESSAGE, SearchPage,
};

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum FetchOutcome {
    /// Nothing was fetched: blank query, no more pages, or a load in flight.
    Skipped,
    Loaded { appended: usize },
    NoResults,
    Failed(CoreError),
    /// The response arrived after a newer query or a clear and was dropped.
    Stale,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Merge {
    Replace,
    Append,
}

#[derive(Clone, Debug)]
struct FetchTicket {
    generation: u64,
    query: String,
    page: u32,
    merge: Merge,
}

pub struct PaginationController {
    search: Arc<dyn ImageSearch>,
    history: Arc<HistoryStore>,
    state: Mutex<HomeState>,
    publisher: watch::Sender<HomeState>,
}

impl PaginationController {
    pub fn new(search: Arc<dyn ImageSearch>, history: Arc<HistoryStore>) -> Self {
        let (publisher, _) = watch::channel(HomeState::default());
        Self {
            search,
            history,
            state: Mutex::new(HomeState::default()),
            publisher,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<HomeState> {
        self.publisher.subscribe()
    }

    pub fn state(&self) -> HomeState {
        self.lock_state().clone()
    }

    /// Loads persisted history so suggestions are available before the
    /// first search.
    pub async fn initialize(&self) -> HistoryList {
        let history = self.history.load().await;
        let loaded = history.clone();
        self.update(move |state| {
            state.history = loaded;
            Some(())
        });
        history
    }

    pub fn on_query_changed(&self, text: &str) {
        self.update(|state| {
            state.input = text.to_owned();
            state.show_history = !text.is_empty();
            Some(())
        });
    }

    pub async fn on_submit(&self) -> FetchOutcome {
        let input = self.lock_state().input.clone();
        self.search(&input, true).await
    }

    pub async fn select_history(&self, query: &str) -> FetchOutcome {
        self.update(|state| {
            state.input = query.to_owned();
            state.show_history = false;
            Some(())
        });
        self.search(query, true).await
    }

    pub async fn on_scroll_near_end(&self) -> FetchOutcome {
        self.load_more().await
    }

    /// Fetches page 1 of `query` when `reset` is set. Otherwise retries the
    /// page the active query is missing: page 1 when nothing has loaded, the
    /// page after the last loaded one when results exist. A `query` that
    /// differs from the active one always starts over.
    pub async fn search(&self, query: &str, reset: bool) -> FetchOutcome {
        let query = query.trim();
        if query.is_empty() {
            tracing::debug!("ignoring search with empty query");
            return FetchOutcome::Skipped;
        }

        let ticket = self.update(|state| {
            let search = &mut state.search;
            if reset || search.query != query {
                search.generation = search.generation.wrapping_add(1);
                search.query = query.to_owned();
                search.results.clear();
                search.page = 1;
                search.has_more = true;
                search.is_loading_initial = true;
                search.is_loading_more = false;
                return Some(FetchTicket {
                    generation: search.generation,
                    query: search.query.clone(),
                    page: 1,
                    merge: Merge::Replace,
                });
            }

            if search.is_loading() {
                return None;
            }
            // `page` is the last page that loaded. With nothing loaded yet the
            // first page is retried; otherwise the one after it.
            let page = if search.results.is_empty() {
                search.is_loading_initial = true;
                search.page
            } else {
                if !search.has_more {
                    return None;
                }
                search.is_loading_more = true;
                search.page.saturating_add(1)
            };
            Some(FetchTicket {
                generation: search.generation,
                query: search.query.clone(),
                page,
                merge: Merge::Append,
            })
        });

        match ticket {
            Some(ticket) => self.run(ticket).await,
            None => FetchOutcome::Skipped,
        }
    }

    /// Fetches the page after the last loaded one. Does nothing while any
    /// fetch is in flight or once the query is exhausted.
    pub async fn load_more(&self) -> FetchOutcome {
        let ticket = self.update(|state| {
            let search = &mut state.search;
            if !search.has_more || search.is_loading() || search.query.is_empty() {
                return None;
            }
            search.is_loading_more = true;
            Some(FetchTicket {
                generation: search.generation,
                query: search.query.clone(),
                page: search.page.saturating_add(1),
                merge: Merge::Append,
            })
        });

        match ticket {
            Some(ticket) => self.run(ticket).await,
            None => FetchOutcome::Skipped,
        }
    }

    /// Drops the active query and its results. History is left alone.
    pub fn clear(&self) {
        self.update(|state| {
            let search = &mut state.search;
            search.generation = search.generation.wrapping_add(1);
            search.query.clear();
            search.results.clear();
            search.page = 1;
            search.has_more = true;
            search.is_loading_initial = false;
            search.is_loading_more = false;
            search.error_message = None;
            state.input.clear();
            state.show_history = false;
            Some(())
        });
    }

    async fn run(&self, ticket: FetchTicket) -> FetchOutcome {
        tracing::debug!(
            query = %ticket.query,
            page = ticket.page,
            generation = ticket.generation,
            "fetching search page"
        );

        let search = self.search.clone();
        let query = ticket.query.clone();
        let page = ticket.page;
        let fetched = tokio::task::spawn_blocking(move || search.fetch_page(&query, page))
            .await
            .map_err(|join_error| {
                CoreError::internal(format!("search fetch join failure: {join_error}"))
            })
            .and_then(|result| result);

        let outcome = self.apply(&ticket, fetched);
        match &outcome {
            FetchOutcome::Loaded { appended } => {
                tracing::debug!(
                    query = %ticket.query,
                    page = ticket.page,
                    appended,
                    "search page loaded"
                );
                if *appended > 0 {
                    self.history
                        .record_with(&ticket.query, |history| {
                            self.update(|state| {
                                state.history = history.clone();
                                Some(())
                            });
                        })
                        .await;
                }
            }
            FetchOutcome::NoResults => {
                tracing::info!(query = %ticket.query, page = ticket.page, "search returned no images");
            }
            FetchOutcome::Failed(error) => {
                tracing::error!(
                    query = %ticket.query,
                    page = ticket.page,
                    kind = ?error.kind,
                    message = %error.message,
                    "search fetch failed"
                );
            }
            FetchOutcome::Stale => {
                tracing::debug!(
                    query = %ticket.query,
                    generation = ticket.generation,
                    "discarding response for superseded search"
                );
            }
            FetchOutcome::Skipped => {}
        }

        outcome
    }

    fn apply(&self, ticket: &FetchTicket, fetched: Result<SearchPage, CoreError>) -> FetchOutcome {
        let applied = self.update(|state| {
            let search = &mut state.search;
            if search.generation != ticket.generation {
                return None;
            }

            search.is_loading_initial = false;
            search.is_loading_more = false;
            state.show_history = false;

            let outcome = match fetched {
                Ok(page) if !page.is_empty() => {
                    let has_more = page.has_more_after(ticket.page);
                    let appended = page.results.len();
                    match ticket.merge {
                        Merge::Replace => search.results = page.results,
                        Merge::Append => search.results.extend(page.results),
                    }
                    search.page = ticket.page;
                    search.has_more = has_more;
                    search.error_message = None;
                    FetchOutcome::Loaded { appended }
                }
                Ok(page) if page.only_skipped() && page.has_more_after(ticket.page) => {
                    // Nothing renderable here, but later pages may have thumbnails.
                    search.page = ticket.page;
                    search.has_more = true;
                    search.error_message = None;
                    FetchOutcome::Loaded { appended: 0 }
                }
                Ok(_) => {
                    search.has_more = false;
                    search.error_message = Some(NO_RESULTS_MESSAGE.to_string());
                    FetchOutcome::NoResults
                }
                Err(error) => {
                    search.error_message = Some(FETCH_FAILED_MESSAGE.to_string());
                    FetchOutcome::Failed(error)
                }
            };
            Some(outcome)
        });

        applied.unwrap_or(FetchOutcome::Stale)
    }

    /// Runs `transition` under the state lock and publishes the new state when
    /// it returns `Some`. `None` means the state was left untouched.
    fn update<R>(&self, transition: impl FnOnce(&mut HomeState) -> Option<R>) -> Option<R> {
        let mut state = self.lock_state();
        let result = transition(&mut state)?;
        self.publisher.send_replace(state.clone());
        Some(result)
    }

    fn lock_state(&self) -> MutexGuard<'_, HomeState> {
        // HomeState is plain data; a panic mid-transition cannot leave it
        // unusable, so a poisoned lock is recovered.
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
