use serde::Serialize;

use crate::models::{HistoryList, ImageRecord};

pub const NO_RESULTS_MESSAGE: &str = "No images found.";
pub const FETCH_FAILED_MESSAGE: &str = "Error fetching images";

/// Pagination state for the active query.
///
/// `results` is the concatenation of every page fetched for `query`, in fetch
/// order. `page` is the last page that finished loading. `generation` changes
/// whenever a new query supersedes the old one; responses carrying an older
/// generation are dropped.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct SearchState {
    pub query: String,
    pub page: u32,
    pub results: Vec<ImageRecord>,
    pub has_more: bool,
    pub is_loading_initial: bool,
    pub is_loading_more: bool,
    pub error_message: Option<String>,
    pub generation: u64,
}

impl SearchState {
    pub fn is_loading(&self) -> bool {
        self.is_loading_initial || self.is_loading_more
    }
}

impl Default for SearchState {
    fn default() -> Self {
        Self {
            query: String::new(),
            page: 1,
            results: Vec::new(),
            has_more: true,
            is_loading_initial: false,
            is_loading_more: false,
            error_message: None,
            generation: 0,
        }
    }
}

/// Everything the home screen renders, published after each transition.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct HomeState {
    pub search: SearchState,
    pub input: String,
    pub history: HistoryList,
    pub show_history: bool,
}
