pub mod account;
pub mod error;
pub mod history;
pub mod image;
pub mod search;

pub use account::Credentials;
pub use error::{CoreError, CoreErrorKind};
pub use history::{HISTORY_CAPACITY, HistoryList};
pub use image::{ImageRecord, SearchPage};
pub use search::{FETCH_FAILED_MESSAGE, HomeState, NO_RESULTS_MESSAGE, SearchState};
