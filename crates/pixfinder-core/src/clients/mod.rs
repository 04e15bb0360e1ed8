pub mod account;
pub mod account_http;
pub(crate) mod http_utils;
pub mod image_search;
pub mod image_search_http;

pub use account::{AccountClient, AccountSource};
pub use account_http::HttpAccountSource;
pub use image_search::{
    ImageSearch, ImageSearchClient, ImageSearchSource, PAGE_SIZE, SearchRequest,
};
pub use image_search_http::HttpImageSearchSource;

use crate::models::CoreError;

pub type ClientResult<T> = Result<T, CoreError>;
