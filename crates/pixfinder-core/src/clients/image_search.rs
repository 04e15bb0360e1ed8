use serde::Deserialize;

use crate::clients::ClientResult;
use crate::clients::http_utils::parse_error;
use crate::models::{CoreError, ImageRecord, SearchPage};

pub const PAGE_SIZE: u32 = 5;

const ENDPOINT: &str = "image search";

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SearchRequest {
    pub query: String,
    pub page: u32,
    pub per_page: u32,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>, page: u32) -> Self {
        Self {
            query: query.into(),
            page,
            per_page: PAGE_SIZE,
        }
    }
}

/// Returns the raw response body for one search request.
pub trait ImageSearchSource: Send + Sync {
    fn search_photos(&self, request: &SearchRequest) -> ClientResult<String>;
}

/// One page of typed results for a query.
pub trait ImageSearch: Send + Sync {
    fn fetch_page(&self, query: &str, page: u32) -> ClientResult<SearchPage>;
}

pub struct ImageSearchClient<S: ImageSearchSource> {
    source: S,
}

impl<S: ImageSearchSource> ImageSearchClient<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }
}

impl<S: ImageSearchSource> ImageSearch for ImageSearchClient<S> {
    fn fetch_page(&self, query: &str, page: u32) -> ClientResult<SearchPage> {
        if query.trim().is_empty() {
            return Err(CoreError::invalid_input("search query must not be empty"));
        }
        if page == 0 {
            return Err(CoreError::invalid_input("search pages start at 1"));
        }

        let raw = self.source.search_photos(&SearchRequest::new(query, page))?;
        parse_search_page(&raw)
    }
}

#[derive(Debug, Deserialize)]
struct RawSearchResponse {
    #[serde(default)]
    results: Vec<RawPhoto>,
    #[serde(default)]
    total_pages: u32,
}

#[derive(Debug, Deserialize)]
struct RawPhoto {
    id: String,
    #[serde(default)]
    urls: Option<RawPhotoUrls>,
}

#[derive(Debug, Deserialize)]
struct RawPhotoUrls {
    small: Option<String>,
}

fn parse_search_page(raw: &str) -> ClientResult<SearchPage> {
    let response: RawSearchResponse =
        serde_json::from_str(raw).map_err(|error| parse_error(ENDPOINT, error))?;

    let returned = response.results.len();
    let results: Vec<ImageRecord> = response
        .results
        .into_iter()
        .filter_map(|photo| {
            // Nothing to render without a thumbnail.
            let thumbnail_url = photo.urls?.small.filter(|url| !url.is_empty())?;
            Some(ImageRecord {
                id: photo.id,
                thumbnail_url,
            })
        })
        .collect();

    Ok(SearchPage {
        skipped: returned - results.len(),
        results,
        total_pages: response.total_pages,
    })
}
