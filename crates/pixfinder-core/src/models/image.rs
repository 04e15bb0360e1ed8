use serde::Serialize;

/// One search hit as the home screen renders it.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct ImageRecord {
    pub id: String,
    pub thumbnail_url: String,
}

/// A single page returned by the image-search API.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SearchPage {
    pub results: Vec<ImageRecord>,
    pub total_pages: u32,
    /// Photos the API returned that had no usable thumbnail.
    pub skipped: usize,
}

impl SearchPage {
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// The API returned photos, but none of them can be rendered.
    pub fn only_skipped(&self) -> bool {
        self.results.is_empty() && self.skipped > 0
    }

    /// Whether another page exists after `fetched_page`.
    pub fn has_more_after(&self, fetched_page: u32) -> bool {
        self.total_pages > fetched_page
    }
}
