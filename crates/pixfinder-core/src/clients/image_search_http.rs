use crate::clients::ClientResult;
use crate::clients::http_utils::{build_agent, read_body};
use crate::clients::image_search::{ImageSearchSource, SearchRequest};
use crate::config::ClientConfig;

const ENDPOINT: &str = "image search";

pub struct HttpImageSearchSource {
    agent: ureq::Agent,
    base_url: String,
    access_key: String,
}

impl HttpImageSearchSource {
    pub fn new(agent: ureq::Agent, base_url: impl Into<String>, access_key: impl Into<String>) -> Self {
        Self {
            agent,
            base_url: base_url.into(),
            access_key: access_key.into(),
        }
    }

    pub fn from_config(config: &ClientConfig) -> ClientResult<Self> {
        let access_key = config.require_search_access_key()?;
        Ok(Self::new(
            build_agent(config.request_timeout()),
            config.search_base_url.clone(),
            access_key,
        ))
    }

    pub fn search_url(&self) -> String {
        format!("{}/search/photos", self.base_url.trim_end_matches('/'))
    }
}

impl ImageSearchSource for HttpImageSearchSource {
    fn search_photos(&self, request: &SearchRequest) -> ClientResult<String> {
        tracing::debug!(
            query = %request.query,
            page = request.page,
            per_page = request.per_page,
            "requesting image search page"
        );

        let outcome = self
            .agent
            .get(&self.search_url())
            .query("query", &request.query)
            .query("page", &request.page.to_string())
            .query("per_page", &request.per_page.to_string())
            .set("Accept-Version", "v1")
            .set("Authorization", &format!("Client-ID {}", self.access_key))
            .call();

        read_body(ENDPOINT, outcome)
    }
}
