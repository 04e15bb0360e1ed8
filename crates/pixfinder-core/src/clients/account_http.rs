use crate::clients::ClientResult;
use crate::clients::account::AccountSource;
use crate::clients::http_utils::{build_agent, read_body};
use crate::config::ClientConfig;
use crate::models::CoreError;

pub struct HttpAccountSource {
    agent: ureq::Agent,
    login_url: Option<String>,
    sign_up_url: Option<String>,
}

impl HttpAccountSource {
    pub fn new(agent: ureq::Agent, login_url: Option<String>, sign_up_url: Option<String>) -> Self {
        Self {
            agent,
            login_url,
            sign_up_url,
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(
            build_agent(config.request_timeout()),
            config.login_url.clone(),
            config.sign_up_url.clone(),
        )
    }

    fn post_json(&self, endpoint: &str, url: Option<&str>, body: &str) -> ClientResult<String> {
        let url = url.ok_or_else(|| {
            CoreError::invalid_input(format!("{endpoint} endpoint is not configured"))
        })?;

        let outcome = self
            .agent
            .post(url)
            .set("Content-Type", "application/json")
            .send_string(body);

        read_body(endpoint, outcome)
    }
}

impl AccountSource for HttpAccountSource {
    fn post_login(&self, body: &str) -> ClientResult<String> {
        self.post_json("login", self.login_url.as_deref(), body)
    }

    fn post_sign_up(&self, body: &str) -> ClientResult<String> {
        self.post_json("sign_up", self.sign_up_url.as_deref(), body)
    }
}
