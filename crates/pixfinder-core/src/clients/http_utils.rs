use std::time::Duration;

use crate::clients::ClientResult;
use crate::models::{CoreError, CoreErrorKind};

pub(crate) fn build_agent(timeout: Duration) -> ureq::Agent {
    ureq::AgentBuilder::new().timeout(timeout).build()
}

/// Reads the body of a 2xx response; any other status is a transport error.
pub(crate) fn read_body(
    endpoint: &str,
    outcome: Result<ureq::Response, ureq::Error>,
) -> ClientResult<String> {
    match outcome {
        Ok(response) => response.into_string().map_err(|error| {
            transport_error(endpoint, format!("failed to read response body: {error}"))
        }),
        Err(ureq::Error::Status(code, _)) => Err(match code {
            401 | 403 => CoreError::new(
                CoreErrorKind::Unauthorized,
                format!("{endpoint} rejected the request with status {code}"),
            ),
            _ => transport_error(endpoint, format!("unexpected status {code}")),
        }),
        Err(ureq::Error::Transport(error)) => Err(transport_error(endpoint, error.to_string())),
    }
}

pub(crate) fn transport_error(endpoint: &str, message: impl AsRef<str>) -> CoreError {
    CoreError {
        kind: CoreErrorKind::Transport,
        message: format!("{endpoint} request failed: {}", message.as_ref()),
    }
}

pub(crate) fn parse_error(endpoint: &str, error: serde_json::Error) -> CoreError {
    CoreError {
        kind: CoreErrorKind::ParseFailure,
        message: format!("{endpoint} returned a malformed body: {error}"),
    }
}
