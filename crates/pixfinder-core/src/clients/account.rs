use serde::Serialize;
use serde_json::Value;

use crate::clients::ClientResult;
use crate::clients::http_utils::parse_error;
use crate::models::Credentials;

/// Raw transport to the two authentication endpoints.
pub trait AccountSource: Send + Sync {
    fn post_login(&self, body: &str) -> ClientResult<String>;
    fn post_sign_up(&self, body: &str) -> ClientResult<String>;
}

/// Login validation and sign-up.
///
/// Both operations collapse transport and parse failures into `false` after
/// logging them; only unusable input is returned as an error.
pub struct AccountClient<S: AccountSource> {
    source: S,
}

#[derive(Serialize)]
struct Envelope<'a> {
    body: [&'a Credentials; 1],
}

impl<S: AccountSource> AccountClient<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub fn validate(&self, credentials: &Credentials) -> ClientResult<bool> {
        credentials.validate()?;
        let outcome = encode_envelope(credentials)
            .and_then(|body| self.source.post_login(&body))
            .and_then(|raw| parse_login_response(&raw));

        Ok(settle("login", credentials, outcome))
    }

    pub fn sign_up(&self, credentials: &Credentials) -> ClientResult<bool> {
        credentials.validate()?;
        let outcome = encode_envelope(credentials)
            .and_then(|body| self.source.post_sign_up(&body))
            .and_then(|raw| parse_sign_up_response(&raw));

        Ok(settle("sign_up", credentials, outcome))
    }
}

fn settle(operation: &str, credentials: &Credentials, outcome: ClientResult<bool>) -> bool {
    match outcome {
        Ok(accepted) => {
            if !accepted {
                tracing::warn!(operation, email = %credentials.email, "account request was rejected");
            }
            accepted
        }
        Err(error) => {
            tracing::error!(
                operation,
                email = %credentials.email,
                kind = ?error.kind,
                message = %error.message,
                "account request failed"
            );
            false
        }
    }
}

fn encode_envelope(credentials: &Credentials) -> ClientResult<String> {
    serde_json::to_string(&Envelope {
        body: [credentials],
    })
    .map_err(|error| parse_error("account", error))
}

fn parse_login_response(raw: &str) -> ClientResult<bool> {
    let value: Value = serde_json::from_str(raw).map_err(|error| parse_error("login", error))?;
    Ok(value
        .get("body")
        .and_then(|body| body.get("exists"))
        .and_then(Value::as_bool)
        == Some(true))
}

fn parse_sign_up_response(raw: &str) -> ClientResult<bool> {
    let value: Value = serde_json::from_str(raw).map_err(|error| parse_error("sign_up", error))?;
    Ok(value.get("success").and_then(Value::as_bool) == Some(true))
}
