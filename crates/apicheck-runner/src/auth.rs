//! One-time bearer token retrieval
//!
//! Runs once before the first scenario; the token is shared read-only
//! afterwards. A failure here halts the whole run, not one scenario.

use apicheck_core::config::OauthConfig;

/// Fetch an access token with a password grant.
///
/// # Errors
///
/// `AuthError::Transport` if the endpoint is unreachable,
/// `AuthError::Rejected` on a non-2xx answer, `AuthError::MissingToken`
/// when the answer carries no `access_token` field.
pub fn fetch_access_token(oauth: &OauthConfig) -> Result<String, AuthError> {
    let client = reqwest::blocking::Client::builder()
        .timeout(std::time::Duration::from_secs(10))
        .build()
        .map_err(|e| AuthError::Transport(e.to_string()))?;

    let resp = client
        .post(&oauth.token_url)
        .form(&[
            ("grant_type", "password"),
            ("username", oauth.username.as_str()),
            ("password", oauth.password.as_str()),
        ])
        .send()
        .map_err(|e| AuthError::Transport(e.to_string()))?;

    let status = resp.status().as_u16();
    let body: serde_json::Value = resp
        .json()
        .map_err(|e| AuthError::Transport(e.to_string()))?;

    if !(200..300).contains(&status) {
        return Err(AuthError::Rejected {
            status,
            body: body.to_string(),
        });
    }

    token_from_json(&body).ok_or(AuthError::MissingToken)
}

fn token_from_json(body: &serde_json::Value) -> Option<String> {
    body.get("access_token")
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("token endpoint unreachable: {0}")]
    Transport(String),
    #[error("token request rejected with {status}: {body}")]
    Rejected { status: u16, body: String },
    #[error("token response carries no access_token")]
    MissingToken,
}
