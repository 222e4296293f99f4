//! Signed-in user session, read from the hosted sign-in flow's cookies.
//!
//! The managed identity service stores tokens in cookies named
//! `CognitoIdentityServiceProvider.<client id>.LastAuthUser` and
//! `CognitoIdentityServiceProvider.<client id>.<user>.accessToken`.
//! Both names and values may be percent-encoded.

use axum::http::header::COOKIE;
use axum::http::HeaderMap;
use percent_encoding::percent_decode_str;
use std::collections::HashMap;
use std::fmt;

const COOKIE_PREFIX: &str = "CognitoIdentityServiceProvider";

#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    pub username: String,
    access_token: String,
}

impl Session {
    pub fn new(username: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            access_token: access_token.into(),
        }
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    /// Looks up the session for `client_id` in the request cookies.
    pub fn from_headers(headers: &HeaderMap, client_id: &str) -> Option<Self> {
        let cookies = parse_cookies(headers);
        let prefix = format!("{COOKIE_PREFIX}.{client_id}");

        let username = cookies.get(&format!("{prefix}.LastAuthUser"))?;
        if username.is_empty() {
            return None;
        }
        let token = cookies.get(&format!("{prefix}.{username}.accessToken"))?;
        if token.is_empty() {
            return None;
        }

        Some(Self::new(username.clone(), token.clone()))
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("username", &self.username)
            .field("access_token", &"<redacted>")
            .finish()
    }
}

fn parse_cookies(headers: &HeaderMap) -> HashMap<String, String> {
    let mut cookies = HashMap::new();
    for value in headers.get_all(COOKIE) {
        let Ok(value) = value.to_str() else {
            continue;
        };
        for pair in value.split(';') {
            let Some((name, value)) = pair.split_once('=') else {
                continue;
            };
            let name = decode(name.trim());
            let value = decode(value.trim().trim_matches('"'));
            cookies.entry(name).or_insert(value);
        }
    }
    cookies
}

fn decode(raw: &str) -> String {
    percent_decode_str(raw).decode_utf8_lossy().into_owned()
}
