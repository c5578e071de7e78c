// session_jar.rs

use reqwest::cookie::{CookieStore, Jar};
use std::sync::Arc;
use url::Url;

use crate::constants::SESSION_COOKIE_NAME;

/// SessionJar wraps a shared `reqwest::cookie::Jar` holding the eero session
/// cookie. The jar is handed to the HTTP client as its cookie provider, so
/// the session token is attached to outgoing requests and can be replaced
/// concurrently without any token plumbing through call sites.
#[derive(Debug, Clone, Default)]
pub struct SessionJar {
    jar: Arc<Jar>,
}

impl SessionJar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the underlying jar for use as a reqwest cookie provider.
    pub(crate) fn jar(&self) -> Arc<Jar> {
        self.jar.clone()
    }

    /// Installs `token` as the session cookie for the host of `url`. The
    /// cookie is marked Secure, so it is only ever transmitted over an
    /// encrypted transport. Any token value is accepted.
    pub fn set_token(&self, url: &Url, token: &str) {
        let cookie = format!("{}={}; Secure; Path=/", SESSION_COOKIE_NAME, token);
        self.jar.add_cookie_str(&cookie, url);
    }

    /// Retrieves the session token the jar would send to `url`, if any.
    pub fn token(&self, url: &Url) -> Option<String> {
        let prefix = format!("{}=", SESSION_COOKIE_NAME);
        self.jar.cookies(url).and_then(|header| {
            let header = header.to_str().ok()?.to_string();
            header.split(';').map(str::trim).find_map(|pair| pair.strip_prefix(&prefix)).map(String::from)
        })
    }
}
