// client.rs

use futures_util::StreamExt;
use log::{debug, error};
use reqwest::header::{self, HeaderValue};
use reqwest::{redirect, Method, Request, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use serde_json::value::RawValue;
use std::sync::RwLock;
use std::time::Duration;
use url::Url;

use crate::constants::*;
use crate::error::{ApiError, EeroError};
use crate::models::*;
use crate::origin::{same_host, OriginCache};
use crate::session_jar::SessionJar;

type Result<T> = std::result::Result<T, EeroError>;

/// Minimal envelope used to classify a response before any payload decoding.
#[derive(serde::Deserialize)]
struct MetaEnvelope {
    #[serde(default)]
    meta: ApiError,
}

/// Envelope that splits `meta` from the raw `data` bytes in a single parse,
/// so the payload can be decoded into a caller-supplied type afterwards.
#[derive(serde::Deserialize)]
struct RawEnvelope<'a> {
    #[serde(default)]
    meta: ApiError,
    #[serde(borrow)]
    data: Option<&'a RawValue>,
}

/// Follow same-host redirects only, up to a small fixed bound. A redirect to
/// a different host would replay the session cookie to a host the caller
/// never configured, so it fails the request instead of being followed.
fn same_host_redirect_policy() -> redirect::Policy {
    redirect::Policy::custom(|attempt| {
        if attempt.previous().len() > MAX_REDIRECTS {
            return attempt.error("too many redirects");
        }
        match attempt.previous().first() {
            Some(original) if same_host(original, attempt.url()) => attempt.follow(),
            _ => attempt.error("redirect to a different host refused"),
        }
    })
}

/// Builder for [`EeroClient`] with configuration validation.
///
/// # Examples
///
/// ```no_run
/// use eero::EeroClient;
///
/// let client = EeroClient::builder()
///     .base_url("https://api-user.e2ro.com/2.2")
///     .timeout_secs(30)
///     .build()?;
/// # Ok::<(), eero::EeroError>(())
/// ```
#[derive(Debug, Default)]
pub struct EeroClientBuilder {
    base_url: Option<String>,
    user_agent: Option<String>,
    timeout: Option<Duration>,
    session: Option<SessionJar>,
}

impl EeroClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the API base URL, including the version path prefix.
    ///
    /// Default: `https://api-user.e2ro.com/2.2`
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the User-Agent header sent with every request.
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Set the overall per-request timeout.
    ///
    /// Default: 60 seconds
    pub fn timeout(mut self, duration: Duration) -> Self {
        self.timeout = Some(duration);
        self
    }

    /// Set the overall per-request timeout in seconds.
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout = Some(Duration::from_secs(secs));
        self
    }

    /// Supply a session jar, e.g. one shared with another client or one the
    /// caller keeps a handle on for inspection.
    pub fn session_jar(mut self, session: SessionJar) -> Self {
        self.session = Some(session);
        self
    }

    fn validate(&self) -> Result<()> {
        if let Some(url) = &self.base_url {
            Url::parse(url).map_err(|e| EeroError::Configuration(format!("invalid base URL '{}': {}", url, e)))?;
        }
        Ok(())
    }

    pub fn build(self) -> Result<EeroClient> {
        self.validate()?;

        let user_agent = self.user_agent.unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());
        let user_agent = HeaderValue::from_str(&user_agent)
            .map_err(|e| EeroError::Configuration(format!("invalid user agent '{}': {}", user_agent, e)))?;

        let session = self.session.unwrap_or_default();
        let http = reqwest::Client::builder()
            .cookie_provider(session.jar())
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(self.timeout.unwrap_or(REQUEST_TIMEOUT))
            .pool_max_idle_per_host(MAX_IDLE_CONNECTIONS_PER_HOST)
            .pool_idle_timeout(POOL_IDLE_TIMEOUT)
            .redirect(same_host_redirect_policy())
            .build()
            .map_err(|e| EeroError::Configuration(format!("building HTTP client: {}", e)))?;

        Ok(EeroClient {
            base_url: RwLock::new(self.base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string())),
            user_agent,
            origin: OriginCache::default(),
            session,
            http,
        })
    }
}

/// Client for the eero cloud REST API.
///
/// A single client is safe to share across tasks: the session jar and the
/// derived origin cache are internally synchronized, and every call is an
/// independent request/response with no ordering between concurrent calls.
#[derive(Debug)]
pub struct EeroClient {
    base_url: RwLock<String>,
    user_agent: HeaderValue,
    origin: OriginCache,
    session: SessionJar,
    http: reqwest::Client,
}

impl EeroClient {
    //
    // Construction / configuration
    //

    /// Create a client against the production eero API with default settings.
    pub fn new() -> Result<Self> {
        Self::builder().build()
    }

    pub fn builder() -> EeroClientBuilder {
        EeroClientBuilder::new()
    }

    /// The current base URL (origin plus version path prefix).
    pub fn base_url(&self) -> String {
        self.base_url.read().unwrap().clone()
    }

    /// Repoint the client at a different base URL, e.g. a test double.
    ///
    /// This is the only supported way to change the base URL at runtime.
    /// Calls already in flight keep the URL they were built with; the derived
    /// origin is re-derived lazily on the next use. Concurrent reconfiguration
    /// from several tasks is not meaningful and must be serialized by the
    /// caller.
    pub fn set_base_url(&self, url: impl Into<String>) {
        *self.base_url.write().unwrap() = url.into();
    }

    /// The session store backing this client's cookie-based authentication.
    pub fn session(&self) -> &SessionJar {
        &self.session
    }

    fn origin(&self) -> Result<Url> {
        self.origin.resolve(&self.base_url())
    }

    //
    // Request construction
    //

    /// Build a request for a path under the configured base URL
    /// (e.g. `/account`).
    ///
    /// The path is appended to the base URL by plain concatenation, not URL
    /// joining: the base URL's version prefix must survive verbatim even
    /// though the appended path starts with `/`.
    pub fn new_request<B>(&self, method: Method, path: &str, body: Option<&B>) -> Result<Request>
    where
        B: Serialize + ?Sized,
    {
        let target = format!("{}{}", self.base_url(), path);
        let url = Url::parse(&target).map_err(|e| EeroError::InvalidUrl(format!("'{}': {}", target, e)))?;
        self.build_request(method, url, body)
    }

    /// Build a request from a full relative URL handed back by a previous
    /// server response (e.g. `/2.2/networks/12345`), resolved against the
    /// API origin rather than the base URL so the version prefix is not
    /// applied twice.
    ///
    /// The resolved target must stay on the origin's host. A server-supplied
    /// value resolving elsewhere is refused with
    /// [`EeroError::CrossHostTarget`] so a compromised response cannot pivot
    /// requests (and the session cookie) to another host.
    pub fn new_request_from_url<B>(&self, method: Method, reference: &str, body: Option<&B>) -> Result<Request>
    where
        B: Serialize + ?Sized,
    {
        let origin = self.origin()?;
        let target =
            origin.join(reference).map_err(|e| EeroError::InvalidUrl(format!("resolving '{}': {}", reference, e)))?;
        if !same_host(&origin, &target) {
            error!("refusing cross-host target {} (origin host {:?})", target, origin.host_str());
            return Err(EeroError::CrossHostTarget {
                expected: origin.host_str().unwrap_or_default().to_string(),
                actual: target.host_str().unwrap_or_default().to_string(),
            });
        }
        self.build_request(method, target, body)
    }

    fn build_request<B>(&self, method: Method, url: Url, body: Option<&B>) -> Result<Request>
    where
        B: Serialize + ?Sized,
    {
        let mut req = Request::new(method, url);
        req.headers_mut().insert(header::USER_AGENT, self.user_agent.clone());

        if let Some(body) = body {
            let buf = serde_json::to_vec(body)
                .map_err(|e| EeroError::Serialization(format!("encoding request body: {}", e)))?;
            req.headers_mut().insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
            *req.body_mut() = Some(buf.into());
        }

        Ok(req)
    }

    //
    // Response pipeline
    //

    /// Execute the request and read at most [`MAX_RESPONSE_BODY_BYTES`] of
    /// the body; anything beyond the cap is discarded unread so an oversized
    /// response cannot exhaust memory regardless of its Content-Length claim.
    async fn dispatch(&self, req: Request) -> Result<(StatusCode, Vec<u8>)> {
        debug!("{} {}", req.method(), req.url());

        let resp = self.http.execute(req).await.map_err(|e| EeroError::Transport(e.to_string()))?;
        let status = resp.status();

        let mut body = Vec::new();
        let mut stream = resp.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| EeroError::Transport(e.to_string()))?;
            let room = MAX_RESPONSE_BODY_BYTES - body.len();
            if room == 0 {
                break;
            }
            body.extend_from_slice(&chunk[..chunk.len().min(room)]);
        }

        Ok((status, body))
    }

    fn check_meta(status: StatusCode, mut meta: ApiError) -> Result<()> {
        if !status.is_success() || meta.code >= 400 {
            meta.http_status = status.as_u16();
            error!("eero API error: {}", meta);
            return Err(EeroError::Api(meta));
        }
        Ok(())
    }

    fn check_envelope(status: StatusCode, body: &[u8]) -> Result<()> {
        let envelope: MetaEnvelope = match serde_json::from_slice(body) {
            Ok(envelope) => envelope,
            Err(_) => return Err(EeroError::Api(ApiError::unparseable(status.as_u16(), body.len()))),
        };
        Self::check_meta(status, envelope.meta)
    }

    /// Execute a request, classify the response, and discard any payload.
    pub async fn execute(&self, req: Request) -> Result<()> {
        let (status, body) = self.dispatch(req).await?;
        Self::check_envelope(status, &body)
    }

    /// Execute a request and decode the envelope's `data` payload into `T`.
    ///
    /// Returns `Ok(None)` when `data` is absent, `null`, or an empty object
    /// or array that does not fit `T`; any other shape mismatch is a
    /// [`EeroError::Serialization`] error.
    pub async fn execute_data<T: DeserializeOwned>(&self, req: Request) -> Result<Option<T>> {
        let (status, body) = self.dispatch(req).await?;

        let envelope: RawEnvelope = match serde_json::from_slice(&body) {
            Ok(envelope) => envelope,
            Err(_) => return Err(EeroError::Api(ApiError::unparseable(status.as_u16(), body.len()))),
        };
        Self::check_meta(status, envelope.meta)?;

        let raw = match envelope.data {
            Some(raw) => raw.get().trim(),
            None => return Ok(None),
        };
        if raw == "null" {
            return Ok(None);
        }
        match serde_json::from_str(raw) {
            Ok(value) => Ok(Some(value)),
            Err(e) => match serde_json::from_str::<serde_json::Value>(raw) {
                Ok(serde_json::Value::Object(map)) if map.is_empty() => Ok(None),
                Ok(serde_json::Value::Array(items)) if items.is_empty() => Ok(None),
                _ => Err(EeroError::Serialization(format!("decoding data payload: {}", e))),
            },
        }
    }

    /// Execute a request and decode the entire envelope into
    /// [`EeroResponse<T>`], giving the caller both `meta` and typed `data`.
    pub async fn execute_envelope<T: DeserializeOwned>(&self, req: Request) -> Result<EeroResponse<T>> {
        let (status, body) = self.dispatch(req).await?;
        Self::check_envelope(status, &body)?;
        serde_json::from_slice(&body).map_err(|e| EeroError::Serialization(format!("decoding response: {}", e)))
    }

    //
    // Session management
    //

    /// Install `token` as the session cookie for the current base URL's
    /// host, replacing any previous session. Fails only if the base URL
    /// itself cannot be parsed; any token value is accepted.
    pub fn set_session_token(&self, token: &str) -> Result<()> {
        let base = self.base_url();
        let url = Url::parse(&base).map_err(|e| EeroError::InvalidUrl(format!("parsing base URL '{}': {}", base, e)))?;
        self.session.set_token(&url, token);
        Ok(())
    }

    /// The session token currently installed for the base URL, if any.
    pub fn session_token(&self) -> Option<String> {
        let url = Url::parse(&self.base_url()).ok()?;
        self.session.token(&url)
    }

    //
    // Authentication
    //

    /// Start the two-step login by sending an email address or phone number.
    /// eero sends a verification code to that identifier; the returned
    /// user token is installed as the session cookie so [`Self::verify`] and
    /// all later calls are authenticated.
    pub async fn login(&self, identifier: &str) -> Result<LoginResponse> {
        let req = self.new_request(Method::POST, "/login", Some(&json!({ "login": identifier })))?;
        let login: LoginResponse = self
            .execute_data(req)
            .await?
            .ok_or_else(|| EeroError::Serialization("login response missing data payload".to_string()))?;

        self.set_session_token(&login.user_token)?;
        Ok(login)
    }

    /// Complete the login by submitting the verification code delivered to
    /// the user's email or phone. On success the session cookie installed by
    /// [`Self::login`] becomes fully active.
    pub async fn verify(&self, code: &str) -> Result<()> {
        let req = self.new_request(Method::POST, "/login/verify", Some(&json!({ "code": code })))?;
        self.execute(req).await
    }

    //
    // Account
    //

    /// Fetch the authenticated user's account. The returned
    /// `networks.data[].url` values are full relative paths to hand to
    /// [`Self::get_network`], [`Self::list_devices`] and friends.
    pub async fn get_account(&self) -> Result<Account> {
        let req = self.new_request(Method::GET, "/account", None::<&()>)?;
        let resp: EeroResponse<Account> = self.execute_envelope(req).await?;
        resp.data.ok_or_else(|| EeroError::Serialization("account response missing data payload".to_string()))
    }

    //
    // Networks
    //

    /// Fetch full details of a network. `network_url` is the exact relative
    /// URL from the account response (e.g. `/2.2/networks/12345`); do not
    /// construct it by hand.
    pub async fn get_network(&self, network_url: &str) -> Result<NetworkDetails> {
        let req = self.new_request_from_url(Method::GET, network_url, None::<&()>)?;
        let resp: EeroResponse<NetworkDetails> = self.execute_envelope(req).await?;
        resp.data.ok_or_else(|| EeroError::Serialization("network response missing data payload".to_string()))
    }

    /// Reboot every eero node in the network.
    pub async fn reboot_network(&self, network_url: &str) -> Result<()> {
        let req = self.new_request_from_url(Method::POST, &format!("{}/reboot", network_url), None::<&()>)?;
        self.execute(req).await
    }

    //
    // Devices
    //

    /// List all client devices on a network.
    pub async fn list_devices(&self, network_url: &str) -> Result<Vec<Device>> {
        let req = self.new_request_from_url(Method::GET, &format!("{}/devices", network_url), None::<&()>)?;
        let resp: EeroResponse<Vec<Device>> = self.execute_envelope(req).await?;
        Ok(resp.data.unwrap_or_default())
    }

    //
    // Profiles
    //

    /// List all profiles on a network.
    pub async fn list_profiles(&self, network_url: &str) -> Result<Vec<Profile>> {
        let req = self.new_request_from_url(Method::GET, &format!("{}/profiles", network_url), None::<&()>)?;
        let resp: EeroResponse<Vec<Profile>> = self.execute_envelope(req).await?;
        Ok(resp.data.unwrap_or_default())
    }

    /// Pause internet access for a profile. `profile_url` is the exact
    /// relative URL from the profile response.
    pub async fn pause_profile(&self, profile_url: &str) -> Result<()> {
        self.set_paused(profile_url, true).await
    }

    /// Resume internet access for a profile.
    pub async fn unpause_profile(&self, profile_url: &str) -> Result<()> {
        self.set_paused(profile_url, false).await
    }

    async fn set_paused(&self, profile_url: &str, paused: bool) -> Result<()> {
        let req = self.new_request_from_url(Method::PUT, profile_url, Some(&json!({ "paused": paused })))?;
        self.execute(req).await
    }
}
