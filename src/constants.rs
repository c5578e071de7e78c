// constants.rs

use std::time::Duration;

/// Base URL for the eero API, including the version path prefix.
pub const DEFAULT_BASE_URL: &str = "https://api-user.e2ro.com/2.2";

/// User-Agent sent with every request; mimics the eero iOS app.
pub const DEFAULT_USER_AGENT: &str = "eero/3.0 (iPhone; iOS 17.0)";

/// Name of the session cookie carrying the user token.
pub const SESSION_COOKIE_NAME: &str = "s";

// Transport hardening limits
pub const MAX_RESPONSE_BODY_BYTES: usize = 5 * 1024 * 1024;
pub const MAX_REDIRECTS: usize = 10;
pub const MAX_IDLE_CONNECTIONS_PER_HOST: usize = 8;
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
pub const POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(90);
