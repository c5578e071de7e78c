// origin.rs

use std::sync::RwLock;
use url::Url;

use crate::error::EeroError;

type Result<T> = std::result::Result<T, EeroError>;

/// Reports whether two URLs point at the same host. This is the single
/// same-origin predicate behind both the redirect policy and server-supplied
/// relative URL resolution; a URL without a host never matches anything.
pub(crate) fn same_host(a: &Url, b: &Url) -> bool {
    match (a.host_str(), b.host_str()) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

#[derive(Debug)]
struct CachedOrigin {
    origin: Url,
    /// The exact base URL string the origin was derived from. A reader that
    /// observes a matching snapshot may trust the origin as freshly parsed.
    snapshot: String,
}

/// Lazily derives and caches the scheme+host origin of the client's base URL
/// (e.g. "https://api-user.e2ro.com/2.2" -> "https://api-user.e2ro.com/").
///
/// Server responses reference other resources by full relative path
/// ("/2.2/networks/12345"), so callers resolve those against the origin
/// rather than the base URL to avoid double version prefixes.
#[derive(Debug, Default)]
pub(crate) struct OriginCache {
    cached: RwLock<Option<CachedOrigin>>,
}

impl OriginCache {
    /// Returns the origin for `base_url`, re-deriving it whenever the base
    /// URL string differs from the cached snapshot.
    pub(crate) fn resolve(&self, base_url: &str) -> Result<Url> {
        {
            let cached = self.cached.read().unwrap();
            if let Some(entry) = cached.as_ref() {
                if entry.snapshot == base_url {
                    return Ok(entry.origin.clone());
                }
            }
        }

        let mut cached = self.cached.write().unwrap();
        // Another caller may have refreshed the entry while we waited.
        if let Some(entry) = cached.as_ref() {
            if entry.snapshot == base_url {
                return Ok(entry.origin.clone());
            }
        }

        let parsed =
            Url::parse(base_url).map_err(|e| EeroError::InvalidUrl(format!("parsing base URL '{}': {}", base_url, e)))?;
        if parsed.host_str().is_none() {
            // Degenerate but parseable URL (e.g. "mailto:x"). Hand it back
            // unmodified without caching it.
            return Ok(parsed);
        }

        let mut origin = parsed;
        origin.set_path("");
        origin.set_query(None);
        origin.set_fragment(None);

        *cached = Some(CachedOrigin { origin: origin.clone(), snapshot: base_url.to_string() });
        Ok(origin)
    }
}
