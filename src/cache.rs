use crate::lister::RemoteLister;
use glob::Pattern;
use log::{debug, warn};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Cached outcome of one directory listing.
#[derive(Debug, Clone, PartialEq)]
pub enum Listing {
    /// Directory listed successfully; may legitimately be empty.
    Found(Arc<HashSet<String>>),
    /// The remote positively reported the directory as absent.
    ConfirmedEmpty,
    /// Timeout, connection failure or unclassified status; never cached.
    FetchFailed,
}

impl Listing {
    pub fn any_match(&self, pattern: &Pattern) -> bool {
        match self {
            Listing::Found(names) => names.iter().any(|name| pattern.matches(name)),
            Listing::ConfirmedEmpty | Listing::FetchFailed => false,
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        match self {
            Listing::Found(names) => names.contains(name),
            Listing::ConfirmedEmpty | Listing::FetchFailed => false,
        }
    }
}

/// Directory-listing cache shared by every worker of one run.
///
/// `Found` and `ConfirmedEmpty` entries are immutable once stored and are
/// served without a remote call. `FetchFailed` is returned to the caller but
/// never stored, so the next lookup of the same key retries the fetch.
/// Workers racing on an uncached key may both fetch; both target the same
/// immutable remote directory, so either result is valid.
pub struct ListingCache {
    lister: Arc<dyn RemoteLister>,
    entries: Mutex<HashMap<String, Listing>>,
}

impl ListingCache {
    pub fn new(lister: Arc<dyn RemoteLister>) -> Self {
        Self {
            lister,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub async fn get_listing(&self, url: &str) -> Listing {
        {
            let entries = self.entries.lock().await;
            if let Some(listing) = entries.get(url) {
                debug!("Cache hit: {}", url);
                return listing.clone();
            }
        }

        let listing = match self.lister.list(url).await {
            Ok(names) => {
                debug!("Listed {} entries in {}", names.len(), url);
                Listing::Found(Arc::new(names.into_iter().collect()))
            }
            Err(e) if e.is_not_found() => {
                debug!("Directory not found: {}", url);
                Listing::ConfirmedEmpty
            }
            Err(e) => {
                warn!("Listing failed for {}: {}", url, e);
                Listing::FetchFailed
            }
        };

        if listing != Listing::FetchFailed {
            let mut entries = self.entries.lock().await;
            entries.insert(url.to_string(), listing.clone());
        }
        listing
    }
}
