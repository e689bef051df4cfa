//! News feed with a once-daily refresh gate.
//!
//! The feed is a static JSON document fetched over HTTP and cached in its
//! own slot together with the fetch time. The cache is considered fresh
//! until the next 6:30 AM US-Central cutoff passes; inside that window no
//! network call is made at all. The cutoff uses a fixed UTC-6 offset and is
//! deliberately DST-blind.

use std::sync::Arc;

use chrono::{DateTime, Duration, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::storage::SlotStore;

pub const NEWS_CACHE_SLOT: &str = "news_cache";

/// Daily refresh cutoff: 6:30 AM, fixed US-Central (UTC-6).
const CUTOFF_HOUR: u32 = 6;
const CUTOFF_MINUTE: u32 = 30;
const CENTRAL_OFFSET_SECS: i32 = 6 * 3600;

/// Error type for feed fetches.
#[derive(Debug, Error)]
pub enum NewsError {
    #[error("failed to reach the news feed: {0}")]
    Transport(String),
    #[error("the news feed returned status {0}")]
    Status(u16),
    #[error("failed to parse the news feed: {0}")]
    Parse(String),
}

/// The cached feed payload and when it was fetched.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedFeed {
    pub fetched_at: DateTime<Utc>,
    pub payload: Value,
}

/// Client for the static news feed.
pub struct NewsFeed {
    url: String,
    store: Arc<SlotStore>,
}

impl NewsFeed {
    pub fn new(url: impl Into<String>, store: Arc<SlotStore>) -> Self {
        Self {
            url: url.into(),
            store,
        }
    }

    /// The current feed payload.
    ///
    /// Serves the cache while it is fresh; otherwise fetches, caches and
    /// returns the new payload. A failed fetch falls back to a stale cache
    /// when one exists and propagates otherwise.
    pub fn latest(&self) -> Result<Value, NewsError> {
        let cached: Option<CachedFeed> = self.store.load_optional(NEWS_CACHE_SLOT);
        let now = Utc::now();

        if let Some(cached) = &cached {
            if !needs_refresh(cached.fetched_at, now) {
                return Ok(cached.payload.clone());
            }
        }

        match self.fetch() {
            Ok(payload) => {
                let entry = CachedFeed {
                    fetched_at: now,
                    payload: payload.clone(),
                };
                if let Err(e) = self.store.save_json(NEWS_CACHE_SLOT, &entry) {
                    log::warn!("failed to cache news feed: {e}");
                }
                Ok(payload)
            }
            Err(e) => match cached {
                Some(cached) => {
                    log::warn!("news fetch failed, serving stale cache: {e}");
                    Ok(cached.payload)
                }
                None => Err(e),
            },
        }
    }

    fn fetch(&self) -> Result<Value, NewsError> {
        let response = ureq::get(&self.url).call().map_err(|e| match e {
            ureq::Error::Status(code, _) => NewsError::Status(code),
            ureq::Error::Transport(t) => NewsError::Transport(t.to_string()),
        })?;

        response
            .into_json()
            .map_err(|e| NewsError::Parse(e.to_string()))
    }
}

/// Whether a cache fetched at `fetched_at` is due for refresh at `now`.
///
/// The cache is stale iff it predates the most recent 6:30 AM US-Central
/// cutoff.
pub fn needs_refresh(fetched_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    let central = FixedOffset::west_opt(CENTRAL_OFFSET_SECS).unwrap();
    let local_now = now.with_timezone(&central);

    let todays_cutoff = local_now
        .date_naive()
        .and_hms_opt(CUTOFF_HOUR, CUTOFF_MINUTE, 0)
        .unwrap()
        .and_local_timezone(central)
        .unwrap();

    let last_cutoff = if local_now < todays_cutoff {
        todays_cutoff - Duration::days(1)
    } else {
        todays_cutoff
    };

    fetched_at.with_timezone(&central) < last_cutoff
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn utc(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    // 6:30 AM US-Central == 12:30 UTC.

    #[test]
    fn fresh_within_same_window() {
        // Fetched after today's cutoff, asked again later the same day.
        let fetched = utc("2026-08-05T13:00:00Z");
        let now = utc("2026-08-05T23:00:00Z");
        assert!(!needs_refresh(fetched, now));
    }

    #[test]
    fn stale_once_cutoff_passes() {
        // Fetched yesterday evening, asked after this morning's cutoff.
        let fetched = utc("2026-08-05T23:00:00Z");
        let now = utc("2026-08-06T12:31:00Z");
        assert!(needs_refresh(fetched, now));
    }

    #[test]
    fn early_morning_still_uses_yesterdays_window() {
        // Before today's cutoff the governing cutoff is yesterday's.
        let fetched = utc("2026-08-05T13:00:00Z");
        let now = utc("2026-08-06T11:00:00Z");
        assert!(!needs_refresh(fetched, now));
    }

    #[test]
    fn stale_across_multiple_days() {
        let fetched = utc("2026-08-01T13:00:00Z");
        let now = utc("2026-08-06T11:00:00Z");
        assert!(needs_refresh(fetched, now));
    }

    #[test]
    fn boundary_minute_counts_as_new_window() {
        let fetched = utc("2026-08-05T13:00:00Z");
        let now = utc("2026-08-06T12:30:00Z");
        assert!(needs_refresh(fetched, now));
    }

    #[test]
    fn fresh_cache_is_served_without_fetching() {
        let dir = tempdir().unwrap();
        let store = Arc::new(SlotStore::new(dir.path()));

        let entry = CachedFeed {
            fetched_at: Utc::now(),
            payload: serde_json::json!({"items": ["headline"]}),
        };
        store.save_json(NEWS_CACHE_SLOT, &entry).unwrap();

        // The URL is unroutable; a fresh cache must short-circuit the fetch.
        let feed = NewsFeed::new("http://127.0.0.1:1/feed.json", store);
        let payload = feed.latest().unwrap();

        assert_eq!(payload["items"][0], "headline");
    }

    #[test]
    fn stale_cache_survives_failed_fetch() {
        let dir = tempdir().unwrap();
        let store = Arc::new(SlotStore::new(dir.path()));

        let entry = CachedFeed {
            fetched_at: utc("2026-01-01T00:00:00Z"),
            payload: serde_json::json!({"items": ["old headline"]}),
        };
        store.save_json(NEWS_CACHE_SLOT, &entry).unwrap();

        let feed = NewsFeed::new("http://127.0.0.1:1/feed.json", store);
        let payload = feed.latest().unwrap();

        assert_eq!(payload["items"][0], "old headline");
    }

    #[test]
    fn no_cache_and_failed_fetch_propagates() {
        let dir = tempdir().unwrap();
        let store = Arc::new(SlotStore::new(dir.path()));

        let feed = NewsFeed::new("http://127.0.0.1:1/feed.json", store);

        assert!(feed.latest().is_err());
    }
}
