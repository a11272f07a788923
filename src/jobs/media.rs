//! Bounded media selection

use crate::sources::MediaProbe;

/// Combined body and media size must stay strictly under this (5 MiB)
pub const MAX_COMBINED_BYTES: u64 = 5 * 1024 * 1024;

/// Default number of candidates probed before giving up
pub const DEFAULT_MEDIA_ATTEMPTS: usize = 5;

/// Whether media of `media_bytes` fits alongside a body of `body_bytes`
#[must_use]
pub const fn fits(media_bytes: u64, body_bytes: u64) -> bool {
    media_bytes.saturating_add(body_bytes) < MAX_COMBINED_BYTES
}

/// Probe candidates in order, returning the first one that fits with `body`
///
/// At most `max_attempts` candidates are probed. A failed probe counts as an
/// attempt.
pub async fn select_media(
    candidates: &[String],
    probe: &dyn MediaProbe,
    body: &str,
    max_attempts: usize,
) -> Option<String> {
    let body_bytes = body.len() as u64;

    for (attempt, url) in candidates.iter().take(max_attempts).enumerate() {
        match probe.content_length(url).await {
            Ok(size) if fits(size, body_bytes) => {
                tracing::debug!(attempt, size, url = %url, "media fits");
                return Some(url.clone());
            }
            Ok(size) => tracing::debug!(attempt, size, url = %url, "media too large"),
            Err(e) => tracing::warn!(attempt, url = %url, error = %e, "media probe failed"),
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::{Error, Result};

    struct FakeProbe {
        sizes: HashMap<String, u64>,
        probed: Mutex<Vec<String>>,
    }

    impl FakeProbe {
        fn new(sizes: &[(&str, u64)]) -> Self {
            Self {
                sizes: sizes.iter().map(|(u, s)| ((*u).to_string(), *s)).collect(),
                probed: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl MediaProbe for FakeProbe {
        async fn content_length(&self, url: &str) -> Result<u64> {
            self.probed.lock().unwrap().push(url.to_string());
            self.sizes
                .get(url)
                .copied()
                .ok_or_else(|| Error::Media(format!("unreachable: {url}")))
        }
    }

    fn urls(names: &[&str]) -> Vec<String> {
        names.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn threshold_is_exclusive() {
        assert!(fits(MAX_COMBINED_BYTES - 11, 10));
        assert!(!fits(MAX_COMBINED_BYTES - 10, 10));
        assert!(!fits(u64::MAX, 1));
    }

    #[tokio::test]
    async fn picks_first_fitting_candidate() {
        let probe = FakeProbe::new(&[("big", MAX_COMBINED_BYTES), ("small", 1024), ("other", 1)]);
        let picked = select_media(&urls(&["big", "small", "other"]), &probe, "body", 5).await;

        assert_eq!(picked.as_deref(), Some("small"));
        assert_eq!(probe.probed.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn body_size_counts_toward_limit() {
        let body = "x".repeat(100);
        let probe = FakeProbe::new(&[("edge", MAX_COMBINED_BYTES - 100)]);
        assert_eq!(select_media(&urls(&["edge"]), &probe, &body, 5).await, None);
    }

    #[tokio::test]
    async fn attempts_are_bounded() {
        let names: Vec<String> = (0..20).map(|i| format!("huge-{i}")).collect();
        let sizes: Vec<(&str, u64)> = names
            .iter()
            .map(|n| (n.as_str(), MAX_COMBINED_BYTES * 2))
            .collect();
        let probe = FakeProbe::new(&sizes);

        assert_eq!(select_media(&names, &probe, "body", 3).await, None);
        assert_eq!(probe.probed.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn probe_failure_moves_on() {
        let probe = FakeProbe::new(&[("ok", 10)]);
        let picked = select_media(&urls(&["missing", "ok"]), &probe, "body", 5).await;
        assert_eq!(picked.as_deref(), Some("ok"));
    }
}
