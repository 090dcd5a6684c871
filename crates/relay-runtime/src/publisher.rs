//! Periodic publication of the rendered badge string to the status file.
//!
//! The [`StatusPublisher`] runs one pass per tick: evict stale registry
//! entries, render the snapshot, and — only when the rendered string differs
//! from the last one written — stage it in a sibling temp file and atomically
//! rename it over the canonical status file. A reader of the status file can
//! therefore never observe partial content.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::time;

use relay_core::icons::IconMap;
use relay_core::registry::Registry;
use relay_core::render::render;
use relay_core::settings::RelayConfig;

// ── Defaults ──────────────────────────────────────────────────────────────────

/// Time between publication passes.
const PUBLISH_INTERVAL_MS: u64 = 4_700;

/// How long a source may go without re-reporting before its entry is evicted.
const NOTIFICATION_MAX_LIFETIME_MINS: i64 = 30;

/// Initial value of the last-written marker. No rendered status can collide
/// with it: every fragment starts with an icon glyph, never `-`.
const IMPOSSIBLE_STATUS: &str = "-";

// ── StatusPublisher ───────────────────────────────────────────────────────────

/// Interval-driven writer of the status file.
///
/// Owns the last-written marker that makes publication idempotent: a cycle
/// whose rendered status matches the previous one performs no disk I/O at
/// all.
pub struct StatusPublisher {
    registry: Arc<Registry>,
    icons: IconMap,
    status_path: PathBuf,
    temp_path: PathBuf,
    interval: Duration,
    max_lifetime: chrono::Duration,
    last_written: String,
}

impl StatusPublisher {
    /// Create a publisher for `registry` writing under `config.status_dir`.
    pub fn new(registry: Arc<Registry>, icons: IconMap, config: &RelayConfig) -> Self {
        Self {
            registry,
            icons,
            status_path: config.status_file(),
            temp_path: config.status_temp_file(),
            interval: Duration::from_millis(PUBLISH_INTERVAL_MS),
            max_lifetime: chrono::Duration::minutes(NOTIFICATION_MAX_LIFETIME_MINS),
            last_written: IMPOSSIBLE_STATUS.to_string(),
        }
    }

    /// Run the publication loop until the task is aborted.
    ///
    /// The first pass runs immediately, so the status file appears shortly
    /// after startup even when the registry is empty. Write failures are
    /// logged and the loop continues; there is no retry beyond the natural
    /// one on a later tick whose rendered status differs.
    pub async fn run(mut self) {
        let mut ticker = time::interval(self.interval);
        loop {
            ticker.tick().await;
            if let Err(e) = self.publish_once() {
                tracing::warn!(error = %e, "failed to write notification status");
            }
        }
    }

    /// One eviction + render + publish pass.
    ///
    /// Returns `Ok(true)` when the status file was rewritten, `Ok(false)`
    /// when the rendered status was unchanged and the write was skipped.
    pub fn publish_once(&mut self) -> std::io::Result<bool> {
        let evicted = self.registry.evict_stale(self.max_lifetime, Utc::now());
        if evicted > 0 {
            tracing::debug!(evicted, "evicted stale notifications");
        }

        let status = render(&self.registry.snapshot(), &self.icons);
        self.write_status(status)
    }

    /// Write `status` via the temp file and atomic rename, unless it matches
    /// the last written value.
    ///
    /// The marker is bumped before the write is attempted, so a failed write
    /// is not retried until the rendered status changes again.
    fn write_status(&mut self, status: String) -> std::io::Result<bool> {
        if status == self.last_written {
            return Ok(false);
        }
        self.last_written = status;

        std::fs::write(&self.temp_path, format!("{}\n", self.last_written))?;
        std::fs::rename(&self.temp_path, &self.status_path)?;
        tracing::debug!(status = %self.last_written, path = %self.status_path.display(), "notification status published");
        Ok(true)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn make_publisher(dir: &std::path::Path) -> (StatusPublisher, Arc<Registry>) {
        let registry = Arc::new(Registry::new());
        let config = RelayConfig::new("localhost".to_string(), 18989, dir.to_path_buf())
            .expect("valid config");
        let publisher = StatusPublisher::new(registry.clone(), IconMap::builtin(), &config);
        (publisher, registry)
    }

    fn status_contents(dir: &std::path::Path) -> String {
        std::fs::read_to_string(dir.join(".notifications")).expect("status file readable")
    }

    // ── first cycle ───────────────────────────────────────────────────────────

    #[test]
    fn test_first_cycle_writes_even_when_empty() {
        let tmp = TempDir::new().expect("tempdir");
        let (mut publisher, _registry) = make_publisher(tmp.path());

        let wrote = publisher.publish_once().expect("publish");

        assert!(wrote, "sentinel marker must force the first write");
        assert_eq!(status_contents(tmp.path()), "\n");
    }

    #[test]
    fn test_status_file_has_single_terminated_line() {
        let tmp = TempDir::new().expect("tempdir");
        let (mut publisher, registry) = make_publisher(tmp.path());

        registry.upsert("mail.hobsons.com", "3");
        publisher.publish_once().expect("publish");

        assert_eq!(status_contents(tmp.path()), "σ3\n");
    }

    // ── idempotent publish ────────────────────────────────────────────────────

    #[test]
    fn test_unchanged_status_skips_write() {
        let tmp = TempDir::new().expect("tempdir");
        let (mut publisher, registry) = make_publisher(tmp.path());

        registry.upsert("mail.hobsons.com", "3");
        assert!(publisher.publish_once().expect("first publish"));

        // Remove the file; a skipped cycle must not recreate it.
        std::fs::remove_file(tmp.path().join(".notifications")).expect("remove");
        let wrote = publisher.publish_once().expect("second publish");

        assert!(!wrote);
        assert!(!tmp.path().join(".notifications").exists());
    }

    #[test]
    fn test_changed_status_writes_again() {
        let tmp = TempDir::new().expect("tempdir");
        let (mut publisher, registry) = make_publisher(tmp.path());

        registry.upsert("mail.hobsons.com", "3");
        publisher.publish_once().expect("publish");

        registry.upsert("mail.hobsons.com", "4");
        let wrote = publisher.publish_once().expect("publish");

        assert!(wrote);
        assert_eq!(status_contents(tmp.path()), "σ4\n");
    }

    #[test]
    fn test_suppressing_last_source_publishes_empty_status() {
        let tmp = TempDir::new().expect("tempdir");
        let (mut publisher, registry) = make_publisher(tmp.path());

        registry.upsert("mail.hobsons.com", "3");
        publisher.publish_once().expect("publish");

        registry.upsert("mail.hobsons.com", "0");
        let wrote = publisher.publish_once().expect("publish");

        assert!(wrote);
        assert_eq!(status_contents(tmp.path()), "\n");
    }

    // ── failure policy ────────────────────────────────────────────────────────

    #[test]
    fn test_failed_write_not_retried_until_status_changes() {
        let tmp = TempDir::new().expect("tempdir");
        let missing = tmp.path().join("not-created-yet");
        let registry = Arc::new(Registry::new());
        let config = RelayConfig::new("localhost".to_string(), 18989, missing.clone())
            .expect("valid config");
        let mut publisher = StatusPublisher::new(registry.clone(), IconMap::builtin(), &config);

        registry.upsert("mail.hobsons.com", "3");
        assert!(publisher.publish_once().is_err(), "directory is absent");

        // The directory appears, but the marker was already bumped: the same
        // status is not re-attempted.
        std::fs::create_dir_all(&missing).expect("create dir");
        let wrote = publisher.publish_once().expect("publish");
        assert!(!wrote);
        assert!(!missing.join(".notifications").exists());

        // Once the status changes, publication resumes.
        registry.upsert("mail.hobsons.com", "4");
        assert!(publisher.publish_once().expect("publish"));
        assert_eq!(
            std::fs::read_to_string(missing.join(".notifications")).expect("status file"),
            "σ4\n"
        );
    }

    // ── eviction wiring ───────────────────────────────────────────────────────

    #[test]
    fn test_publish_evicts_before_rendering() {
        let tmp = TempDir::new().expect("tempdir");
        let (mut publisher, registry) = make_publisher(tmp.path());

        // Shrink the lifetime so an entry stamped now is already stale.
        publisher.max_lifetime = chrono::Duration::minutes(-1);
        registry.upsert("mail.hobsons.com", "3");

        publisher.publish_once().expect("publish");

        assert!(registry.snapshot().is_empty());
        assert_eq!(status_contents(tmp.path()), "\n");
    }

    // ── run loop ──────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_run_publishes_promptly_after_start() {
        let tmp = TempDir::new().expect("tempdir");
        let (publisher, registry) = make_publisher(tmp.path());
        registry.upsert("hangouts.google.com", "1");

        let handle = tokio::spawn(publisher.run());

        // The first tick fires immediately; poll briefly for the file.
        let path = tmp.path().join(".notifications");
        let mut found = false;
        for _ in 0..50 {
            if path.exists() {
                found = true;
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        handle.abort();

        assert!(found, "status file should appear shortly after start");
        assert_eq!(status_contents(tmp.path()), "π\n");
    }
}
