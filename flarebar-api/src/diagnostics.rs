//! Best-effort response diagnostics log.
//!
//! When decoding or content-type guards trip, the full context (endpoint,
//! status, content type, error, UTF-8 and base64 body previews) is appended
//! to a local log file so the raw bytes survive for a bug report. Every
//! operation here swallows its own failures: diagnostics must never break or
//! block the request path that triggered them.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::Utc;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Rotate once the log file exceeds this size.
const MAX_LOG_BYTES: u64 = 1024 * 1024;

/// Bytes of body captured per entry (both encodings).
const BODY_CAPTURE_BYTES: usize = 2048;

/// Append-only diagnostics log with a single `.1` rotation.
#[derive(Debug)]
pub struct DiagnosticsLog {
    path: PathBuf,
}

impl DiagnosticsLog {
    /// Creates a log writing to `path`. The file and its parents are created
    /// on first write.
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// The default log location under the application-support directory.
    ///
    /// - macOS: `~/Library/Application Support/Flarebar/diagnostics/api.log`
    /// - Linux: `~/.config/flarebar/diagnostics/api.log`
    /// - Windows: `%APPDATA%\Flarebar\diagnostics\api.log`
    pub fn default_path() -> PathBuf {
        #[cfg(target_os = "macos")]
        let base = dirs::home_dir()
            .map(|h| {
                h.join("Library")
                    .join("Application Support")
                    .join("Flarebar")
            })
            .unwrap_or_else(|| PathBuf::from("."));

        #[cfg(not(target_os = "macos"))]
        let base = dirs::config_dir()
            .map(|c| c.join("flarebar"))
            .unwrap_or_else(|| PathBuf::from("."));

        base.join("diagnostics").join("api.log")
    }

    /// The log file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one entry. Returns the log path on success, `None` when the
    /// write failed for any reason (the failure itself is only debug-logged).
    pub fn record(
        &self,
        endpoint: &str,
        status: Option<u16>,
        content_type: Option<&str>,
        error: &str,
        body: &[u8],
    ) -> Option<PathBuf> {
        match self.try_record(endpoint, status, content_type, error, body) {
            Ok(()) => Some(self.path.clone()),
            Err(e) => {
                debug!(error = %e, path = %self.path.display(), "Diagnostics write failed");
                None
            }
        }
    }

    fn try_record(
        &self,
        endpoint: &str,
        status: Option<u16>,
        content_type: Option<&str>,
        error: &str,
        body: &[u8],
    ) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        self.rotate_if_needed()?;

        let captured = if body.len() > BODY_CAPTURE_BYTES {
            &body[..BODY_CAPTURE_BYTES]
        } else {
            body
        };

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        writeln!(file, "---")?;
        writeln!(file, "time: {}", Utc::now().to_rfc3339())?;
        writeln!(file, "endpoint: {endpoint}")?;
        writeln!(
            file,
            "status: {}",
            status.map_or_else(|| "-".to_string(), |s| s.to_string())
        )?;
        writeln!(file, "content-type: {}", content_type.unwrap_or("-"))?;
        writeln!(file, "error: {error}")?;
        writeln!(file, "body-utf8: {}", String::from_utf8_lossy(captured))?;
        writeln!(file, "body-base64: {}", BASE64.encode(captured))?;

        Ok(())
    }

    fn rotate_if_needed(&self) -> std::io::Result<()> {
        let Ok(metadata) = fs::metadata(&self.path) else {
            return Ok(());
        };
        if metadata.len() > MAX_LOG_BYTES {
            let rotated = self.path.with_extension("log.1");
            fs::rename(&self.path, rotated)?;
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
