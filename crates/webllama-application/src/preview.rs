//! Preview document lifecycle.
//!
//! The composed document is written in two forms: a stable inline preview
//! file the front end keeps pointing at, and throwaway temporary files.
//! Temporaries are released on a timer after a bounded delay, independent
//! of whether the consuming viewer is still open: a generous window for a
//! detached browser view, a short one for the inline handoff whose stable
//! copy has already taken ownership of the content.

use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use webllama_core::generation::compose_document;
use webllama_core::{FileSet, Result, WebllamaError};
use webllama_infrastructure::WebllamaPaths;

/// File name of the stable inline preview.
pub const INLINE_PREVIEW_NAME: &str = "preview.html";

/// How long a detached preview temp file stays loadable.
pub const DETACHED_RELEASE: Duration = Duration::from_secs(60);

/// How long the inline handoff temp file stays around.
pub const INLINE_RELEASE: Duration = Duration::from_secs(1);

/// Writes composed preview documents and schedules their release.
pub struct PreviewWriter {
    previews_dir: PathBuf,
    detached_release: Duration,
    inline_release: Duration,
}

impl PreviewWriter {
    /// Creates a writer rooted at the given directory.
    pub fn new(previews_dir: impl Into<PathBuf>) -> Self {
        Self {
            previews_dir: previews_dir.into(),
            detached_release: DETACHED_RELEASE,
            inline_release: INLINE_RELEASE,
        }
    }

    /// Creates a writer at the default previews directory
    /// (`~/.local/share/webllama/previews/`).
    pub fn default_location() -> Result<Self> {
        Ok(Self::new(WebllamaPaths::previews_dir()?))
    }

    /// Overrides the release windows (for tests).
    pub fn with_release_windows(mut self, detached: Duration, inline: Duration) -> Self {
        self.detached_release = detached;
        self.inline_release = inline;
        self
    }

    /// Composes the buffers and refreshes the stable inline preview.
    ///
    /// The document lands in a temp file first; once the stable copy has
    /// taken ownership of the content, the temp is released on a short
    /// timer.
    ///
    /// # Returns
    ///
    /// The stable preview path.
    pub fn write_inline(&self, files: &FileSet) -> Result<PathBuf> {
        let temp = self.write_temp(files, "preview")?;

        let stable = self.previews_dir.join(INLINE_PREVIEW_NAME);
        fs::copy(&temp, &stable)
            .map_err(|err| WebllamaError::io(format!("Failed to write inline preview: {err}")))?;

        release_after(temp, self.inline_release);
        Ok(stable)
    }

    /// Composes the buffers into a detached full-page preview file.
    ///
    /// The file is released after a generous but bounded load window.
    pub fn write_detached(&self, files: &FileSet) -> Result<PathBuf> {
        let path = self.write_temp(files, "detached")?;
        release_after(path.clone(), self.detached_release);
        Ok(path)
    }

    /// Writes a detached preview and opens it in the system browser.
    pub fn open_detached(&self, files: &FileSet) -> Result<PathBuf> {
        let path = self.write_detached(files)?;
        open::that(&path)
            .map_err(|err| WebllamaError::io(format!("Failed to open preview: {err}")))?;
        Ok(path)
    }

    /// Removes the stable inline preview, if present.
    pub fn clear_inline(&self) -> Result<()> {
        let stable = self.previews_dir.join(INLINE_PREVIEW_NAME);
        if stable.exists() {
            fs::remove_file(&stable)?;
        }
        Ok(())
    }

    fn write_temp(&self, files: &FileSet, kind: &str) -> Result<PathBuf> {
        fs::create_dir_all(&self.previews_dir)?;

        let document = compose_document(files);
        let name = format!("{kind}-{}.html", chrono::Local::now().timestamp_millis());
        let path = self.previews_dir.join(name);
        fs::write(&path, document)?;
        Ok(path)
    }
}

/// Deletes `path` after `delay` on the background runtime.
fn release_after(path: PathBuf, delay: Duration) {
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        if let Err(err) = tokio::fs::remove_file(&path).await {
            tracing::debug!("preview already released: {err}");
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn fast_writer(dir: &TempDir) -> PreviewWriter {
        PreviewWriter::new(dir.path())
            .with_release_windows(Duration::from_millis(20), Duration::from_millis(20))
    }

    #[tokio::test]
    async fn test_inline_preview_is_stable_after_temp_release() {
        let dir = TempDir::new().unwrap();
        let writer = fast_writer(&dir);
        let files = FileSet::new("<h1>Hi</h1>", "h1{color:red}", "");

        let stable = writer.write_inline(&files).unwrap();
        assert!(stable.ends_with(INLINE_PREVIEW_NAME));

        tokio::time::sleep(Duration::from_millis(100)).await;

        // The handoff temp is gone, the stable copy survives.
        let remaining: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(remaining, vec![INLINE_PREVIEW_NAME]);

        let doc = fs::read_to_string(&stable).unwrap();
        assert!(doc.contains("<h1>Hi</h1>"));
        assert!(doc.contains("h1{color:red}"));
    }

    #[tokio::test]
    async fn test_detached_preview_is_released_after_window() {
        let dir = TempDir::new().unwrap();
        let writer = fast_writer(&dir);

        let path = writer.write_detached(&FileSet::new("<p>x</p>", "", "")).unwrap();
        assert!(path.exists());

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_inline_preview_is_overwritten_in_place() {
        let dir = TempDir::new().unwrap();
        let writer = fast_writer(&dir);

        let first = writer.write_inline(&FileSet::new("<p>one</p>", "", "")).unwrap();
        let second = writer.write_inline(&FileSet::new("<p>two</p>", "", "")).unwrap();
        assert_eq!(first, second);
        assert!(fs::read_to_string(&second).unwrap().contains("two"));
    }

    #[tokio::test]
    async fn test_clear_inline() {
        let dir = TempDir::new().unwrap();
        let writer = fast_writer(&dir);

        writer.write_inline(&FileSet::new("<p>x</p>", "", "")).unwrap();
        writer.clear_inline().unwrap();
        assert!(!dir.path().join(INLINE_PREVIEW_NAME).exists());

        // Clearing when nothing is there is fine.
        writer.clear_inline().unwrap();
    }
}
