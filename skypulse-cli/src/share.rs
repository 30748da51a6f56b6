//! Share targets available to a terminal session.

use anyhow::Context;
use skypulse_core::ShareTarget;
use std::{io::Write, path::PathBuf};

/// Writes the summary to a file, replacing its contents.
#[derive(Debug, Clone)]
pub struct FileShare {
    pub path: PathBuf,
}

impl ShareTarget for FileShare {
    fn share(&self, title: &str, text: &str) -> anyhow::Result<()> {
        std::fs::write(&self.path, format!("{title}\n\n{text}\n"))
            .with_context(|| format!("Failed to write share file {}", self.path.display()))
    }
}

/// Prints the summary so it can be copied from the terminal.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdoutShare;

impl ShareTarget for StdoutShare {
    fn share(&self, _title: &str, text: &str) -> anyhow::Result<()> {
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "{text}").context("Failed to write to stdout")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_share_writes_title_and_text() {
        let dir = tempfile::tempdir().unwrap();
        let target = FileShare { path: dir.path().join("share.txt") };

        target.share("Weather Update", "Sunny in Lisbon").unwrap();

        let written = std::fs::read_to_string(&target.path).unwrap();
        assert_eq!(written, "Weather Update\n\nSunny in Lisbon\n");
    }

    #[test]
    fn file_share_reports_unwritable_path() {
        let dir = tempfile::tempdir().unwrap();
        let target = FileShare { path: dir.path().join("missing").join("share.txt") };

        let err = target.share("t", "x").unwrap_err();
        assert!(err.to_string().contains("Failed to write share file"));
    }
}
