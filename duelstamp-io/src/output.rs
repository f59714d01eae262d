//! Plain-text report files, one timestamp log and one statistics summary
//! per run, both prefixed with the run date so consecutive sessions do not
//! clobber each other.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;

pub struct ReportWriter {
    out_dir: PathBuf,
}

impl ReportWriter {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
        }
    }

    fn dated(&self, stem: &str) -> PathBuf {
        self.out_dir
            .join(format!("{}{}", Local::now().format("%Y%m%d"), stem))
    }

    fn write(&self, path: &Path, text: &str) -> Result<()> {
        std::fs::create_dir_all(&self.out_dir)
            .with_context(|| format!("creating `{}`", self.out_dir.display()))?;
        std::fs::write(path, text).with_context(|| format!("writing `{}`", path.display()))
    }

    /// Writes the timestamp log, one line per entry, and returns its path.
    pub fn write_timestamps(&self, lines: &[String]) -> Result<PathBuf> {
        let path = self.dated("timestamps.txt");
        let mut text = lines.join("\n");
        text.push('\n');
        self.write(&path, &text)?;
        Ok(path)
    }

    /// Writes the statistics summary and returns its path.
    pub fn write_statistics(&self, text: &str) -> Result<PathBuf> {
        let path = self.dated("statistics.txt");
        self.write(&path, &format!("{text}\n"))?;
        Ok(path)
    }
}
