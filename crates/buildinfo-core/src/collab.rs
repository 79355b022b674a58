//! Side-effecting services the generator calls for synthesized fields.

use std::path::Path;
use std::process::Command;

use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset, Local};

/// Describes the current revision of a source-control repository.
pub trait RevisionSource {
    fn describe(&self, repository: &Path) -> Result<String>;
}

/// Supplies the current local time.
pub trait Clock {
    fn now(&self) -> Result<DateTime<FixedOffset>>;
}

/// `git describe --always --tags --dirty=-D --broken=-B` run inside the repository.
#[derive(Debug, Clone, Copy, Default)]
pub struct GitDescribe;

impl RevisionSource for GitDescribe {
    fn describe(&self, repository: &Path) -> Result<String> {
        let out = Command::new("git")
            .arg("-C")
            .arg(repository)
            .args(["describe", "--always", "--tags", "--dirty=-D", "--broken=-B"])
            .output()
            .with_context(|| format!("run git describe: {}", repository.display()))?;
        if !out.status.success() {
            anyhow::bail!(
                "git describe failed for {}:\n{}",
                repository.display(),
                String::from_utf8_lossy(&out.stderr).trim_end()
            );
        }
        let text = String::from_utf8(out.stdout).context("decode git describe output as UTF-8")?;
        Ok(text.trim().to_string())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Result<DateTime<FixedOffset>> {
        Ok(Local::now().fixed_offset())
    }
}
