//! JSON files for the saved cube and the progress record.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::core::{PersistedState, Progress};

const STATE_FILE: &str = "state.json";
const PROGRESS_FILE: &str = "progress.json";

#[derive(Debug, Clone)]
pub struct Store {
    dir: PathBuf,
}

impl Store {
    /// Use `dir`, creating it if needed.
    pub fn open(dir: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("create data directory {}", dir.display()))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn state_path(&self) -> PathBuf {
        self.dir.join(STATE_FILE)
    }

    pub fn progress_path(&self) -> PathBuf {
        self.dir.join(PROGRESS_FILE)
    }

    /// The saved cube, or `None` when nothing was saved yet.
    ///
    /// Unparseable content yields the default record (see
    /// [`PersistedState::from_json`]).
    pub fn load_state(&self) -> anyhow::Result<Option<PersistedState>> {
        Ok(read_optional(&self.state_path())?.map(|raw| PersistedState::from_json(&raw)))
    }

    pub fn save_state(&self, state: &PersistedState) -> anyhow::Result<()> {
        let json = state.to_json().context("encode cube state")?;
        write_atomic(&self.state_path(), &json)
    }

    pub fn load_progress(&self) -> anyhow::Result<Progress> {
        Ok(read_optional(&self.progress_path())?
            .map(|raw| Progress::from_json(&raw))
            .unwrap_or_default())
    }

    pub fn save_progress(&self, progress: &Progress) -> anyhow::Result<()> {
        let json = progress.to_json().context("encode progress")?;
        write_atomic(&self.progress_path(), &json)
    }
}

fn read_optional(path: &Path) -> anyhow::Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(raw) => Ok(Some(raw)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e).with_context(|| format!("read {}", path.display())),
    }
}

/// Write through a sibling temp file so a crash never leaves half a record.
fn write_atomic(path: &Path, contents: &str) -> anyhow::Result<()> {
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, contents).with_context(|| format!("write {}", tmp.display()))?;
    fs::rename(&tmp, path).with_context(|| format!("replace {}", path.display()))?;
    tracing::trace!(path = %path.display(), "saved");
    Ok(())
}
