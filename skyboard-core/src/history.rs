use std::{fs, path::PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{Result, WeatherError};

/// Number of searches kept.
pub const CAPACITY: usize = 5;

#[derive(Debug, Default, Serialize, Deserialize)]
struct HistoryFile {
    searches: Vec<String>,
}

/// Most-recent-first list of searched city names, saved on every change.
#[derive(Debug, Clone, Default)]
pub struct SearchHistory {
    entries: Vec<String>,
    path: Option<PathBuf>,
}

impl SearchHistory {
    /// History that lives only in memory.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Open the history stored at `path`. A missing file is an empty history;
    /// an unreadable one is logged and treated as empty.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<HistoryFile>(&contents) {
                Ok(file) => file.searches,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "ignoring corrupt search history");
                    Vec::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to read search history");
                Vec::new()
            }
        };

        let mut history = Self {
            entries: Vec::new(),
            path: Some(path),
        };
        for name in entries.into_iter().rev() {
            promote(&mut history.entries, &name);
        }
        history
    }

    /// Open the history in the platform data directory.
    pub fn open_default() -> Result<Self> {
        Ok(Self::open(Self::default_path()?))
    }

    pub fn default_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "skyboard", "skyboard").ok_or_else(|| {
            WeatherError::Persistence("could not determine platform data directory".into())
        })?;
        Ok(dirs.data_dir().join("search_history.json"))
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Put `name` at the front, dropping any case-insensitive duplicate and
    /// anything past [`CAPACITY`].
    pub fn record(&mut self, name: &str) -> Result<()> {
        let name = name.trim();
        if name.is_empty() {
            return Ok(());
        }
        promote(&mut self.entries, name);
        self.save()
    }

    pub fn clear(&mut self) -> Result<()> {
        self.entries.clear();
        self.save()
    }

    fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                WeatherError::Persistence(format!("{}: {e}", parent.display()))
            })?;
        }

        let file = HistoryFile {
            searches: self.entries.clone(),
        };
        let json = serde_json::to_string_pretty(&file)
            .map_err(|e| WeatherError::Persistence(e.to_string()))?;

        fs::write(path, json)
            .map_err(|e| WeatherError::Persistence(format!("{}: {e}", path.display())))
    }
}

fn promote(entries: &mut Vec<String>, name: &str) {
    let lower = name.to_lowercase();
    entries.retain(|e| e.to_lowercase() != lower);
    entries.insert(0, name.to_owned());
    entries.truncate(CAPACITY);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_dedups_case_insensitively_and_promotes() {
        let mut h = SearchHistory::in_memory();
        h.record("Paris").unwrap();
        h.record("paris").unwrap();
        assert_eq!(h.entries(), ["paris"]);

        h.record("Tokyo").unwrap();
        h.record("PARIS").unwrap();
        assert_eq!(h.entries(), ["PARIS", "Tokyo"]);
    }

    #[test]
    fn keeps_five_most_recent() {
        let mut h = SearchHistory::in_memory();
        for name in ["A", "B", "C", "D", "E", "F"] {
            h.record(name).unwrap();
        }
        assert_eq!(h.entries(), ["F", "E", "D", "C", "B"]);
    }

    #[test]
    fn promoting_existing_entry_keeps_others() {
        let mut h = SearchHistory::in_memory();
        for name in ["A", "B", "C", "D", "E"] {
            h.record(name).unwrap();
        }
        h.record("a").unwrap();
        assert_eq!(h.entries(), ["a", "E", "D", "C", "B"]);
    }

    #[test]
    fn blank_names_are_ignored() {
        let mut h = SearchHistory::in_memory();
        h.record("   ").unwrap();
        assert!(h.is_empty());
    }

    #[test]
    fn clear_empties() {
        let mut h = SearchHistory::in_memory();
        h.record("Oslo").unwrap();
        h.clear().unwrap();
        assert!(h.is_empty());
    }

    #[test]
    fn persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("history.json");

        let mut h = SearchHistory::open(&path);
        h.record("Lima").unwrap();
        h.record("Quito").unwrap();

        let reopened = SearchHistory::open(&path);
        assert_eq!(reopened.entries(), ["Quito", "Lima"]);
    }

    #[test]
    fn clear_is_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");

        let mut h = SearchHistory::open(&path);
        h.record("Lima").unwrap();
        h.clear().unwrap();

        let reopened = SearchHistory::open(&path);
        assert!(reopened.is_empty());
    }

    #[test]
    fn corrupt_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        fs::write(&path, "not json").unwrap();

        let h = SearchHistory::open(&path);
        assert!(h.is_empty());
    }

    #[test]
    fn loaded_entries_are_normalized() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        fs::write(
            &path,
            r#"{"searches":["Rome","rome","Oslo","Kyiv","Bern","Riga","Baku"]}"#,
        )
        .unwrap();

        let h = SearchHistory::open(&path);
        assert_eq!(h.entries(), ["Rome", "Oslo", "Kyiv", "Bern", "Riga"]);
    }
}
