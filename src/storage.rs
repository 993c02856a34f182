use anyhow::Context;
use chrono::NaiveDate;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::model::{Document, Kind};
use crate::settings::Settings;

const MARKDOWN_SEED: &str = "# 2026 Reading List (Completed)\n\n\
## Completed Items\n\n\
## In Progress\n\n\
- [ ] Preacher Man\n\n";

/// The JSON document and the completed-items markdown file.
#[derive(Debug, Clone)]
pub struct Storage {
    data_dir: PathBuf,
    data_path: PathBuf,
    markdown_path: PathBuf,
}

impl Storage {
    pub fn new(settings: &Settings) -> Self {
        Self {
            data_dir: settings.data_dir.clone(),
            data_path: settings.data_path(),
            markdown_path: settings.markdown_path.clone(),
        }
    }

    pub fn data_path(&self) -> &Path {
        &self.data_path
    }

    pub fn markdown_path(&self) -> &Path {
        &self.markdown_path
    }

    /// Creates the data directory and seeds both files when missing.
    /// Existing files are never touched.
    pub fn ensure(&self) -> anyhow::Result<()> {
        fs::create_dir_all(&self.data_dir).with_context(|| {
            format!("Failed to create data directory {}", self.data_dir.display())
        })?;

        if !self.markdown_path.exists() {
            // Only opening the vault needs this file; the reminder runs without it.
            match self.seed_markdown() {
                Ok(()) => {
                    log::info!("Created completed list at {}", self.markdown_path.display())
                }
                Err(e) => log::warn!("Completed list not created: {:#}", e),
            }
        }

        if !self.data_path.exists() {
            self.save(&Document::seeded())?;
            log::info!("Created reading list at {}", self.data_path.display());
        }
        Ok(())
    }

    fn seed_markdown(&self) -> anyhow::Result<()> {
        if let Some(parent) = self.markdown_path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create markdown directory {}", parent.display())
            })?;
        }
        fs::write(&self.markdown_path, MARKDOWN_SEED)
            .with_context(|| format!("Failed to seed {}", self.markdown_path.display()))?;
        Ok(())
    }

    /// Reads the document. A file that cannot be read or parsed is backed up
    /// and replaced with an empty document.
    pub fn load(&self) -> anyhow::Result<Document> {
        let parsed = fs::read_to_string(&self.data_path)
            .map_err(anyhow::Error::from)
            .and_then(|content| Ok(serde_json::from_str::<Document>(&content)?));

        match parsed {
            Ok(doc) => Ok(doc),
            Err(e) => {
                log::warn!(
                    "Reading list at {} is unreadable, resetting: {}",
                    self.data_path.display(),
                    e
                );
                self.backup_corrupt();
                let doc = Document::default();
                self.save(&doc)?;
                Ok(doc)
            }
        }
    }

    pub fn save(&self, doc: &Document) -> anyhow::Result<()> {
        let content = serde_json::to_string_pretty(doc)?;
        fs::write(&self.data_path, content)
            .with_context(|| format!("Failed to write {}", self.data_path.display()))?;
        Ok(())
    }

    /// Appends one completed line to the markdown file.
    pub fn append_completed(
        &self,
        title: &str,
        last_page: u64,
        kind: Kind,
        completed_on: NaiveDate,
    ) -> anyhow::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.markdown_path)
            .with_context(|| format!("Failed to open {}", self.markdown_path.display()))?;
        file.write_all(completed_line(title, last_page, kind, completed_on).as_bytes())?;
        Ok(())
    }

    fn backup_corrupt(&self) {
        let stamp = chrono::Utc::now().timestamp();
        let backup = self.data_dir.join(format!("data.backup.{}.json", stamp));
        match fs::copy(&self.data_path, &backup) {
            Ok(_) => log::info!("Backed up unreadable data to {}", backup.display()),
            Err(e) => log::debug!("Backup of unreadable data skipped: {}", e),
        }
    }
}

pub fn completed_line(title: &str, last_page: u64, kind: Kind, completed_on: NaiveDate) -> String {
    format!(
        "- **{}** ({}) — completed at page **{}** on {}\n",
        title,
        kind,
        last_page,
        completed_on.format("%Y-%m-%d")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ReadingItem;
    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;

    fn storage_in(dir: &TempDir) -> Storage {
        Storage::new(&Settings::rooted_at(dir.path()))
    }

    #[test]
    fn fresh_install_seeds_both_files() {
        let dir = TempDir::new().unwrap();
        let storage = storage_in(&dir);
        storage.ensure().unwrap();

        let md = fs::read_to_string(storage.markdown_path()).unwrap();
        assert!(md.starts_with("# 2026 Reading List (Completed)\n"));
        assert!(md.contains("- [ ] Preacher Man"));

        let doc = storage.load().unwrap();
        assert_eq!(doc.active.len(), 3);
        assert_eq!(doc.active[0], ReadingItem::new("Preacher Man", 0, Kind::Book));
        assert_eq!(doc.active[1].kind, Kind::Blog);
        assert_eq!(doc.active[2].kind, Kind::Article);
        assert_eq!(doc.raw_not_before(), None);
    }

    #[test]
    fn ensure_leaves_existing_files_alone() {
        let dir = TempDir::new().unwrap();
        let storage = storage_in(&dir);
        storage.ensure().unwrap();

        let mut doc = Document::default();
        doc.active.push(ReadingItem::new("Mine", 7, Kind::Paper));
        storage.save(&doc).unwrap();
        fs::write(storage.markdown_path(), "custom\n").unwrap();

        storage.ensure().unwrap();
        assert_eq!(storage.load().unwrap(), doc);
        assert_eq!(fs::read_to_string(storage.markdown_path()).unwrap(), "custom\n");
    }

    #[test]
    fn save_then_load_is_identity() {
        let dir = TempDir::new().unwrap();
        let storage = storage_in(&dir);
        storage.ensure().unwrap();

        let mut doc = Document::default();
        doc.active.push(ReadingItem::new("A", 0, Kind::Book));
        doc.active.push(ReadingItem::new("B", 123, Kind::Paper));
        doc.active.push(ReadingItem::new("A", 9, Kind::Blog));
        doc.set_not_before(Some(Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap()));
        storage.save(&doc).unwrap();

        assert_eq!(storage.load().unwrap(), doc);
        let raw = fs::read_to_string(storage.data_path()).unwrap();
        assert!(raw.contains("\"next_popup_not_before\": \"2026-01-02T03:04:05Z\""));
    }

    #[test]
    fn corrupt_file_is_backed_up_and_reset() {
        let dir = TempDir::new().unwrap();
        let storage = storage_in(&dir);
        storage.ensure().unwrap();
        fs::write(storage.data_path(), "{ not json").unwrap();

        let doc = storage.load().unwrap();
        assert_eq!(doc, Document::default());

        let backups: Vec<_> = fs::read_dir(dir.path().join("ReadReminder"))
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .filter(|name| name.starts_with("data.backup."))
            .collect();
        assert_eq!(backups.len(), 1);
        let backup = dir.path().join("ReadReminder").join(&backups[0]);
        assert_eq!(fs::read_to_string(backup).unwrap(), "{ not json");

        // The reset document is what is on disk now.
        assert_eq!(storage.load().unwrap(), Document::default());
    }

    #[test]
    fn non_string_snooze_keeps_the_list() {
        let dir = TempDir::new().unwrap();
        let storage = storage_in(&dir);
        storage.ensure().unwrap();

        for raw in ["1767225600", r#"{"at": "2026-01-01T00:00:00Z"}"#] {
            let content = format!(
                r#"{{"active":[{{"title":"Dune","last_page":412,"kind":"book"}}],"next_popup_not_before":{}}}"#,
                raw
            );
            fs::write(storage.data_path(), content).unwrap();

            let doc = storage.load().unwrap();
            assert_eq!(doc.active, vec![ReadingItem::new("Dune", 412, Kind::Book)], "{raw}");
            assert_eq!(doc.not_before(), None, "{raw}");
        }

        let backups = fs::read_dir(dir.path().join("ReadReminder"))
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().starts_with("data.backup."))
            .count();
        assert_eq!(backups, 0);
    }

    #[test]
    fn unwritable_markdown_location_is_not_fatal() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("not-a-dir");
        fs::write(&blocker, "file").unwrap();

        let mut settings = Settings::rooted_at(dir.path());
        settings.markdown_path = blocker.join("Reading List.md");
        let storage = Storage::new(&settings);

        storage.ensure().unwrap();
        assert!(!storage.markdown_path().exists());
        assert_eq!(storage.load().unwrap(), Document::seeded());
    }

    #[test]
    fn large_page_survives_round_trip() {
        let dir = TempDir::new().unwrap();
        let storage = storage_in(&dir);
        storage.ensure().unwrap();

        let mut doc = Document::default();
        doc.active.push(ReadingItem::new("Long", 4_294_967_296, Kind::Book));
        storage.save(&doc).unwrap();
        assert_eq!(storage.load().unwrap(), doc);
        assert_eq!(
            completed_line("Long", 4_294_967_296, Kind::Book, NaiveDate::from_ymd_opt(2026, 1, 1).unwrap()),
            "- **Long** (book) — completed at page **4294967296** on 2026-01-01\n"
        );
    }

    #[test]
    fn append_completed_adds_one_line() {
        let dir = TempDir::new().unwrap();
        let storage = storage_in(&dir);
        storage.ensure().unwrap();
        let before = fs::read_to_string(storage.markdown_path()).unwrap();

        let day = NaiveDate::from_ymd_opt(2026, 2, 14).unwrap();
        storage.append_completed("Dune", 412, Kind::Book, day).unwrap();

        let after = fs::read_to_string(storage.markdown_path()).unwrap();
        assert!(after.starts_with(&before));
        assert_eq!(
            &after[before.len()..],
            "- **Dune** (book) — completed at page **412** on 2026-02-14\n"
        );
    }
}
