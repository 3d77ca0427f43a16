use crate::model::note::{Note, NoteId};
use crate::storage::{PersistenceProvider, StorageError};
use log::{info, warn};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use tokio::sync::watch;

/// Key used by earlier builds for the serialized note list.
pub const DEFAULT_STORAGE_KEY: &str = "chronicle-notes";

/// Failure while committing a note list.
#[derive(Debug)]
pub enum StoreError {
    Serialize(serde_json::Error),
    Storage(StorageError),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Serialize(err) => write!(f, "failed to serialize notes: {err}"),
            Self::Storage(err) => write!(f, "failed to persist notes: {err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Serialize(err) => Some(err),
            Self::Storage(err) => Some(err),
        }
    }
}

impl From<StorageError> for StoreError {
    fn from(value: StorageError) -> Self {
        Self::Storage(value)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialize(value)
    }
}

/// Session-scoped note list backed by a [`PersistenceProvider`].
///
/// The store is single-writer: it is mutated only through [`NoteStore::replace`]
/// from the owning thread. Observers follow commits through
/// [`NoteStore::subscribe`], which yields the latest revision number.
pub struct NoteStore<P: PersistenceProvider> {
    provider: P,
    key: String,
    notes: Vec<Note>,
    revision: watch::Sender<u64>,
}

impl<P: PersistenceProvider> NoteStore<P> {
    /// Creates an empty store without touching the provider.
    pub fn new(provider: P, key: impl Into<String>) -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            provider,
            key: key.into(),
            notes: Vec::new(),
            revision,
        }
    }

    /// Creates a store and seeds it from the provider via [`NoteStore::load`].
    pub fn open(provider: P, key: impl Into<String>) -> Self {
        let mut store = Self::new(provider, key);
        store.notes = store.load();
        store
    }

    /// Reads the full note list from the provider.
    ///
    /// Never fails: a missing key, a provider error or an unparsable payload
    /// all yield an empty list. Duplicate ids keep their first occurrence.
    pub fn load(&self) -> Vec<Note> {
        let raw = match self.provider.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                info!("event=store_load module=store status=ok notes=0 source=empty");
                return Vec::new();
            }
            Err(err) => {
                warn!("event=store_load module=store status=error error_code=read_failed error={err}");
                return Vec::new();
            }
        };

        let parsed: Vec<Note> = match serde_json::from_str(&raw) {
            Ok(notes) => notes,
            Err(err) => {
                warn!(
                    "event=store_load module=store status=error error_code=payload_invalid line={} column={}",
                    err.line(),
                    err.column()
                );
                return Vec::new();
            }
        };

        let mut seen: HashSet<NoteId> = HashSet::with_capacity(parsed.len());
        let total = parsed.len();
        let notes: Vec<Note> = parsed
            .into_iter()
            .filter(|note| seen.insert(note.id.clone()))
            .collect();
        if notes.len() != total {
            warn!(
                "event=store_load module=store status=ok dropped_duplicates={}",
                total - notes.len()
            );
        }
        info!(
            "event=store_load module=store status=ok notes={} source=provider",
            notes.len()
        );
        notes
    }

    /// Persists `notes` and commits them as the in-memory list.
    ///
    /// # Errors
    /// - Returns [`StoreError`] when serialization or the provider write
    ///   fails; the previously committed list stays active in that case.
    pub fn replace(&mut self, notes: Vec<Note>) -> Result<(), StoreError> {
        let payload = serde_json::to_string(&notes)?;
        if let Err(err) = self.provider.set(&self.key, &payload) {
            warn!(
                "event=store_replace module=store status=error error_code=write_failed notes={} error={err}",
                notes.len()
            );
            return Err(err.into());
        }

        self.notes = notes;
        let mut committed = 0;
        self.revision.send_modify(|revision| {
            *revision += 1;
            committed = *revision;
        });
        info!(
            "event=store_replace module=store status=ok notes={} revision={committed}",
            self.notes.len()
        );
        Ok(())
    }

    /// Currently committed notes in insertion order.
    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    /// Number of commits since this store was created.
    pub fn revision(&self) -> u64 {
        *self.revision.borrow()
    }

    /// Subscribes to commit notifications.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn storage_key(&self) -> &str {
        &self.key
    }
}

#[cfg(test)]
mod tests {
    use super::{NoteStore, DEFAULT_STORAGE_KEY};
    use crate::model::note::{Note, NoteDate};
    use crate::storage::{MemoryProvider, PersistenceProvider};

    fn day(value: &str) -> NoteDate {
        NoteDate::parse(value).unwrap()
    }

    #[test]
    fn load_returns_empty_for_missing_or_malformed_payload() {
        let store = NoteStore::new(MemoryProvider::new(), DEFAULT_STORAGE_KEY);
        assert!(store.load().is_empty());

        let garbage = MemoryProvider::with_entry(DEFAULT_STORAGE_KEY, "{not json");
        let store = NoteStore::new(garbage, DEFAULT_STORAGE_KEY);
        assert!(store.load().is_empty());

        let bad_date = MemoryProvider::with_entry(
            DEFAULT_STORAGE_KEY,
            r#"[{"id":"a","date":"yesterday","text":"x"}]"#,
        );
        let store = NoteStore::new(bad_date, DEFAULT_STORAGE_KEY);
        assert!(store.load().is_empty());
    }

    #[test]
    fn load_accepts_legacy_payload_and_drops_duplicate_ids() {
        let provider = MemoryProvider::with_entry(
            DEFAULT_STORAGE_KEY,
            r#"[
                {"id":"k3j2h1","date":"2024-01-02","text":"first"},
                {"id":"k3j2h1","date":"2024-01-03","text":"dup"},
                {"id":"zz9","date":"2024-01-02","text":"second"}
            ]"#,
        );
        let store = NoteStore::open(provider, DEFAULT_STORAGE_KEY);
        let texts: Vec<&str> = store.notes().iter().map(|n| n.text.as_str()).collect();
        assert_eq!(texts, vec!["first", "second"]);
    }

    #[test]
    fn replace_persists_and_bumps_revision() {
        let provider = MemoryProvider::new();
        let mut store = NoteStore::new(provider.clone(), "notes");
        let mut watcher = store.subscribe();

        store
            .replace(vec![Note::new(day("2024-01-02"), "hello")])
            .expect("replace should succeed");

        assert_eq!(store.revision(), 1);
        assert!(watcher.has_changed().unwrap());
        assert_eq!(*watcher.borrow_and_update(), 1);
        let raw = provider.get("notes").unwrap().expect("payload written");
        assert!(raw.contains("\"date\":\"2024-01-02\""));
    }
}
