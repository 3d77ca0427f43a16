use chronicle_core::db::migrations::{current_user_version, latest_version};
use chronicle_core::db::open_db_in_memory;
use chronicle_core::storage::StorageResult;
use chronicle_core::{
    MemoryProvider, Note, NoteDate, NoteId, NoteStore, PersistenceProvider, SqliteProvider,
    StorageError, DEFAULT_STORAGE_KEY,
};

fn sample_notes() -> Vec<Note> {
    vec![
        Note::new(NoteDate::parse("2024-01-02").unwrap(), "line one\nline two"),
        Note::with_id(
            NoteId::parse("legacy-id").unwrap(),
            NoteDate::parse("2023-12-31").unwrap(),
            "unicode ✓ \"quoted\"",
        ),
    ]
}

#[test]
fn load_after_replace_round_trips_with_memory_provider() {
    let provider = MemoryProvider::new();
    let mut store = NoteStore::new(provider.clone(), DEFAULT_STORAGE_KEY);
    let notes = sample_notes();
    store.replace(notes.clone()).unwrap();

    let reopened = NoteStore::new(provider, DEFAULT_STORAGE_KEY);
    assert_eq!(reopened.load(), notes);
}

#[test]
fn sqlite_provider_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("chronicle.sqlite3");
    let notes = sample_notes();

    {
        let provider = SqliteProvider::open(&path).unwrap();
        let mut store = NoteStore::new(provider, DEFAULT_STORAGE_KEY);
        store.replace(notes.clone()).unwrap();
    }

    let provider = SqliteProvider::open(&path).unwrap();
    let store = NoteStore::open(provider, DEFAULT_STORAGE_KEY);
    assert_eq!(store.notes(), notes.as_slice());
}

#[test]
fn persisted_payload_uses_plain_note_shape() {
    let provider = MemoryProvider::new();
    let mut store = NoteStore::new(provider.clone(), "k");
    store
        .replace(vec![Note::with_id(
            NoteId::parse("abc123").unwrap(),
            NoteDate::parse("2024-01-05").unwrap(),
            "hello",
        )])
        .unwrap();

    let raw = provider.get("k").unwrap().unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(
        value,
        serde_json::json!([{"id": "abc123", "date": "2024-01-05", "text": "hello"}])
    );
}

#[test]
fn migrations_stamp_latest_version() {
    let conn = open_db_in_memory().unwrap();
    assert_eq!(current_user_version(&conn).unwrap(), latest_version());
    assert!(SqliteProvider::try_new(conn).is_ok());
}

struct BrokenProvider;

impl PersistenceProvider for BrokenProvider {
    fn get(&self, _key: &str) -> StorageResult<Option<String>> {
        Err(StorageError::Unavailable("offline".to_string()))
    }

    fn set(&self, _key: &str, _value: &str) -> StorageResult<()> {
        Err(StorageError::Unavailable("offline".to_string()))
    }
}

#[test]
fn read_failure_loads_empty_and_write_failure_keeps_previous_state() {
    let mut store = NoteStore::open(BrokenProvider, DEFAULT_STORAGE_KEY);
    assert!(store.notes().is_empty());

    assert!(store.replace(sample_notes()).is_err());
    assert!(store.notes().is_empty());
    assert_eq!(store.revision(), 0);
}
