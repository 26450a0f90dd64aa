//! Tests for Store
//!
//! These tests verify:
//! - Initialization creates and loads every table
//! - Fatal handling of corrupt tables at startup
//! - Read path (cache hits, lenient and strict fallbacks)
//! - Write path (durability, cache coherence, failures)
//! - Unknown table names

use std::fs;
use std::sync::Arc;

use docstore::config::{Config, SyncStrategy};
use docstore::storage::durable::StagedFile;
use docstore::{Document, ReadPolicy, Store, StoreError, Table};
use parking_lot::Mutex;
use serde_json::{json, Value};
use tempfile::TempDir;
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_temp_store() -> (TempDir, Store) {
    let temp_dir = TempDir::new().unwrap();
    let config = Config::builder()
        .data_dir(temp_dir.path())
        .sync_strategy(SyncStrategy::EveryWrite)
        .build();
    let store = Store::open(config).unwrap();
    (temp_dir, store)
}

fn doc(value: Value) -> Document {
    value.as_object().cloned().unwrap()
}

fn read_disk(store: &Store, table: Table) -> Value {
    let text = fs::read_to_string(store.table_path(table)).unwrap();
    serde_json::from_str(&text).unwrap()
}

/// Collects formatted events so tests can assert on what was logged
#[derive(Clone, Default)]
struct CapturedEvents(Arc<Mutex<Vec<String>>>);

impl CapturedEvents {
    fn contains(&self, needle: &str) -> bool {
        self.0.lock().iter().any(|line| line.contains(needle))
    }
}

struct FieldText(String);

impl Visit for FieldText {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.0.push_str(&format!("{}={:?} ", field.name(), value));
    }
}

impl<S: Subscriber> Layer<S> for CapturedEvents {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut text = FieldText(String::new());
        event.record(&mut text);
        self.0
            .lock()
            .push(format!("{} {}", event.metadata().level(), text.0));
    }
}

// =============================================================================
// Initialization Tests
// =============================================================================

#[test]
fn test_initialize_creates_table_files() {
    let temp_dir = TempDir::new().unwrap();
    let data_dir = temp_dir.path().join("data");

    let store = Store::open_path(&data_dir).unwrap();

    for table in Table::ALL {
        let path = data_dir.join(table.file_name());
        assert!(path.exists(), "missing {}", path.display());
        assert_eq!(fs::read_to_string(&path).unwrap(), "{}\n");
    }
    assert!(data_dir.join("backups").is_dir());
    assert_eq!(store.cached_tables(), Table::ALL.to_vec());
}

#[test]
fn test_initialize_loads_existing_content() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join("servers.json"),
        r#"{ "s1": { "name": "alpha" } }"#,
    )
    .unwrap();

    let store = Store::open_path(temp_dir.path()).unwrap();

    assert_eq!(store.get_server("s1").unwrap()["name"], "alpha");
    assert_eq!(store.entry_count(Table::Servers), 1);
}

#[test]
fn test_initialize_fails_on_corrupt_table() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("users.json"), "{ not json").unwrap();

    let result = Store::open_path(temp_dir.path());

    assert!(matches!(
        result,
        Err(StoreError::CorruptTable { table: "users", .. })
    ));
    // The corrupt file must be left for an operator to inspect
    assert_eq!(
        fs::read_to_string(temp_dir.path().join("users.json")).unwrap(),
        "{ not json"
    );
}

#[test]
fn test_initialize_fails_on_non_object_table() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("activity_logs.json"), "[]").unwrap();

    let result = Store::open_path(temp_dir.path());

    assert!(matches!(
        result,
        Err(StoreError::CorruptTable { table: "logs", .. })
    ));
}

#[test]
fn test_initialize_fails_when_data_dir_is_a_file() {
    let temp_dir = TempDir::new().unwrap();
    let not_a_dir = temp_dir.path().join("occupied");
    fs::write(&not_a_dir, "").unwrap();

    let result = Store::open_path(&not_a_dir);

    assert!(matches!(result, Err(StoreError::Io(_))));
}

#[test]
fn test_new_does_not_touch_disk() {
    let temp_dir = TempDir::new().unwrap();
    let data_dir = temp_dir.path().join("data");

    let store = Store::new(Config::builder().data_dir(&data_dir).build());

    assert!(!data_dir.exists());
    assert!(store.cached_tables().is_empty());
}

// =============================================================================
// Read Path Tests
// =============================================================================

#[test]
fn test_read_returns_cached_document() {
    let (_temp, store) = setup_temp_store();

    let first = store.read("users").unwrap();
    let second = store.read("users").unwrap();

    assert!(Arc::ptr_eq(&first, &second));
}

#[test]
fn test_read_loads_uncached_table() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("plans.json"), r#"{"basic": {"price": 5}}"#).unwrap();
    let store = Store::new(Config::builder().data_dir(temp_dir.path()).build());

    let plans = store.read("plans").unwrap();

    assert_eq!(plans["basic"]["price"], 5);
    assert_eq!(store.cached_tables(), vec![Table::Plans]);
}

#[test]
fn test_lenient_read_falls_back_and_logs() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("users.json"), "garbage").unwrap();
    let store = Store::new(Config::builder().data_dir(temp_dir.path()).build());

    let events = CapturedEvents::default();
    let subscriber = tracing_subscriber::registry().with(events.clone());

    let users = tracing::subscriber::with_default(subscriber, || store.read("users").unwrap());

    assert!(users.is_empty());
    assert!(events.contains("WARN"));
    assert!(events.contains("table=users"));
    // The fallback is not cached; fixing the file makes the data visible
    assert!(store.cached_tables().is_empty());
    fs::write(temp_dir.path().join("users.json"), r#"{"u1": {}}"#).unwrap();
    assert!(store.read("users").unwrap().contains_key("u1"));
}

#[test]
fn test_strict_read_surfaces_failure() {
    let temp_dir = TempDir::new().unwrap();
    let store = Store::new(Config::builder().data_dir(temp_dir.path()).build());

    let result = store.read_with("servers", ReadPolicy::Strict);

    assert!(matches!(
        result,
        Err(StoreError::ReadFailed { table: "servers", .. })
    ));
}

#[test]
fn test_read_never_rereads_disk_once_cached() {
    let (_temp, store) = setup_temp_store();
    store.write("plans", doc(json!({"gold": 1}))).unwrap();

    // Changes made behind the store's back are not observed
    fs::write(store.table_path(Table::Plans), r#"{"silver": 2}"#).unwrap();

    let plans = store.read("plans").unwrap();
    assert!(plans.contains_key("gold"));
    assert!(!plans.contains_key("silver"));
}

// =============================================================================
// Write Path Tests
// =============================================================================

#[test]
fn test_write_persists_pretty_json() {
    let (_temp, store) = setup_temp_store();

    store.write("servers", doc(json!({"s1": {"name": "alpha"}}))).unwrap();

    let text = fs::read_to_string(store.table_path(Table::Servers)).unwrap();
    assert_eq!(text, "{\n  \"s1\": {\n    \"name\": \"alpha\"\n  }\n}\n");
    assert!(!store.data_dir().join("servers.json.tmp").exists());
}

#[test]
fn test_write_survives_reopen() {
    let temp_dir = TempDir::new().unwrap();
    {
        let store = Store::open_path(temp_dir.path()).unwrap();
        store.write("plans", doc(json!({"gold": {"price": 10}}))).unwrap();
    }

    let store = Store::open_path(temp_dir.path()).unwrap();
    assert_eq!(store.read("plans").unwrap()["gold"]["price"], 10);
}

#[test]
fn test_cache_coherent_after_write_without_file() {
    let (_temp, store) = setup_temp_store();
    let document = doc(json!({"u1": {"tier": "pro"}}));

    store.write("users", document.clone()).unwrap();
    fs::remove_file(store.table_path(Table::Users)).unwrap();

    let users = store.read_with("users", ReadPolicy::Strict).unwrap();
    assert_eq!(*users, document);
}

#[test]
fn test_write_failure_leaves_committed_state() {
    let (_temp, store) = setup_temp_store();
    store.write("users", doc(json!({"keep": true}))).unwrap();

    // A directory where the temp file belongs makes staging fail
    let temp_path = store.data_dir().join("users.json.tmp");
    fs::create_dir(&temp_path).unwrap();

    let result = store.write("users", doc(json!({"lost": true})));

    assert!(matches!(
        result,
        Err(StoreError::WriteFailed { table: "users", .. })
    ));
    assert_eq!(read_disk(&store, Table::Users), json!({"keep": true}));
    assert!(store.read("users").unwrap().contains_key("keep"));

    // The slot was released: the next write goes through
    fs::remove_dir(&temp_path).unwrap();
    store.write("users", doc(json!({"next": true}))).unwrap();
    assert_eq!(read_disk(&store, Table::Users), json!({"next": true}));
    assert_eq!(store.pending_writes(Table::Users), 0);
}

#[test]
fn test_failed_update_keeps_cache() {
    let (_temp, store) = setup_temp_store();
    store.write("servers", doc(json!({"s1": 1}))).unwrap();
    fs::create_dir(store.data_dir().join("servers.json.tmp")).unwrap();

    let result = store.update(Table::Servers, |servers| {
        servers.insert("s2".to_string(), json!(2));
    });

    assert!(result.is_err());
    assert!(!store.read("servers").unwrap().contains_key("s2"));
}

#[test]
fn test_update_refuses_unreadable_table() {
    let temp_dir = TempDir::new().unwrap();
    let users_path = temp_dir.path().join("users.json");
    let corrupt = r#"{"a": {"tier": "pro"}, "b": BAD"#;
    fs::write(&users_path, corrupt).unwrap();
    let store = Store::new(Config::builder().data_dir(temp_dir.path()).build());

    let result = store.set_user_plan("c", &json!({"tier": "free"}));

    assert!(matches!(
        result,
        Err(StoreError::ReadFailed { table: "users", .. })
    ));
    assert_eq!(fs::read_to_string(&users_path).unwrap(), corrupt);
    assert!(!temp_dir.path().join("users.json.tmp").exists());
}

#[test]
fn test_update_treats_missing_file_as_empty() {
    let temp_dir = TempDir::new().unwrap();
    let store = Store::new(Config::builder().data_dir(temp_dir.path()).build());

    store.set_server("s1", &json!({"name": "alpha"})).unwrap();

    let on_disk = read_disk(&store, Table::Servers);
    assert_eq!(on_disk["s1"]["name"], "alpha");
    assert_eq!(on_disk.as_object().unwrap().len(), 1);
}

#[test]
fn test_update_returns_closure_output() {
    let (_temp, store) = setup_temp_store();

    let len = store
        .update(Table::Plans, |plans| {
            plans.insert("a".to_string(), json!(1));
            plans.insert("b".to_string(), json!(2));
            plans.len()
        })
        .unwrap();

    assert_eq!(len, 2);
    assert_eq!(read_disk(&store, Table::Plans), json!({"a": 1, "b": 2}));
}

#[test]
fn test_os_buffered_strategy_still_commits() {
    let temp_dir = TempDir::new().unwrap();
    let config = Config::builder()
        .data_dir(temp_dir.path())
        .sync_strategy(SyncStrategy::OsBuffered)
        .build();
    let store = Store::open(config).unwrap();

    store.write("logs", doc(json!({"1": {}}))).unwrap();

    assert_eq!(read_disk(&store, Table::Logs), json!({"1": {}}));
}

// =============================================================================
// Crash Simulation Tests
// =============================================================================

#[test]
fn test_interrupted_write_leaves_file_unchanged() {
    let (temp, store) = setup_temp_store();
    store.write("users", doc(json!({"v": 1}))).unwrap();
    let path = store.table_path(Table::Users);
    let temp_path = store.data_dir().join("users.json.tmp");

    // Stage the next version but "crash" before the rename
    let staged = StagedFile::stage(
        &doc(json!({"v": 2})),
        &path,
        &temp_path,
        SyncStrategy::EveryWrite,
    )
    .unwrap();
    assert_eq!(staged.temp_path(), temp_path.as_path());
    drop(staged);
    drop(store);

    assert_eq!(read_disk_path(&path), json!({"v": 1}));
    assert!(temp_path.exists());

    // Restart discards the orphaned temp file and keeps the committed data
    let store = Store::open_path(temp.path()).unwrap();
    assert!(!temp_path.exists());
    assert_eq!(store.read("users").unwrap()["v"], 1);
}

fn read_disk_path(path: &std::path::Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

// =============================================================================
// Unknown Table Tests
// =============================================================================

#[test]
fn test_read_unknown_table() {
    let (_temp, store) = setup_temp_store();

    let result = store.read("nonexistent");

    assert!(matches!(result, Err(StoreError::UnknownTable(name)) if name == "nonexistent"));
}

#[test]
fn test_write_unknown_table() {
    let (temp, store) = setup_temp_store();

    let result = store.write("nonexistent", Document::new());

    assert!(matches!(result, Err(StoreError::UnknownTable(_))));
    assert!(!temp.path().join("nonexistent").exists());
    assert!(!temp.path().join("nonexistent.json").exists());
}

#[test]
fn test_file_name_is_not_a_table_name() {
    let (_temp, store) = setup_temp_store();

    // The registry maps "logs" to activity_logs.json; the file name is not an alias
    assert!(matches!(
        store.read("activity_logs"),
        Err(StoreError::UnknownTable(_))
    ));
    assert!(store.read("logs").is_ok());
}
