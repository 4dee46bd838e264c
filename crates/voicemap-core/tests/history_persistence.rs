//! Integration tests for history persistence through the public API.
//!
//! A store shared between two `HistoryStore` instances stands in for the
//! browser profile surviving a restart.

use std::sync::{Arc, Mutex};

use voicemap_core::{
    Clock, HistoryStore, KeyValueStore, MemoryStore, StorageError, HISTORY_CAPACITY, HISTORY_KEY,
};

#[derive(Clone, Default)]
struct Profile(Arc<Mutex<MemoryStore>>);

impl KeyValueStore for Profile {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.0.lock().unwrap().get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.0.lock().unwrap().set(key, value)
    }
}

/// Clock that advances one second per reading.
struct SteppingClock(Mutex<u64>);

impl Clock for SteppingClock {
    fn now_millis(&self) -> u64 {
        let mut now = self.0.lock().unwrap();
        *now += 1_000;
        *now
    }
}

fn open(profile: &Profile) -> HistoryStore {
    HistoryStore::load(
        Box::new(profile.clone()),
        Box::new(SteppingClock(Mutex::new(1_700_000_000_000))),
    )
}

#[test]
fn test_reload_reproduces_identical_list() {
    // Arrange
    let profile = Profile::default();
    let mut first = open(&profile);
    for city in ["delhi", "mumbai", "paris", "tokyo"] {
        first.append(&format!("Navigated to {city}")).unwrap();
    }
    let doomed = first.entries()[2].id;
    first.delete(doomed).unwrap();

    // Act
    let second = open(&profile);

    // Assert
    assert_eq!(second.entries(), first.entries());
    let texts: Vec<_> = second.entries().iter().map(|e| e.text.as_str()).collect();
    assert_eq!(texts, ["Navigated to tokyo", "Navigated to paris", "Navigated to delhi"]);
}

#[test]
fn test_cap_survives_reload() {
    let profile = Profile::default();
    let mut history = open(&profile);
    for i in 0..25 {
        history.append(&format!("Navigated to stop {i}")).unwrap();
    }

    let reloaded = open(&profile);

    assert_eq!(reloaded.len(), HISTORY_CAPACITY);
    assert_eq!(reloaded.entries()[0].text, "Navigated to stop 24");
    assert_eq!(reloaded.entries()[HISTORY_CAPACITY - 1].text, "Navigated to stop 15");
}

#[test]
fn test_persisted_form_is_json_array_of_id_and_text() {
    let profile = Profile::default();
    let mut history = open(&profile);
    let id = history.append("Navigated to rome").unwrap().unwrap();

    let raw = profile.0.lock().unwrap().raw(HISTORY_KEY).unwrap().to_string();

    assert_eq!(raw, format!(r#"[{{"id":{id},"text":"Navigated to rome"}}]"#));
}

#[test]
fn test_entries_written_by_another_session_are_readable() {
    let raw = r#"[{"id":2,"text":"Navigated to b"},{"id":1,"text":"Navigated to a"}]"#;
    let profile = Profile(Arc::new(Mutex::new(
        MemoryStore::new().with_value(HISTORY_KEY, raw),
    )));

    let history = open(&profile);

    assert_eq!(history.len(), 2);
    assert_eq!(history.entries()[1].text, "Navigated to a");
}
