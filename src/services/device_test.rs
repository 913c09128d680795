use super::*;

#[test]
fn user_email_key_matches_the_storage_contract() {
    assert_eq!(USER_EMAIL_KEY, "userEmail");
}

#[test]
fn get_missing_key_is_none() {
    let store = MemoryStore::new();
    assert_eq!(store.get(USER_EMAIL_KEY), None);
}

#[test]
fn set_then_get_round_trips() {
    let store = MemoryStore::new();
    store.set(USER_EMAIL_KEY, "a@example.com");
    assert_eq!(store.get(USER_EMAIL_KEY), Some("a@example.com".to_owned()));
}

#[test]
fn set_overwrites_previous_value() {
    let store = MemoryStore::new();
    store.set(USER_EMAIL_KEY, "a@example.com");
    store.set(USER_EMAIL_KEY, "b@example.com");
    assert_eq!(store.get(USER_EMAIL_KEY), Some("b@example.com".to_owned()));
}

#[test]
fn remove_deletes_the_key() {
    let store = MemoryStore::new();
    store.set(USER_EMAIL_KEY, "a@example.com");
    store.remove(USER_EMAIL_KEY);
    assert_eq!(store.get(USER_EMAIL_KEY), None);
}

#[test]
fn remove_missing_key_is_a_noop() {
    let store = MemoryStore::new();
    store.remove("nothing-here");
}

#[test]
fn keys_are_independent() {
    let store = MemoryStore::new();
    store.set("a", "1");
    store.set("b", "2");
    store.remove("a");
    assert_eq!(store.get("b"), Some("2".to_owned()));
}
