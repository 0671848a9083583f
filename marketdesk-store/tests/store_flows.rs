//! Integration tests for the store: both collections under one data directory.

use marketdesk_store::{LeadForm, PasswordHasher, Signup, SignupOutcome, Store};
use std::sync::Arc;

fn open(dir: &std::path::Path) -> Store {
    Store::open(dir, PasswordHasher::new(4).unwrap()).unwrap()
}

fn signup(username: &str) -> Signup {
    Signup {
        username: username.into(),
        email: format!("{username}@example.com"),
        password: "secret123".into(),
    }
}

#[test]
fn collections_live_side_by_side() {
    let dir = tempfile::tempdir().unwrap();
    let store = open(dir.path());

    store.users.register(&signup("bob")).unwrap();
    store
        .leads
        .submit(LeadForm {
            name: "Jane".into(),
            phone: "555-1234".into(),
            whatsapp: "555-9999".into(),
            insurance: "yes".into(),
            mutualfund: "no".into(),
            stockresearch: "yes".into(),
            expertcall: "no".into(),
        })
        .unwrap();

    assert!(dir.path().join("users.jsonl").exists());
    assert!(dir.path().join("leads.jsonl").exists());
    assert_eq!(store.data_dir(), dir.path());

    let reopened = open(dir.path());
    assert_eq!(reopened.users.count().unwrap(), 1);
    assert_eq!(reopened.leads.all().unwrap()[0].form.whatsapp, "555-9999");
}

#[test]
fn concurrent_identical_signups_create_one_user() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(open(dir.path()));

    let handles: Vec<_> = (0..6)
        .map(|_| {
            let store = Arc::clone(&store);
            std::thread::spawn(move || store.users.register(&signup("carol")).unwrap())
        })
        .collect();
    let created = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .filter(|o| matches!(o, SignupOutcome::Created(_)))
        .count();

    assert_eq!(created, 1);
    assert_eq!(store.users.count().unwrap(), 1);
}

#[test]
fn existing_user_survives_restart_and_blocks_signup() {
    let dir = tempfile::tempdir().unwrap();
    open(dir.path()).users.register(&signup("alice")).unwrap();

    let store = open(dir.path());
    let outcome = store.users.register(&signup("alice")).unwrap();
    assert_eq!(outcome, SignupOutcome::UsernameTaken);
    assert_eq!(store.users.find("alice").unwrap().unwrap().email, "alice@example.com");
}
