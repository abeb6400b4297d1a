use secrecy::SecretString;

use sealnote_core::{
    MemoryStore, Note, NoteStore, StoredNote, UnlockOutcome, VaultConfig, VaultError,
    VaultKeyManager, VaultStatus,
};

fn secret(value: &str) -> SecretString {
    SecretString::from(value.to_string())
}

#[tokio::test]
async fn test_groceries_scenario() {
    let manager = VaultKeyManager::new(MemoryStore::new(), VaultConfig::default())
        .expect("default config should be valid");
    let passphrase = secret("correct horse battery staple");

    manager
        .create_vault(&passphrase, "u1")
        .await
        .expect("vault creation should succeed");

    let note = Note::new("Groceries", "milk, eggs").with_tags(vec!["home".to_string()]);
    let sealed = manager.encrypt_note(&note).expect("encryption should succeed");

    let title = sealed.title.clone().expect("title should be sealed");
    let content = sealed.content.clone().expect("content should be sealed");
    assert_ne!(title.as_str(), "Groceries");
    assert_ne!(content.as_str(), "milk, eggs");
    assert_ne!(sealed.tags[0].as_str(), "home");
    assert_ne!(title, content);
    assert_ne!(title, sealed.tags[0]);
    assert_ne!(content, sealed.tags[0]);

    let stored = StoredNote::Encrypted(sealed);
    manager
        .store()
        .save_note("u1", &stored)
        .expect("save should succeed");
    assert_eq!(manager.decrypt_note(&stored).unwrap(), note);

    manager.lock();
    assert_eq!(manager.status(), VaultStatus::Locked);

    let denied = manager
        .unlock(&secret("wrong pass"), "u1")
        .await
        .expect("wrong passphrase is not an error");
    assert_eq!(denied, UnlockOutcome::Denied);
    assert!(matches!(manager.active_key(), Err(VaultError::NotUnlocked)));

    let granted = manager
        .unlock(&passphrase, "u1")
        .await
        .expect("unlock should succeed");
    assert_eq!(granted, UnlockOutcome::Granted);

    let reloaded = manager
        .store()
        .get_note(&note.id)
        .expect("read should succeed")
        .expect("note should exist");
    assert_eq!(manager.decrypt_note(&reloaded).unwrap(), note);
}

#[tokio::test]
async fn test_unlock_without_vault_points_to_creation() {
    let manager = VaultKeyManager::new(MemoryStore::new(), VaultConfig::default()).unwrap();

    let result = manager.unlock(&secret("correct horse battery staple"), "u1").await;

    assert!(matches!(result, Err(VaultError::NoSuchVault(ref user)) if user == "u1"));
}

#[tokio::test]
async fn test_mixed_collection_loads_around_corrupt_note() {
    let manager = VaultKeyManager::new(MemoryStore::new(), VaultConfig::default()).unwrap();
    manager
        .create_vault(&secret("correct horse battery staple"), "u1")
        .await
        .unwrap();

    let good = Note::new("Plans", "weekend hike").with_pinned(true);
    let legacy = Note::new("Old note", "written before encryption");
    let mut corrupt = manager.encrypt_note(&Note::new("Bills", "rent")).unwrap();
    corrupt.content = Some(sealnote_core::crypto::Envelope::from_encoded("AAAA"));
    let corrupt_id = corrupt.id;

    let store = manager.store();
    store
        .save_note("u1", &StoredNote::Encrypted(manager.encrypt_note(&good).unwrap()))
        .unwrap();
    store
        .save_note("u1", &StoredNote::Plaintext(legacy.clone()))
        .unwrap();
    store.save_note("u1", &StoredNote::Encrypted(corrupt)).unwrap();

    let listed = store.list_notes("u1").unwrap();
    let results = manager.decrypt_notes(&listed).unwrap();

    let mut opened = Vec::new();
    let mut failed = Vec::new();
    for result in results {
        match result {
            Ok(note) => opened.push(note),
            Err(VaultError::DecryptionPartialFailure { note_id }) => failed.push(note_id),
            Err(other) => panic!("unexpected error: {}", other),
        }
    }

    assert_eq!(failed, vec![corrupt_id]);
    assert_eq!(opened.len(), 2);
    assert_eq!(opened[0], good);
    assert!(opened.contains(&legacy));
}
