use std::sync::Arc;

use vibe_state::{FingerprintResolver, IdentityStore, MemoryBackend};

fn resolver() -> (FingerprintResolver, Arc<IdentityStore>, Arc<MemoryBackend>) {
    let fps = Arc::new(MemoryBackend::new());
    let identity = Arc::new(IdentityStore::with_backends(
        fps.clone(),
        Arc::new(MemoryBackend::new()),
    ));
    (FingerprintResolver::new(identity.clone()), identity, fps)
}

#[test]
fn test_same_fingerprint_new_volatile_token_keeps_identifier() {
    let (r, identity, _) = resolver();
    assert_eq!(r.resolve(Some("fp123-tokA"), "1.2.3.4").unwrap(), "fp123");
    assert_eq!(r.resolve(Some("fp123-tokB"), "1.2.3.4").unwrap(), "fp123");
    assert_eq!(
        identity.tokens_for("fp123"),
        vec!["tokA".to_string(), "tokB".to_string()]
    );
}

#[test]
fn test_no_token_uses_address_without_mutation() {
    let (r, identity, fps) = resolver();
    assert_eq!(r.resolve(None, "5.6.7.8").unwrap(), "5.6.7.8");
    assert!(identity.fingerprints().is_empty());
    assert_eq!(fps.writes(), 0);
}

#[test]
fn test_repeated_token_writes_once() {
    let (r, _, fps) = resolver();
    for _ in 0..5 {
        assert_eq!(r.resolve(Some("fp9-same"), "1.1.1.1").unwrap(), "fp9");
    }
    assert_eq!(fps.writes(), 1);
}

#[test]
fn test_new_fingerprint_is_a_new_identifier() {
    let (r, identity, _) = resolver();
    assert_eq!(r.resolve(Some("fpA-tok"), "1.1.1.1").unwrap(), "fpA");
    assert_eq!(r.resolve(Some("fpB-tok"), "1.1.1.1").unwrap(), "fpB");
    assert_eq!(identity.fingerprints().len(), 2);
}

#[test]
fn test_address_is_ignored_once_token_present() {
    let (r, _, _) = resolver();
    let a = r.resolve(Some("fp1-x"), "10.0.0.1").unwrap();
    let b = r.resolve(Some("fp1-y"), "10.0.0.2").unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_fingerprints_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    {
        let r = FingerprintResolver::new(Arc::new(IdentityStore::open(dir.path())));
        r.resolve(Some("fp77-first"), "1.1.1.1").unwrap();
    }
    let identity = Arc::new(IdentityStore::open(dir.path()));
    let r = FingerprintResolver::new(identity.clone());
    assert_eq!(r.resolve(Some("fp77-second"), "2.2.2.2").unwrap(), "fp77");
    assert_eq!(
        identity.tokens_for("fp77"),
        vec!["first".to_string(), "second".to_string()]
    );

    let raw = std::fs::read_to_string(dir.path().join("device_fingerprints.json")).unwrap();
    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(json, serde_json::json!({"fp77": ["first", "second"]}));
}

#[test]
fn test_corrupted_fingerprint_file_starts_empty() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("device_fingerprints.json"), "{{{").unwrap();
    let identity = Arc::new(IdentityStore::open(dir.path()));
    let r = FingerprintResolver::new(identity.clone());
    assert_eq!(r.resolve(Some("fp1-a"), "1.1.1.1").unwrap(), "fp1");
    assert_eq!(identity.tokens_for("fp1"), vec!["a".to_string()]);
}
