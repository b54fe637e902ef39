use super::*;

#[test]
fn hash_then_verify_round_trips() {
    let hash = hash_password("correct horse").unwrap();
    assert!(verify_password("correct horse", &hash));
}

#[test]
fn wrong_password_fails_verification() {
    let hash = hash_password("correct horse").unwrap();
    assert!(!verify_password("battery staple", &hash));
}

#[test]
fn same_password_hashes_differently() {
    let a = hash_password("secret123").unwrap();
    let b = hash_password("secret123").unwrap();
    assert_ne!(a, b);
}

#[test]
fn malformed_stored_hash_verifies_false() {
    assert!(!verify_password("secret123", "not-a-phc-hash"));
    assert!(!verify_password("secret123", ""));
}
