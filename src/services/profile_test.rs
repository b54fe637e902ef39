use super::*;

// =============================================================================
// validate_username
// =============================================================================

#[test]
fn accepts_typical_usernames() {
    for name in ["vinicius", "vale.noticias", "user_123", "a", "A9", "a.b_c"] {
        assert_eq!(validate_username(name), Ok(()), "expected {name:?} to be valid");
    }
}

#[test]
fn rejects_empty() {
    assert_eq!(validate_username(""), Err(UsernameError::Empty));
}

#[test]
fn rejects_over_thirty_chars() {
    let name = "a".repeat(31);
    assert_eq!(validate_username(&name), Err(UsernameError::TooLong));
    assert_eq!(validate_username(&"a".repeat(30)), Ok(()));
}

#[test]
fn rejects_invalid_characters() {
    for name in ["user name", "user-name", "usuário", "user!", "user@mail"] {
        assert_eq!(
            validate_username(name),
            Err(UsernameError::InvalidChars),
            "expected {name:?} to be rejected"
        );
    }
}

#[test]
fn rejects_leading_or_trailing_separators() {
    for name in [".user", "_user", "user.", "user_"] {
        assert_eq!(
            validate_username(name),
            Err(UsernameError::EdgeSeparator),
            "expected {name:?} to be rejected"
        );
    }
}

#[test]
fn rejects_repeated_separators() {
    assert_eq!(validate_username("us..er"), Err(UsernameError::RepeatedSeparator));
    assert_eq!(validate_username("us__er"), Err(UsernameError::RepeatedSeparator));
}

#[test]
fn mixed_adjacent_separators_are_allowed() {
    // Only same-character runs are rejected; "._" mirrors the client rule.
    assert_eq!(validate_username("a._b"), Ok(()));
}

#[test]
fn every_rejection_has_a_localized_message() {
    let errors = [
        UsernameError::Empty,
        UsernameError::TooLong,
        UsernameError::InvalidChars,
        UsernameError::EdgeSeparator,
        UsernameError::RepeatedSeparator,
    ];
    for err in errors {
        assert!(!err.user_message().is_empty());
    }
}
