use super::*;

// =============================================================================
// env_bool — uses unique env var names to avoid races with parallel tests.
// =============================================================================

#[test]
fn env_bool_true_variants() {
    for (i, val) in ["1", "true", "yes", "on"].iter().enumerate() {
        let key = format!("__TEST_EB_TRUE_{i}__");
        unsafe { std::env::set_var(&key, val) };
        assert_eq!(env_bool(&key), Some(true), "expected true for {val:?}");
        unsafe { std::env::remove_var(&key) };
    }
}

#[test]
fn env_bool_false_variants() {
    for (i, val) in ["0", "false", "no", "off"].iter().enumerate() {
        let key = format!("__TEST_EB_FALSE_{i}__");
        unsafe { std::env::set_var(&key, val) };
        assert_eq!(env_bool(&key), Some(false), "expected false for {val:?}");
        unsafe { std::env::remove_var(&key) };
    }
}

#[test]
fn env_bool_invalid_or_unset_returns_none() {
    let key = "__TEST_EB_INVALID_7781__";
    unsafe { std::env::set_var(key, "maybe") };
    assert_eq!(env_bool(key), None);
    unsafe { std::env::remove_var(key) };
    assert_eq!(env_bool("__TEST_EB_SURELY_UNSET_XYZ_42__"), None);
}

#[test]
fn env_bool_whitespace_trimmed() {
    let key = "__TEST_EB_WS_882__";
    unsafe { std::env::set_var(key, "  true  ") };
    assert_eq!(env_bool(key), Some(true));
    unsafe { std::env::remove_var(key) };
}

// =============================================================================
// error mapping
// =============================================================================

#[test]
fn credential_errors_map_to_401() {
    assert_eq!(auth_error_to_status(&AuthError::InvalidCredentials), StatusCode::UNAUTHORIZED);
    assert_eq!(auth_error_to_status(&AuthError::ResetFailed), StatusCode::UNAUTHORIZED);
}

#[test]
fn uniqueness_errors_map_to_409() {
    assert_eq!(auth_error_to_status(&AuthError::EmailTaken), StatusCode::CONFLICT);
    assert_eq!(auth_error_to_status(&AuthError::UsernameTaken), StatusCode::CONFLICT);
}

#[test]
fn validation_errors_map_to_400() {
    assert_eq!(auth_error_to_status(&AuthError::InvalidEmail), StatusCode::BAD_REQUEST);
    assert_eq!(auth_error_to_status(&AuthError::WeakPassword), StatusCode::BAD_REQUEST);
    assert_eq!(
        auth_error_to_status(&AuthError::Username(
            crate::services::profile::UsernameError::TooLong
        )),
        StatusCode::BAD_REQUEST
    );
}

#[test]
fn throttling_maps_to_429() {
    assert_eq!(auth_error_to_status(&AuthError::RateLimited), StatusCode::TOO_MANY_REQUESTS);
}

#[test]
fn internal_errors_map_to_500() {
    assert_eq!(
        auth_error_to_status(&AuthError::Db(sqlx::Error::RowNotFound)),
        StatusCode::INTERNAL_SERVER_ERROR
    );
}

// =============================================================================
// request bodies
// =============================================================================

#[test]
fn register_body_deserializes() {
    let body: RegisterBody = serde_json::from_str(
        r#"{"username": "alice", "email": "alice@example.com", "password": "secret1"}"#,
    )
    .unwrap();
    assert_eq!(body.username, "alice");
    assert_eq!(body.email, "alice@example.com");
}

#[test]
fn confirm_reset_body_deserializes() {
    let body: ConfirmResetBody = serde_json::from_str(
        r#"{"email": "a@b.co", "code": "ABC234", "new_password": "secret1"}"#,
    )
    .unwrap();
    assert_eq!(body.code, "ABC234");
}
