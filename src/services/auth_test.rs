use super::*;

// =============================================================================
// normalize_email
// =============================================================================

#[test]
fn normalize_email_accepts_basic_address() {
    assert_eq!(normalize_email("  USER@Example.com "), Some("user@example.com".to_owned()));
}

#[test]
fn normalize_email_rejects_invalid_values() {
    assert_eq!(normalize_email(""), None);
    assert_eq!(normalize_email("user"), None);
    assert_eq!(normalize_email("@example.com"), None);
    assert_eq!(normalize_email("user@"), None);
    assert_eq!(normalize_email("a@b@c"), None);
}

// =============================================================================
// reset codes
// =============================================================================

#[test]
fn normalize_code_accepts_upper_and_normalizes() {
    let code = generate_reset_code();
    assert_eq!(normalize_code(&code), Some(code.clone()));
    assert_eq!(normalize_code("abc234"), Some("ABC234".to_owned()));
}

#[test]
fn normalize_code_rejects_bad_shapes() {
    assert_eq!(normalize_code("abc12"), None);
    assert_eq!(normalize_code("abc1234"), None);
    // Ambiguous characters are not in the alphabet.
    assert_eq!(normalize_code("ABC1I0"), None);
    assert_eq!(normalize_code("ABC12!"), None);
}

#[test]
fn generate_reset_code_shape() {
    let code = generate_reset_code();
    assert_eq!(code.len(), 6);
    assert!(code.chars().all(|c| CODE_ALPHABET.contains(&(c as u8))));
}

#[test]
fn hash_reset_code_is_stable() {
    let a = hash_reset_code("ABC234");
    let b = hash_reset_code("ABC234");
    let c = hash_reset_code("ABC235");
    assert_eq!(a, b);
    assert_ne!(a, c);
}

// =============================================================================
// email template
// =============================================================================

#[test]
fn render_template_injects_email_and_code() {
    let html = render_reset_code_template("user@example.com", "ABC234");
    assert!(html.contains("user@example.com"));
    assert!(html.contains("ABC234"));
    assert!(!html.contains("{{EMAIL}}"));
    assert!(!html.contains("{{CODE}}"));
}

// =============================================================================
// user_message translation table
// =============================================================================

#[test]
fn user_message_translates_known_errors() {
    assert_eq!(
        user_message(&AuthError::InvalidCredentials),
        "Credenciais inválidas. Verifique seu email e senha."
    );
    assert_eq!(user_message(&AuthError::EmailTaken), "Este email já está registrado.");
    assert_eq!(
        user_message(&AuthError::WeakPassword),
        "A senha deve ter pelo menos 6 caracteres."
    );
    assert_eq!(
        user_message(&AuthError::RateLimited),
        "Muitas tentativas. Tente novamente mais tarde."
    );
}

#[test]
fn user_message_delegates_username_errors() {
    let err = AuthError::Username(UsernameError::TooLong);
    assert_eq!(user_message(&err), UsernameError::TooLong.user_message());
}

#[test]
fn user_message_falls_back_to_generic_prefix() {
    let err = AuthError::Db(sqlx::Error::RowNotFound);
    assert!(user_message(&err).starts_with("Erro: "));
}

#[test]
fn mailer_config_from_env_requires_both_vars() {
    // MailerConfig reads fixed var names shared with other tests, so only
    // assert the None path when they are absent from the environment.
    if std::env::var("RESEND_API_KEY").is_err() || std::env::var("RESEND_FROM").is_err() {
        assert!(MailerConfig::from_env().is_none());
    }
}
