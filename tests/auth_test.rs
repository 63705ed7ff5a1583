//! Integration test for JWT auth validation.
//!
//! Mints a JWT locally using the same HS256 secret the server would use,
//! then validates it through `validate_token`. No running server or database
//! is needed.
//!
//! Run with: `cargo test --test auth_test`

use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use uuid::Uuid;

use wandernext_backend::auth::jwt::{Claims, validate_token};

/// A fake secret for testing — never use the real one in tests committed to git.
const TEST_SECRET: &str = "test-secret-at-least-256-bits-long-for-hs256-xxxxxxx";

/// Helper: mint a JWT signed with HS256 using the test secret.
fn mint_test_token(sub: &str, email: &str, expires_in: i64) -> String {
    let now = Utc::now().timestamp();

    let claims = Claims {
        sub: sub.to_string(),
        exp: (now + expires_in) as usize,
        iat: Some(now as usize),
        email: Some(email.to_string()),
        name: Some("Test Traveler".to_string()),
        avatar_url: None,
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
    )
    .expect("Failed to encode test JWT")
}

#[test]
fn valid_token_round_trips_claims() {
    let user_id = Uuid::new_v4();
    let token = mint_test_token(&user_id.to_string(), "traveler@example.com", 3600);

    let claims = validate_token(&token, TEST_SECRET).expect("token should validate");
    assert_eq!(claims.user_id().unwrap(), user_id);
    assert_eq!(claims.email.as_deref(), Some("traveler@example.com"));
}

#[test]
fn token_signed_with_wrong_secret_is_rejected() {
    let token = mint_test_token(&Uuid::new_v4().to_string(), "traveler@example.com", 3600);
    assert!(validate_token(&token, "a-completely-different-secret").is_err());
}

#[test]
fn expired_token_is_rejected() {
    let token = mint_test_token(&Uuid::new_v4().to_string(), "traveler@example.com", -3600);
    assert!(validate_token(&token, TEST_SECRET).is_err());
}

#[test]
fn non_uuid_subject_is_rejected() {
    let token = mint_test_token("not-a-uuid", "traveler@example.com", 3600);
    let claims = validate_token(&token, TEST_SECRET).expect("signature is still valid");
    assert!(claims.user_id().is_err());
}
