use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};

/// Secret shared by the verifier and the token helpers in unit tests
pub const TEST_SECRET: &str = "firerest-test-secret";

/// Sign `claims` with HS256, filling `iat` and a one-hour `exp` when absent.
pub fn sign_token(secret: &str, mut claims: Value) -> String {
    let now = Utc::now();
    if let Some(map) = claims.as_object_mut() {
        map.entry("iat").or_insert_with(|| json!(now.timestamp()));
        map.entry("exp")
            .or_insert_with(|| json!((now + Duration::hours(1)).timestamp()));
    }

    encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes()))
        .expect("sign test token")
}

/// Signed token for `uid` carrying `role`.
pub fn token_for(uid: &str, role: &str) -> String {
    sign_token(TEST_SECRET, json!({"sub": uid, "role": role}))
}
