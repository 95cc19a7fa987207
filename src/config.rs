use base64::{Engine as _, engine::general_purpose};
use std::env;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub token_encryption_key: Vec<u8>, // raw 32 bytes for AES-256-GCM
    pub google_client_id: String,
    pub google_client_secret: String,
    pub google_redirect_uri: String,
    pub microsoft_client_id: String,
    pub microsoft_client_secret: String,
    pub microsoft_redirect_uri: String,
    pub provider_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Self {
        let key_b64 = env::var("TOKEN_ENCRYPTION_KEY")
            .expect("TOKEN_ENCRYPTION_KEY must be set (base64-encoded 32-byte key)");
        let token_encryption_key = general_purpose::STANDARD
            .decode(&key_b64)
            .expect("TOKEN_ENCRYPTION_KEY must be valid base64");
        assert_eq!(
            token_encryption_key.len(),
            32,
            "TOKEN_ENCRYPTION_KEY must decode to exactly 32 bytes"
        );

        Self {
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            token_encryption_key,
            google_client_id: env::var("GOOGLE_CLIENT_ID").unwrap_or_default(),
            google_client_secret: env::var("GOOGLE_CLIENT_SECRET").unwrap_or_default(),
            google_redirect_uri: env::var("GOOGLE_REDIRECT_URI").unwrap_or_default(),
            microsoft_client_id: env::var("MICROSOFT_CLIENT_ID").unwrap_or_default(),
            microsoft_client_secret: env::var("MICROSOFT_CLIENT_SECRET").unwrap_or_default(),
            microsoft_redirect_uri: env::var("MICROSOFT_REDIRECT_URI").unwrap_or_default(),
            provider_timeout_secs: env::var("PROVIDER_TIMEOUT_SECS")
                .unwrap_or_else(|_| "15".to_string())
                .parse()
                .expect("PROVIDER_TIMEOUT_SECS must be a number"),
        }
    }
}
