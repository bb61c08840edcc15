use anyhow::Result;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use uuid::Uuid;

use parley_types::api::Claims;

use crate::keys::KeyPair;

pub const TOKEN_LIFETIME_DAYS: i64 = 30;

/// Issues and verifies EdDSA access tokens.
pub struct TokenSigner {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenSigner {
    pub fn new(keys: &KeyPair) -> Result<Self> {
        Ok(Self {
            encoding: EncodingKey::from_ed_pem(keys.private_pem.as_bytes())?,
            decoding: DecodingKey::from_ed_pem(keys.public_pem.as_bytes())?,
            validation: Validation::new(Algorithm::EdDSA),
        })
    }

    pub fn issue(&self, user_id: Uuid, email: &str) -> Result<String> {
        let claims = Claims {
            sub: user_id,
            email: email.to_string(),
            exp: (chrono::Utc::now() + chrono::Duration::days(TOKEN_LIFETIME_DAYS)).timestamp()
                as usize,
        };

        let token = encode(&Header::new(Algorithm::EdDSA), &claims, &self.encoding)?;
        Ok(token)
    }

    /// Checks signature and expiry.
    pub fn verify(&self, token: &str) -> Result<Claims> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation)?;
        Ok(data.claims)
    }
}
