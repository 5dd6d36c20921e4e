use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use serde_json::Value;

use crate::domain::models::CallerId;

#[derive(Debug, Deserialize)]
struct Claims {
    #[serde(default)]
    userid: Option<Value>,
}

/// Verifies caller tokens issued by the auth service.
///
/// Tokens are HS256-signed with the shared private key and carry the caller
/// in the `userid` claim. They usually have no `exp`; one that is present is
/// still checked.
pub struct TokenDecoder {
    key: Option<DecodingKey>,
    validation: Validation,
}

impl TokenDecoder {
    pub fn new(private_key: Option<&str>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.required_spec_claims.clear();
        validation.validate_aud = false;

        Self {
            key: private_key
                .filter(|key| !key.is_empty())
                .map(|key| DecodingKey::from_secret(key.as_bytes())),
            validation,
        }
    }

    /// A decoder that treats every caller as anonymous.
    pub fn disabled() -> Self {
        Self::new(None)
    }

    pub fn is_enabled(&self) -> bool {
        self.key.is_some()
    }

    /// Caller id carried by `token`, or `None` for anything that does not
    /// verify.
    pub fn decode(&self, token: &str) -> Option<CallerId> {
        let key = self.key.as_ref()?;

        let claims = match decode::<Claims>(token, key, &self.validation) {
            Ok(data) => data.claims,
            Err(e) => {
                tracing::debug!(error = %e, "Ignoring invalid caller token");
                return None;
            }
        };

        match claims.userid {
            Some(Value::String(id)) if !id.is_empty() => Some(CallerId::new(id)),
            Some(Value::Number(id)) => Some(CallerId::new(id.to_string())),
            _ => {
                tracing::debug!("Caller token has no usable userid claim");
                None
            }
        }
    }
}

impl std::fmt::Debug for TokenDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenDecoder")
            .field("enabled", &self.is_enabled())
            .finish()
    }
}
