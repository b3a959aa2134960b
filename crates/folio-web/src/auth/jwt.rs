use axum::http::{header, HeaderMap};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Token lifetime: 24 hours.
pub const TOKEN_TTL_SECS: u64 = 24 * 60 * 60;

pub const UNAUTHORIZED_MESSAGE: &str = "Unauthorized - Invalid or missing token";

/// Who a token is issued to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub name: String,
    pub email: String,
    pub iat: u64,
    pub exp: u64,
}

impl Claims {
    pub fn identity(&self) -> Identity {
        Identity {
            id: self.sub.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: u64,
}

/// Result of [`TokenService::guard`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardOutcome {
    pub authorized: bool,
    pub claims: Option<Claims>,
    pub error: Option<&'static str>,
}

/// Issues and checks HS256 admin tokens. Holds no per-token state.
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl TokenService {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    pub fn issue(&self, identity: &Identity) -> anyhow::Result<IssuedToken> {
        self.issue_at(identity, jsonwebtoken::get_current_timestamp())
    }

    pub fn issue_at(&self, identity: &Identity, now: u64) -> anyhow::Result<IssuedToken> {
        let expires_at = now + TOKEN_TTL_SECS;
        let claims = Claims {
            sub: identity.id.clone(),
            name: identity.name.clone(),
            email: identity.email.clone(),
            iat: now,
            exp: expires_at,
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?;
        Ok(IssuedToken { token, expires_at })
    }

    pub fn verify(&self, token: &str) -> Option<Claims> {
        self.verify_at(token, jsonwebtoken::get_current_timestamp())
    }

    /// Returns the claims of a well-formed, correctly signed, unexpired token.
    ///
    /// Every failure collapses to `None`; callers must not learn which check failed.
    pub fn verify_at(&self, token: &str, now: u64) -> Option<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked below against `now`, without leeway.
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let claims = decode::<Claims>(token, &self.decoding, &validation)
            .ok()?
            .claims;
        (now < claims.exp).then_some(claims)
    }

    pub fn extract_from_headers(&self, headers: &HeaderMap) -> Option<Claims> {
        self.verify(bearer_token(headers)?)
    }

    pub fn guard(&self, headers: &HeaderMap) -> GuardOutcome {
        match self.extract_from_headers(headers) {
            Some(claims) => GuardOutcome {
                authorized: true,
                claims: Some(claims),
                error: None,
            },
            None => GuardOutcome {
                authorized: false,
                claims: None,
                error: Some(UNAUTHORIZED_MESSAGE),
            },
        }
    }
}

/// The token part of `Authorization: Bearer <token>`. The prefix is case-sensitive.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}
