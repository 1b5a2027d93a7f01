//! Admin sessions.
//!
//! There is a single admin identity, protected by a shared password. A successful login is exchanged for a short-lived
//! HS256 JWT carrying `{"role": "admin"}`, which the admin routes expect as a bearer token. Sessions cannot be revoked;
//! they simply expire.
use std::future::{ready, Ready};

use actix_web::{dev::Payload, FromRequest, HttpMessage, HttpRequest};
use chrono::{DateTime, Duration, Utc};
use fh_common::Secret;
use hmac::{Hmac, Mac};
use jwt_compact::{
    alg::{Hs256, Hs256Key},
    AlgorithmExt,
    Claims,
    Header,
    TimeOptions,
    Token,
    UntrustedToken,
};
use log::*;
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::{
    config::AdminConfig,
    errors::{AuthError, ServerError},
};

type HmacSha256 = Hmac<Sha256>;

pub const ADMIN_ROLE: &str = "admin";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminClaims {
    pub role: String,
}

impl AdminClaims {
    pub fn admin() -> Self {
        Self { role: ADMIN_ROLE.to_string() }
    }
}

/// Handlers behind [`crate::middleware::AdminGuardFactory`] can take `AdminClaims` as an argument.
impl FromRequest for AdminClaims {
    type Error = ServerError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let claims = req.extensions().get::<AdminClaims>().cloned();
        ready(claims.ok_or_else(|| {
            warn!("🔐️ No admin claims found in request extensions. Is the route missing the admin guard?");
            ServerError::AuthenticationError(AuthError::Unauthorized)
        }))
    }
}

/// Issues and checks admin session tokens.
#[derive(Clone)]
pub struct AdminSessionGate {
    signing_secret: Secret<String>,
    password_tag: Vec<u8>,
    session_duration: Duration,
}

impl AdminSessionGate {
    pub fn new(config: &AdminConfig) -> Result<Self, ServerError> {
        let mut mac = HmacSha256::new_from_slice(config.jwt_secret.reveal().as_bytes())
            .map_err(|e| ServerError::ConfigurationError(format!("Invalid admin JWT secret. {e}")))?;
        mac.update(config.password.reveal().as_bytes());
        let password_tag = mac.finalize().into_bytes().to_vec();
        Ok(Self { signing_secret: config.jwt_secret.clone(), password_tag, session_duration: config.session_duration })
    }

    pub fn session_duration(&self) -> Duration {
        self.session_duration
    }

    fn key(&self) -> Hs256Key {
        Hs256Key::new(self.signing_secret.reveal().as_bytes())
    }

    /// Exchanges the admin password for a session token.
    ///
    /// The candidate is run through the same keyed MAC as the configured password and the tags are compared in
    /// constant time.
    pub fn login(&self, password: &str) -> Result<String, AuthError> {
        let mut mac = HmacSha256::new_from_slice(self.signing_secret.reveal().as_bytes()).map_err(|e| {
            error!("🔐️ Could not key the password MAC. {e}");
            AuthError::Unauthorized
        })?;
        mac.update(password.as_bytes());
        mac.verify_slice(&self.password_tag).map_err(|_| {
            info!("🔐️ Admin login attempt with an incorrect password");
            AuthError::Unauthorized
        })?;
        let token = self.issue_token_at(Utc::now())?;
        info!("🔐️ Admin session issued");
        Ok(token)
    }

    pub(crate) fn issue_token_at(&self, issued_at: DateTime<Utc>) -> Result<String, AuthError> {
        let mut claims = Claims::new(AdminClaims::admin());
        claims.issued_at = Some(issued_at);
        claims.expiration = Some(issued_at + self.session_duration);
        let header = Header::empty().with_token_type("JWT");
        Hs256.token(&header, &claims, &self.key()).map_err(|e| AuthError::TokenIssue(e.to_string()))
    }

    /// Checks a session token.
    ///
    /// The token must be signed with the configured secret, unexpired, and carry the admin role. Whatever the reason
    /// for a failure, the result is [`AuthError::Unauthorized`]; the details are only logged.
    pub fn authorize(&self, token: &str) -> Result<AdminClaims, AuthError> {
        let untrusted = UntrustedToken::new(token).map_err(|e| {
            debug!("🔐️ Malformed session token. {e}");
            AuthError::Unauthorized
        })?;
        let token: Token<AdminClaims> = Hs256.validator::<AdminClaims>(&self.key()).validate(&untrusted).map_err(|e| {
            debug!("🔐️ Session token failed validation. {e}");
            AuthError::Unauthorized
        })?;
        token.claims().validate_expiration(&TimeOptions::from_leeway(Duration::zero())).map_err(|e| {
            debug!("🔐️ Session token is no longer valid. {e}");
            AuthError::Unauthorized
        })?;
        let claims = token.claims().custom.clone();
        if claims.role != ADMIN_ROLE {
            debug!("🔐️ Session token has role '{}', not '{ADMIN_ROLE}'", claims.role);
            return Err(AuthError::Unauthorized);
        }
        trace!("🔐️ Admin session token validated");
        Ok(claims)
    }
}
