//! Session token issuance and verification (HMAC-signed JWT)

use crate::{config::AppConfig, error::AppError};
use chrono::{TimeDelta, Utc};
use jsonwebtoken::{
    decode, decode_header, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey,
    Header, Validation,
};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};

/// Default session lifetime: 24 hours
pub const DEFAULT_TOKEN_TTL_SECS: u64 = 24 * 60 * 60;

/// Upper bound for a configured session lifetime: 30 days
pub const MAX_TOKEN_TTL_SECS: u64 = 30 * 24 * 60 * 60;

/// Only the HMAC family is accepted when verifying
const HMAC_ALGORITHMS: [Algorithm; 3] = [Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];

/// Verified session claims
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Subject (numeric user ID)
    pub user_id: i64,

    /// Issued at
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,

    /// Expiration
    pub exp: i64,
}

/// Claims as they come off the wire, before the subject is type-checked
#[derive(Debug, Deserialize)]
struct WireClaims {
    #[serde(default)]
    user_id: Option<serde_json::Value>,
    #[serde(default)]
    iat: Option<i64>,
    exp: i64,
}

/// JWT service
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    token_ttl: TimeDelta,
}

impl JwtService {
    /// Create JWT service from config
    pub fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        Self::new(
            config.security.jwt_secret.expose_secret(),
            config.security.token_ttl_secs,
        )
    }

    pub fn new(secret: &str, token_ttl_secs: u64) -> Result<Self, AppError> {
        if secret.trim().is_empty() {
            tracing::error!(critical = true, "JWT secret is not configured");
            return Err(AppError::Config("JWT secret is not set".to_string()));
        }

        if token_ttl_secs == 0 || token_ttl_secs > MAX_TOKEN_TTL_SECS {
            return Err(AppError::Config(format!(
                "token_ttl_secs must be between 1 and {}",
                MAX_TOKEN_TTL_SECS
            )));
        }

        let token_ttl = i64::try_from(token_ttl_secs)
            .ok()
            .and_then(TimeDelta::try_seconds)
            .ok_or_else(|| AppError::Config("token_ttl_secs is out of range".to_string()))?;

        // Expiry is checked by hand so that `now >= exp` is rejected with no leeway,
        // and before the subject claim is inspected.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.algorithms = HMAC_ALGORITHMS.to_vec();
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.required_spec_claims.clear();

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            token_ttl,
        })
    }

    /// Sign a session token for `user_id`, valid for the configured lifetime
    pub fn issue(&self, user_id: i64) -> Result<String, AppError> {
        let now = Utc::now();
        let expiration = now
            .checked_add_signed(self.token_ttl)
            .ok_or_else(|| AppError::Config("token expiry is out of range".to_string()))?;

        let claims = Claims {
            user_id,
            iat: Some(now.timestamp()),
            exp: expiration.timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key).map_err(|e| {
            tracing::error!("Failed to encode session token: {:?}", e);
            AppError::Internal(format!("Failed to sign token: {}", e))
        })
    }

    /// Verify signature, expiry and subject of a compact token
    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        let header = decode_header(token).map_err(|e| {
            tracing::debug!("Token header rejected: {:?}", e);
            AppError::InvalidSignature(format!("malformed token: {}", e))
        })?;

        if !HMAC_ALGORITHMS.contains(&header.alg) {
            tracing::warn!(alg = ?header.alg, "Token uses unexpected signing method");
            return Err(AppError::InvalidSignature(format!(
                "unexpected signing method: {:?}",
                header.alg
            )));
        }

        let wire = decode::<WireClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| {
                tracing::debug!("Token validation failed: {:?}", e);
                match e.kind() {
                    // the signature already checked out, so the payload is our own and broken
                    ErrorKind::Json(_) | ErrorKind::MissingRequiredClaim(_) => {
                        AppError::CorruptClaims(e.to_string())
                    }
                    ErrorKind::ExpiredSignature => AppError::TokenExpired,
                    _ => AppError::InvalidSignature(e.to_string()),
                }
            })?
            .claims;

        if Utc::now().timestamp() >= wire.exp {
            return Err(AppError::TokenExpired);
        }

        let user_id = wire
            .user_id
            .as_ref()
            .and_then(serde_json::Value::as_i64)
            .filter(|id| *id >= 0)
            .ok_or_else(|| {
                tracing::error!(claim = ?wire.user_id, "Validly signed token carries a bad user_id");
                AppError::CorruptClaims("user_id claim missing or not an integer".to_string())
            })?;

        Ok(Claims {
            user_id,
            iat: wire.iat,
            exp: wire.exp,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const SECRET: &str = "unit-test-secret";

    fn service() -> JwtService {
        JwtService::new(SECRET, DEFAULT_TOKEN_TTL_SECS).unwrap()
    }

    fn sign(claims: &serde_json::Value, alg: Algorithm, secret: &str) -> String {
        encode(
            &Header::new(alg),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn future_exp() -> i64 {
        Utc::now().timestamp() + 3600
    }

    #[test]
    fn test_issue_and_verify_round_trip() {
        let service = service();

        let token = service.issue(42).unwrap();
        assert_eq!(token.split('.').count(), 3);

        let claims = service.verify(&token).unwrap();
        assert_eq!(claims.user_id, 42);
    }

    #[test]
    fn test_issued_token_expires_after_24h() {
        let service = service();
        let before = Utc::now().timestamp();

        let claims = service.verify(&service.issue(7).unwrap()).unwrap();
        let iat = claims.iat.unwrap();

        assert!(iat >= before);
        assert_eq!(claims.exp - iat, 24 * 60 * 60);
    }

    #[test]
    fn test_empty_secret_is_configuration_failure() {
        assert!(matches!(
            JwtService::new("", DEFAULT_TOKEN_TTL_SECS),
            Err(AppError::Config(_))
        ));
        assert!(matches!(
            JwtService::new("   ", DEFAULT_TOKEN_TTL_SECS),
            Err(AppError::Config(_))
        ));
    }

    #[test]
    fn test_token_ttl_is_bounded() {
        for ttl in [0, MAX_TOKEN_TTL_SECS + 1, 9_000_000_000_000_000, u64::MAX] {
            assert!(
                matches!(JwtService::new(SECRET, ttl), Err(AppError::Config(_))),
                "ttl {} should be rejected",
                ttl
            );
        }

        let longest = JwtService::new(SECRET, MAX_TOKEN_TTL_SECS).unwrap();
        let claims = longest.verify(&longest.issue(5).unwrap()).unwrap();
        assert_eq!(claims.exp - claims.iat.unwrap(), MAX_TOKEN_TTL_SECS as i64);
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let token = sign(
            &json!({"user_id": 1, "exp": Utc::now().timestamp() - 10}),
            Algorithm::HS256,
            SECRET,
        );

        assert!(matches!(service().verify(&token), Err(AppError::TokenExpired)));
    }

    #[test]
    fn test_token_expiring_now_is_rejected() {
        let token = sign(
            &json!({"user_id": 1, "exp": Utc::now().timestamp()}),
            Algorithm::HS256,
            SECRET,
        );

        assert!(matches!(service().verify(&token), Err(AppError::TokenExpired)));
    }

    #[test]
    fn test_expiry_is_checked_before_subject() {
        let token = sign(
            &json!({"user_id": "not-a-number", "exp": Utc::now().timestamp() - 10}),
            Algorithm::HS256,
            SECRET,
        );

        assert!(matches!(service().verify(&token), Err(AppError::TokenExpired)));
    }

    #[test]
    fn test_foreign_secret_is_invalid_signature() {
        let other = JwtService::new("some-other-secret", DEFAULT_TOKEN_TTL_SECS).unwrap();
        let token = other.issue(42).unwrap();

        assert!(matches!(
            service().verify(&token),
            Err(AppError::InvalidSignature(_))
        ));
    }

    #[test]
    fn test_tampered_payload_is_invalid_signature() {
        let service = service();
        let token = service.issue(1).unwrap();
        let forged = service.issue(2).unwrap();

        let parts: Vec<&str> = token.split('.').collect();
        let forged_parts: Vec<&str> = forged.split('.').collect();
        let spliced = format!("{}.{}.{}", parts[0], forged_parts[1], parts[2]);

        assert!(matches!(
            service.verify(&spliced),
            Err(AppError::InvalidSignature(_))
        ));
    }

    #[test]
    fn test_garbage_token_is_invalid_signature() {
        let service = service();
        assert!(matches!(
            service.verify("invalid_token"),
            Err(AppError::InvalidSignature(_))
        ));
        assert!(matches!(service.verify(""), Err(AppError::InvalidSignature(_))));
    }

    #[test]
    fn test_unsigned_token_is_rejected() {
        let service = service();
        let payload = service.issue(1).unwrap().split('.').nth(1).unwrap().to_string();

        // {"alg":"none","typ":"JWT"}
        let token = format!("eyJhbGciOiJub25lIiwidHlwIjoiSldUIn0.{}.", payload);

        assert!(matches!(
            service.verify(&token),
            Err(AppError::InvalidSignature(_))
        ));
    }

    #[test]
    fn test_non_hmac_algorithm_is_rejected() {
        let service = service();
        let parts: Vec<String> = service
            .issue(1)
            .unwrap()
            .split('.')
            .map(str::to_string)
            .collect();

        // {"alg":"RS256","typ":"JWT"}
        let token = format!(
            "eyJhbGciOiJSUzI1NiIsInR5cCI6IkpXVCJ9.{}.{}",
            parts[1], parts[2]
        );

        assert!(matches!(
            service.verify(&token),
            Err(AppError::InvalidSignature(_))
        ));
    }

    #[test]
    fn test_other_hmac_variants_are_accepted() {
        let token = sign(
            &json!({"user_id": 9, "exp": future_exp()}),
            Algorithm::HS512,
            SECRET,
        );

        assert_eq!(service().verify(&token).unwrap().user_id, 9);
    }

    #[test]
    fn test_missing_user_id_is_corrupt_claims() {
        let token = sign(&json!({"exp": future_exp()}), Algorithm::HS256, SECRET);

        assert!(matches!(
            service().verify(&token),
            Err(AppError::CorruptClaims(_))
        ));
    }

    #[test]
    fn test_non_integer_user_id_is_corrupt_claims() {
        let service = service();

        for bad in [json!("42"), json!(4.5), json!(-1), json!(null), json!([1])] {
            let token = sign(&json!({"user_id": bad, "exp": future_exp()}), Algorithm::HS256, SECRET);
            assert!(
                matches!(service.verify(&token), Err(AppError::CorruptClaims(_))),
                "user_id {} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_missing_exp_is_corrupt_claims() {
        let token = sign(&json!({"user_id": 3}), Algorithm::HS256, SECRET);

        assert!(matches!(
            service().verify(&token),
            Err(AppError::CorruptClaims(_))
        ));
    }
}
