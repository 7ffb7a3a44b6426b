//! HS256 JWT token codec.
//!
//! Tokens carry the user's email as `sub`, the user id as `uid`, and the
//! usual `iat`/`exp`/`iss` claims. Expiry is checked against the injected
//! clock rather than the system time so tests stay deterministic.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Duration;
use jsonwebtoken::errors::{Error as JwtError, ErrorKind};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::User;
use crate::domain::ports::{TokenCodec, TokenCodecError};

/// Claims embedded in every issued token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub uid: String,
    pub iat: i64,
    pub exp: i64,
    pub iss: String,
}

/// JWT codec signing with a shared HMAC secret.
#[derive(Clone)]
pub struct JwtTokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl JwtTokenCodec {
    /// Create a codec signing with `secret` and stamping `issuer`.
    pub fn new(
        secret: &[u8],
        issuer: impl Into<String>,
        ttl: Duration,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            issuer: issuer.into(),
            ttl,
            clock,
        }
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.issuer]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);
        // Expiry is compared against `self.clock` after decoding.
        validation.validate_exp = false;
        validation
    }
}

/// Sort a decode failure into malformed input, a rejected token, or a
/// codec fault.
fn classify(error: &JwtError) -> Result<bool, TokenCodecError> {
    match error.kind() {
        ErrorKind::InvalidToken
        | ErrorKind::Base64(_)
        | ErrorKind::Json(_)
        | ErrorKind::Utf8(_) => Err(TokenCodecError::malformed()),
        ErrorKind::InvalidSignature
        | ErrorKind::InvalidIssuer
        | ErrorKind::InvalidAudience
        | ErrorKind::InvalidSubject
        | ErrorKind::ExpiredSignature
        | ErrorKind::ImmatureSignature
        | ErrorKind::InvalidAlgorithm
        | ErrorKind::MissingRequiredClaim(_) => Ok(false),
        _ => Err(TokenCodecError::signing(error.to_string())),
    }
}

#[async_trait]
impl TokenCodec for JwtTokenCodec {
    async fn generate(&self, user: &User) -> Result<String, TokenCodecError> {
        let now = self.clock.utc();
        let claims = Claims {
            sub: user.email.clone(),
            uid: user.id.to_string(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
            iss: self.issuer.clone(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|err| TokenCodecError::signing(err.to_string()))
    }

    async fn validate(&self, token: &str, user: &User) -> Result<bool, TokenCodecError> {
        let claims = match decode::<Claims>(token, &self.decoding_key, &self.validation()) {
            Ok(data) => data.claims,
            Err(error) => {
                debug!(kind = ?error.kind(), "token rejected by decoder");
                return classify(&error);
            }
        };

        if claims.exp <= self.clock.utc().timestamp() {
            debug!(user_id = %user.id, "token expired");
            return Ok(false);
        }
        Ok(claims.sub == user.email && claims.uid == user.id.as_ref())
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for token issuance and verdicts.
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};
    use mockable::MockClock;
    use rstest::{fixture, rstest};

    use crate::domain::{PasswordDigest, UserId};

    const SECRET: &[u8] = b"test-secret";
    const ISSUER: &str = "user-accounts";

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, hour, 0, 0)
            .single()
            .expect("valid timestamp")
    }

    fn clock_at(time: DateTime<Utc>) -> Arc<dyn Clock> {
        let mut clock = MockClock::new();
        clock.expect_utc().return_const(time);
        Arc::new(clock)
    }

    fn codec_at(time: DateTime<Utc>) -> JwtTokenCodec {
        JwtTokenCodec::new(SECRET, ISSUER, Duration::hours(1), clock_at(time))
    }

    fn user_with_email(email: &str) -> User {
        User {
            id: UserId::new("3fa85f64-5717-4562-b3fc-2c963f66afa6").expect("valid id"),
            name: "Juan".to_owned(),
            email: email.to_owned(),
            password: PasswordDigest::new("unused"),
            is_active: true,
            created: at(0),
            modified: at(0),
            last_login: at(0),
            phones: Vec::new(),
        }
    }

    #[fixture]
    fn user() -> User {
        user_with_email("juan@rodriguez.org")
    }

    #[rstest]
    #[tokio::test]
    async fn generated_token_carries_expected_claims(user: User) {
        let codec = codec_at(at(10));
        let token = codec.generate(&user).await.expect("token issued");

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        let claims = decode::<Claims>(&token, &DecodingKey::from_secret(SECRET), &validation)
            .expect("decodes")
            .claims;
        assert_eq!(claims.sub, "juan@rodriguez.org");
        assert_eq!(claims.uid, user.id.as_ref());
        assert_eq!(claims.iss, ISSUER);
        assert_eq!(claims.iat, at(10).timestamp());
        assert_eq!(claims.exp, at(11).timestamp());
    }

    #[rstest]
    #[tokio::test]
    async fn token_validates_for_its_user(user: User) {
        let codec = codec_at(at(10));
        let token = codec.generate(&user).await.expect("token issued");
        assert_eq!(codec.validate(&token, &user).await, Ok(true));
    }

    #[rstest]
    #[tokio::test]
    async fn token_for_another_user_is_rejected(user: User) {
        let codec = codec_at(at(10));
        let token = codec.generate(&user).await.expect("token issued");
        let other = user_with_email("ana@rodriguez.org");
        assert_eq!(codec.validate(&token, &other).await, Ok(false));
    }

    #[rstest]
    #[tokio::test]
    async fn expired_token_is_rejected(user: User) {
        let token = codec_at(at(10)).generate(&user).await.expect("token issued");
        let later = codec_at(at(12));
        assert_eq!(later.validate(&token, &user).await, Ok(false));
    }

    #[rstest]
    #[tokio::test]
    async fn token_signed_with_other_secret_is_rejected(user: User) {
        let foreign = JwtTokenCodec::new(b"other", ISSUER, Duration::hours(1), clock_at(at(10)));
        let token = foreign.generate(&user).await.expect("token issued");
        assert_eq!(codec_at(at(10)).validate(&token, &user).await, Ok(false));
    }

    #[rstest]
    #[tokio::test]
    async fn token_from_other_issuer_is_rejected(user: User) {
        let foreign =
            JwtTokenCodec::new(SECRET, "someone-else", Duration::hours(1), clock_at(at(10)));
        let token = foreign.generate(&user).await.expect("token issued");
        assert_eq!(codec_at(at(10)).validate(&token, &user).await, Ok(false));
    }

    #[rstest]
    #[case("")]
    #[case("not-a-token")]
    #[case("a.b.c")]
    #[case("e30.e30")]
    #[tokio::test]
    async fn structurally_broken_tokens_are_malformed(user: User, #[case] token: &str) {
        assert_eq!(
            codec_at(at(10)).validate(token, &user).await,
            Err(TokenCodecError::Malformed)
        );
    }
}
