//! HTTP Basic-auth verification and the middleware that attaches a
//! [`Principal`] to authenticated requests.

use std::sync::Arc;

use argon2::{Argon2, PasswordHash, PasswordVerifier};
use axum::{
  extract::{Request, State},
  http::HeaderMap,
  middleware::Next,
  response::Response,
};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as B64;
use obra_core::access::Principal;

use crate::{UserConfig, error::Error};

/// Accounts accepted by this server instance.
#[derive(Clone, Default)]
pub struct AuthConfig {
  pub users: Vec<UserConfig>,
}

impl AuthConfig {
  fn find(&self, username: &str) -> Option<&UserConfig> {
    self.users.iter().find(|u| u.username == username)
  }
}

/// Check the `Authorization` header and resolve the matching account.
pub fn verify_auth(headers: &HeaderMap, config: &AuthConfig) -> Result<Principal, Error> {
  let header_val = headers
    .get(axum::http::header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .ok_or(Error::Unauthorized)?;

  let encoded = header_val
    .strip_prefix("Basic ")
    .ok_or(Error::Unauthorized)?;

  let decoded = B64.decode(encoded).map_err(|_| Error::Unauthorized)?;
  let creds = std::str::from_utf8(&decoded).map_err(|_| Error::Unauthorized)?;
  let (username, password) = creds.split_once(':').ok_or(Error::Unauthorized)?;

  let user = config.find(username).ok_or(Error::Unauthorized)?;
  let parsed_hash =
    PasswordHash::new(&user.password_hash).map_err(|_| Error::Unauthorized)?;
  Argon2::default()
    .verify_password(password.as_bytes(), &parsed_hash)
    .map_err(|_| Error::Unauthorized)?;

  Ok(Principal {
    username:   Some(user.username.clone()),
    admin:      user.admin,
    can_delete: user.can_delete,
  })
}

/// Reject unauthenticated requests; otherwise insert the [`Principal`] into
/// request extensions for the API handlers.
pub async fn require_auth(
  State(config): State<Arc<AuthConfig>>,
  mut req: Request,
  next: Next,
) -> Result<Response, Error> {
  let principal = verify_auth(req.headers(), &config).inspect_err(|_| {
    tracing::debug!(uri = %req.uri(), "rejected request without valid credentials");
  })?;
  req.extensions_mut().insert(principal);
  Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
  use argon2::{PasswordHasher, password_hash::SaltString};
  use axum::http::{HeaderValue, header};
  use rand_core::OsRng;

  use super::*;

  fn hash(password: &str) -> String {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
      .hash_password(password.as_bytes(), &salt)
      .unwrap()
      .to_string()
  }

  fn config() -> AuthConfig {
    AuthConfig {
      users: vec![
        UserConfig {
          username:      "secretaria".into(),
          password_hash: hash("secret"),
          admin:         false,
          can_delete:    false,
        },
        UserConfig {
          username:      "tesoureiro".into(),
          password_hash: hash("cofre"),
          admin:         false,
          can_delete:    true,
        },
      ],
    }
  }

  fn headers(value: &str) -> HeaderMap {
    let mut h = HeaderMap::new();
    h.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
    h
  }

  fn basic(user: &str, pass: &str) -> HeaderMap {
    headers(&format!("Basic {}", B64.encode(format!("{user}:{pass}"))))
  }

  #[test]
  fn correct_credentials_resolve_principal() {
    let cfg = config();
    let p = verify_auth(&basic("tesoureiro", "cofre"), &cfg).unwrap();
    assert_eq!(p.username.as_deref(), Some("tesoureiro"));
    assert!(p.can_delete);
    assert!(!p.admin);
  }

  #[test]
  fn wrong_password() {
    let cfg = config();
    assert!(matches!(
      verify_auth(&basic("secretaria", "wrong"), &cfg),
      Err(Error::Unauthorized)
    ));
  }

  #[test]
  fn password_of_another_user() {
    let cfg = config();
    assert!(verify_auth(&basic("secretaria", "cofre"), &cfg).is_err());
  }

  #[test]
  fn unknown_user() {
    let cfg = config();
    assert!(verify_auth(&basic("visitante", "secret"), &cfg).is_err());
  }

  #[test]
  fn missing_header() {
    assert!(matches!(
      verify_auth(&HeaderMap::new(), &config()),
      Err(Error::Unauthorized)
    ));
  }

  #[test]
  fn invalid_base64_and_scheme() {
    let cfg = config();
    assert!(verify_auth(&headers("Basic !!!not-base64!!!"), &cfg).is_err());
    assert!(verify_auth(&headers("Bearer abc"), &cfg).is_err());
  }
}
