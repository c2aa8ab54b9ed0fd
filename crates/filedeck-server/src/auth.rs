//! Login sessions and XSRF tokens.
//!
//! Both checks are plain predicates over token values pulled from the
//! request; nothing here reads ambient state.

use anyhow::Result;
use anyhow::anyhow;
use argon2::Argon2;
use axum_extra::extract::cookie::Cookie;
use axum_extra::extract::cookie::SameSite;
use rand::RngCore;
use rand::rngs::OsRng;
use std::collections::HashMap;
use std::time::Duration;
use std::time::Instant;
use tokio::sync::Mutex;

pub const SESSION_COOKIE: &str = "filedeck_session";
pub const XSRF_COOKIE: &str = "_sfm_xsrf";

const SALT_LEN: usize = 16;
const HASH_LEN: usize = 32;
const SESSION_TOKEN_LEN: usize = 32;
const XSRF_TOKEN_LEN: usize = 16;

/// Argon2id digest of the configured password. The plaintext is not kept.
pub struct PasswordDigest {
    salt: [u8; SALT_LEN],
    hash: [u8; HASH_LEN],
}

impl PasswordDigest {
    pub fn new(password: &str) -> Result<Self> {
        let mut salt = [0u8; SALT_LEN];
        OsRng.fill_bytes(&mut salt);
        let hash = derive(password, &salt)?;
        Ok(Self { salt, hash })
    }

    pub fn verify(&self, candidate: &str) -> bool {
        derive(candidate, &self.salt).is_ok_and(|hash| constant_time_eq(&hash, &self.hash))
    }
}

impl std::fmt::Debug for PasswordDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("PasswordDigest(..)")
    }
}

fn derive(password: &str, salt: &[u8]) -> Result<[u8; HASH_LEN]> {
    let mut hash = [0u8; HASH_LEN];
    Argon2::default()
        .hash_password_into(password.as_bytes(), salt, &mut hash)
        .map_err(|e| anyhow!("argon2 derivation failed: {e}"))?;
    Ok(hash)
}

/// Server-side session table with a fixed lifetime per session.
#[derive(Debug)]
pub struct SessionStore {
    sessions: Mutex<HashMap<String, Instant>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    pub async fn create(&self) -> String {
        let token = random_token(SESSION_TOKEN_LEN);
        let mut sessions = self.sessions.lock().await;
        let now = Instant::now();
        sessions.retain(|_, expires_at| *expires_at > now);
        sessions.insert(token.clone(), now + self.ttl);
        token
    }

    pub async fn is_live(&self, token: &str) -> bool {
        let mut sessions = self.sessions.lock().await;
        match sessions.get(token) {
            Some(expires_at) if *expires_at > Instant::now() => true,
            Some(_) => {
                sessions.remove(token);
                false
            }
            None => false,
        }
    }
}

/// The login gate. Without a password every request is authorized.
#[derive(Debug)]
pub struct AuthGate {
    password: Option<PasswordDigest>,
    sessions: SessionStore,
}

impl AuthGate {
    pub fn new(password: Option<&str>, session_ttl: Duration) -> Result<Self> {
        Ok(Self {
            password: password.map(PasswordDigest::new).transpose()?,
            sessions: SessionStore::new(session_ttl),
        })
    }

    pub const fn is_enabled(&self) -> bool {
        self.password.is_some()
    }

    pub async fn is_authorized(&self, session: Option<&str>) -> bool {
        if self.password.is_none() {
            return true;
        }
        match session {
            Some(token) => self.sessions.is_live(token).await,
            None => false,
        }
    }

    /// Checks `candidate` and opens a session on success.
    pub async fn login(&self, candidate: &str) -> Option<String> {
        let digest = self.password.as_ref()?;
        if digest.verify(candidate) {
            Some(self.sessions.create().await)
        } else {
            None
        }
    }

    /// Browser-session cookie carrying `token`; expiry is enforced server
    /// side.
    pub fn session_cookie(token: String) -> Cookie<'static> {
        Cookie::build((SESSION_COOKIE, token))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Strict)
            .build()
    }
}

/// A POST is authentic when its submitted token equals the cookie token.
pub fn xsrf_matches(cookie: Option<&str>, submitted: Option<&str>) -> bool {
    match (cookie, submitted) {
        (Some(cookie), Some(submitted)) if !cookie.is_empty() => {
            constant_time_eq(cookie.as_bytes(), submitted.as_bytes())
        }
        _ => false,
    }
}

/// A fresh XSRF cookie. The page script reads it, so it is not HttpOnly.
pub fn xsrf_cookie() -> Cookie<'static> {
    Cookie::build((XSRF_COOKIE, random_token(XSRF_TOKEN_LEN)))
        .path("/")
        .same_site(SameSite::Strict)
        .build()
}

fn random_token(len: usize) -> String {
    let mut bytes = vec![0u8; len];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_password_digest_verifies() {
        let digest = PasswordDigest::new("filedeck2025").unwrap();
        assert!(digest.verify("filedeck2025"));
        assert!(!digest.verify("filedeck2024"));
        assert!(!digest.verify(""));
    }

    #[test]
    fn test_digests_are_salted() {
        let a = PasswordDigest::new("same").unwrap();
        let b = PasswordDigest::new("same").unwrap();
        assert_ne!(a.hash, b.hash);
    }

    #[test]
    fn test_xsrf_matches() {
        assert!(xsrf_matches(Some("abc123"), Some("abc123")));
        assert!(!xsrf_matches(Some("abc123"), Some("abc124")));
        assert!(!xsrf_matches(Some("abc123"), None));
        assert!(!xsrf_matches(None, Some("abc123")));
        assert!(!xsrf_matches(Some(""), Some("")));
        assert!(!xsrf_matches(None, None));
    }

    #[test]
    fn test_xsrf_cookie_shape() {
        let cookie = xsrf_cookie();
        assert_eq!(cookie.name(), XSRF_COOKIE);
        assert_eq!(cookie.value().len(), XSRF_TOKEN_LEN * 2);
        assert_ne!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Strict));
    }

    #[tokio::test]
    async fn test_open_gate_authorizes_everything() {
        let gate = AuthGate::new(None, Duration::from_secs(60)).unwrap();
        assert!(!gate.is_enabled());
        assert!(gate.is_authorized(None).await);
        assert!(gate.login("anything").await.is_none());
    }

    #[tokio::test]
    async fn test_login_creates_session() {
        let gate = AuthGate::new(Some("secret"), Duration::from_secs(60)).unwrap();
        assert!(!gate.is_authorized(None).await);
        assert!(!gate.is_authorized(Some("forged")).await);
        assert!(gate.login("wrong").await.is_none());

        let token = gate.login("secret").await.unwrap();
        assert_eq!(token.len(), SESSION_TOKEN_LEN * 2);
        assert!(gate.is_authorized(Some(&token)).await);

        let cookie = AuthGate::session_cookie(token);
        assert_eq!(cookie.name(), SESSION_COOKIE);
        assert_eq!(cookie.http_only(), Some(true));
    }

    #[tokio::test]
    async fn test_expired_session_rejected() {
        let store = SessionStore::new(Duration::ZERO);
        let token = store.create().await;
        assert!(!store.is_live(&token).await);
    }
}
