use chrono::Duration;
use chrono::Local;
use hmac::{Hmac, Mac};
use jwt::SignWithKey;
use jwt::VerifyWithKey;
use serde::Deserialize;
use serde::Serialize;
use sha2::Sha256;

use crate::database::error::Error;
use crate::database::schema::User;
use crate::schema::UserRole;

use super::permissions::ActionType;

const SESSION_SECRET_ENV: &str = "SESSION_SECRET";

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct JwtSessionData {
    pub user_id: i32,
    pub username: String,
    pub role: UserRole,
    pub jti: String,
    iat: i64,
    exp: i64,
}

impl JwtSessionData {
    pub fn new(id: i32, username: String, role: UserRole) -> Self {
        let now = Local::now();
        let iat = now.timestamp();
        let exp = (now + Duration::hours(1)).timestamp();

        Self {
            user_id: id,
            username,
            role,
            jti: uuid::Uuid::new_v4().to_string(),
            iat,
            exp,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SessionData {
    pub user_id: i32,
    pub username: String,
    pub role: UserRole,
    pub is_admin: bool,
}

impl SessionData {
    pub fn authenticate(&self, action: ActionType) -> Result<(), Error> {
        if !action.authenticate(self) {
            return Err(Error::Unauthorized(
                "no permission to perform this action",
            ));
        }
        Ok(())
    }
}

impl From<JwtSessionData> for SessionData {
    fn from(value: JwtSessionData) -> Self {
        SessionData {
            username: value.username,
            user_id: value.user_id,
            is_admin: value.role == UserRole::Admin,
            role: value.role,
        }
    }
}

fn session_key() -> Result<Hmac<Sha256>, Error> {
    let secret = std::env::var(SESSION_SECRET_ENV)
        .map_err(|_| Error::InvalidSession("SESSION_SECRET is not set"))?;

    Hmac::new_from_slice(secret.as_bytes())
        .map_err(|_| Error::InvalidSession("invalid session key"))
}

pub fn generate_jwt_session(user: &User) -> Result<String, Error> {
    let key = session_key()?;
    let claims = JwtSessionData::new(user.id, user.username.to_owned(), user.role);

    claims
        .sign_with_key(&key)
        .map_err(|_| Error::InvalidSession("failed to sign session"))
}

pub fn verify_jwt_session(token: &str) -> Result<JwtSessionData, Error> {
    let key = session_key()?;

    let session: JwtSessionData = token
        .verify_with_key(&key)
        .map_err(|_| Error::InvalidSession("invalid token"))?;

    let now = Local::now().timestamp();
    if (session.exp - now).is_negative() {
        return Err(Error::InvalidSession("token expired"));
    }

    Ok(session)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set_secret() {
        std::env::set_var(SESSION_SECRET_ENV, "test-session-secret");
    }

    fn user() -> User {
        User {
            id: 7,
            username: String::from("chef"),
            email: String::from("chef@example.com"),
            password: String::from("argon2-hash"),
            role: UserRole::User,
        }
    }

    #[test]
    fn sign_then_verify_roundtrip() {
        set_secret();
        let token = generate_jwt_session(&user()).unwrap();
        let session = verify_jwt_session(&token).unwrap();

        assert_eq!(session.user_id, 7);
        assert_eq!(session.username, "chef");
        assert_eq!(session.role, UserRole::User);
    }

    #[test]
    fn garbage_token_is_rejected() {
        set_secret();
        assert!(verify_jwt_session("not.a.token").is_err());
    }

    #[test]
    fn session_data_reflects_admin_role() {
        let claims = JwtSessionData::new(1, String::from("root"), UserRole::Admin);
        let session: SessionData = claims.into();
        assert!(session.is_admin);
    }
}
