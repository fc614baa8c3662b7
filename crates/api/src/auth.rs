use crate::client::{Ack, ApiClient};
use crate::validate;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use ssm_core::{Result, Session, SsmError, User};

#[derive(Debug, Serialize)]
struct Credentials<'a> {
    email:    &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct Registration<'a> {
    email:    &'a str,
    username: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct PasswordReset<'a> {
    token:        &'a str,
    new_password: &'a str,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    access_token: String,
    user:         User,
}

impl ApiClient {
    /// Exchange credentials for a bearer token and the account it belongs to.
    pub async fn login(&self, email: &str, password: &str) -> Result<Session> {
        let body = Credentials {
            email:    validate::email(email)?,
            password: validate::password(password)?,
        };
        let resp: LoginResponse = self.send_json(Method::POST, "/auth/login", &body).await?;
        if resp.access_token.is_empty() {
            return Err(SsmError::Decode("login response carried an empty token".into()));
        }
        Ok(Session {
            token: resp.access_token,
            user:  resp.user,
        })
    }

    pub async fn register(
        &self,
        email: &str,
        username: &str,
        password: &str,
        confirm: &str,
    ) -> Result<Ack> {
        let username = username.trim();
        if username.is_empty() {
            return Err(SsmError::Validation("username is required".into()));
        }
        let body = Registration {
            email: validate::email(email)?,
            username,
            password: validate::new_password(password, confirm)?,
        };
        self.send_json(Method::POST, "/auth/register", &body).await
    }

    /// Confirm an address with the code from the verification mail.
    pub async fn verify_email(&self, token: &str) -> Result<Ack> {
        let token = token.trim();
        if token.is_empty() {
            return Err(SsmError::Validation("verification code is required".into()));
        }
        self.send_json(Method::POST, "/auth/verify-email", &serde_json::json!({ "token": token }))
            .await
    }

    pub async fn forgot_password(&self, email: &str) -> Result<Ack> {
        let email = validate::email(email)?;
        self.send_json(Method::POST, "/auth/forgot-password", &serde_json::json!({ "email": email }))
            .await
    }

    pub async fn reset_password(&self, token: &str, password: &str, confirm: &str) -> Result<Ack> {
        let token = token.trim();
        if token.is_empty() {
            return Err(SsmError::Validation("reset code is required".into()));
        }
        let body = PasswordReset {
            token,
            new_password: validate::new_password(password, confirm)?,
        };
        self.send_json(Method::POST, "/auth/reset-password", &body).await
    }

    /// The account behind the current token.
    pub async fn me(&self) -> Result<User> {
        self.require_token()?;
        self.get("/auth/me").await
    }

    /// Invalidate the current token server-side.
    pub async fn logout(&self) -> Result<Ack> {
        self.require_token()?;
        self.send_json(Method::POST, "/auth/logout", &serde_json::json!({})).await
    }
}
