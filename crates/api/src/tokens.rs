use crate::client::ApiClient;
use crate::validate;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use ssm_core::{InviteToken, Result, Role, SsmError};

/// Validity used when the caller does not pick one.
pub const DEFAULT_DURATION_DAYS: u32 = 365;

/// Outcome of redeeming an invite code.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Activation {
    #[serde(default)]
    pub message:    String,
    /// Role granted by the token.
    #[serde(default = "granted_role")]
    pub role:       Role,
    pub expires_at: String,
}

fn granted_role() -> Role {
    Role::ServerAdmin
}

/// A freshly minted invite code.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GeneratedToken {
    #[serde(default)]
    pub message:    String,
    pub token_code: String,
    pub expires_at: String,
}

#[derive(Debug, Deserialize)]
struct TokenList {
    #[serde(default)]
    tokens: Vec<InviteToken>,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    assigned_to_email: &'a str,
    duration_days:     u32,
}

impl ApiClient {
    /// Invite tokens assigned to the logged-in user, newest first.
    pub async fn my_tokens(&self) -> Result<Vec<InviteToken>> {
        self.require_token()?;
        let list: TokenList = self.get("/tokens/my").await?;
        Ok(list.tokens)
    }

    /// Redeem an invite code. Blank codes are rejected before any request.
    pub async fn activate_token(&self, code: &str) -> Result<Activation> {
        let code = validate::token_code(code)?;
        self.require_token()?;
        self.send_json(
            Method::POST,
            "/tokens/activate",
            &serde_json::json!({ "token_code": code }),
        )
        .await
    }

    /// Mint an invite code for `email`. Only manager admins may do this;
    /// `caller` is the role recorded in the local session.
    pub async fn generate_token(
        &self,
        caller: Role,
        email: &str,
        duration_days: u32,
    ) -> Result<GeneratedToken> {
        if !caller.satisfies(Role::ManagerAdmin) {
            return Err(SsmError::Forbidden(format!(
                "generating tokens requires {}, current role is {caller}",
                Role::ManagerAdmin
            )));
        }
        let body = GenerateRequest {
            assigned_to_email: validate::email(email)?,
            duration_days:     validate::duration_days(duration_days)?,
        };
        self.require_token()?;
        self.send_json(Method::POST, "/tokens/generate", &body).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{serve, Hits};
    use axum::{extract::Query, http::StatusCode, routing::get, routing::post, Json, Router};
    use std::collections::HashMap;

    /// Mirrors the backend: the session travels as `?token=`.
    fn counting_router(hits: &Hits) -> Router {
        let counter = hits.clone();
        Router::new().route(
            "/tokens/activate",
            post(move |Query(q): Query<HashMap<String, String>>, Json(body): Json<serde_json::Value>| {
                counter.bump();
                async move {
                    if q.get("token").map(String::as_str) != Some("t") {
                        (
                            StatusCode::UNPROCESSABLE_ENTITY,
                            Json(serde_json::json!({"detail": "field required: token"})),
                        )
                    } else if body["token_code"] == "GOOD" {
                        (
                            StatusCode::OK,
                            Json(serde_json::json!({
                                "message": "Token activated successfully",
                                "role": "server_admin",
                                "expires_at": "2030-01-01T00:00:00Z"
                            })),
                        )
                    } else {
                        (
                            StatusCode::NOT_FOUND,
                            Json(serde_json::json!({"detail": "Token not found or already activated"})),
                        )
                    }
                }
            }),
        )
    }

    #[tokio::test]
    async fn blank_code_issues_zero_requests() {
        let hits = Hits::default();
        let client = serve(counting_router(&hits)).await.with_token("t");

        let err = client.activate_token("   ").await.unwrap_err();
        assert!(matches!(err, SsmError::Validation(_)));
        assert_eq!(hits.count(), 0);
    }

    #[tokio::test]
    async fn activation_sends_trimmed_code() {
        let hits = Hits::default();
        let client = serve(counting_router(&hits)).await.with_token("t");

        let activation = client.activate_token("  GOOD\n").await.unwrap();
        assert_eq!(activation.role, Role::ServerAdmin);
        assert_eq!(hits.count(), 1);
    }

    #[tokio::test]
    async fn unknown_code_surfaces_backend_detail() {
        let hits = Hits::default();
        let client = serve(counting_router(&hits)).await.with_token("t");

        match client.activate_token("BAD").await {
            Err(SsmError::Http { status: 404, detail }) => {
                assert_eq!(detail, "Token not found or already activated");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[tokio::test]
    async fn generate_requires_manager_admin_locally() {
        let hits = Hits::default();
        let counter = hits.clone();
        let app = Router::new().route(
            "/tokens/generate",
            post(move || {
                counter.bump();
                async { Json(serde_json::json!({"token_code": "x", "expires_at": "y"})) }
            }),
        );
        let client = serve(app).await.with_token("t");

        let err = client
            .generate_token(Role::ServerAdmin, "op@example.com", 30)
            .await
            .unwrap_err();
        assert!(matches!(err, SsmError::Forbidden(_)));

        let minted = client
            .generate_token(Role::ManagerAdmin, "op@example.com", 30)
            .await
            .unwrap();
        assert_eq!(minted.token_code, "x");
        assert_eq!(hits.count(), 1);
    }

    #[tokio::test]
    async fn my_tokens_unwraps_list() {
        let app = Router::new().route(
            "/tokens/my",
            get(|| async {
                Json(serde_json::json!({"tokens": [
                    {"token_code": "abc", "status": "active", "expires_at": "2030-01-01"}
                ]}))
            }),
        );
        let client = serve(app).await.with_token("t");

        let tokens = client.my_tokens().await.unwrap();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].status, "active");
    }
}
