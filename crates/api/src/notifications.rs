use crate::client::{Ack, ApiClient};
use reqwest::Method;
use serde::Deserialize;
use ssm_core::{Notification, Result};

#[derive(Debug, Deserialize)]
struct NotificationList {
    #[serde(default)]
    notifications: Vec<Notification>,
}

#[derive(Debug, Deserialize)]
struct UnreadCount {
    #[serde(default)]
    count: u32,
}

impl ApiClient {
    pub async fn notifications(&self) -> Result<Vec<Notification>> {
        self.require_token()?;
        let list: NotificationList = self.get("/notifications").await?;
        Ok(list.notifications)
    }

    /// Badge count for the notification bell.
    pub async fn unread_count(&self) -> Result<u32> {
        self.require_token()?;
        let unread: UnreadCount = self.get("/notifications/unread-count").await?;
        Ok(unread.count)
    }

    pub async fn mark_notification_read(&self, id: &str) -> Result<Ack> {
        self.require_token()?;
        let path = format!("/notifications/{id}/read");
        self.send_json(Method::PATCH, &path, &serde_json::json!({})).await
    }
}

/// Local copy of the notification list plus the unread badge.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NotificationCenter {
    pub items:  Vec<Notification>,
    pub unread: u32,
}

impl NotificationCenter {
    /// Replace the list and badge with fresh server data.
    pub async fn refresh(&mut self, client: &ApiClient) -> Result<()> {
        self.items = client.notifications().await?;
        self.unread = client.unread_count().await?;
        Ok(())
    }

    /// Mark one entry read on the server, then locally. Local state is only
    /// touched once the server accepted the change.
    pub async fn mark_read(&mut self, client: &ApiClient, id: &str) -> Result<()> {
        client.mark_notification_read(id).await?;
        self.apply_read(id);
        Ok(())
    }

    fn apply_read(&mut self, id: &str) {
        if let Some(n) = self.items.iter_mut().find(|n| n.id == id) {
            n.read = true;
        }
        self.unread = self.unread.saturating_sub(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::serve;
    use axum::{extract::Path, http::StatusCode, routing::get, routing::patch, Json, Router};
    use ssm_core::{NotificationKind, SsmError};

    fn backend() -> Router {
        Router::new()
            .route(
                "/notifications",
                get(|| async {
                    Json(serde_json::json!({"notifications": [
                        {"id": "n1", "title": "Token Activated", "message": "ok", "type": "success",
                         "read": false, "created_at": "2024-05-01T10:00:00Z"},
                        {"id": "n2", "title": "Hello", "type": "token",
                         "read": false, "created_at": "2024-05-01T11:00:00Z", "link": "/tokens"}
                    ]}))
                }),
            )
            .route(
                "/notifications/unread-count",
                get(|| async { Json(serde_json::json!({"count": 1})) }),
            )
            .route(
                "/notifications/{id}/read",
                patch(|Path(id): Path<String>| async move {
                    if id == "missing" {
                        (StatusCode::NOT_FOUND, Json(serde_json::json!({"detail": "nope"})))
                    } else {
                        (StatusCode::OK, Json(serde_json::json!({"message": "Notification marked as read"})))
                    }
                }),
            )
    }

    #[tokio::test]
    async fn refresh_then_mark_read() {
        let client = serve(backend()).await.with_token("t");
        let mut center = NotificationCenter::default();

        center.refresh(&client).await.unwrap();
        assert_eq!(center.items.len(), 2);
        assert_eq!(center.items[1].kind, NotificationKind::Token);
        assert_eq!(center.unread, 1);

        center.mark_read(&client, "n1").await.unwrap();
        assert!(center.items[0].read);
        assert_eq!(center.unread, 0);

        // Badge never underflows.
        center.mark_read(&client, "n2").await.unwrap();
        assert_eq!(center.unread, 0);
    }

    #[tokio::test]
    async fn failed_mark_leaves_state_alone() {
        let client = serve(backend()).await.with_token("t");
        let mut center = NotificationCenter::default();
        center.refresh(&client).await.unwrap();
        let before = center.clone();

        let err = center.mark_read(&client, "missing").await.unwrap_err();
        assert!(matches!(err, SsmError::Http { status: 404, .. }));
        assert_eq!(center, before);
    }
}
