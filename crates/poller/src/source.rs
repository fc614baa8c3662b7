use ssm_api::ApiClient;
use ssm_core::{Result, SystemHistory, SystemInfo};
use std::future::Future;

/// Where the poller gets its data. [`ApiClient`] is the production source.
pub trait MetricsSource: Send + Sync + 'static {
    fn system_info(&self) -> impl Future<Output = Result<SystemInfo>> + Send;

    fn system_history(&self) -> impl Future<Output = Result<SystemHistory>> + Send;
}

/// Source for the notification badge loop.
pub trait UnreadSource: Send + Sync + 'static {
    fn unread_count(&self) -> impl Future<Output = Result<u32>> + Send;
}

impl MetricsSource for ApiClient {
    async fn system_info(&self) -> Result<SystemInfo> {
        ApiClient::system_info(self).await
    }

    async fn system_history(&self) -> Result<SystemHistory> {
        ApiClient::system_history(self).await
    }
}

impl UnreadSource for ApiClient {
    async fn unread_count(&self) -> Result<u32> {
        ApiClient::unread_count(self).await
    }
}
