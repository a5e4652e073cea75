use crate::{
    EmployeeId, NotificationId, Notification, requests, responses,
};
use reqwest::{RequestBuilder, StatusCode, Url};
use serde::Serialize;

type ReqwestResult = Result<reqwest::Response, ClientError>;

/// An API client for interfacing with the backend.
#[derive(Clone)]
pub struct APIClient {
    pub address: String,
    pub inner_client: reqwest::Client,
    /// Bearer token of the current session, if any.
    pub token: Option<String>,
}

/// Helper methods for http actions
impl APIClient {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            inner_client: reqwest::Client::new(),
            token: None,
        }
    }

    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    /// Append `segments` to the base address, percent-encoding each one so
    /// that ids cannot escape their path segment.
    fn format_url(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url = Url::parse(&self.address)
            .map_err(|e| ClientError::InvalidUrl(format!("{}: {e}", self.address)))?;
        url.path_segments_mut()
            .map_err(|()| ClientError::InvalidUrl(self.address.clone()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send(&self, request: RequestBuilder) -> ReqwestResult {
        let request = match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };
        Ok(request.send().await?)
    }

    async fn get(&self, path: &[&str]) -> ReqwestResult {
        self.send(self.inner_client.get(self.format_url(path)?)).await
    }

    async fn post(&self, path: &[&str], body: &impl Serialize) -> ReqwestResult {
        let request = self.inner_client.post(self.format_url(path)?).json(body);
        self.send(request).await
    }

    async fn empty_post(&self, path: &[&str]) -> ReqwestResult {
        self.send(self.inner_client.post(self.format_url(path)?)).await
    }

    async fn patch(&self, path: &[&str], body: &impl Serialize) -> ReqwestResult {
        let request =
            self.inner_client.patch(self.format_url(path)?).json(body);
        self.send(request).await
    }

    async fn empty_patch(&self, path: &[&str]) -> ReqwestResult {
        self.send(self.inner_client.patch(self.format_url(path)?)).await
    }
}

/// Methods on the backend API
impl APIClient {
    /// Organisation-wide notifications, visible to HR.
    pub async fn list_notifications(
        &self,
    ) -> Result<Vec<Notification>, ClientError> {
        let response = self.get(&["notifications"]).await?;
        let list: responses::NotificationList = ok_body(response).await?;
        Ok(list.into_vec())
    }

    /// Notifications addressed to a single employee.
    pub async fn list_employee_notifications(
        &self,
        employee_id: &EmployeeId,
    ) -> Result<Vec<Notification>, ClientError> {
        let response = self
            .get(&["notifications", "employee", &employee_id.0])
            .await?;
        let list: responses::NotificationList = ok_body(response).await?;
        Ok(list.into_vec())
    }

    pub async fn mark_notification_read(
        &self,
        notification_id: &NotificationId,
    ) -> Result<(), ClientError> {
        let response = self
            .empty_patch(&["notifications", &notification_id.0, "read"])
            .await?;
        ok_empty(response).await
    }

    /// The signed-in user, including their subscription status.
    pub async fn current_user(
        &self,
    ) -> Result<responses::CurrentUser, ClientError> {
        let response = self.get(&["users", "me"]).await?;
        ok_body(response).await
    }

    pub async fn billing_quotas(
        &self,
    ) -> Result<responses::BillingQuotas, ClientError> {
        let response = self.get(&["v2", "billing", "quotas"]).await?;
        ok_body(response).await
    }

    /// Start a subscription. Returns the checkout page to send the user to.
    pub async fn create_subscription(
        &self,
        details: &requests::CreateSubscription,
    ) -> Result<responses::RedirectUrl, ClientError> {
        let response = self.post(&["v2", "billing", "subscriptions"], details).await?;
        ok_body(response).await
    }

    pub async fn update_subscription(
        &self,
        details: &requests::UpdateSubscription,
    ) -> Result<responses::Subscription, ClientError> {
        let response =
            self.patch(&["v2", "billing", "subscriptions"], details).await?;
        ok_body(response).await
    }

    pub async fn cancel_subscription(&self) -> Result<(), ClientError> {
        let response =
            self.empty_post(&["v2", "billing", "subscriptions", "cancel"])
                .await?;
        ok_empty(response).await
    }

    /// Open the payment processor's self-service billing portal.
    pub async fn billing_portal(
        &self,
        details: &requests::BillingPortal,
    ) -> Result<responses::RedirectUrl, ClientError> {
        let response = self
            .post(&["v2", "billing", "stripe", "billing-portal"], details)
            .await?;
        ok_body(response).await
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The session token was missing, expired or revoked.
    #[error("Your session has expired. Please sign in again.")]
    Unauthorized,
    /// An unhandled API error to display, containing response text.
    #[error("{1}")]
    APIError(StatusCode, String),
    #[error("Network error. Please check your connection.")]
    Network(#[from] reqwest::Error),
    /// The configured backend address cannot carry a request path.
    #[error("Invalid backend address: {0}")]
    InvalidUrl(String),
}

impl ClientError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }
}

/// Deserialize a successful request into the desired type, or return an
/// appropriate error.
pub async fn ok_body<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, ClientError> {
    check_status(response).await?.json::<T>().await.map_err(Into::into)
}

/// Check that an empty response is OK, returning a ClientError if not.
pub async fn ok_empty(response: reqwest::Response) -> Result<(), ClientError> {
    check_status(response).await?;
    Ok(())
}

async fn check_status(
    response: reqwest::Response,
) -> Result<reqwest::Response, ClientError> {
    let status = response.status();
    if status == StatusCode::UNAUTHORIZED {
        return Err(ClientError::Unauthorized);
    }
    if !status.is_success() {
        return Err(ClientError::APIError(status, response.text().await?));
    }
    Ok(response)
}
