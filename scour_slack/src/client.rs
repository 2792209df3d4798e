use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::RETRY_AFTER;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;
use tracing::{debug, info};

use scour_core::{Conversation, ConversationKind, Error, Message, Page, SlackApi};

use crate::api::{AuthTestBody, EmptyBody, Envelope, HistoryBody, ListBody, ResponseMetadata};
use crate::retry::{BackoffPolicy, CallError, RetryState};

/// Page size requested from the listing and history endpoints.
pub const PAGE_LIMIT: u32 = 200;

/// HTTP client for the Slack Web API with built-in rate-limit handling.
///
/// Every request runs under the retry decorator while holding the client's
/// retry-state lock, so calls are strictly serialized and each observed
/// throttle signal shapes the delay of the next call.
pub struct SlackClient {
    http: Client,
    token: String,
    base_url: String,
    retry: Mutex<RetryState>,
}

impl SlackClient {
    #[must_use]
    pub fn new(token: String) -> Self {
        Self::with_policy(token, BackoffPolicy::default())
    }

    #[must_use]
    pub fn with_policy(token: String, policy: BackoffPolicy) -> Self {
        info!("Creating SlackClient");
        Self {
            http: Client::new(),
            token,
            base_url: "https://slack.com/api".to_string(),
            retry: Mutex::new(RetryState::new(policy)),
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    /// Run one logical API call under the shared retry state. Holding the
    /// lock for the whole call (sleeps included) is what serializes requests.
    async fn call<T, F, Fut>(&self, operation: F) -> Result<T, Error>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, CallError>>,
    {
        let mut retry = self.retry.lock().await;
        retry.run(operation).await
    }

    async fn get<T: DeserializeOwned>(
        &self,
        method: &str,
        query: &[(String, String)],
    ) -> Result<T, CallError> {
        let response = self
            .http
            .get(format!("{}/{method}", self.base_url))
            .bearer_auth(&self.token)
            .query(query)
            .send()
            .await
            .map_err(|e| CallError::Network(e.to_string()))?;
        Self::decode(response).await
    }

    async fn post<T: DeserializeOwned>(
        &self,
        method: &str,
        body: &serde_json::Value,
    ) -> Result<T, CallError> {
        let response = self
            .http
            .post(format!("{}/{method}", self.base_url))
            .bearer_auth(&self.token)
            .json(body)
            .send()
            .await
            .map_err(|e| CallError::Network(e.to_string()))?;
        Self::decode(response).await
    }

    /// Map transport status to the retry classification before touching the
    /// body: 429 carries the service's suggested delay in `Retry-After`.
    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, CallError> {
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .map(Duration::from_secs);
            debug!("HTTP 429, retry-after: {retry_after:?}");
            return Err(CallError::Throttled { retry_after });
        }
        if status.is_server_error() {
            return Err(CallError::Network(format!("server error: {status}")));
        }
        if !status.is_success() {
            return Err(CallError::Fatal(Error::request(format!(
                "http_{}",
                status.as_u16()
            ))));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| CallError::Network(format!("invalid response body: {e}")))
    }
}

#[async_trait]
impl SlackApi for SlackClient {
    async fn identity(&self) -> Result<String, Error> {
        let body: AuthTestBody = self
            .call(|| async {
                self.get::<Envelope<AuthTestBody>>("auth.test", &[])
                    .await?
                    .into_body()
            })
            .await?;

        body.user_id
            .ok_or_else(|| Error::request("auth_test_missing_user_id"))
    }

    async fn list_conversations(
        &self,
        kinds: &[ConversationKind],
        cursor: Option<&str>,
    ) -> Result<Page<Conversation>, Error> {
        let types = kinds
            .iter()
            .map(|k| k.api_name())
            .collect::<Vec<_>>()
            .join(",");

        let mut query = vec![
            ("types".to_string(), types),
            ("limit".to_string(), PAGE_LIMIT.to_string()),
        ];
        if let Some(c) = cursor {
            query.push(("cursor".to_string(), c.to_string()));
        }

        let body: ListBody = self
            .call(|| async {
                self.get::<Envelope<ListBody>>("conversations.list", &query)
                    .await?
                    .into_body()
            })
            .await?;

        Ok(Page {
            items: body.channels.into_iter().map(Into::into).collect(),
            next_cursor: body.response_metadata.and_then(ResponseMetadata::cursor),
        })
    }

    async fn history(
        &self,
        conversation_id: &str,
        cursor: Option<&str>,
    ) -> Result<Page<Message>, Error> {
        let mut query = vec![
            ("channel".to_string(), conversation_id.to_string()),
            ("limit".to_string(), PAGE_LIMIT.to_string()),
        ];
        if let Some(c) = cursor {
            query.push(("cursor".to_string(), c.to_string()));
        }

        let body: HistoryBody = self
            .call(|| async {
                self.get::<Envelope<HistoryBody>>("conversations.history", &query)
                    .await?
                    .into_body()
            })
            .await?;

        Ok(Page {
            items: body.messages.into_iter().map(Into::into).collect(),
            next_cursor: body.response_metadata.and_then(ResponseMetadata::cursor),
        })
    }

    async fn delete_message(&self, conversation_id: &str, ts: &str) -> Result<(), Error> {
        let payload = serde_json::json!({
            "channel": conversation_id,
            "ts": ts,
        });

        self.call(|| async {
            self.post::<Envelope<EmptyBody>>("chat.delete", &payload)
                .await?
                .into_body()
        })
        .await?;

        Ok(())
    }
}
