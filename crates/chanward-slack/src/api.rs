//! Slack Web API client.
//!
//! [`SlackApiClient`] implements [`SlackApi`] over HTTPS. Read methods use
//! `GET` with query parameters, write methods `POST` a JSON body. Responses
//! are decoded in two steps: the common `ok`/`error`/`needed` fields are
//! classified into a [`SlackError`], then the method-specific payload is
//! deserialized.

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use chanward_types::secret::SecretString;
use chanward_types::{BotIdentity, Channel, HistoryMessage, SlackError, User};

use crate::traits::{Page, SlackApi};
use crate::wire::{
    ApiStatus, AuthTestResponse, ConversationsListResponse, Empty, HistoryResponse,
    PostMessageResponse, UsersListResponse,
};

/// Base URL for the Slack Web API.
pub const SLACK_API_BASE: &str = "https://slack.com/api";

/// Wait assumed when Slack rate-limits without a usable `Retry-After`.
pub const DEFAULT_RETRY_AFTER_MS: u64 = 30_000;

/// Longest `Retry-After` honoured. Larger values are clamped.
pub const MAX_RETRY_AFTER_MS: u64 = 10 * 60_000;

/// Page size for `conversations.list` and `users.list`.
const PAGE_LIMIT: u32 = 200;

/// HTTP client for the Slack Web API.
pub struct SlackApiClient {
    http: Client,
    token: SecretString,
    base_url: String,
}

impl SlackApiClient {
    /// Create a client against the public Slack API.
    pub fn new(token: SecretString) -> Self {
        Self::with_base_url(token, SLACK_API_BASE.to_owned())
    }

    /// Create a client pointing at a custom base URL (proxies, mock servers).
    pub fn with_base_url(token: SecretString, base_url: String) -> Self {
        Self {
            http: Client::new(),
            token,
            base_url: base_url.trim_end_matches('/').to_owned(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, method: &str) -> String {
        format!("{}/{method}", self.base_url)
    }

    async fn get<T: DeserializeOwned>(
        &self,
        method: &str,
        query: &[(&str, String)],
    ) -> Result<T, SlackError> {
        debug!(method, "slack GET");
        let resp = self
            .http
            .get(self.url(method))
            .bearer_auth(self.token.expose())
            .query(query)
            .send()
            .await
            .map_err(|e| SlackError::Http(e.to_string()))?;
        decode(method, query_channel(query), resp).await
    }

    async fn post<T: DeserializeOwned>(&self, method: &str, body: Value) -> Result<T, SlackError> {
        debug!(method, "slack POST");
        let channel = body
            .get("channel")
            .and_then(Value::as_str)
            .map(str::to_owned);
        let resp = self
            .http
            .post(self.url(method))
            .bearer_auth(self.token.expose())
            .header("Content-Type", "application/json; charset=utf-8")
            .json(&body)
            .send()
            .await
            .map_err(|e| SlackError::Http(e.to_string()))?;
        decode(method, channel.as_deref(), resp).await
    }
}

fn query_channel<'a>(query: &'a [(&str, String)]) -> Option<&'a str> {
    query
        .iter()
        .find(|(k, _)| *k == "channel")
        .map(|(_, v)| v.as_str())
}

/// Turn an HTTP response into a typed payload or a classified error.
async fn decode<T: DeserializeOwned>(
    method: &str,
    channel: Option<&str>,
    resp: Response,
) -> Result<T, SlackError> {
    let status = resp.status();

    if status.as_u16() == 429 {
        let retry_after_ms = parse_retry_after(&resp).unwrap_or(DEFAULT_RETRY_AFTER_MS);
        warn!(method, retry_after_ms, "slack rate limit");
        return Err(SlackError::RateLimited { retry_after_ms });
    }

    let body = resp
        .text()
        .await
        .map_err(|e| SlackError::Http(e.to_string()))?;

    if !status.is_success() {
        return Err(SlackError::Http(format!("HTTP {}: {body}", status.as_u16())));
    }

    let value: Value = serde_json::from_str(&body)
        .map_err(|e| SlackError::InvalidResponse(format!("{method}: {e}")))?;
    let api_status: ApiStatus = serde_json::from_value(value.clone())
        .map_err(|e| SlackError::InvalidResponse(format!("{method}: {e}")))?;

    if !api_status.ok {
        let code = api_status.error.unwrap_or_else(|| "unknown_error".into());
        return Err(classify(method, &code, api_status.needed, channel));
    }

    serde_json::from_value(value).map_err(|e| SlackError::InvalidResponse(format!("{method}: {e}")))
}

/// Map a Slack `error` code onto a [`SlackError`] variant.
pub fn classify(method: &str, code: &str, needed: Option<String>, channel: Option<&str>) -> SlackError {
    match code {
        "ratelimited" | "rate_limited" => SlackError::RateLimited {
            retry_after_ms: DEFAULT_RETRY_AFTER_MS,
        },
        "missing_scope" => SlackError::MissingScope {
            method: method.to_owned(),
            needed: needed.unwrap_or_else(|| "unknown".into()),
        },
        "channel_not_found" | "user_not_found" | "not_found" => SlackError::NotFound {
            method: method.to_owned(),
            error: code.to_owned(),
        },
        "not_in_channel" => SlackError::NotInChannel {
            channel: channel.unwrap_or("?").to_owned(),
        },
        other => SlackError::Api {
            method: method.to_owned(),
            error: other.to_owned(),
        },
    }
}

fn parse_retry_after(resp: &Response) -> Option<u64> {
    retry_after_ms(resp.headers().get("retry-after")?.to_str().ok()?)
}

/// `Retry-After` in seconds, as Slack sends it, converted to milliseconds
/// and clamped to [`MAX_RETRY_AFTER_MS`].
fn retry_after_ms(raw: &str) -> Option<u64> {
    let secs: f64 = raw.trim().parse().ok()?;
    if secs.is_nan() {
        return None;
    }
    Some((secs * 1000.0).clamp(0.0, MAX_RETRY_AFTER_MS as f64) as u64)
}

#[async_trait]
impl SlackApi for SlackApiClient {
    async fn auth_test(&self) -> Result<BotIdentity, SlackError> {
        let resp: AuthTestResponse = self.get("auth.test", &[]).await?;
        Ok(resp.into())
    }

    async fn list_channels(&self, cursor: Option<&str>) -> Result<Page<Channel>, SlackError> {
        let mut query = vec![
            ("types", "public_channel".to_owned()),
            ("exclude_archived", "true".to_owned()),
            ("limit", PAGE_LIMIT.to_string()),
        ];
        if let Some(c) = cursor {
            query.push(("cursor", c.to_owned()));
        }
        let resp: ConversationsListResponse = self.get("conversations.list", &query).await?;
        Ok(Page {
            next_cursor: resp.response_metadata.and_then(|m| m.cursor()),
            items: resp
                .channels
                .into_iter()
                .filter_map(|c| c.into_channel())
                .collect(),
        })
    }

    async fn history(
        &self,
        channel_id: &str,
        limit: u32,
    ) -> Result<Vec<HistoryMessage>, SlackError> {
        let query = [
            ("channel", channel_id.to_owned()),
            ("limit", limit.to_string()),
        ];
        let resp: HistoryResponse = self.get("conversations.history", &query).await?;
        Ok(resp
            .messages
            .into_iter()
            .filter_map(|m| m.into_message())
            .collect())
    }

    async fn post_message(&self, channel_id: &str, text: &str) -> Result<String, SlackError> {
        let body = serde_json::json!({
            "channel": channel_id,
            "text": text,
            "unfurl_links": false,
        });
        let resp: PostMessageResponse = self.post("chat.postMessage", body).await?;
        resp.ts.ok_or_else(|| {
            SlackError::InvalidResponse("chat.postMessage returned ok but no ts".into())
        })
    }

    async fn join(&self, channel_id: &str) -> Result<(), SlackError> {
        let body = serde_json::json!({ "channel": channel_id });
        let _: Empty = self.post("conversations.join", body).await?;
        Ok(())
    }

    async fn archive(&self, channel_id: &str) -> Result<(), SlackError> {
        let body = serde_json::json!({ "channel": channel_id });
        match self.post::<Empty>("conversations.archive", body).await {
            Ok(_) => Ok(()),
            Err(SlackError::Api { error, .. }) if error == "already_archived" => {
                debug!(channel = channel_id, "channel already archived");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    async fn list_users(&self, cursor: Option<&str>) -> Result<Page<User>, SlackError> {
        let mut query = vec![("limit", PAGE_LIMIT.to_string())];
        if let Some(c) = cursor {
            query.push(("cursor", c.to_owned()));
        }
        let resp: UsersListResponse = self.get("users.list", &query).await?;
        Ok(Page {
            next_cursor: resp.response_metadata.and_then(|m| m.cursor()),
            items: resp.members.into_iter().map(User::from).collect(),
        })
    }
}

impl std::fmt::Debug for SlackApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlackApiClient")
            .field("base_url", &self.base_url)
            .field("token", &self.token)
            .finish()
    }
}
