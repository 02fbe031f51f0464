//! HTTP client for the Limitless admin API
//!
//! [`ApiClient`] is the admin UI's backing store: it implements [`EntityStore`]
//! against `/api/admin/collections/{collection}` and authenticates every call
//! with the bearer token of the current [`SessionContext`].

use async_trait::async_trait;
use limitless_core::{
    EntityKind, Error, Fields, ManagedEntity, Result,
    screen::EntityStore,
    session::SessionContext,
    types::{EntityPage, ErrorResponse, SessionInfo},
};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use uuid::Uuid;

/// Records requested per page when loading a whole collection
const PAGE_SIZE: i64 = 500;

/// API client for making HTTP requests to the Limitless API server
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    session: SessionContext,
}

impl ApiClient {
    /// Create a client for the API at `base_url`, authenticating with `session`
    pub fn new(base_url: impl Into<String>, session: SessionContext) -> Self {
        let base_url: String = base_url.into();
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
        }
    }

    /// API root this client talks to
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Session whose token authenticates requests
    #[must_use]
    pub const fn session(&self) -> &SessionContext {
        &self.session
    }

    fn collection_url(&self, kind: EntityKind) -> String {
        format!(
            "{}/api/admin/collections/{}",
            self.base_url,
            kind.route_segment()
        )
    }

    fn record_url(&self, kind: EntityKind, id: Uuid) -> String {
        format!("{}/{id}", self.collection_url(kind))
    }

    fn authorized(&self, request: RequestBuilder) -> Result<RequestBuilder> {
        let token = self
            .session
            .bearer_token()
            .ok_or_else(|| Error::Authentication("No active session".to_string()))?;
        Ok(request.bearer_auth(token))
    }

    async fn execute(&self, request: RequestBuilder) -> Result<Response> {
        let response = request.send().await.map_err(transport_error)?;
        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        Err(error_from_body(status, &body))
    }

    async fn json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        self.execute(request)
            .await?
            .json()
            .await
            .map_err(|e| Error::Other(format!("Failed to parse response: {e}")))
    }

    /// Check `token` against the API and return the identity behind it
    ///
    /// # Errors
    ///
    /// Returns [`Error::Authentication`] for an unknown or expired token and
    /// [`Error::Forbidden`] when the user is not an administrator.
    pub async fn fetch_session(&self, token: &str) -> Result<SessionInfo> {
        let url = format!("{}/api/admin/session", self.base_url);
        self.json(self.client.get(url).bearer_auth(token)).await
    }

    /// Revoke the current session on the server
    ///
    /// # Errors
    ///
    /// Returns an error if there is no session or the request fails.
    pub async fn logout(&self) -> Result<()> {
        let url = format!("{}/api/admin/logout", self.base_url);
        self.execute(self.authorized(self.client.post(url))?)
            .await
            .map(drop)
    }

    /// Fetch one page of a collection
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be parsed.
    pub async fn list_page(&self, kind: EntityKind, limit: i64, offset: i64) -> Result<EntityPage> {
        let request = self
            .client
            .get(self.collection_url(kind))
            .query(&[("limit", limit), ("offset", offset)]);
        self.json(self.authorized(request)?).await
    }
}

#[async_trait(?Send)]
impl EntityStore for ApiClient {
    async fn list(&self, kind: EntityKind) -> Result<Vec<ManagedEntity>> {
        let mut entities = Vec::new();
        let mut offset = 0;

        loop {
            let page = self.list_page(kind, PAGE_SIZE, offset).await?;
            entities.extend(page.items);
            match page.pagination.next_offset {
                Some(next) if page.pagination.has_next && next > offset => offset = next,
                _ => break,
            }
        }

        tracing::debug!(%kind, count = entities.len(), "Loaded collection");
        Ok(entities)
    }

    async fn create(&self, kind: EntityKind, fields: &Fields) -> Result<ManagedEntity> {
        let request = self.client.post(self.collection_url(kind)).json(fields);
        self.json(self.authorized(request)?).await
    }

    async fn update(&self, kind: EntityKind, id: Uuid, fields: &Fields) -> Result<ManagedEntity> {
        let request = self.client.put(self.record_url(kind, id)).json(fields);
        self.json(self.authorized(request)?).await
    }

    async fn delete(&self, kind: EntityKind, id: Uuid) -> Result<()> {
        let request = self.client.delete(self.record_url(kind, id));
        self.execute(self.authorized(request)?).await.map(drop)
    }
}

fn transport_error(err: reqwest::Error) -> Error {
    Error::Transport(err.to_string())
}

/// Map a failed response to an error carrying the server's message verbatim
fn error_from_body(status: StatusCode, body: &str) -> Error {
    let message = serde_json::from_str::<ErrorResponse>(body)
        .ok()
        .map(|response| response.error)
        .filter(|message| !message.trim().is_empty())
        .unwrap_or_else(|| format!("Request failed with status {status}"));

    match status {
        StatusCode::UNAUTHORIZED => Error::Authentication(message),
        StatusCode::FORBIDDEN => Error::Forbidden(message),
        StatusCode::NOT_FOUND => Error::NotFound {
            resource: "This record".to_string(),
        },
        StatusCode::TOO_MANY_REQUESTS => Error::RateLimitExceeded { message },
        other => Error::Rejected {
            status: other.as_u16(),
            message,
        },
    }
}
