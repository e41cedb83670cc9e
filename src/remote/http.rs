//! HTTP implementation of [`RemoteStore`].
//!
//! Talks JSON to a REST-style service, switching to a multipart body when a
//! document upload is attached. Every request except those under an `/auth/`
//! path carries a bearer credential; when none is available the call fails with
//! [`CatalogError::AuthorizationMissing`] without touching the network.
//!
//! # Endpoints
//!
//! ```text
//! GET    {api}/items        -> [item] | {data: [item]}
//! POST   {api}/items        -> item          (JSON or multipart)
//! PUT    {api}/items/{id}   -> item          (JSON or multipart)
//! DELETE {api}/items/{id}   -> (ignored)
//! POST   {api}/search       -> {results: [...], searchType?}
//! ```

use crate::domain::error::{CatalogError, Result};
use crate::domain::{FileAttachment, Item, ItemId};
use crate::remote::backend::RemoteStore;
use crate::remote::credentials::TokenSource;
use crate::remote::models::{
    decode_item_list, ErrorEnvelope, ItemFields, ItemPayload, SearchRequest, SearchResponse,
    FILE_PART_NAME,
};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

/// Returns whether a request path is exempt from the bearer credential.
#[must_use]
pub fn is_auth_path(path: &str) -> bool {
    path.contains("/auth/")
}

/// REST client for the remote store.
pub struct HttpRemote {
    client: Client,
    api_base: String,
    tokens: Arc<dyn TokenSource>,
}

impl HttpRemote {
    /// Creates a client rooted at `api_base` (for example
    /// `http://localhost:5555/api`).
    ///
    /// Without a `timeout` requests wait as long as the transport default
    /// allows.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Config`] if the HTTP client cannot be built.
    pub fn new(
        api_base: impl Into<String>,
        tokens: Arc<dyn TokenSource>,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| CatalogError::Config(format!("failed to create HTTP client: {e}")))?;

        let api_base = api_base.into().trim_end_matches('/').to_string();
        tracing::debug!(api_base = %api_base, "http remote initialized");

        Ok(Self {
            client,
            api_base,
            tokens,
        })
    }

    #[must_use]
    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// Starts a request, attaching the bearer credential.
    ///
    /// Fails before anything is sent when a protected path has no credential.
    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        let token = self.tokens.token();
        if token.is_none() && !is_auth_path(path) {
            tracing::debug!(path = %path, "refusing request without credential");
            return Err(CatalogError::AuthorizationMissing);
        }

        let builder = self.client.request(method, format!("{}{path}", self.api_base));
        Ok(match token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        })
    }

    /// Sends a request and turns non-success statuses into errors.
    ///
    /// A failure body with a `message` field becomes [`CatalogError::Remote`];
    /// anything else is a transport failure.
    async fn execute(builder: RequestBuilder) -> Result<Response> {
        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorEnvelope>(&body)
            .ok()
            .and_then(|envelope| envelope.message)
            .filter(|m| !m.trim().is_empty());

        tracing::debug!(
            status = status.as_u16(),
            has_message = message.is_some(),
            "remote request failed"
        );

        Err(match message {
            Some(message) => CatalogError::Remote {
                status: Some(status.as_u16()),
                message,
            },
            None => CatalogError::Transport(format!(
                "Request failed with status code {}",
                status.as_u16()
            )),
        })
    }

    async fn read_json(response: Response) -> Result<Value> {
        response
            .json::<Value>()
            .await
            .map_err(|e| CatalogError::Decode(format!("invalid JSON body: {e}")))
    }

    /// Like [`read_json`](Self::read_json), but a body that is not JSON reads
    /// as `null` so shape-tolerant decoders can default it.
    async fn read_json_lenient(response: Response) -> Value {
        match response.json::<Value>().await {
            Ok(body) => body,
            Err(e) => {
                tracing::debug!(error = %e, "response body is not JSON, treating as null");
                Value::Null
            }
        }
    }

    /// Decodes a single item, accepting a bare record or a `{data: item}` envelope.
    fn decode_item(body: Value) -> Result<Item> {
        let record = match body {
            Value::Object(mut map) if !map.contains_key("_id") && map.contains_key("data") => {
                map.remove("data").unwrap_or(Value::Null)
            }
            other => other,
        };
        serde_json::from_value(record)
            .map_err(|e| CatalogError::Decode(format!("invalid item in response: {e}")))
    }

    fn attach_payload(builder: RequestBuilder, payload: ItemPayload) -> Result<RequestBuilder> {
        Ok(match payload {
            ItemPayload::Fields(fields) => builder.json(&fields),
            ItemPayload::Multipart { fields, file } => {
                builder.multipart(Self::build_form(&fields, file)?)
            }
        })
    }

    fn build_form(fields: &ItemFields, file: FileAttachment) -> Result<Form> {
        let mut form = fields
            .form_fields()
            .into_iter()
            .fold(Form::new(), |form, (name, value)| form.text(name, value));

        let FileAttachment {
            file_name,
            content_type,
            bytes,
        } = file;
        let mut part = Part::bytes(bytes).file_name(file_name);
        if let Some(content_type) = content_type {
            part = part.mime_str(&content_type)?;
        }
        form = form.part(FILE_PART_NAME, part);
        Ok(form)
    }

    fn item_path(id: &ItemId) -> String {
        format!("/items/{id}")
    }
}

#[async_trait]
impl RemoteStore for HttpRemote {
    async fn list_items(&self) -> Result<Vec<Item>> {
        let response = Self::execute(self.request(Method::GET, "/items")?).await?;
        Ok(decode_item_list(Self::read_json_lenient(response).await))
    }

    async fn create_item(&self, payload: ItemPayload) -> Result<Item> {
        let builder = Self::attach_payload(self.request(Method::POST, "/items")?, payload)?;
        let response = Self::execute(builder).await?;
        Self::decode_item(Self::read_json(response).await?)
    }

    async fn update_item(&self, id: &ItemId, payload: ItemPayload) -> Result<Item> {
        let request = self.request(Method::PUT, &Self::item_path(id))?;
        let builder = Self::attach_payload(request, payload)?;
        let response = Self::execute(builder).await?;
        Self::decode_item(Self::read_json(response).await?)
    }

    async fn delete_item(&self, id: &ItemId) -> Result<()> {
        Self::execute(self.request(Method::DELETE, &Self::item_path(id))?).await?;
        Ok(())
    }

    async fn search(&self, request: SearchRequest) -> Result<SearchResponse> {
        let builder = self.request(Method::POST, "/search")?.json(&request);
        let response = Self::execute(builder).await?;
        Ok(SearchResponse::decode(&Self::read_json_lenient(response).await))
    }
}

impl std::fmt::Debug for HttpRemote {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpRemote")
            .field("api_base", &self.api_base)
            .finish_non_exhaustive()
    }
}
