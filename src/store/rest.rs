//! Document store backend speaking the hosted realtime database's REST
//! protocol.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use url::Url;

use super::{DocumentStore, StoreError};

/// A hosted document store addressed over HTTPS.
///
/// Every node in the tree is addressable as `{base}/{path}.json`. Reading an
/// absent node yields JSON null. `POST` appends a child under a
/// store-generated id and echoes the id back as `{"name": id}`.
///
/// No retries or timeouts are layered on top of the HTTP client; a failed
/// round trip surfaces immediately as a [StoreError].
#[derive(Debug, Clone)]
pub struct RestStore {
    base: Url,
    auth: Option<String>,
    client: Client,
}

impl RestStore {
    /// Create a client for the database at `base`.
    ///
    /// `auth` is the database secret or access token appended to every
    /// request, if the database requires one.
    pub fn new(mut base: Url, auth: Option<String>) -> Self {
        if !base.path().ends_with('/') {
            base.set_path(&format!("{}/", base.path()));
        }

        Self {
            base,
            auth,
            client: Client::new(),
        }
    }

    fn node_url(&self, path: &str) -> Result<Url, StoreError> {
        let mut url = self
            .base
            .join(&format!("{}.json", path.trim_matches('/')))
            .map_err(|error| StoreError::new(format!("invalid store path \"{path}\": {error}")))?;

        if let Some(auth) = &self.auth {
            url.query_pairs_mut().append_pair("auth", auth);
        }

        Ok(url)
    }
}

#[derive(Deserialize)]
struct PushResponse {
    name: String,
}

fn transport(error: reqwest::Error) -> StoreError {
    StoreError {
        status: error.status().map(|status| status.as_u16()),
        message: error.to_string(),
    }
}

async fn check(response: reqwest::Response) -> Result<reqwest::Response, StoreError> {
    let status = response.status();

    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();

    Err(StoreError::with_status(
        status.as_u16(),
        format!("store responded {status}: {body}"),
    ))
}

#[async_trait]
impl DocumentStore for RestStore {
    async fn get(&self, path: &str) -> Result<Option<Value>, StoreError> {
        let url = self.node_url(path)?;
        let response = self.client.get(url).send().await.map_err(transport)?;
        let value: Value = check(response).await?.json().await.map_err(transport)?;

        Ok(match value {
            Value::Null => None,
            value => Some(value),
        })
    }

    async fn put(&self, path: &str, value: &Value) -> Result<(), StoreError> {
        let url = self.node_url(path)?;
        let response = self
            .client
            .put(url)
            .json(value)
            .send()
            .await
            .map_err(transport)?;
        check(response).await?;

        Ok(())
    }

    async fn delete(&self, path: &str) -> Result<(), StoreError> {
        let url = self.node_url(path)?;
        let response = self.client.delete(url).send().await.map_err(transport)?;
        check(response).await?;

        Ok(())
    }

    async fn push(&self, path: &str, value: &Value) -> Result<String, StoreError> {
        let url = self.node_url(path)?;
        let response = self
            .client
            .post(url)
            .json(value)
            .send()
            .await
            .map_err(transport)?;
        let push: PushResponse = check(response).await?.json().await.map_err(transport)?;

        Ok(push.name)
    }
}
