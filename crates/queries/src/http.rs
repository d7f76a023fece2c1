//! HTTP-backed sources for the store-status and catalog queries.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use storefront_gate::{
    CatalogSource, CatalogTree, SourceError, SourceResult, StoreStatusRecord, StoreStatusSource,
};

/// Join a base URL and a path without doubling or dropping the slash.
pub fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

async fn get_json<T: DeserializeOwned>(client: &reqwest::Client, url: &str) -> SourceResult<T> {
    let response = client
        .get(url)
        .header(reqwest::header::ACCEPT, "application/json")
        .send()
        .await
        .map_err(|e| SourceError::Request {
            url: url.to_string(),
            message: e.to_string(),
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(SourceError::Http {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let body = response.bytes().await.map_err(|e| SourceError::Request {
        url: url.to_string(),
        message: e.to_string(),
    })?;

    decode(url, &body)
}

fn decode<T: DeserializeOwned>(url: &str, body: &[u8]) -> SourceResult<T> {
    serde_json::from_slice(body).map_err(|e| SourceError::Decode {
        url: url.to_string(),
        message: e.to_string(),
    })
}

/// Parse a store-status response body.
///
/// Endpoints answer with a list; a lone object is accepted as a list of one.
/// Only the leading record is decoded, so trailing entries can never fail the
/// body. A leading entry that is not an object yields an `Unknown` status.
pub fn parse_status_body(url: &str, body: &[u8]) -> SourceResult<Vec<StoreStatusRecord>> {
    status_records(url, decode(url, body)?)
}

fn status_records(url: &str, body: Value) -> SourceResult<Vec<StoreStatusRecord>> {
    let leading = match body {
        Value::Array(items) => match items.into_iter().next() {
            Some(first) => first,
            None => return Ok(Vec::new()),
        },
        obj @ Value::Object(_) => obj,
        other => {
            return Err(SourceError::Decode {
                url: url.to_string(),
                message: format!("expected a list or an object, got {other}"),
            })
        }
    };

    let record = serde_json::from_value(leading).unwrap_or_else(|e| {
        tracing::debug!(url, error = %e, "leading status record is not an object");
        StoreStatusRecord::default()
    });
    Ok(vec![record])
}

/// Store-status source reading `GET {base}{path}`.
pub struct HttpStoreStatusSource {
    client: reqwest::Client,
    url: String,
}

impl HttpStoreStatusSource {
    pub fn new(client: reqwest::Client, base_url: &str, path: &str) -> Self {
        Self {
            client,
            url: join_url(base_url, path),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl StoreStatusSource for HttpStoreStatusSource {
    async fn fetch_status(&self) -> SourceResult<Vec<StoreStatusRecord>> {
        let body: Value = get_json(&self.client, &self.url).await?;
        status_records(&self.url, body)
    }
}

/// Catalog source reading `GET {base}{path}`.
pub struct HttpCatalogSource {
    client: reqwest::Client,
    url: String,
}

impl HttpCatalogSource {
    pub fn new(client: reqwest::Client, base_url: &str, path: &str) -> Self {
        Self {
            client,
            url: join_url(base_url, path),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl CatalogSource for HttpCatalogSource {
    async fn fetch_catalog(&self) -> SourceResult<CatalogTree> {
        get_json(&self.client, &self.url).await
    }
}
