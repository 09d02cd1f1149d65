use reqwest::Url;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::domain::Attempts;
use crate::error::GtopError;
use crate::retry::RetryPolicy;
use crate::transport::Transport;

pub const GTOP_BASE_URL: &str = "https://www.guidetopharmacology.org/services/";

/// JSON client for the Guide to PHARMACOLOGY web services.
///
/// Every request is retried under the configured [`RetryPolicy`]. A request
/// that never yields usable JSON comes back as `None`: "no such record" and
/// "service down" look the same from here.
pub struct GtopClient<T: Transport> {
    transport: T,
    base_url: Url,
    retry: RetryPolicy,
}

impl<T: Transport> GtopClient<T> {
    pub fn new(transport: T, base_url: &str, retry: RetryPolicy) -> Result<Self, GtopError> {
        Ok(Self {
            transport,
            base_url: parse_base_url(base_url)?,
            retry,
        })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    pub fn retry(&self) -> RetryPolicy {
        self.retry
    }

    pub fn url_for(&self, query: &str) -> String {
        format!("{}{}", self.base_url, query.trim_start_matches('/'))
    }

    pub fn fetch(&self, query: &str) -> Option<Value> {
        self.fetch_url(&self.url_for(query), self.retry)
    }

    /// Like [`fetch`](Self::fetch) with a per-call attempt count. The count is
    /// validated before anything touches the network.
    pub fn fetch_with_attempts(
        &self,
        query: &str,
        attempts: i64,
    ) -> Result<Option<Value>, GtopError> {
        let attempts = Attempts::new(attempts)?;
        Ok(self.fetch_url(&self.url_for(query), self.retry.with_attempts(attempts)))
    }

    /// Fetches `path` with `criteria` appended as an encoded query string.
    pub fn fetch_search(&self, path: &str, criteria: &[(&str, &str)]) -> Option<Value> {
        let mut url = self.base_url.join(path.trim_start_matches('/')).ok()?;
        if !criteria.is_empty() {
            url.query_pairs_mut().extend_pairs(criteria);
        }
        self.fetch_url(url.as_str(), self.retry)
    }

    fn fetch_url(&self, url: &str, retry: RetryPolicy) -> Option<Value> {
        retry.run(url, || {
            let reply = self.transport.get(url)?;
            if !reply.is_success() {
                return Err(GtopError::Status {
                    status: reply.status,
                    message: "GtoP request failed".to_string(),
                });
            }
            if reply.body.trim().is_empty() {
                return Err(GtopError::Payload("empty body".to_string()));
            }
            serde_json::from_str(&reply.body).map_err(|err| GtopError::Payload(err.to_string()))
        })
    }

    /// Fetches a JSON array and deserialises each element, skipping the ones
    /// that do not fit `R`. Anything other than an array reads as empty.
    pub fn fetch_list<R: DeserializeOwned>(&self, query: &str) -> Vec<R> {
        list_from(self.fetch(query), query)
    }

    pub fn fetch_search_list<R: DeserializeOwned>(
        &self,
        path: &str,
        criteria: &[(&str, &str)],
    ) -> Vec<R> {
        list_from(self.fetch_search(path, criteria), path)
    }

    /// Fetches a JSON object into `R`, falling back to `R::default()`.
    pub fn fetch_object<R: DeserializeOwned + Default>(&self, query: &str) -> R {
        match self.fetch(query) {
            Some(value @ Value::Object(_)) => serde_json::from_value(value).unwrap_or_else(|err| {
                debug!(query, error = %err, "malformed object, using defaults");
                R::default()
            }),
            _ => R::default(),
        }
    }
}

fn list_from<R: DeserializeOwned>(value: Option<Value>, query: &str) -> Vec<R> {
    match value {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| match serde_json::from_value(item) {
                Ok(parsed) => Some(parsed),
                Err(err) => {
                    debug!(query, error = %err, "skipping malformed list entry");
                    None
                }
            })
            .collect(),
        _ => Vec::new(),
    }
}

pub(crate) fn parse_base_url(base_url: &str) -> Result<Url, GtopError> {
    let mut normalized = base_url.trim().to_string();
    if !normalized.ends_with('/') {
        normalized.push('/');
    }
    Url::parse(&normalized).map_err(|err| GtopError::InvalidBaseUrl {
        url: base_url.to_string(),
        message: err.to_string(),
    })
}
