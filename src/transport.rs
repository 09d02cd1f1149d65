use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue, USER_AGENT};

use crate::error::GtopError;

/// What came back from one HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: String,
}

impl HttpReply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Blocking HTTP seam used by both service clients.
pub trait Transport: Send + Sync {
    fn get(&self, url: &str) -> Result<HttpReply, GtopError>;
    fn post(&self, url: &str, body: &str, content_type: &str) -> Result<HttpReply, GtopError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn get(&self, url: &str) -> Result<HttpReply, GtopError> {
        (**self).get(url)
    }

    fn post(&self, url: &str, body: &str, content_type: &str) -> Result<HttpReply, GtopError> {
        (**self).post(url, body, content_type)
    }
}

#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self, GtopError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("gtop-xref/{}", env!("CARGO_PKG_VERSION")))
                .map_err(|err| GtopError::Http(err.to_string()))?,
        );
        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|err| GtopError::Http(err.to_string()))?;
        Ok(Self { client })
    }

    fn into_reply(response: reqwest::blocking::Response) -> Result<HttpReply, GtopError> {
        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string());
        let body = response
            .text()
            .map_err(|err| GtopError::Http(err.to_string()))?;
        Ok(HttpReply {
            status,
            content_type,
            body,
        })
    }
}

impl Transport for HttpTransport {
    fn get(&self, url: &str) -> Result<HttpReply, GtopError> {
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|err| GtopError::Http(err.to_string()))?;
        Self::into_reply(response)
    }

    fn post(&self, url: &str, body: &str, content_type: &str) -> Result<HttpReply, GtopError> {
        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, content_type)
            .body(body.to_string())
            .send()
            .map_err(|err| GtopError::Http(err.to_string()))?;
        Self::into_reply(response)
    }
}
