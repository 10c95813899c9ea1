//! Authenticated JSON-over-HTTPS transport shared by every resource facade.

use std::borrow::Cow;
use std::fmt;

use bytes::{Buf, Bytes};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Method, StatusCode, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::validate::Validate;
use crate::{Error, Result};

/// Default ZeptoMail API root.
pub const DEFAULT_BASE_URL: &str = "https://api.zeptomail.com/v1.1";

/// Path segment replaced by the transport's mail agent alias.
const AGENT_SEGMENT: &str = "{agent}";

const APPLICATION_JSON: &str = "application/json";

/// The HTTP response as the server sent it.
///
/// The body has already been read into memory, so it can be inspected any
/// number of times after the typed payload was decoded from it.
#[derive(Debug, Clone)]
pub struct RawResponse {
    status: StatusCode,
    headers: HeaderMap,
    url: Url,
    body: Bytes,
}

impl RawResponse {
    /// HTTP status code.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Response headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Final URL of the request (after redirects).
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// The exact body bytes received.
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// The body as text, replacing invalid UTF-8.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    /// A fresh [`std::io::Read`] over the body.
    pub fn reader(&self) -> bytes::buf::Reader<Bytes> {
        self.body.clone().reader()
    }

    /// Consume the response and keep only the body.
    pub fn into_body(self) -> Bytes {
        self.body
    }
}

/// A decoded response together with the raw response it came from.
#[derive(Debug, Clone)]
pub struct WrappedResponse<T> {
    /// Status, headers and replayable body.
    pub raw_response: RawResponse,
    /// The decoded body, or `T::default()` when the body was empty.
    pub data: T,
}

impl<T> WrappedResponse<T> {
    /// HTTP status code of the response.
    pub fn status(&self) -> StatusCode {
        self.raw_response.status
    }

    /// `true` for any 2xx status.
    pub fn is_success(&self) -> bool {
        self.raw_response.status.is_success()
    }

    /// Discard the raw response and keep the decoded data.
    pub fn into_data(self) -> T {
        self.data
    }
}

struct Body {
    bytes: Bytes,
    content_type: Option<HeaderValue>,
}

/// One authenticated connection to the ZeptoMail API.
///
/// A `Transport` owns a base URL, a mail agent alias and a single credential
/// that is sent verbatim as the `Authorization` header. It is cheap to share
/// behind an `Arc` and safe to use from many tasks at once.
#[derive(Clone)]
pub struct Transport {
    http: reqwest::Client,
    base_url: Url,
    mail_agent: String,
    credential: String,
}

impl fmt::Debug for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transport")
            .field("base_url", &self.base_url.as_str())
            .field("mail_agent", &self.mail_agent)
            .field("credential", &"<redacted>")
            .finish()
    }
}

impl Transport {
    /// Create a transport rooted at `base_url`.
    ///
    /// `credential` is used as-is; scheme prefixes such as
    /// `Zoho-enczapikey` are applied by [`ClientBuilder`](crate::ClientBuilder).
    pub fn new(
        base_url: &str,
        mail_agent: impl Into<String>,
        credential: impl Into<String>,
        http: reqwest::Client,
    ) -> Result<Self> {
        let url = Url::parse(base_url)
            .map_err(|e| Error::Config(format!("invalid base url {base_url:?}: {e}")))?;
        if url.scheme().is_empty() {
            return Err(Error::Config("url scheme is required".into()));
        }
        if url.cannot_be_a_base() {
            return Err(Error::Config(format!(
                "base url {base_url:?} cannot carry a path"
            )));
        }

        Ok(Self {
            http,
            base_url: url,
            mail_agent: mail_agent.into(),
            credential: credential.into(),
        })
    }

    /// The API root every endpoint is resolved against.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Mail agent alias substituted for `{agent}` in paths.
    pub fn mail_agent(&self) -> &str {
        &self.mail_agent
    }

    /// `true` when no credential was configured for this transport.
    pub fn has_credential(&self) -> bool {
        !self.credential.is_empty()
    }

    /// Build the absolute URL for `path` under the base URL.
    ///
    /// Each `/`-separated segment is appended to the base path and
    /// percent-encoded; a `{agent}` segment is replaced with the mail agent.
    /// `query` pairs are form-encoded.
    pub fn endpoint(&self, path: &str, query: &[(&str, &str)]) -> Url {
        self.build_url(path, None, query)
    }

    /// Like [`endpoint`](Self::endpoint), with `key` appended as one more
    /// segment. `key` is never split: `/` and `%` in it are percent-encoded.
    /// The dot segments `.` and `..` cannot be expressed and are dropped, so
    /// callers must reject them first.
    pub fn keyed_endpoint(&self, path: &str, key: &str) -> Url {
        self.build_url(path, Some(key), &[])
    }

    fn build_url(&self, path: &str, key: Option<&str>, query: &[(&str, &str)]) -> Url {
        let mut url = self.base_url.clone();
        // cannot_be_a_base was rejected in new()
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty();
            for segment in path.split('/').filter(|s| !s.is_empty()) {
                if segment == AGENT_SEGMENT {
                    segments.push(&self.mail_agent);
                } else {
                    segments.push(segment);
                }
            }
            if let Some(key) = key {
                segments.push(key);
            }
        }
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        url
    }

    /// Send a JSON request and decode the JSON response.
    ///
    /// A payload that is `None` or equal to `S::default()` is treated as
    /// absent: it is not validated, no body is sent and no `Content-Type` is
    /// set. A present payload is validated first and encoded as JSON with
    /// `Content-Type: application/json`. `headers` are applied last and
    /// replace any default with the same name.
    pub async fn invoke<S, R>(
        &self,
        cancel: &CancellationToken,
        method: Method,
        endpoint: Url,
        headers: HeaderMap,
        payload: Option<&S>,
    ) -> Result<WrappedResponse<R>>
    where
        S: Serialize + Validate + Default + PartialEq,
        R: DeserializeOwned + Default,
    {
        let body = match payload.filter(|p| **p != S::default()) {
            Some(payload) => {
                payload.validate()?;
                let json = serde_json::to_vec(payload).map_err(Error::Encoding)?;
                Some(Body {
                    bytes: Bytes::from(json),
                    content_type: Some(HeaderValue::from_static(APPLICATION_JSON)),
                })
            }
            None => None,
        };

        self.dispatch(cancel, method, endpoint, headers, body).await
    }

    /// Send `body` verbatim and decode the JSON response.
    ///
    /// No `Content-Type` default is applied; pass one in `headers`.
    pub async fn invoke_raw<R>(
        &self,
        cancel: &CancellationToken,
        method: Method,
        endpoint: Url,
        headers: HeaderMap,
        body: Bytes,
    ) -> Result<WrappedResponse<R>>
    where
        R: DeserializeOwned + Default,
    {
        let body = Body {
            bytes: body,
            content_type: None,
        };
        self.dispatch(cancel, method, endpoint, headers, Some(body))
            .await
    }

    async fn dispatch<R>(
        &self,
        cancel: &CancellationToken,
        method: Method,
        endpoint: Url,
        headers: HeaderMap,
        body: Option<Body>,
    ) -> Result<WrappedResponse<R>>
    where
        R: DeserializeOwned + Default,
    {
        let request = self.build_request(method, endpoint, headers, body)?;

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(Error::Cancelled),
            result = self.execute(request) => result,
        }
    }

    fn build_request(
        &self,
        method: Method,
        endpoint: Url,
        overrides: HeaderMap,
        body: Option<Body>,
    ) -> Result<reqwest::Request> {
        let mut auth = HeaderValue::from_str(&self.credential)
            .map_err(|e| Error::Build(format!("invalid authorization header: {e}")))?;
        auth.set_sensitive(true);

        let mut request = reqwest::Request::new(method, endpoint);
        let headers = request.headers_mut();
        if let Some(content_type) = body.as_ref().and_then(|b| b.content_type.clone()) {
            headers.insert(CONTENT_TYPE, content_type);
        }
        headers.insert(AUTHORIZATION, auth);
        for name in overrides.keys() {
            headers.remove(name);
            for value in overrides.get_all(name) {
                headers.append(name.clone(), value.clone());
            }
        }

        if let Some(body) = body {
            *request.body_mut() = Some(body.bytes.into());
        }
        Ok(request)
    }

    async fn execute<R>(&self, request: reqwest::Request) -> Result<WrappedResponse<R>>
    where
        R: DeserializeOwned + Default,
    {
        debug!(
            method = %request.method(),
            url = %request.url(),
            has_body = request.body().is_some(),
            "dispatching request"
        );

        let response = self.http.execute(request).await?;
        let status = response.status();
        let headers = response.headers().clone();
        let url = response.url().clone();

        let body = match response.bytes().await {
            Ok(body) => body,
            Err(source) => {
                let partial = RawResponse {
                    status,
                    headers,
                    url,
                    body: Bytes::new(),
                };
                return Err(Error::Request {
                    source,
                    response: Some(Box::new(partial)),
                });
            }
        };
        debug!(%status, bytes = body.len(), "response received");

        let raw_response = RawResponse {
            status,
            headers,
            url,
            body,
        };
        match decode(&raw_response.body) {
            Ok(data) => Ok(WrappedResponse { raw_response, data }),
            Err(source) => {
                warn!(%status, error = %source, "response body did not match the expected shape");
                Err(Error::Decoding {
                    source,
                    response: Box::new(raw_response),
                })
            }
        }
    }
}

/// Decode `body` as JSON; an empty (or all-whitespace) body yields `R::default()`.
fn decode<R: DeserializeOwned + Default>(body: &[u8]) -> serde_json::Result<R> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(R::default());
    }
    serde_json::from_slice(body)
}
