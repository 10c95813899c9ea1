//! File cache: upload attachments once, reference them by key.

use std::sync::Arc;

use bytes::Bytes;
use reqwest::Method;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::Result;
use crate::models::ApiError;
use crate::transport::{Transport, WrappedResponse};
use crate::validate::{Rules, Validate};

/// A file to upload. The content is sent as-is, not base64-encoded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileCacheUploadReq {
    pub file_name: String,
    pub content: Bytes,
}

impl FileCacheUploadReq {
    pub fn new(file_name: impl Into<String>, content: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            content: content.into(),
        }
    }
}

impl Validate for FileCacheUploadReq {
    fn check(&self, rules: &mut Rules<'_>) {
        rules
            .required("file_name", &self.file_name)
            .required("content", &self.content);
    }
}

/// Response to an upload. `file_cache_key` goes into
/// [`EmailAttachment::file_cache_key`](crate::EmailAttachment::file_cache_key).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileCacheUploadRes {
    pub file_cache_key: String,
    pub data: Vec<serde_json::Value>,
    pub message: String,
    pub object: String,
    pub request_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
}

/// File cache API. Authenticated with the send API key.
#[derive(Debug, Clone)]
pub struct FileCache {
    transport: Arc<Transport>,
}

impl FileCache {
    pub(crate) fn new(transport: Arc<Transport>) -> Self {
        Self { transport }
    }

    /// The transport this facade sends through.
    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    /// Upload a file as a `text/plain` body with the file name in the query.
    pub async fn upload(
        &self,
        cancel: &CancellationToken,
        req: &FileCacheUploadReq,
    ) -> Result<WrappedResponse<FileCacheUploadRes>> {
        req.validate()?;

        let endpoint = self
            .transport
            .endpoint("/files", &[("name", req.file_name.as_str())]);
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/plain"));

        self.transport
            .invoke_raw(cancel, Method::POST, endpoint, headers, req.content.clone())
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_requires_name_and_content() {
        let err = FileCacheUploadReq::default().validate().unwrap_err();
        assert!(err.has_field("file_name"));
        assert!(err.has_field("content"));

        assert!(FileCacheUploadReq::new("a.ico", vec![0u8, 1, 2]).validate().is_ok());
    }

    #[test]
    fn upload_response_decodes() {
        let body = r#"{"file_cache_key":"ea36f19a.1f1d6a1ac","data":[],"message":"OK","object":"file","request_id":"2d6f"}"#;
        let res: FileCacheUploadRes = serde_json::from_str(body).unwrap();
        assert_eq!(res.object, "file");
        assert_eq!(res.file_cache_key, "ea36f19a.1f1d6a1ac");
        assert!(res.error.is_none());
    }
}
