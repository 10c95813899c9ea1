//! Records shared by every ZeptoMail resource.

use std::collections::HashMap;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

use crate::validate::{Rules, Validate};

/// Substitution variables evaluated server-side against a template.
pub type MergeInfo = HashMap<String, serde_json::Value>;

/// A mailbox: address plus optional display name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailAddress {
    pub address: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
}

impl EmailAddress {
    pub fn new(address: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            name: name.into(),
        }
    }
}

impl From<&str> for EmailAddress {
    fn from(address: &str) -> Self {
        Self::new(address, "")
    }
}

impl Validate for EmailAddress {
    fn check(&self, rules: &mut Rules<'_>) {
        rules
            .required("address", &self.address)
            .email("address", &self.address);
    }
}

/// File attached to an outgoing email.
///
/// Either inline `content` (base64) with `name` and `mime_type`, or a
/// `file_cache_key` returned by [`FileCache::upload`](crate::FileCache::upload).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailAttachment {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub content: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub mime_type: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_cache_key: Option<String>,
}

impl EmailAttachment {
    /// Attach raw bytes, base64-encoding them.
    pub fn from_bytes(
        name: impl Into<String>,
        mime_type: impl Into<String>,
        content: impl AsRef<[u8]>,
    ) -> Self {
        Self {
            content: STANDARD.encode(content),
            mime_type: mime_type.into(),
            name: name.into(),
            file_cache_key: None,
        }
    }

    /// Attach a file previously uploaded to the file cache.
    pub fn from_file_cache(file_cache_key: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            file_cache_key: Some(file_cache_key.into()),
            ..Self::default()
        }
    }
}

impl Validate for EmailAttachment {
    fn check(&self, rules: &mut Rules<'_>) {
        if self.file_cache_key.as_deref().is_some_and(|k| !k.is_empty()) {
            return;
        }
        rules
            .required("content", &self.content)
            .required("name", &self.name)
            .required("mime_type", &self.mime_type);
    }
}

/// Image referenced from the HTML body by `cid:`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineImage {
    pub cid: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub content: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub mime_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_cache_key: Option<String>,
}

impl Validate for InlineImage {
    fn check(&self, rules: &mut Rules<'_>) {
        rules.required("cid", &self.cid);
        if self.file_cache_key.as_deref().is_some_and(|k| !k.is_empty()) {
            return;
        }
        rules
            .required("content", &self.content)
            .required("mime_type", &self.mime_type);
    }
}

/// Standard ZeptoMail response envelope.
///
/// A non-`None` [`error`](Envelope::error) means the service rejected the
/// request even though the HTTP exchange itself succeeded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, bound(deserialize = "D: Deserialize<'de> + Default"))]
pub struct Envelope<D> {
    pub data: D,
    pub message: String,
    pub object: String,
    pub request_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
}

/// Error object reported by the service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiError {
    pub code: String,
    pub message: String,
    pub request_id: String,
    pub details: Vec<ErrorDetail>,
}

/// One cause inside an [`ApiError`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    pub target: String,
    pub target_value: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attachment_from_bytes_is_base64() {
        let a = EmailAttachment::from_bytes("a.txt", "text/plain", b"hello");
        assert_eq!(a.content, "aGVsbG8=");
        assert!(a.validate().is_ok());

        let json = serde_json::to_value(&a).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"content": "aGVsbG8=", "mime_type": "text/plain", "name": "a.txt"})
        );
    }

    #[test]
    fn cached_attachment_needs_no_content() {
        let a = EmailAttachment::from_file_cache("ea36f19a", "logo.png");
        assert!(a.validate().is_ok());
        assert_eq!(
            serde_json::to_value(&a).unwrap(),
            serde_json::json!({"name": "logo.png", "file_cache_key": "ea36f19a"})
        );

        let err = EmailAttachment::default().validate().unwrap_err();
        assert!(err.has_field("content"));
        assert!(err.has_field("mime_type"));
    }

    #[test]
    fn envelope_with_error_object() {
        let body = r#"{
            "error": {
                "code": "TM_3201",
                "details": [{"code": "GE_102", "message": "Mandatory Field 'subject' was set as Empty Value.", "target": "subject"}],
                "message": "Mandatory Field 'subject' was set as Empty Value.",
                "request_id": "2d6f.6f5a"
            }
        }"#;
        let env: Envelope<Vec<serde_json::Value>> = serde_json::from_str(body).unwrap();
        let err = env.error.unwrap();
        assert_eq!(err.code, "TM_3201");
        assert_eq!(err.details[0].target, "subject");
        assert!(env.data.is_empty());
        assert!(env.message.is_empty());
    }

    #[test]
    fn address_name_is_optional() {
        let addr = EmailAddress::from("ops@example.com");
        assert_eq!(
            serde_json::to_value(&addr).unwrap(),
            serde_json::json!({"address": "ops@example.com"})
        );
    }
}
