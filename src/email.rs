//! Transactional email sending.

use std::collections::HashMap;
use std::sync::Arc;

use reqwest::Method;
use reqwest::header::HeaderMap;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::Result;
use crate::models::{EmailAddress, EmailAttachment, Envelope, InlineImage, MergeInfo};
use crate::transport::{Transport, WrappedResponse};
use crate::validate::{Rules, Validate};

/// Recipient of a single (non-batch) send.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SendEmailTo {
    pub email_address: EmailAddress,
    #[serde(default, skip_serializing_if = "MergeInfo::is_empty")]
    pub merge_info: MergeInfo,
}

impl From<EmailAddress> for SendEmailTo {
    fn from(email_address: EmailAddress) -> Self {
        Self {
            email_address,
            merge_info: MergeInfo::new(),
        }
    }
}

impl Validate for SendEmailTo {
    fn check(&self, rules: &mut Rules<'_>) {
        rules.nested("email_address", &self.email_address);
    }
}

/// Recipient of a batch send. Each one carries its own merge variables.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SendBatchEmailTo {
    pub email_address: EmailAddress,
    pub merge_info: MergeInfo,
}

impl Validate for SendBatchEmailTo {
    fn check(&self, rules: &mut Rules<'_>) {
        rules
            .nested("email_address", &self.email_address)
            .required("merge_info", &self.merge_info);
    }
}

/// Sender, recipients and request-wide merge variables.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BaseSendEmail {
    pub from: EmailAddress,
    pub to: Vec<SendEmailTo>,
    #[serde(default, skip_serializing_if = "MergeInfo::is_empty")]
    pub merge_info: MergeInfo,
}

impl Validate for BaseSendEmail {
    fn check(&self, rules: &mut Rules<'_>) {
        rules
            .nested("from", &self.from)
            .required("to", &self.to)
            .each("to", &self.to);
    }
}

/// Optional settings shared by every send.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BaseEmailOption {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cc: Vec<SendEmailTo>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bcc: Vec<SendEmailTo>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reply_to: Vec<EmailAddress>,
    #[serde(default)]
    pub track_clicks: bool,
    #[serde(default)]
    pub track_opens: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub client_reference: String,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub mime_headers: HashMap<String, serde_json::Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<EmailAttachment>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub inline_images: Vec<InlineImage>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub bounce_address: String,
}

impl Validate for BaseEmailOption {
    fn check(&self, rules: &mut Rules<'_>) {
        rules
            .each("cc", &self.cc)
            .each("bcc", &self.bcc)
            .each("reply_to", &self.reply_to)
            .each("attachments", &self.attachments)
            .each("inline_images", &self.inline_images)
            .email("bounce_address", &self.bounce_address);
    }
}

/// `POST /email`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SendHtmlEmailReq {
    #[serde(flatten)]
    pub base: BaseSendEmail,
    #[serde(flatten)]
    pub options: BaseEmailOption,
    pub subject: String,
    #[serde(rename = "htmlbody", default, skip_serializing_if = "String::is_empty")]
    pub html_body: String,
    #[serde(rename = "textbody", default, skip_serializing_if = "String::is_empty")]
    pub text_body: String,
}

impl Validate for SendHtmlEmailReq {
    fn check(&self, rules: &mut Rules<'_>) {
        rules
            .nested("", &self.base)
            .nested("", &self.options)
            .required("subject", &self.subject);
        if self.html_body.is_empty() && self.text_body.is_empty() {
            rules.fail("htmlbody", "required");
        }
    }
}

/// `POST /email/batch`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SendBatchHtmlEmailReq {
    pub from: EmailAddress,
    pub to: Vec<SendBatchEmailTo>,
    #[serde(flatten)]
    pub options: BaseEmailOption,
    pub subject: String,
    #[serde(rename = "htmlbody", default, skip_serializing_if = "String::is_empty")]
    pub html_body: String,
    #[serde(rename = "textbody", default, skip_serializing_if = "String::is_empty")]
    pub text_body: String,
}

impl Validate for SendBatchHtmlEmailReq {
    fn check(&self, rules: &mut Rules<'_>) {
        rules
            .nested("from", &self.from)
            .required("to", &self.to)
            .each("to", &self.to)
            .nested("", &self.options)
            .required("subject", &self.subject);
        if self.html_body.is_empty() && self.text_body.is_empty() {
            rules.fail("htmlbody", "required");
        }
    }
}

/// `POST /email/template`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SendTemplatedEmailReq {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub template_key: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub template_alias: String,
    #[serde(flatten)]
    pub base: BaseSendEmail,
    #[serde(flatten)]
    pub options: BaseEmailOption,
}

impl Validate for SendTemplatedEmailReq {
    fn check(&self, rules: &mut Rules<'_>) {
        if self.template_key.is_empty() && self.template_alias.is_empty() {
            rules.fail("template_key", "required");
        }
        rules.nested("", &self.base).nested("", &self.options);
    }
}

/// `POST /email/template/batch`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SendBatchTemplatedEmailReq {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub template_key: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub template_alias: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub bounce_address: String,
    pub from: EmailAddress,
    pub to: Vec<SendBatchEmailTo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<EmailAddress>,
    #[serde(default)]
    pub track_clicks: bool,
    #[serde(default)]
    pub track_opens: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub client_reference: String,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub mime_headers: HashMap<String, serde_json::Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<EmailAttachment>,
}

impl Validate for SendBatchTemplatedEmailReq {
    fn check(&self, rules: &mut Rules<'_>) {
        if self.template_key.is_empty() && self.template_alias.is_empty() {
            rules.fail("template_key", "required");
        }
        rules
            .email("bounce_address", &self.bounce_address)
            .nested("from", &self.from)
            .required("to", &self.to)
            .each("to", &self.to)
            .each("attachments", &self.attachments);
        if let Some(reply_to) = &self.reply_to {
            rules.nested("reply_to", reply_to);
        }
    }
}

/// Per-request acknowledgement in a send response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SendStatus {
    pub code: String,
    pub message: String,
    pub additional_info: Vec<serde_json::Value>,
}

/// Response to every send operation.
pub type SendEmailRes = Envelope<Vec<SendStatus>>;
pub type SendHtmlEmailRes = SendEmailRes;
pub type SendBatchHtmlEmailRes = SendEmailRes;
pub type SendTemplatedEmailRes = SendEmailRes;

/// Email sending API. Authenticated with the send API key.
#[derive(Debug, Clone)]
pub struct Email {
    transport: Arc<Transport>,
}

impl Email {
    pub(crate) fn new(transport: Arc<Transport>) -> Self {
        Self { transport }
    }

    /// The transport this facade sends through.
    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    /// Send a single HTML (or plain text) email.
    pub async fn send_html_email(
        &self,
        cancel: &CancellationToken,
        req: &SendHtmlEmailReq,
    ) -> Result<WrappedResponse<SendHtmlEmailRes>> {
        self.post(cancel, "/email", req).await
    }

    /// Send one HTML email to many recipients, each with its own merge info.
    pub async fn send_batch_html_email(
        &self,
        cancel: &CancellationToken,
        req: &SendBatchHtmlEmailReq,
    ) -> Result<WrappedResponse<SendBatchHtmlEmailRes>> {
        self.post(cancel, "/email/batch", req).await
    }

    /// Send an email rendered from a stored template.
    pub async fn send_templated_email(
        &self,
        cancel: &CancellationToken,
        req: &SendTemplatedEmailReq,
    ) -> Result<WrappedResponse<SendTemplatedEmailRes>> {
        self.post(cancel, "/email/template", req).await
    }

    /// Send a stored template to many recipients, each with its own merge info.
    pub async fn send_batch_templated_email(
        &self,
        cancel: &CancellationToken,
        req: &SendBatchTemplatedEmailReq,
    ) -> Result<WrappedResponse<SendTemplatedEmailRes>> {
        self.post(cancel, "/email/template/batch", req).await
    }

    async fn post<S>(
        &self,
        cancel: &CancellationToken,
        path: &str,
        req: &S,
    ) -> Result<WrappedResponse<SendEmailRes>>
    where
        S: Serialize + Validate + Default + PartialEq,
    {
        let endpoint = self.transport.endpoint(path, &[]);
        self.transport
            .invoke(cancel, Method::POST, endpoint, HeaderMap::new(), Some(req))
            .await
    }
}
