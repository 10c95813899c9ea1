//! Stored email templates of a mail agent.

use std::sync::Arc;

use reqwest::Method;
use reqwest::header::HeaderMap;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::Result;
use crate::models::{Envelope, MergeInfo};
use crate::transport::{Transport, WrappedResponse};
use crate::validate::{Rules, Validate};

const TEMPLATES_PATH: &str = "/mailagents/{agent}/templates";

/// Template body for creation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddEmailTemplateReq {
    pub template_name: String,
    pub template_alias: String,
    pub subject: String,
    #[serde(rename = "htmlbody", default, skip_serializing_if = "String::is_empty")]
    pub html_body: String,
    #[serde(rename = "textbody", default, skip_serializing_if = "String::is_empty")]
    pub text_body: String,
}

impl Validate for AddEmailTemplateReq {
    fn check(&self, rules: &mut Rules<'_>) {
        rules
            .required("template_name", &self.template_name)
            .required("template_alias", &self.template_alias)
            .required("subject", &self.subject);
        if self.html_body.is_empty() && self.text_body.is_empty() {
            rules.fail("htmlbody", "required");
        }
    }
}

/// Partial update of an existing template; empty fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateEmailTemplateReq {
    /// Identifies the template; sent in the path, not the body.
    #[serde(skip)]
    pub template_key: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub template_name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub template_alias: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub subject: String,
    #[serde(rename = "htmlbody", default, skip_serializing_if = "String::is_empty")]
    pub html_body: String,
    #[serde(rename = "textbody", default, skip_serializing_if = "String::is_empty")]
    pub text_body: String,
}

impl Validate for UpdateEmailTemplateReq {
    fn check(&self, rules: &mut Rules<'_>) {
        rules.nested("", &TemplateKey(&self.template_key));
    }
}

/// A template key about to become the last segment of a template path.
struct TemplateKey<'a>(&'a str);

impl Validate for TemplateKey<'_> {
    fn check(&self, rules: &mut Rules<'_>) {
        rules
            .required("template_key", self.0)
            .path_segment("template_key", self.0);
    }
}

/// A template as stored by the service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailTemplate {
    pub template_name: String,
    pub template_key: String,
    pub template_alias: String,
    pub subject: String,
    #[serde(rename = "htmlbody")]
    pub html_body: String,
    #[serde(rename = "textbody")]
    pub text_body: String,
    pub sample_merge_info: MergeInfo,
    pub template_link: String,
    pub created_time: String,
    pub modified_time: String,
}

pub type AddEmailTemplateRes = Envelope<EmailTemplate>;
pub type UpdateEmailTemplateRes = Envelope<EmailTemplate>;
pub type GetEmailTemplateRes = Envelope<EmailTemplate>;
pub type ListEmailTemplatesRes = Envelope<Vec<EmailTemplate>>;
/// Delete answers `204 No Content`; the envelope is only filled on failure.
pub type DeleteEmailTemplateRes = Envelope<serde_json::Value>;

/// Template management API. Authenticated with the management OAuth token.
#[derive(Debug, Clone)]
pub struct Template {
    transport: Arc<Transport>,
}

impl Template {
    pub(crate) fn new(transport: Arc<Transport>) -> Self {
        Self { transport }
    }

    /// The transport this facade sends through.
    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    /// Create a template under the configured mail agent.
    pub async fn add_email_template(
        &self,
        cancel: &CancellationToken,
        req: &AddEmailTemplateReq,
    ) -> Result<WrappedResponse<AddEmailTemplateRes>> {
        let endpoint = self.transport.endpoint(TEMPLATES_PATH, &[]);
        self.transport
            .invoke(cancel, Method::POST, endpoint, HeaderMap::new(), Some(req))
            .await
    }

    /// Update the template named by `req.template_key`.
    pub async fn update_email_template(
        &self,
        cancel: &CancellationToken,
        req: &UpdateEmailTemplateReq,
    ) -> Result<WrappedResponse<UpdateEmailTemplateRes>> {
        req.validate()?;
        let endpoint = self
            .transport
            .keyed_endpoint(TEMPLATES_PATH, &req.template_key);
        self.transport
            .invoke(cancel, Method::PUT, endpoint, HeaderMap::new(), Some(req))
            .await
    }

    /// List templates, `limit` at a time starting at `offset`.
    pub async fn list_email_templates(
        &self,
        cancel: &CancellationToken,
        offset: u32,
        limit: u32,
    ) -> Result<WrappedResponse<ListEmailTemplatesRes>> {
        let (offset, limit) = (offset.to_string(), limit.to_string());
        let endpoint = self.transport.endpoint(
            TEMPLATES_PATH,
            &[("offset", offset.as_str()), ("limit", limit.as_str())],
        );
        self.transport
            .invoke(cancel, Method::GET, endpoint, HeaderMap::new(), None::<&()>)
            .await
    }

    /// Fetch one template by key.
    pub async fn get_email_template(
        &self,
        cancel: &CancellationToken,
        template_key: &str,
    ) -> Result<WrappedResponse<GetEmailTemplateRes>> {
        let endpoint = self.keyed_endpoint(template_key)?;
        self.transport
            .invoke(cancel, Method::GET, endpoint, HeaderMap::new(), None::<&()>)
            .await
    }

    /// Delete one template by key.
    pub async fn delete_email_template(
        &self,
        cancel: &CancellationToken,
        template_key: &str,
    ) -> Result<WrappedResponse<DeleteEmailTemplateRes>> {
        let endpoint = self.keyed_endpoint(template_key)?;
        self.transport
            .invoke(cancel, Method::DELETE, endpoint, HeaderMap::new(), None::<&()>)
            .await
    }

    fn keyed_endpoint(&self, template_key: &str) -> Result<reqwest::Url> {
        TemplateKey(template_key).validate()?;
        Ok(self.transport.keyed_endpoint(TEMPLATES_PATH, template_key))
    }
}
