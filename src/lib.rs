//! # ZeptoMail Client
//! Asynchronous wrapper around the ZeptoMail transactional email HTTP API: send single and batch emails (HTML or templated) with [`Email`], manage stored templates with [`Template`], and upload attachments once to the [`FileCache`]. All three hang off a [`ZeptoMail`] built with [`ClientBuilder`].
//!
//! ## Credentials
//! ZeptoMail uses two credentials. The send API key (`Zoho-enczapikey`) authenticates [`Email`] and [`FileCache`]; the management OAuth token (`Zoho-oauthtoken`) authenticates [`Template`]. Pass the raw values and the scheme prefix is added for you.
//!
//! ## Runtime requirements
//! Async-only; run inside a Tokio (v1) runtime. Every call takes a [`CancellationToken`](tokio_util::sync::CancellationToken); cancelling it, or dropping the future, aborts the request and releases its connection.
//!
//! ## Out of scope
//! No queueing, retries, rate-limit handling, template rendering, MIME construction or webhook handling. Each call is exactly one HTTP request.
//!
//! ## Errors
//! Client-side failures (configuration, validation, encoding, network, undecodable bodies, cancellation) are reported as [`Error`]. Failures reported by the service are not: they arrive as a normal [`WrappedResponse`] whose status is non-2xx and whose envelope carries an [`ApiError`]. The raw body of every response stays readable through [`RawResponse`].
//!
//! ## Example
//! ```no_run
//! use tokio_util::sync::CancellationToken;
//! use zeptomail_client::{BaseSendEmail, EmailAddress, SendHtmlEmailReq, ZeptoMail};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), zeptomail_client::Error> {
//!     let zepto = ZeptoMail::new("my-agent", "send-api-key", "")?;
//!     let cancel = CancellationToken::new();
//!
//!     let req = SendHtmlEmailReq {
//!         base: BaseSendEmail {
//!             from: EmailAddress::new("noreply@example.com", "Example"),
//!             to: vec![EmailAddress::new("jane@example.com", "Jane").into()],
//!             ..Default::default()
//!         },
//!         subject: "Welcome".into(),
//!         html_body: "<p>Hello Jane</p>".into(),
//!         ..Default::default()
//!     };
//!
//!     let rv = zepto.email().send_html_email(&cancel, &req).await?;
//!     match &rv.data.error {
//!         None => println!("accepted: {}", rv.data.request_id),
//!         Some(err) => println!("rejected ({}): {}", rv.status(), err.message),
//!     }
//!     Ok(())
//! }
//! ```

mod client;
mod email;
mod error;
mod file_cache;
mod models;
mod template;
mod transport;
mod validate;

pub use client::{ClientBuilder, ZeptoMail};
pub use email::{
    BaseEmailOption, BaseSendEmail, Email, SendBatchEmailTo, SendBatchHtmlEmailReq,
    SendBatchHtmlEmailRes, SendBatchTemplatedEmailReq, SendEmailRes, SendEmailTo,
    SendHtmlEmailReq, SendHtmlEmailRes, SendStatus, SendTemplatedEmailReq, SendTemplatedEmailRes,
};
pub use error::Error;
pub use file_cache::{FileCache, FileCacheUploadReq, FileCacheUploadRes};
pub use models::{
    ApiError, EmailAddress, EmailAttachment, Envelope, ErrorDetail, InlineImage, MergeInfo,
};
pub use template::{
    AddEmailTemplateReq, AddEmailTemplateRes, DeleteEmailTemplateRes, EmailTemplate,
    GetEmailTemplateRes, ListEmailTemplatesRes, Template, UpdateEmailTemplateReq,
    UpdateEmailTemplateRes,
};
pub use transport::{DEFAULT_BASE_URL, RawResponse, Transport, WrappedResponse};
pub use validate::{FieldError, Rules, Validate, ValidationError, Zero};

/// Result type alias for ZeptoMail operations.
///
/// This is equivalent to `std::result::Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
