//! ZeptoMail client construction.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::email::Email;
use crate::file_cache::FileCache;
use crate::template::Template;
use crate::transport::{DEFAULT_BASE_URL, Transport};
use crate::{Error, Result};

const API_KEY_SCHEME: &str = "Zoho-enczapikey";
const OAUTH_TOKEN_SCHEME: &str = "Zoho-oauthtoken";
const USER_AGENT_VALUE: &str = concat!("zeptomail-client/", env!("CARGO_PKG_VERSION"));

/// Async client for the ZeptoMail API.
///
/// Holds the three resource facades. [`Email`] and [`FileCache`] share a
/// transport authenticated with the send API key; [`Template`] uses a second
/// transport authenticated with the management OAuth token.
///
/// Cloning is cheap and every clone shares the same connection pool.
#[derive(Debug, Clone)]
pub struct ZeptoMail {
    email: Email,
    file_cache: FileCache,
    template: Template,
}

impl ZeptoMail {
    /// Create a builder for configuring the client.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Create a client against the default API root.
    ///
    /// Either token may be empty; the facades that need it will then be
    /// rejected by the service, but construction still succeeds.
    ///
    /// # Examples
    /// ```no_run
    /// # use zeptomail_client::ZeptoMail;
    /// # fn main() -> Result<(), zeptomail_client::Error> {
    /// let zepto = ZeptoMail::new("my-agent", "send-api-key", "")?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(
        mail_agent: impl Into<String>,
        send_token: impl Into<String>,
        management_token: impl Into<String>,
    ) -> Result<Self> {
        ClientBuilder::new()
            .mail_agent(mail_agent)
            .send_token(send_token)
            .management_token(management_token)
            .build()
    }

    /// Bind the facades to two pre-built transports.
    pub fn from_transports(send: Arc<Transport>, management: Arc<Transport>) -> Self {
        Self {
            email: Email::new(send.clone()),
            file_cache: FileCache::new(send),
            template: Template::new(management),
        }
    }

    /// Bind all three facades to a single transport.
    pub fn from_transport(transport: Arc<Transport>) -> Self {
        Self::from_transports(transport.clone(), transport)
    }

    /// Transactional email sending.
    pub fn email(&self) -> &Email {
        &self.email
    }

    /// Attachment file cache.
    pub fn file_cache(&self) -> &FileCache {
        &self.file_cache
    }

    /// Template management.
    pub fn template(&self) -> &Template {
        &self.template
    }
}

/// Builder for configuring a [`ZeptoMail`] client.
///
/// Start with [`ZeptoMail::builder`] to override defaults.
#[derive(Clone)]
pub struct ClientBuilder {
    base_url: String,
    mail_agent: String,
    send_token: String,
    management_token: String,
    http: Option<reqwest::Client>,
    timeout: Option<Duration>,
    proxy: Option<String>,
    user_agent: String,
    single_credential: bool,
}

impl fmt::Debug for ClientBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientBuilder")
            .field("base_url", &self.base_url)
            .field("mail_agent", &self.mail_agent)
            .field("send_token", &redacted(&self.send_token))
            .field("management_token", &redacted(&self.management_token))
            .field("http", &self.http.is_some())
            .field("timeout", &self.timeout)
            .field("proxy", &self.proxy)
            .field("user_agent", &self.user_agent)
            .field("single_credential", &self.single_credential)
            .finish()
    }
}

fn redacted(token: &str) -> &'static str {
    if token.is_empty() { "" } else { "<redacted>" }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientBuilder {
    /// Create a new builder with default settings.
    ///
    /// Defaults:
    /// - Base URL `https://api.zeptomail.com/v1.1`
    /// - Empty mail agent and tokens
    /// - A fresh `reqwest` client with no timeout and no proxy
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            mail_agent: String::new(),
            send_token: String::new(),
            management_token: String::new(),
            http: None,
            timeout: None,
            proxy: None,
            user_agent: USER_AGENT_VALUE.to_string(),
            single_credential: false,
        }
    }

    /// Start from the environment.
    ///
    /// Reads:
    /// - `ZEPTO_MAIL_BASE_URL`: API root (default: `https://api.zeptomail.com/v1.1`)
    /// - `ZEPTO_MAIL_AGENT`: mail agent alias
    /// - `ZEPTO_MAIL_TOKEN`: send API key
    /// - `ZEPTO_MAIL_MGMT_TOKEN`: management OAuth token
    pub fn from_env() -> Self {
        let var = |name: &str| std::env::var(name).unwrap_or_default();
        let mut builder = Self::new()
            .mail_agent(var("ZEPTO_MAIL_AGENT"))
            .send_token(var("ZEPTO_MAIL_TOKEN"))
            .management_token(var("ZEPTO_MAIL_MGMT_TOKEN"));
        let base_url = var("ZEPTO_MAIL_BASE_URL");
        if !base_url.is_empty() {
            builder = builder.base_url(base_url);
        }
        builder
    }

    /// Override the API root (useful for testing against a mock server).
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Mail agent alias used in template paths.
    pub fn mail_agent(mut self, mail_agent: impl Into<String>) -> Self {
        self.mail_agent = mail_agent.into();
        self
    }

    /// Send API key. `Zoho-enczapikey ` is prepended unless already present.
    pub fn send_token(mut self, token: impl Into<String>) -> Self {
        self.send_token = token.into();
        self
    }

    /// Management OAuth token. `Zoho-oauthtoken ` is prepended unless
    /// already present.
    pub fn management_token(mut self, token: impl Into<String>) -> Self {
        self.management_token = token.into();
        self
    }

    /// Use a caller-supplied `reqwest` client.
    ///
    /// When set, [`timeout`](Self::timeout), [`proxy`](Self::proxy) and
    /// [`user_agent`](Self::user_agent) are ignored.
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.http = Some(client);
        self
    }

    /// Total timeout applied to every request.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set a proxy URL (e.g., "http://127.0.0.1:8080").
    pub fn proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    /// Override the default user agent string.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Serve all three facades from one transport using the send token.
    pub fn single_credential(mut self) -> Self {
        self.single_credential = true;
        self
    }

    /// Build the client. No network I/O is performed.
    ///
    /// Fails with [`Error::Config`] if the base URL does not parse, has no
    /// scheme, or the HTTP client cannot be created.
    pub fn build(self) -> Result<ZeptoMail> {
        let http = match self.http {
            Some(client) => client,
            None => {
                let mut builder = reqwest::Client::builder().user_agent(&self.user_agent);
                if let Some(timeout) = self.timeout {
                    builder = builder.timeout(timeout);
                }
                if let Some(proxy_url) = &self.proxy {
                    let proxy = reqwest::Proxy::all(proxy_url)
                        .map_err(|e| Error::Config(format!("invalid proxy {proxy_url:?}: {e}")))?;
                    builder = builder.proxy(proxy);
                }
                builder
                    .build()
                    .map_err(|e| Error::Config(format!("http client: {e}")))?
            }
        };

        let send = Arc::new(Transport::new(
            &self.base_url,
            self.mail_agent.clone(),
            with_scheme(API_KEY_SCHEME, &self.send_token),
            http.clone(),
        )?);

        debug!(
            base_url = %self.base_url,
            mail_agent = %self.mail_agent,
            single_credential = self.single_credential,
            "zeptomail client configured"
        );

        if self.single_credential {
            return Ok(ZeptoMail::from_transport(send));
        }

        let management = Arc::new(Transport::new(
            &self.base_url,
            self.mail_agent,
            with_scheme(OAUTH_TOKEN_SCHEME, &self.management_token),
            http,
        )?);

        Ok(ZeptoMail::from_transports(send, management))
    }
}

/// Prefix `token` with `scheme` unless it already carries it.
fn with_scheme(scheme: &str, token: &str) -> String {
    let token = token.trim();
    if token.is_empty() || token.starts_with(scheme) {
        token.to_string()
    } else {
        format!("{scheme} {token}")
    }
}
