//! Widget configuration.
//!
//! A `Configuration` is resolved once when the widget starts and shared as an
//! `Arc<Configuration>` by every component afterwards. Nothing in the crate
//! reads page attributes or globals after this point.

use std::time::Duration;

/// Site id used when the embedding page does not provide one.
pub const DEFAULT_SITE_ID: &str = "default-site";

/// Free views granted to a human visitor when the page does not say otherwise.
pub const DEFAULT_FREE_VIEWS: u32 = 3;

/// Text shown to automated agents in place of the gated content.
pub const DEFAULT_BOT_MESSAGE: &str = "This content is protected.";

/// Upper bound on how long the decision pass waits for the quota check.
pub const DEFAULT_QUOTA_TIMEOUT: Duration = Duration::from_secs(3);

/// Per-request timeout applied by the HTTP gateway.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// How gated content is presented while obscured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderStyle {
    /// Content is blurred as soon as the page is ready and un-blurred on grant.
    Blur,
    /// Content is left untouched until a denial, then faded out from mid-page.
    #[default]
    Fade,
}

impl RenderStyle {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "blur" => Some(RenderStyle::Blur),
            "fade" => Some(RenderStyle::Fade),
            _ => None,
        }
    }
}

/// Error returned when a configuration fails validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Site id is empty or whitespace
    EmptySiteId,
    /// Backend base address is not an http(s) URL
    InvalidApiBase(String),
    /// Quota check timeout must be greater than zero
    ZeroQuotaTimeout,
    /// Gateway request timeout must be greater than zero
    ZeroRequestTimeout,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::EmptySiteId => write!(f, "site id must not be empty"),
            ConfigError::InvalidApiBase(base) => {
                write!(f, "api base must be an http(s) URL, got {:?}", base)
            }
            ConfigError::ZeroQuotaTimeout => write!(f, "quota timeout must be greater than 0"),
            ConfigError::ZeroRequestTimeout => {
                write!(f, "request timeout must be greater than 0")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Resolved, immutable widget settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Configuration {
    site_id: String,
    free_views: u32,
    offer_registration: bool,
    bot_message: String,
    api_base: Option<String>,
    style: RenderStyle,
    cancel_unlocks: bool,
    quota_timeout: Duration,
    request_timeout: Duration,
}

impl Configuration {
    /// Start building a configuration from the defaults.
    pub fn builder() -> ConfigurationBuilder {
        ConfigurationBuilder::default()
    }

    /// Resolve a configuration from the script tag's attributes.
    ///
    /// Attribute names are accepted with or without the `data-` prefix, in
    /// camelCase or kebab-case, and under both the current names and the
    /// names used by earlier widget revisions (`showRegwall`, `botText`,
    /// `api`). Unknown attributes are ignored and an empty `site` or bot message
    /// keeps the default. Values that cannot be parsed keep their default and
    /// log a warning rather than failing the widget; an api base that is not
    /// an http(s) URL disables network calls.
    ///
    /// # Example
    /// ```
    /// use paywall_lite::Configuration;
    ///
    /// let config = Configuration::from_attributes([
    ///     ("data-site", "daily-planet"),
    ///     ("data-free-views", "5"),
    ///     ("data-show-regwall", "true"),
    /// ])
    /// .unwrap();
    ///
    /// assert_eq!(config.site_id(), "daily-planet");
    /// assert_eq!(config.free_views(), 5);
    /// assert!(config.offer_registration());
    /// assert!(config.api_base().is_none());
    /// ```
    ///
    /// # Errors
    /// Returns the same errors as [`ConfigurationBuilder::build`].
    pub fn from_attributes<I, K, V>(attributes: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut builder = Self::builder();

        for (name, value) in attributes {
            let value = value.as_ref();
            match normalize_attribute(name.as_ref()).as_str() {
                "site" if !value.trim().is_empty() => builder = builder.with_site_id(value),
                "freeviews" => match value.trim().parse::<u32>() {
                    Ok(n) => builder = builder.with_free_views(n),
                    Err(_) => {
                        tracing::warn!(value, "ignoring unparsable freeViews attribute");
                    }
                },
                "showregistration" | "showregwall" => {
                    builder = builder.with_registration(value == "true")
                }
                "botmessage" | "bottext" if !value.is_empty() => {
                    builder = builder.with_bot_message(value)
                }
                "apibase" | "api" => {
                    let base = value.trim();
                    if base.is_empty() || is_http_base(base) {
                        builder = builder.with_api_base(base);
                    } else {
                        tracing::warn!(value, "ignoring api base that is not an http(s) URL");
                        builder = builder.without_api_base();
                    }
                }
                "style" => match RenderStyle::parse(value) {
                    Some(style) => builder = builder.with_style(style),
                    None => tracing::warn!(value, "ignoring unknown style attribute"),
                },
                "cancelunlocks" => builder = builder.with_cancel_unlocks(value == "true"),
                _ => {}
            }
        }

        builder.build()
    }

    /// Site id the meter and backend calls are keyed by.
    pub fn site_id(&self) -> &str {
        &self.site_id
    }

    /// Number of page views a human visitor gets before the gate closes.
    pub fn free_views(&self) -> u32 {
        self.free_views
    }

    /// Whether the paywall offers the email registration step.
    pub fn offer_registration(&self) -> bool {
        self.offer_registration
    }

    /// Disclosure text shown to automated agents.
    pub fn bot_message(&self) -> &str {
        &self.bot_message
    }

    /// Backend base address without a trailing slash, if network calls are enabled.
    pub fn api_base(&self) -> Option<&str> {
        self.api_base.as_deref()
    }

    /// Presentation style for obscured content.
    pub fn style(&self) -> RenderStyle {
        self.style
    }

    /// Whether cancelling the registration prompt unlocks the content.
    ///
    /// When `false` (the default) cancelling returns the visitor to the paywall.
    pub fn cancel_unlocks(&self) -> bool {
        self.cancel_unlocks
    }

    /// Longest time the decision pass waits on the quota check.
    pub fn quota_timeout(&self) -> Duration {
        self.quota_timeout
    }

    /// Timeout applied to every individual gateway request.
    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            site_id: DEFAULT_SITE_ID.to_string(),
            free_views: DEFAULT_FREE_VIEWS,
            offer_registration: false,
            bot_message: DEFAULT_BOT_MESSAGE.to_string(),
            api_base: None,
            style: RenderStyle::default(),
            cancel_unlocks: false,
            quota_timeout: DEFAULT_QUOTA_TIMEOUT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

/// Builder for [`Configuration`].
///
/// Values are validated when `build()` is called.
#[derive(Debug, Clone, Default)]
pub struct ConfigurationBuilder {
    inner: Configuration,
}

impl ConfigurationBuilder {
    /// Set the site id.
    pub fn with_site_id(mut self, site_id: impl Into<String>) -> Self {
        self.inner.site_id = site_id.into().trim().to_string();
        self
    }

    /// Set the free-view quota. Zero gates every human page view.
    pub fn with_free_views(mut self, free_views: u32) -> Self {
        self.inner.free_views = free_views;
        self
    }

    /// Offer (or stop offering) the email registration step on the paywall.
    pub fn with_registration(mut self, offer: bool) -> Self {
        self.inner.offer_registration = offer;
        self
    }

    /// Set the text shown to automated agents.
    pub fn with_bot_message(mut self, message: impl Into<String>) -> Self {
        self.inner.bot_message = message.into();
        self
    }

    /// Set the backend base address. An empty string disables network calls.
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        let api_base = api_base.into();
        let trimmed = api_base.trim().trim_end_matches('/');
        self.inner.api_base = if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        };
        self
    }

    /// Disable all network calls.
    pub fn without_api_base(mut self) -> Self {
        self.inner.api_base = None;
        self
    }

    /// Set the presentation style.
    pub fn with_style(mut self, style: RenderStyle) -> Self {
        self.inner.style = style;
        self
    }

    /// Choose whether cancelling the registration prompt unlocks the content.
    pub fn with_cancel_unlocks(mut self, unlocks: bool) -> Self {
        self.inner.cancel_unlocks = unlocks;
        self
    }

    /// Bound the wait on the quota check.
    pub fn with_quota_timeout(mut self, timeout: Duration) -> Self {
        self.inner.quota_timeout = timeout;
        self
    }

    /// Set the timeout applied to each gateway request.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.inner.request_timeout = timeout;
        self
    }

    /// Validate and build the configuration.
    ///
    /// # Errors
    /// - `ConfigError::EmptySiteId` if the site id is blank
    /// - `ConfigError::InvalidApiBase` if the api base is not an http(s) URL
    /// - `ConfigError::ZeroQuotaTimeout` / `ConfigError::ZeroRequestTimeout`
    pub fn build(self) -> Result<Configuration, ConfigError> {
        let config = self.inner;

        if config.site_id.is_empty() {
            return Err(ConfigError::EmptySiteId);
        }
        if let Some(base) = &config.api_base {
            if !is_http_base(base) {
                return Err(ConfigError::InvalidApiBase(base.clone()));
            }
        }
        if config.quota_timeout.is_zero() {
            return Err(ConfigError::ZeroQuotaTimeout);
        }
        if config.request_timeout.is_zero() {
            return Err(ConfigError::ZeroRequestTimeout);
        }

        Ok(config)
    }
}

fn is_http_base(base: &str) -> bool {
    base.starts_with("http://") || base.starts_with("https://")
}

/// `data-free-views`, `freeViews` and `free_views` all become `freeviews`.
fn normalize_attribute(name: &str) -> String {
    let name = name.trim();
    let name = name.strip_prefix("data-").unwrap_or(name);
    name.chars()
        .filter(|c| *c != '-' && *c != '_')
        .map(|c| c.to_ascii_lowercase())
        .collect()
}
