use crate::platform::CallbackParams;
use std::collections::BTreeMap;

/// An inbound request to one of the handshake steps.
///
/// The caller's web framework fills this in from its own request type:
/// the decoded query string, any submitted form fields, and whether the
/// browser session is already logged in.
///
/// # Example
///
/// ```rust
/// use shopify_auth::handshake::HandshakeRequest;
///
/// let request = HandshakeRequest::new()
///     .with_query("shop", "from-query")
///     .with_form("shop", "from-form");
///
/// assert_eq!(request.param("shop"), Some("from-form"));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HandshakeRequest {
    query: BTreeMap<String, String>,
    form: BTreeMap<String, String>,
    authenticated: bool,
}

impl HandshakeRequest {
    /// Creates an anonymous request with no parameters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an anonymous request from decoded query-string pairs.
    #[must_use]
    pub fn from_query<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            query: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            ..Self::default()
        }
    }

    /// Adds a query-string parameter.
    #[must_use]
    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(name.into(), value.into());
        self
    }

    /// Adds a submitted form field.
    #[must_use]
    pub fn with_form(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.form.insert(name.into(), value.into());
        self
    }

    /// Marks whether the browser session is already logged in.
    #[must_use]
    pub const fn authenticated(mut self, authenticated: bool) -> Self {
        self.authenticated = authenticated;
        self
    }

    /// Returns `true` if the browser session is already logged in.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    /// Looks `name` up in the form fields, then in the query string.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.form
            .get(name)
            .or_else(|| self.query.get(name))
            .map(String::as_str)
    }

    /// Looks `name` up in the query string only.
    #[must_use]
    pub fn query(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }

    /// The query string as the platform signed it.
    #[must_use]
    pub fn callback_params(&self) -> CallbackParams {
        self.query
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}
