/// What a handshake step wants the caller to send back to the browser.
///
/// Translating this into the framework's response type is up to the
/// caller; [`status_code`](Self::status_code), [`location`](Self::location)
/// and [`body`](Self::body) carry everything needed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HandshakeResponse {
    /// Ask the merchant which shop to log in with.
    ShopPrompt {
        /// The app's display name.
        app_name: String,
        /// Where the prompt form submits to.
        action: String,
    },

    /// A plain HTTP redirect.
    Redirect {
        /// The redirect target.
        location: String,
    },

    /// An HTML page that navigates the top-level window.
    ///
    /// Used when the app runs inside the Shopify admin iframe, where an
    /// HTTP redirect would only move the frame.
    ScriptRedirect {
        /// The navigation target.
        location: String,
    },

    /// The callback failed validation.
    Unauthorized {
        /// One of "Token expired", "Token invalid" or "Shop invalid".
        message: &'static str,
    },
}

impl HandshakeResponse {
    /// The HTTP status code to respond with.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::ShopPrompt { .. } | Self::ScriptRedirect { .. } => 200,
            Self::Redirect { .. } => 302,
            Self::Unauthorized { .. } => 401,
        }
    }

    /// The `Location` header, for redirects.
    #[must_use]
    pub fn location(&self) -> Option<&str> {
        match self {
            Self::Redirect { location } => Some(location),
            _ => None,
        }
    }

    /// The `Content-Type` of [`body`](Self::body), when there is one.
    #[must_use]
    pub const fn content_type(&self) -> Option<&'static str> {
        match self {
            Self::ShopPrompt { .. } | Self::ScriptRedirect { .. } => {
                Some("text/html; charset=utf-8")
            }
            Self::Unauthorized { .. } => Some("text/plain; charset=utf-8"),
            Self::Redirect { .. } => None,
        }
    }

    /// The response body, if the response has one.
    #[must_use]
    pub fn body(&self) -> Option<String> {
        match self {
            Self::ShopPrompt { app_name, action } => Some(shop_prompt_page(app_name, action)),
            Self::ScriptRedirect { location } => Some(script_redirect_page(location)),
            Self::Unauthorized { message } => Some((*message).to_string()),
            Self::Redirect { .. } => None,
        }
    }
}

fn shop_prompt_page(app_name: &str, action: &str) -> String {
    let app_name = escape_html(app_name);
    let action = escape_html(action);
    format!(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>{app_name}</title></head>\n\
         <body>\n<h1>{app_name}</h1>\n<form method=\"post\" action=\"{action}\">\n\
         <label for=\"shop\">Shop domain</label>\n\
         <input id=\"shop\" name=\"shop\" type=\"text\" placeholder=\"example.myshopify.com\">\n\
         <button type=\"submit\">Install</button>\n</form>\n</body>\n</html>\n"
    )
}

fn script_redirect_page(location: &str) -> String {
    // A JSON string is a JS string literal; `<` is escaped so the value
    // cannot close the script element.
    let target = serde_json::Value::from(location)
        .to_string()
        .replace('<', "\\u003c");
    format!(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"></head>\n<body>\n\
         <script type=\"text/javascript\">window.top.location.href = {target};</script>\n\
         </body>\n</html>\n"
    )
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
