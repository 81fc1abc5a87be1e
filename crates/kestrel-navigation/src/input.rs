//! Address bar input resolution
//!
//! Input with a space or without a dot is a search query; everything else
//! is an address. Queries are appended raw to the enabled engine's URL
//! template — the engines shipped by default all end in `?q=`-style
//! prefixes that take the text as-is.

use url::Url;

/// Result of resolving address bar input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Navigate to a URL
    Navigate(String),
    /// Perform a search with the enabled engine
    Search(String),
}

pub struct InputResolver {
    /// Enabled search engine's URL template; the query is appended to it.
    search_template: String,
    /// When on, bare addresses get `https://` and `http://` is upgraded.
    https_mode: bool,
}

impl InputResolver {
    pub fn new(search_template: String, https_mode: bool) -> Self {
        Self {
            search_template,
            https_mode,
        }
    }

    pub fn set_search_template(&mut self, template: String) {
        self.search_template = template;
    }

    pub fn set_https_mode(&mut self, https_mode: bool) {
        self.https_mode = https_mode;
    }

    /// Resolve user input into an action.
    pub fn resolve(&self, input: &str) -> Resolution {
        let input = input.trim();

        if input.is_empty() || input == "about:blank" {
            return Resolution::Navigate("about:blank".to_string());
        }

        if input.contains(' ') || !input.contains('.') {
            return Resolution::Search(format!("{}{}", self.search_template, input));
        }

        let mut address = if input.contains("://") {
            input.to_string()
        } else if self.https_mode {
            format!("https://{input}")
        } else {
            format!("http://{input}")
        };

        if self.https_mode {
            if let Some(rest) = address.strip_prefix("http://") {
                address = format!("https://{rest}");
            }
        }

        // Anything that still fails to parse as a URL is a search after all.
        if Url::parse(&address).is_err() {
            return Resolution::Search(format!("{}{}", self.search_template, input));
        }

        Resolution::Navigate(address)
    }
}
