use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EsURL(String);

impl AsRef<str> for EsURL {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EsURL {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl EsURL {
    /// Creates a new EsURL from a configured engine address.
    ///
    /// Addresses are commonly configured as bare `host:port`; those get an
    /// `http://` scheme. An `https://` address keeps TLS.
    pub fn new(address: &str) -> Self {
        let address = address.trim().trim_end_matches('/');
        if address.starts_with("http://") || address.starts_with("https://") {
            Self(address.to_string())
        } else {
            Self(format!("http://{}", address))
        }
    }

    pub fn is_tls(&self) -> bool {
        self.0.starts_with("https://")
    }

    /// Append the given path to the URL.
    pub fn append_path(&self, path: &str) -> Self {
        let trimmed_url = self.0.trim_end_matches('/');
        let trimmed_path = path.trim_start_matches('/');
        Self(format!("{}/{}", trimmed_url, trimmed_path))
    }

    pub fn with_param(&self, key: &str, value: impl fmt::Display) -> Self {
        if self.0.contains('?') {
            Self(format!("{}&{}={}", self.0, key, value))
        } else {
            Self(format!("{}?{}={}", self.0, key, value))
        }
    }
}
