use thiserror::Error;
use url::Url;

/// Reasons a URL is refused.
#[derive(Error, Debug)]
pub enum UrlValidationError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("Unsupported scheme: {0} (only http/https allowed)")]
    UnsupportedScheme(String),
    #[error("URL has no host")]
    MissingHost,
    #[error("URL carries embedded credentials")]
    EmbeddedCredentials,
}

/// Check a URL taken from backend data before handing it to the system browser.
///
/// Only `http` and `https` links with a host are opened. Links with embedded
/// `user:pass@` are refused since they can disguise the real destination.
///
/// ```
/// use trendboard::util::validate_url_for_open;
///
/// assert!(validate_url_for_open("https://github.com/rust-lang/rust").is_ok());
/// assert!(validate_url_for_open("javascript:alert(1)").is_err());
/// assert!(validate_url_for_open("file:///etc/passwd").is_err());
/// ```
pub fn validate_url_for_open(url_str: &str) -> Result<Url, UrlValidationError> {
    let url = validate_http_url(url_str)?;
    if !url.username().is_empty() || url.password().is_some() {
        return Err(UrlValidationError::EmbeddedCredentials);
    }
    Ok(url)
}

/// Parse an `http`/`https` URL with a host. Loopback hosts are allowed, as
/// the backend normally runs on `127.0.0.1`.
pub fn validate_http_url(url_str: &str) -> Result<Url, UrlValidationError> {
    let url = Url::parse(url_str.trim())?;
    match url.scheme() {
        "http" | "https" => {}
        scheme => return Err(UrlValidationError::UnsupportedScheme(scheme.to_owned())),
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(UrlValidationError::MissingHost);
    }
    Ok(url)
}
