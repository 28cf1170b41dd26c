//! Fetching the raw bytes of a document

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::config::LoaderConfig;
use crate::error::FetchError;

/// Bytes of a document together with the URL they came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedDocument {
    pub url: String,
    pub bytes: Vec<u8>,
}

/// Source of document bytes
pub trait Loader: Send + Sync {
    /// Fetch the whole document as one binary payload
    fn load(&self, url: &str) -> Result<FetchedDocument, FetchError>;
}

/// Loads `http(s)://` URLs over the network and decodes `data:` URLs in place
pub struct HttpLoader {
    #[cfg(feature = "http")]
    client: reqwest::blocking::Client,
}

impl HttpLoader {
    pub fn new(config: &LoaderConfig) -> Result<Self, FetchError> {
        #[cfg(feature = "http")]
        {
            use std::time::Duration;

            let client = reqwest::blocking::Client::builder()
                .timeout(Duration::from_secs(config.timeout_secs))
                .user_agent(config.user_agent.as_str())
                .build()
                .map_err(|e| FetchError::Client(e.to_string()))?;
            Ok(Self { client })
        }

        #[cfg(not(feature = "http"))]
        {
            let _ = config;
            Ok(Self {})
        }
    }

    #[cfg(feature = "http")]
    fn fetch_http(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let transport = |e: reqwest::Error| FetchError::Transport {
            url: url.to_string(),
            message: e.to_string(),
        };

        let response = self.client.get(url).send().map_err(transport)?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let bytes = response.bytes().map_err(transport)?;
        Ok(bytes.to_vec())
    }

    #[cfg(not(feature = "http"))]
    fn fetch_http(&self, _url: &str) -> Result<Vec<u8>, FetchError> {
        Err(FetchError::HttpDisabled)
    }
}

impl Loader for HttpLoader {
    fn load(&self, url: &str) -> Result<FetchedDocument, FetchError> {
        let bytes = if url.starts_with("data:") {
            decode_data_url(url)?
        } else if url.starts_with("https://") || url.starts_with("http://") {
            log::debug!("fetching {}", url);
            self.fetch_http(url)?
        } else {
            let scheme = url.split_once(':').map(|(s, _)| s).unwrap_or(url);
            return Err(FetchError::UnsupportedScheme(scheme.to_string()));
        };

        log::info!("loaded {} bytes from {}", bytes.len(), short_url(url));
        Ok(FetchedDocument {
            url: url.to_string(),
            bytes,
        })
    }
}

/// Decode the payload of a `data:[<mime>][;base64],<payload>` URL
pub fn decode_data_url(url: &str) -> Result<Vec<u8>, FetchError> {
    let malformed = || FetchError::MalformedDataUrl(short_url(url).to_string());

    let rest = url.strip_prefix("data:").ok_or_else(malformed)?;
    let (header, payload) = rest.split_once(',').ok_or_else(malformed)?;

    if header.split(';').any(|param| param.eq_ignore_ascii_case("base64")) {
        let compact: String = payload.chars().filter(|c| !c.is_ascii_whitespace()).collect();
        STANDARD.decode(compact).map_err(|_| malformed())
    } else {
        Ok(urlencoding::decode_binary(payload.as_bytes()).into_owned())
    }
}

// Data URLs can be megabytes long; keep log lines readable
fn short_url(url: &str) -> &str {
    if url.starts_with("data:") {
        url.split(',').next().unwrap_or("data:")
    } else {
        url
    }
}
