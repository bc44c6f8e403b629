//! Content encoding negotiation. Provides [EncodingSelected], the outcome of
//! parsing the request `accept-encoding` header.

use http::{HeaderMap, HeaderValue, header};

/// Content encoding selected for a request.
///
/// Should be created by parsing `accept-encoding` header, through one of
/// `from_` methods. `brotli` always wins over `gzip` when both are accepted,
/// regardless of their order or quality values in the header; quality values
/// are ignored entirely.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum EncodingSelected {
    /// `br` was accepted, the `.br` sibling should be tried.
    Brotli,
    /// `gzip` (but not `br`) was accepted, the `.gz` sibling should be tried.
    Gzip,
    /// No supported encoding was accepted, the original file is served.
    Identity,
}
impl EncodingSelected {
    /// Constructs [self] from [HeaderMap]. Inside it looks only for
    /// `accept-encoding` header. Missing or non-string header value selects
    /// [Self::Identity], malformed content never errors.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let accept_encoding = match headers.get(header::ACCEPT_ENCODING) {
            Some(accept_encoding) => accept_encoding,
            None => return Self::Identity,
        };

        let accept_encoding = match accept_encoding.to_str() {
            Ok(accept_encoding) => accept_encoding,
            Err(_) => return Self::Identity,
        };

        Self::from_accept_encoding_header_str(accept_encoding)
    }

    /// Constructs [self] from `accept-encoding` header value.
    pub fn from_accept_encoding_header_str(accept_encoding: &str) -> Self {
        if accept_encoding.is_empty() {
            return Self::Identity;
        }

        let algorithms = accept_encoding
            .split(',')
            .map(Self::extract_algorithm_from_value);

        // brotli first, it wins whenever present
        if algorithms.clone().any(|algorithm| algorithm == "br") {
            return Self::Brotli;
        }
        if algorithms.clone().any(|algorithm| algorithm == "gzip") {
            return Self::Gzip;
        }

        Self::Identity
    }

    /// Removes `quality` or `preference` and surrounding whitespace from
    /// header value, eg. changes ` gzip;q=0.5` to `gzip`.
    pub fn extract_algorithm_from_value(mut value: &str) -> &str {
        if let Some((algorithm, _)) = value.split_once(';') {
            value = algorithm;
        }
        value.trim()
    }

    /// File name suffix of the pre-compressed sibling for this encoding,
    /// empty for [Self::Identity].
    pub fn suffix(&self) -> &'static str {
        match self {
            Self::Brotli => ".br",
            Self::Gzip => ".gz",
            Self::Identity => "",
        }
    }

    /// `content-encoding` header value to be sent when a sibling with this
    /// encoding is served. [None] for [Self::Identity], identity responses
    /// carry no `content-encoding` header.
    pub fn header_value(&self) -> Option<HeaderValue> {
        match self {
            Self::Brotli => Some(HeaderValue::from_static("br")),
            Self::Gzip => Some(HeaderValue::from_static("gzip")),
            Self::Identity => None,
        }
    }
}
