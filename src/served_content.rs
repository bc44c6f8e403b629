//! Lower level content serving. Provides [serve], building a complete http
//! response for in-memory file content, honoring conditional and range
//! request semantics.

use crate::body::Body;
use bytes::Bytes;
use http::{
    HeaderMap, Method, Response, StatusCode, header, response::Builder as ResponseBuilder,
};
use httpdate::{fmt_http_date, parse_http_date};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Builds http response serving `content` whole or in part.
///
/// Covers what callers expect from a generic file serving routine:
/// - `last-modified` header (when the modification time is known),
/// - `if-modified-since` revalidation, answering `304`,
/// - single byte range requests, answering `206` (or `416` for
///   unsatisfiable ranges; multi-range and malformed values are ignored and
///   the content is served whole),
/// - empty body (with unchanged headers) for `HEAD` requests.
///
/// Headers describing the served content are always set here; callers layer
/// response specific headers (eg. `content-type`, `content-encoding`) on
/// top.
pub fn serve(
    method: &Method,
    headers: &HeaderMap,
    modified: Option<SystemTime>,
    content: Bytes,
) -> Response<Body> {
    let body_in_response = *method != Method::HEAD;

    // modification time based revalidation
    if let Some(modified) = modified
        && not_modified(headers, modified)
    {
        let response = ResponseBuilder::new()
            .status(StatusCode::NOT_MODIFIED)
            .header(header::LAST_MODIFIED, fmt_http_date(modified))
            .body(Body::empty())
            .unwrap();
        return response;
    }

    let mut response = ResponseBuilder::new().header(header::ACCEPT_RANGES, "bytes");
    if let Some(modified) = modified {
        response = response.header(header::LAST_MODIFIED, fmt_http_date(modified));
    }

    match range_resolve(headers, content.len() as u64) {
        RangeResolved::Full => response
            .header(header::CONTENT_LENGTH, content.len())
            .body(if body_in_response {
                Body::new(content)
            } else {
                Body::empty()
            })
            .unwrap(),
        RangeResolved::Partial { start, end } => {
            let content_range = format!("bytes {start}-{end}/{}", content.len());
            let part = content.slice(start as usize..=end as usize);

            response
                .status(StatusCode::PARTIAL_CONTENT)
                .header(header::CONTENT_RANGE, content_range)
                .header(header::CONTENT_LENGTH, part.len())
                .body(if body_in_response {
                    Body::new(part)
                } else {
                    Body::empty()
                })
                .unwrap()
        }
        RangeResolved::Unsatisfiable => response
            .status(StatusCode::RANGE_NOT_SATISFIABLE)
            .header(header::CONTENT_RANGE, format!("bytes */{}", content.len()))
            .body(Body::empty())
            .unwrap(),
    }
}

/// Checks whether `if-modified-since` header revalidates the content.
///
/// Http dates carry second precision, the modification time is truncated
/// before comparison.
fn not_modified(
    headers: &HeaderMap,
    modified: SystemTime,
) -> bool {
    let if_modified_since = match headers.get(header::IF_MODIFIED_SINCE) {
        Some(if_modified_since) => if_modified_since,
        None => return false,
    };
    let if_modified_since = match if_modified_since.to_str() {
        Ok(if_modified_since) => if_modified_since,
        Err(_) => return false,
    };
    let if_modified_since = match parse_http_date(if_modified_since) {
        Ok(if_modified_since) => if_modified_since,
        Err(_) => return false,
    };

    let modified = match modified.duration_since(UNIX_EPOCH) {
        Ok(since_epoch) => UNIX_EPOCH + Duration::from_secs(since_epoch.as_secs()),
        Err(_) => return false,
    };

    modified <= if_modified_since
}

/// Result of resolving the request `range` header against content length.
#[derive(PartialEq, Eq, Debug)]
enum RangeResolved {
    /// No (usable) range requested, content is served whole.
    Full,
    /// Single satisfiable range, bounds inclusive.
    Partial { start: u64, end: u64 },
    /// Range lies outside of the content.
    Unsatisfiable,
}

fn range_resolve(
    headers: &HeaderMap,
    len: u64,
) -> RangeResolved {
    let range = match headers.get(header::RANGE) {
        Some(range) => range,
        None => return RangeResolved::Full,
    };
    let range = match range.to_str() {
        Ok(range) => range,
        Err(_) => return RangeResolved::Full,
    };
    let range = match range.strip_prefix("bytes=") {
        Some(range) => range,
        None => return RangeResolved::Full,
    };

    // multi range requests are served whole
    if range.contains(',') {
        return RangeResolved::Full;
    }

    let (start, end) = match range.trim().split_once('-') {
        Some(parts) => parts,
        None => return RangeResolved::Full,
    };

    if start.is_empty() {
        // suffix form, last `end` bytes of the content
        let suffix_len = match end.parse::<u64>() {
            Ok(suffix_len) => suffix_len,
            Err(_) => return RangeResolved::Full,
        };
        if suffix_len == 0 || len == 0 {
            return RangeResolved::Unsatisfiable;
        }
        return RangeResolved::Partial {
            start: len.saturating_sub(suffix_len),
            end: len - 1,
        };
    }

    let start = match start.parse::<u64>() {
        Ok(start) => start,
        Err(_) => return RangeResolved::Full,
    };
    let end = if end.is_empty() {
        len.saturating_sub(1)
    } else {
        match end.parse::<u64>() {
            Ok(end) => end,
            Err(_) => return RangeResolved::Full,
        }
    };

    if start >= len {
        return RangeResolved::Unsatisfiable;
    }
    if start > end {
        return RangeResolved::Full;
    }

    RangeResolved::Partial {
        start,
        end: end.min(len - 1),
    }
}
