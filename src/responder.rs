//! Module containing [Responder] - service taking http request (parts) and
//! returning http responses with files served from a [Filesystem].

use crate::{
    body::Body,
    content_encoding::EncodingSelected,
    content_type, served_content,
    vfs::{FileHandle, Filesystem},
};
use http::{
    HeaderMap, HeaderValue, Method, Response as HttpResponse, StatusCode, header,
    response::Builder as ResponseBuilder,
};
use std::io;

/// Http response type specialization.
pub type Response = HttpResponse<Body>;

/// Responder service, providing http response for requests, serving files
/// from a [Filesystem] together with their pre-compressed siblings.
///
/// For a logical name `X` an optional sibling `X.br` (brotli) and/or `X.gz`
/// (gzip) may be stored next to it, containing the same content compressed
/// ahead of time. When the client accepts a matching encoding and the
/// sibling is a regular file, the sibling bytes are served with
/// `content-encoding` and `vary: accept-encoding` set; in every other case
/// (no encoding accepted, sibling missing, sibling being a directory) the
/// original file is served as is, with no compression related headers.
///
/// There are two main methods for this type:
/// - [Self::respond] - generates http response for successful requests and
///   lets user handle errors manually.
/// - [Self::respond_flatten] - like above, but generates default responses
///   also for errors.
///
/// # Examples
///
/// ```
/// use http::{HeaderMap, Method, StatusCode};
/// use web_compressed_dir::{responder::Responder, vfs::MemoryFilesystem};
///
/// let mut fs = MemoryFilesystem::new();
/// fs.file_add("/present", &b"content"[..], None);
///
/// let responder = Responder::new(fs);
///
/// assert_eq!(
///     responder.respond_flatten(
///         &Method::GET,
///         "/present",
///         &HeaderMap::default(),
///     ).status(),
///     StatusCode::OK
/// );
/// assert_eq!(
///     responder.respond_flatten(
///         &Method::GET,
///         "/missing",
///         &HeaderMap::default(),
///     ).status(),
///     StatusCode::NOT_FOUND
/// );
/// ```
///
/// For a complete hyper server see `demos/serve`.
#[derive(Debug)]
pub struct Responder<F>
where
    F: Filesystem,
{
    fs: F,
}
impl<F> Responder<F>
where
    F: Filesystem,
{
    /// Creates new instance, serving files from `fs`.
    ///
    /// The filesystem is given a chance to re-anchor itself against the
    /// running executable location, see
    /// [Filesystem::anchored_to_executable].
    pub fn new(fs: F) -> Self {
        let fs = fs.anchored_to_executable();
        Self { fs }
    }

    /// Returns http response for given request parts or rust error to be
    /// handled by user.
    ///
    /// Inside this method:
    /// - Checks http method (accepts GET or HEAD).
    /// - Derives `content-type` from the logical name extension.
    /// - Negotiates content encoding and tries the matching pre-compressed
    ///   sibling (`name` + `.br` / `.gz`).
    /// - Falls back to the file under `name` itself.
    ///
    /// Every file handle opened here is released before returning, on every
    /// path, including the abandoned sibling attempt.
    ///
    /// For alternative handling errors with default http responses see
    /// [Self::respond_flatten].
    pub fn respond(
        &self,
        method: &Method,
        name: &str,
        headers: &HeaderMap,
    ) -> Result<Response, RespondError> {
        // only GET and HEAD are supported
        match *method {
            Method::GET | Method::HEAD => {}
            _ => {
                return Err(RespondError::HttpMethodNotSupported);
            }
        }

        // content-type follows the logical name, no matter which encoding
        // variant ends up on the wire
        let content_type = content_type::from_name(name);

        // negotiate encoding, try the pre-compressed sibling
        let encoding = EncodingSelected::from_headers(headers);
        if let Some(mut response) = self.respond_compressed(method, name, headers, encoding) {
            if response.status() != StatusCode::NOT_MODIFIED
                && let Some(content_type) = content_type
            {
                response
                    .headers_mut()
                    .insert(header::CONTENT_TYPE, content_type);
            }
            return Ok(response);
        }

        // fall back to the original file
        let mut file = match self.fs.open(name) {
            Ok(file) => file,
            Err(error) => return Err(RespondError::OpenFile(error)),
        };
        let metadata = match file.metadata() {
            Ok(metadata) => metadata,
            Err(error) => return Err(RespondError::FileMetadata(error)),
        };
        if metadata.is_dir {
            return Err(RespondError::IsADirectory);
        }
        let content = match file.read_content() {
            Ok(content) => content,
            Err(error) => return Err(RespondError::ReadFile(error)),
        };

        let mut response = served_content::serve(method, headers, metadata.modified, content);
        if response.status() != StatusCode::NOT_MODIFIED
            && let Some(content_type) = content_type
        {
            response
                .headers_mut()
                .insert(header::CONTENT_TYPE, content_type);
        }
        Ok(response)
    }

    /// Attempts serving the pre-compressed sibling of `name`. [None] means
    /// no suitable sibling exists and the original file should be served
    /// instead - a missing sibling, an unreadable one and a directory
    /// colliding with the sibling name are all treated the same way, as if
    /// there was no sibling at all.
    fn respond_compressed(
        &self,
        method: &Method,
        name: &str,
        headers: &HeaderMap,
        encoding: EncodingSelected,
    ) -> Option<Response> {
        let content_encoding = encoding.header_value()?;

        let mut file = self.fs.open(&format!("{name}{}", encoding.suffix())).ok()?;

        // a directory colliding with the sibling name must never be served
        let metadata = file.metadata().ok()?;
        if metadata.is_dir {
            return None;
        }

        let content = file.read_content().ok()?;

        let mut response = served_content::serve(method, headers, metadata.modified, content);
        response
            .headers_mut()
            .insert(header::CONTENT_ENCODING, content_encoding);
        response.headers_mut().append(
            header::VARY,
            HeaderValue::from_static("Accept-Encoding"),
        );
        Some(response)
    }

    /// Like [Self::respond], but generates "default" (proper http status
    /// code and error message body) responses also for errors. This will for
    /// example generate HTTP 404 response for a name not found in the
    /// filesystem.
    ///
    /// For manual error handling, see [Self::respond].
    pub fn respond_flatten(
        &self,
        method: &Method,
        name: &str,
        headers: &HeaderMap,
    ) -> Response {
        match self.respond(method, name, headers) {
            Ok(response) => response,
            Err(respond_error) => respond_error.into_response(),
        }
    }
}

/// Possible errors during [Responder::respond] handling.
#[derive(Debug)]
pub enum RespondError {
    /// Not supported HTTP Method, this maps to HTTP `METHOD_NOT_ALLOWED`.
    HttpMethodNotSupported,

    /// The file could not be opened. This maps to HTTP `NOT_FOUND`.
    OpenFile(io::Error),

    /// Metadata of the opened file could not be read. This maps to HTTP
    /// `INTERNAL_SERVER_ERROR`.
    FileMetadata(io::Error),

    /// Content of the opened file could not be read. This maps to HTTP
    /// `INTERNAL_SERVER_ERROR`.
    ReadFile(io::Error),

    /// The logical name resolves to a directory. This maps to HTTP
    /// `FORBIDDEN`.
    IsADirectory,
}
impl RespondError {
    /// Converts error into best matching HTTP error code.
    pub fn status_code(&self) -> StatusCode {
        match self {
            RespondError::HttpMethodNotSupported => StatusCode::METHOD_NOT_ALLOWED,
            RespondError::OpenFile(_) => StatusCode::NOT_FOUND,
            RespondError::FileMetadata(_) | RespondError::ReadFile(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            RespondError::IsADirectory => StatusCode::FORBIDDEN,
        }
    }

    /// Creates default response (status code + error message body) for this
    /// error.
    ///
    /// Error responses never carry `content-type` / `content-encoding`
    /// headers, there is no served file they would describe.
    pub fn into_response(self) -> Response {
        let message = match &self {
            RespondError::HttpMethodNotSupported => "method not allowed".to_owned(),
            RespondError::OpenFile(error)
            | RespondError::FileMetadata(error)
            | RespondError::ReadFile(error) => error.to_string(),
            RespondError::IsADirectory => "is a directory".to_owned(),
        };

        let response = ResponseBuilder::new()
            .status(self.status_code())
            .body(Body::new(message.into()))
            .unwrap();
        response
    }
}

#[cfg(test)]
mod test_responder {
    use super::{RespondError, Responder};
    use crate::vfs::MemoryFilesystem;
    use http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode, header};
    use std::time::{Duration, SystemTime, UNIX_EPOCH};

    // "content-gzip"
    const CONTENT_GZIP: &[u8] = b"\x1f\x8b\x08\x00\x00\x00\x00\x00\x00\x03\x4b\xce\xcf\x2b\x49\xcd\x2b\xd1\x4d\xaf\xca\x2c\x00\x00\x98\x02\x99\x74\x0c\x00\x00\x00";
    // "content-brotli"
    const CONTENT_BROTLI: &[u8] =
        b"\x8b\x06\x80\x63\x6f\x6e\x74\x65\x6e\x74\x2d\x62\x72\x6f\x74\x6c\x69\x03";

    fn modified() -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(1_700_000_000)
    }

    fn responder() -> Responder<MemoryFilesystem> {
        let mut fs = MemoryFilesystem::new();
        fs.file_add("/present.txt", &b"content-identity"[..], Some(modified()));
        fs.file_add("/present.txt.gz", CONTENT_GZIP, Some(modified()));
        fs.file_add("/present.txt.br", CONTENT_BROTLI, Some(modified()));
        fs.file_add("/plain.txt", &b"content-identity"[..], Some(modified()));
        fs.file_add("/collided.txt", &b"content-identity"[..], Some(modified()));
        fs.directory_add("/collided.txt.br");
        fs.directory_add("/directory");
        Responder::new(fs)
    }

    fn headers(entries: &[(&'static str, &'static str)]) -> HeaderMap {
        entries
            .iter()
            .copied()
            .map(|(key, value)| {
                (
                    HeaderName::from_static(key),
                    HeaderValue::from_static(value),
                )
            })
            .collect::<HeaderMap>()
    }

    #[test]
    fn serves_brotli_sibling_when_accepted() {
        let response = responder()
            .respond(
                &Method::GET,
                "/present.txt",
                &headers(&[("accept-encoding", "gzip, br")]),
            )
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_ENCODING).unwrap(),
            "br"
        );
        assert_eq!(
            response.headers().get(header::VARY).unwrap(),
            "Accept-Encoding"
        );
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "text/plain; charset=utf-8"
        );
        assert_eq!(response.body().data(), CONTENT_BROTLI);
    }

    #[test]
    fn serves_gzip_sibling_when_brotli_not_accepted() {
        let response = responder()
            .respond(
                &Method::GET,
                "/present.txt",
                &headers(&[("accept-encoding", "gzip")]),
            )
            .unwrap();

        assert_eq!(
            response.headers().get(header::CONTENT_ENCODING).unwrap(),
            "gzip"
        );
        assert_eq!(response.body().data(), CONTENT_GZIP);
    }

    #[test]
    fn serves_original_without_accept_encoding_header() {
        let response = responder()
            .respond(&Method::GET, "/present.txt", &HeaderMap::default())
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().get(header::CONTENT_ENCODING).is_none());
        assert!(response.headers().get(header::VARY).is_none());
        assert_eq!(response.body().data(), b"content-identity");
    }

    #[test]
    fn falls_back_to_original_when_sibling_is_missing() {
        // brotli is selected, so the missing `.br` sibling of the file with
        // only a `.gz` one falls through to the original content
        let mut fs = MemoryFilesystem::new();
        fs.file_add("/present.txt", &b"content-identity"[..], Some(modified()));
        fs.file_add("/present.txt.gz", CONTENT_GZIP, Some(modified()));
        let responder = Responder::new(fs);

        let response = responder
            .respond(
                &Method::GET,
                "/present.txt",
                &headers(&[("accept-encoding", "br")]),
            )
            .unwrap();

        assert!(response.headers().get(header::CONTENT_ENCODING).is_none());
        assert_eq!(response.body().data(), b"content-identity");
    }

    #[test]
    fn directory_sibling_is_treated_as_missing() {
        let response = responder()
            .respond(
                &Method::GET,
                "/collided.txt",
                &headers(&[("accept-encoding", "br")]),
            )
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().get(header::CONTENT_ENCODING).is_none());
        assert!(response.headers().get(header::VARY).is_none());
        assert_eq!(response.body().data(), b"content-identity");
    }

    #[test]
    fn serves_identity_roundtrip_byte_identical() {
        let response = responder()
            .respond(&Method::GET, "/plain.txt", &HeaderMap::default())
            .unwrap();

        assert_eq!(response.body().data(), b"content-identity");
        assert_eq!(
            response.headers().get(header::CONTENT_LENGTH).unwrap(),
            "16"
        );
    }

    #[test]
    fn resolves_no_body_for_head_request() {
        let response = responder()
            .respond(
                &Method::HEAD,
                "/present.txt",
                &headers(&[("accept-encoding", "br")]),
            )
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_ENCODING).unwrap(),
            "br"
        );
        assert_eq!(response.body().data(), b"");
    }

    #[test]
    fn resolves_not_modified_for_current_date() {
        let response = responder()
            .respond(
                &Method::GET,
                "/present.txt",
                &[(
                    header::IF_MODIFIED_SINCE,
                    HeaderValue::from_str(&httpdate::fmt_http_date(modified())).unwrap(),
                )]
                .into_iter()
                .collect::<HeaderMap>(),
            )
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_MODIFIED);
        assert!(response.headers().get(header::CONTENT_TYPE).is_none());
        assert_eq!(response.body().data(), b"");
    }

    #[test]
    fn resolves_error_for_invalid_method() {
        let respond_error = responder()
            .respond(&Method::POST, "/present.txt", &HeaderMap::default())
            .unwrap_err();
        assert!(matches!(
            respond_error,
            RespondError::HttpMethodNotSupported
        ));

        let response = respond_error.into_response();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[test]
    fn resolves_error_for_file_not_found() {
        let respond_error = responder()
            .respond(&Method::GET, "/missing.txt", &HeaderMap::default())
            .unwrap_err();
        assert!(matches!(respond_error, RespondError::OpenFile(_)));

        let response = respond_error.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(response.headers().get(header::CONTENT_TYPE).is_none());
        assert!(response.headers().get(header::CONTENT_ENCODING).is_none());
        assert_eq!(response.body().data(), b"/missing.txt: no such file");
    }

    #[test]
    fn missing_file_with_accepted_encoding_still_resolves_not_found() {
        let respond_error = responder()
            .respond(
                &Method::GET,
                "/missing.txt",
                &headers(&[("accept-encoding", "gzip, br")]),
            )
            .unwrap_err();
        assert!(matches!(respond_error, RespondError::OpenFile(_)));
    }

    #[test]
    fn resolves_error_for_directory() {
        let respond_error = responder()
            .respond(&Method::GET, "/directory", &HeaderMap::default())
            .unwrap_err();
        assert!(matches!(respond_error, RespondError::IsADirectory));

        let response = respond_error.into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(response.body().data(), b"is a directory");
    }
}
