//! Serve static files over http with pre-compressed (`gzip` / `brotli`)
//! sibling files.
//!
//! For every logical asset `X` an optional sibling `X.br` (brotli) and/or
//! `X.gz` (gzip) may be stored next to it, containing the same content
//! compressed ahead of time (no compression ever happens in runtime). Per
//! request the `accept-encoding` header is parsed, the best supported
//! encoding selected ([content_encoding::EncodingSelected]) and the matching
//! sibling served with `content-encoding` and `vary` headers set. When no
//! encoding matches or the sibling is missing, the original file is served
//! as is.
//!
//! Files come from a [vfs::Filesystem] - usually [vfs::DirFilesystem]
//! serving a real directory, or [vfs::MemoryFilesystem] for deterministic
//! tests. The entry point is [responder::Responder], producing
//! [http::Response] values, so the crate integrates with hyper or any server
//! of your choice. See `demos/serve` for a complete hyper server.
//!
//! # Examples
//!
//! ```
//! use http::{HeaderMap, Method, StatusCode};
//! use web_compressed_dir::{responder::Responder, vfs::MemoryFilesystem};
//!
//! let mut fs = MemoryFilesystem::new();
//! fs.file_add("/index.html", &b"<html></html>"[..], None);
//!
//! let responder = Responder::new(fs);
//!
//! let response = responder.respond_flatten(
//!     &Method::GET,
//!     "/index.html",
//!     &HeaderMap::default(),
//! );
//! assert_eq!(response.status(), StatusCode::OK);
//!
//! let response = responder.respond_flatten(
//!     &Method::GET,
//!     "/missing.html",
//!     &HeaderMap::default(),
//! );
//! assert_eq!(response.status(), StatusCode::NOT_FOUND);
//! ```

#![warn(missing_docs)]

pub mod body;
pub mod content_encoding;
pub mod content_type;
pub mod responder;
pub mod served_content;
pub mod vfs;
