//! Serves a directory using tokio + hyper + web_compressed_dir.
//!
//! 1. Prepare a directory with assets, optionally adding pre-compressed
//!    siblings, eg. `brotli -k index.html` / `gzip -k index.html`.
//! 2. Build & run this example `cargo run --example serve -- ./static`.
//! 3. Open http://localhost:8080/index.html in your browser.
//!
//! Please note that a relative directory is resolved against the running
//! executable location (not the working directory), see
//! [web_compressed_dir::vfs::DirFilesystem].

use anyhow::{Context, Error};
use clap::Parser;
use hyper::{body::Incoming, server::conn::http1, service::service_fn};
use hyper_util::rt::TokioIo;
use log::LevelFilter;
use simple_logger::SimpleLogger;
use std::{convert::Infallible, net::SocketAddr, path::PathBuf, sync::Arc};
use tokio::net::TcpListener;
use web_compressed_dir::{responder::Responder, vfs::DirFilesystem};

#[derive(Parser, Debug)]
#[command(version, about)]
struct Arguments {
    /// Directory to serve.
    root: PathBuf,

    /// Address to listen on.
    #[arg(long, default_value = "0.0.0.0:8080")]
    bind: SocketAddr,
}

#[tokio::main]
async fn main() {
    SimpleLogger::new()
        .env()
        .with_level(LevelFilter::Info)
        .init()
        .unwrap();
    main_result().await.unwrap()
}

async fn main_result() -> Result<(), Error> {
    let arguments = Arguments::parse();

    let responder = Arc::new(Responder::new(DirFilesystem::new(arguments.root)));

    let listener = TcpListener::bind(arguments.bind).await.context("bind")?;
    log::info!("server listening on {}", arguments.bind);

    loop {
        let (stream, _remote_address) = listener.accept().await.context("accept")?;
        let io = TokioIo::new(stream);

        let responder = responder.clone();
        let service_fn = service_fn(move |request: hyper::Request<Incoming>| {
            let responder = responder.clone();
            async move {
                let (parts, _body) = request.into_parts();

                log::info!("serving {}", parts.uri);
                let response =
                    responder.respond_flatten(&parts.method, parts.uri.path(), &parts.headers);

                Ok::<_, Infallible>(response)
            }
        });

        tokio::spawn(async move {
            if let Err(error) = http1::Builder::new().serve_connection(io, service_fn).await {
                log::error!("connection error: {error}");
            }
        });
    }
}
