//! Transport driver
//!
//! Adapts hyper's HTTP/1 server to the controller tree: one `Context` per
//! inbound request, one traversal, one completion. The driver is the last
//! line of defense: it renders unabsorbed errors, synthesizes a 504 when a
//! controller claims success without finishing the response, and converts
//! controller panics into 500s instead of letting them skip the completion
//! contract.

use std::convert::Infallible;
use std::fmt;
use std::net::SocketAddr;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use bytes::Bytes;
use futures::FutureExt;
use http_body_util::{BodyExt, Full};
use hyper::body::Body;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;
use tokio::sync::watch;
use uuid::Uuid;

use crate::config::RunMode;
use crate::controller::error_handler::render_error_page;
use crate::core::{Context, ControllerRef, HttpError, Request, Response};

#[cfg(test)]
mod tests;

pub struct HttpService {
    root: ControllerRef,
    run_mode: RunMode,
    shutdown_tx: watch::Sender<bool>,
}

impl HttpService {
    pub fn new(root: ControllerRef, run_mode: RunMode) -> Self {
        let (shutdown_tx, _) = watch::channel(false);
        Self {
            root,
            run_mode,
            shutdown_tx,
        }
    }

    #[cfg(test)]
    pub(crate) fn shutdown_rx(&self) -> watch::Receiver<bool> {
        self.shutdown_tx.subscribe()
    }

    /// Accept loop for one listener address. Returns when the socket fails
    /// to bind or a fail-fast shutdown was requested.
    pub async fn run(self: Arc<Self>, addr: SocketAddr) -> std::io::Result<()> {
        let listener = TcpListener::bind(addr).await?;
        log::info!("listening on {addr}");

        let mut shutdown_rx = self.shutdown_tx.subscribe();
        loop {
            tokio::select! {
                _ = shutdown_rx.changed() => {
                    log::warn!("fail-fast shutdown requested, stopping listener on {addr}");
                    return Ok(());
                }
                accepted = listener.accept() => {
                    let (stream, peer) = match accepted {
                        Ok(accepted) => accepted,
                        Err(e) => {
                            log::warn!("accept failed on {addr}: {e}");
                            continue;
                        }
                    };
                    let service = self.clone();
                    tokio::spawn(async move {
                        let io = TokioIo::new(stream);
                        let handler = service_fn(move |req| {
                            let service = service.clone();
                            async move { Ok::<_, Infallible>(service.handle_request(req).await) }
                        });
                        if let Err(e) = http1::Builder::new().serve_connection(io, handler).await {
                            log::debug!("connection from {peer} ended with error: {e}");
                        }
                    });
                }
            }
        }
    }

    /// Drive one request through the controller tree.
    pub async fn handle_request<B>(&self, req: http::Request<B>) -> http::Response<Full<Bytes>>
    where
        B: Body,
        B::Error: fmt::Display,
    {
        let (parts, body) = req.into_parts();
        let body = match body.collect().await {
            Ok(collected) => collected.to_bytes(),
            Err(e) => {
                log::warn!("failed to read request body: {e}");
                return error_response(&HttpError::from_status(400));
            }
        };

        let request = Request::new(
            parts.method,
            parts.uri.path().to_string(),
            parts.version,
            parts.headers,
            body,
        );
        let mut ctx = Context::new(request);
        let request_id = Uuid::new_v4().to_string();

        let outcome = AssertUnwindSafe(self.root.handle(&mut ctx)).catch_unwind().await;
        let result = match outcome {
            Ok(result) => result,
            Err(_) => Err(HttpError::server_error().with_message("controller panicked")),
        };
        // Success without a finished response means some leaf never held up
        // its end of the contract.
        let result = match result {
            Ok(()) if !ctx.response.is_finished() => Err(HttpError::upstream_incomplete()),
            other => other,
        };

        if let Err(err) = result {
            log::error!(
                "unhandled error for {} {}: {err}",
                ctx.request.method(),
                ctx.request.path()
            );
            if ctx.response.head_sent() {
                // Head already on the wire; nothing sensible left to render.
                ctx.response.end();
            } else if let Err(render_err) = render_error_page(&mut ctx.response, &err) {
                // Unrepresentable status or headers; fall back to a bare 500.
                log::error!("failed to render error page: {render_err}");
                if render_error_page(&mut ctx.response, &HttpError::server_error()).is_err() {
                    ctx.response.end();
                }
            }
            if self.run_mode == RunMode::FailFast {
                let _ = self.shutdown_tx.send(true);
            }
        }

        log::info!(
            request_id = request_id.as_str();
            "{} {} {:?} -> {}",
            ctx.request.method(),
            ctx.request.path(),
            ctx.request.version(),
            ctx.response.status().as_u16()
        );

        into_hyper_response(ctx.response)
    }
}

fn into_hyper_response(response: Response) -> http::Response<Full<Bytes>> {
    let (status, headers, body) = response.into_parts();
    let mut resp = http::Response::new(Full::new(body));
    *resp.status_mut() = status;
    *resp.headers_mut() = headers;
    resp
}

/// Build a standalone error response, outside any controller traversal.
fn error_response(err: &HttpError) -> http::Response<Full<Bytes>> {
    let mut response = Response::new();
    if render_error_page(&mut response, err).is_err() {
        response.end();
    }
    into_hyper_response(response)
}
