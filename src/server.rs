// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! HTTP endpoint receiving Pub/Sub push deliveries.
//!
//! A 2xx response acknowledges the message. Any other status makes the
//! subscription redeliver it according to its own retry policy.

use crate::event::PushEnvelope;
use crate::handler::{InvocationOutcome, ProtectionHandler};
use bytes::Bytes;
use http::{Method, Request, Response, StatusCode};
use http_body_util::{BodyExt, Full};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use std::convert::Infallible;
use std::fmt::Display;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

/// Accept connections forever, handling each one on its own task
pub async fn serve(handler: Arc<ProtectionHandler>, port: u16) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    info!("Listening for push deliveries on {}", addr);

    loop {
        let (stream, peer) = listener.accept().await?;
        let handler = handler.clone();

        tokio::spawn(async move {
            let service = service_fn(move |req| {
                let handler = handler.clone();
                async move { Ok::<_, Infallible>(route(&handler, req).await) }
            });

            if let Err(e) = http1::Builder::new()
                .serve_connection(TokioIo::new(stream), service)
                .await
            {
                warn!("Connection from {} failed: {}", peer, e);
            }
        });
    }
}

async fn route<B>(handler: &ProtectionHandler, req: Request<B>) -> Response<Full<Bytes>>
where
    B: hyper::body::Body,
    B::Error: Display,
{
    if req.method() != Method::POST {
        return empty(StatusCode::METHOD_NOT_ALLOWED);
    }

    match req.into_body().collect().await {
        Ok(body) => respond(handler, &body.to_bytes()).await,
        Err(e) => {
            warn!("Failed to read request body: {}", e);
            empty(StatusCode::BAD_REQUEST)
        }
    }
}

/// Run the handler for one push body and map the result to a delivery status
pub async fn respond(handler: &ProtectionHandler, body: &[u8]) -> Response<Full<Bytes>> {
    let envelope: PushEnvelope = match serde_json::from_slice(body) {
        Ok(envelope) => envelope,
        Err(e) => {
            warn!("Rejecting malformed push envelope: {}", e);
            return empty(StatusCode::BAD_REQUEST);
        }
    };

    match handler.handle(&envelope).await {
        Ok(outcome) => {
            match &outcome {
                InvocationOutcome::Protected { cluster, .. } => debug!("Acknowledging protected cluster {}", cluster),
                InvocationOutcome::Unmanageable { cluster, status } => {
                    debug!("Acknowledging unmanageable cluster {} ({})", cluster, status)
                }
            }
            empty(StatusCode::NO_CONTENT)
        }
        Err(e) if e.is_permanent() => empty(StatusCode::BAD_REQUEST),
        Err(_) => empty(StatusCode::INTERNAL_SERVER_ERROR),
    }
}

fn empty(status: StatusCode) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::new()));
    *response.status_mut() = status;
    response
}
