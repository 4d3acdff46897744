use std::{
    fmt::Debug,
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

use alloy::{
    rpc::json_rpc::{RequestPacket, ResponsePacket},
    transports::TransportError,
};
use tower::{Layer, Service};
use tracing::debug;

/// A layer to be used with `ClientBuilder::layer` that logs the latency and tx hash of every
/// `eth_sendRawTransaction` call.
#[derive(Clone, Copy, Debug, Default)]
pub struct LoggingLayer;

impl<S> Layer<S> for LoggingLayer {
    type Service = LoggingService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        LoggingService { inner }
    }
}

#[derive(Debug, Clone)]
pub struct LoggingService<S> {
    inner: S,
}

impl<S> Service<RequestPacket> for LoggingService<S>
where
    S: Service<RequestPacket, Response = ResponsePacket, Error = TransportError>,
    S::Future: Send + 'static,
    S::Response: Send + 'static + Debug,
    S::Error: Send + 'static + Debug,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: RequestPacket) -> Self::Future {
        let id = match &req {
            RequestPacket::Single(inner_req) if inner_req.method() == "eth_sendRawTransaction" => {
                inner_req.id().as_number()
            }
            _ => None,
        };

        let start_time = tokio::time::Instant::now();
        let fut = self.inner.call(req);

        Box::pin(async move {
            let res = fut.await;
            if let (Some(id), Ok(ResponsePacket::Single(inner_res))) = (id, &res) {
                let elapsed = start_time.elapsed().as_millis() as u64;
                match inner_res.payload.as_success() {
                    Some(payload) => {
                        debug!(id, latency_ms = elapsed, "tx delivered. hash: {}", payload.get())
                    }
                    None => debug!(id, latency_ms = elapsed, "tx rejected"),
                }
            }
            res
        })
    }
}
