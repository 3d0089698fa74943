use std::net::SocketAddr;
use std::sync::Arc;

use hyper::body::Incoming;
use hyper::service::service_fn;
use hyper::Request;
use hyper_util::rt::TokioIo;
use hyper_util::server::conn::auto;
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::config::ServiceConfig;
use crate::domain::error::ErrorResponse::InternalError;
use crate::logging::logger_setup;
use crate::repository::memory_repository::MemoryStudentRepository;
use crate::response_handler::ResultResponse;
use crate::router::{router, AppContext};

mod config;
mod domain;
mod image_service;
mod logging;
mod observability;
mod repository;
mod response_handler;
mod router;
mod service;

#[derive(Clone)]
pub struct TokioExecutor;

impl<F> hyper::rt::Executor<F> for TokioExecutor
where
    F: std::future::Future + Send + 'static,
    F::Output: Send + 'static,
{
    fn execute(&self, fut: F) {
        tokio::task::spawn(fut);
    }
}

async fn handle(
    req: Request<Incoming>,
    context: Arc<AppContext<MemoryStudentRepository>>,
) -> ResultResponse {
    match router(req, &context).await {
        Err(err) => {
            error!("Unhandled error: {err}");
            InternalError {
                message: err.to_string(),
            }
            .handle()
        }
        response => response,
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServiceConfig::from_env()?;
    let _provider = logger_setup(config.log_format)?;

    let context = Arc::new(AppContext {
        repository: MemoryStudentRepository::new(),
        max_body_bytes: config.max_body_bytes,
    });

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));

    info!("Attempting to start server at {addr}");
    let listener = TcpListener::bind(addr).await?;
    info!("Server started at {addr}");

    loop {
        let (stream, remote) = listener.accept().await?;

        let io = TokioIo::new(stream);
        let context = Arc::clone(&context);

        tokio::task::spawn(async move {
            let service = service_fn(move |req| handle(req, Arc::clone(&context)));
            if let Err(err) = auto::Builder::new(TokioExecutor)
                .serve_connection(io, service)
                .await
            {
                error!("Error serving connection from {remote}: {err:?}");
            }
        });
    }
}
