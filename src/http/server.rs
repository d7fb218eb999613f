//! Control API server.
//!
//! # Responsibilities
//! - Build the axum router over a shared [`Harness`]
//! - Serve on a bound listener until the shutdown signal fires

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::lifecycle::Harness;

/// HTTP front end for a running harness.
pub struct HarnessServer {
    router: Router,
}

impl HarnessServer {
    pub fn new(harness: Arc<Harness>) -> Self {
        Self {
            router: Self::build_router(harness),
        }
    }

    fn build_router(harness: Arc<Harness>) -> Router {
        Router::new()
            .route("/status", get(handlers::get_status))
            .route("/backends", get(handlers::get_backends))
            .route("/backends/{name}/{operation}", post(handlers::run_operation))
            .route(
                "/context",
                get(handlers::get_context)
                    .put(handlers::put_context)
                    .delete(handlers::reset_context),
            )
            .route("/sdk/{operation}", post(handlers::run_sdk_operation))
            .route(
                "/results",
                get(handlers::get_results).delete(handlers::clear_results),
            )
            .with_state(harness)
            .layer(TraceLayer::new_for_http())
    }

    /// The router, for serving in-process (tests).
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Serve until `shutdown` yields.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "Control API listening");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("Control API stopped");
        Ok(())
    }
}
