use std::{future::IntoFuture, net::SocketAddr, time::Instant};

use axum::{
    extract::Request,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Router,
};

use crate::resolver::Resolver;

mod handlers;
mod models;

use handlers::{download, health, list, not_found, register, version};

#[derive(Clone)]
pub struct AppState {
    pub resolver: Resolver,
}

pub fn router(resolver: Resolver) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/new", post(register))
        .route("/version/:name", get(version))
        .route("/download/:name", get(download))
        .route("/list", get(list))
        .fallback(not_found)
        .layer(middleware::from_fn(log_requests))
        .with_state(AppState { resolver })
}

async fn log_requests(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let start = Instant::now();
    log::info!("Started {} {}", method, path);

    let response = next.run(request).await;

    log::info!(
        "Completed {} {} with status {} in {:?}",
        method,
        path,
        response.status().as_u16(),
        start.elapsed()
    );
    response
}

pub async fn serve(
    addr: SocketAddr,
    resolver: Resolver,
    shutdown: tokio_util::sync::CancellationToken,
) -> anyhow::Result<()> {
    let app = router(resolver);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    log::info!("🌐 REST listening on http://{}", listener.local_addr()?);
    // In-flight requests are not drained: a hanging feed must not hold the
    // process open past a termination signal.
    tokio::select! {
        res = axum::serve(listener, app).into_future() => res?,
        _ = shutdown.cancelled() => log::info!("🛑 REST shutdown requested"),
    }
    log::info!("👋 REST server exited");
    Ok(())
}
