pub mod config;
pub mod error;
pub mod handlers;
pub mod services;

use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use config::Config;
use services::RazorpayClient;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub razorpay: RazorpayClient,
}

pub struct Application {
    port: u16,
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Build the application with the given configuration.
    ///
    /// Binds the listener eagerly so port 0 resolves to a concrete port
    /// before the server starts (used by the test harness).
    pub async fn build(config: Config) -> anyhow::Result<Self> {
        let razorpay = RazorpayClient::new(config.razorpay.clone());

        let state = AppState {
            config: config.clone(),
            razorpay,
        };

        let router = Router::new()
            .route("/health", get(handlers::health_check))
            .route("/metrics", get(handlers::metrics))
            .route("/create-order", post(handlers::checkout::create_order))
            .route("/verify-payment", post(handlers::checkout::verify_payment))
            // The checkout page is served from another origin.
            .layer(CorsLayer::permissive())
            .layer(
                TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        version = ?request.version(),
                    )
                }),
            )
            .with_state(state);

        let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
        let listener = TcpListener::bind(addr).await?;
        let port = listener.local_addr()?.port();

        Ok(Self {
            port,
            listener,
            router,
        })
    }

    /// Get the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Run the application until stopped.
    pub async fn run_until_stopped(self) -> anyhow::Result<()> {
        tracing::info!("Listening on port {}", self.port);
        axum::serve(self.listener, self.router).await?;

        Ok(())
    }
}
