use crate::{config::Config, contact, cors, mail::Mailer};
use anyhow::Context;
use axum::{middleware, response::IntoResponse, routing::get, Router};
use axum_test::{transport_layer::IntoTransportLayer, TestServer};
use lettre::Transport;
use std::{env, net::SocketAddr};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{
    filter::EnvFilter,
    fmt::{
        self,
        format::{Format, JsonFields},
    },
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

pub struct App {
    router: Router,
    config: Config,
}

impl App {
    pub fn new(config: Config) -> Self {
        let router = Router::new().route("/status/liveness", get(|| async { "".into_response() }));
        Self { router, config }
    }

    pub async fn start(self) -> anyhow::Result<()> {
        let addr: SocketAddr = format!("{}:{}", self.config.bind, self.config.port)
            .parse()
            .with_context(|| {
                format!(
                    "invalid listen address {}:{}",
                    self.config.bind, self.config.port
                )
            })?;
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("could not listen on {addr}"))?;
        info!("Starting server on {addr}");
        axum::serve(listener, self.into_router()).await?;
        Ok(())
    }

    pub fn router(self, router: Router) -> Self {
        Self {
            router: self.router.merge(router),
            ..self
        }
    }

    /// Mounts the contact endpoint relaying through the given mailer.
    pub fn contact<T>(self, mailer: Mailer<T>) -> Self
    where
        T: Transport + Clone + Send + Sync + 'static,
        T::Error: Into<anyhow::Error>,
    {
        self.router(contact::router(mailer))
    }

    /// The final router, with request tracing and cors applied to every route.
    pub fn into_router(self) -> Router {
        let origin = cors::allowed_origin(&self.config.allowed_origin);
        self.router
            .layer(middleware::from_fn_with_state(origin, cors::cors))
            .layer(TraceLayer::new_for_http())
    }

    pub fn as_test_server(self) -> TestServer {
        TestServer::new(self).expect("router should make a test server")
    }
}

impl IntoTransportLayer for App {
    fn into_http_transport_layer(
        self,
        builder: axum_test::transport_layer::TransportLayerBuilder,
    ) -> anyhow::Result<Box<dyn axum_test::transport_layer::TransportLayer>> {
        self.into_router().into_http_transport_layer(builder)
    }

    fn into_mock_transport_layer(
        self,
    ) -> anyhow::Result<Box<dyn axum_test::transport_layer::TransportLayer>> {
        self.into_router().into_mock_transport_layer()
    }
}

/// Installs the global subscriber, json formatted when STRUCTURED_LOGGING=true.
/// Filtering follows RUST_LOG and defaults to info. Calling it again is a no-op.
pub fn logger() {
    let enabled: bool = env::var("STRUCTURED_LOGGING")
        .map(|s| s.parse::<bool>().unwrap_or(false))
        .unwrap_or(false);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if enabled {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .event_format(Format::default().json())
                    .fmt_fields(JsonFields::new()),
            )
            .with(filter)
            .try_init()
            .ok();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer())
            .with(filter)
            .try_init()
            .ok();
    };
}
