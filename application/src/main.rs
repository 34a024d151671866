use std::{
    io,
    sync::{Arc, OnceLock},
    time,
};

use application::{api, graphql, Args, Config};
use axum::{
    extract::MatchedPath,
    routing::{on, MethodFilter},
    Extension, Router,
};
use axum_client_ip::InsecureClientIp;
use service::{infra::Sqlite, Service};
use tokio::net::TcpListener;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing as log;
use tracing_subscriber::{
    filter::filter_fn,
    fmt::MakeWriter,
    layer::{Layer, SubscriberExt as _},
    registry::LookupSpan,
    util::SubscriberInitExt as _,
};

const STDERR_LEVELS: &[log::Level] = &[log::Level::WARN, log::Level::ERROR];

static LOG_LEVEL: OnceLock<log::Level> = OnceLock::new();

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(log_layer(io::stdout, false))
        .with(log_layer(io::stderr, true))
        .init();

    _ = start().await;
}

/// Creates a log [`Layer`] writing the events into the provided `writer`.
///
/// Warnings and errors go only to the `stderr` layer, while the rest of events
/// go only to the other one.
fn log_layer<S, W>(writer: W, stderr: bool) -> impl Layer<S>
where
    S: log::Subscriber + for<'a> LookupSpan<'a>,
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    tracing_subscriber::fmt::layer()
        .compact()
        .with_ansi(true)
        .with_thread_names(true)
        .with_writer(writer)
        .with_filter(filter_fn(move |meta| {
            meta.is_span()
                || (STDERR_LEVELS.contains(meta.level()) == stderr)
                    && LOG_LEVEL.get().copied().unwrap_or(log::Level::INFO)
                        >= *meta.level()
        }))
}

async fn start() -> Result<(), ()> {
    let Args { config } = Args::parse().map_err(|e| {
        log::error!("failed to parse command line arguments: {e}");
    })?;

    let Config {
        server,
        service,
        sqlite,
        log,
    } = Config::new(config).map_err(|e| {
        log::error!("failed to load `Config`: {e}");
    })?;

    LOG_LEVEL
        .set(log.level.into())
        .unwrap_or_else(|_| unreachable!("first initialization"));

    let sqlite_config: service::infra::sqlite::Config = sqlite.into();
    let sqlite = Sqlite::new(&sqlite_config);

    sqlite.ensure_schema().await.map_err(|e| {
        log::error!(
            "failed to prepare database schema in `{}`: {e}",
            sqlite_config.path.display(),
        );
    })?;

    let service = Service::new(service.into(), sqlite);
    let app = router(service, cors_layer(&server.cors)?);

    let listener = TcpListener::bind((server.host.clone(), server.port))
        .await
        .map_err(|e| {
            log::error!(
                "failed to listen on `{}:{}`: {e}",
                server.host,
                server.port,
            );
        })?;

    log::info!("listening on `{}:{}`", server.host, server.port);

    axum::serve(listener, app)
        .await
        .map_err(|e| log::error!("webserver failed: {e}"))
}

/// Builds the [`CorsLayer`] allowing the configured origins.
///
/// A `*` origin allows any origin.
fn cors_layer(conf: &application::config::Cors) -> Result<CorsLayer, ()> {
    let origins = if conf.origins.iter().any(|o| o == "*") {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(
            conf.origins
                .iter()
                .map(|origin| {
                    origin.parse::<http::header::HeaderValue>().map_err(|e| {
                        log::error!("`{origin}` is not a correct CORS origin: {e}");
                    })
                })
                .collect::<Result<Vec<_>, _>>()?,
        )
    };

    Ok(CorsLayer::new()
        .allow_methods([
            http::Method::GET,
            http::Method::OPTIONS,
            http::Method::POST,
        ])
        .allow_headers([
            http::header::AUTHORIZATION,
            http::header::CONTENT_TYPE,
        ])
        .allow_origin(origins))
}

/// Builds the HTTP [`Router`] serving the GraphQL API of the provided
/// [`Service`].
fn router(service: application::Service, cors: CorsLayer) -> Router {
    let schema = api::Schema::new(
        api::Query,
        api::Mutation,
        juniper::EmptySubscription::new(),
    );

    Router::new()
        .route(
            "/graphql",
            on(MethodFilter::GET.or(MethodFilter::POST), graphql),
        )
        .layer(Extension(Arc::new(schema)))
        .layer(Extension(service))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|r: &http::Request<_>| {
                    tracing::info_span!(
                        "HTTP request",
                        http.client_ip = InsecureClientIp::from(
                            r.headers(),
                            r.extensions()
                        )
                            .map(|ip| ip.0.to_string())
                            .ok(),
                        http.flavor = ?r.version(),
                        http.host = r.uri().host(),
                        http.method = r.method().as_str(),
                        http.route = r
                            .extensions()
                            .get::<MatchedPath>()
                            .map(MatchedPath::as_str),
                        http.scheme = r
                            .uri()
                            .scheme()
                            .map(http::uri::Scheme::as_str),
                        http.target = r
                            .uri()
                            .path_and_query()
                            .map(http::uri::PathAndQuery::as_str),
                        http.user_agent = r
                            .headers()
                            .get("User-Agent")
                            .and_then(|h| h.to_str().ok()),
                        http.status_code = tracing::field::Empty,
                    )
                })
                .on_response(
                    |r: &http::Response<_>,
                     dur: time::Duration,
                     span: &tracing::Span| {
                        span.record(
                            "http.status_code",
                            tracing::field::display(r.status().as_u16()),
                        );

                        if r.status().is_server_error()
                            || r.status().is_client_error()
                        {
                            tracing::error!(
                                duration = format!("{}ms", dur.as_millis()),
                            );
                        } else {
                            tracing::info!(
                                duration = format!("{}ms", dur.as_millis()),
                            );
                        }
                    },
                ),
        )
}
