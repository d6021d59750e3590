use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use async_graphql::dynamic;
use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::{extract::State, http::HeaderMap, routing::get, Json, Router};
use graphrq_directives::{ExecutableOptions, RequestContext};
use tokio::{net::TcpListener, signal};

use crate::{config::Config, graph::GraphDefinition, Error};

const DEFAULT_LISTEN_ADDRESS: SocketAddr = SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 4000);
const DEFAULT_GRAPH_PATH: &str = "/graphql";

/// Start parameters for the server.
pub struct ServerConfig {
    /// The GraphQL endpoint listen address. Takes precedence over the configuration file.
    pub listen_addr: Option<SocketAddr>,
    /// The server configuration.
    pub config: Config,
    /// The schema and data to serve.
    pub graph: GraphDefinition,
}

/// Builds the schema and serves it until Ctrl+C or SIGTERM.
pub async fn serve(
    ServerConfig {
        listen_addr,
        config,
        graph,
    }: ServerConfig,
) -> crate::Result<()> {
    let schema = executable_schema(&graph, &config)?;
    let router = router(schema, &config);

    let addr = listen_addr
        .or(config.network.listen_address)
        .unwrap_or(DEFAULT_LISTEN_ADDRESS);

    let listener = TcpListener::bind(addr).await.map_err(Error::Server)?;
    let path = config.graph.path.as_deref().unwrap_or(DEFAULT_GRAPH_PATH);
    tracing::info!("GraphQL endpoint exposed at http://{addr}{path}");

    axum::serve(listener, router)
        .with_graceful_shutdown(graceful_shutdown())
        .await
        .map_err(Error::Server)?;

    Ok(())
}

/// The schema with directives applied, ready to answer requests.
pub fn executable_schema(graph: &GraphDefinition, config: &Config) -> crate::Result<dynamic::Schema> {
    let options = ExecutableOptions {
        introspection: config.graph.introspection,
    };

    let schema = graph
        .build(&config.directives)?
        .into_executable_with(graph.seed().clone(), options)?;

    Ok(schema)
}

/// The GraphQL endpoint, answering GET and POST, plus the health check when enabled.
pub fn router(schema: dynamic::Schema, config: &Config) -> Router {
    let path = config.graph.path.as_deref().unwrap_or(DEFAULT_GRAPH_PATH);
    let mut router = Router::new().route(path, get(execute).post(execute));

    if config.health.enabled {
        router = router.route(&config.health.path, get(health));
    }

    router.with_state(schema)
}

async fn execute(State(schema): State<dynamic::Schema>, headers: HeaderMap, request: GraphQLRequest) -> GraphQLResponse {
    let request = request.into_inner().data(RequestContext::new(headers));
    schema.execute(request).await.into()
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "healthy" }))
}

async fn graceful_shutdown() {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {error}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut terminate) => {
                terminate.recv().await;
            }
            Err(error) => {
                tracing::error!("failed to install signal handler: {error}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutting down gracefully...");
}
