//! HTTP server startup and lifecycle management.

use std::net::SocketAddr;
use std::time::Instant;

use axum::Router;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use crate::config::ServerConfig;
use crate::server::{Result, ServerError, shutdown_signal};
use crate::{TRACING_TARGET_SERVER_SHUTDOWN, TRACING_TARGET_SERVER_STARTUP};

/// Starts an HTTP server with graceful shutdown.
///
/// Validates the configuration, binds the listener and serves `app` until a
/// shutdown signal arrives or `cancel` is cancelled. `cancel` is always
/// cancelled once the listener stops.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, the address cannot be
/// bound or the server fails while running.
pub async fn serve_http(
    app: Router,
    server_config: &ServerConfig,
    cancel: CancellationToken,
) -> Result<()> {
    if let Err(validation_error) = server_config.validate() {
        tracing::error!(
            target: TRACING_TARGET_SERVER_STARTUP,
            error = %validation_error,
            "Invalid server configuration"
        );

        return Err(ServerError::invalid_config(&validation_error));
    }

    let server_addr = server_config.server_addr();
    let listener = TcpListener::bind(server_addr).await.map_err(|err| {
        let error = ServerError::bind_error(server_addr, err);
        tracing::error!(
            target: TRACING_TARGET_SERVER_STARTUP,
            addr = %server_addr,
            error = %error,
            suggestion = error.suggestion(),
            "Failed to bind to address"
        );
        error
    })?;

    tracing::info!(
        target: TRACING_TARGET_SERVER_STARTUP,
        addr = %server_addr,
        "Server is ready and listening for connections"
    );

    if server_config.binds_to_all_interfaces() {
        tracing::warn!(
            target: TRACING_TARGET_SERVER_STARTUP,
            "Server is bound to all interfaces. Ensure firewall rules are properly configured."
        );
    }

    let start_time = Instant::now();
    let result = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal(cancel.clone()))
    .await;

    cancel.cancel();
    let uptime_secs = start_time.elapsed().as_secs();

    match result {
        Ok(()) => {
            tracing::info!(
                target: TRACING_TARGET_SERVER_SHUTDOWN,
                uptime_secs,
                "Server shut down gracefully"
            );
            Ok(())
        }
        Err(err) => {
            let error = ServerError::Runtime(err);
            tracing::error!(
                target: TRACING_TARGET_SERVER_SHUTDOWN,
                error = %error,
                error_code = error.error_code(),
                suggestion = error.suggestion(),
                uptime_secs,
                "Server encountered an error"
            );
            Err(error)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::net::{IpAddr, Ipv4Addr};
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn rejects_invalid_config_before_binding() {
        let config = ServerConfig {
            port: 80,
            ..ServerConfig::default()
        };

        let result = serve_http(Router::new(), &config, CancellationToken::new()).await;
        assert!(matches!(result, Err(ServerError::InvalidConfig(_))));
    }

    #[tokio::test]
    async fn stops_when_cancelled() -> anyhow::Result<()> {
        let config = ServerConfig {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 38_471,
            ..ServerConfig::default()
        };
        let cancel = CancellationToken::new();
        let server = tokio::spawn({
            let cancel = cancel.clone();
            async move { serve_http(Router::new(), &config, cancel).await }
        });

        cancel.cancel();
        tokio::time::timeout(Duration::from_secs(5), server).await???;
        Ok(())
    }
}
