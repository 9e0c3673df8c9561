//! Server wiring and execution logic.

use std::{future::Future, sync::Arc, time::Duration};

use axum::{Router, routing::get};
use hottopics_shared::time::Clock;
use tokio::{net::TcpListener, sync::watch};
use tower_http::trace::TraceLayer;

use crate::{
    config::ServerConfig,
    domain::TrendSource,
    infrastructure::{
        message_pusher::WebSocketMessagePusher, repository::InMemoryChatroomRegistry,
    },
    usecase::{
        ConnectSessionUseCase, DisconnectSessionUseCase, GetRoomDetailUseCase, GetRoomsUseCase,
        HandleMessageUseCase, MonitorHealthUseCase, Notifier, ReconcileRoomsUseCase,
    },
};

use super::{
    background::{spawn_health_monitor, spawn_room_reconciler},
    handler::{get_room_detail, get_rooms, health_check, websocket_handler},
    signal::shutdown_signal,
    state::AppState,
};

/// WebSocket endpoint path
pub const CHAT_PATH: &str = "/hottopics/chat";

/// Hot Topics chat server
///
/// Owns the use cases behind the WebSocket/HTTP handlers and the two periodic
/// tasks (room reconciliation and liveness monitoring).
///
/// # Example
///
/// ```ignore
/// let server = Server::build(&config, Arc::new(StaticTrendSource::default()), Arc::new(SystemClock));
/// server.run(config.host.clone(), config.port).await?;
/// ```
pub struct Server {
    app_state: Arc<AppState>,
    /// ReconcileRoomsUseCase（トレンドに合わせたルーム更新のユースケース）
    reconcile_rooms_usecase: Arc<ReconcileRoomsUseCase>,
    /// MonitorHealthUseCase（死活監視のユースケース）
    monitor_health_usecase: Arc<MonitorHealthUseCase>,
    reconcile_interval: Duration,
    health_check_interval: Duration,
}

impl Server {
    /// Wire the in-memory registry, the WebSocket pusher and every use case
    ///
    /// # Arguments
    ///
    /// * `config` - Validated server configuration
    /// * `trend_source` - Where trending topics are fetched from
    /// * `clock` - Time source for activity and liveness bookkeeping
    pub fn build(
        config: &ServerConfig,
        trend_source: Arc<dyn TrendSource>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        // 1. Registry / MessagePusher
        let registry = Arc::new(InMemoryChatroomRegistry::new());
        let message_pusher = Arc::new(WebSocketMessagePusher::new());
        let notifier = Arc::new(Notifier::new(registry.clone(), message_pusher.clone()));

        // 2. UseCases
        let connect_session_usecase = Arc::new(ConnectSessionUseCase::new(
            registry.clone(),
            message_pusher.clone(),
            clock.clone(),
        ));
        let handle_message_usecase = Arc::new(HandleMessageUseCase::new(
            registry.clone(),
            notifier.clone(),
            clock.clone(),
        ));
        let disconnect_session_usecase = Arc::new(DisconnectSessionUseCase::new(
            registry.clone(),
            message_pusher,
            notifier.clone(),
        ));
        let reconcile_rooms_usecase = Arc::new(ReconcileRoomsUseCase::new(
            registry.clone(),
            trend_source,
            notifier.clone(),
            clock.clone(),
            config.trend_location(),
        ));
        let monitor_health_usecase = Arc::new(MonitorHealthUseCase::new(
            registry.clone(),
            notifier,
            disconnect_session_usecase.clone(),
            clock,
            config.liveness_policy(),
        ));

        let app_state = Arc::new(AppState {
            connect_session_usecase,
            handle_message_usecase,
            disconnect_session_usecase,
            get_rooms_usecase: Arc::new(GetRoomsUseCase::new(registry.clone())),
            get_room_detail_usecase: Arc::new(GetRoomDetailUseCase::new(registry)),
        });

        Self {
            app_state,
            reconcile_rooms_usecase,
            monitor_health_usecase,
            reconcile_interval: config.reconcile_interval,
            health_check_interval: config.health_check_interval,
        }
    }

    pub fn router(&self) -> Router {
        Router::new()
            // WebSocket エンドポイント
            .route(CHAT_PATH, get(websocket_handler))
            // HTTP エンドポイント
            .route("/api/health", get(health_check))
            .route("/api/rooms", get(get_rooms))
            .route("/api/rooms/{name}", get(get_room_detail))
            .layer(TraceLayer::new_for_http())
            .with_state(self.app_state.clone())
    }

    /// Run the chat server until Ctrl+C or SIGTERM
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the specified address or
    /// if there's an error during server execution.
    pub async fn run(self, host: String, port: u16) -> Result<(), Box<dyn std::error::Error>> {
        let bind_addr = format!("{}:{}", host, port);
        let listener = TcpListener::bind(&bind_addr).await?;

        tracing::info!("Hot Topics server listening on {}", listener.local_addr()?);
        tracing::info!("Connect to: ws://{}{}", bind_addr, CHAT_PATH);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        self.serve(listener, shutdown_signal()).await?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }

    /// Serve on an already bound listener until `shutdown` resolves
    ///
    /// The periodic tasks start with the listener and are stopped once the
    /// HTTP server has drained.
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let app = self.router();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let reconciler = spawn_room_reconciler(
            self.reconcile_rooms_usecase,
            self.reconcile_interval,
            shutdown_rx.clone(),
        );
        let monitor = spawn_health_monitor(
            self.monitor_health_usecase,
            self.health_check_interval,
            shutdown_rx,
        );

        let result = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await;

        // 周期タスクを止める
        let _ = shutdown_tx.send(true);
        for handle in [reconciler, monitor] {
            if let Err(e) = handle.await {
                tracing::error!("Background task failed: {}", e);
            }
        }

        result
    }
}
