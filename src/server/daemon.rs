use axum::http::HeaderValue;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::routes::{build_router, AppState};
use super::ServerConfig;
use crate::entity::EntityKind;
use crate::store::Datastore;

pub struct Daemon {
  config: ServerConfig,
  store: Datastore,
  shutdown_tx: broadcast::Sender<()>,
}

impl Daemon {
  pub fn new(config: ServerConfig) -> Self {
    let (shutdown_tx, _) = broadcast::channel(1);
    let store = Datastore::new(&config.datastore.path);
    Self {
      config,
      store,
      shutdown_tx,
    }
  }

  /// Trigger graceful shutdown of the HTTP server
  pub fn shutdown(&self) {
    tracing::info!("Initiating graceful shutdown...");
    let _ = self.shutdown_tx.send(());
  }

  fn cors_layer(&self) -> CorsLayer {
    let origins = &self.config.server.cors_origins;
    let allow_origin = if origins.iter().any(|o| o == "*") {
      AllowOrigin::from(Any)
    } else {
      AllowOrigin::list(
        origins
          .iter()
          .filter_map(|o| HeaderValue::from_str(o).ok()),
      )
    };
    CorsLayer::new()
      .allow_origin(allow_origin)
      .allow_methods(Any)
      .allow_headers(Any)
  }

  pub async fn run(&self) -> Result<(), anyhow::Error> {
    let mut shutdown_rx = self.shutdown_tx.subscribe();

    if self.config.datastore.create_if_missing {
      self.store.init(EntityKind::db_keys()).await?;
    }
    tracing::info!("Using datastore {}", self.store.path().display());

    let app = build_router(AppState::new(self.store.clone()))
      .layer(TraceLayer::new_for_http())
      .layer(self.cors_layer());

    let addr = self.config.address();
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("Listening on {}", addr);

    axum::serve(listener, app)
      .with_graceful_shutdown(async move {
        let _ = shutdown_rx.recv().await;
      })
      .await?;

    tracing::info!("Server stopped");
    Ok(())
  }
}
