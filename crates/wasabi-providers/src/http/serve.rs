//! Background serving
//!
//! Binds a listener inside the start hook so a bind failure fails startup,
//! then detaches the accept loop onto its own task. Stop cancels the loop
//! and waits for in-flight requests to drain.

use axum::Router;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::instrument::WithSubscriber;
use tracing::{Dispatch, error, info};
use wasabi_domain::error::{Error, Result};
use wasabi_domain::error_ext::ErrorContext;
use wasabi_domain::ports::{ServiceState, StateCell};

struct Running {
    local_addr: SocketAddr,
    token: CancellationToken,
    handle: JoinHandle<()>,
}

/// An axum router served on a detached task
pub struct BackgroundServer {
    name: &'static str,
    addr: String,
    router: Router,
    dispatch: Dispatch,
    state: StateCell,
    running: Mutex<Option<Running>>,
}

impl BackgroundServer {
    pub fn new(name: &'static str, addr: String, router: Router, dispatch: Dispatch) -> Self {
        Self {
            name,
            addr,
            router,
            dispatch,
            state: StateCell::new(),
            running: Mutex::new(None),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Configured bind address
    pub fn addr(&self) -> &str {
        &self.addr
    }

    pub fn state(&self) -> ServiceState {
        self.state.get()
    }

    /// Address actually bound, once started
    pub async fn local_addr(&self) -> Option<SocketAddr> {
        self.running.lock().await.as_ref().map(|r| r.local_addr)
    }

    /// Bind and detach the accept loop
    pub async fn start(&self) -> Result<()> {
        let mut running = self.running.lock().await;
        if running.is_some() {
            return Ok(());
        }
        self.state.set(ServiceState::Starting);

        let bound = TcpListener::bind(&self.addr)
            .await
            .network_context(format!("{} server failed to bind {}", self.name, self.addr));
        let listener = match bound {
            Ok(listener) => listener,
            Err(e) => {
                self.state.set(ServiceState::Stopped);
                return Err(e);
            }
        };
        let local_addr = listener.local_addr()?;

        let token = CancellationToken::new();
        let shutdown = token.clone().cancelled_owned();
        let app = self
            .router
            .clone()
            .into_make_service_with_connect_info::<SocketAddr>();
        let name = self.name;

        let handle = tokio::spawn(
            async move {
                if let Err(e) = axum::serve(listener, app)
                    .with_graceful_shutdown(shutdown)
                    .await
                {
                    error!(server = name, error = %e, "server terminated unexpectedly");
                }
            }
            .with_subscriber(self.dispatch.clone()),
        );

        *running = Some(Running {
            local_addr,
            token,
            handle,
        });
        self.state.set(ServiceState::Running);

        let _guard = tracing::dispatcher::set_default(&self.dispatch);
        info!(server = name, addr = %local_addr, "server listening");
        Ok(())
    }

    /// Stop accepting and drain in-flight requests
    pub async fn stop(&self) -> Result<()> {
        let Some(running) = self.running.lock().await.take() else {
            return Ok(());
        };
        self.state.set(ServiceState::Stopping);
        running.token.cancel();

        let joined = running.handle.await;
        self.state.set(ServiceState::Stopped);

        let _guard = tracing::dispatcher::set_default(&self.dispatch);
        match joined {
            Ok(()) => {
                info!(server = self.name, "server stopped");
                Ok(())
            }
            Err(e) => Err(Error::shutdown(format!(
                "{} server task failed: {e}",
                self.name
            ))),
        }
    }
}

impl std::fmt::Debug for BackgroundServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackgroundServer")
            .field("name", &self.name)
            .field("addr", &self.addr)
            .field("state", &self.state.get())
            .finish_non_exhaustive()
    }
}
