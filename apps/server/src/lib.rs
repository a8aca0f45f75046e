//! # Gantry Server
//!
//! Bootstraps the HTTP server: awaits the application root module, resolves the module
//! tree into routers and feature slices, and serves them next to the system routes.
//!
//! ## Example
//! ```no_run
//! use gantry::AppModule;
//! use gantry::domain::config::ApiConfig;
//!
//! # async fn example() -> anyhow::Result<()> {
//! gantry_server::bootstrap(ApiConfig::default(), AppModule::for_root()).await
//! # }
//! ```

mod router;

use anyhow::{Context, Result};
use axum::Router;
use axum_server::Handle;
use gantry::APP_MODULE;
use gantry::domain::config::ApiConfig;
use gantry::kernel::module::{ModuleDescriptor, resolve_modules};
use gantry::kernel::server::ApiState;
use std::error::Error as StdError;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::signal;
use tracing::{error, info, warn};

const SHUTDOWN_GRACE: Duration = Duration::from_secs(30);

/// Resolves `root` and serves the application until a shutdown signal arrives.
///
/// An error of the root future is returned as is, before anything is bound.
///
/// # Errors
/// Root module, module initialization, TLS and listener failures.
pub async fn bootstrap<F, E>(cfg: ApiConfig, root: F) -> Result<()>
where
    F: Future<Output = Result<ModuleDescriptor, E>>,
    E: StdError + Send + Sync + 'static,
{
    Server::from_root(cfg, root).await?.run().await
}

/// A fluent builder for configuring and initializing the [`Server`].
#[must_use = "builders do nothing unless you call .build()"]
#[derive(Debug, Default)]
pub struct ServerBuilder {
    cfg: ApiConfig,
    module: Option<ModuleDescriptor>,
}

impl ServerBuilder {
    /// Set up the server's configuration.
    pub fn config(mut self, cfg: ApiConfig) -> Self {
        self.cfg = cfg;
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.cfg.server.port = port;
        self
    }

    /// Root module descriptor; an empty root is used when none is given.
    pub fn module(mut self, module: ModuleDescriptor) -> Self {
        self.module = Some(module);
        self
    }

    fn validate_ssl_config(&self) -> Result<()> {
        if let Some(ssl) = &self.cfg.server.ssl {
            if !ssl.cert.exists() {
                anyhow::bail!("SSL certificate not found at: {}", ssl.cert.display());
            }
            if !ssl.key.exists() {
                anyhow::bail!("SSL key not found at: {}", ssl.key.display());
            }

            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                let metadata = ssl.key.metadata()?;
                if metadata.permissions().mode() & 0o077 != 0 {
                    warn!(
                        "SECURITY: SSL Private Key {} has insecure permissions (should be 600)",
                        ssl.key.display()
                    );
                }
            }
        }
        Ok(())
    }

    /// Consumes the builder and initializes the server.
    ///
    /// # Process
    /// 1. Validates the SSL configuration
    /// 2. Resolves the module tree, imports first
    /// 3. Constructs application state from the resolved modules and slices
    /// 4. Builds the Axum router: system routes, API reference, module routers
    ///
    /// # Errors
    /// Returns an error if:
    /// * SSL certificate/key files are missing
    /// * A module provider fails (e.g. no adapter for `database.url`)
    pub async fn build(self) -> Result<Server> {
        self.validate_ssl_config()?;

        let address = SocketAddr::new(self.cfg.server.address, self.cfg.server.port);
        info!(address = %address, "Initializing server");

        let root = self.module.unwrap_or_else(|| ModuleDescriptor::new(APP_MODULE));
        let resolved =
            resolve_modules(&root, &self.cfg).await.context("Failed to resolve application modules")?;

        let state = ApiState::builder()
            .config(self.cfg)
            .modules(resolved.order)
            .register_slices(resolved.slices)
            .build()
            .context("Failed to finalize API state registry")?;

        let router = router::init(state.clone(), resolved.routers);
        Ok(Server { state, router, address })
    }
}

/// A fully initialized server instance ready to run.
#[must_use = "call .run().await to start the server"]
#[derive(Debug)]
pub struct Server {
    state: ApiState,
    router: Router,
    address: SocketAddr,
}

impl Server {
    /// Returns a new [`ServerBuilder`] to configure the server.
    pub fn builder() -> ServerBuilder {
        ServerBuilder::default()
    }

    /// Awaits `root` and builds a server from it.
    ///
    /// # Errors
    /// The root future's error, unchanged; otherwise see [`ServerBuilder::build`].
    pub async fn from_root<F, E>(cfg: ApiConfig, root: F) -> Result<Self>
    where
        F: Future<Output = Result<ModuleDescriptor, E>>,
        E: StdError + Send + Sync + 'static,
    {
        let module = root.await?;
        Self::builder().config(cfg).module(module).build().await
    }

    /// Starts the server and runs until Ctrl+C or SIGTERM.
    ///
    /// # Errors
    /// Returns an error if the server fails to bind to the configured address
    /// or if SSL/TLS setup fails.
    pub async fn run(self) -> Result<()> {
        let handle = Handle::<SocketAddr>::new();
        let shutdown_handle = handle.clone();

        tokio::spawn(async move {
            if let Err(e) = shutdown_signal().await {
                error!("Error while waiting for shutdown signal: {e}");
                return;
            }
            info!("Shutdown signal received, starting graceful shutdown...");
            shutdown_handle.graceful_shutdown(Some(SHUTDOWN_GRACE));
        });

        self.serve(handle).await
    }

    /// Serves until `handle` shuts the listener down.
    ///
    /// # Errors
    /// Bind and TLS failures.
    pub async fn serve(self, handle: Handle<SocketAddr>) -> Result<()> {
        let address = self.address;
        let app = self.router;

        info!(
            address = %address,
            ssl = self.state.config.server.ssl.is_some(),
            modules = ?self.state.modules,
            "Starting server"
        );

        if let Some(ssl_config) = &self.state.config.server.ssl {
            info!("Starting HTTPS server on https://{address}");

            let tls_config = axum_server::tls_rustls::RustlsConfig::from_pem_file(
                &ssl_config.cert,
                &ssl_config.key,
            )
            .await
            .context("Failed to load SSL/TLS certificates")?;

            axum_server::bind_rustls(address, tls_config)
                .handle(handle)
                .serve(app.into_make_service())
                .await
                .context("HTTPS server failed")?;
        } else {
            info!("Starting HTTP server on http://{address}");

            axum_server::bind(address)
                .handle(handle)
                .serve(app.into_make_service())
                .await
                .context("HTTP server failed")?;
        }

        info!("Server shutdown complete");
        Ok(())
    }

    /// Configured listen address.
    #[must_use]
    pub const fn address(&self) -> SocketAddr {
        self.address
    }

    #[must_use]
    pub const fn state(&self) -> &ApiState {
        &self.state
    }

    /// The assembled router, e.g. for in-process requests.
    #[must_use]
    pub fn router(&self) -> Router {
        self.router.clone()
    }
}

/// Listens for shutdown signals (Ctrl+C, SIGTERM).
async fn shutdown_signal() -> Result<()> {
    let ctrl_c = async { signal::ctrl_c().await.context("Failed to install Ctrl+C handler") };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .context("Failed to install SIGTERM handler")?
            .recv()
            .await;
        Ok::<_, anyhow::Error>(())
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<Result<()>>();

    tokio::select! {
        res = ctrl_c => {
            res.context("Ctrl+C signal received")?;
        },
        res = terminate => {
            res.context("SIGTERM signal received")?;
        },
    }

    Ok(())
}
