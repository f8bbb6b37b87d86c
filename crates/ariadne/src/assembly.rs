//! Process-level assembly of the Ariadne components.

use std::io;
use std::sync::Arc;

use ariadne_client::{ContextClient, EgressPropagator};
use ariadne_config::{AriadneConfig, ConfigLoader, SinkKind, DEFAULT_ENV_PREFIX};
use ariadne_core::ContextStore;
use ariadne_middleware::{AccessLogMiddleware, IngressBinder, IngressOptions, PipelineBuilder};
use ariadne_telemetry::{init_diagnostics, metrics, LogSink, StructuredLogger};

use crate::error::AriadneResult;

/// Name of the optional configuration file read by [`Ariadne::from_env`].
pub const CONFIG_FILE: &str = "ariadne.toml";

/// The components one service needs, built from one configuration.
///
/// Every component shares the same [`ContextStore`], so a record bound by
/// the ingress stage is what the logger and the outbound client see.
///
/// # Example
///
/// ```
/// use ariadne::{Ariadne, AriadneConfig};
///
/// let mut config = AriadneConfig::development();
/// config.service.name = "orders".to_string();
/// config.logging.sink = ariadne::config::SinkKind::Discard;
///
/// let ariadne = Ariadne::from_config(config).unwrap();
/// assert_eq!(ariadne.logger().identity().name, "orders");
/// assert!(!ariadne.binder().options().require_access_token);
/// ```
#[derive(Debug, Clone)]
pub struct Ariadne {
    config: AriadneConfig,
    store: ContextStore,
    logger: Arc<StructuredLogger>,
    binder: IngressBinder,
    propagator: EgressPropagator,
}

impl Ariadne {
    /// Builds the components, writing log records to the configured sink.
    ///
    /// # Errors
    ///
    /// Returns [`AriadneError::Config`](crate::AriadneError::Config) if the
    /// configuration is invalid.
    pub fn from_config(config: AriadneConfig) -> AriadneResult<Self> {
        let sink: Option<LogSink> = match config.logging.sink {
            SinkKind::Stdout => Some(Box::new(io::stdout())),
            SinkKind::Stderr => Some(Box::new(io::stderr())),
            SinkKind::Discard => None,
        };
        Self::with_sink(config, sink)
    }

    /// Builds the components with an explicit sink, ignoring
    /// `logging.sink`.
    ///
    /// # Errors
    ///
    /// Returns [`AriadneError::Config`](crate::AriadneError::Config) if the
    /// configuration is invalid.
    pub fn with_sink(config: AriadneConfig, sink: Option<LogSink>) -> AriadneResult<Self> {
        config.validate()?;

        let store = ContextStore::new();
        let identity = config.identity();

        let logger = StructuredLogger::builder(identity.clone())
            .minimum_level(config.log_level()?)
            .sink_opt(sink)
            .context_source(store)
            .redact_access_token(config.logging.redact_access_token)
            .build();

        let binder = IngressBinder::with_options(
            store,
            IngressOptions {
                require_access_token: config.ingress.require_access_token,
                trust_incoming_ids: config.ingress.trust_incoming_ids,
            },
        );

        let mut propagator = EgressPropagator::new(store, identity);
        if let Some(user_agent) = &config.client.user_agent {
            propagator = propagator.with_user_agent(user_agent.clone());
        }

        metrics::describe_metrics();

        Ok(Self {
            config,
            store,
            logger: Arc::new(logger),
            binder,
            propagator,
        })
    }

    /// Loads configuration from `ariadne.toml` (if present), `.env` and
    /// `ARIADNE__*` variables, then builds the components.
    ///
    /// # Errors
    ///
    /// Returns [`AriadneError::Config`](crate::AriadneError::Config) if
    /// loading or validation fails.
    pub fn from_env() -> AriadneResult<Self> {
        let config = ConfigLoader::new()
            .with_optional_file(CONFIG_FILE)?
            .with_dotenv()
            .with_env_prefix(DEFAULT_ENV_PREFIX)
            .load()?;
        Self::from_config(config)
    }

    /// Installs the diagnostics subscriber described by the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`AriadneError::Telemetry`](crate::AriadneError::Telemetry)
    /// if a global subscriber is already installed.
    pub fn init_diagnostics(&self) -> AriadneResult<()> {
        init_diagnostics(&self.config.diagnostics_config())?;
        Ok(())
    }

    /// Returns the configuration the components were built from.
    #[must_use]
    pub fn config(&self) -> &AriadneConfig {
        &self.config
    }

    /// Returns the shared context store.
    #[must_use]
    pub fn store(&self) -> ContextStore {
        self.store
    }

    /// Returns the structured logger.
    #[must_use]
    pub fn logger(&self) -> &Arc<StructuredLogger> {
        &self.logger
    }

    /// Returns the ingress binder.
    #[must_use]
    pub fn binder(&self) -> &IngressBinder {
        &self.binder
    }

    /// Returns the egress propagator.
    #[must_use]
    pub fn propagator(&self) -> &EgressPropagator {
        &self.propagator
    }

    /// Creates an outbound client for the service at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`AriadneError::Client`](crate::AriadneError::Client) if the
    /// URL is invalid or the HTTP client cannot be built.
    pub fn client(&self, base_url: &str) -> AriadneResult<ContextClient> {
        let client = match self.config.client_timeout() {
            Some(timeout) => {
                ContextClient::with_timeout(self.propagator.clone(), base_url, timeout)?
            }
            None => ContextClient::new(self.propagator.clone(), base_url)?,
        };
        Ok(client)
    }

    /// Returns a pipeline builder with the ingress and access log stages
    /// already mounted; further stages run inside the bound chain.
    #[must_use]
    pub fn pipeline_builder(&self) -> PipelineBuilder {
        PipelineBuilder::new()
            .stage(self.binder)
            .stage(AccessLogMiddleware::new(Arc::clone(&self.logger)))
    }
}
