use crate::{
    exposition::Exposition,
    server::{
        create_router,
        AppState,
    },
};
use color_eyre::Result;
use elasticsearch_exporter_collector::{
    EsClient,
    Orchestrator,
};
use elasticsearch_exporter_config::{
    Args,
    Config,
};
use elasticsearch_exporter_httpclient::{
    decorate,
    decorator::{
        base_url,
        recover,
        Endpoint,
    },
    ReqwestClient,
};
use eyre::{
    eyre,
    WrapErr,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use url::Url;

pub struct App {
    config: Config,
}

impl App {
    pub fn new(args: Args) -> Result<Self> {
        let config = Config::new(args).wrap_err("invalid configuration")?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Wires the dispatch pipeline, the units and the exposition, then serves scrapes until
    /// interrupted.
    pub async fn run(self) -> Result<()> {
        let (orchestrator, exposition) = self.build()?;

        let state = AppState {
            orchestrator: Arc::new(orchestrator),
            exposition: Arc::new(exposition),
            telemetry_path: self.config.telemetry_path.as_str().into(),
        };
        let router = create_router(state);

        let listener = TcpListener::bind(self.config.listen_address)
            .await
            .wrap_err_with(|| format!("cannot listen on {}", self.config.listen_address))?;
        info!(
            address = %self.config.listen_address,
            path = %self.config.telemetry_path,
            uris = ?self.config.es_uris,
            "serving metrics"
        );

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("stopped");
        Ok(())
    }

    fn build(&self) -> Result<(Orchestrator, Exposition)> {
        let first = self
            .config
            .es_uris
            .first()
            .ok_or_else(|| eyre!("no Elasticsearch URI configured"))?;
        let base: Url = Endpoint::parse(first)?.to_string().parse()?;

        let transport = ReqwestClient::from_config(&self.config)?;
        // The last decorator is outermost, so a panic anywhere below is contained.
        let client = decorate(Arc::new(transport), [base_url(&self.config.es_uris)?, recover()]);

        let api = EsClient::new(client, base);
        let orchestrator = Orchestrator::new(Arc::new(api), self.config.es_all_nodes);
        let exposition = Exposition::new(orchestrator.describe())?;
        debug!(metrics = exposition.descriptors().len(), "registered metric descriptors");

        Ok((orchestrator, exposition))
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = %err, "cannot listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                error!(error = %err, "cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received SIGINT, shutting down"),
        _ = terminate => info!("received SIGTERM, shutting down"),
    }
}
