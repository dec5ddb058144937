use clap::Parser;
use std::{
    net::SocketAddr,
    path::PathBuf,
    time::Duration,
};

/// Prometheus exporter for Elasticsearch cluster, node and index statistics.
#[derive(Parser, Debug, Clone, Default)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Optional YAML file layered between the built-in defaults and these flags.
    #[arg(long, value_name = "FILE", env = "ES_EXPORTER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Address to listen on for the web interface and telemetry, e.g. `:9108`.
    #[arg(long = "web.listen-address", value_name = "ADDR", value_parser = parse_listen_address, env = "ES_EXPORTER_LISTEN_ADDRESS")]
    pub listen_address: Option<SocketAddr>,

    /// Path under which to expose metrics.
    #[arg(long = "web.telemetry-path", value_name = "PATH", env = "ES_EXPORTER_TELEMETRY_PATH")]
    pub telemetry_path: Option<String>,

    /// HTTP API address of an Elasticsearch node. Repeat for every node to query.
    #[arg(long = "es.uri", value_name = "URI", value_delimiter = ',', env = "ES_EXPORTER_ES_URI")]
    pub es_uris: Vec<String>,

    /// Timeout for trying to get stats from Elasticsearch, e.g. `5s` or `1m 30s`.
    #[arg(long = "es.timeout", value_name = "DURATION", value_parser = humantime::parse_duration, env = "ES_EXPORTER_ES_TIMEOUT")]
    pub es_timeout: Option<Duration>,

    /// Export stats for all nodes in the cluster.
    #[arg(long = "es.all", action, env = "ES_EXPORTER_ES_ALL")]
    pub es_all_nodes: bool,

    /// PEM file that contains trusted CAs for the Elasticsearch connection.
    #[arg(long = "es.ca", value_name = "FILE", env = "ES_EXPORTER_ES_CA")]
    pub es_ca: Option<PathBuf>,

    /// PEM file that contains the certificate for client auth when connecting to Elasticsearch.
    #[arg(long = "es.client-cert", value_name = "FILE", env = "ES_EXPORTER_ES_CLIENT_CERT")]
    pub es_client_cert: Option<PathBuf>,

    /// PEM file that contains the private key matching `--es.client-cert`.
    #[arg(long = "es.client-private-key", value_name = "FILE", env = "ES_EXPORTER_ES_CLIENT_PRIVATE_KEY")]
    pub es_client_private_key: Option<PathBuf>,
}

/// Accepts `host:port` as well as a bare `:port`, which listens on every interface.
fn parse_listen_address(raw: &str) -> Result<SocketAddr, std::net::AddrParseError> {
    match raw.strip_prefix(':') {
        Some(port) => format!("0.0.0.0:{port}").parse(),
        None => raw.parse(),
    }
}

mod config_ext {
    use super::*;
    use config::{
        Map,
        Source,
        Value,
    };
    use std::collections::HashMap;

    impl Source for Args {
        fn clone_into_box(&self) -> Box<dyn Source + Send + Sync> {
            Box::new((*self).clone())
        }

        fn collect(&self) -> Result<Map<String, Value>, config::ConfigError> {
            let mut cache = HashMap::<String, Value>::new();
            if let Some(listen_address) = &self.listen_address {
                cache.insert("listen_address".to_string(), listen_address.to_string().into());
            }
            if let Some(telemetry_path) = &self.telemetry_path {
                cache.insert("telemetry_path".to_string(), telemetry_path.clone().into());
            }
            if !self.es_uris.is_empty() {
                cache.insert("es_uris".to_string(), self.es_uris.clone().into());
            }
            if let Some(es_timeout) = self.es_timeout {
                cache.insert(
                    "es_timeout".to_string(),
                    humantime::format_duration(es_timeout).to_string().into(),
                );
            }
            if self.es_all_nodes {
                cache.insert("es_all_nodes".to_string(), true.into());
            }
            for (key, path) in [
                ("es_ca", &self.es_ca),
                ("es_client_cert", &self.es_client_cert),
                ("es_client_private_key", &self.es_client_private_key),
            ] {
                if let Some(path) = path {
                    cache.insert(key.to_string(), path.display().to_string().into());
                }
            }
            Ok(cache)
        }
    }
}
