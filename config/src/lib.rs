#[macro_use]
extern crate tracing;

mod args;
mod duration;

pub use args::Args;
use serde::{
    Deserialize,
    Serialize,
};
use std::{
    net::SocketAddr,
    path::PathBuf,
    time::Duration,
};
use url::Url;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Address the exporter listens on for scrapes.
    pub listen_address: SocketAddr,
    /// Path under which the metrics are exposed.
    pub telemetry_path: String,
    /// Elasticsearch nodes that are queried concurrently. The first healthy answer wins.
    pub es_uris: Vec<String>,
    #[serde(with = "duration")]
    pub es_timeout: Duration,
    /// Export node statistics for every node instead of only the one answering.
    #[serde(default)]
    pub es_all_nodes: bool,
    /// PEM file with additional trusted CAs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub es_ca: Option<PathBuf>,
    /// PEM certificate presented to Elasticsearch, paired with `es_client_private_key`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub es_client_cert: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub es_client_private_key: Option<PathBuf>,
}

const DEFAULT_CONFIG: &str = include_str!("default-config.yaml");

impl Default for Config {
    fn default() -> Self {
        serde_yml::from_str(DEFAULT_CONFIG).expect("Failed to parse default config")
    }
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Load(#[from] config::ConfigError),
    #[error("at least one Elasticsearch URI is required")]
    NoUris,
    #[error("invalid Elasticsearch URI {uri:?}: {reason}")]
    InvalidUri { uri: String, reason: String },
    #[error("telemetry path {0:?} must start with '/' and must not be the root path")]
    InvalidTelemetryPath(String),
    #[error("a client certificate and its private key must be given together")]
    IncompleteClientIdentity,
}

impl Config {
    /// Layers the embedded defaults, the optional `--config` file and the command line, in that
    /// order, and validates the result.
    pub fn new(args: Args) -> Result<Self, Error> {
        let mut builder =
            config::Config::builder().add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Yaml));

        if let Some(path) = &args.config {
            debug!(?path, "reading configuration file");
            builder = builder.add_source(config::File::from(path.as_path()).format(config::FileFormat::Yaml));
        }

        builder = builder.add_source(args);

        let cfg: Self = builder.build()?.try_deserialize()?;
        cfg.validate()?;

        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.es_uris.is_empty() {
            return Err(Error::NoUris);
        }
        for uri in &self.es_uris {
            check_uri(uri)?;
        }

        if !self.telemetry_path.starts_with('/') || self.telemetry_path == "/" {
            return Err(Error::InvalidTelemetryPath(self.telemetry_path.clone()));
        }

        if self.es_client_cert.is_some() != self.es_client_private_key.is_some() {
            return Err(Error::IncompleteClientIdentity);
        }

        Ok(())
    }
}

fn check_uri(uri: &str) -> Result<(), Error> {
    let invalid = |reason: &str| Error::InvalidUri {
        uri: uri.to_string(),
        reason: reason.to_string(),
    };

    let parsed = if uri.contains("://") {
        Url::parse(uri)
    } else {
        Url::parse(&format!("http://{uri}"))
    }
    .map_err(|e| invalid(&e.to_string()))?;

    match parsed.scheme() {
        "http" | "https" if parsed.host_str().is_some() => Ok(()),
        "http" | "https" => Err(invalid("missing host")),
        _ => Err(invalid("only http and https are supported")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use pretty_assertions::assert_eq;
    use std::io::Write as _;

    fn args(argv: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("elasticsearch-exporter").chain(argv.iter().copied())).unwrap()
    }

    #[test]
    fn embedded_defaults() {
        let config = Config::default();

        assert_eq!(config.listen_address, "0.0.0.0:9108".parse().unwrap());
        assert_eq!(config.telemetry_path, "/metrics");
        assert_eq!(config.es_uris, vec!["http://localhost:9200".to_string()]);
        assert_eq!(config.es_timeout, Duration::from_secs(5));
        assert!(!config.es_all_nodes);
        assert_eq!(config.es_ca, None);
        config.validate().unwrap();
    }

    #[test]
    fn no_flags_yields_the_defaults() {
        assert_eq!(Config::new(args(&[])).unwrap(), Config::default());
    }

    #[test]
    fn flags_override_defaults() {
        let config = Config::new(args(&[
            "--web.listen-address",
            "127.0.0.1:9200",
            "--web.telemetry-path",
            "/stats",
            "--es.uri",
            "http://es-1:9200",
            "--es.uri",
            "https://es-2:9243",
            "--es.timeout",
            "1m 30s",
            "--es.all",
        ]))
        .unwrap();

        assert_eq!(config.listen_address, "127.0.0.1:9200".parse().unwrap());
        assert_eq!(config.telemetry_path, "/stats");
        assert_eq!(
            config.es_uris,
            vec!["http://es-1:9200".to_string(), "https://es-2:9243".to_string()]
        );
        assert_eq!(config.es_timeout, Duration::from_secs(90));
        assert!(config.es_all_nodes);
    }

    #[test]
    fn file_sits_between_defaults_and_flags() {
        let path = std::env::temp_dir().join(format!("es-exporter-config-{}.yaml", std::process::id()));
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "telemetry_path: /from-file").unwrap();
        writeln!(file, "es_timeout: 250ms").unwrap();
        writeln!(file, "es_uris: [\"http://file-node:9200\"]").unwrap();
        drop(file);

        let config = Config::new(args(&[
            "--config",
            path.to_str().unwrap(),
            "--es.uri",
            "http://flag-node:9200",
        ]))
        .unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(config.telemetry_path, "/from-file");
        assert_eq!(config.es_timeout, Duration::from_millis(250));
        assert_eq!(config.es_uris, vec!["http://flag-node:9200".to_string()]);
        assert_eq!(config.listen_address, Config::default().listen_address);
    }

    #[test]
    fn missing_config_file_is_an_error() {
        let err = Config::new(args(&["--config", "/nonexistent/exporter.yaml"])).unwrap_err();

        assert!(matches!(err, Error::Load(_)));
    }

    #[test]
    fn validation() {
        let valid = Config::default();

        let no_uris = Config {
            es_uris: Vec::new(),
            ..valid.clone()
        };
        assert!(matches!(no_uris.validate(), Err(Error::NoUris)));

        let bare_host_port = Config {
            es_uris: vec!["es-1:9200".to_string()],
            ..valid.clone()
        };
        bare_host_port.validate().unwrap();

        let bad_scheme = Config {
            es_uris: vec!["ftp://es-1".to_string()],
            ..valid.clone()
        };
        assert!(matches!(bad_scheme.validate(), Err(Error::InvalidUri { .. })));

        for path in ["/", "metrics", ""] {
            let config = Config {
                telemetry_path: path.to_string(),
                ..valid.clone()
            };
            assert!(matches!(config.validate(), Err(Error::InvalidTelemetryPath(_))), "{path:?}");
        }

        let half_identity = Config {
            es_client_cert: Some("client.pem".into()),
            ..valid
        };
        assert!(matches!(half_identity.validate(), Err(Error::IncompleteClientIdentity)));
    }

    #[test]
    fn serializes_back_to_yaml() {
        let yaml = serde_yml::to_string(&Config::default()).unwrap();

        assert!(yaml.contains("5s"), "{yaml}");
        assert_eq!(serde_yml::from_str::<Config>(&yaml).unwrap(), Config::default());
    }
}
