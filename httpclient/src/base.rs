use crate::{
    Error,
    HttpClient,
};
use elasticsearch_exporter_config::Config;
use futures::future::BoxFuture;
use reqwest::{
    Certificate,
    Identity,
    Request,
    Response,
};
use std::path::Path;

/// The innermost client: hands requests to a [`reqwest::Client`] unchanged.
#[derive(Debug, Clone, Default)]
pub struct ReqwestClient {
    client: reqwest::Client,
}

impl ReqwestClient {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Builds the client with the configured timeout and, when given, the trusted CA and the
    /// client identity for mutual TLS.
    pub fn from_config(config: &Config) -> Result<Self, Error> {
        let mut builder = reqwest::Client::builder().timeout(config.es_timeout);

        if let Some(ca) = &config.es_ca {
            debug!(?ca, "trusting additional CA");
            builder = builder.add_root_certificate(Certificate::from_pem(&read_pem(ca)?)?);
        }

        if let (Some(cert), Some(key)) = (&config.es_client_cert, &config.es_client_private_key) {
            debug!(?cert, ?key, "using client certificate");
            let mut pem = read_pem(cert)?;
            pem.push(b'\n');
            pem.extend(read_pem(key)?);
            builder = builder.identity(Identity::from_pem(&pem)?);
        }

        Ok(Self::new(builder.build()?))
    }
}

fn read_pem(path: &Path) -> Result<Vec<u8>, Error> {
    std::fs::read(path).map_err(|source| Error::TlsMaterial {
        path: path.to_path_buf(),
        source,
    })
}

impl HttpClient for ReqwestClient {
    fn execute(&self, request: Request) -> BoxFuture<'_, Result<Response, Error>> {
        let pending = self.client.execute(request);
        Box::pin(async move { Ok(pending.await?) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_ca_file_is_reported_with_its_path() {
        let config = Config {
            es_ca: Some("/nonexistent/ca.pem".into()),
            ..Config::default()
        };

        let err = ReqwestClient::from_config(&config).unwrap_err();

        assert!(matches!(err, Error::TlsMaterial { ref path, .. } if path == Path::new("/nonexistent/ca.pem")));
    }

    #[test]
    fn plain_config_builds() {
        ReqwestClient::from_config(&Config::default()).unwrap();
    }
}
