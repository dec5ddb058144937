use crate::{
    error::AppError,
    exposition::{
        Exposition,
        CONTENT_TYPE,
    },
};
use axum::{
    extract::State,
    http::header,
    response::{
        Html,
        IntoResponse,
        Response,
    },
    routing::get,
    Router,
};
use elasticsearch_exporter_collector::Orchestrator;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
    pub exposition: Arc<Exposition>,
    pub telemetry_path: Arc<str>,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route(&state.telemetry_path, get(metrics))
        .route("/", get(index))
        .route("/healthz", get(healthz))
        .with_state(state)
}

/// One scrape runs exactly one collection cycle.
async fn metrics(State(state): State<AppState>) -> Result<Response, AppError> {
    let (body, report) = state.exposition.scrape(&state.orchestrator).await?;
    if !report.is_complete() {
        debug!(?report, "serving a partial scrape");
    }

    Ok(([(header::CONTENT_TYPE, CONTENT_TYPE)], body).into_response())
}

async fn index(State(state): State<AppState>) -> Html<String> {
    Html(format!(
        "<html>\n\
         <head><title>Elasticsearch Exporter</title></head>\n\
         <body>\n\
         <h1>Elasticsearch Exporter</h1>\n\
         <p><a href=\"{path}\">Metrics</a></p>\n\
         </body>\n\
         </html>\n",
        path = state.telemetry_path
    ))
}

async fn healthz() -> &'static str {
    "ok"
}

#[cfg(test)]
mod tests {
    use super::*;
    use elasticsearch_exporter_collector::EsClient;
    use elasticsearch_exporter_httpclient::{
        mock::MockClient,
        StatusCode,
    };
    use pretty_assertions::assert_eq;
    use std::net::SocketAddr;
    use tokio::net::TcpListener;

    async fn serve(mock: &MockClient, telemetry_path: &str) -> SocketAddr {
        let api = EsClient::new(Arc::new(mock.clone()), "http://localhost:9200".parse().unwrap());
        let orchestrator = Orchestrator::new(Arc::new(api), false);
        let exposition = Exposition::new(orchestrator.describe()).unwrap();
        let router = create_router(AppState {
            orchestrator: Arc::new(orchestrator),
            exposition: Arc::new(exposition),
            telemetry_path: telemetry_path.into(),
        });

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, router).await });
        address
    }

    #[tokio::test]
    async fn scrape_serves_the_text_format() {
        let mock = MockClient::new();
        mock.get("/_cluster/health?level=cluster")
            .will_return(StatusCode::OK, r#"{"cluster_name":"c1","status":"green"}"#);
        mock.get("/_cluster/health?level=indices")
            .will_return(StatusCode::OK, r#"{"cluster_name":"c1","status":"green"}"#);
        let address = serve(&mock, "/stats").await;

        let response = reqwest::get(format!("http://{address}/stats")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], CONTENT_TYPE);
        let body = response.text().await.unwrap();
        assert!(body.contains("elasticsearch_cluster_health_status{cluster=\"c1\"} 1\n"), "{body}");
        assert!(body.contains("elasticsearch_exporter_build_info"), "{body}");
    }

    #[tokio::test]
    async fn unreachable_cluster_serves_an_empty_scrape() {
        let address = serve(&MockClient::new(), "/metrics").await;

        let response = reqwest::get(format!("http://{address}/metrics")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.text().await.unwrap(), "");
    }

    #[tokio::test]
    async fn index_links_the_telemetry_path() {
        let address = serve(&MockClient::new(), "/metrics").await;

        let body = reqwest::get(format!("http://{address}/")).await.unwrap().text().await.unwrap();

        assert!(body.contains("<a href=\"/metrics\">"));
    }

    #[tokio::test]
    async fn liveness() {
        let address = serve(&MockClient::new(), "/metrics").await;

        let response = reqwest::get(format!("http://{address}/healthz")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.text().await.unwrap(), "ok");
    }
}
