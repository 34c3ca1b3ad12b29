use crate::core::series::{RawObservation, SeriesFetcher};
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, instrument, warn};

/// Fetches series from the BLS public timeseries API (v1, no key).
pub struct BlsProvider {
    base_url: String,
    client: reqwest::Client,
}

impl BlsProvider {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("laborstats/1.0")
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn series_url(&self, series_id: &str, start_year: i32, end_year: i32) -> String {
        format!(
            "{}/publicAPI/v1/timeseries/data/{}?startyear={}&endyear={}",
            self.base_url, series_id, start_year, end_year
        )
    }

    async fn try_fetch(
        &self,
        series_id: &str,
        start_year: i32,
        end_year: i32,
    ) -> Result<Vec<RawObservation>> {
        let url = self.series_url(series_id, start_year, end_year);
        debug!("Requesting series data from {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("Request failed for series: {series_id}"))?;

        let status = response.status();
        let response_text = response
            .text()
            .await
            .with_context(|| format!("Failed to get response text for series: {series_id}"))?;

        if status != StatusCode::OK {
            return Err(anyhow!(
                "Error: {} for series: {}. Response: '{}'",
                status.as_u16(),
                series_id,
                response_text
            ));
        }

        let bls_response: BlsResponse = serde_json::from_str(&response_text).with_context(|| {
            format!("Error in data format for series: {series_id}. Response: '{response_text}'")
        })?;

        if let Some(status) = &bls_response.status {
            debug!(status = %status, messages = ?bls_response.message, "BLS request status");
        }

        bls_response
            .results
            .series
            .into_iter()
            .next()
            .map(|series| series.data)
            .ok_or_else(|| {
                anyhow!(
                    "Error in data format for series: {series_id}. Response: '{response_text}'"
                )
            })
    }
}

#[derive(Debug, Deserialize)]
struct BlsResponse {
    status: Option<String>,
    #[serde(default)]
    message: Vec<String>,
    #[serde(rename = "Results")]
    results: BlsResults,
}

#[derive(Debug, Deserialize)]
struct BlsResults {
    series: Vec<BlsSeries>,
}

#[derive(Debug, Deserialize)]
struct BlsSeries {
    data: Vec<RawObservation>,
}

#[async_trait]
impl SeriesFetcher for BlsProvider {
    #[instrument(name = "BlsSeriesFetch", skip(self), fields(series_id = %series_id))]
    async fn fetch(&self, series_id: &str, start_year: i32, end_year: i32) -> Vec<RawObservation> {
        match self.try_fetch(series_id, start_year, end_year).await {
            Ok(observations) => {
                debug!(count = observations.len(), "Fetched observations");
                observations
            }
            Err(e) => {
                warn!(error = %format!("{e:#}"), "Failed to fetch series");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::normalize::normalize;
    use chrono::NaiveDate;
    use std::io::Write;
    use std::sync::{Arc, Mutex};
    use tracing::instrument::WithSubscriber;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Collects formatted log lines in memory.
    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl CapturedLogs {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    const SERIES_ID: &str = "LNS14000000";
    const MOCK_JSON: &str = r#"{
        "status": "REQUEST_SUCCEEDED",
        "responseTime": 42,
        "message": [],
        "Results": {
            "series": [
                {
                    "seriesID": "LNS14000000",
                    "data": [
                        {"year": "2023", "period": "M02", "periodName": "February", "latest": "true", "value": "3.6", "footnotes": [{}]},
                        {"year": "2023", "period": "M01", "periodName": "January", "value": "3.4", "footnotes": [{}]}
                    ]
                }
            ]
        }
    }"#;

    // Helper function to create a mock server for the BLS provider
    async fn create_bls_mock_server(
        series_id: &str,
        mock_response: &str,
        status_code: u16,
    ) -> MockServer {
        let mock_server = MockServer::start().await;
        let expected_path = format!("/publicAPI/v1/timeseries/data/{series_id}");

        Mock::given(method("GET"))
            .and(path(&expected_path))
            .and(query_param("startyear", "2022"))
            .and(query_param("endyear", "2023"))
            .respond_with(ResponseTemplate::new(status_code).set_body_string(mock_response))
            .mount(&mock_server)
            .await;
        mock_server
    }

    #[tokio::test]
    async fn test_successful_series_fetch() {
        let mock_server = create_bls_mock_server(SERIES_ID, MOCK_JSON, 200).await;
        let provider = BlsProvider::new(&mock_server.uri()).unwrap();

        let observations = provider.fetch(SERIES_ID, 2022, 2023).await;

        assert_eq!(
            observations,
            vec![
                RawObservation::new(2023, "M02", "3.6"),
                RawObservation::new(2023, "M01", "3.4"),
            ]
        );
    }

    #[tokio::test]
    async fn test_trailing_slash_in_base_url() {
        let mock_server = create_bls_mock_server(SERIES_ID, MOCK_JSON, 200).await;
        let provider = BlsProvider::new(&format!("{}/", mock_server.uri())).unwrap();

        assert_eq!(provider.fetch(SERIES_ID, 2022, 2023).await.len(), 2);
    }

    #[tokio::test]
    async fn test_not_found_yields_no_observations() {
        let mock_server = create_bls_mock_server(SERIES_ID, "Not Found", 404).await;
        let provider = BlsProvider::new(&mock_server.uri()).unwrap();

        assert!(provider.fetch(SERIES_ID, 2022, 2023).await.is_empty());

        let err = provider
            .try_fetch(SERIES_ID, 2022, 2023)
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            format!("Error: 404 for series: {SERIES_ID}. Response: 'Not Found'")
        );
    }

    #[tokio::test]
    async fn test_missing_results_yields_no_observations() {
        let mock_response = r#"{"status": "REQUEST_NOT_PROCESSED", "message": ["Daily threshold reached"]}"#;
        let mock_server = create_bls_mock_server(SERIES_ID, mock_response, 200).await;
        let provider = BlsProvider::new(&mock_server.uri()).unwrap();

        assert!(provider.fetch(SERIES_ID, 2022, 2023).await.is_empty());

        let err = provider
            .try_fetch(SERIES_ID, 2022, 2023)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Error in data format"));
        assert!(err.to_string().contains("Daily threshold reached"));
    }

    #[tokio::test]
    async fn test_empty_series_list_yields_no_observations() {
        let mock_response = r#"{"status": "REQUEST_SUCCEEDED", "Results": {"series": []}}"#;
        let mock_server = create_bls_mock_server(SERIES_ID, mock_response, 200).await;
        let provider = BlsProvider::new(&mock_server.uri()).unwrap();

        assert!(provider.fetch(SERIES_ID, 2022, 2023).await.is_empty());
    }

    #[tokio::test]
    async fn test_non_json_body_yields_no_observations() {
        let mock_server = create_bls_mock_server(SERIES_ID, "<html>oops</html>", 200).await;
        let provider = BlsProvider::new(&mock_server.uri()).unwrap();

        assert!(provider.fetch(SERIES_ID, 2022, 2023).await.is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_host_yields_no_observations() {
        // Nothing listens on port 9 (discard) in the test environment
        let provider = BlsProvider::new("http://127.0.0.1:9").unwrap();

        assert!(provider.fetch(SERIES_ID, 2022, 2023).await.is_empty());
    }

    #[tokio::test]
    async fn test_null_value_keeps_row_as_missing() {
        let mock_response = r#"{
            "status": "REQUEST_SUCCEEDED",
            "Results": {
                "series": [
                    {
                        "seriesID": "LNS14000000",
                        "data": [
                            {"year": "2023", "period": "M02", "value": "3.6"},
                            {"year": "2023", "period": "M01", "value": null}
                        ]
                    }
                ]
            }
        }"#;
        let mock_server = create_bls_mock_server(SERIES_ID, mock_response, 200).await;
        let provider = BlsProvider::new(&mock_server.uri()).unwrap();

        let observations = provider.fetch(SERIES_ID, 2022, 2023).await;
        assert_eq!(observations.len(), 2);

        let table = normalize(&observations);
        let jan = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        let feb = NaiveDate::from_ymd_opt(2023, 2, 1).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(&feb), Some(Some(3.6)));
        assert_eq!(table.get(&jan), Some(None));
    }

    #[tokio::test]
    async fn test_failed_fetch_logs_status_and_body() {
        let mock_server = create_bls_mock_server(SERIES_ID, "Series not found", 404).await;
        let provider = BlsProvider::new(&mock_server.uri()).unwrap();

        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::WARN)
            .finish();

        let observations = provider
            .fetch(SERIES_ID, 2022, 2023)
            .with_subscriber(subscriber)
            .await;
        assert!(observations.is_empty());

        let output = logs.contents();
        assert!(output.contains("WARN"), "{output}");
        assert!(output.contains("Failed to fetch series"), "{output}");
        assert!(output.contains("404"), "{output}");
        assert!(output.contains("Series not found"), "{output}");
        assert!(output.contains(SERIES_ID), "{output}");
    }
}
