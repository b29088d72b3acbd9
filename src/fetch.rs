use log::{debug, info};
use reqwest::{Client, Url};

use crate::{error::FetchError, settings::SourceSettings};

/// Fetches the daily price history of one symbol as CSV text.
///
/// # Parameters
/// - `source`: provider base URL and connection timeout.
/// - `symbol`: percent-encoded into the dataset path.
/// - `start_date`, `end_date`: passed as `trim_start` / `trim_end`.
/// - `api_key`: passed as `auth_token`.
///
/// A fresh client is built for every call, so cookies set by the provider
/// live only as long as this request.
///
/// Errors never carry the request URL, whose query holds the API key.
pub async fn fetch_csv(
    source: &SourceSettings,
    symbol: &str,
    start_date: &str,
    end_date: &str,
    api_key: &str,
) -> Result<String, FetchError> {
    let client: Client = Client::builder()
        .connect_timeout(source.connect_timeout)
        .cookie_store(true)
        .build()
        .map_err(FetchError::Client)?;

    let url: Url = dataset_url(&source.base_url, symbol)?;
    debug!("Requesting {} from {} to {}", url, start_date, end_date);

    let response: reqwest::Response = client
        .get(url.clone())
        .query(&[
            ("auth_token", api_key),
            ("trim_start", start_date),
            ("trim_end", end_date),
        ])
        .send()
        .await
        .map_err(|e| FetchError::Transport(e.without_url()))?;

    if !response.status().is_success() {
        return Err(FetchError::Status {
            status: response.status(),
            url: url.to_string(),
        });
    }

    let response_text: String = response
        .text()
        .await
        .map_err(|e| FetchError::Body(e.without_url()))?;

    info!("Fetched {} bytes for {}", response_text.len(), symbol);

    Ok(response_text)
}

fn dataset_url(base_url: &str, symbol: &str) -> Result<Url, FetchError> {
    let invalid = || FetchError::InvalidBaseUrl(base_url.to_string());

    let mut url: Url = Url::parse(base_url).map_err(|_| invalid())?;
    url.path_segments_mut()
        .map_err(|_| invalid())?
        .pop_if_empty()
        .extend(["api", "v1", "datasets", "WIKI"])
        .push(&format!("{}.csv", symbol));

    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn source(base_url: String) -> SourceSettings {
        SourceSettings {
            base_url,
            connect_timeout: Duration::from_millis(2000),
        }
    }

    #[test]
    fn test_dataset_url() {
        assert_eq!(
            dataset_url("https://www.quandl.com", "AAPL").unwrap().as_str(),
            "https://www.quandl.com/api/v1/datasets/WIKI/AAPL.csv"
        );
        assert_eq!(
            dataset_url("http://127.0.0.1:8080/", "AAPL").unwrap().as_str(),
            "http://127.0.0.1:8080/api/v1/datasets/WIKI/AAPL.csv"
        );
    }

    #[test]
    fn test_dataset_url_encodes_symbol() {
        let url = dataset_url("https://www.quandl.com", "BRK#A/B").unwrap();

        assert_eq!(url.path(), "/api/v1/datasets/WIKI/BRK%23A%2FB.csv");
        assert_eq!(url.fragment(), None);
    }

    #[test]
    fn test_dataset_url_rejects_bad_base() {
        assert!(matches!(
            dataset_url("not a url", "AAPL"),
            Err(FetchError::InvalidBaseUrl(_))
        ));
    }

    #[tokio::test]
    async fn test_fetch_sends_path_and_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/datasets/WIKI/XYZ.csv"))
            .and(query_param("auth_token", "k"))
            .and(query_param("trim_start", "2020-01-01"))
            .and(query_param("trim_end", "2020-01-02"))
            .respond_with(ResponseTemplate::new(200).set_body_string("Date\n2020-01-02\n"))
            .expect(1)
            .mount(&server)
            .await;

        let body = fetch_csv(&source(server.uri()), "XYZ", "2020-01-01", "2020-01-02", "k")
            .await
            .unwrap();

        assert_eq!(body, "Date\n2020-01-02\n");
    }

    #[tokio::test]
    async fn test_fetch_rejects_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
            .mount(&server)
            .await;

        let err = fetch_csv(&source(server.uri()), "NOPE", "a", "b", "k")
            .await
            .unwrap_err();

        match err {
            FetchError::Status { status, .. } => assert_eq!(status.as_u16(), 404),
            other => panic!("expected status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_fetch_unreachable_host() {
        // Nothing listens on port 9 of the loopback address.
        let err = fetch_csv(&source("http://127.0.0.1:9".to_string()), "A", "s", "e", "k")
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::Transport(_)));
    }

    #[tokio::test]
    async fn test_fetch_error_hides_api_key() {
        let err = fetch_csv(
            &source("http://127.0.0.1:9".to_string()),
            "A",
            "s",
            "e",
            "SUPERSECRET",
        )
        .await
        .unwrap_err();

        let message = crate::error::JobError::new(crate::error::JobKind::Data, err).to_string();
        assert!(message.contains("request failed"));
        assert!(!message.contains("SUPERSECRET"));
        assert!(!message.contains("auth_token"));
    }

    #[tokio::test]
    async fn test_cookies_do_not_outlive_a_fetch() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/datasets/WIKI/XYZ.csv"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("set-cookie", "session=abc123; Path=/")
                    .set_body_string("Date\n"),
            )
            .expect(2)
            .mount(&server)
            .await;

        let source = source(server.uri());
        fetch_csv(&source, "XYZ", "s", "e", "k").await.unwrap();
        fetch_csv(&source, "XYZ", "s", "e", "k").await.unwrap();

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 2);
        assert!(requests.iter().all(|request| request.headers.get("cookie").is_none()));
    }
}
