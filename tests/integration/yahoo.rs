//! Integration tests for the Yahoo market data provider against wiremock

use marketwatch::services::{MarketDataError, MarketDataProvider, YahooMarketDataProvider};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn provider(server: &MockServer) -> YahooMarketDataProvider {
    YahooMarketDataProvider::new(server.uri(), Duration::from_secs(2)).expect("build provider")
}

fn symbols(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

async fn mock_quotes(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/v7/finance/quote"))
        .and(query_param("symbols", "AAPL,MSFT,ZZZZ"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "quoteResponse": {
                "result": [
                    {
                        "symbol": "AAPL",
                        "regularMarketPrice": 103.0,
                        "regularMarketOpen": 100.5,
                        "regularMarketDayHigh": 103.5,
                        "regularMarketDayLow": 100.1,
                        "regularMarketVolume": 51234567,
                        "regularMarketPreviousClose": 100.0,
                        "regularMarketTime": 1709564400
                    },
                    {
                        "symbol": "MSFT",
                        "regularMarketPrice": 410.0,
                        "regularMarketPreviousClose": 405.0
                    },
                    {
                        "symbol": "ZZZZ"
                    }
                ],
                "error": null
            }
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn snapshots_are_fetched_in_one_request() {
    let server = MockServer::start().await;
    mock_quotes(&server).await;

    let quotes = provider(&server)
        .get_snapshots(&symbols(&["AAPL", "MSFT", "ZZZZ"]))
        .await
        .expect("quotes");

    assert_eq!(quotes.len(), 2);
    let aapl = &quotes["AAPL"];
    assert_eq!(aapl.price, 103.0);
    assert_eq!(aapl.previous_close, 100.0);
    assert_eq!(aapl.high, 103.5);
    assert_eq!(aapl.volume, 51_234_567.0);
    assert_eq!(aapl.timestamp.timestamp(), 1_709_564_400);

    let msft = &quotes["MSFT"];
    assert_eq!(msft.open, 410.0);
    assert_eq!(msft.volume, 0.0);

    let requests = server.received_requests().await.expect("wiremock requests");
    assert_eq!(requests.len(), 1);
}

#[tokio::test]
async fn empty_symbol_list_skips_the_network() {
    let server = MockServer::start().await;
    let quotes = provider(&server).get_snapshots(&[]).await.unwrap();
    assert!(quotes.is_empty());
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn server_errors_map_to_http() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v7/finance/quote"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = provider(&server)
        .get_snapshots(&symbols(&["AAPL"]))
        .await
        .unwrap_err();
    assert!(matches!(err, MarketDataError::Http { status: 503 }));
}

#[tokio::test]
async fn unexpected_body_is_a_format_change() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v7/finance/quote"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "quotes": [] })))
        .mount(&server)
        .await;

    let err = provider(&server)
        .get_snapshots(&symbols(&["AAPL"]))
        .await
        .unwrap_err();
    assert!(matches!(err, MarketDataError::ResponseFormatChanged(_)));
}

#[tokio::test]
async fn daily_history_skips_null_bars() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v8/finance/chart/AAPL"))
        .and(query_param("range", "300d"))
        .and(query_param("interval", "1d"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "chart": {
                "result": [{
                    "timestamp": [1709328600, 1709564400, 1709650800],
                    "indicators": {
                        "quote": [{
                            "close": [101.5, null, 103.0],
                            "volume": [1000, null, 1200]
                        }]
                    }
                }],
                "error": null
            }
        })))
        .mount(&server)
        .await;

    let bars = provider(&server).get_daily_history("AAPL", 300).await.expect("bars");
    assert_eq!(bars.len(), 2);
    assert_eq!(bars[0].close, 101.5);
    assert_eq!(bars[1].close, 103.0);
    assert_eq!(bars[1].volume, 1200.0);
    assert!(bars[0].timestamp < bars[1].timestamp);
}

#[tokio::test]
async fn unknown_symbol_history() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v8/finance/chart/NOPE"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "chart": {
                "result": null,
                "error": { "code": "Not Found", "description": "No data found, symbol may be delisted" }
            }
        })))
        .mount(&server)
        .await;

    let err = provider(&server).get_daily_history("NOPE", 30).await.unwrap_err();
    assert!(matches!(err, MarketDataError::SymbolNotFound { ref symbol } if symbol == "NOPE"));
}

#[tokio::test]
async fn chart_error_payload_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v8/finance/chart/AAPL"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "chart": {
                "result": null,
                "error": { "code": "Bad Request", "description": "Invalid range" }
            }
        })))
        .mount(&server)
        .await;

    let err = provider(&server).get_daily_history("AAPL", 0).await.unwrap_err();
    assert!(matches!(err, MarketDataError::ResponseFormatChanged(_)));
}

#[tokio::test]
async fn slow_responses_time_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v7/finance/quote"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .mount(&server)
        .await;

    let provider = YahooMarketDataProvider::new(server.uri(), Duration::from_millis(200)).unwrap();
    let err = provider.get_snapshots(&symbols(&["AAPL"])).await.unwrap_err();
    assert!(matches!(err, MarketDataError::Timeout { .. }));
}
