//! Integration tests for WeatherFetcher using wiremock.

use std::time::{Duration, Instant};

use skycheck_core::{Credential, FetchError, WeatherFetcher, WeatherResult};
use serde_json::Number;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const WEATHER_PATH: &str = "/data/2.5/weather";

fn fetcher_for(server: &MockServer) -> WeatherFetcher {
    WeatherFetcher::new().with_endpoint(format!("{}{WEATHER_PATH}", server.uri()))
}

fn key() -> Credential {
    Credential::new("TEST_KEY")
}

fn delhi() -> serde_json::Value {
    serde_json::json!({
        "name": "Delhi",
        "main": { "temp": 25.3, "humidity": 40 },
        "weather": [{ "description": "clear sky" }]
    })
}

#[tokio::test]
async fn place_name_query_shape_and_roundtrip() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(WEATHER_PATH))
        .and(query_param("q", "Delhi"))
        .and(query_param("appid", "TEST_KEY"))
        .and(query_param("units", "metric"))
        .respond_with(ResponseTemplate::new(200).set_body_json(delhi()))
        .expect(1)
        .mount(&server)
        .await;

    let result = fetcher_for(&server).fetch("  Delhi ", &key(), None).await.unwrap();

    assert_eq!(
        result,
        WeatherResult {
            city: "Delhi".into(),
            temperature_c: Number::from_f64(25.3),
            humidity_pct: Some(Number::from(40)),
            description: Some("clear sky".into()),
        }
    );
}

#[tokio::test]
async fn postal_code_uses_zip_with_default_country() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(WEATHER_PATH))
        .and(query_param("zip", "110001,IN"))
        .and(query_param("appid", "TEST_KEY"))
        .and(query_param("units", "metric"))
        .respond_with(ResponseTemplate::new(200).set_body_json(delhi()))
        .expect(1)
        .mount(&server)
        .await;

    let result = fetcher_for(&server).fetch("110001", &key(), None).await.unwrap();
    assert_eq!(result.city, "Delhi");
}

#[tokio::test]
async fn postal_code_uses_configured_country() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(query_param("zip", "10001,US"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "name": "New York" })))
        .expect(1)
        .mount(&server)
        .await;

    let result = fetcher_for(&server)
        .with_country("us")
        .fetch("10001", &key(), None)
        .await
        .unwrap();
    assert_eq!(result.city, "New York");
}

#[tokio::test]
async fn blank_input_never_hits_network() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(delhi()))
        .expect(0)
        .mount(&server)
        .await;

    let fetcher = fetcher_for(&server);
    for input in ["", "   ", "\t\n"] {
        let err = fetcher.fetch(input, &key(), None).await.unwrap_err();
        assert!(matches!(err, FetchError::InvalidInput));
    }
}

#[tokio::test]
async fn status_401_is_unauthorized() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "cod": 401,
            "message": "Invalid API key."
        })))
        .mount(&server)
        .await;

    let err = fetcher_for(&server).fetch("Delhi", &key(), None).await.unwrap_err();
    assert!(matches!(err, FetchError::Unauthorized));
    assert_eq!(err.to_string(), "Unauthorized: check your API key.");
}

#[tokio::test]
async fn status_404_is_location_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "cod": "404",
            "message": "city not found"
        })))
        .mount(&server)
        .await;

    let err = fetcher_for(&server).fetch("Atlantis", &key(), None).await.unwrap_err();
    assert!(matches!(err, FetchError::LocationNotFound));
}

#[tokio::test]
async fn other_statuses_are_http_errors() {
    for code in [500u16, 429, 503, 400] {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(code).set_body_string("upstream trouble"))
            .mount(&server)
            .await;

        let err = fetcher_for(&server).fetch("Delhi", &key(), None).await.unwrap_err();
        assert!(matches!(err, FetchError::HttpError(c) if c == code), "got {err:?}");
        assert_eq!(err.status(), Some(code));
    }
}

#[tokio::test]
async fn slow_provider_times_out_as_network_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(delhi())
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let started = Instant::now();
    let err = fetcher_for(&server)
        .fetch("Delhi", &key(), Some(Duration::from_millis(200)))
        .await
        .unwrap_err();

    assert!(started.elapsed() < Duration::from_secs(3));
    match err {
        FetchError::NetworkError(e) => assert!(e.is_timeout()),
        other => panic!("expected NetworkError, got {other:?}"),
    }
}

#[tokio::test]
async fn connection_refused_is_network_error() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };

    let fetcher = WeatherFetcher::new().with_endpoint(format!("http://127.0.0.1:{port}{WEATHER_PATH}"));
    let err = fetcher
        .fetch("Delhi", &key(), Some(Duration::from_secs(2)))
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::NetworkError(_)));
    assert!(err.to_string().starts_with("Network error: "));
}

#[tokio::test]
async fn missing_main_still_succeeds() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "name": "Shimla",
            "weather": [{ "description": "light snow" }]
        })))
        .mount(&server)
        .await;

    let result = fetcher_for(&server).fetch("Shimla", &key(), None).await.unwrap();
    assert_eq!(result.city, "Shimla");
    assert_eq!(result.temperature_c, None);
    assert_eq!(result.humidity_pct, None);
    assert_eq!(result.description.as_deref(), Some("light snow"));
}

#[tokio::test]
async fn empty_weather_list_has_no_description() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "name": "Chennai",
            "main": { "temp": 31.0, "humidity": 70 },
            "weather": []
        })))
        .mount(&server)
        .await;

    let result = fetcher_for(&server).fetch("Chennai", &key(), None).await.unwrap();
    assert_eq!(result.temperature_c, Number::from_f64(31.0));
    assert_eq!(result.humidity_pct, Some(Number::from(70)));
    assert_eq!(result.description, None);
}

#[tokio::test]
async fn missing_name_falls_back_to_input() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "main": { "temp": 18.5 }
        })))
        .mount(&server)
        .await;

    let result = fetcher_for(&server).fetch(" 560001 ", &key(), None).await.unwrap();
    assert_eq!(result.city, "560001");
    assert_eq!(result.temperature_c, Number::from_f64(18.5));
}

#[tokio::test]
async fn non_json_success_body_is_malformed() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let err = fetcher_for(&server).fetch("Delhi", &key(), None).await.unwrap_err();
    assert!(matches!(err, FetchError::MalformedResponse(_)));
    assert_eq!(err.to_string(), "Invalid JSON response from API.");
}
