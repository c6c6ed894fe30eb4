//! Integration tests for both feeds against mock HTTP servers.

use skyboard_core::{
    Config, Dashboard, FetchError, ProviderId, Reading, WeatherError, WeatherProvider,
    WeatherRequest, provider::regional::RegionalProvider, provider_from_config,
};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path, query_param},
};

fn current_conditions() -> serde_json::Value {
    serde_json::json!({
        "rainfall": {"data": [], "startTime": "2024-06-01T11:45:00+08:00"},
        "temperature": {
            "data": [
                {"place": "King's Park", "value": 27, "unit": "C"},
                {"place": "Hong Kong Observatory", "value": 28, "unit": "C"},
                {"place": "Sha Tin", "value": 30, "unit": "C"}
            ],
            "recordTime": "2024-06-01T12:00:00+08:00"
        },
        "humidity": {
            "recordTime": "2024-06-01T12:00:00+08:00",
            "data": [{"unit": "percent", "value": 79, "place": "Hong Kong Observatory"}]
        },
        "warningMessage": "",
        "updateTime": "2024-06-01T12:02:00+08:00"
    })
}

fn local_forecast() -> serde_json::Value {
    serde_json::json!({
        "generalSituation": "An anticyclone is bringing fine weather to the coast.",
        "forecastPeriod": "Weather forecast for this afternoon and tonight",
        "forecastDesc": "Sunny periods. Humidity 55%. Moderate east wind 20 km/h.",
        "outlook": "Hot with sunny periods.",
        "updateTime": "2024-06-01T11:45:00+08:00"
    })
}

fn geocoding_hit() -> serde_json::Value {
    serde_json::json!({
        "results": [
            {"id": 2950159, "name": "Berlin", "latitude": 52.52437, "longitude": 13.41053,
             "country": "Germany", "timezone": "Europe/Berlin"},
            {"id": 5083330, "name": "Berlin", "latitude": 44.46867, "longitude": -71.18508,
             "country": "United States"}
        ],
        "generationtime_ms": 0.9
    })
}

fn open_meteo_current() -> serde_json::Value {
    serde_json::json!({
        "latitude": 52.52,
        "longitude": 13.419998,
        "utc_offset_seconds": 3600,
        "timezone": "Europe/Berlin",
        "current_units": {"time": "iso8601", "temperature_2m": "°C",
                          "relative_humidity_2m": "%", "wind_speed_10m": "km/h"},
        "current": {"time": "2024-01-15T12:00", "interval": 900, "temperature_2m": 4.4,
                    "relative_humidity_2m": 81, "wind_speed_10m": 14.8, "weather_code": 3}
    })
}

fn test_config(server: &MockServer) -> Config {
    let mut cfg = Config::default();
    cfg.regional.base_url = format!("{}/weather.php", server.uri());
    cfg.global.geocoding_url = format!("{}/v1/search", server.uri());
    cfg.global.forecast_url = format!("{}/v1/forecast", server.uri());
    cfg
}

async fn mount_regional(server: &MockServer, data_type: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path("/weather.php"))
        .and(query_param("dataType", data_type))
        .and(query_param("lang", "en"))
        .respond_with(response)
        .mount(server)
        .await;
}

async fn mount_current(server: &MockServer) {
    mount_regional(server, "rhrread", ResponseTemplate::new(200).set_body_json(current_conditions()))
        .await;
}

async fn mount_forecast(server: &MockServer) {
    mount_regional(server, "flw", ResponseTemplate::new(200).set_body_json(local_forecast())).await;
}

// ============================================================================
// Regional feed
// ============================================================================

#[tokio::test]
async fn regional_fetch_merges_current_and_forecast() {
    let server = MockServer::start().await;
    mount_current(&server).await;
    mount_forecast(&server).await;

    let provider = provider_from_config(ProviderId::Regional, &test_config(&server));
    let record = provider.get_weather(&WeatherRequest::at("Sha Tin")).await.unwrap();

    assert_eq!(record.location_name, "Sha Tin");
    assert_eq!(record.temperature, Some(Reading::Number(30.0)));
    assert_eq!(record.humidity.as_deref(), Some("79%"));
    // no structured wind series, so the forecast prose supplies it
    assert_eq!(record.wind.as_deref(), Some("20 km/h"));
    assert!(record.description.unwrap().starts_with("An anticyclone"));
}

#[tokio::test]
async fn regional_missing_place_uses_first_humidity_entry() {
    let server = MockServer::start().await;
    mount_current(&server).await;
    mount_forecast(&server).await;

    let provider = RegionalProvider::from_config(&test_config(&server));
    let record = provider.get_weather(&WeatherRequest::at("Tai Mei Tuk")).await.unwrap();

    assert_eq!(record.temperature, None);
    assert_eq!(record.humidity.as_deref(), Some("79%"));
}

#[tokio::test]
async fn regional_summary_supplies_missing_humidity() {
    let server = MockServer::start().await;
    let mut current = current_conditions();
    current.as_object_mut().unwrap().remove("humidity");

    mount_regional(&server, "rhrread", ResponseTemplate::new(200).set_body_json(current)).await;
    mount_forecast(&server).await;

    let provider = RegionalProvider::from_config(&test_config(&server));
    let record = provider.get_weather(&WeatherRequest::default()).await.unwrap();

    assert_eq!(record.location_name, "Hong Kong Observatory");
    assert_eq!(record.humidity.as_deref(), Some("55%"));
}

#[tokio::test]
async fn regional_forecast_failure_is_tolerated() {
    let server = MockServer::start().await;
    mount_current(&server).await;
    mount_regional(&server, "flw", ResponseTemplate::new(500).set_body_string("boom")).await;

    let provider = RegionalProvider::from_config(&test_config(&server));
    let snapshot = provider.fetch().await.unwrap();
    assert!(snapshot.forecast.is_none());

    let record = provider.get_weather(&WeatherRequest::at("King's Park")).await.unwrap();
    assert_eq!(record.temperature, Some(Reading::Number(27.0)));
    assert_eq!(record.description, None);
}

#[tokio::test]
async fn regional_forecast_with_invalid_json_is_tolerated() {
    let server = MockServer::start().await;
    mount_current(&server).await;
    mount_regional(&server, "flw", ResponseTemplate::new(200).set_body_string("<html>")).await;

    let provider = RegionalProvider::from_config(&test_config(&server));
    let snapshot = provider.fetch().await.unwrap();

    assert!(snapshot.forecast.is_none());
    assert!(snapshot.current.temperature.is_some());
}

#[tokio::test]
async fn regional_primary_failure_is_wrapped() {
    let server = MockServer::start().await;
    mount_regional(&server, "rhrread", ResponseTemplate::new(503).set_body_string("maintenance"))
        .await;

    let provider = RegionalProvider::from_config(&test_config(&server));
    let result = provider.fetch().await;

    match result {
        Err(WeatherError::Fetch {
            feed: ProviderId::Regional,
            source: FetchError::Status { status, body },
        }) => {
            assert_eq!(status.as_u16(), 503);
            assert_eq!(body, "maintenance");
        }
        other => panic!("Expected wrapped status error, got: {other:?}"),
    }
}

// ============================================================================
// Global feed
// ============================================================================

#[tokio::test]
async fn global_lookup_uses_first_geocoding_match() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .and(query_param("name", "Berlin"))
        .and(query_param("count", "10"))
        .and(query_param("language", "en"))
        .and(query_param("format", "json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(geocoding_hit()))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .and(query_param("latitude", "52.52437"))
        .and(query_param("longitude", "13.41053"))
        .and(query_param("timezone", "auto"))
        .respond_with(ResponseTemplate::new(200).set_body_json(open_meteo_current()))
        .expect(1)
        .mount(&server)
        .await;

    let dash = Dashboard::from_config(&test_config(&server));
    let record = dash.search_city("  Berlin ").await.unwrap();

    assert_eq!(record.location_name, "Berlin");
    assert_eq!(record.temperature, Some(Reading::Number(4.0)));
    assert_eq!(record.humidity.as_deref(), Some("81%"));
    assert_eq!(record.wind.as_deref(), Some("14.8 km/h"));
    assert_eq!(record.description.as_deref(), Some("Overcast"));
}

#[tokio::test]
async fn global_lookup_without_results_fails() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"generationtime_ms": 0.4})),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(open_meteo_current()))
        .expect(0)
        .mount(&server)
        .await;

    let dash = Dashboard::from_config(&test_config(&server));
    let err = dash.search_city("Qwxyzzy").await.unwrap_err();

    assert!(
        matches!(
            err,
            WeatherError::Fetch { feed: ProviderId::Global, source: FetchError::CityNotFound }
        ),
        "Expected CityNotFound, got: {err:?}"
    );
    assert_eq!(err.to_string(), "Failed to fetch global weather data: City not found");
}

#[tokio::test]
async fn global_lookup_with_empty_results_fails() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"results": []})))
        .mount(&server)
        .await;

    let dash = Dashboard::from_config(&test_config(&server));
    let err = dash.search_city("Nowhere").await.unwrap_err();

    assert!(matches!(err, WeatherError::Fetch { source: FetchError::CityNotFound, .. }));
}

#[tokio::test]
async fn global_forecast_error_is_wrapped() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(geocoding_hit()))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(ResponseTemplate::new(400).set_body_string("bad coordinates"))
        .mount(&server)
        .await;

    let dash = Dashboard::from_config(&test_config(&server));
    let err = dash.search_city("Berlin").await.unwrap_err();

    assert!(
        err.to_string()
            .starts_with("Failed to fetch global weather data: HTTP error! Status: 400"),
        "unexpected message: {err}"
    );
}

#[tokio::test]
async fn global_geocoding_error_is_wrapped() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .respond_with(ResponseTemplate::new(500).set_body_string("geocoder down"))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(open_meteo_current()))
        .expect(0)
        .mount(&server)
        .await;

    let dash = Dashboard::from_config(&test_config(&server));
    let err = dash.search_city("Berlin").await.unwrap_err();

    assert!(
        matches!(
            err,
            WeatherError::Fetch { feed: ProviderId::Global, source: FetchError::Status { .. } }
        ),
        "unexpected error: {err:?}"
    );
}

// ============================================================================
// Session cache
// ============================================================================

#[tokio::test]
async fn district_change_reuses_cached_snapshot() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather.php"))
        .and(query_param("dataType", "rhrread"))
        .respond_with(ResponseTemplate::new(200).set_body_json(current_conditions()))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/weather.php"))
        .and(query_param("dataType", "flw"))
        .respond_with(ResponseTemplate::new(200).set_body_json(local_forecast()))
        .expect(1)
        .mount(&server)
        .await;

    let mut dash = Dashboard::from_config(&test_config(&server));

    let first = dash.refresh_regional().await.unwrap();
    assert_eq!(first.location_name, "Hong Kong Observatory");
    assert_eq!(first.temperature, Some(Reading::Number(28.0)));

    let second = dash.select_district("King's Park").unwrap().expect("snapshot is cached");
    assert_eq!(second.location_name, "King's Park");
    assert_eq!(second.temperature, Some(Reading::Number(27.0)));
    assert_eq!(dash.selected_district(), "King's Park");
}

#[tokio::test]
async fn failed_refresh_leaves_cache_empty() {
    let server = MockServer::start().await;
    mount_regional(&server, "rhrread", ResponseTemplate::new(500)).await;

    let mut dash = Dashboard::from_config(&test_config(&server));

    assert!(dash.refresh_regional().await.is_err());
    assert!(dash.cached_snapshot().is_none());
    assert_eq!(dash.select_district("Stanley").unwrap(), None);
}

#[tokio::test]
async fn refresh_caches_snapshot_even_without_a_district() {
    let server = MockServer::start().await;
    mount_current(&server).await;
    mount_forecast(&server).await;

    let mut cfg = test_config(&server);
    cfg.display.default_district = String::new();
    let mut dash = Dashboard::from_config(&cfg);

    let err = dash.refresh_regional().await.unwrap_err();
    assert!(matches!(err, WeatherError::NoDistrictSelected));
    assert!(dash.cached_snapshot().is_some());

    let record = dash.select_district("Sha Tin").unwrap().expect("snapshot is cached");
    assert_eq!(record.location_name, "Sha Tin");
}
