//! Behavior-driven tests for map link extraction
//!
//! These tests verify WHICH coordinate a user gets back for the link they
//! pasted, including shortened links and misbehaving shortener hosts.

use std::sync::Arc;
use std::time::{Duration, Instant};

use atlaslink_core::{
    ExtractorConfig, GeodeticCoordinate, HttpError, HttpMethod, HttpResponse, LinkExtractor,
    ScriptedHttpClient,
};

fn offline_extractor() -> (LinkExtractor, Arc<ScriptedHttpClient>) {
    scripted_extractor(ScriptedHttpClient::new(), ExtractorConfig::default())
}

fn scripted_extractor(
    client: ScriptedHttpClient,
    config: ExtractorConfig,
) -> (LinkExtractor, Arc<ScriptedHttpClient>) {
    let client = Arc::new(client);
    (LinkExtractor::new(client.clone(), config), client)
}

fn coordinate(lat: f64, lon: f64) -> GeodeticCoordinate {
    GeodeticCoordinate::new(lat, lon).expect("valid coordinate")
}

// =============================================================================
// Extraction: Pattern Priority
// =============================================================================

#[tokio::test]
async fn when_link_carries_marker_and_viewport_the_marker_wins() {
    // Given: A place link whose viewport is centred away from the marker
    let (extractor, _) = offline_extractor();
    let url = "https://www.google.com/maps/place/Marienplatz/@48.1000,11.5000,17z/data=!3m1!4b1!4m6!3m5!1s0x0:0x0!8m2!3d48.1374!4d11.5755";

    // When: The link is extracted
    let result = extractor.extract(url).await.expect("coordinate");

    // Then: The marker coordinate is returned, not the viewport centre
    assert_eq!(result, coordinate(48.1374, 11.5755));
}

#[tokio::test]
async fn viewport_links_yield_the_map_centre() {
    let (extractor, _) = offline_extractor();

    let result = extractor
        .extract("https://www.google.de/maps/@49.4521,11.0767,14z")
        .await
        .expect("coordinate");

    assert_eq!(result, coordinate(49.4521, 11.0767));
}

#[tokio::test]
async fn osm_fragment_links_are_recognised() {
    let (extractor, _) = offline_extractor();

    let result = extractor
        .extract("https://www.openstreetmap.org/#map=15/49.7913/9.9534")
        .await
        .expect("coordinate");

    assert_eq!(result, coordinate(49.7913, 9.9534));
}

#[tokio::test]
async fn osm_marker_params_are_accepted_in_any_order() {
    let (extractor, _) = offline_extractor();

    let result = extractor
        .extract("https://www.openstreetmap.org/?mlon=13.4319&mlat=48.5667#map=12/48.5/13.4")
        .await
        .expect("coordinate");

    // The fragment matcher outranks marker params when both are present
    assert_eq!(result, coordinate(48.5, 13.4));

    let result = extractor
        .extract("https://www.openstreetmap.org/?mlon=13.4319&mlat=48.5667")
        .await
        .expect("coordinate");
    assert_eq!(result, coordinate(48.5667, 13.4319));
}

#[tokio::test]
async fn negative_coordinates_are_preserved() {
    let (extractor, _) = offline_extractor();

    let result = extractor
        .extract("https://www.google.com/maps/@-33.8688,-151.2093,12z")
        .await
        .expect("coordinate");

    assert_eq!(result, coordinate(-33.8688, -151.2093));
}

// =============================================================================
// Extraction: Failures
// =============================================================================

#[tokio::test]
async fn marker_latitude_without_longitude_is_not_a_match() {
    let (extractor, _) = offline_extractor();

    let failure = extractor
        .extract("https://www.openstreetmap.org/?mlat=48.1374")
        .await
        .expect_err("half a marker is not a coordinate");

    assert_eq!(failure.final_url, "https://www.openstreetmap.org/?mlat=48.1374");
}

#[tokio::test]
async fn integer_coordinates_are_not_recognised() {
    let (extractor, _) = offline_extractor();

    assert!(extractor
        .extract("https://www.google.com/maps/@48,11,12z")
        .await
        .is_err());
}

#[tokio::test]
async fn out_of_range_pairs_are_not_coordinates() {
    let (extractor, _) = offline_extractor();

    assert!(extractor
        .extract("https://www.google.com/maps/@123.4567,11.5,12z")
        .await
        .is_err());
}

// =============================================================================
// Extraction: Shortened Links
// =============================================================================

#[tokio::test]
async fn shortened_link_is_resolved_with_one_head_request() {
    // Given: A shortener that redirects to a place link
    let (extractor, client) = scripted_extractor(
        ScriptedHttpClient::new().respond(HttpResponse::redirect(
            "https://www.google.com/maps/place/Hof/@50.3135,11.9128,13z",
        )),
        ExtractorConfig::default(),
    );

    // When: The short link is extracted
    let result = extractor
        .extract("https://maps.app.goo.gl/h0fXyz")
        .await
        .expect("coordinate");

    // Then: The coordinate comes from the redirect target after a single HEAD
    assert_eq!(result, coordinate(50.3135, 11.9128));
    let requests = client.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, HttpMethod::Head);
    assert_eq!(requests[0].url, "https://maps.app.goo.gl/h0fXyz");
}

#[tokio::test]
async fn shortener_transport_failure_falls_back_to_the_original_url() {
    let (extractor, _) = scripted_extractor(
        ScriptedHttpClient::new().fail(HttpError::connect("connection refused")),
        ExtractorConfig::default(),
    );

    let failure = extractor
        .extract("https://goo.gl/maps/unreachable")
        .await
        .expect_err("nothing to match");

    assert_eq!(failure.final_url, "https://goo.gl/maps/unreachable");
}

#[tokio::test]
async fn shortener_answer_without_location_keeps_the_original_url() {
    let (extractor, _) = scripted_extractor(
        ScriptedHttpClient::new().respond(HttpResponse::new(200)),
        ExtractorConfig::default(),
    );

    let failure = extractor
        .extract("https://goo.gl/maps/no-location")
        .await
        .expect_err("nothing to match");

    assert_eq!(failure.final_url, "https://goo.gl/maps/no-location");
}

#[tokio::test]
async fn slow_shortener_is_abandoned_after_the_timeout() {
    // Given: A shortener that answers far later than the configured timeout
    let config = ExtractorConfig {
        redirect_timeout_ms: 50,
        ..ExtractorConfig::default()
    };
    let (extractor, _) = scripted_extractor(
        ScriptedHttpClient::new().respond_after(
            Duration::from_secs(5),
            HttpResponse::redirect("https://www.google.com/maps/@48.137,11.575,15z"),
        ),
        config,
    );

    // When: The short link is extracted
    let started = Instant::now();
    let result = extractor.extract("https://goo.gl/maps/slow").await;

    // Then: Extraction gives up on the redirect and matches the original URL
    assert!(started.elapsed() < Duration::from_secs(2));
    let failure = result.expect_err("original URL has no coordinate");
    assert_eq!(failure.final_url, "https://goo.gl/maps/slow");
}

#[tokio::test]
async fn custom_shortener_hosts_replace_the_default() {
    let config = ExtractorConfig {
        shortener_hosts: vec![String::from("short.example")],
        ..ExtractorConfig::default()
    };
    let (extractor, client) = scripted_extractor(ScriptedHttpClient::new(), config);

    assert!(extractor.is_shortened("https://short.example/abc"));
    assert!(!extractor.is_shortened("https://goo.gl/abc"));

    let _ = extractor.extract("https://goo.gl/maps/@48.1,11.5,10z").await;
    assert!(client.requests().is_empty());
}
