//! API integration tests

#![allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use serde_json::json;

mod common;
use common::{
    body_json, calculate, create_test_app, create_test_router, json_request, scientific, send,
    test_config,
};

// === Static page and service endpoints ===

#[tokio::test]
async fn test_index_page() {
    let app = create_test_router();
    let response = send(&app, Request::get("/").body(Body::empty()).unwrap()).await;

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let html = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(html.contains("Calculator"));
    assert!(html.contains("/static/calculator.js"));
}

#[tokio::test]
async fn test_static_assets() {
    let app = create_test_router();

    let response = send(
        &app,
        Request::get("/static/calculator.js").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers()[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("application/javascript"));

    let response = send(
        &app,
        Request::get("/static/calculator.css").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_health_check() {
    let app = create_test_router();
    let (status, body) = json_request(&app, "GET", "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "healthy");
    assert_eq!(body["data"]["service"], "calculator");
    assert_eq!(body["data"]["version"], env!("CARGO_PKG_VERSION"));
    assert!(body["data"]["timestamp"].is_string());
}

#[tokio::test]
async fn test_unknown_endpoint() {
    let app = create_test_router();
    let (status, body) = json_request(&app, "GET", "/nonexistent", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], 404);
    assert_eq!(body["error"]["message"], "Endpoint not found");
}

#[tokio::test]
async fn test_security_headers_on_every_response() {
    let app = create_test_router();

    for uri in ["/", "/health", "/nonexistent"] {
        let response = send(&app, Request::get(uri).body(Body::empty()).unwrap()).await;
        let headers = response.headers();
        assert_eq!(headers["x-content-type-options"], "nosniff", "{}", uri);
        assert_eq!(headers["x-frame-options"], "DENY");
        assert_eq!(headers["x-xss-protection"], "1; mode=block");
        assert_eq!(
            headers["strict-transport-security"],
            "max-age=31536000; includeSubDomains"
        );
        assert_eq!(headers["content-security-policy"], "default-src 'self'");
    }
}

// === /calculate ===

#[tokio::test]
async fn test_basic_arithmetic() {
    let app = create_test_router();

    let cases = [
        ("2 + 3", "5"),
        ("10 - 4", "6"),
        ("6 * 7", "42"),
        ("15 / 3", "5"),
        ("10 / 4", "2.5"),
        ("2 + 3 * 4", "14"),
        ("(2 + 3) * 4", "20"),
        ("-5 + 3", "-2"),
        ("0.1 + 0.2", "0.3"),
        ("1e3 + 1", "1001"),
    ];

    for (expression, expected) in cases {
        let (status, body) = calculate(&app, expression).await;
        assert_eq!(status, StatusCode::OK, "{}", expression);
        assert_eq!(body["data"]["result"], expected, "{}", expression);
    }
}

#[tokio::test]
async fn test_display_symbols_are_normalised() {
    let app = create_test_router();

    let (status, body) = calculate(&app, "6 × 7 ÷ 2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["expression"], "6 * 7 / 2");
    assert_eq!(body["data"]["result"], "21");
}

#[tokio::test]
async fn test_arithmetic_failures() {
    let app = create_test_router();

    let (status, body) = calculate(&app, "10 / 0").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], 400);
    assert_eq!(body["error"]["message"], "Division by zero");

    let (_, body) = calculate(&app, "1e308 * 10").await;
    assert_eq!(body["error"]["message"], "Infinity");

    let (_, body) = calculate(&app, "1e308 * 10 - 1e308 * 10").await;
    assert_eq!(body["error"]["message"], "Not a number");
}

#[tokio::test]
async fn test_invalid_expressions_carry_details() {
    let app = create_test_router();

    let cases = [
        ("2 ++ 3", "Consecutive operators not allowed"),
        ("((2 + 3)", "Unbalanced parentheses"),
        ("2 + abc", "Invalid characters in expression"),
        ("__import__('os')", "Invalid characters in expression"),
        ("* 2", "Invalid operator placement"),
        ("2 +", "Invalid operator placement"),
    ];

    for (expression, details) in cases {
        let (status, body) = calculate(&app, expression).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", expression);
        assert_eq!(body["error"]["message"], "Invalid expression", "{}", expression);
        assert_eq!(body["error"]["details"], details, "{}", expression);
    }
}

#[tokio::test]
async fn test_expression_length_and_emptiness() {
    let app = create_test_router();

    let (status, body) = calculate(&app, "   ").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "Expression cannot be empty");

    let long = "1+".repeat(500) + "1";
    let (status, body) = calculate(&app, &long).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"]["message"],
        "Expression too long (max 1000 characters)"
    );
}

#[tokio::test]
async fn test_length_limit_ignores_surrounding_whitespace() {
    let app = create_test_router();

    // 999 characters of expression inside padding that pushes the raw text past 1000
    let expression = "1+".repeat(499) + "1";
    assert_eq!(expression.len(), 999);
    let padded = format!("    {}    ", expression);

    let (status, body) = calculate(&app, &padded).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["result"], "500");
}

#[tokio::test]
async fn test_results_are_cached() {
    let app = create_test_router();

    let (_, first) = calculate(&app, "12 * 12").await;
    assert_eq!(first["data"]["cached"], false);

    let (_, second) = calculate(&app, "12 * 12").await;
    assert_eq!(second["data"]["cached"], true);
    assert_eq!(first["data"]["result"], second["data"]["result"]);

    // Failures are never cached
    let (_, body) = calculate(&app, "1 / 0").await;
    assert_eq!(body["error"]["message"], "Division by zero");
    let (_, body) = calculate(&app, "1 / 0").await;
    assert_eq!(body["error"]["message"], "Division by zero");
}

#[tokio::test]
async fn test_cache_disabled() {
    let mut config = test_config();
    config.cache.enabled = false;
    let (app, _) = create_test_app(config);

    calculate(&app, "2 + 2").await;
    let (_, body) = calculate(&app, "2 + 2").await;
    assert_eq!(body["data"]["cached"], false);
}

// === Request body checks ===

#[tokio::test]
async fn test_request_body_checks() {
    let app = create_test_router();

    let (status, body) = json_request(&app, "POST", "/calculate", Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "Invalid JSON data");

    let (_, body) =
        json_request(&app, "POST", "/calculate", Some(json!({"expr": "2+3"}))).await;
    assert_eq!(body["error"]["message"], "Missing required field: expression");

    let (_, body) =
        json_request(&app, "POST", "/calculate", Some(json!({"expression": 5}))).await;
    assert_eq!(body["error"]["message"], "Invalid JSON data");

    let (_, body) = json_request(&app, "POST", "/calculate", None).await;
    assert_eq!(body["error"]["message"], "Invalid JSON data");
}

#[tokio::test]
async fn test_content_type_required() {
    let app = create_test_router();
    let request = Request::post("/calculate")
        .header("content-type", "text/plain")
        .body(Body::from(r#"{"expression": "2+3"}"#))
        .unwrap();

    let response = send(&app, request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(
        body["error"]["message"],
        "Content-Type must be application/json"
    );
}

#[tokio::test]
async fn test_oversized_body_is_rejected() {
    let mut config = test_config();
    config.server.max_body_bytes = 64;
    let (app, _) = create_test_app(config);
    let payload = serde_json::to_string(&json!({ "expression": "1+".repeat(100) + "1" })).unwrap();

    // Declared length over the limit
    let request = Request::post("/calculate")
        .header("content-type", "application/json")
        .header("content-length", payload.len())
        .body(Body::from(payload.clone()))
        .unwrap();
    let response = send(&app, request).await;
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], 413);
    assert_eq!(body["error"]["message"], "Request body too large");

    // No declared length; the limit applies while reading
    let request = Request::post("/calculate")
        .header("content-type", "application/json")
        .body(Body::from(payload))
        .unwrap();
    let response = send(&app, request).await;
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    let body = body_json(response).await;
    assert_eq!(body["error"]["message"], "Request body too large");
}

// === /scientific ===

#[tokio::test]
async fn test_scientific_functions() {
    let app = create_test_router();

    let cases = [
        ("sin", 30.0, "0.5"),
        ("cos", 60.0, "0.5"),
        ("tan", 45.0, "1.0"),
        ("log", 100.0, "2.0"),
        ("ln", 1.0, "0.0"),
        ("sqrt", 16.0, "4.0"),
        ("pow", 3.0, "9.0"),
        ("factorial", 5.0, "120"),
        ("factorial", 0.0, "1"),
        ("abs", -7.5, "7.5"),
        ("negate", 7.0, "-7.0"),
    ];

    for (function, value, expected) in cases {
        let (status, body) = scientific(&app, function, value).await;
        assert_eq!(status, StatusCode::OK, "{}({})", function, value);
        assert_eq!(body["data"]["result"], expected, "{}({})", function, value);
        assert_eq!(body["data"]["function"], function);
    }
}

#[tokio::test]
async fn test_scientific_failures() {
    let app = create_test_router();

    let cases = [
        ("sqrt", -1.0, "Square root of negative number"),
        ("log", 0.0, "Logarithm of non-positive number"),
        ("ln", -2.0, "Natural log of non-positive number"),
        ("factorial", -1.0, "Invalid factorial input"),
        ("factorial", 2.5, "Invalid factorial input"),
        ("factorial", 171.0, "Invalid factorial input"),
        ("foo", 1.0, "Unknown function"),
        ("", 1.0, "Function name cannot be empty"),
        ("sin", 1e11, "Value too large"),
    ];

    for (function, value, message) in cases {
        let (status, body) = scientific(&app, function, value).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}({})", function, value);
        assert_eq!(body["error"]["message"], message, "{}({})", function, value);
    }
}

#[tokio::test]
async fn test_scientific_request_checks() {
    let app = create_test_router();

    let (_, body) =
        json_request(&app, "POST", "/scientific", Some(json!({"function": "sin"}))).await;
    assert_eq!(body["error"]["message"], "Missing required field: value");

    let (_, body) = json_request(
        &app,
        "POST",
        "/scientific",
        Some(json!({"function": "sin", "value": "thirty"})),
    )
    .await;
    assert_eq!(body["error"]["message"], "Invalid JSON data");
}

#[tokio::test]
async fn test_scientific_results_are_cached() {
    let app = create_test_router();

    let (_, first) = scientific(&app, "factorial", 20.0).await;
    assert_eq!(first["data"]["cached"], false);
    assert_eq!(first["data"]["result"], "2432902008176640000");

    let (_, second) = scientific(&app, "factorial", 20.0).await;
    assert_eq!(second["data"]["cached"], true);
    assert_eq!(second["data"]["result"], "2432902008176640000");
}

// === Rate limiting ===

#[tokio::test]
async fn test_rate_limit_rejects_over_limit() {
    let mut config = test_config();
    config.rate_limit.enabled = true;
    config.rate_limit.max_requests = 2;
    let (app, state) = create_test_app(config);

    assert_eq!(calculate(&app, "1 + 1").await.0, StatusCode::OK);
    assert_eq!(scientific(&app, "abs", 1.0).await.0, StatusCode::OK);

    let (status, body) = calculate(&app, "1 + 1").await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["error"]["code"], 429);
    assert_eq!(
        body["error"]["message"],
        "Rate limit exceeded. Please try again later."
    );
    assert_eq!(state.rate_limited_total(), 1);

    // Service endpoints are not limited
    let (status, _) = json_request(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_rate_limit_is_per_client() {
    let mut config = test_config();
    config.rate_limit.enabled = true;
    config.rate_limit.max_requests = 1;
    let (app, _) = create_test_app(config);

    let request_from = |ip: &str| {
        Request::post("/calculate")
            .header("content-type", "application/json")
            .header("x-forwarded-for", ip)
            .body(Body::from(r#"{"expression": "1+1"}"#))
            .unwrap()
    };

    assert_eq!(send(&app, request_from("198.51.100.1")).await.status(), StatusCode::OK);
    assert_eq!(send(&app, request_from("198.51.100.2")).await.status(), StatusCode::OK);
    assert_eq!(
        send(&app, request_from("198.51.100.1")).await.status(),
        StatusCode::TOO_MANY_REQUESTS
    );
}

// === /metrics ===

#[tokio::test]
async fn test_metrics_counters() {
    let (app, _) = create_test_app(test_config());

    calculate(&app, "2 + 2").await;
    calculate(&app, "2 + 2").await;
    calculate(&app, "2 / 0").await;
    json_request(&app, "GET", "/missing", None).await;

    let (status, body) = json_request(&app, "GET", "/metrics", None).await;
    assert_eq!(status, StatusCode::OK);

    let data = &body["data"];
    // The metrics request itself is counted after it responds
    assert_eq!(data["requests_total"], 4);
    assert_eq!(data["errors_total"], 2);
    assert_eq!(data["cache_entries"], 1);
    assert_eq!(data["cache_hits"], 1);
    assert_eq!(data["cache_misses"], 2);
    assert_eq!(data["rate_limited_total"], 0);
    assert!(data["uptime"].as_f64().unwrap() >= 0.0);
    assert!(data["system"]["memory_total_mb"].is_u64());
}
