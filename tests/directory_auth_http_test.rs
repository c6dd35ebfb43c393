// ==========================================
// 企业/机台/账号 HTTP 集成测试
// ==========================================

mod helpers;

use axum::http::{Method, StatusCode};
use serde_json::json;
use helpers::api_test_helper::{create_test_app, get, post, send};

// ==========================================
// 企业
// ==========================================

#[tokio::test]
async fn test_business_crud() {
    let (_temp, app) = create_test_app().await;

    let (status, body) = post(&app, "/api/business", json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Business name is required");

    let (status, body) = post(&app, "/api/business", json!({ "Business_name": "Alpha" })).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body, json!({ "Business_id": 1, "Business_name": "Alpha" }));

    let (_, body) = post(&app, "/api/business", json!({ "Business_name": "Beta" })).await;
    assert_eq!(body["Business_id"], 2);

    let (status, _) = send(
        &app,
        Method::PUT,
        "/api/business/1",
        Some(json!({ "Business_name": "Alpha Prime" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &app,
        Method::PUT,
        "/api/business/99",
        Some(json!({ "Business_name": "Ghost" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Business not found");

    let (status, _) = send(&app, Method::DELETE, "/api/business/2", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, Method::DELETE, "/api/business/2", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = get(&app, "/api/business").await;
    assert_eq!(body, json!([{ "Business_id": 1, "Business_name": "Alpha Prime" }]));
}

// ==========================================
// 机台
// ==========================================

#[tokio::test]
async fn test_station_crud_and_filter() {
    let (_temp, app) = create_test_app().await;
    post(&app, "/api/business", json!({ "Business_name": "Alpha" })).await;
    post(&app, "/api/business", json!({ "Business_name": "Beta" })).await;

    let (status, body) = post(&app, "/api/station", json!({ "Machine_name": "X" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Both Machine name and Business ID are required");

    let (status, body) = post(
        &app,
        "/api/station",
        json!({ "Machine_name": "X", "Business_id": 42 }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid Business ID");

    for (name, business) in [("Reflow", 1), ("AOI", 2), ("Mounter", 1)] {
        let (status, _) = post(
            &app,
            "/api/station",
            json!({ "Machine_name": name, "Business_id": business }),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (_, all) = get(&app, "/api/station").await;
    assert_eq!(all.as_array().unwrap().len(), 3);

    let (_, alpha) = get(&app, "/api/station?business_id=1").await;
    let ids: Vec<i64> = alpha
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["Machine_ID"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![1, 3]);

    let (status, _) = send(
        &app,
        Method::PUT,
        "/api/station/2",
        Some(json!({ "Machine_name": "AOI-2" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, Method::DELETE, "/api/station/9", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Station not found");
}

// ==========================================
// 账号与令牌
// ==========================================

#[tokio::test]
async fn test_register_login_authen_flow() {
    let (_temp, app) = create_test_app().await;

    let user = json!({
        "email": "ada@example.com",
        "password": "pw1",
        "fname": "Ada",
        "lname": "Lovelace"
    });
    let (status, body) = post(&app, "/register", user.clone()).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "User registered successfully");

    let (status, _) = post(&app, "/register", user).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, users) = get(&app, "/register").await;
    assert_eq!(users.as_array().unwrap().len(), 1);
    assert!(users[0].get("password").is_none());
    assert!(users[0].get("password_hash").is_none());

    let (status, body) = post(
        &app,
        "/login",
        json!({ "email": "nobody@example.com", "password": "pw1" }),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({ "error": "Invalid email or password" }));

    let (status, body) = post(
        &app,
        "/login",
        json!({ "email": "ada@example.com", "password": "wrong" }),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({ "status": "error", "message": "login failed" }));

    let (status, body) = post(
        &app,
        "/login",
        json!({ "email": "ada@example.com", "password": "pw1" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    let token = body["token"].as_str().unwrap().to_string();

    let bearer = format!("Bearer {}", token);
    let (status, body) = send(&app, Method::POST, "/authen", None, Some(&bearer)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["decoded"]["email"], "ada@example.com");

    let (status, body) = send(&app, Method::POST, "/authen", None, Some("Bearer nope")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "error");

    let (status, body) = send(&app, Method::POST, "/authen", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "error");
}

#[tokio::test]
async fn test_health() {
    let (_temp, app) = create_test_app().await;
    let (status, body) = get(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["version"], production_count::VERSION);
}
