//! Integration tests for the HTTP API surface
//!
//! Drives the axum router directly with oneshot requests, backed by a
//! temporary SQLite store and a mock Nominatim server.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use mapa_produtores::adapters::inbound::{router, ApiState};
use mapa_produtores::adapters::outbound::{NominatimGeocoder, SqliteProducerStore};
use mapa_produtores::application::ProducerService;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Router over an empty SQLite store and the given mock provider.
async fn sqlite_app(nominatim: &MockServer, dir: &TempDir) -> Router {
    let db_path = dir.path().join("estufa.db");
    std::fs::File::create(&db_path).unwrap();
    let store = SqliteProducerStore::new(db_path.to_string_lossy().to_string());
    store.initialize().await.unwrap();

    let geocoder = Arc::new(
        NominatimGeocoder::new(
            nominatim.uri(),
            "Portugal",
            Duration::from_secs(2),
            Duration::ZERO,
        )
        .unwrap(),
    );
    let service = Arc::new(ProducerService::new(Arc::new(store), geocoder, None));
    router(ApiState::new(service, "sqlite"), Duration::from_secs(5))
}

async fn mount_geocoder_match(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!([{"lat": "39.7436", "lon": "-8.8071"}])),
        )
        .mount(server)
        .await;
}

fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn valid_registration() -> serde_json::Value {
    serde_json::json!({
        "nome": "Quinta do Vale",
        "morada": "Rua das Flores 12, Santarém",
        "telefone": "+351 912 345 678",
        "produtos": ["Apples", "Pears"]
    })
}

/// Registration answers 201 with the resolved coordinates, and the map
/// listing returns the record in the structured shape.
#[tokio::test]
async fn test_register_then_list() {
    let nominatim = MockServer::start().await;
    mount_geocoder_match(&nominatim).await;
    let dir = TempDir::new().unwrap();
    let app = sqlite_app(&nominatim, &dir).await;

    let response = app
        .clone()
        .oneshot(post_json("/api/produtores/registar", valid_registration()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = body_json(response).await;
    assert_eq!(body["status"], "sucesso");
    assert_eq!(body["mensagem"], "Produtor registado e adicionado ao mapa!");
    assert_eq!(body["latitude"].as_f64().unwrap(), 39.7436);
    assert_eq!(body["longitude"].as_f64().unwrap(), -8.8071);

    let response = app
        .oneshot(get("/api/produtores/localizacao"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let listing = body_json(response).await;
    let markers = listing.as_array().unwrap();
    assert_eq!(markers.len(), 1);
    assert_eq!(markers[0]["nome"], "Quinta do Vale");
    assert_eq!(markers[0]["lat"].as_f64().unwrap(), 39.7436);
    assert_eq!(markers[0]["lng"].as_f64().unwrap(), -8.8071);
    assert_eq!(
        markers[0]["produtos"],
        serde_json::json!([
            {"nome": "Apples", "foto_url": ""},
            {"nome": "Pears", "foto_url": ""}
        ])
    );
}

/// Payloads with a missing required field are rejected before any
/// lookup.
#[tokio::test]
async fn test_register_missing_field_is_rejected() {
    let nominatim = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .expect(0)
        .mount(&nominatim)
        .await;
    let dir = TempDir::new().unwrap();
    let app = sqlite_app(&nominatim, &dir).await;

    let mut incomplete = valid_registration();
    incomplete.as_object_mut().unwrap().remove("telefone");

    let response = app
        .oneshot(post_json("/api/produtores/registar", incomplete))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(body["status"], "erro");
    assert_eq!(body["mensagem"], "Faltam campos obrigatórios.");
}

/// Unknown fields are rejected by the request schema.
#[tokio::test]
async fn test_register_unknown_field_is_rejected() {
    let nominatim = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let app = sqlite_app(&nominatim, &dir).await;

    let mut payload = valid_registration();
    payload
        .as_object_mut()
        .unwrap()
        .insert("nif".to_string(), serde_json::json!("123456789"));

    let response = app
        .oneshot(post_json("/api/produtores/registar", payload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

/// An empty product list is a validation error.
#[tokio::test]
async fn test_register_empty_product_list_is_rejected() {
    let nominatim = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let app = sqlite_app(&nominatim, &dir).await;

    let mut payload = valid_registration();
    payload["produtos"] = serde_json::json!([]);

    let response = app
        .oneshot(post_json("/api/produtores/registar", payload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(body["mensagem"], "A lista de produtos está vazia.");
}

/// An unmatched address is a 400 the user can correct; a failing
/// provider is a 500.
#[tokio::test]
async fn test_register_geocoding_failure_classes() {
    let not_found = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(&not_found)
        .await;
    let dir = TempDir::new().unwrap();
    let app = sqlite_app(&not_found, &dir).await;

    let response = app
        .clone()
        .oneshot(post_json("/api/produtores/registar", valid_registration()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(
        body["mensagem"],
        "Morada não encontrada. Tente um endereço mais específico e inclua a localidade."
    );

    // No record was created either way.
    let listing = body_json(
        app.oneshot(get("/api/produtores/localizacao")).await.unwrap(),
    )
    .await;
    assert!(listing.as_array().unwrap().is_empty());

    let broken = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&broken)
        .await;
    let dir = TempDir::new().unwrap();
    let app = sqlite_app(&broken, &dir).await;

    let response = app
        .oneshot(post_json("/api/produtores/registar", valid_registration()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert_eq!(
        body["mensagem"],
        "Erro no serviço de mapas (Geocodificação). Tente mais tarde."
    );
}

/// Multipart registration works; the row store drops the photo but keeps
/// the product.
#[tokio::test]
async fn test_register_multipart_with_photo() {
    let nominatim = MockServer::start().await;
    mount_geocoder_match(&nominatim).await;
    let dir = TempDir::new().unwrap();
    let app = sqlite_app(&nominatim, &dir).await;

    let boundary = "x-produtores-test-boundary";
    let body = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"nome\"\r\n\r\nQuinta das Fotos\r\n\
         --{b}\r\nContent-Disposition: form-data; name=\"morada\"\r\n\r\nRua Nova 1, Faro\r\n\
         --{b}\r\nContent-Disposition: form-data; name=\"telefone\"\r\n\r\n+351 911 000 000\r\n\
         --{b}\r\nContent-Disposition: form-data; name=\"nomes_produtos\"\r\n\r\n[\"Morangos\"]\r\n\
         --{b}\r\nContent-Disposition: form-data; name=\"file_0\"; filename=\"m.jpg\"\r\n\
         Content-Type: image/jpeg\r\n\r\nJPEGDATA\r\n\
         --{b}--\r\n",
        b = boundary
    );
    let request = Request::builder()
        .method("POST")
        .uri("/api/produtores/registar")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let listing = body_json(
        app.oneshot(get("/api/produtores/localizacao")).await.unwrap(),
    )
    .await;
    assert_eq!(
        listing[0]["produtos"],
        serde_json::json!([{"nome": "Morangos", "foto_url": ""}])
    );
}

/// Login, profile fetch and profile update against a registered record.
#[tokio::test]
async fn test_login_profile_and_update_flow() {
    let nominatim = MockServer::start().await;
    mount_geocoder_match(&nominatim).await;
    let dir = TempDir::new().unwrap();
    let app = sqlite_app(&nominatim, &dir).await;

    let mut payload = valid_registration();
    payload
        .as_object_mut()
        .unwrap()
        .insert("email".to_string(), serde_json::json!("quinta@example.pt"));
    payload
        .as_object_mut()
        .unwrap()
        .insert("password".to_string(), serde_json::json!("segredo"));
    let response = app
        .clone()
        .oneshot(post_json("/api/produtores/registar", payload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    // Login yields the stored identifier.
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/produtores/login",
            serde_json::json!({"email": "quinta@example.pt", "password": "segredo"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let login = body_json(response).await;
    assert_eq!(login["status"], "sucesso");
    assert_eq!(login["nome"], "Quinta do Vale");
    let id = login["id"].as_str().unwrap().to_string();

    // Own profile, password never echoed.
    let response = app
        .clone()
        .oneshot(get(&format!("/api/produtores/meus_dados/{id}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let profile = body_json(response).await;
    assert_eq!(profile["nome"], "Quinta do Vale");
    assert_eq!(profile["email"], "quinta@example.pt");
    assert!(profile.get("password").is_none());

    // Whole-field overwrite of the mutable subset.
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/produtores/atualizar_perfil",
            serde_json::json!({
                "id": id,
                "nome": "Quinta Renovada",
                "telefone": "+351 911 222 333",
                "produtos": ["Mel"],
                "disponivel": false
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "sucesso");

    let profile = body_json(
        app.clone()
            .oneshot(get(&format!("/api/produtores/meus_dados/{id}")))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(profile["nome"], "Quinta Renovada");
    assert_eq!(profile["telefone"], "+351 911 222 333");
    assert_eq!(
        profile["produtos"],
        serde_json::json!([{"nome": "Mel", "foto_url": ""}])
    );
    assert_eq!(profile["disponivel"], false);
}

/// Wrong password and unknown email answer with the same 401 body.
#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let nominatim = MockServer::start().await;
    mount_geocoder_match(&nominatim).await;
    let dir = TempDir::new().unwrap();
    let app = sqlite_app(&nominatim, &dir).await;

    let mut payload = valid_registration();
    payload
        .as_object_mut()
        .unwrap()
        .insert("email".to_string(), serde_json::json!("quinta@example.pt"));
    payload
        .as_object_mut()
        .unwrap()
        .insert("password".to_string(), serde_json::json!("segredo"));
    app.clone()
        .oneshot(post_json("/api/produtores/registar", payload))
        .await
        .unwrap();

    let wrong_password = app
        .clone()
        .oneshot(post_json(
            "/api/produtores/login",
            serde_json::json!({"email": "quinta@example.pt", "password": "errada"}),
        ))
        .await
        .unwrap();
    let unknown_email = app
        .oneshot(post_json(
            "/api/produtores/login",
            serde_json::json!({"email": "outra@example.pt", "password": "segredo"}),
        ))
        .await
        .unwrap();

    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_email.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        body_json(wrong_password).await,
        body_json(unknown_email).await
    );
}

/// Unknown profile ids answer 404 on fetch and update.
#[tokio::test]
async fn test_profile_not_found() {
    let nominatim = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let app = sqlite_app(&nominatim, &dir).await;

    let response = app
        .clone()
        .oneshot(get("/api/produtores/meus_dados/9999"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .oneshot(post_json(
            "/api/produtores/atualizar_perfil",
            serde_json::json!({
                "id": "9999",
                "nome": "Ninguém",
                "telefone": "000",
                "produtos": []
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

/// Health reports the selected backend.
#[tokio::test]
async fn test_health_reports_backend() {
    let nominatim = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let app = sqlite_app(&nominatim, &dir).await;

    let response = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["backend"], "sqlite");
}
