//! Producer API Server
//!
//! HTTP surface of the service: producer registration (JSON or multipart
//! with photos), map listing, login and the profile endpoints. Wire field
//! names and messages are the Portuguese ones the frontend was built
//! against.

use crate::application::{
    LoginError, PhotoUpload, ProducerService, ProductEntry, ProfileError, RegisterError,
    Registration,
};
use crate::domain::entities::{Producer, Product, ProfileUpdate};
use crate::domain::value_objects::ProducerId;
use axum::extract::{DefaultBodyLimit, FromRequest, Multipart, Path, Request, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

/// Generous cap so multipart photo uploads fit.
const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

const MSG_MISSING_FIELDS: &str = "Faltam campos obrigatórios.";
const MSG_EMPTY_PRODUCTS: &str = "A lista de produtos está vazia.";
const MSG_ADDRESS_NOT_FOUND: &str =
    "Morada não encontrada. Tente um endereço mais específico e inclua a localidade.";
const MSG_GEOCODER_DOWN: &str = "Erro no serviço de mapas (Geocodificação). Tente mais tarde.";
const MSG_REGISTERED: &str = "Produtor registado e adicionado ao mapa!";
const MSG_INTERNAL: &str = "Erro interno do servidor.";
const MSG_BAD_LOGIN: &str = "Dados de acesso incorretos.";
const MSG_NOT_FOUND: &str = "Produtor não encontrado.";

/// JSON registration request.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    pub nome: String,
    pub morada: String,
    pub telefone: String,
    #[serde(default)]
    pub produtos: Vec<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// Login request.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// A product in an update payload: either a bare name or a structured
/// entry, depending on what the frontend revision sends.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ProdutoPayload {
    Nome(String),
    Detalhado {
        nome: String,
        #[serde(default)]
        foto_url: String,
    },
}

impl ProdutoPayload {
    fn into_product(self) -> Product {
        match self {
            ProdutoPayload::Nome(nome) => Product::named(nome),
            ProdutoPayload::Detalhado { nome, foto_url } => Product::with_photo(nome, foto_url),
        }
    }
}

/// Profile update request; overwrites the mutable field subset.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateProfileRequest {
    pub id: String,
    pub nome: String,
    pub telefone: String,
    #[serde(default)]
    pub produtos: Vec<ProdutoPayload>,
    #[serde(default = "default_disponivel")]
    pub disponivel: bool,
    #[serde(default)]
    pub foto: Option<String>,
}

fn default_disponivel() -> bool {
    true
}

/// Generic status/message response.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: String,
    pub mensagem: String,
}

/// Successful registration response.
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub status: String,
    pub mensagem: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// One product in a listing or profile response.
#[derive(Debug, Serialize)]
pub struct ProdutoJson {
    pub nome: String,
    pub foto_url: String,
}

/// One map marker in the listing response.
#[derive(Debug, Serialize)]
pub struct LocationResponse {
    pub id: String,
    pub nome: String,
    pub lat: f64,
    pub lng: f64,
    pub produtos: Vec<ProdutoJson>,
    pub morada: String,
    pub telefone: String,
}

/// Successful login response.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub status: String,
    pub id: String,
    pub nome: String,
}

/// Own-profile response. The stored password is never echoed back.
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub id: String,
    pub nome: String,
    pub morada: String,
    pub telefone: String,
    pub produtos: Vec<ProdutoJson>,
    pub latitude: f64,
    pub longitude: f64,
    pub email: Option<String>,
    pub disponivel: bool,
    pub foto: Option<String>,
}

/// Health response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub backend: String,
}

/// API server state: the service plus the name of the backend selected at
/// startup (logged and exposed on /health, never in the API payloads).
#[derive(Clone)]
pub struct ApiState {
    pub service: Arc<ProducerService>,
    pub backend: String,
}

impl ApiState {
    pub fn new(service: Arc<ProducerService>, backend: impl Into<String>) -> Self {
        Self {
            service,
            backend: backend.into(),
        }
    }
}

/// Build the application router.
pub fn router(state: ApiState, request_timeout: Duration) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/produtores/registar", post(register_handler))
        .route("/api/produtores/localizacao", get(list_handler))
        .route("/api/produtores/login", post(login_handler))
        .route("/api/produtores/meus_dados/:id", get(profile_handler))
        .route("/api/produtores/atualizar_perfil", post(update_profile_handler))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TimeoutLayer::new(request_timeout))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Producer API server.
pub struct ApiServer {
    listen_addr: String,
    state: ApiState,
    request_timeout: Duration,
}

impl ApiServer {
    pub fn new(listen_addr: String, state: ApiState, request_timeout: Duration) -> Self {
        Self {
            listen_addr,
            state,
            request_timeout,
        }
    }

    /// Run the API server.
    pub async fn run(&self) -> anyhow::Result<()> {
        let app = router(self.state.clone(), self.request_timeout);

        let listener = TcpListener::bind(&self.listen_addr).await?;
        tracing::info!("producer API listening on {}", self.listen_addr);

        axum::serve(listener, app).await?;
        Ok(())
    }
}

// Handler functions

async fn health_handler(State(state): State<ApiState>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        backend: state.backend.clone(),
    })
}

async fn register_handler(State(state): State<ApiState>, req: Request) -> Response {
    let registration = match parse_registration(req).await {
        Ok(registration) => registration,
        Err(rejection) => return rejection,
    };

    match state.service.register(registration).await {
        Ok(registered) => (
            StatusCode::CREATED,
            Json(RegisterResponse {
                status: "sucesso".to_string(),
                mensagem: MSG_REGISTERED.to_string(),
                latitude: registered.coordinates.latitude,
                longitude: registered.coordinates.longitude,
            }),
        )
            .into_response(),
        Err(RegisterError::MissingFields) => erro(StatusCode::BAD_REQUEST, MSG_MISSING_FIELDS),
        Err(RegisterError::NoProducts) => erro(StatusCode::BAD_REQUEST, MSG_EMPTY_PRODUCTS),
        Err(RegisterError::AddressNotFound) => {
            erro(StatusCode::BAD_REQUEST, MSG_ADDRESS_NOT_FOUND)
        }
        Err(RegisterError::GeocoderUnavailable) => {
            erro(StatusCode::INTERNAL_SERVER_ERROR, MSG_GEOCODER_DOWN)
        }
        Err(RegisterError::Store(e)) => {
            tracing::error!("registration write failed: {}", e);
            erro(StatusCode::INTERNAL_SERVER_ERROR, MSG_INTERNAL)
        }
    }
}

async fn list_handler(State(state): State<ApiState>) -> Response {
    match state.service.list().await {
        Ok(producers) => {
            let locations: Vec<LocationResponse> =
                producers.into_iter().map(location_from).collect();
            Json(locations).into_response()
        }
        Err(e) => {
            tracing::error!("listing producers failed: {}", e);
            erro(StatusCode::INTERNAL_SERVER_ERROR, MSG_INTERNAL)
        }
    }
}

async fn login_handler(
    State(state): State<ApiState>,
    Json(login): Json<LoginRequest>,
) -> Response {
    match state.service.login(&login.email, &login.password).await {
        Ok(producer) => Json(LoginResponse {
            status: "sucesso".to_string(),
            id: producer.id.to_string(),
            nome: producer.name,
        })
        .into_response(),
        Err(LoginError::InvalidCredentials) => erro(StatusCode::UNAUTHORIZED, MSG_BAD_LOGIN),
        Err(LoginError::Store(e)) => {
            tracing::error!("login lookup failed: {}", e);
            erro(StatusCode::INTERNAL_SERVER_ERROR, MSG_INTERNAL)
        }
    }
}

async fn profile_handler(State(state): State<ApiState>, Path(id): Path<String>) -> Response {
    match state.service.get_profile(&ProducerId::new(id)).await {
        Ok(producer) => Json(profile_from(producer)).into_response(),
        Err(ProfileError::NotFound) => erro(StatusCode::NOT_FOUND, MSG_NOT_FOUND),
        Err(ProfileError::Store(e)) => {
            tracing::error!("profile fetch failed: {}", e);
            erro(StatusCode::INTERNAL_SERVER_ERROR, MSG_INTERNAL)
        }
    }
}

async fn update_profile_handler(
    State(state): State<ApiState>,
    Json(update): Json<UpdateProfileRequest>,
) -> Response {
    let id = ProducerId::new(update.id);
    let fields = ProfileUpdate {
        name: update.nome,
        phone: update.telefone,
        products: update
            .produtos
            .into_iter()
            .map(ProdutoPayload::into_product)
            .collect(),
        available: update.disponivel,
        photo: update.foto,
    };

    match state.service.update_profile(&id, fields).await {
        Ok(()) => Json(serde_json::json!({"status": "sucesso"})).into_response(),
        Err(ProfileError::NotFound) => erro(StatusCode::NOT_FOUND, MSG_NOT_FOUND),
        Err(ProfileError::Store(e)) => {
            tracing::error!("profile update failed: {}", e);
            erro(StatusCode::INTERNAL_SERVER_ERROR, MSG_INTERNAL)
        }
    }
}

// Request parsing

/// Accept either a JSON body or a multipart form (the photo-capable
/// variant) on the registration route.
async fn parse_registration(req: Request) -> Result<Registration, Response> {
    let content_type = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();

    if content_type.starts_with("multipart/form-data") {
        let multipart = Multipart::from_request(req, &())
            .await
            .map_err(|_| erro(StatusCode::BAD_REQUEST, MSG_MISSING_FIELDS))?;
        parse_multipart_registration(multipart).await
    } else {
        let Json(body) = Json::<RegisterRequest>::from_request(req, &())
            .await
            .map_err(|_| erro(StatusCode::BAD_REQUEST, MSG_MISSING_FIELDS))?;
        Ok(registration_from_json(body))
    }
}

fn registration_from_json(body: RegisterRequest) -> Registration {
    Registration {
        name: body.nome,
        address: body.morada,
        phone: body.telefone,
        products: body.produtos.into_iter().map(ProductEntry::named).collect(),
        email: body.email,
        password: body.password,
    }
}

/// Multipart layout: text fields `nome`, `morada`, `telefone`, optional
/// `email`/`password`, `nomes_produtos` as a JSON array of names, and
/// file fields `file_0…file_n` indexed against that array.
async fn parse_multipart_registration(mut multipart: Multipart) -> Result<Registration, Response> {
    let bad_request = || erro(StatusCode::BAD_REQUEST, MSG_MISSING_FIELDS);

    let mut nome = String::new();
    let mut morada = String::new();
    let mut telefone = String::new();
    let mut email = None;
    let mut password = None;
    let mut product_names: Vec<String> = Vec::new();
    let mut photos: HashMap<usize, PhotoUpload> = HashMap::new();

    while let Some(field) = multipart.next_field().await.map_err(|_| bad_request())? {
        let Some(field_name) = field.name().map(str::to_string) else {
            continue;
        };
        match field_name.as_str() {
            "nome" => nome = field.text().await.map_err(|_| bad_request())?,
            "morada" => morada = field.text().await.map_err(|_| bad_request())?,
            "telefone" => telefone = field.text().await.map_err(|_| bad_request())?,
            "email" => email = Some(field.text().await.map_err(|_| bad_request())?),
            "password" => password = Some(field.text().await.map_err(|_| bad_request())?),
            "nomes_produtos" => {
                let raw = field.text().await.map_err(|_| bad_request())?;
                product_names = serde_json::from_str(&raw).map_err(|_| bad_request())?;
            }
            other => match parse_file_index(other) {
                Some(index) => {
                    let filename = field.file_name().unwrap_or("foto").to_string();
                    let bytes = field.bytes().await.map_err(|_| bad_request())?.to_vec();
                    photos.insert(index, PhotoUpload { filename, bytes });
                }
                None => return Err(bad_request()),
            },
        }
    }

    let products = product_names
        .into_iter()
        .enumerate()
        .map(|(index, name)| ProductEntry {
            name,
            photo: photos.remove(&index),
        })
        .collect();

    Ok(Registration {
        name: nome,
        address: morada,
        phone: telefone,
        products,
        email: email.filter(|e| !e.is_empty()),
        password: password.filter(|p| !p.is_empty()),
    })
}

fn parse_file_index(field_name: &str) -> Option<usize> {
    field_name.strip_prefix("file_")?.parse().ok()
}

// Response assembly

fn erro(status: StatusCode, mensagem: &str) -> Response {
    (
        status,
        Json(StatusResponse {
            status: "erro".to_string(),
            mensagem: mensagem.to_string(),
        }),
    )
        .into_response()
}

fn produtos_json(products: Vec<Product>) -> Vec<ProdutoJson> {
    products
        .into_iter()
        .map(|p| ProdutoJson {
            nome: p.name,
            foto_url: p.photo_url,
        })
        .collect()
}

fn location_from(producer: Producer) -> LocationResponse {
    LocationResponse {
        id: producer.id.to_string(),
        nome: producer.name,
        lat: producer.coordinates.latitude,
        lng: producer.coordinates.longitude,
        produtos: produtos_json(producer.products),
        morada: producer.address,
        telefone: producer.phone,
    }
}

fn profile_from(producer: Producer) -> ProfileResponse {
    ProfileResponse {
        id: producer.id.to_string(),
        nome: producer.name,
        morada: producer.address,
        telefone: producer.phone,
        produtos: produtos_json(producer.products),
        latitude: producer.coordinates.latitude,
        longitude: producer.coordinates.longitude,
        email: producer.email,
        disponivel: producer.available,
        foto: producer.photo,
    }
}
