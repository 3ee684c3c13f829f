//! In-process fake of the inventory API for client integration tests.
//!
//! Serves the same routes and envelopes as the real backend from an
//! in-memory [`Backend`] on `127.0.0.1:<ephemeral>`. Tests reach into the
//! shared state to seed data and to inspect what was written.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use chrono::NaiveDate;
use serde_json::{json, Value};
use stockroom_client::api::InventoryApi;
use stockroom_client::config::ClientConfig;
use stockroom_client::dashboard::Dashboard;
use stockroom_core::owner::Owner;
use stockroom_core::product::{Product, ProductDraft, Unit};
use stockroom_core::stock::{Direction, ProductRef, StockMovement};
use stockroom_core::validation::ImageUpload;

/// A file part received by a multipart endpoint.
#[derive(Debug, Clone)]
pub struct ReceivedFile {
    pub field: String,
    pub file_name: String,
    pub content_type: String,
    pub size: usize,
}

/// Fields of the last multipart product write.
#[derive(Debug, Clone, Default)]
pub struct ReceivedForm {
    pub text: HashMap<String, Vec<String>>,
    pub files: Vec<ReceivedFile>,
}

impl ReceivedForm {
    pub fn first(&self, name: &str) -> Option<&str> {
        self.text.get(name).and_then(|v| v.first()).map(String::as_str)
    }
}

#[derive(Debug, Default)]
pub struct Backend {
    pub products: Vec<Product>,
    pub owners: Vec<Owner>,
    pub stock_ins: Vec<StockMovement>,
    pub stock_outs: Vec<StockMovement>,
    pub last_form: Option<ReceivedForm>,
    /// Every list read answers 500 while set.
    pub fail_reads: bool,
    /// `GET /api/owner/all` answers 200 with a non-JSON body while set.
    pub garbage_owners: bool,
    /// Delay applied to `GET /api/products/byowner/{id}`, keyed by owner id.
    pub owner_delays: HashMap<String, Duration>,
    /// Number of requests served, per route label.
    pub hits: HashMap<&'static str, usize>,
    next_id: u64,
}

impl Backend {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}-{}", self.next_id)
    }

    fn hit(&mut self, route: &'static str) {
        *self.hits.entry(route).or_default() += 1;
    }

    pub fn hits(&self, route: &'static str) -> usize {
        self.hits.get(route).copied().unwrap_or(0)
    }

    pub fn product(&self, id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }
}

pub type Shared = Arc<Mutex<Backend>>;

/// Start the fake backend and return its base URL.
pub async fn spawn(backend: Shared) -> String {
    let app = router(backend);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

/// Start a fake backend and build an API client pointed at it.
pub async fn start() -> (Shared, Arc<InventoryApi>) {
    let backend = Shared::default();
    let url = spawn(backend.clone()).await;
    let api = Arc::new(InventoryApi::with_client(reqwest::Client::new(), url));
    (backend, api)
}

/// Start a fake backend and build a dashboard with the default threshold.
pub async fn start_dashboard() -> (Shared, Dashboard) {
    let (backend, api) = start().await;
    (backend, Dashboard::new(api, 10))
}

/// An API client pointed at a port nothing listens on.
pub async fn unreachable_api() -> Arc<InventoryApi> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let config = ClientConfig {
        api_url: format!("http://{addr}"),
        request_timeout: Duration::from_secs(2),
        ..ClientConfig::default()
    };
    Arc::new(InventoryApi::new(&config).unwrap())
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub fn product(id: &str, name: &str, product_quantity: u32) -> Product {
    Product {
        id: id.into(),
        name: name.into(),
        price: 100.0,
        price_bcn: None,
        quantity: 1.0,
        unit: Some(Unit::Piece),
        product_quantity,
        register: None,
        expiry: None,
        description: "Stocked staple item for the dairy counter".into(),
        owner_id: "own-1".into(),
        owner_name: "Sharma Dairy".into(),
        images: vec![format!("{id}.png")],
    }
}

pub fn owner(id: &str, company_name: &str) -> Owner {
    Owner {
        id: id.into(),
        company_name: company_name.into(),
        owner_name: "R. Sharma".into(),
        phone: "9876543210".into(),
        gst: None,
        register: None,
    }
}

pub fn png(file_name: &str) -> ImageUpload {
    ImageUpload::new(file_name, b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR".to_vec())
}

pub fn product_draft(name: &str, product_quantity: u32) -> ProductDraft {
    ProductDraft {
        name: name.into(),
        price: 550.0,
        price_bcn: Some(520.0),
        quantity: 1.0,
        unit: Unit::Liter,
        product_quantity,
        register: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        expiry: NaiveDate::from_ymd_opt(2024, 9, 1),
        description: "Pure cow ghee from local dairy farms".into(),
        owner_id: "own-1".into(),
        owner_name: "Sharma Dairy".into(),
        existing_images: Vec::new(),
        images: vec![png("ghee.png")],
    }
}

// ---------------------------------------------------------------------------
// Routes
// ---------------------------------------------------------------------------

fn router(backend: Shared) -> Router {
    Router::new()
        .route("/api/products", get(list_products))
        .route("/api/products/details/{id}", get(product_details))
        .route("/api/products/byowner/{id}", get(products_by_owner))
        .route("/api/products/create", post(create_product))
        .route("/api/products/update/{id}", put(update_product))
        .route("/api/products/delete/{id}", delete(delete_product))
        .route("/api/owner/all", get(list_owners))
        .route("/api/owner/create", post(create_owner))
        .route("/api/owner/deleted/{id}", delete(delete_owner))
        .route("/api/stock/all", get(stock_ins))
        .route("/api/stock/allStockOut", get(stock_outs))
        .route("/api/stock/low", get(low_stock))
        .route("/api/stock/in", post(stock_in))
        .route("/api/stock/out", post(stock_out))
        .with_state(backend)
}

fn server_error() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "success": false, "message": "Database unavailable" })),
    )
        .into_response()
}

fn not_found(message: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "success": false, "message": message })),
    )
        .into_response()
}

fn ok(body: Value) -> Response {
    Json(body).into_response()
}

async fn list_products(State(backend): State<Shared>) -> Response {
    let mut b = backend.lock().unwrap();
    b.hit("products");
    if b.fail_reads {
        return server_error();
    }
    ok(json!({ "success": true, "products": b.products }))
}

async fn product_details(State(backend): State<Shared>, Path(id): Path<String>) -> Response {
    let b = backend.lock().unwrap();
    match b.product(&id) {
        Some(product) => ok(json!({ "success": true, "product": product })),
        None => not_found("Product not found"),
    }
}

async fn products_by_owner(State(backend): State<Shared>, Path(id): Path<String>) -> Response {
    let delay = {
        let mut b = backend.lock().unwrap();
        b.hit("byowner");
        b.owner_delays.get(&id).copied()
    };
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }
    let b = backend.lock().unwrap();
    let products: Vec<&Product> = b.products.iter().filter(|p| p.owner_id == id).collect();
    ok(json!({ "success": true, "products": products }))
}

async fn read_form(mut multipart: Multipart) -> ReceivedForm {
    let mut form = ReceivedForm::default();
    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().unwrap_or_default().to_string();
        match field.file_name().map(str::to_string) {
            Some(file_name) => {
                let content_type = field.content_type().unwrap_or_default().to_string();
                let size = field.bytes().await.unwrap().len();
                form.files.push(ReceivedFile {
                    field: name,
                    file_name,
                    content_type,
                    size,
                });
            }
            None => {
                let value = field.text().await.unwrap();
                form.text.entry(name).or_default().push(value);
            }
        }
    }
    form
}

fn product_from_form(id: String, form: &ReceivedForm) -> Product {
    let date = |name: &str| {
        form.first(name)
            .and_then(|d| d.parse::<NaiveDate>().ok())
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|dt| dt.and_utc())
    };
    let mut images: Vec<String> = form.text.get("existingImages").cloned().unwrap_or_default();
    images.extend(form.files.iter().map(|f| f.file_name.clone()));

    Product {
        id,
        name: form.first("name").unwrap_or_default().to_string(),
        price: form.first("price").and_then(|v| v.parse().ok()).unwrap_or_default(),
        price_bcn: form.first("price_BCN").and_then(|v| v.parse().ok()),
        quantity: form.first("quantity").and_then(|v| v.parse().ok()).unwrap_or_default(),
        unit: form
            .first("unit")
            .and_then(|u| serde_json::from_value(Value::String(u.to_string())).ok()),
        product_quantity: form
            .first("product_quantity")
            .and_then(|v| v.parse().ok())
            .unwrap_or_default(),
        register: date("register"),
        expiry: date("expiry"),
        description: form.first("description").unwrap_or_default().to_string(),
        owner_id: form.first("owner_id").unwrap_or_default().to_string(),
        owner_name: form.first("owner_name").unwrap_or_default().to_string(),
        images,
    }
}

async fn create_product(State(backend): State<Shared>, multipart: Multipart) -> Response {
    let form = read_form(multipart).await;
    let mut b = backend.lock().unwrap();
    let id = b.next_id("prod");
    let product = product_from_form(id, &form);
    b.products.push(product);
    b.last_form = Some(form);
    ok(json!({ "success": true, "message": "Product created" }))
}

async fn update_product(
    State(backend): State<Shared>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Response {
    let form = read_form(multipart).await;
    let mut b = backend.lock().unwrap();
    let Some(index) = b.products.iter().position(|p| p.id == id) else {
        return not_found("Product not found");
    };
    b.products[index] = product_from_form(id, &form);
    b.last_form = Some(form);
    ok(json!({ "success": true, "message": "Product updated" }))
}

async fn delete_product(State(backend): State<Shared>, Path(id): Path<String>) -> Response {
    let mut b = backend.lock().unwrap();
    let before = b.products.len();
    b.products.retain(|p| p.id != id);
    if b.products.len() == before {
        return not_found("Product not found");
    }
    ok(json!({ "success": true }))
}

async fn list_owners(State(backend): State<Shared>) -> Response {
    let mut b = backend.lock().unwrap();
    b.hit("owners");
    if b.fail_reads {
        return server_error();
    }
    if b.garbage_owners {
        return (StatusCode::OK, "<html>maintenance</html>").into_response();
    }
    ok(json!({ "success": true, "owners": b.owners }))
}

async fn create_owner(State(backend): State<Shared>, Json(body): Json<Value>) -> Response {
    let mut b = backend.lock().unwrap();
    let phone = body["phone"].as_str().unwrap_or_default().to_string();
    if b.owners.iter().any(|o| o.phone == phone) {
        return ok(json!({ "success": false, "message": "Owner with this phone already exists" }));
    }
    let id = b.next_id("own");
    let register = body["register"]
        .as_str()
        .and_then(|d| d.parse::<NaiveDate>().ok())
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc());
    b.owners.push(Owner {
        id,
        company_name: body["company_name"].as_str().unwrap_or_default().to_string(),
        owner_name: body["owner_name"].as_str().unwrap_or_default().to_string(),
        phone,
        gst: body["gst"].as_str().map(str::to_string),
        register,
    });
    ok(json!({ "success": true, "message": "Owner created" }))
}

async fn delete_owner(State(backend): State<Shared>, Path(id): Path<String>) -> Response {
    let mut b = backend.lock().unwrap();
    let before = b.owners.len();
    b.owners.retain(|o| o.id != id);
    if b.owners.len() == before {
        return not_found("Owner not found");
    }
    ok(json!({ "success": true }))
}

async fn stock_ins(State(backend): State<Shared>) -> Response {
    let mut b = backend.lock().unwrap();
    b.hit("stock_ins");
    if b.fail_reads {
        return server_error();
    }
    ok(json!({ "stockIns": b.stock_ins }))
}

async fn stock_outs(State(backend): State<Shared>) -> Response {
    let mut b = backend.lock().unwrap();
    b.hit("stock_outs");
    if b.fail_reads {
        return server_error();
    }
    ok(json!({ "stockOuts": b.stock_outs }))
}

async fn low_stock(
    State(backend): State<Shared>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let b = backend.lock().unwrap();
    let threshold: u32 = params
        .get("threshold")
        .and_then(|t| t.parse().ok())
        .unwrap_or(10);
    let products: Vec<&Product> = b
        .products
        .iter()
        .filter(|p| p.product_quantity < threshold)
        .collect();
    ok(json!({ "products": products }))
}

async fn stock_in(State(backend): State<Shared>, Json(body): Json<Value>) -> Response {
    record(backend, body, Direction::In)
}

async fn stock_out(State(backend): State<Shared>, Json(body): Json<Value>) -> Response {
    record(backend, body, Direction::Out)
}

/// Item count after a movement; a stock out never takes it below zero.
fn next_level(current: u32, quantity: u32, direction: Direction) -> Result<u32, String> {
    match direction {
        Direction::In => current
            .checked_add(quantity)
            .ok_or_else(|| format!("Stock level overflow adding {quantity}")),
        Direction::Out => current.checked_sub(quantity).ok_or_else(|| {
            format!("Insufficient stock: {current} available, {quantity} requested")
        }),
    }
}

fn record(backend: Shared, body: Value, direction: Direction) -> Response {
    let mut b = backend.lock().unwrap();
    let product_id = body["product_id"].as_str().unwrap_or_default().to_string();
    let quantity = body["quantity"].as_u64().unwrap_or_default() as u32;
    if body["type"].as_str() != Some(direction.as_str()) {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "success": false, "message": "Movement type does not match route" })),
        )
            .into_response();
    }

    let Some(index) = b.products.iter().position(|p| p.id == product_id) else {
        return not_found("Product not found");
    };

    let level = match next_level(b.products[index].product_quantity, quantity, direction) {
        Ok(level) => level,
        Err(message) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "success": false, "message": message })),
            )
                .into_response()
        }
    };
    b.products[index].product_quantity = level;

    let id = b.next_id("mov");
    let movement = StockMovement {
        id,
        product: ProductRef {
            id: product_id,
            name: Some(b.products[index].name.clone()),
        },
        quantity,
        unit: body["unit"]
            .as_str()
            .and_then(|u| serde_json::from_value(Value::String(u.to_string())).ok()),
        note: body["note"].as_str().map(str::to_string),
        date: chrono::Utc::now(),
        direction: None,
    };
    match direction {
        Direction::In => b.stock_ins.push(movement),
        Direction::Out => b.stock_outs.push(movement),
    }
    ok(json!({ "success": true, "message": "Stock updated" }))
}
