//! HTTP integration tests.
//!
//! Each test builds the full router over an in-memory database and a
//! temporary upload directory, then drives it with `oneshot`.

use std::io::Cursor;

use axum::body::{self, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use image::{GrayImage, ImageFormat, Luma};
use qrcode::{Color, QrCode};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use ims_api::{router, AppState, ServerConfig};
use ims_core::{NewProduct, StockUpdatePolicy};
use ims_db::{Database, DbConfig};

const WIDGET_LABEL: &str = r#"{"category_id": 1, "brand_id": 1, "name": "Widget", "model": "W1",
    "description": "d", "quantity": 10, "unit": "ea", "base_price": 5.0, "tax": 0.1,
    "min_order": 1, "supplier": 2, "status": "active"}"#;

const BOUNDARY: &str = "----ims-test-boundary";

// =============================================================================
// Harness
// =============================================================================

struct TestApp {
    app: Router,
    state: AppState,
    db: Database,
    uploads: TempDir,
}

impl TestApp {
    async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    async fn with_config(tweak: impl FnOnce(&mut ServerConfig)) -> Self {
        let uploads = TempDir::new().unwrap();
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let mut config = ServerConfig {
            upload_dir: uploads.path().to_path_buf(),
            ..Default::default()
        };
        tweak(&mut config);

        let state = AppState::new(db.clone(), config).await.unwrap();
        TestApp {
            app: router(state.clone()),
            state,
            db,
            uploads,
        }
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Request::get(uri).body(Body::empty()).unwrap())
            .await
    }

    async fn post_json(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    async fn upload(&self, field: &str, bytes: &[u8]) -> (StatusCode, Value) {
        let request = Request::post("/api/add_product")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(multipart_body(field, "label.png", bytes)))
            .unwrap();
        self.send(request).await
    }

    /// Inserts a product directly, returning its id.
    async fn seed(&self, name: &str, quantity: i64) -> i64 {
        self.db
            .products()
            .create_with_receipt(&product(name, quantity))
            .await
            .unwrap()
            .product_id
    }

    async fn stock(&self, pid: i64) -> i64 {
        self.db.products().stock_of(pid).await.unwrap().unwrap()
    }
}

fn product(name: &str, quantity: i64) -> NewProduct {
    NewProduct {
        category_id: 1,
        brand_id: 1,
        name: name.to_string(),
        model: "M1".to_string(),
        description: format!("{name} description"),
        quantity,
        unit: "ea".to_string(),
        base_price: 5.0,
        tax: 0.1,
        min_order: 1,
        supplier: 2,
        status: "active".to_string(),
    }
}

fn multipart_body(field: &str, filename: &str, bytes: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: image/png\r\n\r\n");
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn png(image: &GrayImage) -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    image.write_to(&mut out, ImageFormat::Png).unwrap();
    out.into_inner()
}

fn qr_png(text: &str) -> Vec<u8> {
    let code = QrCode::new(text.as_bytes()).unwrap();
    let modules = code.width();
    let colors = code.to_colors();
    let scale = 4;
    let quiet = 4;
    let side = ((modules + 2 * quiet) * scale) as u32;

    let image = GrayImage::from_fn(side, side, |x, y| {
        let mx = (x as usize / scale).checked_sub(quiet);
        let my = (y as usize / scale).checked_sub(quiet);
        match (mx, my) {
            (Some(mx), Some(my)) if mx < modules && my < modules => {
                match colors[my * modules + mx] {
                    Color::Dark => Luma([0]),
                    Color::Light => Luma([255]),
                }
            }
            _ => Luma([255]),
        }
    });
    png(&image)
}

// =============================================================================
// Products & Inventory
// =============================================================================

#[tokio::test]
async fn test_list_products_empty() {
    let app = TestApp::new().await;

    let (status, body) = app.get("/api/products").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_list_products_projection() {
    let app = TestApp::new().await;
    let pid = app.seed("Bolt", 7).await;

    let (status, body) = app.get("/api/products").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!([{
            "pid": pid,
            "description": "Bolt description",
            "pname": "Bolt",
            "base_price": 5.0,
            "quantity": 7
        }])
    );
}

#[tokio::test]
async fn test_inventory_reconciles_received_and_shipped() {
    let app = TestApp::new().await;
    let pid = app.seed("Bolt", 10).await;

    let (status, _) = app
        .post_json("/api/add_order", json!({"cart": [{"id": pid, "quantity": 3}]}))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app.get("/api/inventory").await;
    assert_eq!(status, StatusCode::OK);

    let row = &body[0];
    assert_eq!(row["pid"], json!(pid));
    assert_eq!(row["product_name"], json!("Bolt"));
    assert_eq!(row["starting_inventory"], json!(7));
    assert_eq!(row["inventory_received"], json!(10));
    assert_eq!(row["inventory_shipped"], json!(3));
    assert_eq!(row["inventory_on_hand"], json!(14));
}

#[tokio::test]
async fn test_inventory_empty_catalog() {
    let app = TestApp::new().await;

    let (status, body) = app.get("/api/inventory").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

// =============================================================================
// Orders
// =============================================================================

#[tokio::test]
async fn test_add_order_decrements_stock() {
    let app = TestApp::new().await;
    let pid = app.seed("Bolt", 10).await;

    let (status, body) = app
        .post_json("/api/add_order", json!({"cart": [{"id": pid, "quantity": 4}]}))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], json!("success"));
    assert_eq!(body["message"], json!("Order placed successfully."));
    assert_eq!(body["order_ids"].as_array().unwrap().len(), 1);
    assert_eq!(app.stock(pid).await, 6);
    assert_eq!(app.db.orders().count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_add_order_unknown_product_is_404_and_changes_nothing() {
    let app = TestApp::new().await;
    let pid = app.seed("Bolt", 10).await;

    let (status, body) = app
        .post_json(
            "/api/add_order",
            json!({"cart": [{"id": pid, "quantity": 1}, {"id": 999, "quantity": 1}]}),
        )
        .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        body,
        json!({"status": "error", "message": "Product ID 999 not found."})
    );
    assert_eq!(app.stock(pid).await, 10);
    assert_eq!(app.db.orders().count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_add_order_insufficient_stock() {
    let app = TestApp::new().await;
    let pid = app.seed("Bolt", 2).await;

    let (status, body) = app
        .post_json("/api/add_order", json!({"cart": [{"id": pid, "quantity": 3}]}))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["message"],
        json!(format!("Not enough stock for product ID {pid}."))
    );
    assert_eq!(app.stock(pid).await, 2);
}

#[tokio::test]
async fn test_add_order_empty_cart() {
    let app = TestApp::new().await;

    let (status, body) = app.post_json("/api/add_order", json!({"cart": []})).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], json!("Cart is empty."));
}

#[tokio::test]
async fn test_malformed_json_is_400() {
    let app = TestApp::new().await;

    let request = Request::post("/api/add_order")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"cart\": [oops"))
        .unwrap();
    let (status, body) = app.send(request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], json!("error"));
}

#[tokio::test]
async fn test_update_stock_cart_form() {
    let app = TestApp::new().await;
    let pid = app.seed("Bolt", 5).await;

    let (status, body) = app
        .post_json("/api/update_stock", json!({"cart": [{"id": pid, "quantity": 5}]}))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], json!("Stock updated successfully."));
    assert_eq!(app.stock(pid).await, 0);
}

#[tokio::test]
async fn test_update_stock_without_lines_is_empty_cart() {
    let app = TestApp::new().await;

    let (status, body) = app.post_json("/api/update_stock", json!({})).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], json!("Cart is empty."));
}

#[tokio::test]
async fn test_update_stock_products_form_lenient() {
    let app = TestApp::new().await;
    let pid = app.seed("Bolt", 5).await;

    let (status, body) = app
        .post_json(
            "/api/update_stock",
            json!({"products": [
                {"product_id": pid, "quantity": 2},
                {"product_id": 999, "quantity": 1},
                {"quantity": 1}
            ]}),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["applied"], json!(1));
    assert_eq!(body["skipped"], json!(2));
    assert_eq!(app.stock(pid).await, 3);
}

#[tokio::test]
async fn test_update_stock_products_form_strict() {
    let app = TestApp::with_config(|c| c.stock_update_policy = StockUpdatePolicy::Strict).await;
    let pid = app.seed("Bolt", 5).await;

    let (status, _) = app
        .post_json(
            "/api/update_stock",
            json!({"products": [
                {"product_id": pid, "quantity": 2},
                {"product_id": 999, "quantity": 1}
            ]}),
        )
        .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(app.stock(pid).await, 5);
}

// =============================================================================
// QR Ingestion
// =============================================================================

#[tokio::test]
async fn test_add_product_from_qr_label() {
    let app = TestApp::new().await;

    let (status, body) = app.upload("qr_code", &qr_png(WIDGET_LABEL)).await;

    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["status"], json!("success"));
    assert_eq!(body["purchase_quantity"], json!(10));
    assert_eq!(body["product"]["name"], json!("Widget"));

    let pid = body["product_id"].as_i64().unwrap();
    assert_eq!(app.db.products().count().await.unwrap(), 1);

    let product = app.state.catalog.get_product(pid).await.unwrap();
    assert_eq!(product.pname, "Widget");
    assert_eq!(product.quantity, 10);
    assert_eq!(product.minimum_order, 1);

    let purchases = app.db.purchases();
    let receipts = purchases.list_for_product(pid).await.unwrap();
    assert_eq!(receipts.len(), 1);
    assert_eq!(receipts[0].quantity, 10);
    assert_eq!(receipts[0].supplier_id, 2);

    // A second initial receipt for the same product is refused.
    assert!(!app
        .state
        .catalog
        .record_initial_receipt(pid, 2, 10)
        .await
        .unwrap());
    assert_eq!(purchases.count_for_product(pid).await.unwrap(), 1);

    // The image is kept under its content hash.
    let stored: Vec<_> = std::fs::read_dir(app.uploads.path()).unwrap().collect();
    assert_eq!(stored.len(), 1);
}

#[tokio::test]
async fn test_add_product_same_label_twice() {
    let app = TestApp::new().await;
    let label = qr_png(WIDGET_LABEL);

    let (first, a) = app.upload("qr_code", &label).await;
    let (second, b) = app.upload("qr_code", &label).await;

    assert_eq!(first, StatusCode::OK);
    assert_eq!(second, StatusCode::OK);
    assert_ne!(a["product_id"], b["product_id"]);
    assert_eq!(app.db.products().count().await.unwrap(), 2);
    assert_eq!(app.db.purchases().count().await.unwrap(), 2);

    let stored: Vec<_> = std::fs::read_dir(app.uploads.path()).unwrap().collect();
    assert_eq!(stored.len(), 1);
}

#[tokio::test]
async fn test_get_unknown_product_is_not_found() {
    let app = TestApp::new().await;

    let err = app.state.catalog.get_product(42).await.unwrap_err();

    assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_add_product_blank_image_creates_nothing() {
    let app = TestApp::new().await;
    let blank = png(&GrayImage::from_pixel(64, 64, Luma([255])));

    let (status, body) = app.upload("qr_code", &blank).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({"status": "error", "message": "QR code not detected"})
    );
    assert_eq!(app.db.products().count().await.unwrap(), 0);
    assert_eq!(app.db.purchases().count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_add_product_invalid_payload() {
    let app = TestApp::new().await;

    let (status, body) = app.upload("qr_code", &qr_png("hello there")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"]
        .as_str()
        .unwrap()
        .starts_with("Invalid QR payload"));
    assert_eq!(app.db.products().count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_add_product_missing_file() {
    let app = TestApp::new().await;

    let (status, body) = app.upload("picture", &qr_png(WIDGET_LABEL)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["message"],
        json!("No file uploaded in field 'qr_code'.")
    );
}

#[tokio::test]
async fn test_add_product_over_body_limit() {
    let app = TestApp::with_config(|c| c.max_upload_bytes = 1024).await;
    let big = vec![0u8; 4096];

    let (status, body) = app.upload("qr_code", &big).await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body["status"], json!("error"));
    assert_eq!(app.db.products().count().await.unwrap(), 0);
}

// =============================================================================
// Cross-cutting
// =============================================================================

#[tokio::test]
async fn test_cors_allows_any_origin() {
    let app = TestApp::new().await;

    let request = Request::get("/api/products")
        .header(header::ORIGIN, "http://shop.example")
        .body(Body::empty())
        .unwrap();
    let response = app.app.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "*"
    );
}

#[tokio::test]
async fn test_cors_preflight() {
    let app = TestApp::new().await;

    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/add_order")
        .header(header::ORIGIN, "http://shop.example")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
        .body(Body::empty())
        .unwrap();
    let response = app.app.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response
        .headers()
        .contains_key(header::ACCESS_CONTROL_ALLOW_METHODS));
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::new().await;

    let (status, body) = app.get("/api/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], json!("ok"));
    assert_eq!(body["database"], json!("ok"));
    assert_eq!(body["migrations_applied"], body["migrations_total"]);

    let mut keys: Vec<&str> = body.as_object().unwrap().keys().map(String::as_str).collect();
    keys.sort_unstable();
    assert_eq!(
        keys,
        ["database", "migrations_applied", "migrations_total", "status"]
    );
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let app = TestApp::new().await;

    let (status, _) = app.get("/api/nope").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}
