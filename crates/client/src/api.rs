//! REST API client for the inventory backend.
//!
//! Wraps the product, owner and stock endpoints using [`reqwest`]. Every
//! response carries a `{ success, message? }` envelope (the stock ledger
//! reads omit `success`); a `success: false` or non-2xx answer becomes
//! [`ApiError::Rejected`] carrying the server's message.

use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use stockroom_core::owner::{Owner, OwnerDraft};
use stockroom_core::product::{Product, ProductDraft};
use stockroom_core::stock::{Direction, StockMovement, StockMovementDraft};

use crate::config::ClientConfig;
use crate::error::ApiError;

/// HTTP client for one inventory API deployment.
pub struct InventoryApi {
    client: reqwest::Client,
    api_url: String,
}

/// The status part of every response envelope.
#[derive(Debug, Default, Deserialize)]
struct Status {
    #[serde(default)]
    success: Option<bool>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Deserialize)]
struct ProductsPayload {
    products: Vec<Product>,
}

#[derive(Deserialize)]
struct ProductPayload {
    #[serde(default)]
    product: Option<Product>,
}

#[derive(Deserialize)]
struct OwnersPayload {
    owners: Vec<Owner>,
}

#[derive(Deserialize)]
struct StockInsPayload {
    #[serde(rename = "stockIns")]
    stock_ins: Vec<StockMovement>,
}

#[derive(Deserialize)]
struct StockOutsPayload {
    #[serde(rename = "stockOuts")]
    stock_outs: Vec<StockMovement>,
}

impl InventoryApi {
    /// Create a client for the configured API with the configured timeout.
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self::with_client(client, config.api_url.clone()))
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, api_url: String) -> Self {
        Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    // ---- products ----

    /// `GET /api/products`
    pub async fn list_products(&self) -> Result<Vec<Product>, ApiError> {
        let response = self.client.get(self.url("/api/products")).send().await?;
        let payload: ProductsPayload = Self::parse_response(response).await?;
        Ok(payload.products)
    }

    /// `GET /api/products/details/{id}`
    pub async fn product(&self, id: &str) -> Result<Product, ApiError> {
        let response = self
            .client
            .get(self.url(&format!("/api/products/details/{id}")))
            .send()
            .await?;
        let payload: ProductPayload = Self::parse_response(response).await?;
        payload.product.ok_or_else(|| ApiError::Rejected {
            status: 404,
            message: "Product not found".to_string(),
        })
    }

    /// `GET /api/products/byowner/{owner_id}`
    pub async fn products_by_owner(&self, owner_id: &str) -> Result<Vec<Product>, ApiError> {
        let response = self
            .client
            .get(self.url(&format!("/api/products/byowner/{owner_id}")))
            .send()
            .await?;
        let payload: ProductsPayload = Self::parse_response(response).await?;
        Ok(payload.products)
    }

    /// `POST /api/products/create` as multipart form data.
    pub async fn create_product(&self, draft: &ProductDraft) -> Result<(), ApiError> {
        let response = self
            .client
            .post(self.url("/api/products/create"))
            .multipart(product_form(draft)?)
            .send()
            .await?;
        Self::check_ack(response).await
    }

    /// `PUT /api/products/update/{id}` as multipart form data.
    ///
    /// Images listed in `draft.existing_images` are kept; anything the
    /// server stored that is not listed is dropped.
    pub async fn update_product(&self, id: &str, draft: &ProductDraft) -> Result<(), ApiError> {
        let response = self
            .client
            .put(self.url(&format!("/api/products/update/{id}")))
            .multipart(product_form(draft)?)
            .send()
            .await?;
        Self::check_ack(response).await
    }

    /// `DELETE /api/products/delete/{id}`
    pub async fn delete_product(&self, id: &str) -> Result<(), ApiError> {
        let response = self
            .client
            .delete(self.url(&format!("/api/products/delete/{id}")))
            .send()
            .await?;
        Self::check_ack(response).await
    }

    // ---- owners ----

    /// `GET /api/owner/all`
    pub async fn list_owners(&self) -> Result<Vec<Owner>, ApiError> {
        let response = self.client.get(self.url("/api/owner/all")).send().await?;
        let payload: OwnersPayload = Self::parse_response(response).await?;
        Ok(payload.owners)
    }

    /// `POST /api/owner/create`
    pub async fn create_owner(&self, draft: &OwnerDraft) -> Result<(), ApiError> {
        let response = self
            .client
            .post(self.url("/api/owner/create"))
            .json(draft)
            .send()
            .await?;
        Self::check_ack(response).await
    }

    /// `DELETE /api/owner/deleted/{id}`
    pub async fn delete_owner(&self, id: &str) -> Result<(), ApiError> {
        let response = self
            .client
            .delete(self.url(&format!("/api/owner/deleted/{id}")))
            .send()
            .await?;
        Self::check_ack(response).await
    }

    // ---- stock ----

    /// Read one side of the stock ledger.
    ///
    /// `In` reads `GET /api/stock/all`, `Out` reads
    /// `GET /api/stock/allStockOut`. Each entry is stamped with the
    /// direction of the endpoint it came from.
    pub async fn stock_movements(&self, direction: Direction) -> Result<Vec<StockMovement>, ApiError> {
        let mut movements = match direction {
            Direction::In => {
                let response = self.client.get(self.url("/api/stock/all")).send().await?;
                Self::parse_response::<StockInsPayload>(response).await?.stock_ins
            }
            Direction::Out => {
                let response = self
                    .client
                    .get(self.url("/api/stock/allStockOut"))
                    .send()
                    .await?;
                Self::parse_response::<StockOutsPayload>(response).await?.stock_outs
            }
        };
        for movement in &mut movements {
            movement.direction = Some(direction);
        }
        Ok(movements)
    }

    /// `GET /api/stock/low?threshold={threshold}`
    ///
    /// The server's own low-stock query. The dashboard derives low stock
    /// from the cached catalog instead; see
    /// [`ListCache::low_stock`](crate::cache::ListCache::low_stock).
    pub async fn low_stock(&self, threshold: u32) -> Result<Vec<Product>, ApiError> {
        let response = self
            .client
            .get(self.url("/api/stock/low"))
            .query(&[("threshold", threshold)])
            .send()
            .await?;
        let payload: ProductsPayload = Self::parse_response(response).await?;
        Ok(payload.products)
    }

    /// `POST /api/stock/in` or `POST /api/stock/out`, by the draft's direction.
    pub async fn record_stock(&self, draft: &StockMovementDraft) -> Result<(), ApiError> {
        let path = match draft.direction {
            Direction::In => "/api/stock/in",
            Direction::Out => "/api/stock/out",
        };
        let response = self.client.post(self.url(path)).json(draft).send().await?;
        Self::check_ack(response).await
    }

    // ---- private helpers ----

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }

    /// Read the body and fail on a non-2xx status or `success: false`.
    async fn read_checked(response: reqwest::Response) -> Result<String, ApiError> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(rejection(status, &body));
        }

        if !body.trim().is_empty() {
            let envelope: Status = serde_json::from_str(&body).unwrap_or_default();
            if envelope.success == Some(false) {
                return Err(ApiError::Rejected {
                    status: status.as_u16(),
                    message: envelope
                        .message
                        .unwrap_or_else(|| "Request was rejected".to_string()),
                });
            }
        }

        Ok(body)
    }

    /// Parse a successful JSON response body into the expected payload.
    async fn parse_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
        let body = Self::read_checked(response).await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Accept a write acknowledgement, discarding the body.
    async fn check_ack(response: reqwest::Response) -> Result<(), ApiError> {
        Self::read_checked(response).await?;
        Ok(())
    }
}

/// Build a rejection from a non-2xx response, preferring the envelope's
/// `message` over the raw body.
fn rejection(status: reqwest::StatusCode, body: &str) -> ApiError {
    let message = serde_json::from_str::<Status>(body)
        .ok()
        .and_then(|s| s.message)
        .or_else(|| {
            let trimmed = body.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        })
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("Request failed")
                .to_string()
        });
    ApiError::Rejected {
        status: status.as_u16(),
        message,
    }
}

/// Multipart body shared by product create and update.
fn product_form(draft: &ProductDraft) -> Result<Form, ApiError> {
    let mut form = Form::new()
        .text("name", draft.name.clone())
        .text("price", draft.price.to_string())
        .text("quantity", draft.quantity.to_string())
        .text("unit", draft.unit.as_str())
        .text("product_quantity", draft.product_quantity.to_string())
        .text("register", draft.register.to_string())
        .text("description", draft.description.clone())
        .text("owner_id", draft.owner_id.clone())
        .text("owner_name", draft.owner_name.clone());

    if let Some(price_bcn) = draft.price_bcn {
        form = form.text("price_BCN", price_bcn.to_string());
    }
    if let Some(expiry) = draft.expiry {
        form = form.text("expiry", expiry.to_string());
    }
    for kept in &draft.existing_images {
        form = form.text("existingImages", kept.clone());
    }
    for image in &draft.images {
        let part = Part::bytes(image.bytes.clone())
            .file_name(image.file_name.clone())
            .mime_str(&image.content_type)?;
        form = form.part("image", part);
    }

    Ok(form)
}
