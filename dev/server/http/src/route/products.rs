use axum::{routing::get, Json, Router};
use serde::{Deserialize, Serialize};

use crate::state::AppState;

pub fn route_products() -> Router<AppState> {
    Router::new().route("/", get(products))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductsResponse {
    pub status: String,
    pub code: u16,
    pub message: String,
    pub data: Vec<Product>,
}
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: u64,
    pub name: String,
    pub stock: u64,
    pub rental_cost: u64,
    pub category: String,
}

/// Fixed catalog, shaped like the API the bundled scenario targets.
#[tracing::instrument]
pub async fn products() -> Json<ProductsResponse> {
    let data = [("Dune", 3, 15000, "novel"), ("Clean Code", 5, 20000, "programming"), ("Sapiens", 0, 18000, "history")]
        .into_iter()
        .zip(1..)
        .map(|((name, stock, rental_cost, category), id)| Product {
            id,
            name: name.to_string(),
            stock,
            rental_cost,
            category: category.to_string(),
        })
        .collect();
    Json(ProductsResponse { status: "Success".to_string(), code: 200, message: "Success Get All Books".to_string(), data })
}
