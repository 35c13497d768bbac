//! Orders

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::Result;
use crate::fetch::ApiClient;

/// An order; a completed one points at the subscription it created
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub product_id: Option<String>,
    #[serde(default)]
    pub product_name: Option<String>,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub subscription_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub paid_at: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrdersResponse {
    #[serde(default)]
    pub orders: Vec<Order>,
}

/// Client for the `/orders` endpoints
#[derive(Clone)]
pub struct OrdersClient {
    api: ApiClient,
}

impl OrdersClient {
    pub(crate) fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Place an order. The server checks and deducts the balance and creates
    /// the subscription; this is a single call and is never retried.
    pub async fn create(&self, product_id: &str) -> Result<Order> {
        self.api
            .post("/orders/")?
            .json(&json!({ "product_id": product_id }))?
            .execute()
            .await
    }

    pub async fn my_orders(&self) -> Result<Vec<Order>> {
        let response: OrdersResponse = self.api.get("/orders/my-orders")?.execute().await?;
        Ok(response.orders)
    }

    pub async fn get(&self, order_id: &str) -> Result<Order> {
        self.api
            .get("/orders")?
            .segment(order_id)
            .execute()
            .await
    }
}
