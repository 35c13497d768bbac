//! Product catalog

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::fetch::ApiClient;

pub const COMBO_PLATFORM: &str = "Combo Plan";

/// Listed price is shown against a reference price three times higher
const ORIGINAL_PRICE_FACTOR: f64 = 3.0;

/// A product as the server returns it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub platform_name: String,
    pub plan_name: String,
    pub price: f64,
    pub duration_days: u32,
    #[serde(default)]
    pub stock: i64,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductsResponse {
    #[serde(default)]
    pub products: Vec<Product>,
}

/// A product shaped for browsing and purchase
#[derive(Debug, Clone, PartialEq)]
pub struct Plan {
    pub id: String,
    pub platform: String,
    pub name: String,
    pub duration_months: u32,
    pub original_price: f64,
    pub discounted_price: f64,
    pub features: Vec<String>,
    pub is_combo: bool,
    pub popular: bool,
}

impl Plan {
    /// `(original - discounted) / original * 100`; zero when there is no
    /// reference price
    pub fn savings_percent(&self) -> f64 {
        if self.original_price <= 0.0 {
            return 0.0;
        }
        (self.original_price - self.discounted_price) / self.original_price * 100.0
    }

    pub fn is_youtube(&self) -> bool {
        self.platform.to_lowercase().contains("youtube")
    }
}

impl From<&Product> for Plan {
    fn from(product: &Product) -> Self {
        let features = product
            .description
            .as_deref()
            .unwrap_or("")
            .split('•')
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .map(str::to_string)
            .collect();

        Self {
            id: product.id.clone(),
            platform: product.platform_name.clone(),
            name: product.plan_name.clone(),
            duration_months: product.duration_days / 30,
            original_price: product.price * ORIGINAL_PRICE_FACTOR,
            discounted_price: product.price,
            features,
            is_combo: product.platform_name == COMBO_PLATFORM,
            popular: product.is_active && product.stock > 0,
        }
    }
}

/// Turn the product list into plans, combo plans first, otherwise in server
/// order
pub fn build_catalog(products: &[Product]) -> Vec<Plan> {
    let mut plans: Vec<Plan> = products.iter().map(Plan::from).collect();
    plans.sort_by_key(|plan| !plan.is_combo);
    plans
}

/// Client for the `/products` endpoints
#[derive(Clone)]
pub struct ProductsClient {
    api: ApiClient,
}

impl ProductsClient {
    pub(crate) fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn list(&self) -> Result<Vec<Product>> {
        let response: ProductsResponse = self.api.get("/products")?.execute().await?;
        Ok(response.products)
    }

    pub async fn get(&self, product_id: &str) -> Result<Product> {
        self.api
            .get("/products")?
            .segment(product_id)
            .execute()
            .await
    }
}
