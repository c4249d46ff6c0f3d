use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(ExhibitorId);
id_newtype!(ProductId);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub id: i64,
    pub street: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Director {
    pub id: i64,
    pub name: String,
    pub email: String,
}

/// Single point of contact for an exhibitor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spoc {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub position: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevenueInfo {
    pub id: i64,
    pub revenue_bracket: String,
    pub user_impact: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundingInfo {
    pub id: i64,
    pub funding_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductImage {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub stage: Option<String>,
    pub product_type: Option<String>,
    pub price: Option<f64>,
    pub quantity: Option<u32>,
    pub images: Vec<ProductImage>,
    pub tags: Vec<String>,
    pub users: Vec<String>,
}

impl Product {
    /// Product with only the identity fields set; everything optional is empty.
    pub fn titled(id: ProductId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            description: None,
            category: None,
            stage: None,
            product_type: None,
            price: None,
            quantity: None,
            images: Vec::new(),
            tags: Vec::new(),
            users: Vec::new(),
        }
    }

    pub fn stock(&self) -> u32 {
        self.quantity.unwrap_or(0)
    }
}

/// Canonical exhibitor record. Both wire shapes served by the backend are
/// converted into this type by [`crate::protocol::decode_exhibitor_list`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExhibitorRecord {
    pub id: ExhibitorId,
    pub name: String,
    pub banner: String,
    pub logo: String,
    pub website_url: String,
    pub pitch_deck: String,
    pub certification_number: String,
    pub address: Option<Address>,
    pub director: Option<Director>,
    pub spoc: Option<Spoc>,
    pub revenue: Option<RevenueInfo>,
    pub funding: Option<FundingInfo>,
    pub products: Vec<Product>,
}

impl ExhibitorRecord {
    pub fn product(&self, product_id: ProductId) -> Option<&Product> {
        self.products.iter().find(|p| p.id == product_id)
    }
}
