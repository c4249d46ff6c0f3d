//! Wire shapes served by the exhibitor backend and the adapter that turns
//! them into canonical [`ExhibitorRecord`] values.
//!
//! The backend has served two incompatible JSON shapes over time. The legacy
//! shape keys identities as `ID` and uses mixed-case nested fields; the
//! current shape is lowercase camelCase with richer product data. Records are
//! routed to a decoder by the identity key they carry, so a single response
//! may mix both shapes.

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use thiserror::Error;

use crate::domain::{
    Address, Director, ExhibitorId, ExhibitorRecord, FundingInfo, Product, ProductId,
    ProductImage, RevenueInfo, Spoc,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireVersion {
    /// `ID` / `websiteURL` / `dpiitCertNumber` shape.
    Legacy,
    /// Lowercase `id`, camelCase fields.
    Current,
}

impl WireVersion {
    pub fn detect(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        if object.contains_key("ID") {
            Some(Self::Legacy)
        } else if object.contains_key("id") {
            Some(Self::Current)
        } else {
            None
        }
    }
}

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("expected a JSON array of exhibitors, found {found}")]
    NotAnArray { found: &'static str },
    #[error("exhibitor at index {index} has no `ID` or `id` field")]
    UnknownShape { index: usize },
    #[error("exhibitor at index {index} is not a valid {version:?} record: {source}")]
    InvalidRecord {
        index: usize,
        version: WireVersion,
        source: serde_json::Error,
    },
}

/// Records decoded from one response body, plus the elements that had to be
/// dropped.
#[derive(Debug, Default)]
pub struct DecodedList {
    pub records: Vec<ExhibitorRecord>,
    pub rejected: Vec<DecodeError>,
}

/// Decodes a response body into canonical records.
///
/// Only a body that is not an array fails. Elements that match neither wire
/// shape are dropped and reported in [`DecodedList::rejected`], so one bad
/// record never discards the rest of the list. An empty array decodes to an
/// empty list.
pub fn decode_exhibitor_list(body: Value) -> Result<DecodedList, DecodeError> {
    let items = match body {
        Value::Array(items) => items,
        other => {
            return Err(DecodeError::NotAnArray {
                found: json_kind(&other),
            })
        }
    };

    let mut decoded = DecodedList::default();
    for (index, item) in items.into_iter().enumerate() {
        match decode_exhibitor(index, item) {
            Ok(record) => decoded.records.push(record),
            Err(err) => decoded.rejected.push(err),
        }
    }
    Ok(decoded)
}

fn decode_exhibitor(index: usize, item: Value) -> Result<ExhibitorRecord, DecodeError> {
    let version = WireVersion::detect(&item).ok_or(DecodeError::UnknownShape { index })?;
    let invalid = |source| DecodeError::InvalidRecord {
        index,
        version,
        source,
    };
    match version {
        WireVersion::Legacy => serde_json::from_value::<LegacyExhibitor>(item)
            .map(Into::into)
            .map_err(invalid),
        WireVersion::Current => serde_json::from_value::<CurrentExhibitor>(item)
            .map(Into::into)
            .map_err(invalid),
    }
}

/// Treats an explicit `null` like a missing key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn split_tags(raw: Option<String>) -> Vec<String> {
    raw.map(|tags| {
        tags.split(',')
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacyExhibitor {
    #[serde(rename = "ID")]
    id: i64,
    name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    banner: String,
    #[serde(default, deserialize_with = "null_as_default")]
    logo: String,
    #[serde(rename = "websiteURL", default, deserialize_with = "null_as_default")]
    website_url: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pitch_deck: String,
    #[serde(default, deserialize_with = "null_as_default")]
    dpiit_cert_number: String,
    address: Option<LegacyAddress>,
    director: Option<LegacyDirector>,
    spoc: Option<LegacySpoc>,
    revenue_info: Option<LegacyRevenueInfo>,
    funding_info: Option<LegacyFundingInfo>,
    #[serde(default, deserialize_with = "null_as_default")]
    products: Vec<LegacyProduct>,
}

#[derive(Debug, Deserialize)]
struct LegacyAddress {
    #[serde(rename = "ID")]
    id: i64,
    street: String,
    city: String,
    state: String,
    pincode: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacyDirector {
    #[serde(rename = "ID")]
    id: i64,
    director_name: String,
    director_email: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct LegacySpoc {
    #[serde(rename = "ID")]
    id: i64,
    name: String,
    email: String,
    phone: String,
    position: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacyRevenueInfo {
    #[serde(rename = "ID")]
    id: i64,
    revenue_bracket: String,
    user_impact: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacyFundingInfo {
    #[serde(rename = "ID")]
    id: i64,
    funding_type: String,
}

#[derive(Debug, Deserialize)]
struct LegacyProduct {
    #[serde(rename = "ID")]
    id: i64,
    title: String,
    description: Option<String>,
}

impl From<LegacyExhibitor> for ExhibitorRecord {
    fn from(wire: LegacyExhibitor) -> Self {
        Self {
            id: ExhibitorId(wire.id),
            name: wire.name,
            banner: wire.banner,
            logo: wire.logo,
            website_url: wire.website_url,
            pitch_deck: wire.pitch_deck,
            certification_number: wire.dpiit_cert_number,
            address: wire.address.map(|a| Address {
                id: a.id,
                street: a.street,
                city: a.city,
                state: a.state,
                pincode: a.pincode,
            }),
            director: wire.director.map(|d| Director {
                id: d.id,
                name: d.director_name,
                email: d.director_email,
            }),
            spoc: wire.spoc.map(|s| Spoc {
                id: s.id,
                name: s.name,
                email: s.email,
                phone: s.phone,
                position: s.position,
            }),
            revenue: wire.revenue_info.map(|r| RevenueInfo {
                id: r.id,
                revenue_bracket: r.revenue_bracket,
                user_impact: r.user_impact,
            }),
            funding: wire.funding_info.map(|f| FundingInfo {
                id: f.id,
                funding_type: f.funding_type,
            }),
            products: wire
                .products
                .into_iter()
                .map(|p| Product {
                    description: p.description,
                    ..Product::titled(ProductId(p.id), p.title)
                })
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CurrentExhibitor {
    id: i64,
    name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    banner: String,
    #[serde(default, deserialize_with = "null_as_default")]
    logo: String,
    #[serde(default, deserialize_with = "null_as_default")]
    website_url: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pitch_deck: String,
    #[serde(default, deserialize_with = "null_as_default")]
    dpiit_cert_number: String,
    address: Option<CurrentAddress>,
    director: Option<CurrentDirector>,
    spoc: Option<CurrentSpoc>,
    revenue_info: Option<CurrentRevenueInfo>,
    funding_info: Option<CurrentFundingInfo>,
    #[serde(default, deserialize_with = "null_as_default")]
    products: Vec<CurrentProduct>,
}

#[derive(Debug, Deserialize)]
struct CurrentAddress {
    id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    street: String,
    #[serde(default, deserialize_with = "null_as_default")]
    city: String,
    #[serde(default, deserialize_with = "null_as_default")]
    state: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pincode: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CurrentDirector {
    id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    director_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    director_email: String,
}

#[derive(Debug, Deserialize)]
struct CurrentSpoc {
    id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    email: String,
    #[serde(default, deserialize_with = "null_as_default")]
    phone: String,
    #[serde(default, deserialize_with = "null_as_default")]
    position: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CurrentRevenueInfo {
    id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    revenue_bracket: String,
    #[serde(default, deserialize_with = "null_as_default")]
    user_impact: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CurrentFundingInfo {
    id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    funding_type: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CurrentProduct {
    id: i64,
    title: String,
    description: Option<String>,
    category: Option<String>,
    stage: Option<String>,
    product_type: Option<String>,
    price: Option<f64>,
    quantity: Option<u32>,
    tags: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    users: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    images: Vec<CurrentImage>,
}

#[derive(Debug, Deserialize)]
struct CurrentImage {
    url: String,
}

impl From<CurrentExhibitor> for ExhibitorRecord {
    fn from(wire: CurrentExhibitor) -> Self {
        Self {
            id: ExhibitorId(wire.id),
            name: wire.name,
            banner: wire.banner,
            logo: wire.logo,
            website_url: wire.website_url,
            pitch_deck: wire.pitch_deck,
            certification_number: wire.dpiit_cert_number,
            address: wire.address.map(|a| Address {
                id: a.id,
                street: a.street,
                city: a.city,
                state: a.state,
                pincode: a.pincode,
            }),
            director: wire.director.map(|d| Director {
                id: d.id,
                name: d.director_name,
                email: d.director_email,
            }),
            spoc: wire.spoc.map(|s| Spoc {
                id: s.id,
                name: s.name,
                email: s.email,
                phone: s.phone,
                position: s.position,
            }),
            revenue: wire.revenue_info.map(|r| RevenueInfo {
                id: r.id,
                revenue_bracket: r.revenue_bracket,
                user_impact: r.user_impact,
            }),
            funding: wire.funding_info.map(|f| FundingInfo {
                id: f.id,
                funding_type: f.funding_type,
            }),
            products: wire
                .products
                .into_iter()
                .map(|p| Product {
                    id: ProductId(p.id),
                    title: p.title,
                    description: p.description,
                    category: p.category,
                    stage: p.stage,
                    product_type: p.product_type,
                    price: p.price,
                    quantity: p.quantity,
                    images: p
                        .images
                        .into_iter()
                        .map(|i| ProductImage { url: i.url })
                        .collect(),
                    tags: split_tags(p.tags),
                    users: p.users,
                })
                .collect(),
        }
    }
}
