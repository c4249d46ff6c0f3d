use serde::Serialize;
use shared::domain::{ExhibitorId, ExhibitorRecord, Product};

pub fn find_exhibitor(records: &[ExhibitorRecord], id: ExhibitorId) -> Option<&ExhibitorRecord> {
    records.iter().find(|record| record.id == id)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductLookup {
    pub product: Option<Product>,
    pub exhibitor: Option<ExhibitorRecord>,
    pub not_found: bool,
}

impl ProductLookup {
    pub fn missing() -> Self {
        Self {
            product: None,
            exhibitor: None,
            not_found: true,
        }
    }
}

/// Finds a product across all exhibitors. `product_id` comes from a route
/// segment and is matched against the textual form of the id, so anything
/// non-numeric is simply not found.
pub fn find_product(records: &[ExhibitorRecord], product_id: &str) -> ProductLookup {
    records
        .iter()
        .find_map(|exhibitor| {
            exhibitor
                .products
                .iter()
                .find(|product| product.id.to_string() == product_id)
                .map(|product| ProductLookup {
                    product: Some(product.clone()),
                    exhibitor: Some(exhibitor.clone()),
                    not_found: false,
                })
        })
        .unwrap_or_else(ProductLookup::missing)
}

#[cfg(test)]
mod tests {
    use shared::domain::{ExhibitorId, ProductId};

    use super::*;
    use crate::fallback::fallback_exhibitors;

    #[test]
    fn finds_product_with_owning_exhibitor() {
        let records = fallback_exhibitors();
        let lookup = find_product(&records, "3");

        assert!(!lookup.not_found);
        assert_eq!(lookup.product.map(|p| p.id), Some(ProductId(3)));
        assert_eq!(lookup.exhibitor.map(|e| e.id), Some(ExhibitorId(2)));
    }

    #[test]
    fn unknown_or_non_numeric_ids_are_not_found() {
        let records = fallback_exhibitors();

        assert_eq!(find_product(&records, "404"), ProductLookup::missing());
        assert_eq!(find_product(&records, "three"), ProductLookup::missing());
        assert_eq!(find_product(&records, " 3"), ProductLookup::missing());
    }

    #[test]
    fn finds_exhibitor_by_id() {
        let records = fallback_exhibitors();

        assert_eq!(
            find_exhibitor(&records, ExhibitorId(3)).map(|e| e.name.as_str()),
            Some("GreenTech Innovations")
        );
        assert!(find_exhibitor(&records, ExhibitorId(42)).is_none());
        assert!(find_exhibitor(&[], ExhibitorId(1)).is_none());
    }
}
