//! Order quote for the single-product checkout: pricing, shipping, GST and
//! the quantity picker bounds.

use serde::Serialize;

use crate::catalog::ProductLookup;

/// Orders with a subtotal strictly above this ship for free.
pub const FREE_SHIPPING_ABOVE: f64 = 999.0;
pub const SHIPPING_FEE: f64 = 99.0;
pub const GST_RATE: f64 = 0.18;
/// Struck-through "list" price shown next to the selling price.
pub const LIST_PRICE_MARKUP: f64 = 1.3;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderQuote {
    pub unit_price: f64,
    pub quantity: u32,
    pub subtotal: f64,
    pub shipping: f64,
    pub tax: f64,
    pub total: f64,
    pub list_price: f64,
    pub discount_percent: u32,
    pub savings: f64,
}

impl OrderQuote {
    pub fn new(unit_price: f64, quantity: u32) -> Self {
        let unit_price = unit_price.max(0.0);
        let subtotal = unit_price * f64::from(quantity);
        let shipping = if subtotal > FREE_SHIPPING_ABOVE {
            0.0
        } else {
            SHIPPING_FEE
        };
        let tax = subtotal * GST_RATE;

        let (list_price, discount_percent) = if unit_price > 0.0 {
            let list_price = unit_price * LIST_PRICE_MARKUP;
            let discount = ((list_price - unit_price) / list_price * 100.0).floor();
            (list_price, discount as u32)
        } else {
            (0.0, 0)
        };
        let savings = if unit_price > 0.0 {
            (list_price - unit_price) * f64::from(quantity)
        } else {
            0.0
        };

        Self {
            unit_price,
            quantity,
            subtotal,
            shipping,
            tax,
            total: subtotal + shipping + tax,
            list_price,
            discount_percent,
            savings,
        }
    }

    pub fn ships_free(&self) -> bool {
        self.shipping == 0.0
    }
}

/// Quantity picker bounded by `[1, stock]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QuantitySelector {
    quantity: u32,
    stock: u32,
}

impl QuantitySelector {
    pub fn new(stock: u32) -> Self {
        Self { quantity: 1, stock }
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn stock(&self) -> u32 {
        self.stock
    }

    pub fn in_stock(&self) -> bool {
        self.stock > 0
    }

    pub fn increment(&mut self) {
        if self.quantity < self.stock {
            self.quantity += 1;
        }
    }

    pub fn decrement(&mut self) {
        self.quantity = self.quantity.saturating_sub(1).max(1);
    }

    pub fn set(&mut self, quantity: u32) {
        self.quantity = quantity.clamp(1, self.stock.max(1));
    }
}

/// Everything the order page shows for one product.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderView {
    pub lookup: ProductLookup,
    pub selector: Option<QuantitySelector>,
    pub quote: Option<OrderQuote>,
}

impl OrderView {
    pub fn build(lookup: ProductLookup, requested_quantity: u32) -> Self {
        let (selector, quote) = match lookup.product.as_ref() {
            Some(product) => {
                let mut selector = QuantitySelector::new(product.stock());
                selector.set(requested_quantity);
                let quote = OrderQuote::new(product.price.unwrap_or(0.0), selector.quantity());
                (Some(selector), Some(quote))
            }
            None => (None, None),
        };

        Self {
            lookup,
            selector,
            quote,
        }
    }
}
