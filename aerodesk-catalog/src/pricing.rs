use serde::{Deserialize, Serialize};

use crate::rules::TicketClassRule;

/// Price of one seat in a class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceQuote {
    pub base_price: i64,
    pub multiplier: f64,
    /// Minor currency units, rounded half away from zero.
    pub price: i64,
}

pub struct TicketPricing {
    rule: TicketClassRule,
}

impl TicketPricing {
    pub fn new(rule: TicketClassRule) -> Self {
        Self { rule }
    }

    pub fn quote(&self, base_price: i64, class_label: &str) -> PriceQuote {
        let multiplier = self.rule.multiplier(class_label);
        PriceQuote {
            base_price,
            multiplier,
            price: (base_price as f64 * multiplier).round() as i64,
        }
    }
}
