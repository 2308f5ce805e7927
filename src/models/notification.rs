use rust_decimal::Decimal;
use serde::Serialize;

use super::watchlist::UserId;

/// One price alert that fired during a sweep. Built by the evaluator and
/// consumed straight away by the dispatcher; never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerNotification {
    pub user_id: UserId,
    pub stock_symbol: String,
    pub target_price: Decimal,
    pub current_price: Decimal,
}

impl TriggerNotification {
    pub fn message(&self) -> String {
        format!(
            "🚨 Stock Alert: {} is near your target price of {:.2}! Current price: {:.2}",
            self.stock_symbol, self.target_price, self.current_price
        )
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SweepSummary {
    pub checked: usize,
}
