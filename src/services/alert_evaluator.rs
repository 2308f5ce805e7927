use std::collections::HashMap;

use rust_decimal::{Decimal, RoundingStrategy};

use crate::models::{TriggerNotification, UserId, WatchlistId, WatchlistItem};

use super::{price_lookup::PriceLookup, store::WatchlistStore};

/// Allowed distance between observed price and threshold, in percent of
/// the threshold.
pub const ALERT_TOLERANCE_PCT: i64 = 1;

/// Prices are stored with two fractional digits; quotes are compared at the
/// same precision.
pub fn normalize_price(price: Decimal) -> Decimal {
    price.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// True when `observed` is within 1% of `threshold`, on either side.
/// `observed` is rounded to cents before comparing. A non-positive threshold
/// never triggers.
pub fn is_triggered(threshold: Decimal, observed: Decimal) -> bool {
    within_tolerance(threshold, normalize_price(observed))
}

// |observed - threshold| / threshold <= pct / 100, kept free of division.
// Expects `observed` already at cent precision. Overflow means far out of range.
fn within_tolerance(threshold: Decimal, observed: Decimal) -> bool {
    if threshold <= Decimal::ZERO {
        return false;
    }

    let Some(distance) = observed
        .checked_sub(threshold)
        .and_then(|diff| diff.abs().checked_mul(Decimal::ONE_HUNDRED))
    else {
        return false;
    };

    threshold
        .checked_mul(Decimal::from(ALERT_TOLERANCE_PCT))
        .is_some_and(|bound| distance <= bound)
}

/// Works out which alert-bearing items are triggered at current prices.
///
/// Each distinct symbol is priced once. Items whose symbol has no quote, whose
/// threshold is missing or invalid, or whose owner cannot be resolved are
/// skipped. Nothing is written.
pub async fn evaluate(
    items: &[WatchlistItem],
    prices: &dyn PriceLookup,
    owners: &dyn WatchlistStore,
) -> Vec<TriggerNotification> {
    let mut by_symbol: HashMap<&str, Vec<(&WatchlistItem, Decimal)>> = HashMap::new();
    for item in items {
        let Some(threshold) = item.alert_price else {
            continue;
        };
        if threshold <= Decimal::ZERO {
            tracing::warn!(
                "item {} ({}) has non-positive alert price {}, skipped",
                item.item_id,
                item.stock_symbol,
                threshold
            );
            continue;
        }
        by_symbol
            .entry(item.stock_symbol.as_str())
            .or_default()
            .push((item, threshold));
    }

    let mut owner_cache: HashMap<WatchlistId, Option<UserId>> = HashMap::new();
    let mut out = Vec::new();

    for (symbol, group) in by_symbol {
        let Some(price) = prices.current_price(symbol).await else {
            tracing::debug!("no price for {}, {} alert(s) skipped", symbol, group.len());
            continue;
        };
        let current = normalize_price(price);

        for (item, threshold) in group {
            if !within_tolerance(threshold, current) {
                continue;
            }

            let owner = match owner_cache.get(&item.watchlist_id) {
                Some(cached) => *cached,
                None => {
                    let resolved = match owners.owning_user_id(item).await {
                        Ok(v) => v,
                        Err(e) => {
                            tracing::warn!("owner lookup failed for item {}: {}", item.item_id, e);
                            None
                        }
                    };
                    owner_cache.insert(item.watchlist_id, resolved);
                    resolved
                }
            };

            let Some(user_id) = owner else {
                tracing::warn!(
                    "item {} belongs to missing watchlist {}, skipped",
                    item.item_id,
                    item.watchlist_id
                );
                continue;
            };

            out.push(TriggerNotification {
                user_id,
                stock_symbol: item.stock_symbol.clone(),
                target_price: threshold,
                current_price: current,
            });
        }
    }

    out
}
