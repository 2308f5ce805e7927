use std::time::Duration;

use tokio::time;

use crate::{error::AppResult, models::SweepSummary, AppState};

use super::{alert_evaluator, notification_dispatcher};

/// Runs the sweep on a fixed interval for the life of the process.
pub fn spawn_alert_sweeper(state: AppState, every: Duration) {
    tokio::spawn(async move {
        let mut interval = time::interval(every);
        interval.set_missed_tick_behavior(time::MissedTickBehavior::Delay);

        loop {
            interval.tick().await;

            if let Err(e) = run_sweep(&state).await {
                tracing::error!("[alert-sweep] tick error: {}", e);
            }
        }
    });
}

/// One full pass: load alert-bearing items, evaluate all of them, then
/// dispatch. Dispatch starts only after evaluation has finished.
pub async fn run_sweep(state: &AppState) -> AppResult<SweepSummary> {
    let items = state.store.items_with_alert().await?;

    if items.is_empty() {
        return Ok(SweepSummary::default());
    }

    let triggered =
        alert_evaluator::evaluate(&items, state.prices.as_ref(), state.store.as_ref()).await;

    let checked = notification_dispatcher::dispatch(&state.connections, &triggered);

    tracing::info!(
        "[alert-sweep] {} item(s) with alerts, {} triggered",
        items.len(),
        checked
    );

    Ok(SweepSummary { checked })
}
