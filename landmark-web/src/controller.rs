//! Async drivers for a market shared with the component tree.
//!
//! The market lives in an `Rc<RefCell<..>>` that callbacks also borrow, so a
//! borrow is never held across an await: each driver copies what the call
//! needs out of the market, releases it, awaits, then applies the result.
use std::cell::RefCell;
use std::rc::Rc;

use landmark_core::{
    Command, FlowError, Followup, KeyInput, LandApi, LandMarket, Notice, command_for, quote,
    run_bulk_purchase,
};

use crate::action::Action;

pub type SharedMarket<A> = Rc<RefCell<LandMarket<A>>>;

#[must_use]
pub fn share<A: LandApi>(market: LandMarket<A>) -> SharedMarket<A> {
    Rc::new(RefCell::new(market))
}

fn api_of<A: LandApi + Clone>(market: &SharedMarket<A>) -> A {
    market.borrow().api().clone()
}

/// Refetch the tile list and team summary.
#[allow(clippy::future_not_send)]
pub async fn refresh<A: LandApi + Clone>(market: &SharedMarket<A>, now_ms: u64) {
    let api = api_of(market);
    market.borrow_mut().begin_refresh();
    let tiles = api.available_tiles().await;
    let summary = api.team_summary().await;
    let mut guard = market.borrow_mut();
    guard.apply_tiles(tiles, now_ms);
    guard.apply_summary(summary, now_ms);
    guard.finish_refresh();
}

/// Refetch whichever resource has gone stale.
#[allow(clippy::future_not_send)]
pub async fn ensure_fresh<A: LandApi + Clone>(market: &SharedMarket<A>, now_ms: u64) {
    let api = api_of(market);
    let (want_tiles, want_summary) = {
        let mut guard = market.borrow_mut();
        (
            guard.tiles_cache_mut().begin_revalidate(now_ms),
            guard.summary_cache_mut().begin_revalidate(now_ms),
        )
    };
    if want_tiles {
        let tiles = api.available_tiles().await;
        market.borrow_mut().apply_tiles(tiles, now_ms);
    }
    if want_summary {
        let summary = api.team_summary().await;
        market.borrow_mut().apply_summary(summary, now_ms);
    }
}

/// Quote the selected tile if its tile or area changed.
#[allow(clippy::future_not_send)]
pub async fn revalidate<A: LandApi + Clone>(market: &SharedMarket<A>) {
    let api = api_of(market);
    let job = market.borrow_mut().begin_quote();
    if let Some((tile_id, area)) = job {
        let result = quote(&api, tile_id, area).await;
        market.borrow_mut().apply_quote(tile_id, result);
    }
}

/// Handle a map click: toggle in bulk mode, otherwise select and quote.
#[allow(clippy::future_not_send)]
pub async fn click_tile<A: LandApi + Clone>(market: &SharedMarket<A>, tile_id: i64) {
    let api = api_of(market);
    let selected = market.borrow_mut().click_tile(tile_id);
    if selected.is_none() {
        return;
    }
    let details = api.tile_details(tile_id).await;
    market
        .borrow_mut()
        .purchase_mut()
        .apply_details(tile_id, details);
    revalidate(market).await;
}

/// Send the confirmed purchase and refresh after a success.
///
/// # Errors
/// Returns the [`FlowError`] when the purchase cannot start.
#[allow(clippy::future_not_send)]
pub async fn confirm_purchase<A: LandApi + Clone>(
    market: &SharedMarket<A>,
    now_ms: u64,
) -> Result<bool, FlowError> {
    let api = api_of(market);
    let request = market.borrow_mut().purchase_mut().begin_purchase()?;
    let result = api.purchase(&request).await;
    let succeeded = market.borrow_mut().apply_purchase(result);
    if succeeded {
        refresh(market, now_ms).await;
    }
    Ok(succeeded)
}

/// Buy the bulk selection tile by tile, then refresh once.
///
/// # Errors
/// Returns the [`FlowError`] when the run cannot start.
#[allow(clippy::future_not_send)]
pub async fn run_bulk<A: LandApi + Clone>(
    market: &SharedMarket<A>,
    now_ms: u64,
) -> Result<(), FlowError> {
    let api = api_of(market);
    let job = market.borrow_mut().begin_bulk()?;
    let report = run_bulk_purchase(&api, &job.ids, &job.index, job.area).await;
    market.borrow_mut().finish_bulk(report);
    refresh(market, now_ms).await;
    Ok(())
}

/// Dispatch a key press against the current market state.
#[allow(clippy::future_not_send)]
pub async fn handle_key<A: LandApi + Clone>(
    market: &SharedMarket<A>,
    input: &KeyInput,
    now_ms: u64,
) -> Option<Command> {
    let command = command_for(input)?;
    let followup = market.borrow_mut().apply_command(command);
    if followup == Some(Followup::Refresh) {
        refresh(market, now_ms).await;
    }
    Some(command)
}

/// Apply an action that needs no backend call. Remote and page-level
/// actions are ignored.
pub fn dispatch_local<A: LandApi>(market: &mut LandMarket<A>, action: Action) {
    match action {
        Action::SetProtection(protection) => market.purchase_mut().protection = protection,
        Action::SetDescription(text) => {
            market.purchase_mut().description = Some(text).filter(|t| !t.trim().is_empty());
        }
        Action::OpenPurchase => {
            market.apply_command(Command::PurchaseSelected);
        }
        Action::ClosePurchase => market.close_purchase_dialog(),
        Action::ToggleBulkMode => market.toggle_bulk_mode(),
        Action::OpenBulk => {
            if let Err(err) = market.open_bulk_dialog() {
                market.notify(Notice::warning("Nothing Selected", err.to_string()));
            }
        }
        Action::SetBulkArea(area) => market.set_bulk_area(area),
        Action::CloseBulk => market.close_bulk_dialog(),
        Action::ClearBulk => market.clear_bulk_selection(),
        Action::SetFilter(filter) => market.set_filter(filter),
        Action::Key(command) => {
            market.apply_command(command);
        }
        Action::CloseHelp => market.close_help(),
        Action::ClickTile(_)
        | Action::SetArea(_)
        | Action::ConfirmPurchase
        | Action::ConfirmBulk
        | Action::Refresh
        | Action::DismissToast(_)
        | Action::DismissTutorial => {}
    }
}

/// Run an action that talks to the backend.
#[allow(clippy::future_not_send)]
pub async fn dispatch_remote<A: LandApi + Clone>(
    market: &SharedMarket<A>,
    action: Action,
    now_ms: u64,
) {
    match action {
        Action::ClickTile(tile_id) => click_tile(market, tile_id).await,
        Action::SetArea(area) => {
            market.borrow_mut().set_purchase_area(area);
            revalidate(market).await;
        }
        Action::ConfirmPurchase => {
            if let Err(err) = confirm_purchase(market, now_ms).await {
                log::warn!("purchase not started: {err}");
                market
                    .borrow_mut()
                    .notify(Notice::warning("Cannot Purchase", err.to_string()));
            }
        }
        Action::ConfirmBulk => {
            if let Err(err) = run_bulk(market, now_ms).await {
                log::warn!("bulk purchase not started: {err}");
                market
                    .borrow_mut()
                    .notify(Notice::warning("Cannot Purchase", err.to_string()));
            }
        }
        Action::Refresh | Action::Key(Command::Refresh) => refresh(market, now_ms).await,
        other => dispatch_local(&mut market.borrow_mut(), other),
    }
}
