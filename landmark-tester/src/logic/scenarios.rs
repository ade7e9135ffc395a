use anyhow::{Context, Result, bail, ensure};
use chrono::Utc;
use landmark_core::{
    Command, FlowError, KeyInput, LandApi, LandMarket, Notice, NoticeLevel, PurchasePhase,
    TileFilter,
};

/// How many tiles the bulk scenario tries to buy.
const BULK_BATCH: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scenario {
    Smoke,
    SinglePurchase,
    BulkPurchase,
    ValidationGuards,
    FilterIdempotence,
    Keyboard,
}

impl Scenario {
    pub const ALL: [Self; 6] = [
        Self::Smoke,
        Self::SinglePurchase,
        Self::BulkPurchase,
        Self::ValidationGuards,
        Self::FilterIdempotence,
        Self::Keyboard,
    ];

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Smoke => "smoke",
            Self::SinglePurchase => "single-purchase",
            Self::BulkPurchase => "bulk-purchase",
            Self::ValidationGuards => "validation-guards",
            Self::FilterIdempotence => "filter-idempotence",
            Self::Keyboard => "keyboard",
        }
    }

    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Smoke => "Load tiles and the team summary without errors",
            Self::SinglePurchase => "Select, quote, confirm and buy one tile",
            Self::BulkPurchase => "Buy a small batch of tiles in bulk mode",
            Self::ValidationGuards => "Reject bad areas before any quote is requested",
            Self::FilterIdempotence => "Apply the same filter twice and compare views",
            Self::Keyboard => "Drive zoom, help, bulk mode and escape from keys",
        }
    }

    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.key() == key)
    }

    /// Run the scenario against a fresh market.
    ///
    /// # Errors
    /// Returns the first failed expectation.
    #[allow(clippy::future_not_send)]
    pub async fn run<A: LandApi>(self, market: &mut LandMarket<A>) -> Result<()> {
        match self {
            Self::Smoke => smoke(market).await,
            Self::SinglePurchase => single_purchase(market).await,
            Self::BulkPurchase => bulk_purchase(market).await,
            Self::ValidationGuards => validation_guards(market).await,
            Self::FilterIdempotence => filter_idempotence(market).await,
            Self::Keyboard => keyboard(market).await,
        }
    }
}

#[must_use]
pub fn now_ms() -> u64 {
    u64::try_from(Utc::now().timestamp_millis()).unwrap_or_default()
}

fn first_error(notices: &[Notice]) -> Option<&Notice> {
    notices.iter().find(|n| n.level == NoticeLevel::Error)
}

#[allow(clippy::future_not_send)]
async fn load<A: LandApi>(market: &mut LandMarket<A>) -> Result<()> {
    market.refresh(now_ms()).await;
    let notices = market.drain_notices();
    if let Some(err) = first_error(&notices) {
        bail!("{}: {}", err.title, err.message);
    }
    ensure!(!market.tiles().is_empty(), "backend returned no tiles");
    Ok(())
}

fn purchasable_ids<A: LandApi>(market: &LandMarket<A>, limit: usize) -> Vec<i64> {
    market
        .tiles()
        .iter()
        .filter(|t| t.can_purchase && t.available_area.is_none_or(|a| a >= 1.0))
        .map(|t| t.tile_id)
        .take(limit)
        .collect()
}

#[allow(clippy::future_not_send)]
async fn smoke<A: LandApi>(market: &mut LandMarket<A>) -> Result<()> {
    load(market).await?;
    ensure!(market.team_summary().is_some(), "team summary missing");
    let stats = market.view().stats.clone();
    ensure!(
        stats.visible == market.tiles().len(),
        "unfiltered view shows {} of {} tiles",
        stats.visible,
        market.tiles().len()
    );
    ensure!(!market.is_loading(), "refresh left the market loading");
    Ok(())
}

#[allow(clippy::future_not_send)]
async fn single_purchase<A: LandApi>(market: &mut LandMarket<A>) -> Result<()> {
    load(market).await?;
    let before = market
        .team_summary()
        .map_or(0, |summary| summary.total_purchases);
    let tile_id = *purchasable_ids(market, 1)
        .first()
        .context("no purchasable tile on the map")?;

    market.select_tile(tile_id).await;
    ensure!(
        market.purchase().phase() == PurchasePhase::ValidationReady,
        "tile {tile_id} was not quoted (phase {:?})",
        market.purchase().phase()
    );
    let validation = market
        .purchase()
        .validation()
        .context("quote missing after selection")?;
    ensure!(
        validation.can_purchase,
        "quote refused tile {tile_id}: {}",
        validation.errors.join("; ")
    );

    market.open_purchase_dialog()?;
    ensure!(market.dialogs().purchase, "purchase dialog did not open");
    market.set_purchase_area(1.0);
    market.revalidate().await;
    ensure!(
        market.purchase().phase() == PurchasePhase::Confirming,
        "area change in the dialog was not requoted (phase {:?})",
        market.purchase().phase()
    );
    let bought = market.confirm_purchase(now_ms()).await?;
    let notices = market.drain_notices();
    if let Some(err) = first_error(&notices) {
        bail!("{}: {}", err.title, err.message);
    }
    ensure!(bought, "purchase of tile {tile_id} did not succeed");
    ensure!(!market.dialogs().purchase, "dialog stayed open after buying");
    ensure!(
        market.purchase().selected().is_none(),
        "bought tile {tile_id} stayed selected"
    );
    ensure!(
        notices.iter().any(|n| n.title == "Land Purchased"),
        "no success notice"
    );
    let after = market
        .team_summary()
        .map_or(0, |summary| summary.total_purchases);
    ensure!(after > before, "team summary was not refreshed");
    Ok(())
}

#[allow(clippy::future_not_send)]
async fn bulk_purchase<A: LandApi>(market: &mut LandMarket<A>) -> Result<()> {
    load(market).await?;
    let ids = purchasable_ids(market, BULK_BATCH);
    ensure!(!ids.is_empty(), "no purchasable tiles for bulk mode");

    market.toggle_bulk_mode();
    for &id in &ids {
        market.click_tile(id);
    }
    ensure!(
        market.selection().ids() == ids.as_slice(),
        "selection {:?} does not match clicks {:?}",
        market.selection().ids(),
        ids
    );
    market.set_bulk_area(1.0);
    market.open_bulk_dialog()?;
    let report = market.run_bulk(now_ms()).await?;
    ensure!(
        report.attempted() + report.skipped.len() == ids.len(),
        "bulk run accounted for {} of {} tiles",
        report.attempted() + report.skipped.len(),
        ids.len()
    );
    ensure!(
        report.fail_count == 0,
        "bulk run had failures: {}",
        report.errors.join("; ")
    );
    ensure!(market.selection().is_empty(), "selection survived the run");
    ensure!(!market.dialogs().bulk, "bulk dialog stayed open");
    ensure!(!market.is_bulk_purchasing(), "bulk run still marked busy");
    Ok(())
}

#[allow(clippy::future_not_send)]
async fn validation_guards<A: LandApi>(market: &mut LandMarket<A>) -> Result<()> {
    load(market).await?;
    let tile_id = *purchasable_ids(market, 1)
        .first()
        .context("no purchasable tile on the map")?;
    market.select_tile(tile_id).await;
    market.drain_notices();

    for area in [0.0, -2.0, 1.5, f64::NAN] {
        market.set_purchase_area(area);
        market.revalidate().await;
        let notices = market.drain_notices();
        ensure!(
            notices.iter().any(|n| n.title == "Invalid Area"),
            "area {area} was not rejected"
        );
        ensure!(
            market.purchase().phase() == PurchasePhase::TileSelected,
            "area {area} reached phase {:?}",
            market.purchase().phase()
        );
    }
    match market.open_purchase_dialog() {
        Err(FlowError::ValidationBlocked) => {}
        other => bail!("dialog opened over an invalid area: {other:?}"),
    }

    market.set_purchase_area(1.0);
    market.revalidate().await;
    ensure!(
        market.purchase().phase() == PurchasePhase::ValidationReady,
        "valid area was not quoted"
    );
    Ok(())
}

#[allow(clippy::future_not_send)]
async fn filter_idempotence<A: LandApi>(market: &mut LandMarket<A>) -> Result<()> {
    load(market).await?;
    let filter = TileFilter {
        available_only: true,
        ..TileFilter::default()
    };
    market.set_filter(filter.clone());
    let once = market.view();
    market.set_filter(filter);
    let twice = market.view();
    ensure!(once == twice, "re-applying a filter changed the view");
    ensure!(
        once.filtered.iter().all(|t| t.can_purchase),
        "available-only view contains unavailable tiles"
    );
    market.set_filter(TileFilter::default());
    ensure!(
        market.view().stats.visible == market.tiles().len(),
        "clearing the filter did not restore every tile"
    );
    Ok(())
}

#[allow(clippy::future_not_send)]
async fn keyboard<A: LandApi>(market: &mut LandMarket<A>) -> Result<()> {
    load(market).await?;
    let start = market.viewport().zoom();
    market.handle_key(&KeyInput::plain("+"), now_ms()).await;
    ensure!(market.viewport().zoom() > start, "'+' did not zoom in");
    market.handle_key(&KeyInput::plain("0"), now_ms()).await;
    ensure!(
        (market.viewport().zoom() - start).abs() < f64::EPSILON,
        "'0' did not reset zoom"
    );

    let shown = market.handle_key(&KeyInput::plain("?"), now_ms()).await;
    ensure!(shown == Some(Command::ShowHelp), "'?' mapped to {shown:?}");
    ensure!(market.dialogs().help, "help dialog did not open");
    market.handle_key(&KeyInput::plain("Escape"), now_ms()).await;
    ensure!(!market.dialogs().help, "escape left help open");

    market.handle_key(&KeyInput::command("b"), now_ms()).await;
    ensure!(market.bulk_mode(), "Ctrl+B did not enter bulk mode");
    market.handle_key(&KeyInput::plain("Escape"), now_ms()).await;
    ensure!(!market.bulk_mode(), "escape did not leave bulk mode");
    Ok(())
}
