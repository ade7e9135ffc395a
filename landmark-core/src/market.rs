//! The land market: cached server state plus every client-side flow.
//!
//! Each remote interaction comes in two halves: a synchronous `begin_*` /
//! `apply_*` pair that shells can call around their own transport, and an
//! async driver that does the whole round trip through [`LandApi`].
use std::rc::Rc;

use crate::api::LandApi;
use crate::bulk::{BulkEstimate, BulkReport, bulk_area, estimate_bulk, run_bulk_purchase};
use crate::cache::CachedResource;
use crate::config::MarketConfig;
use crate::error::{ApiError, FlowError, error_message};
use crate::filter::{TileFilter, TileView, TileViewCache};
use crate::keyboard::{Command, KeyInput, command_for};
use crate::notice::{Notice, Outbox};
use crate::purchase::{PurchaseEffects, PurchaseFlow};
use crate::selection::{BulkSelection, Toggle};
use crate::tile::{AvailableTile, PurchaseReceipt, TeamLandSummary, TileIndex};
use crate::validation::{QuoteResult, area_warning, quote};
use crate::viewport::Viewport;

pub const TILES_CACHE_KEY: &str = "tiles";
pub const SUMMARY_CACHE_KEY: &str = "team-summary";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Dialogs {
    pub purchase: bool,
    pub bulk: bool,
    pub help: bool,
}

/// Work a command leaves for the shell that needs the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Followup {
    Refresh,
}

/// Inputs for a bulk run, captured so the run does not borrow the market.
#[derive(Debug, Clone)]
pub struct BulkJob {
    pub ids: Vec<i64>,
    pub index: TileIndex,
    pub area: u32,
}

pub struct LandMarket<A: LandApi> {
    api: A,
    config: MarketConfig,
    tiles: CachedResource<Vec<AvailableTile>>,
    summary: CachedResource<TeamLandSummary>,
    index: TileIndex,
    filter: TileFilter,
    view_cache: TileViewCache,
    selection: BulkSelection,
    bulk_mode: bool,
    bulk_area: f64,
    bulk_purchasing: bool,
    last_bulk: Option<BulkReport>,
    purchase: PurchaseFlow,
    viewport: Viewport,
    dialogs: Dialogs,
    outbox: Outbox,
    animations: Vec<i64>,
    loading: bool,
}

impl<A: LandApi> LandMarket<A> {
    #[must_use]
    pub fn new(api: A, config: MarketConfig) -> Self {
        Self {
            tiles: CachedResource::new(TILES_CACHE_KEY, config.tiles_policy()),
            summary: CachedResource::new(SUMMARY_CACHE_KEY, config.summary_policy()),
            index: TileIndex::default(),
            filter: TileFilter::default(),
            view_cache: TileViewCache::default(),
            selection: BulkSelection::new(),
            bulk_mode: false,
            bulk_area: config.default_purchase_area,
            bulk_purchasing: false,
            last_bulk: None,
            purchase: PurchaseFlow::new(
                config.default_purchase_area,
                config.success_notice_delay_ms,
            ),
            viewport: Viewport::new(config.min_zoom, config.max_zoom, config.zoom_step),
            dialogs: Dialogs::default(),
            outbox: Outbox::default(),
            animations: Vec::new(),
            loading: false,
            api,
            config,
        }
    }

    pub const fn api(&self) -> &A {
        &self.api
    }

    pub const fn config(&self) -> &MarketConfig {
        &self.config
    }

    // ---- cached resources ----

    /// Last tile snapshot, possibly stale.
    pub fn tiles(&self) -> &[AvailableTile] {
        self.tiles.peek().map_or(&[][..], Vec::as_slice)
    }

    pub fn team_summary(&self) -> Option<&TeamLandSummary> {
        self.summary.peek()
    }

    pub fn tile(&self, tile_id: i64) -> Option<&AvailableTile> {
        self.index.get(tile_id)
    }

    pub const fn tiles_cache(&self) -> &CachedResource<Vec<AvailableTile>> {
        &self.tiles
    }

    pub const fn summary_cache(&self) -> &CachedResource<TeamLandSummary> {
        &self.summary
    }

    pub const fn tiles_cache_mut(&mut self) -> &mut CachedResource<Vec<AvailableTile>> {
        &mut self.tiles
    }

    pub const fn summary_cache_mut(&mut self) -> &mut CachedResource<TeamLandSummary> {
        &mut self.summary
    }

    pub const fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn begin_refresh(&mut self) {
        self.loading = true;
    }

    /// Store a tile list fetch. The index is rebuilt from the new snapshot.
    pub fn apply_tiles(&mut self, result: Result<Vec<AvailableTile>, ApiError>, now_ms: u64) {
        match result {
            Ok(tiles) => {
                self.index = TileIndex::build(&tiles);
                self.tiles.store(tiles, now_ms);
            }
            Err(err) => {
                log::error!("failed to load available tiles: {err}");
                self.tiles.abort_revalidate();
                self.outbox
                    .push(Notice::error("Failed to Load Tiles", error_message(&err)));
            }
        }
    }

    pub fn apply_summary(&mut self, result: Result<TeamLandSummary, ApiError>, now_ms: u64) {
        match result {
            Ok(summary) => self.summary.store(summary, now_ms),
            Err(err) => {
                log::error!("failed to load team land summary: {err}");
                self.summary.abort_revalidate();
                self.outbox.push(Notice::error(
                    "Failed to Load Team Summary",
                    error_message(&err),
                ));
            }
        }
    }

    pub fn finish_refresh(&mut self) {
        self.loading = false;
    }

    pub fn invalidate(&mut self) {
        self.tiles.invalidate();
        self.summary.invalidate();
    }

    /// Refetch both resources unconditionally.
    pub async fn refresh(&mut self, now_ms: u64) {
        self.begin_refresh();
        let tiles = self.api.available_tiles().await;
        self.apply_tiles(tiles, now_ms);
        let summary = self.api.team_summary().await;
        self.apply_summary(summary, now_ms);
        self.finish_refresh();
    }

    /// Refetch whichever resource is missing, stale or expired.
    pub async fn ensure_fresh(&mut self, now_ms: u64) {
        if self.tiles.begin_revalidate(now_ms) {
            let tiles = self.api.available_tiles().await;
            self.apply_tiles(tiles, now_ms);
        }
        if self.summary.begin_revalidate(now_ms) {
            let summary = self.api.team_summary().await;
            self.apply_summary(summary, now_ms);
        }
    }

    // ---- derived view ----

    pub const fn filter(&self) -> &TileFilter {
        &self.filter
    }

    pub fn set_filter(&mut self, filter: TileFilter) {
        self.filter = filter;
    }

    /// Filtered, map-ready tiles and statistics; memoized.
    pub fn view(&mut self) -> Rc<TileView> {
        let tiles = self.tiles.peek().map_or(&[][..], Vec::as_slice);
        self.view_cache.view(
            self.tiles.generation(),
            tiles,
            &self.filter,
            &self.selection,
            self.config.hex_size,
        )
    }

    // ---- single purchase ----

    pub const fn purchase(&self) -> &PurchaseFlow {
        &self.purchase
    }

    pub const fn purchase_mut(&mut self) -> &mut PurchaseFlow {
        &mut self.purchase
    }

    /// Handle a map click. In bulk mode this toggles selection membership.
    /// Returns the tile id when a single-purchase selection was made and the
    /// details/quote should be fetched.
    pub fn click_tile(&mut self, tile_id: i64) -> Option<i64> {
        if self.bulk_mode {
            self.toggle_bulk_tile(tile_id);
            return None;
        }
        let Some(tile) = self.index.get(tile_id).cloned() else {
            log::warn!("clicked tile {tile_id} is not in the tile list");
            return None;
        };
        match self.purchase.select(&tile) {
            Ok(()) => Some(tile_id),
            Err(err) => {
                self.outbox.push(Notice::warning("Tile Unavailable", err.to_string()));
                None
            }
        }
    }

    /// Select a tile, fetch its details best-effort, then quote it.
    pub async fn select_tile(&mut self, tile_id: i64) {
        if self.click_tile(tile_id).is_none() {
            return;
        }
        let details = self.api.tile_details(tile_id).await;
        self.purchase.apply_details(tile_id, details);
        self.revalidate().await;
    }

    pub fn set_purchase_area(&mut self, area: f64) {
        self.purchase.set_area(area);
    }

    /// Start a quote if the tile or area changed since the last one.
    /// Returns `(tile_id, area)` for the validate call.
    pub fn begin_quote(&mut self) -> Option<(i64, f64)> {
        if !self.purchase.needs_validation() {
            return None;
        }
        match self.purchase.begin_validation() {
            Ok(Ok(job)) => Some(job),
            Ok(Err(err)) => {
                self.outbox.push(area_warning(&err));
                None
            }
            Err(_) => None,
        }
    }

    pub fn apply_quote(&mut self, tile_id: i64, result: QuoteResult) {
        let notices = self.purchase.apply_quote(tile_id, result);
        self.outbox.extend(notices);
    }

    /// Quote the selected tile at the current area when needed.
    pub async fn revalidate(&mut self) {
        if let Some((tile_id, area)) = self.begin_quote() {
            let result = quote(&self.api, tile_id, area).await;
            self.apply_quote(tile_id, result);
        }
    }

    /// Open the confirmation dialog for the selected tile.
    ///
    /// # Errors
    ///
    /// Fails when nothing is selected or the quote does not allow buying.
    pub fn open_purchase_dialog(&mut self) -> Result<(), FlowError> {
        self.purchase.open_dialog()?;
        self.dialogs.purchase = true;
        Ok(())
    }

    pub fn close_purchase_dialog(&mut self) {
        self.dialogs.purchase = false;
        self.purchase.close_dialog();
    }

    /// Settle a purchase and carry out its effects.
    pub fn apply_purchase(&mut self, result: Result<PurchaseReceipt, ApiError>) -> bool {
        let PurchaseEffects {
            notices,
            animate_tile,
            refresh,
        } = self.purchase.apply_purchase(result);
        self.outbox.extend(notices);
        self.animations.extend(animate_tile);
        if refresh {
            self.dialogs.purchase = false;
            self.invalidate();
        }
        refresh
    }

    /// Confirm the open purchase dialog, then refresh on success.
    ///
    /// # Errors
    ///
    /// Returns the [`FlowError`] when the purchase cannot start; remote
    /// failures are reported as notices instead.
    pub async fn confirm_purchase(&mut self, now_ms: u64) -> Result<bool, FlowError> {
        let request = self.purchase.begin_purchase()?;
        let result = self.api.purchase(&request).await;
        let succeeded = self.apply_purchase(result);
        if succeeded {
            self.refresh(now_ms).await;
        }
        Ok(succeeded)
    }

    // ---- bulk purchase ----

    pub const fn bulk_mode(&self) -> bool {
        self.bulk_mode
    }

    pub const fn selection(&self) -> &BulkSelection {
        &self.selection
    }

    pub const fn bulk_area(&self) -> f64 {
        self.bulk_area
    }

    pub fn set_bulk_area(&mut self, area: f64) {
        self.bulk_area = area;
    }

    pub const fn is_bulk_purchasing(&self) -> bool {
        self.bulk_purchasing
    }

    pub const fn last_bulk_report(&self) -> Option<&BulkReport> {
        self.last_bulk.as_ref()
    }

    pub fn toggle_bulk_mode(&mut self) {
        if self.bulk_mode {
            self.exit_bulk_mode();
        } else {
            self.bulk_mode = true;
            self.close_purchase_dialog();
            self.deselect_tile();
        }
    }

    pub fn exit_bulk_mode(&mut self) {
        self.bulk_mode = false;
        self.dialogs.bulk = false;
        self.selection.clear();
    }

    pub fn toggle_bulk_tile(&mut self, tile_id: i64) -> Option<Toggle> {
        match self.selection.toggle(tile_id, &self.index) {
            Ok(toggle) => Some(toggle),
            Err(err) => {
                self.outbox.push(Notice::warning("Cannot Select Tile", err.to_string()));
                None
            }
        }
    }

    pub fn clear_bulk_selection(&mut self) {
        self.selection.clear();
    }

    /// # Errors
    ///
    /// Returns [`FlowError::EmptySelection`] when nothing is selected.
    pub fn open_bulk_dialog(&mut self) -> Result<(), FlowError> {
        if self.selection.is_empty() {
            return Err(FlowError::EmptySelection);
        }
        self.dialogs.bulk = true;
        Ok(())
    }

    pub fn close_bulk_dialog(&mut self) {
        self.dialogs.bulk = false;
        self.selection.clear();
    }

    pub fn bulk_estimate(&self) -> BulkEstimate {
        let area = bulk_area(self.bulk_area).unwrap_or(0);
        estimate_bulk(self.selection.ids(), &self.index, area)
    }

    /// Capture the inputs for a bulk run.
    ///
    /// # Errors
    ///
    /// Fails on an empty selection, a run already in progress, or an area
    /// that rounds to zero (a warning notice is queued for the latter).
    pub fn begin_bulk(&mut self) -> Result<BulkJob, FlowError> {
        if self.bulk_purchasing {
            return Err(FlowError::Busy);
        }
        if self.selection.is_empty() {
            return Err(FlowError::EmptySelection);
        }
        let area = match bulk_area(self.bulk_area) {
            Ok(area) => area,
            Err(err) => {
                self.outbox.push(area_warning(&err));
                return Err(FlowError::ValidationBlocked);
            }
        };
        self.bulk_purchasing = true;
        Ok(BulkJob {
            ids: self.selection.ids().to_vec(),
            index: self.index.clone(),
            area,
        })
    }

    /// Report the run and reset bulk state regardless of outcome.
    pub fn finish_bulk(&mut self, report: BulkReport) {
        self.outbox
            .extend(report.notices(self.config.success_notice_delay_ms));
        if report.success_count > 0 {
            self.animations.extend(report.purchased_tiles());
        }
        self.last_bulk = Some(report);
        self.bulk_purchasing = false;
        self.dialogs.bulk = false;
        self.selection.clear();
        self.invalidate();
    }

    /// Run the bulk purchase end to end and refresh once afterwards.
    ///
    /// # Errors
    ///
    /// See [`Self::begin_bulk`].
    pub async fn run_bulk(&mut self, now_ms: u64) -> Result<BulkReport, FlowError> {
        let job = self.begin_bulk()?;
        let report = run_bulk_purchase(&self.api, &job.ids, &job.index, job.area).await;
        self.finish_bulk(report.clone());
        self.refresh(now_ms).await;
        Ok(report)
    }

    // ---- keyboard, viewport, dialogs ----

    pub const fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub const fn dialogs(&self) -> Dialogs {
        self.dialogs
    }

    pub fn close_help(&mut self) {
        self.dialogs.help = false;
    }

    /// Apply a command against the current state.
    pub fn apply_command(&mut self, command: Command) -> Option<Followup> {
        match command {
            Command::ZoomIn => self.viewport.zoom_in(),
            Command::ZoomOut => self.viewport.zoom_out(),
            Command::ResetZoom => self.viewport.reset(),
            Command::Refresh => return Some(Followup::Refresh),
            Command::PurchaseSelected => {
                if self.purchase.selected().is_some()
                    && let Err(err) = self.open_purchase_dialog()
                {
                    self.outbox
                        .push(Notice::warning("Cannot Purchase", err.to_string()));
                }
            }
            Command::ToggleBulkMode => self.toggle_bulk_mode(),
            Command::ClearBulkSelection => self.clear_bulk_selection(),
            Command::Escape => self.escape(),
            Command::ShowHelp => self.dialogs.help = true,
        }
        None
    }

    /// Close the topmost dialog, or leave bulk mode. The selected tile is
    /// cleared afterwards whichever branch ran.
    fn escape(&mut self) {
        if self.dialogs.bulk {
            self.dialogs.bulk = false;
        } else if self.dialogs.purchase {
            self.close_purchase_dialog();
        } else if self.dialogs.help {
            self.dialogs.help = false;
        } else if self.bulk_mode {
            self.exit_bulk_mode();
        }
        self.deselect_tile();
    }

    /// Drop the selected tile. A purchase dialog without a tile has nothing
    /// to show, so it goes too.
    pub fn deselect_tile(&mut self) {
        self.purchase.deselect();
        if self.purchase.selected().is_none() {
            self.dialogs.purchase = false;
        }
    }

    /// Map and apply a key press, running any refresh it asks for.
    pub async fn handle_key(&mut self, input: &KeyInput, now_ms: u64) -> Option<Command> {
        let command = command_for(input)?;
        if self.apply_command(command) == Some(Followup::Refresh) {
            self.refresh(now_ms).await;
        }
        Some(command)
    }

    // ---- shell outputs ----

    pub fn notify(&mut self, notice: Notice) {
        self.outbox.push(notice);
    }

    pub fn drain_notices(&mut self) -> Vec<Notice> {
        self.outbox.drain()
    }

    pub fn pending_notices(&self) -> &[Notice] {
        self.outbox.pending()
    }

    /// Tiles whose purchase animation should play, oldest first.
    pub fn drain_animations(&mut self) -> Vec<i64> {
        std::mem::take(&mut self.animations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryLandApi;
    use crate::notice::NoticeLevel;
    use futures::executor::block_on;

    fn market() -> LandMarket<MemoryLandApi> {
        let mut market = LandMarket::new(MemoryLandApi::generated(11, 2), MarketConfig::default());
        block_on(market.refresh(0));
        market
    }

    fn purchasable_ids(market: &LandMarket<MemoryLandApi>) -> Vec<i64> {
        market
            .tiles()
            .iter()
            .filter(|t| t.can_purchase)
            .map(|t| t.tile_id)
            .collect()
    }

    #[test]
    fn refresh_populates_caches_and_index() {
        let market = market();
        assert_eq!(market.tiles().len(), 19);
        assert!(market.team_summary().is_some());
        assert!(market.tile(1).is_some());
        assert!(!market.is_loading());
    }

    #[test]
    fn ensure_fresh_skips_fresh_resources() {
        let mut market = market();
        block_on(market.ensure_fresh(10));
        assert_eq!(market.api().calls().available_tiles, 1);
        block_on(market.ensure_fresh(MarketConfig::default().tiles_ttl_ms + 10));
        assert_eq!(market.api().calls().available_tiles, 2);
    }

    #[test]
    fn failed_refresh_keeps_old_snapshot() {
        let mut market = market();
        market.api().set_offline(true);
        block_on(market.refresh(5));
        assert_eq!(market.tiles().len(), 19);
        let notices = market.drain_notices();
        assert!(notices.iter().all(|n| n.level == NoticeLevel::Error));
        assert_eq!(notices.len(), 2);
    }

    #[test]
    fn escape_with_bulk_dialog_also_drops_the_tileless_purchase_dialog() {
        let mut market = market();
        let ids = purchasable_ids(&market);
        block_on(market.select_tile(ids[0]));
        market.open_purchase_dialog().unwrap();
        market.dialogs.bulk = true;
        assert!(market.purchase().selected().is_some());

        market.dialogs.help = true;

        market.apply_command(Command::Escape);
        let dialogs = market.dialogs();
        assert!(!dialogs.bulk);
        assert!(dialogs.help);
        assert!(market.purchase().selected().is_none());
        assert!(!dialogs.purchase);
        assert!(!market.purchase().dialog_open());

        market.apply_command(Command::Escape);
        assert!(!market.dialogs().help);
    }

    #[test]
    fn escape_without_dialogs_exits_bulk_mode() {
        let mut market = market();
        let ids = purchasable_ids(&market);
        market.toggle_bulk_mode();
        market.click_tile(ids[0]);
        assert_eq!(market.selection().len(), 1);
        market.apply_command(Command::Escape);
        assert!(!market.bulk_mode());
        assert!(market.selection().is_empty());
    }

    #[test]
    fn zoom_commands_move_viewport() {
        let mut market = market();
        market.apply_command(Command::ZoomIn);
        assert!(market.viewport().zoom() > 1.0);
        market.apply_command(Command::ResetZoom);
        assert!((market.viewport().zoom() - 1.0).abs() < f64::EPSILON);
        assert_eq!(market.apply_command(Command::Refresh), Some(Followup::Refresh));
        market.apply_command(Command::ShowHelp);
        assert!(market.dialogs().help);
    }

    #[test]
    fn view_is_memoized_until_selection_changes() {
        let mut market = market();
        let first = market.view();
        let second = market.view();
        assert!(Rc::ptr_eq(&first, &second));
        let id = purchasable_ids(&market)[0];
        market.toggle_bulk_mode();
        market.click_tile(id);
        let third = market.view();
        assert!(!Rc::ptr_eq(&first, &third));
        assert!(third.map_tiles.iter().any(|t| t.selected && t.tile.tile_id == id));
    }
}
