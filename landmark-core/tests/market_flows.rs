use futures::executor::block_on;
use landmark_core::{
    AvailableTile, BulkSelection, Command, FlowError, KeyInput, LandApi, LandMarket, LandType,
    MarketConfig, MemoryLandApi, NoticeLevel, PurchasePhase, RawPurchaseValidation, TileFilter,
    TileIndex, estimate_quote, filter_tiles, quote, run_bulk_purchase, sanitize,
};
use serde_json::json;

fn tile(tile_id: i64, gold: f64, carbon: f64, can_purchase: bool) -> AvailableTile {
    AvailableTile {
        tile_id,
        axial_q: i32::try_from(tile_id).unwrap_or_default(),
        axial_r: 0,
        land_type: LandType::Plain,
        current_gold_price: gold,
        current_carbon_price: carbon,
        current_population: None,
        team_owned_area: 0.0,
        available_area: Some(50.0),
        can_purchase,
    }
}

fn market_with(tiles: Vec<AvailableTile>) -> LandMarket<MemoryLandApi> {
    let api = MemoryLandApi::new(tiles, 10_000.0, 10_000.0);
    let mut market = LandMarket::new(api, MarketConfig::default());
    block_on(market.refresh(0));
    market
}

#[test]
fn invalid_areas_never_reach_the_backend() {
    let mut market = market_with(vec![tile(7, 10.0, 5.0, true)]);
    market.purchase_mut().select(&tile(7, 10.0, 5.0, true)).unwrap();

    for area in [0.0, -2.0, 1.5, f64::NAN] {
        market.set_purchase_area(area);
        block_on(market.revalidate());
    }
    assert_eq!(market.api().calls().validate_purchase, 0);

    let warnings = market.drain_notices();
    assert_eq!(warnings.len(), 4);
    assert!(warnings.iter().all(|n| n.level == NoticeLevel::Warning));
    assert_eq!(market.purchase().phase(), PurchasePhase::TileSelected);

    let api = MemoryLandApi::generated(3, 1);
    block_on(quote(&api, 1, 2.5));
    assert_eq!(api.calls().validate_purchase, 0);
}

#[test]
fn tile_seven_quotes_forty_five_for_three_units() {
    let seven = tile(7, 10.0, 5.0, true);
    assert!((estimate_quote(&seven, 3) - 45.0).abs() < f64::EPSILON);

    let mut market = market_with(vec![seven]);
    market.set_purchase_area(3.0);
    block_on(market.select_tile(7));
    let validation = market.purchase().validation().unwrap();
    assert!((validation.total_cost - 45.0).abs() < f64::EPSILON);
    assert!(validation.can_purchase);
    assert_eq!(market.purchase().phase(), PurchasePhase::ValidationReady);
}

#[test]
fn missing_total_cost_sanitizes_to_zero() {
    let raw = RawPurchaseValidation(json!({
        "canPurchase": 1,
        "goldCost": "30",
        "carbonCost": null,
        "errors": []
    }));
    let validation = sanitize(&raw);
    assert!(validation.can_purchase);
    for value in [
        validation.gold_cost,
        validation.carbon_cost,
        validation.total_cost,
        validation.available_area,
        validation.team_gold_balance,
        validation.team_carbon_balance,
    ] {
        assert!(value.abs() < f64::EPSILON);
    }
}

#[test]
fn single_purchase_refreshes_both_resources() {
    let mut market = market_with(vec![tile(7, 10.0, 5.0, true), tile(8, 4.0, 2.0, true)]);
    market.set_purchase_area(2.0);
    block_on(market.select_tile(7));
    market.open_purchase_dialog().unwrap();
    assert!(market.dialogs().purchase);

    let bought = block_on(market.confirm_purchase(1_000)).unwrap();
    assert!(bought);
    assert!(!market.dialogs().purchase);
    assert_eq!(market.purchase().phase(), PurchasePhase::Success);
    assert_eq!(market.api().calls().available_tiles, 2);
    assert_eq!(market.api().calls().team_summary, 2);
    assert!((market.tile(7).unwrap().team_owned_area - 2.0).abs() < f64::EPSILON);
    assert_eq!(market.team_summary().unwrap().tiles_owned_count, 1);
    assert_eq!(market.drain_animations(), vec![7]);

    let notices = market.drain_notices();
    assert_eq!(notices[0].title, "Land Purchased");
    assert_eq!(notices[0].delay_ms, MarketConfig::default().success_notice_delay_ms);
}

#[test]
fn enter_after_a_purchase_does_not_warn_about_the_bought_tile() {
    let mut market = market_with(vec![tile(7, 10.0, 5.0, true)]);
    block_on(market.select_tile(7));
    market.open_purchase_dialog().unwrap();
    assert!(block_on(market.confirm_purchase(1_000)).unwrap());
    assert!(market.purchase().selected().is_none());
    market.drain_notices();

    block_on(market.handle_key(&KeyInput::plain("Enter"), 1_100));
    assert!(market.drain_notices().is_empty());
    assert!(!market.dialogs().purchase);
}

#[test]
fn area_change_in_open_dialog_requests_a_new_quote() {
    let mut market = market_with(vec![tile(7, 10.0, 5.0, true)]);
    block_on(market.select_tile(7));
    market.open_purchase_dialog().unwrap();
    assert_eq!(market.api().calls().validate_purchase, 1);

    market.set_purchase_area(9.0);
    assert!(market.purchase().validation().is_none());
    block_on(market.revalidate());
    assert_eq!(market.api().calls().validate_purchase, 2);
    assert!(market.dialogs().purchase);
    assert_eq!(market.purchase().phase(), PurchasePhase::Confirming);
    let total = market.purchase().validation().unwrap().total_cost;
    assert!((total - 135.0).abs() < f64::EPSILON);

    assert!(block_on(market.confirm_purchase(10)).unwrap());
    assert_eq!(market.api().purchases()[0].area, 9);
}

#[test]
fn fractional_area_in_open_dialog_warns_and_blocks_confirm() {
    let mut market = market_with(vec![tile(7, 10.0, 5.0, true)]);
    block_on(market.select_tile(7));
    market.open_purchase_dialog().unwrap();
    market.drain_notices();

    market.set_purchase_area(1.5);
    block_on(market.revalidate());
    assert_eq!(market.api().calls().validate_purchase, 1);
    let notices = market.drain_notices();
    assert!(notices.iter().any(|n| n.title == "Invalid Area"));

    assert_eq!(
        block_on(market.confirm_purchase(10)),
        Err(FlowError::ValidationBlocked)
    );
    assert!(market.api().purchases().is_empty());
}

#[test]
fn rejected_purchase_surfaces_message_and_keeps_quote() {
    let mut market = market_with(vec![tile(7, 10.0, 5.0, true)]);
    market.api().fail_purchases_for(7, "Activity is closed");
    block_on(market.select_tile(7));
    market.open_purchase_dialog().unwrap();

    let bought = block_on(market.confirm_purchase(10)).unwrap();
    assert!(!bought);
    assert_eq!(market.purchase().phase(), PurchasePhase::ValidationReady);
    assert_eq!(market.api().calls().available_tiles, 1);
    let notices = market.drain_notices();
    let failure = notices.iter().find(|n| n.title == "Purchase Failed").unwrap();
    assert_eq!(failure.message, "Activity is closed");

    assert!(market.dialogs().purchase);
    assert!(market.purchase().can_confirm());
    assert!(!block_on(market.confirm_purchase(20)).unwrap());
    assert_eq!(market.api().calls().purchase, 2);
}

#[test]
fn bulk_run_accounts_for_every_resolved_tile() {
    let tiles: Vec<_> = (1..=6).map(|id| tile(id, 5.0, 5.0, true)).collect();
    let mut market = market_with(tiles);
    market.api().fail_purchases_for(2, "Insufficient gold balance");
    market.api().fail_purchases_for(5, "Pricing unavailable");

    market.apply_command(Command::ToggleBulkMode);
    for id in 1..=6 {
        market.click_tile(id);
    }
    market.set_bulk_area(2.6);
    market.open_bulk_dialog().unwrap();

    let report = block_on(market.run_bulk(500)).unwrap();
    assert_eq!(report.success_count + report.fail_count, 6);
    assert_eq!(report.success_count, 4);
    assert_eq!(report.errors.len(), 2);

    let purchases = market.api().purchases();
    assert_eq!(purchases.len(), 6);
    assert!(purchases.iter().all(|p| p.area == 3));
    let order: Vec<_> = purchases.iter().map(|p| p.tile_id).collect();
    assert_eq!(order, vec![1, 2, 3, 4, 5, 6]);

    assert!(market.selection().is_empty());
    assert!(!market.dialogs().bulk);
    assert!(!market.is_bulk_purchasing());
    assert_eq!(market.api().calls().available_tiles, 2);

    let titles: Vec<_> = market.drain_notices().into_iter().map(|n| n.title).collect();
    assert!(titles.contains(&"Bulk Purchase Complete".to_string()));
    assert!(titles.contains(&"Some Purchases Failed".to_string()));
}

#[test]
fn bulk_run_skips_tiles_that_disappeared() {
    let mut market = market_with(vec![
        tile(5, 3.0, 1.0, true),
        tile(9, 3.0, 1.0, true),
        tile(12, 3.0, 1.0, true),
    ]);
    market.toggle_bulk_mode();
    for id in [5, 9, 12] {
        market.click_tile(id);
    }
    assert_eq!(market.selection().ids(), &[5, 9, 12]);

    market.api().remove_tile(9);
    block_on(market.refresh(100));
    assert!(market.tile(9).is_none());

    let report = block_on(market.run_bulk(200)).unwrap();
    assert_eq!(report.success_count, 2);
    assert_eq!(report.fail_count, 0);
    assert_eq!(report.skipped, vec![9]);
    let bought: Vec<_> = market.api().purchases().iter().map(|p| p.tile_id).collect();
    assert_eq!(bought, vec![5, 12]);
}

#[test]
fn unpurchasable_tiles_fail_without_a_request() {
    let api = MemoryLandApi::new(
        vec![tile(1, 1.0, 1.0, true), tile(2, 1.0, 1.0, false)],
        100.0,
        100.0,
    );
    let tiles = block_on(api.available_tiles()).unwrap();
    let index = TileIndex::build(&tiles);
    let report = block_on(run_bulk_purchase(&api, &[1, 2], &index, 1));
    assert_eq!(report.success_count, 1);
    assert_eq!(report.fail_count, 1);
    assert_eq!(api.calls().purchase, 1);
}

#[test]
fn bulk_selection_rejects_unpurchasable_tiles() {
    let mut market = market_with(vec![tile(1, 1.0, 1.0, true), tile(2, 1.0, 1.0, false)]);
    market.toggle_bulk_mode();
    assert!(market.toggle_bulk_tile(2).is_none());
    assert!(market.selection().is_empty());
    assert_eq!(market.drain_notices()[0].title, "Cannot Select Tile");
    assert_eq!(market.open_bulk_dialog(), Err(FlowError::EmptySelection));
}

#[test]
fn deselecting_in_bulk_mode_removes_only_that_tile() {
    let tiles: Vec<_> = (1..=4).map(|id| tile(id, 1.0, 1.0, true)).collect();
    let index = TileIndex::build(&tiles);
    let mut selection = BulkSelection::new();
    for id in 1..=4 {
        selection.toggle(id, &index).unwrap();
    }
    selection.toggle(3, &index).unwrap();
    assert_eq!(selection.ids(), &[1, 2, 4]);
}

#[test]
fn escape_closes_bulk_dialog_then_clears_selected_tile() {
    let mut market = market_with(vec![tile(7, 10.0, 5.0, true), tile(8, 1.0, 1.0, true)]);
    block_on(market.select_tile(7));
    market.open_purchase_dialog().unwrap();

    market.toggle_bulk_mode();
    assert!(market.purchase().selected().is_none());
    assert!(!market.dialogs().purchase);
    market.click_tile(8);
    market.open_bulk_dialog().unwrap();

    block_on(market.handle_key(&KeyInput::plain("Escape"), 0));
    assert!(!market.dialogs().bulk);
    assert!(market.bulk_mode());
    assert!(market.purchase().selected().is_none());

    block_on(market.handle_key(&KeyInput::plain("Escape"), 0));
    assert!(!market.bulk_mode());
    assert!(market.selection().is_empty());
}

#[test]
fn deselecting_closes_the_purchase_dialog_with_its_tile() {
    let mut market = market_with(vec![tile(7, 10.0, 5.0, true), tile(8, 1.0, 1.0, true)]);
    block_on(market.select_tile(7));
    market.open_purchase_dialog().unwrap();
    market.apply_command(Command::ShowHelp);

    market.deselect_tile();
    assert!(!market.dialogs().purchase);
    assert!(market.dialogs().help);

    block_on(market.handle_key(&KeyInput::plain("Escape"), 0));
    assert!(!market.dialogs().help);
    assert_eq!(market.purchase().phase(), PurchasePhase::Idle);
}

#[test]
fn refresh_shortcut_refetches_and_shortcuts_ignore_text_fields() {
    let mut market = market_with(vec![tile(1, 1.0, 1.0, true)]);
    let command = block_on(market.handle_key(&KeyInput::command("r"), 50));
    assert_eq!(command, Some(Command::Refresh));
    assert_eq!(market.api().calls().available_tiles, 2);

    let typing = KeyInput::plain("+").in_focus(landmark_core::FocusTarget::TextInput);
    assert_eq!(block_on(market.handle_key(&typing, 60)), None);
    assert!((market.viewport().zoom() - 1.0).abs() < f64::EPSILON);
}

#[test]
fn filtering_twice_is_idempotent() {
    let api = MemoryLandApi::generated(42, 3);
    let tiles = api.tiles();
    let filter = TileFilter {
        available_only: true,
        min_price: Some(10.0),
        max_price: Some(20.0),
        ..TileFilter::default()
    };
    let once = filter_tiles(&tiles, &filter);
    let twice = filter_tiles(&once, &filter);
    assert_eq!(once, twice);
    assert!(once.iter().all(|t| t.can_purchase));
}
