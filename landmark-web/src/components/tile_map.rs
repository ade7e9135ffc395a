use std::fmt::Write as _;
use std::rc::Rc;

use landmark_core::{LandType, MapTile, TileView};
use yew::prelude::*;

use super::fmt_amount;

#[derive(Properties, PartialEq, Clone)]
pub struct Props {
    pub view: Rc<TileView>,
    pub hex_size: f64,
    pub zoom: f64,
    #[prop_or_default]
    pub selected: Option<i64>,
    #[prop_or_default]
    pub bulk_mode: bool,
    #[prop_or_default]
    pub animating: Vec<i64>,
    pub on_click: Callback<i64>,
}

/// Corner list for a pointy-top hexagon, as an SVG `points` attribute.
#[must_use]
pub fn hex_points(center: (f64, f64), size: f64) -> String {
    let mut points = String::new();
    for corner in 0..6_u8 {
        let angle = (60.0 * f64::from(corner) - 30.0).to_radians();
        let x = size.mul_add(angle.cos(), center.0);
        let y = size.mul_add(angle.sin(), center.1);
        if !points.is_empty() {
            points.push(' ');
        }
        let _ = write!(points, "{x:.2},{y:.2}");
    }
    points
}

/// `min-x min-y width height` covering every hex with one hex of margin.
#[must_use]
pub fn view_box(tiles: &[MapTile], size: f64) -> String {
    if tiles.is_empty() {
        return "0 0 1 1".to_string();
    }
    let (mut min_x, mut min_y) = (f64::INFINITY, f64::INFINITY);
    let (mut max_x, mut max_y) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
    for tile in tiles {
        min_x = min_x.min(tile.center.0);
        min_y = min_y.min(tile.center.1);
        max_x = max_x.max(tile.center.0);
        max_y = max_y.max(tile.center.1);
    }
    let pad = size * 2.0;
    format!(
        "{:.2} {:.2} {:.2} {:.2}",
        min_x - pad,
        min_y - pad,
        max_x - min_x + pad * 2.0,
        max_y - min_y + pad * 2.0
    )
}

fn tile_class(tile: &MapTile, selected: Option<i64>, animating: &[i64]) -> Classes {
    let land = match &tile.tile.land_type {
        LandType::Plain => "hex--plain",
        LandType::Coastal => "hex--coastal",
        LandType::Marine => "hex--marine",
        LandType::Other(_) => "hex--other",
    };
    classes!(
        "hex",
        land,
        tile.tile.can_purchase.then_some("hex--available"),
        tile.tile.is_owned().then_some("hex--owned"),
        tile.selected.then_some("hex--bulk-selected"),
        (selected == Some(tile.tile.tile_id)).then_some("hex--selected"),
        animating.contains(&tile.tile.tile_id).then_some("hex--purchased"),
    )
}

#[function_component(TileMap)]
pub fn tile_map(props: &Props) -> Html {
    let tiles = &props.view.map_tiles;
    let transform = format!("scale({:.2})", props.zoom);
    html! {
        <div class={classes!("tile-map", props.bulk_mode.then_some("tile-map--bulk"))}>
            <svg
                class="tile-map__svg"
                viewBox={view_box(tiles, props.hex_size)}
                role="img"
                aria-label="Land tiles"
            >
                <g transform={transform}>
                    { for tiles.iter().map(|tile| {
                        let id = tile.tile.tile_id;
                        let on_click = props.on_click.clone();
                        let click = Callback::from(move |_: MouseEvent| on_click.emit(id));
                        html! {
                            <polygon
                                key={id}
                                data-tile-id={id.to_string()}
                                class={tile_class(tile, props.selected, &props.animating)}
                                points={hex_points(tile.center, props.hex_size)}
                                onclick={click}
                            >
                                <title>{ format!(
                                    "Tile {id} ({}) price {}",
                                    tile.tile.land_type,
                                    fmt_amount(tile.unit_price)
                                ) }</title>
                            </polygon>
                        }
                    }) }
                </g>
            </svg>
            if tiles.is_empty() {
                <p class="tile-map__empty">{"No tiles match the current filters."}</p>
            }
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_has_six_corners_at_radius() {
        let points = hex_points((0.0, 0.0), 10.0);
        let corners: Vec<_> = points.split(' ').collect();
        assert_eq!(corners.len(), 6);
        assert_eq!(corners[0], "8.66,-5.00");
    }

    #[test]
    fn empty_map_has_unit_view_box() {
        assert_eq!(view_box(&[], 10.0), "0 0 1 1");
    }
}
