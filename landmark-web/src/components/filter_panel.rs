use landmark_core::{LandType, TileFilter};
use web_sys::{HtmlInputElement, HtmlSelectElement};
use yew::prelude::*;

#[derive(Properties, PartialEq, Clone)]
pub struct Props {
    pub filter: TileFilter,
    pub on_change: Callback<TileFilter>,
}

/// Blank or unparsable input clears the bound.
#[must_use]
pub fn parse_bound(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

#[must_use]
pub fn parse_land_type(raw: &str) -> Option<LandType> {
    match raw {
        "" => None,
        "PLAIN" => Some(LandType::Plain),
        "COASTAL" => Some(LandType::Coastal),
        "MARINE" => Some(LandType::Marine),
        other => Some(LandType::Other(other.to_string())),
    }
}

fn bound_value(bound: Option<f64>) -> String {
    bound.map(|v| v.to_string()).unwrap_or_default()
}

#[function_component(FilterPanel)]
pub fn filter_panel(props: &Props) -> Html {
    let update = |apply: fn(&mut TileFilter, String)| {
        let filter = props.filter.clone();
        let on_change = props.on_change.clone();
        move |value: String| {
            let mut next = filter.clone();
            apply(&mut next, value);
            on_change.emit(next);
        }
    };

    let on_available = {
        let set = update(|f, v| f.available_only = v == "true");
        Callback::from(move |e: Event| {
            let input: HtmlInputElement = e.target_unchecked_into();
            set(input.checked().to_string());
        })
    };
    let on_owned = {
        let set = update(|f, v| f.owned_only = v == "true");
        Callback::from(move |e: Event| {
            let input: HtmlInputElement = e.target_unchecked_into();
            set(input.checked().to_string());
        })
    };
    let on_land_type = {
        let set = update(|f, v| f.land_type = parse_land_type(&v));
        Callback::from(move |e: Event| {
            let select: HtmlSelectElement = e.target_unchecked_into();
            set(select.value());
        })
    };
    let on_min_price = {
        let set = update(|f, v| f.min_price = parse_bound(&v));
        Callback::from(move |e: Event| {
            let input: HtmlInputElement = e.target_unchecked_into();
            set(input.value());
        })
    };
    let on_max_price = {
        let set = update(|f, v| f.max_price = parse_bound(&v));
        Callback::from(move |e: Event| {
            let input: HtmlInputElement = e.target_unchecked_into();
            set(input.value());
        })
    };
    let on_min_area = {
        let set = update(|f, v| f.min_available_area = parse_bound(&v));
        Callback::from(move |e: Event| {
            let input: HtmlInputElement = e.target_unchecked_into();
            set(input.value());
        })
    };
    let on_reset = {
        let on_change = props.on_change.clone();
        Callback::from(move |_: MouseEvent| on_change.emit(TileFilter::default()))
    };

    let current_type = props
        .filter
        .land_type
        .as_ref()
        .map(ToString::to_string)
        .unwrap_or_default();

    html! {
        <form class="filter-panel" aria-label="Tile filters">
            <label>
                <input type="checkbox" id="filter-available" checked={props.filter.available_only} onchange={on_available} />
                {"Available only"}
            </label>
            <label>
                <input type="checkbox" id="filter-owned" checked={props.filter.owned_only} onchange={on_owned} />
                {"Owned by my team"}
            </label>
            <label>
                {"Land type"}
                <select id="filter-land-type" onchange={on_land_type}>
                    { for [("", "Any"), ("PLAIN", "Plain"), ("COASTAL", "Coastal"), ("MARINE", "Marine")]
                        .into_iter()
                        .map(|(value, label)| html! {
                            <option value={value} selected={current_type == value}>{ label }</option>
                        }) }
                </select>
            </label>
            <label>
                {"Min price"}
                <input type="number" id="filter-min-price" min="0" value={bound_value(props.filter.min_price)} onchange={on_min_price} />
            </label>
            <label>
                {"Max price"}
                <input type="number" id="filter-max-price" min="0" value={bound_value(props.filter.max_price)} onchange={on_max_price} />
            </label>
            <label>
                {"Min available area"}
                <input type="number" id="filter-min-area" min="0" value={bound_value(props.filter.min_available_area)} onchange={on_min_area} />
            </label>
            <button type="button" class="filter-panel__reset" onclick={on_reset}>{"Reset filters"}</button>
        </form>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_parse_or_clear() {
        assert_eq!(parse_bound(" 12.5 "), Some(12.5));
        assert_eq!(parse_bound(""), None);
        assert_eq!(parse_bound("abc"), None);
        assert_eq!(parse_bound("NaN"), None);
    }

    #[test]
    fn land_types_map_from_select_values() {
        assert_eq!(parse_land_type(""), None);
        assert_eq!(parse_land_type("COASTAL"), Some(LandType::Coastal));
        assert_eq!(
            parse_land_type("DESERT"),
            Some(LandType::Other("DESERT".to_string()))
        );
    }
}
