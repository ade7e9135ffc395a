//! The land market page: owns the shared market and runs its effects.
use std::cell::{Cell, RefCell};
use std::future::Future;
use std::rc::Rc;

use landmark_core::{Command, LandMarket, MarketConfig, Notice, PreferenceStore, command_for};
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use wasm_bindgen_futures::spawn_local;
use web_sys::{KeyboardEvent, Window};
use yew::prelude::*;

use crate::action::Action;
use crate::api::HttpLandApi;
use crate::components::market_view::{MarketView, Snapshot};
use crate::controller::{self, SharedMarket};
use crate::dom;
use crate::input;
use crate::storage::LocalStoragePreferences;

type WebMarket = SharedMarket<HttpLandApi>;

const PURCHASE_ANIMATION_MS: i32 = 1_500;
const REVALIDATE_EVERY_MS: i32 = 10_000;

#[derive(Properties, PartialEq, Clone)]
pub struct Props {
    pub config: MarketConfig,
}

#[derive(Clone)]
struct Shell {
    market: WebMarket,
    toasts: Rc<RefCell<Vec<Notice>>>,
    animating: Rc<RefCell<Vec<i64>>>,
    redraw: Callback<()>,
}

impl Shell {
    /// Move queued notices and purchase animations from the market onto the
    /// page, honouring each notice's delay.
    fn flush(&self) {
        let (notices, purchased) = {
            let mut market = self.market.borrow_mut();
            (market.drain_notices(), market.drain_animations())
        };
        for notice in notices {
            if notice.delay_ms == 0 {
                self.toasts.borrow_mut().push(notice);
                continue;
            }
            let shell = self.clone();
            spawn_local(async move {
                let delay = i32::try_from(notice.delay_ms).unwrap_or(i32::MAX);
                dom::pause_ms(delay, "notice delay").await;
                shell.toasts.borrow_mut().push(notice);
                shell.redraw.emit(());
            });
        }
        if !purchased.is_empty() {
            self.animating.borrow_mut().extend(purchased.iter().copied());
            let shell = self.clone();
            spawn_local(async move {
                dom::pause_ms(PURCHASE_ANIMATION_MS, "purchase animation").await;
                shell
                    .animating
                    .borrow_mut()
                    .retain(|id| !purchased.contains(id));
                shell.redraw.emit(());
            });
        }
        self.redraw.emit(());
    }

    fn spawn<F, Fut>(&self, task: F)
    where
        F: FnOnce(WebMarket) -> Fut + 'static,
        Fut: Future<Output = ()> + 'static,
    {
        let shell = self.clone();
        self.redraw.emit(());
        spawn_local(async move {
            task(shell.market.clone()).await;
            shell.flush();
        });
    }

    fn dispatch(&self, action: Action) {
        match action {
            Action::DismissToast(idx) => {
                let mut toasts = self.toasts.borrow_mut();
                if idx < toasts.len() {
                    toasts.remove(idx);
                }
                drop(toasts);
                self.redraw.emit(());
            }
            action if action.is_remote() => self.spawn(move |market| async move {
                controller::dispatch_remote(&market, action, dom::now_ms()).await;
            }),
            action => {
                controller::dispatch_local(&mut self.market.borrow_mut(), action);
                self.flush();
            }
        }
    }
}

/// Window `keydown` subscription, removed on drop.
struct KeyListener {
    window: Window,
    closure: Closure<dyn FnMut(KeyboardEvent)>,
}

impl Drop for KeyListener {
    fn drop(&mut self) {
        let _ = self
            .window
            .remove_event_listener_with_callback("keydown", self.closure.as_ref().unchecked_ref());
    }
}

/// One listener for the page's lifetime; it reads the market at dispatch
/// time so it never needs re-registering.
fn listen_for_keys(shell: Shell) -> Option<KeyListener> {
    let window = dom::window().ok()?;
    let closure = Closure::<dyn FnMut(KeyboardEvent)>::new(move |event: KeyboardEvent| {
        let key = input::key_input(&event);
        let Some(command) = command_for(&key) else {
            return;
        };
        if command != Command::ClearBulkSelection {
            event.prevent_default();
        }
        shell.dispatch(Action::Key(command));
    });
    window
        .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref())
        .map_err(|err| dom::console_error(&dom::js_error_message(&err)))
        .ok()?;
    Some(KeyListener { window, closure })
}

#[function_component(LandMarketPage)]
pub fn land_market_page(props: &Props) -> Html {
    let market = {
        let config = props.config.clone();
        use_mut_ref(move || {
            let api = HttpLandApi::new(config.api_base_url.clone());
            LandMarket::new(api, config)
        })
    };
    let toasts = use_mut_ref(Vec::<Notice>::new);
    let animating = use_mut_ref(Vec::<i64>::new);
    let tutorial_visible = use_state(|| !LocalStoragePreferences.tutorial_completed());
    let force = use_force_update();

    let shell = Shell {
        market: market.clone(),
        toasts: toasts.clone(),
        animating: animating.clone(),
        redraw: Callback::from(move |()| force.force_update()),
    };

    {
        let shell = shell.clone();
        use_effect_with((), move |()| {
            let listener = listen_for_keys(shell.clone());
            let alive = Rc::new(Cell::new(true));
            shell.dispatch(Action::Refresh);
            let running = Rc::clone(&alive);
            spawn_local(async move {
                while running.get() {
                    let slept = dom::pause_ms(REVALIDATE_EVERY_MS, "revalidation").await;
                    if !slept || !running.get() {
                        break;
                    }
                    controller::ensure_fresh(&shell.market, dom::now_ms()).await;
                    shell.flush();
                }
            });
            move || {
                alive.set(false);
                drop(listener);
            }
        });
    }

    let on_action = {
        let shell = shell.clone();
        let tutorial_visible = tutorial_visible.clone();
        Callback::from(move |action: Action| {
            if action == Action::DismissTutorial {
                LocalStoragePreferences.mark_tutorial_completed();
                tutorial_visible.set(false);
                return;
            }
            shell.dispatch(action);
        })
    };

    let snapshot = Snapshot::capture(&mut market.borrow_mut());
    html! {
        <MarketView
            snapshot={snapshot}
            toasts={toasts.borrow().clone()}
            animating={animating.borrow().clone()}
            tutorial_visible={*tutorial_visible}
            on_action={on_action}
        />
    }
}
