use dioxus::prelude::*;
use dioxus_router::{Link, Outlet, Routable, use_navigator, use_route};
use kard_core::access::{Gate, HOME_PATH, gate};
use kard_core::model::DeckId;
use services::{AppState, DashboardView};

use crate::context::AppContext;
use crate::views::{AuthView, CreateView, DecksView, HomeView, ProfileView, StudyView};

#[derive(Clone, Routable, PartialEq)]
#[rustfmt::skip]
pub enum Route {
    #[layout(Layout)]
        #[route("/", HomeView)] Home {},
        #[route("/auth", AuthView)] Auth {},
        #[route("/decks", DecksView)] Decks {},
        #[route("/create", CreateView)] Create {},
        #[route("/study/:deck_id", StudyView)] Study { deck_id: DeckId },
        #[route("/profile", ProfileView)] Profile {},
}

impl Route {
    fn dashboard_view(&self) -> Option<DashboardView> {
        match self {
            Route::Home {} => Some(DashboardView::Home),
            Route::Decks {} | Route::Study { .. } => Some(DashboardView::Decks),
            Route::Create {} => Some(DashboardView::Create),
            Route::Profile {} => Some(DashboardView::Profile),
            Route::Auth {} => None,
        }
    }

    fn for_redirect(target: &str) -> Self {
        if target == HOME_PATH {
            Route::Home {}
        } else {
            Route::Auth {}
        }
    }
}

#[component]
fn Layout() -> Element {
    let ctx = use_context::<AppContext>();
    let state = use_context::<Signal<AppState>>();
    let navigator = use_navigator();
    let route = use_route::<Route>();

    let signed_in = state.read().session.is_some();
    let decision = gate(&route.to_string(), signed_in);

    use_effect(use_reactive((&route, &signed_in), move |(route, signed_in)| {
        match gate(&route.to_string(), signed_in) {
            Gate::Redirect(target) => {
                navigator.replace(Route::for_redirect(target));
            }
            Gate::Allow => {
                if let Some(view) = route.dashboard_view() {
                    ctx.app_state().set_active_view(view);
                }
            }
        }
    }));

    let sidebar_open = state.read().sidebar_open;

    rsx! {
        div { class: if sidebar_open { "app" } else { "app app--collapsed" },
            Sidebar {}
            main { class: "content",
                if decision == Gate::Allow {
                    Outlet::<Route> {}
                }
            }
        }
    }
}

#[component]
fn Sidebar() -> Element {
    let ctx = use_context::<AppContext>();
    let state = use_context::<Signal<AppState>>();
    let AppState {
        session,
        sidebar_open,
        active_view,
    } = state.read().clone();
    let nav_class = |view: DashboardView| {
        if view == active_view { "nav-link nav-link--active" } else { "nav-link" }
    };

    rsx! {
        nav { class: if sidebar_open { "sidebar" } else { "sidebar sidebar--collapsed" },
            div { class: "sidebar__header",
                if sidebar_open {
                    h1 { "Kard" }
                }
                button {
                    class: "sidebar__toggle",
                    r#type: "button",
                    aria_label: if sidebar_open { "Collapse sidebar" } else { "Expand sidebar" },
                    onclick: move |_| {
                        ctx.app_state().toggle_sidebar();
                    },
                    if sidebar_open { "«" } else { "»" }
                }
            }
            if sidebar_open {
                ul {
                    li { class: nav_class(DashboardView::Home), Link { to: Route::Home {}, "Home" } }
                    if session.is_some() {
                        li { class: nav_class(DashboardView::Decks), Link { to: Route::Decks {}, "Your Decks" } }
                        li { class: nav_class(DashboardView::Create), Link { to: Route::Create {}, "Create" } }
                        li { class: nav_class(DashboardView::Profile), Link { to: Route::Profile {}, "Profile" } }
                    } else {
                        li { class: "nav-link", Link { to: Route::Auth {}, "Sign in" } }
                    }
                }
            }
        }
    }
}
