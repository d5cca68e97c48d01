use dioxus::prelude::*;
use dioxus_router::Router;
use services::AppState;

use crate::context::AppContext;
use crate::routes::Route;

/// Provides a `Signal<AppState>` mirroring the [`services::AppStateStore`].
///
/// The store stays the source of truth; views write through the store and
/// the subscription below copies every change into the signal.
pub fn use_app_state_provider() -> Signal<AppState> {
    let ctx = use_context::<AppContext>();
    let store = ctx.app_state();
    let state = use_context_provider(|| Signal::new(store.snapshot()));

    use_future(move || {
        let store = ctx.app_state();
        let mut state = state;
        async move {
            let mut rx = store.subscribe();
            while rx.changed().await.is_ok() {
                let next = rx.borrow_and_update().clone();
                state.set(next);
            }
        }
    });

    state
}

#[component]
pub fn App() -> Element {
    use_app_state_provider();

    rsx! {
        document::Stylesheet { href: asset!("/assets/style.css") }

        document::Title { "Kard" }

        div { class: "app-root",
            ErrorBoundary {
                handle_error: |errors: ErrorContext| rsx! {
                    div { class: "fatal",
                        h1 { "Something went wrong" }
                        pre { "{errors:?}" }
                    }
                },
                Router::<Route> {}
            }
        }
    }
}
