use dioxus::prelude::*;
use dioxus_router::use_navigator;
use kard_core::model::UserRecord;
use services::AppState;

use crate::context::AppContext;
use crate::routes::Route;
use crate::views::{ViewError, ViewState, view_state_from_resource};
use crate::vm::{format_long_date, format_login};

#[derive(Clone, Debug, PartialEq)]
struct ProfileData {
    user: UserRecord,
    deck_count: usize,
    card_count: usize,
}

#[component]
pub fn ProfileView() -> Element {
    let ctx = use_context::<AppContext>();
    let state = use_context::<Signal<AppState>>();
    let navigator = use_navigator();
    let mut signing_out = use_signal(|| false);
    let mut error = use_signal(|| None::<ViewError>);

    let users = ctx.user_service();
    let decks = ctx.deck_service();
    let resource = use_resource(move || {
        let users = users.clone();
        let decks = decks.clone();
        let owner = state.read().session.as_ref().map(|s| s.user_id);
        async move {
            let owner = owner.ok_or(ViewError::SignedOut)?;
            let user = users
                .get_user(owner)
                .await
                .map_err(|_| ViewError::Unknown)?
                .ok_or(ViewError::NotFound)?;
            let owned = decks.list_decks(owner).await.map_err(|_| ViewError::Unknown)?;
            Ok::<_, ViewError>(ProfileData {
                user,
                deck_count: owned.len(),
                card_count: owned.iter().map(|deck| deck.card_count()).sum(),
            })
        }
    });
    let profile = view_state_from_resource(&resource);

    let sign_out = move |_: MouseEvent| {
        let auth = ctx.auth_service();
        spawn(async move {
            signing_out.set(true);
            let result = auth.sign_out().await;
            signing_out.set(false);
            match result {
                Ok(()) => {
                    navigator.push(Route::Auth {});
                }
                Err(_) => error.set(Some(ViewError::Unknown)),
            }
        });
    };

    rsx! {
        div { class: "page profile-page",
            h2 { "Profile Settings" }
            p { "Manage your account settings and preferences." }
            if let Some(err) = error() {
                p { class: "alert alert--error", role: "alert", "{err.message()}" }
            }
            match profile {
                ViewState::Idle | ViewState::Loading => rsx! {
                    p { "Loading..." }
                },
                ViewState::Error(err) => rsx! {
                    p { class: "alert alert--error", "{err.message()}" }
                },
                ViewState::Ready(data) => rsx! {
                    section { class: "profile-section",
                        h3 { "Account Information" }
                        dl {
                            dt { "Name" }
                            dd { "{data.user.display_name()}" }
                            dt { "Email" }
                            dd { "{data.user.email}" }
                            dt { "Account Created" }
                            dd { "{format_long_date(data.user.created_at)}" }
                            dt { "Last Sign In" }
                            dd { "{format_login(data.user.last_login)}" }
                        }
                    }
                    section { class: "profile-section",
                        h3 { "Statistics" }
                        dl {
                            dt { "Total Decks" }
                            dd { "{data.deck_count}" }
                            dt { "Cards Created" }
                            dd { "{data.card_count}" }
                        }
                    }
                },
            }
            section { class: "profile-section",
                h3 { "Account Actions" }
                button {
                    class: "btn btn-danger",
                    r#type: "button",
                    disabled: signing_out(),
                    onclick: sign_out,
                    if signing_out() { "Signing out…" } else { "Sign Out" }
                }
            }
        }
    }
}
