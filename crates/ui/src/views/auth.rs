use dioxus::prelude::*;
use dioxus_router::{Link, use_navigator};
use kard_core::password::PasswordStrength;

use crate::context::AppContext;
use crate::routes::Route;

const GENERIC_AUTH_ERROR: &str = "An error occurred";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum AuthMode {
    SignIn,
    SignUp,
}

impl AuthMode {
    fn title(self) -> &'static str {
        match self {
            AuthMode::SignIn => "Login",
            AuthMode::SignUp => "Sign Up",
        }
    }

    fn submit_label(self) -> &'static str {
        match self {
            AuthMode::SignIn => "Sign In",
            AuthMode::SignUp => "Create Account",
        }
    }

    fn toggled(self) -> Self {
        match self {
            AuthMode::SignIn => AuthMode::SignUp,
            AuthMode::SignUp => AuthMode::SignIn,
        }
    }
}

#[component]
pub fn AuthView() -> Element {
    let ctx = use_context::<AppContext>();
    let navigator = use_navigator();

    let mut mode = use_signal(|| AuthMode::SignIn);
    let mut email = use_signal(String::new);
    let mut password = use_signal(String::new);
    let mut confirm = use_signal(String::new);
    let mut error = use_signal(|| None::<String>);
    let mut notice = use_signal(|| None::<&'static str>);
    let mut loading = use_signal(|| false);

    let current_mode = mode();
    let mismatch = current_mode == AuthMode::SignUp && password() != confirm();
    let show_confirm = current_mode == AuthMode::SignUp && !password().is_empty();

    let on_submit = move |evt: FormEvent| {
        evt.prevent_default();
        if loading() {
            return;
        }
        let auth = ctx.auth_service();
        spawn(async move {
            error.set(None);
            notice.set(None);
            loading.set(true);
            let result = match mode() {
                AuthMode::SignIn => auth.sign_in(&email(), &password()).await.map(|_| ()),
                AuthMode::SignUp => auth
                    .sign_up(&email(), &password(), &confirm())
                    .await
                    .map(|_| ()),
            };
            loading.set(false);
            match (result, mode()) {
                (Ok(()), AuthMode::SignIn) => {
                    navigator.push(Route::Home {});
                }
                (Ok(()), AuthMode::SignUp) => {
                    mode.set(AuthMode::SignIn);
                    password.set(String::new());
                    confirm.set(String::new());
                    notice.set(Some("Account created. Sign in to continue."));
                }
                (Err(e), _) => {
                    let message = if e.is_rejection() {
                        e.to_string()
                    } else {
                        GENERIC_AUTH_ERROR.to_owned()
                    };
                    error.set(Some(message));
                }
            }
        });
    };

    rsx! {
        div { class: "page auth-page",
            div { class: if loading() { "auth-card auth-card--busy" } else { "auth-card" },
                div { class: "auth-card__header",
                    Link { to: Route::Home {}, class: "auth-card__back", "Back" }
                    h1 { "{current_mode.title()}" }
                }
                if let Some(message) = error() {
                    div { class: "alert alert--error", role: "alert", "{message}" }
                }
                if let Some(message) = notice() {
                    div { class: "alert alert--success", role: "status", "{message}" }
                }
                form { class: "auth-form", onsubmit: on_submit,
                    label { r#for: "email", "Email" }
                    input {
                        id: "email",
                        r#type: "email",
                        required: true,
                        value: "{email}",
                        oninput: move |evt| email.set(evt.value()),
                    }
                    label { r#for: "password", "Password" }
                    input {
                        id: "password",
                        r#type: "password",
                        required: true,
                        value: "{password}",
                        oninput: move |evt| password.set(evt.value()),
                    }
                    if show_confirm {
                        label { r#for: "confirm-password", "Confirm Password" }
                        input {
                            id: "confirm-password",
                            class: if mismatch && !confirm().is_empty() { "input--error" } else { "" },
                            r#type: "password",
                            required: true,
                            value: "{confirm}",
                            oninput: move |evt| confirm.set(evt.value()),
                        }
                        StrengthMeter { password: password() }
                    }
                    button {
                        class: "btn btn-primary",
                        r#type: "submit",
                        disabled: loading() || mismatch,
                        if loading() { "Please wait…" } else { "{current_mode.submit_label()}" }
                    }
                }
                p { class: "auth-card__switch",
                    if current_mode == AuthMode::SignIn {
                        "Don't have an account? "
                    } else {
                        "Already have an account? "
                    }
                    button {
                        class: "btn-link",
                        r#type: "button",
                        onclick: move |_| {
                            mode.set(mode().toggled());
                            error.set(None);
                            notice.set(None);
                            password.set(String::new());
                            confirm.set(String::new());
                        },
                        if current_mode == AuthMode::SignIn { "Sign up" } else { "Sign in" }
                    }
                }
            }
        }
    }
}

#[component]
fn StrengthMeter(password: String) -> Element {
    let strength = PasswordStrength::evaluate(&password);
    let percent = PasswordStrength::percent(&password);
    let tone = format!("strength__fill strength__fill--{}", PasswordStrength::score(&password));

    rsx! {
        div { class: "strength",
            div { class: "strength__track",
                div { class: "{tone}", style: "width: {percent}%" }
            }
            p { class: "strength__label", "{strength.label()}" }
        }
    }
}
