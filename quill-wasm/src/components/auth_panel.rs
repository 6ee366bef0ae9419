use leptos::ev::SubmitEvent;
use leptos::prelude::*;
use leptos::task::spawn_local;
use quill_core::{
    Field, LoginForm, RegistrationForm, Route, ValidationErrors, validate_registration,
};

use crate::api;
use crate::state::{AppState, FALLBACK_MESSAGE, console_warn};

const LOGIN_FALLBACK_MESSAGE: &str = "Invalid credentials";

#[component]
fn FieldError(errors: RwSignal<ValidationErrors>, field: Field) -> impl IntoView {
    view! {
        <Show when=move || errors.with(|errors| errors.get(field).is_some())>
            <small class="field-error">
                {move || errors.with(|errors| errors.get(field).unwrap_or_default())}
            </small>
        </Show>
    }
}

#[component]
fn MessageList(messages: RwSignal<Vec<String>>) -> impl IntoView {
    view! {
        <ul class="form-errors">
            {move || {
                messages
                    .get()
                    .into_iter()
                    .map(|message| view! { <li>{message}</li> })
                    .collect_view()
            }}
        </ul>
    }
}

#[component]
pub(crate) fn LoginPage(state: AppState) -> impl IntoView {
    let email = RwSignal::new(String::new());
    let password = RwSignal::new(String::new());
    let errors = RwSignal::new(ValidationErrors::default());
    let messages = RwSignal::new(Vec::<String>::new());

    let on_login = move |ev: SubmitEvent| {
        ev.prevent_default();
        messages.set(Vec::new());

        let form = LoginForm {
            email: email.get(),
            password: password.get(),
        };
        let form = match form.validate() {
            Ok(form) => {
                errors.set(ValidationErrors::default());
                form
            }
            Err(invalid) => {
                errors.set(invalid);
                return;
            }
        };

        state.loading.set(true);
        spawn_local(async move {
            match api::login(&form).await {
                Ok(token) => match state.sign_in(&token) {
                    Ok(()) => {
                        state.clear_error();
                        state.navigate(&Route::Dashboard);
                    }
                    Err(err) => state.report("Failed to store session", &err),
                },
                Err(err) => {
                    console_warn("login failed", &err);
                    messages.set(err.user_messages(LOGIN_FALLBACK_MESSAGE));
                }
            }
            state.loading.set(false);
        });
    };

    view! {
        <h2>"Login"</h2>
        <form class="auth-form" on:submit=on_login>
            <input
                placeholder="email"
                type="email"
                on:input=move |ev| email.set(event_target_value(&ev))
            />
            <FieldError errors=errors field=Field::Email />
            <input
                placeholder="password"
                type="password"
                on:input=move |ev| password.set(event_target_value(&ev))
            />
            <FieldError errors=errors field=Field::Password />
            <MessageList messages=messages />
            <button type="submit" disabled=move || state.loading.get()>"Login"</button>
        </form>
        <p>"No account? " <a href="#/register">"Register"</a></p>
    }
}

#[component]
pub(crate) fn RegisterPage(state: AppState) -> impl IntoView {
    let name = RwSignal::new(String::new());
    let email = RwSignal::new(String::new());
    let password = RwSignal::new(String::new());
    let errors = RwSignal::new(ValidationErrors::default());
    let messages = RwSignal::new(Vec::<String>::new());

    let on_register = move |ev: SubmitEvent| {
        ev.prevent_default();
        messages.set(Vec::new());

        let form = RegistrationForm {
            name: name.get(),
            email: email.get(),
            password: password.get(),
        };
        let invalid = validate_registration(&form);
        let blocked = !invalid.is_empty();
        errors.set(invalid);
        if blocked {
            return;
        }

        state.loading.set(true);
        spawn_local(async move {
            match api::register(&form).await {
                Ok(()) => {
                    state.clear_error();
                    state.navigate(&Route::Login);
                }
                Err(err) => {
                    console_warn("registration failed", &err);
                    messages.set(err.user_messages(FALLBACK_MESSAGE));
                }
            }
            state.loading.set(false);
        });
    };

    view! {
        <h2>"Register"</h2>
        <form class="auth-form" on:submit=on_register>
            <input
                placeholder="name"
                on:input=move |ev| name.set(event_target_value(&ev))
            />
            <FieldError errors=errors field=Field::Name />
            <input
                placeholder="email"
                type="email"
                on:input=move |ev| email.set(event_target_value(&ev))
            />
            <FieldError errors=errors field=Field::Email />
            <input
                placeholder="password"
                type="password"
                on:input=move |ev| password.set(event_target_value(&ev))
            />
            <FieldError errors=errors field=Field::Password />
            <MessageList messages=messages />
            <button type="submit" disabled=move || state.loading.get()>"Register"</button>
        </form>
        <p>"Already registered? " <a href="#/login">"Login"</a></p>
    }
}
