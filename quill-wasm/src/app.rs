use leptos::ev;
use leptos::prelude::*;
use quill_core::{Route, THEME_KEY, TOKEN_KEY, Theme};

use crate::components::auth_panel::{LoginPage, RegisterPage};
use crate::components::create_post::CreatePage;
use crate::components::dashboard::Dashboard;
use crate::components::post_detail::PostDetail;
use crate::state::{AppState, current_route};
use crate::storage::BrowserStorage;

#[component]
pub fn App() -> impl IntoView {
    let (state, subscription) = AppState::new();
    on_cleanup(move || {
        state.session.update_value(|session| {
            session.unsubscribe(subscription);
        });
    });

    window_event_listener(ev::hashchange, move |_| state.route.set(current_route()));

    // Вход/выход в другой вкладке приходит только через событие storage.
    window_event_listener(ev::storage, move |event| match event.key().as_deref() {
        Some(TOKEN_KEY) | None => state.refresh_session(),
        Some(THEME_KEY) => state.theme.set(Theme::load(&BrowserStorage)),
        Some(_) => {}
    });

    // Защищённые экраны без входа уводят на логин, `/` ведёт в ленту или на логин.
    Effect::new(move |_| {
        let requested = state.route.get();
        let actual = requested.clone().resolve(state.authenticated.get());
        if actual != requested {
            state.navigate(&actual);
        }
    });

    let on_toggle_theme = move |_| {
        let next = state.theme.get_untracked().toggled();
        if let Err(err) = next.save(&BrowserStorage) {
            state.report("Failed to save theme", &err);
        }
        state.theme.set(next);
    };

    let on_logout = move |_| {
        if let Err(err) = state.sign_out() {
            state.report("Failed to sign out", &err);
            return;
        }
        state.posts.update(|store| store.replace_all(Vec::new()));
        state.navigate(&Route::Login);
    };

    let screen = Memo::new(move |_| state.route.get().resolve(state.authenticated.get()));
    let page = move || match screen.get() {
        Route::Login => view! { <LoginPage state=state /> }.into_any(),
        Route::Register => view! { <RegisterPage state=state /> }.into_any(),
        Route::Create => view! { <CreatePage state=state /> }.into_any(),
        Route::PostDetail(id) => view! { <PostDetail state=state id=id /> }.into_any(),
        Route::Root | Route::Dashboard => view! { <Dashboard state=state /> }.into_any(),
    };

    view! {
        <main class=move || format!("page theme-{}", state.theme.get())>
            <header class="topbar">
                <a href="#/dashboard"><h1>"Quill"</h1></a>
                <nav>
                    <Show
                        when=move || state.authenticated.get()
                        fallback=|| view! {
                            <a href="#/login">"Login"</a>
                            <a href="#/register">"Register"</a>
                        }
                    >
                        <a href="#/dashboard">"Dashboard"</a>
                        <a href="#/create">"New post"</a>
                        <button on:click=on_logout>"Logout"</button>
                    </Show>
                    <button on:click=on_toggle_theme>
                        {move || match state.theme.get() {
                            Theme::Light => "Dark mode",
                            Theme::Dark => "Light mode",
                        }}
                    </button>
                </nav>
            </header>

            <section class="container">
                <Show when=move || state.error.get().is_some()>
                    <div class="error-banner">
                        {move || state.error.get().unwrap_or_default()}
                        <button on:click=move |_| state.clear_error()>"×"</button>
                    </div>
                </Show>

                {page}
            </section>
        </main>
    }
}
