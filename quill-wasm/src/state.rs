use std::fmt::Display;

use leptos::prelude::*;
use quill_core::{
    PostListStore, Post, Route, SessionError, SessionGuard, SubscriptionId, Theme,
};
use wasm_bindgen::JsValue;

use crate::api::Api;
use crate::storage::BrowserStorage;

pub(crate) const FALLBACK_MESSAGE: &str = "Something went wrong";

#[derive(Clone, Copy)]
pub(crate) struct AppState {
    pub(crate) session: StoredValue<SessionGuard<BrowserStorage>>,
    pub(crate) authenticated: RwSignal<bool>,
    pub(crate) current_user: RwSignal<Option<String>>,
    pub(crate) route: RwSignal<Route>,
    pub(crate) posts: RwSignal<PostListStore>,
    pub(crate) theme: RwSignal<Theme>,
    pub(crate) error: RwSignal<Option<String>>,
    pub(crate) loading: RwSignal<bool>,
}

impl AppState {
    /// Состояние и подписка на изменения сессии; подписку нужно снять при размонтировании.
    pub(crate) fn new() -> (Self, SubscriptionId) {
        let mut session = SessionGuard::new(BrowserStorage);
        let authenticated = RwSignal::new(session.is_authenticated());
        let subscription = session.subscribe(move |value| authenticated.set(value));

        let state = Self {
            current_user: RwSignal::new(None),
            session: StoredValue::new(session),
            authenticated,
            route: RwSignal::new(current_route()),
            posts: RwSignal::new(PostListStore::new()),
            theme: RwSignal::new(Theme::load(&BrowserStorage)),
            error: RwSignal::new(None),
            loading: RwSignal::new(false),
        };
        state.sync_current_user();
        (state, subscription)
    }

    pub(crate) fn api(&self) -> Api {
        Api::new(self.session.with_value(|session| session.token()))
    }

    pub(crate) fn sign_in(&self, token: &str) -> Result<(), SessionError> {
        let mut result = Ok(());
        self.session
            .update_value(|session| result = session.sign_in(token));
        self.sync_current_user();
        result
    }

    pub(crate) fn sign_out(&self) -> Result<(), SessionError> {
        let mut result = Ok(());
        self.session
            .update_value(|session| result = session.sign_out());
        self.sync_current_user();
        result
    }

    /// Вызывается, когда токен поменяли в другой вкладке.
    pub(crate) fn refresh_session(&self) {
        self.session.update_value(|session| {
            session.refresh();
        });
        self.sync_current_user();
    }

    fn sync_current_user(&self) {
        let user = self.session.with_value(|session| {
            if !session.is_authenticated() {
                return None;
            }
            session
                .current_user_id()
                .inspect_err(|err| console_warn("cannot read current user", err))
                .ok()
        });
        self.current_user.set(user);
    }

    pub(crate) fn navigate(&self, route: &Route) {
        self.route.set(route.clone());
        if let Err(err) = window().location().set_hash(&route.path()) {
            console_warn("failed to update location", &format!("{err:?}"));
        }
    }

    /// Кладёт ответ сервера в ленту.
    pub(crate) fn commit(&self, post: Post) {
        self.posts.update(|store| {
            store.apply_update(post);
        });
    }

    pub(crate) fn report(&self, context: &str, err: &dyn Display) {
        console_warn(context, err);
        self.error.set(Some(format!("{context}: {err}")));
    }

    pub(crate) fn clear_error(&self) {
        self.error.set(None);
    }
}

pub(crate) fn current_route() -> Route {
    window()
        .location()
        .hash()
        .map(|hash| Route::parse(&hash))
        .unwrap_or(Route::Root)
}

pub(crate) fn console_warn(context: &str, err: &dyn Display) {
    web_sys::console::warn_1(&JsValue::from_str(&format!("{context}: {err}")));
}
