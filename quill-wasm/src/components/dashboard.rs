use leptos::prelude::*;
use leptos::task::spawn_local;
use quill_core::{BlogApi, Post};

use crate::components::post_card::{PostCard, post_key};
use crate::state::AppState;

fn load_posts(state: AppState) {
    state.loading.set(true);

    spawn_local(async move {
        let result = state.api().list_posts().await;
        let mut failure = None;
        state.posts.update(|store| {
            if let Err(err) = store.apply_loaded(result) {
                failure = Some(err);
            }
        });
        if let Some(err) = failure {
            state.report("Failed to load posts", &err);
        }
        state.loading.set(false);
    });
}

#[component]
pub(crate) fn Dashboard(state: AppState) -> impl IntoView {
    load_posts(state);

    let visible = move || {
        state
            .posts
            .with(|store| store.visible().into_iter().cloned().collect::<Vec<Post>>())
    };

    view! {
        <h2>"Posts"</h2>
        <div class="toolbar">
            <input
                type="search"
                placeholder="Search by title"
                prop:value=move || state.posts.with(|store| store.query().to_string())
                on:input=move |ev| {
                    let query = event_target_value(&ev);
                    state.posts.update(|store| store.set_query(query));
                }
            />
            <button on:click=move |_| load_posts(state) disabled=move || state.loading.get()>
                "Refresh"
            </button>
        </div>

        <Show
            when=move || state.posts.with(|store| !store.filtered().is_empty())
            fallback=move || view! {
                <p class="empty">
                    {move || if state.loading.get() { "Loading..." } else { "No posts found" }}
                </p>
            }
        >
            <div class="feed">
                <For
                    each=visible
                    key=post_key
                    children=move |post| view! { <PostCard state=state post=post /> }
                />
            </div>
        </Show>

        <Show when=move || state.posts.with(|store| store.has_more())>
            <button
                class="load-more"
                on:click=move |_| state.posts.update(|store| {
                    store.reveal();
                })
            >
                "Load more"
            </button>
        </Show>
    }
}
