use leptos::prelude::*;
use leptos::task::spawn_local;
use quill_core::actions::{self, DeleteOutcome};
use quill_core::format::{content_preview, display_date, is_long};
use quill_core::{ActionError, Post, PostDraft, ReactionKind, Route};

use crate::api::ApiError;
use crate::state::{AppState, FALLBACK_MESSAGE};

type PostKey = (String, String, String, Vec<(String, ReactionKind)>, usize);

/// Ключ строки ленты: меняется при любом изменении, видимом в карточке.
pub(crate) fn post_key(post: &Post) -> PostKey {
    (
        post.id.clone(),
        post.title.clone(),
        post.content.clone(),
        post.likes
            .iter()
            .map(|reaction| (reaction.user.clone(), reaction.kind))
            .collect(),
        post.comments.len(),
    )
}

pub(crate) fn action_messages(err: &ActionError<ApiError>) -> Vec<String> {
    match err {
        ActionError::Validation(errors) => errors
            .iter()
            .map(|(_, message)| message.to_string())
            .collect(),
        ActionError::Upload(err) | ActionError::Api(err) => err.user_messages(FALLBACK_MESSAGE),
    }
}

fn reaction_icon(kind: ReactionKind) -> &'static str {
    match kind {
        ReactionKind::Like => "👍",
        ReactionKind::Love => "❤️",
        ReactionKind::Laugh => "😂",
    }
}

#[component]
pub(crate) fn ReactionBar(
    state: AppState,
    post: Post,
    on_updated: Callback<Post>,
) -> impl IntoView {
    let count = post.reaction_count();
    let post = StoredValue::new(post);

    let on_react = move |kind: ReactionKind| {
        let current = post.get_value();
        let me = state.current_user.get_untracked();
        spawn_local(async move {
            match actions::react(&state.api(), &current, me.as_deref(), kind).await {
                Ok(updated) => on_updated.run(updated),
                Err(err) => state.report("Failed to react", &err),
            }
        });
    };

    view! {
        <div class="reactions">
            {ReactionKind::ALL
                .into_iter()
                .map(|kind| {
                    let active = move || {
                        state
                            .current_user
                            .get()
                            .and_then(|me| post.with_value(|post| post.reaction_of(&me)))
                            == Some(kind)
                    };
                    view! {
                        <button
                            class:active=active
                            title=kind.as_str()
                            on:click=move |_| on_react(kind)
                        >
                            {reaction_icon(kind)}
                        </button>
                    }
                })
                .collect_view()}
            <span class="reaction-count">{count}</span>
        </div>
    }
}

#[component]
pub(crate) fn PostCard(state: AppState, post: Post) -> impl IntoView {
    let expanded = RwSignal::new(false);
    let editing = RwSignal::new(false);
    let edit_title = RwSignal::new(post.title.clone());
    let edit_content = RwSignal::new(post.content.clone());
    let messages = RwSignal::new(Vec::<String>::new());

    let long = is_long(&post.content);
    let detail_href = format!("#{}", Route::PostDetail(post.id.clone()).path());
    let created_at = post.created_at.as_ref().map(display_date);
    let comment_count = post.comments.len();
    let snapshot = post.clone();
    let post = StoredValue::new(post);

    let is_owner = move || {
        state
            .current_user
            .get()
            .is_some_and(|me| post.with_value(|post| post.is_authored_by(&me)))
    };

    let on_save = move |_| {
        let current = post.get_value();
        let draft = PostDraft::new(edit_title.get_untracked(), edit_content.get_untracked());
        spawn_local(async move {
            match actions::edit(&state.api(), &current, draft).await {
                Ok(updated) => {
                    messages.set(Vec::new());
                    editing.set(false);
                    state.commit(updated);
                }
                Err(err) => messages.set(action_messages(&err)),
            }
        });
    };

    let on_delete = move |_| {
        let id = post.with_value(|post| post.id.clone());
        spawn_local(async move {
            let confirm = |prompt: &str| window().confirm_with_message(prompt).unwrap_or(false);
            match actions::delete(&state.api(), &id, confirm).await {
                Ok(DeleteOutcome::Deleted) => state.posts.update(|store| {
                    store.apply_delete(&id);
                }),
                Ok(DeleteOutcome::Cancelled) => {}
                Err(err) => state.report("Failed to delete post", &err),
            }
        });
    };

    view! {
        <article class="post-card">
            <header>
                <a href=detail_href.clone()><h3>{post.with_value(|post| post.title.clone())}</h3></a>
                <small>
                    {post.with_value(|post| post.author_name().to_string())}
                    {created_at.map(|date| format!(" · {date}"))}
                </small>
            </header>

            {post.with_value(|post| post.image.clone()).map(|src| view! { <img src=src alt="" /> })}

            <Show
                when=move || editing.get()
                fallback=move || view! {
                    <p>
                        {move || post.with_value(|post| {
                            content_preview(&post.content, expanded.get()).into_owned()
                        })}
                    </p>
                    <Show when=move || long>
                        <button class="link" on:click=move |_| expanded.update(|value| *value = !*value)>
                            {move || if expanded.get() { "See Less" } else { "See More" }}
                        </button>
                    </Show>
                }
            >
                <div class="edit-form">
                    <input
                        prop:value=move || edit_title.get()
                        on:input=move |ev| edit_title.set(event_target_value(&ev))
                    />
                    <textarea
                        prop:value=move || edit_content.get()
                        on:input=move |ev| edit_content.set(event_target_value(&ev))
                    />
                    <button on:click=on_save>"Save"</button>
                    <button on:click=move |_| editing.set(false)>"Cancel"</button>
                </div>
            </Show>

            <ul class="form-errors">
                {move || messages.get().into_iter().map(|message| view! { <li>{message}</li> }).collect_view()}
            </ul>

            <footer>
                <ReactionBar
                    state=state
                    post=snapshot
                    on_updated=Callback::new(move |updated: Post| state.commit(updated))
                />
                <a href=detail_href>{format!("{comment_count} comments")}</a>
                <Show when=is_owner>
                    <button on:click=move |_| editing.set(true)>"Edit"</button>
                    <button on:click=on_delete>"Delete"</button>
                </Show>
            </footer>
        </article>
    }
}
