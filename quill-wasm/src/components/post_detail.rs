use leptos::ev::SubmitEvent;
use leptos::prelude::*;
use leptos::task::spawn_local;
use quill_core::actions;
use quill_core::format::display_date;
use quill_core::{BlogApi, Post};

use crate::components::post_card::{ReactionBar, action_messages};
use crate::state::AppState;

#[component]
pub(crate) fn PostDetail(state: AppState, id: String) -> impl IntoView {
    let post = RwSignal::new(None::<Post>);
    let comment_text = RwSignal::new(String::new());
    let messages = RwSignal::new(Vec::<String>::new());

    // Сначала то, что уже есть в ленте, затем свежая версия с сервера.
    post.set(state.posts.with_untracked(|store| store.find(&id).cloned()));
    state.loading.set(true);
    spawn_local(async move {
        match state.api().get_post(&id).await {
            Ok(fresh) => post.set(Some(fresh)),
            Err(err) => state.report("Failed to load post", &err),
        }
        state.loading.set(false);
    });

    let on_updated = Callback::new(move |updated: Post| {
        state.commit(updated.clone());
        post.set(Some(updated));
    });

    let on_comment = move |ev: SubmitEvent| {
        ev.prevent_default();
        let Some(current) = post.get_untracked() else {
            return;
        };
        let text = comment_text.get_untracked();
        spawn_local(async move {
            match actions::comment(&state.api(), &current, &text).await {
                Ok(updated) => {
                    comment_text.set(String::new());
                    messages.set(Vec::new());
                    on_updated.run(updated);
                }
                Err(err) => messages.set(action_messages(&err)),
            }
        });
    };

    view! {
        <a href="#/dashboard">"← Back"</a>
        {move || match post.get() {
            None => view! {
                <p class="empty">
                    {move || if state.loading.get() { "Loading..." } else { "Post not found" }}
                </p>
            }
            .into_any(),
            Some(current) => {
                let created_at = current.created_at.as_ref().map(display_date);
                let comments = current
                    .comments
                    .iter()
                    .map(|comment| {
                        view! {
                            <li>
                                <strong>{comment.author_name().to_string()}</strong>
                                ": "
                                {comment.text.clone()}
                            </li>
                        }
                    })
                    .collect_view();
                view! {
                    <article class="post-detail">
                        <h2>{current.title.clone()}</h2>
                        <small>
                            {current.author_name().to_string()}
                            {created_at.map(|date| format!(" · {date}"))}
                        </small>
                        {current.image.clone().map(|src| view! { <img src=src alt="" /> })}
                        <p>{current.content.clone()}</p>
                        <ReactionBar state=state post=current.clone() on_updated=on_updated />
                        <h3>{format!("Comments ({})", current.comments.len())}</h3>
                        <ul class="comments">{comments}</ul>
                    </article>
                }
                .into_any()
            }
        }}
        <form class="comment-form" on:submit=on_comment>
            <input
                placeholder="Write a comment"
                prop:value=move || comment_text.get()
                on:input=move |ev| comment_text.set(event_target_value(&ev))
            />
            <button type="submit">"Comment"</button>
        </form>
        <ul class="form-errors">
            {move || messages.get().into_iter().map(|message| view! { <li>{message}</li> }).collect_view()}
        </ul>
    }
}
