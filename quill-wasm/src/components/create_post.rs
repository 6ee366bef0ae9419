use leptos::ev::SubmitEvent;
use leptos::html;
use leptos::prelude::*;
use leptos::task::spawn_local;
use quill_core::actions;
use quill_core::{ActionError, PostDraft, Route};

use crate::api::{ApiError, UploadHost};
use crate::components::post_card::action_messages;
use crate::state::AppState;

#[component]
pub(crate) fn CreatePage(state: AppState) -> impl IntoView {
    let title = RwSignal::new(String::new());
    let content = RwSignal::new(String::new());
    let messages = RwSignal::new(Vec::<String>::new());
    let image_input: NodeRef<html::Input> = NodeRef::new();

    let on_create = move |ev: SubmitEvent| {
        ev.prevent_default();
        messages.set(Vec::new());

        let draft = PostDraft::new(title.get(), content.get());
        let image = image_input
            .get()
            .and_then(|input| input.files())
            .and_then(|files| files.get(0));

        state.loading.set(true);
        spawn_local(async move {
            let api = state.api();
            // Картинка загружается до создания поста; без хостинга пост не создаём.
            let result = match (image, UploadHost::configured()) {
                (Some(image), Some(host)) => {
                    actions::create_with_image(&api, &host, draft, image).await
                }
                (Some(_), None) => Err(ActionError::Upload(ApiError::Upload(
                    "image hosting is not configured".to_string(),
                ))),
                (None, _) => actions::create(&api, draft).await,
            };

            match result {
                Ok(post) => {
                    state.posts.update(|store| store.prepend(post));
                    state.navigate(&Route::Dashboard);
                }
                Err(err) => messages.set(action_messages(&err)),
            }
            state.loading.set(false);
        });
    };

    view! {
        <h2>"New post"</h2>
        <form class="create-form" on:submit=on_create>
            <input
                placeholder="Title"
                on:input=move |ev| title.set(event_target_value(&ev))
            />
            <textarea
                placeholder="Content"
                on:input=move |ev| content.set(event_target_value(&ev))
            />
            <input type="file" accept="image/*" node_ref=image_input />
            <ul class="form-errors">
                {move || messages.get().into_iter().map(|message| view! { <li>{message}</li> }).collect_view()}
            </ul>
            <button type="submit" disabled=move || state.loading.get()>"Publish"</button>
        </form>
    }
}
