pub(crate) mod auth_panel;
pub(crate) mod create_post;
pub(crate) mod dashboard;
pub(crate) mod post_card;
pub(crate) mod post_detail;
