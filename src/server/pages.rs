//! Static pages, embedded at build time.

use axum::response::Html;

const INDEX_HTML: &str = include_str!("../../templates/index.html");
const CHAT_HTML: &str = include_str!("../../templates/chat.html");

pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

pub async fn chat() -> Html<&'static str> {
    Html(CHAT_HTML)
}
