//! Fetching and extraction.
//!
//! [`http_client::Transport`] produces markup, [`dom::Document`] indexes it,
//! and the per-kind strategy lists in [`news`] and [`schedule`] turn it into
//! records using the pure normalizers in [`cleaner`].

pub mod cleaner;
pub mod dom;
pub mod http_client;
pub mod news;
pub mod render;
pub mod schedule;
