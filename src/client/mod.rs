//! Terminal client side: an HTTP client for the API and the view state it feeds.

pub mod api;
pub mod state;
