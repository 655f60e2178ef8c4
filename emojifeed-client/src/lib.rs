//! Client side of the emoji feed: talking to the server, caching the feed,
//! composing posts and rendering the page.

pub mod api;
pub mod cache;
pub mod composer;
pub mod view;
