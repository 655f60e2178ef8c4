use crate::{
    api::{ClientError, FeedApi, Session},
    cache::PostCreatedListener,
};
use emojifeed_common::model::post::Post;
use std::{
    fmt::{Debug, Formatter},
    sync::Arc,
};

pub const PLACEHOLDER: &str = "Type some emojis!!!";

/// State of the post input form.
#[derive(Default)]
pub struct Composer {
    input: String,
    listeners: Vec<Arc<dyn PostCreatedListener>>,
}

impl Composer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, input: impl Into<String>) {
        self.input = input.into();
    }

    /// Registers a listener that is told about every post this composer creates.
    pub fn subscribe(&mut self, listener: Arc<dyn PostCreatedListener>) {
        self.listeners.push(listener);
    }

    /// Posts the current input.
    ///
    /// On success the input is cleared and all listeners are notified. On
    /// failure the input is kept so it can be corrected. Without a session
    /// nothing is sent.
    pub async fn submit(
        &mut self,
        api: &dyn FeedApi,
        session: Option<&Session>,
    ) -> Result<Post, ClientError> {
        let session = session.ok_or(ClientError::SignInRequired)?;
        let post = api.create_post(session, &self.input).await?;

        self.input.clear();
        for listener in &self.listeners {
            listener.post_created(&post);
        }

        Ok(post)
    }
}

impl Debug for Composer {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Composer")
            .field("input", &self.input)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
