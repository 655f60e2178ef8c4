use crate::identity::{IdentityError, IdentityProvider};
use async_trait::async_trait;
use emojifeed_common::model::author::{AuthorId, AuthorProfile};
use std::sync::atomic::{AtomicUsize, Ordering};

/// An [`IdentityProvider`] backed by a fixed list of profiles.
#[derive(Debug, Default)]
pub struct StaticDirectory {
    profiles: Vec<AuthorProfile>,
    lookups: AtomicUsize,
}

impl StaticDirectory {
    #[must_use]
    pub fn new(profiles: Vec<AuthorProfile>) -> Self {
        Self {
            profiles,
            lookups: AtomicUsize::new(0),
        }
    }

    /// Number of batched lookups served so far.
    #[must_use]
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl IdentityProvider for StaticDirectory {
    async fn fetch_profiles(
        &self,
        ids: &[AuthorId],
        limit: usize,
    ) -> Result<Vec<AuthorProfile>, IdentityError> {
        self.lookups.fetch_add(1, Ordering::Relaxed);

        Ok(self
            .profiles
            .iter()
            .filter(|profile| ids.contains(&profile.id))
            .take(limit)
            .cloned()
            .collect())
    }
}
