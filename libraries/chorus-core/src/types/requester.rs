use super::RequesterId;
use serde::{Deserialize, Serialize};

/// The listener who enqueued an item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requester {
    pub id: RequesterId,
    pub name: String,
    pub avatar_url: Option<String>,
}

impl Requester {
    /// Create a requester without an avatar
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: RequesterId::new(id),
            name: name.into(),
            avatar_url: None,
        }
    }

    /// Attach an avatar URL
    pub fn with_avatar(mut self, avatar_url: impl Into<String>) -> Self {
        self.avatar_url = Some(avatar_url.into());
        self
    }
}
