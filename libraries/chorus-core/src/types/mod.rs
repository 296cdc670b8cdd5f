mod ids;
mod item;
mod notification;
mod requester;

pub use ids::{ContextId, ItemId, RequesterId, SessionId};
pub use item::{AudioSource, PlayableItem, TrackInfo, DEFAULT_SOURCE_VOLUME};
pub use notification::{Notification, NowPlaying};
pub use requester::Requester;
