mod ids;
mod key;
mod model;

pub use ids::ItemId;
pub use key::{MediaKind, is_hls, is_mp4, stable_key};
pub(crate) use key::{has_extension, strip_query};
pub use model::FeedItem;
