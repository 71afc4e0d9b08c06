//! Content module - display models, mapping and pagination

pub mod feed;
pub mod mapper;
mod post;
pub mod reading;

pub use feed::{FeedState, PostFeed};
pub use mapper::{map_detail, map_summaries, map_summary};
pub use post::{ContentSection, PostDetail, PostLink, PostNavigation, PostSummary};
