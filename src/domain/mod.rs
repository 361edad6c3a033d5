pub mod channel;
pub mod video;
pub mod view;

pub use channel::Channel;
pub use video::Video;
pub use view::{unread_count_by_channel, unread_videos, VideoFilter, ViewMode};
