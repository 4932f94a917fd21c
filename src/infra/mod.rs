//! Distribution infrastructure: snapshot payloads and the channels that carry them.

pub mod channel;
pub mod snapshot;

pub use channel::{channels, Delivery, FeedPoll, SnapshotFeed, SnapshotPublisher};
pub use snapshot::{Column, ColumnLayout, TableRow, TableSnapshot, TimelineBar, TimelineSnapshot};
