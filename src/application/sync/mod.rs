//! Synchronization between the local content store and the remote blog
//! service: dual-write on mutation, remote-primary reads with local fallback,
//! and the bulk resync sweep.

mod media;
mod service;
mod types;

pub use media::resolve_image_url;
pub use service::ContentSync;
pub use types::{
    ContentSource, DeleteReceipt, NewPost, PostDetail, PostFeed, PostReceipt, PostUpdate,
    ResyncReport, StatsReport, SyncStatus,
};
