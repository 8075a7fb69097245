//! Response models shared between the storage gateway and the HTTP layer

mod video;

pub use video::{FileOutcome, UploadFailure, UploadedVideo, VideoListItem};
