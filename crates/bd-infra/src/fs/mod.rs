pub mod media_source;

pub use media_source::FsMediaSource;
