pub mod file_transport;

pub use file_transport::HttpFileTransport;
