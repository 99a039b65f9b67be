pub mod atomic;
pub mod content_stream;
pub mod encoding;
pub mod reader;
pub mod writer;
