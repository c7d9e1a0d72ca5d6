//! Middleware shipped with the crate.

mod alternate_remote_ip;
pub use alternate_remote_ip::AlternateRemoteIp;

pub mod batcher;
pub use batcher::Batcher;

mod error_handler;
pub use error_handler::ErrorHandler;

mod request_logger;
pub use request_logger::RequestLogger;
