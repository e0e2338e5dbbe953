pub mod log_sanitizer;
pub mod logging;
pub mod notification;
pub mod paypro_client;
