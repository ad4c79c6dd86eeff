//! Email transports

pub mod mime;
pub mod smtp;
