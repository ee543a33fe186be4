//! Ferrous Forwarder Infrastructure Layer
pub mod collections;
pub mod dns;
