pub mod envelope;
pub mod http_transport;
