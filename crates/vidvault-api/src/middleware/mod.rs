pub mod payload_limit;
pub mod request_id;
pub mod security_headers;

pub use payload_limit::payload_too_large_middleware;
pub use request_id::request_id_middleware;
