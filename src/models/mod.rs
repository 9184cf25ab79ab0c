pub mod asn;
pub mod queue;
pub mod request;

pub use asn::Asn;
pub use queue::QueueState;
pub use request::{StartRequest, StartResponse};
