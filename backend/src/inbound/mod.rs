//! Inbound adapters translating browser requests into domain service calls,
//! keeping Actix details at the edge.

pub mod http;
