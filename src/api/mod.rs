//! HTTP API Module
//!
//! One router per role, built directly on the store contracts.

mod http;

pub use http::{follower_router, leader_router, local_router, serve};
