//! DoQ Gateway Application Layer
//!
//! Protocol logic of the gateway, written against ports so it can run over
//! quinn in production and over in-memory doubles in tests.

pub mod ports;
pub mod services;
pub mod use_cases;
