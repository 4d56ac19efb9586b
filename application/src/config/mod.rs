//! Application-level configuration.
//!
//! - [`ConsultationParams`] - concurrency, timeouts and proposal limits

pub mod consultation_params;

pub use consultation_params::ConsultationParams;
