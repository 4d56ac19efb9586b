//! Panel approval adapters

mod interactive;

pub use interactive::InteractiveApproval;
