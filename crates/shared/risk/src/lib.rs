//! Risk constraints for the contagion model.
//!
//! The single default trigger in this model is leverage insolvency; the
//! taxonomy type leaves room for the triggers the full framework knows about.

mod leverage;

pub use leverage::{DefaultReason, LeverageConstraint};
