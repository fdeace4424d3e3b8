//! Pure domain calculations (no state, no I/O).

mod price_impact;

pub use price_impact::{DEFAULT_PRICE_IMPACT, DEFAULT_REFERENCE_FRACTION, PriceImpacts, price_decay_factor};
