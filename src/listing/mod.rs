//! Generic logic for code listings.
mod generic_listing;

pub use generic_listing::*;
