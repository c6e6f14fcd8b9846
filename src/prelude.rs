//! Commonly used imports.
pub use anyhow::{bail, Context, Result};
pub use log::{debug, error, info, trace};
