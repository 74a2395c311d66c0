//! Built-in normalization passes.

mod translation;
mod verification;

pub use translation::{BasisTranslation, decompose};
pub use verification::BasisVerification;
