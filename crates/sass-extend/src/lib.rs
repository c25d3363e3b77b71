//! The `@extend` propagation engine: per-module extension storage, the
//! weave algorithm that rewrites registered selectors in place, and
//! `UnsatisfiedExtension` validation (§4.5).

mod extension;
mod store;
mod weave;

pub use extension::{media_permits, Extension};
pub use store::{ExtensionStore, SelectorHandle};
