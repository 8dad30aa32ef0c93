//! Grouping engine and storefront resolver.

/// Assignment -> variant image map derivation and its inverses.
pub mod grouping;
/// Selected-variant visibility resolution.
pub mod resolver;
/// Injected read-only capabilities.
pub mod traits;
