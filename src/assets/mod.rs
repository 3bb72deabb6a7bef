//! Asset retrieval and decoding.

/// Image and audio decoding.
pub mod decode;
/// Bounded-retry concurrent fetching.
pub mod fetch;
