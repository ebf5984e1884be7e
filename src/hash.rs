//! Hasher selection for the sparse tick, bitmap and position maps.
//!
//! `rustc-hash` wins when enabled, then `ahash`; otherwise (or with
//! `std-hash`) the SipHash-backed std map is used.

#[cfg(all(feature = "rustc-hash", not(feature = "std-hash")))]
pub type FastMap<K, V> = rustc_hash::FxHashMap<K, V>;

#[cfg(all(
    feature = "ahash",
    not(feature = "rustc-hash"),
    not(feature = "std-hash")
))]
pub type FastMap<K, V> = ahash::AHashMap<K, V>;

#[cfg(any(
    feature = "std-hash",
    not(any(feature = "rustc-hash", feature = "ahash"))
))]
pub type FastMap<K, V> = std::collections::HashMap<K, V>;
