//! Heuristic station-name to city-code resolution.
//!
//! Upstream train listings describe stations with free text such as
//! `"KSR Bengaluru (SBC)"` or `"Hazrat Nizamuddin"`. Booking records need a
//! short city code instead, so this crate offers a small, replaceable strategy:
//!
//! 1. a lookup table of known substrings mapped to city codes,
//! 2. a parenthesised code such as `(SBC)` when no table entry matches,
//! 3. the first three characters of the label, upper-cased.
//!
//! The result is an approximation, not authoritative geocoding. Every
//! [`StationCode`] records which step produced it through [`CodeSource`], so
//! callers can tell a table hit from a guess. Swap in another
//! [`StationCodeResolver`] implementation to back the lookup with a real
//! geocoding service.
//!
//! # Example
//!
//! ```
//! use station_codes::{CodeSource, LookupTableResolver, StationCodeResolver};
//!
//! let resolver = LookupTableResolver::default();
//! let code = resolver.resolve("Bengaluru (SBC)").expect("label is not blank");
//!
//! assert_eq!(code.as_str(), "BLR");
//! assert_eq!(code.source(), CodeSource::LookupTable);
//! ```

mod code;
mod table;

pub use code::{CodeSource, StationCode};
pub use table::{LookupTableBuilder, LookupTableError, LookupTableResolver};

/// Strategy that turns a station label into a city code.
///
/// Implementations return `None` only when the label carries no usable text.
pub trait StationCodeResolver: Send + Sync {
    /// Resolve `station` to a code, or `None` when the label is blank.
    fn resolve(&self, station: &str) -> Option<StationCode>;
}

impl<F> StationCodeResolver for F
where
    F: Fn(&str) -> Option<StationCode> + Send + Sync,
{
    fn resolve(&self, station: &str) -> Option<StationCode> {
        self(station)
    }
}
