//! Layered response caching.
//!
//! Two tiers sit in front of read-heavy queries:
//!
//! - [`ProcessCache`] - in-memory, single-node, per-call TTL. No
//!   cross-instance coherence; the data cached here tolerates brief
//!   staleness across instances.
//! - [`DistributedCache`] - optional Redis tier. Degrades to "miss" when
//!   unconfigured or unreachable; never a correctness dependency.
//!
//! [`ResponseCache`] composes the tiers into a read-through cache whose
//! results carry HTTP freshness metadata (`max-age` /
//! `stale-while-revalidate`). Key naming lives in [`keys`].

pub mod distributed;
pub mod keys;
pub mod process;
pub mod response;

pub use distributed::DistributedCache;
pub use process::ProcessCache;
pub use response::{CacheStatus, FreshnessPolicy, ResponseCache};
