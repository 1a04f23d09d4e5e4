//! Conversion Engine
//!
//! The provider-agnostic core of the conversions bridge. It takes orders from a shop platform and reports each paid
//! order as a purchase event to a set of destinations (advertising and analytics APIs), at most once per order, even
//! when the same order arrives through both the webhook and the poller.
//!
//! The library is divided into these parts:
//! 1. Data types ([`mod@db_types`]): orders, attribution records, dedup markers and the canonical purchase event.
//! 2. The collaborator traits ([`mod@traits`]): the key-value store, the order source and the destinations. Backends
//!    for the store live in `db`; [`SqliteStore`] for production and [`MemoryStore`] for tests.
//! 3. The [`DedupLedger`] and the [`AttributionStage`], both thin typed views over the store.
//! 4. The [`DeliveryOrchestrator`] ([`mod@delivery`]), which runs one delivery through eligibility, the idempotency
//!    gate, attribution merge, line-item completion, fan-out and ledger commit.
mod attribution;
mod db;
mod ledger;

pub mod db_types;
pub mod delivery;
pub mod helpers;
pub mod traits;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

pub use attribution::{AttributionStage, StageWrite};
#[cfg(feature = "sqlite")]
pub use db::sqlite::SqliteStore;
pub use db::MemoryStore;
pub use delivery::{DeliveryOrchestrator, DeliveryOutcome, DeliveryStatus};
pub use ledger::{
    DedupLedger,
    LedgerConfig,
    DEFAULT_ATTRIBUTION_TTL,
    DEFAULT_DEDUP_TTL,
    DEFAULT_RESERVATION_TTL,
};
