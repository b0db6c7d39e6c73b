//! GLINT record store
//!
//! The hub does not persist anything itself: instrument records,
//! device profiles, presence flags, and telemetry logs live behind
//! the [`RecordStore`] trait. [`MemoryStore`] is the in-process
//! implementation used by the service binary and the test suites;
//! a deployment backed by a real database implements the same trait.

pub mod error;
pub mod memory;
pub mod records;
pub mod traits;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use records::{DeviceProfile, InstrumentRecord, NewInstrument, TelemetryEntry};
pub use traits::RecordStore;
