//! [`Database`]-related implementations.
//!
//! The [`Database`] contract required from any implementation:
//! - repeated reads are idempotent;
//! - not-found is signalled distinctly (an [`Option`] result), never as an
//!   [`Error`];
//! - calls over a network must bound their execution time and surface the
//!   exhaustion as [`Error::Timeout`] instead of hanging.

pub mod memory;

use common::validate;
use derive_more::{Display, Error as StdError, From};

pub use self::memory::Memory;

/// Database operation.
pub use common::Handler as Database;

/// [`Database`] error.
#[derive(Debug, Display, From, StdError)]
pub enum Error {
    /// Stored record failed to repopulate into its entity.
    #[display("stored record is corrupt: {_0}")]
    Corrupt(validate::Error),

    /// Operation exceeded its bounded execution time.
    #[display("operation timed out")]
    Timeout,
}
