//! Parley core: message threading and the authorship rules around
//! message mutation.
//!
//! Storage and identity lookup are reached only through the ports in
//! [`traits`], so everything here runs the same against SQLite or an
//! in-memory fake.

pub mod error;
pub mod guard;
pub mod identity;
pub mod records;
pub mod threads;
pub mod traits;

#[cfg(test)]
mod testing;

pub use error::{CoreError, Result};
pub use guard::{Draft, MutationGuard};
pub use records::{MessageRecord, NewMessage};
pub use threads::{MAX_THREAD_LENGTH, ThreadBuilder};
pub use traits::{IdentityResolver, MessageStore};
