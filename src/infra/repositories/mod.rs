//! Repository layer - Data access abstraction
//!
//! Repositories provide an abstraction over data persistence,
//! following the Repository pattern for clean separation of concerns.

pub(crate) mod entities;
pub(crate) mod record_repository;
pub(crate) mod user_repository;

pub use record_repository::{Comparison, RecordFilter, RecordRepository, RecordStore};
pub use user_repository::{UserRepository, UserStore};

// Export mock for tests (both unit and integration)
#[cfg(any(test, feature = "test-utils"))]
pub use record_repository::MockRecordRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use user_repository::MockUserRepository;
