//! Infrastructure layer - External systems integration
//!
//! This module handles all external system concerns:
//! - Database connections and migrations
//! - Repositories over the users and records tables
//! - Unit of Work for transaction management

pub mod db;
pub mod repositories;
pub mod unit_of_work;

pub use db::{Database, MigrationState, Migrator};
pub use repositories::{
    Comparison, RecordFilter, RecordRepository, RecordStore, UserRepository, UserStore,
};
pub use unit_of_work::{Persistence, TransactionContext, TxRecordRepository, UnitOfWork};

#[cfg(any(test, feature = "test-utils"))]
pub use repositories::{MockRecordRepository, MockUserRepository};
