//! Debug console services: config file, log files and database.
//!
//! Only constructed outside production; the router mounts `/api/admin`
//! when they exist.

mod config_service;
mod database_service;
mod log_service;
mod sql_guard;

use std::sync::Arc;

pub use config_service::{ConfigService, DotenvConfig};
pub use database_service::{
    ColumnInfo, DatabaseInspector, DatabaseService, QueryOptions, QueryResultSet, TablePage,
};
pub use log_service::{LogKind, LogPage, LogPagination, LogQuery, LogReader, LogService};
pub use sql_guard::check_read_only;

#[cfg(any(test, feature = "test-utils"))]
pub use config_service::MockConfigService;
#[cfg(any(test, feature = "test-utils"))]
pub use database_service::MockDatabaseService;
#[cfg(any(test, feature = "test-utils"))]
pub use log_service::MockLogService;

/// The three admin services, shared by the admin handlers.
#[derive(Clone)]
pub struct AdminServices {
    pub config: Arc<dyn ConfigService>,
    pub logs: Arc<dyn LogService>,
    pub database: Arc<dyn DatabaseService>,
}
