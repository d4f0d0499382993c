//! Store adapters over PostgreSQL.
//!
//! Each repository implements one of the core store ports, hiding the
//! `SeaORM` details from the services.

pub mod expense;
pub mod summary;
pub mod user;

pub use expense::ExpenseRepository;
pub use summary::SummaryRepository;
pub use user::UserRepository;

use reimburse_core::store::StoreError;
use sea_orm::DbErr;

/// Maps a `SeaORM` error into the store error.
pub(crate) fn db_err(err: DbErr) -> StoreError {
    StoreError::Database(err.to_string())
}
