//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.

pub mod account;
pub mod loan;
pub mod posting;

pub use account::AccountRepository;
pub use loan::LoanRepository;
pub use posting::{CreateGroupInput, CreateLegInput, PostingRepository};
