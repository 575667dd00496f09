//! Data models for Athenaeum

pub mod auth;
pub mod book;
pub mod enums;
pub mod loan;
pub mod member;

// Re-export commonly used types
pub use auth::{AuthUser, Claims, Session};
pub use book::{Book, BookQuery, CatalogQuery, CreateBook, UpdateBook};
pub use enums::{BookStatus, LoanStatus};
pub use loan::{CheckOut, Loan, LoanDetails};
pub use member::{CreateMember, Member};
