//! Route handlers. Business rules live in [`crate::account`]; these only
//! translate between HTTP and the account service.

pub mod health;
pub mod login;
pub mod signup;
pub mod users;
