//! Account lifecycle endpoints under `/auth`.

pub mod login;
pub mod signup;
pub mod types;
pub mod verification;
