//! Payment endpoints under `/razorpay`.

pub mod create_order;
pub mod types;
pub mod verify_payment;
