//! Vote receipts.
//!
//! A receipt is built on the client from a completed
//! [`VoteRecord`](votekit_types::VoteRecord) and never fetched back from the
//! backend. It can be rendered as plain text for the voter or as JSON.

pub mod document;
pub mod error;

pub use document::{ReceiptDocument, VoteType};
pub use error::ReceiptError;
