//! Field kinds and classified field tokens
//!
//! Classification is by field name only. Each field of each row yields
//! exactly one [`FieldToken`], tagged with its [`FieldKind`] and its cell
//! location.

pub mod field_kind;
pub mod token;

pub use field_kind::FieldKind;
pub use token::FieldToken;
