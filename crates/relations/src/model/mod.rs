//! Model System - Model trait and key values

pub mod core_trait;
pub mod primary_key;

pub use core_trait::Model;
pub use primary_key::PrimaryKey;
