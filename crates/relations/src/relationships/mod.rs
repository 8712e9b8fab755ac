//! Relationships Module - Has-one-or-many relations with eager loading

pub mod constraints;
pub mod dictionary;
pub mod foreign_key;
pub mod has_many;
pub mod has_one;
pub mod has_one_or_many;
pub mod keys;
pub mod matcher;
pub mod traits;


// Re-export main types
pub use constraints::*;
pub use dictionary::*;
pub use foreign_key::*;
pub use has_many::*;
pub use has_one::*;
pub use has_one_or_many::*;
pub use keys::*;
pub use matcher::*;
pub use traits::*;
