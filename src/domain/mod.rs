//! Generic directory records, independent of any provider's wire model

pub mod common;
pub mod group;
pub mod invitation;
pub mod license;
pub mod user;

pub use common::*;
pub use group::*;
pub use invitation::*;
pub use license::*;
pub use user::*;
