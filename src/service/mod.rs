//! Provider-independent directory managers

pub mod group;
pub mod invitation;
pub mod license;
pub mod user;

pub use group::GroupManager;
pub use invitation::InviteManager;
pub use license::LicenseManager;
pub use user::UserManager;
