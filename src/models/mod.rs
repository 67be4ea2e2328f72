pub mod blacklist;
pub mod user;

pub use blacklist::*;
pub use user::*;
