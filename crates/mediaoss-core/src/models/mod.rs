//! Data models shared by drivers and callers

mod outcome;
mod policy;
mod upload;

pub use outcome::*;
pub use policy::*;
pub use upload::*;
