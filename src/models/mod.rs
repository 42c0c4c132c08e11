pub mod course;
pub mod record;
pub mod user;

pub use course::*;
pub use record::*;
pub use user::*;
