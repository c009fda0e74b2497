pub mod user;
pub mod pull_request;
pub mod commit;

pub use user::*;
pub use pull_request::*;
pub use commit::*;
