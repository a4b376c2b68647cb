pub(crate) mod extractor;
pub mod store;

pub use extractor::{removal_cookie, session_cookie, CurrentUser, SessionToken};
pub use store::{Session, UserSnapshot};
