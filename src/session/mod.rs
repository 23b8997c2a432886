//! Session lifecycle: the credential pair, its background renewal, and the
//! object that owns both for the lifetime of a login.

pub mod keeper;
pub mod owner;
pub mod token_pair;

pub use keeper::{KeeperExit, SessionEvent, SessionKeeper, REFRESH_INTERVAL, SESSION_EXPIRED_MESSAGE};
pub use owner::SessionOwner;
pub use token_pair::{Credentials, TokenPair};
