//! Per-tab checker sessions.
//!
//! A session holds the state of one symptom-checker page: the current
//! analysis and the follow-up questions the user has checked. Sessions are
//! kept in memory only and are identified by UUID.
//!
//! # Architecture
//!
//! - [`ClientSession`]: owned session state with pure transition methods
//! - [`Phase`]: which panels the page is showing
//! - [`SessionStore`]: thread-safe store of [`SessionHandle`]s with idle expiry
//!
//! # Example
//!
//! ```rust
//! use symptom_checker::session::{ClientSession, Phase};
//!
//! let session = ClientSession::new();
//! assert_eq!(session.phase(), Phase::Idle);
//! assert!(ClientSession::prepare_analysis("   ").is_err());
//! ```

mod state;
mod store;

pub use state::{ClientSession, Phase};
pub use store::{DEFAULT_SESSION_TIMEOUT, SessionHandle, SessionStore};
