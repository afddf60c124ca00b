//! Core domain logic for wabridge: the session status state machine and
//! pairing-code generation. No I/O lives here — the server and client crates
//! build on these types.

pub mod pairing;
pub mod status;

pub use pairing::generate_pairing_code;
pub use status::{validate_transition, SessionStatus, StatusParseError, TransitionError};
