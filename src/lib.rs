//! d' orakle — three words in, one crypto personality out.
//!
//! - `oracle`: the reading pipeline (prompt, candidate fallback, decoding)
//! - `theme`: color/emoji per coin
//! - `share`: the share text for a reading
//! - `session`: screen state machine for front ends

pub mod oracle;
pub mod session;
pub mod share;
pub mod theme;

pub use oracle::{Oracle, OracleError, Query, QueryError, Reading};
pub use orakle_config::Settings;
