//! Vibe Protocol - shared vocabulary for the meme service
//!
//! Constants, wire types and the UTC day clock used by the identity,
//! quota and HTTP layers.

pub mod clock;
pub mod constants;
pub mod error;
pub mod token;
pub mod types;

pub use clock::{parse_day, Clock, FixedClock, SystemClock};
pub use constants::*;
pub use error::*;
pub use token::DeviceToken;
pub use types::*;
