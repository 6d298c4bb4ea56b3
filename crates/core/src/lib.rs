#![forbid(unsafe_code)]

pub mod countdown;
pub mod error;
pub mod model;

pub use countdown::{Countdown, Tick};
pub use error::Error;
