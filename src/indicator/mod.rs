//! Pure indicator math over closing-price sequences.
//!
//! Every function here is deterministic and never fails: when the input is
//! shorter than an indicator's window the function returns that indicator's
//! documented neutral value instead of an error.

pub mod bollinger;
pub mod history;
pub mod macd;
pub mod rsi;
pub mod signal;
pub mod sma;

pub use bollinger::{bollinger_bands, BollingerBands};
pub use history::indicator_history;
pub use macd::{macd, Macd};
pub use rsi::rsi;
