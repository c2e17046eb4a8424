//! Value tests

mod compare;
mod conversions;
mod dump;
