//! Expression parser and resolver tests

mod parse;
