//! Builder module for `argtree`.
//! See the `argtree` crate root for full details.
#![deny(missing_docs)]
mod api;
mod constant;
mod model;
mod parser;
mod scanner;
#[allow(missing_docs)]
pub mod prelude;

pub use api::*;
pub use constant::{EINVAL, ENODATA, EX_USAGE};
pub use model::*;
#[cfg(any(test, feature = "unit_test"))]
pub use parser::InMemoryInterface;
pub use parser::{ConsoleInterface, UserInterface};

#[cfg(test)]
#[macro_use]
extern crate assert_matches;
