//! Traits for implementing parsers.
//! Import with `use argtree::prelude::*;`.
use crate::api::{HandlerResult, ParseState};
use crate::model::Key;

/// The mandatory behaviour of every parser: deciding what to do with an option key.
///
/// Called once per recognised option occurrence owned by the parser.
/// Reply with [`Reply::Handled`](crate::Reply::Handled) when the key was dealt with,
/// [`Reply::Unknown`](crate::Reply::Unknown) when it is not this parser's,
/// or [`Reply::Failed`](crate::Reply::Failed) to stop the parse with a status.
///
/// Closures are wrapped with [`handler`](crate::handler).
pub trait KeyHandler {
    fn handle_key(
        &mut self,
        key: Key,
        arg: Option<&str>,
        state: &mut ParseState<'_>,
    ) -> HandlerResult;
}
