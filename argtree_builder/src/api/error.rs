use thiserror::Error;

use crate::api::NodeId;

/// Error for an invalid parser configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Flags were supplied with bits outside the legal set.
    #[error("Config error: flags {flags:#x} use bits outside the legal set {legal:#x}.")]
    IllegalFlags {
        /// The offending flags.
        flags: u32,
        /// The legal set they were checked against.
        legal: u32,
    },
    /// The parser handle does not belong to the current tree (it may come from a cleared tree).
    #[error("Config error: parser {0} is not part of the parser tree.")]
    UnknownNode(NodeId),
    /// The requested parent is neither the root nor one of its descendants.
    #[error("Config error: parser {0} is not a valid parent.")]
    InvalidParent(NodeId),
    /// The root parser cannot become anybody's child.
    #[error("Config error: the root parser {0} cannot be re-parented.")]
    RootReparent(NodeId),
    /// Attaching the child would put it underneath itself.
    #[error("Config error: attaching parser {child} under {parent} would form a cycle.")]
    Cycle {
        /// The requested parent.
        parent: NodeId,
        /// The child to be attached.
        child: NodeId,
    },
}

/// Request to end the parse (and, for [`ParserRegistry::parse`](crate::ParserRegistry::parse), the process).
///
/// Returned by the parse state helpers and propagated out of handlers with `?`.
/// The registry tears down the parser tree before handing it on.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("Parse terminated with exit status {code}.")]
pub struct Termination {
    code: i32,
}

impl Termination {
    /// Terminate with the given exit status.
    pub fn new(code: i32) -> Self {
        Self { code }
    }

    /// The exit status.
    pub fn code(&self) -> i32 {
        self.code
    }
}
