use crate::api::{ParseState, Termination};
use crate::model::{HelpKey, Key};
use crate::prelude::KeyHandler;

/// A handler's answer to an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reply {
    /// The event was dealt with.
    Handled,
    /// The event is not this parser's concern.
    Unknown,
    /// Stop the parse, reporting this (nonzero) status.
    Failed(i32),
}

/// What handlers and hooks return: a reply, or a request to terminate.
pub type HandlerResult = Result<Reply, Termination>;

pub(crate) type StateFn<'a> = Box<dyn FnMut(&mut ParseState<'_>) -> HandlerResult + 'a>;
pub(crate) type PositionalFn<'a> = Box<dyn FnMut(&str, &mut ParseState<'_>) -> HandlerResult + 'a>;
pub(crate) type HelpFilterFn<'a> = Box<dyn Fn(HelpKey, &str) -> Option<String> + 'a>;

/// The events a parser may register a [`Hook`] for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookKind {
    /// The parse is starting (fired parents first).
    Begin,
    /// A positional argument is offered.
    Positional,
    /// A positional argument was declined; the parser may take all remaining arguments at once.
    MorePositional,
    /// The parse ended without this parser seeing any positional argument.
    NoPositional,
    /// All positional arguments have been processed (fired children first).
    End,
    /// The parse succeeded (fired children first).
    Success,
    /// The parse failed.
    Error,
    /// The parse is over, whatever the outcome (fired children first, always last).
    Finish,
    /// Help text is about to be printed.
    HelpFilter,
}

pub(crate) enum Action<'a> {
    State(StateFn<'a>),
    Positional(PositionalFn<'a>),
    Filter(HelpFilterFn<'a>),
}

/// An optional behaviour of a parser, registered with [`ParserRegistry::add_hook`](crate::ParserRegistry::add_hook).
///
/// A parser without a hook for an event answers [`Reply::Unknown`], except for positional arguments:
/// by default the parser records the argument and all remaining ones into its store.
///
/// ### Example
/// ```
/// # use argtree_builder::{Hook, Reply};
/// let hook = Hook::positional(|arg, state| {
///     state.record_positional(arg.to_uppercase());
///     Ok(Reply::Handled)
/// });
/// ```
pub struct Hook<'a> {
    kind: HookKind,
    pub(crate) action: Action<'a>,
}

impl<'a> std::fmt::Debug for Hook<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hook").field("kind", &self.kind).finish()
    }
}

impl<'a> Hook<'a> {
    fn state(kind: HookKind, action: StateFn<'a>) -> Self {
        Self {
            kind,
            action: Action::State(action),
        }
    }

    /// Run when the parse starts.
    pub fn begin<F>(action: F) -> Self
    where
        F: FnMut(&mut ParseState<'_>) -> HandlerResult + 'a,
    {
        Self::state(HookKind::Begin, Box::new(action))
    }

    /// Run for each positional argument offered to this parser.
    pub fn positional<F>(action: F) -> Self
    where
        F: FnMut(&str, &mut ParseState<'_>) -> HandlerResult + 'a,
    {
        Self {
            kind: HookKind::Positional,
            action: Action::Positional(Box::new(action)),
        }
    }

    /// Run when this parser declined a positional argument; it remains at [`ParseState::next`].
    pub fn more_positional<F>(action: F) -> Self
    where
        F: FnMut(&mut ParseState<'_>) -> HandlerResult + 'a,
    {
        Self::state(HookKind::MorePositional, Box::new(action))
    }

    /// Run at the end of the parse when this parser saw no positional arguments.
    pub fn no_positional<F>(action: F) -> Self
    where
        F: FnMut(&mut ParseState<'_>) -> HandlerResult + 'a,
    {
        Self::state(HookKind::NoPositional, Box::new(action))
    }

    /// Run once all arguments have been processed.
    pub fn end<F>(action: F) -> Self
    where
        F: FnMut(&mut ParseState<'_>) -> HandlerResult + 'a,
    {
        Self::state(HookKind::End, Box::new(action))
    }

    /// Run when the parse succeeded.
    pub fn success<F>(action: F) -> Self
    where
        F: FnMut(&mut ParseState<'_>) -> HandlerResult + 'a,
    {
        Self::state(HookKind::Success, Box::new(action))
    }

    /// Run when the parse failed.
    pub fn error<F>(action: F) -> Self
    where
        F: FnMut(&mut ParseState<'_>) -> HandlerResult + 'a,
    {
        Self::state(HookKind::Error, Box::new(action))
    }

    /// Run last, whatever the outcome.
    pub fn finish<F>(action: F) -> Self
    where
        F: FnMut(&mut ParseState<'_>) -> HandlerResult + 'a,
    {
        Self::state(HookKind::Finish, Box::new(action))
    }

    /// Rewrite help text owned by this parser.
    /// Return `None` to keep the original text.
    pub fn help_filter<F>(filter: F) -> Self
    where
        F: Fn(HelpKey, &str) -> Option<String> + 'a,
    {
        Self {
            kind: HookKind::HelpFilter,
            action: Action::Filter(Box::new(filter)),
        }
    }

    /// The event this hook is for.
    pub fn kind(&self) -> HookKind {
        self.kind
    }

    pub(crate) fn into_filter(self) -> Result<HelpFilterFn<'a>, Self> {
        match self.action {
            Action::Filter(filter) => Ok(filter),
            action => Err(Self {
                kind: self.kind,
                action,
            }),
        }
    }
}

/// Records every option the parser defines, and declines the rest.
///
/// ### Example
/// ```
/// # use argtree_builder::{ArgOption, GenericHandler, ParserRegistry};
/// let mut registry = ParserRegistry::new(["program", "-d"]);
/// let root = registry.create_parser(None, GenericHandler).unwrap();
/// registry.node_mut(root).unwrap().add_option(ArgOption::short('d')).unwrap();
/// assert!(registry.try_parse().unwrap());
/// assert_eq!(registry.node(root).unwrap().parsed_options().len(), 1);
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct GenericHandler;

impl KeyHandler for GenericHandler {
    fn handle_key(
        &mut self,
        key: Key,
        arg: Option<&str>,
        state: &mut ParseState<'_>,
    ) -> HandlerResult {
        Ok(state.handle_known_key(key, arg))
    }
}

/// A [`KeyHandler`] made from a closure; see [`handler`].
pub struct FnHandler<F>(F);

impl<F> KeyHandler for FnHandler<F>
where
    F: FnMut(Key, Option<&str>, &mut ParseState<'_>) -> HandlerResult,
{
    fn handle_key(
        &mut self,
        key: Key,
        arg: Option<&str>,
        state: &mut ParseState<'_>,
    ) -> HandlerResult {
        (self.0)(key, arg, state)
    }
}

/// Wrap a closure as a [`KeyHandler`].
///
/// ### Example
/// ```
/// # use argtree_builder::{handler, Key, Reply};
/// let mut verbose = false;
/// let _ = handler(|key, _arg, _state| {
///     if key == Key::from('v') {
///         verbose = true;
///         Ok(Reply::Handled)
///     } else {
///         Ok(Reply::Unknown)
///     }
/// });
/// ```
pub fn handler<F>(action: F) -> FnHandler<F>
where
    F: FnMut(Key, Option<&str>, &mut ParseState<'_>) -> HandlerResult,
{
    FnHandler(action)
}
