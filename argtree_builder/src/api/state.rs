use crate::api::{Classification, Node, NodeId, ParsedOption, Reply, Termination, Tree};
use crate::model::{HelpFlags, Key, ParseFlags, Stream};
use crate::parser::{report, ParseContext};
use crate::scanner::Cursor;

/// A parser's view of the parse in progress, handed to its [`KeyHandler`](crate::prelude::KeyHandler) and hooks.
///
/// The helpers ending the parse ([`ParseState::error`], [`ParseState::failure`], [`ParseState::usage`], [`ParseState::state_help`])
/// record their status and return `Err(Termination)` unless [`ParseFlags::NO_EXIT`] is in effect; propagate it with `?`.
/// [`ParseFlags::NO_ERRS`] only silences their output.
///
/// ### Example
/// ```
/// # use argtree_builder::{handler, ArgOption, Key, ParseFlags, ParserRegistry, Reply};
/// let mut registry = ParserRegistry::new(["program", "--count", "x"]);
/// registry.set_parse_flags(ParseFlags::NO_EXIT | ParseFlags::NO_ERRS).unwrap();
/// let root = registry
///     .create_parser(
///         None,
///         handler(|key, arg, state| {
///             if key == Key::from('c') && arg.and_then(|a| a.parse::<u32>().ok()).is_none() {
///                 state.error("count must be a number")?;
///                 return Ok(Reply::Failed(1));
///             }
///             Ok(state.handle_known_key(key, arg))
///         }),
///     )
///     .unwrap();
/// registry
///     .node_mut(root)
///     .unwrap()
///     .add_option(ArgOption::new('c', "count").arg("N"))
///     .unwrap();
/// assert!(!registry.try_parse().unwrap());
/// assert_eq!(registry.status(), 1);
/// ```
pub struct ParseState<'s> {
    node: NodeId,
    tree: &'s mut Tree,
    cursor: &'s mut Cursor,
    context: &'s ParseContext<'s>,
}

impl<'s> ParseState<'s> {
    pub(crate) fn new(
        node: NodeId,
        tree: &'s mut Tree,
        cursor: &'s mut Cursor,
        context: &'s ParseContext<'s>,
    ) -> Self {
        Self {
            node,
            tree,
            cursor,
            context,
        }
    }

    /// The parser this state belongs to.
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// The full argument vector.
    pub fn argv(&self) -> &[String] {
        &self.cursor.argv
    }

    /// The index of the next argument to be scanned.
    pub fn next(&self) -> usize {
        self.cursor.next
    }

    /// Move the scanning position (clamped to the argument count).
    /// Moving it backwards makes the scanner look for options again from there.
    pub fn set_next(&mut self, next: usize) {
        self.cursor.next = std::cmp::min(next, self.cursor.argc());
    }

    /// The arguments from the scanning position on.
    pub fn remaining(&self) -> &[String] {
        &self.cursor.argv[self.cursor.next..]
    }

    /// How many positional arguments this parser has processed so far.
    pub fn arg_num(&self) -> usize {
        self.cursor.arg_num
    }

    /// The parse flags in effect for this parser (its child flags, or the ones inherited).
    pub fn flags(&self) -> ParseFlags {
        self.context.flattened.effective_flags(self.node)
    }

    /// The program name used in messages.
    pub fn program_name(&self) -> &str {
        &self.cursor.name
    }

    /// Check `key` and its argument against this parser's options.
    pub fn classify(&self, key: Key, arg: Option<&str>) -> Classification<'_> {
        match self.tree.get(self.node) {
            Some(node) => node.classify(key, arg),
            None => Classification::Unknown,
        }
    }

    fn sink(&mut self, centralise: bool) -> Option<&mut Node> {
        let target = if centralise {
            self.tree.root().unwrap_or(self.node)
        } else {
            self.node
        };
        self.tree.get_mut(target)
    }

    /// Record an option occurrence, into the root's store or this parser's (see [`ParserRegistry::set_root_has_parsed_options`](crate::ParserRegistry::set_root_has_parsed_options)).
    pub fn record_option(&mut self, option: ParsedOption) {
        if let Some(node) = self.sink(self.context.root_has_parsed_options) {
            node.parsed_options.push(option);
        }
    }

    /// Record a positional argument, into the root's store or this parser's (see [`ParserRegistry::set_root_has_positional_args`](crate::ParserRegistry::set_root_has_positional_args)).
    pub fn record_positional(&mut self, arg: impl Into<String>) {
        let arg = arg.into();

        if let Some(node) = self.sink(self.context.root_has_positional_args) {
            node.positional_args.push(arg);
        }
    }

    /// Record `key` when it names one of this parser's options (with its argument requirement met).
    pub fn handle_known_key(&mut self, key: Key, arg: Option<&str>) -> Reply {
        let long_name = match self.classify(key, arg) {
            Classification::Ok(option) => option.long_name.clone(),
            Classification::Unknown | Classification::NeedsArg => return Reply::Unknown,
        };

        self.record_option(ParsedOption::new(key, long_name, arg));
        Reply::Handled
    }

    // Records `arg` and every argument after it.
    pub(crate) fn consume_all_positional(&mut self, arg: &str) -> Reply {
        let rest: Vec<String> = self.remaining().to_vec();
        self.record_positional(arg);

        for other in rest {
            self.record_positional(other);
        }

        self.cursor.next = self.cursor.argc();
        Reply::Handled
    }

    /// Report an error as `program: message` with a pointer to the help options, and ask to terminate with status 1.
    pub fn error(&mut self, message: &str) -> Result<(), Termination> {
        let flags = self.flags();
        report::report_error(self.cursor, self.context, flags, message, 1)
    }

    /// Report `program: message`, with the OS error text of `errnum` when nonzero.
    /// Asks to terminate with `status`, even when it is 0.
    pub fn failure(&mut self, status: i32, errnum: i32, message: &str) -> Result<(), Termination> {
        let flags = self.flags();
        report::report_failure(self.cursor, self.context, flags, status, errnum, message)
    }

    /// Print the short usage to standard error and ask to terminate with the usage error status.
    pub fn usage(&mut self) -> Result<(), Termination> {
        self.state_help(Stream::Err, HelpFlags::STD_USAGE)
    }

    /// Print the help selected by `flags` to `stream`, and ask to terminate.
    /// The status is the usage error status when `flags` includes [`HelpFlags::EXIT_ERR`], otherwise 0.
    pub fn state_help(&mut self, stream: Stream, flags: HelpFlags) -> Result<(), Termination> {
        let parse_flags = self.flags();
        report::report_help(self.cursor, self.context, parse_flags, stream, flags)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ArgOption;
    use crate::constant::EX_USAGE;
    use crate::model::OptionFlags;
    use crate::parser::test::{context, flat};
    use crate::parser::InMemoryInterface;
    use crate::test::assert_contains;
    use rstest::rstest;

    struct Fixture {
        tree: Tree,
        root: NodeId,
        child: NodeId,
        cursor: Cursor,
    }

    fn fixture(argv: &[&str], flags: ParseFlags) -> Fixture {
        let mut tree = Tree::default();
        let root = tree.insert(None);
        let child = tree.insert(Some(root));
        tree.get_mut(child)
            .unwrap()
            .add_options(vec![
                ArgOption::new('d', "dot")
                    .arg("NUM")
                    .flags(OptionFlags::ARG_OPTIONAL),
                ArgOption::new('f', "file").arg("FILE"),
            ])
            .unwrap();
        Fixture {
            tree,
            root,
            child,
            cursor: Cursor::new(argv.iter().map(|arg| arg.to_string()).collect(), flags),
        }
    }

    #[test]
    fn cursor_access() {
        // Setup
        let mut f = fixture(&["/usr/bin/prog", "a", "b"], ParseFlags::empty());
        let flattened = flat(&f.tree);
        let interface = InMemoryInterface::default();
        let context = context(&flattened, &interface);
        let mut state = ParseState::new(f.child, &mut f.tree, &mut f.cursor, &context);

        // Execute & Verify
        assert_eq!(state.node(), f.child);
        assert_eq!(state.program_name(), "prog");
        assert_eq!(state.next(), 1);
        assert_eq!(state.remaining(), &["a", "b"]);
        state.set_next(9);
        assert_eq!(state.next(), 3);
        assert!(state.remaining().is_empty());
        state.set_next(2);
        assert_eq!(state.remaining(), &["b"]);
        assert_eq!(state.argv().len(), 3);
        assert_eq!(state.arg_num(), 0);
    }

    #[rstest]
    #[case(true, true)]
    #[case(true, false)]
    #[case(false, true)]
    #[case(false, false)]
    fn record_targets(#[case] central_options: bool, #[case] central_positional: bool) {
        // Setup
        let mut f = fixture(&["prog"], ParseFlags::empty());
        let flattened = flat(&f.tree);
        let interface = InMemoryInterface::default();
        let mut context = context(&flattened, &interface);
        context.root_has_parsed_options = central_options;
        context.root_has_positional_args = central_positional;
        let mut state = ParseState::new(f.child, &mut f.tree, &mut f.cursor, &context);

        // Execute
        assert_eq!(state.handle_known_key(Key::from('d'), None), Reply::Handled);
        assert_eq!(
            state.handle_known_key(Key::from('f'), Some("x")),
            Reply::Handled
        );
        state.record_positional("p");

        // Verify
        let root = f.tree.get(f.root).unwrap();
        let child = f.tree.get(f.child).unwrap();
        let (options_in, options_out) = if central_options {
            (root, child)
        } else {
            (child, root)
        };
        let (positional_in, positional_out) = if central_positional {
            (root, child)
        } else {
            (child, root)
        };
        assert_eq!(
            options_in.parsed_options(),
            &[
                ParsedOption::new(Key::from('d'), "dot", None),
                ParsedOption::new(Key::from('f'), "file", Some("x")),
            ]
        );
        assert!(options_out.parsed_options().is_empty());
        assert_eq!(positional_in.positional_args(), &["p"]);
        assert!(positional_out.positional_args().is_empty());
    }

    #[rstest]
    #[case('f', None, Reply::Unknown)]
    #[case('f', Some("x"), Reply::Handled)]
    #[case('d', None, Reply::Handled)]
    #[case('q', Some("x"), Reply::Unknown)]
    fn handle_known_key(#[case] key: char, #[case] arg: Option<&str>, #[case] expected: Reply) {
        let mut f = fixture(&["prog"], ParseFlags::empty());
        let flattened = flat(&f.tree);
        let interface = InMemoryInterface::default();
        let context = context(&flattened, &interface);
        let mut state = ParseState::new(f.child, &mut f.tree, &mut f.cursor, &context);

        assert_eq!(state.handle_known_key(Key::from(key), arg), expected);
    }

    #[test]
    fn consume_all_positional() {
        let mut f = fixture(&["prog", "a", "b", "c"], ParseFlags::empty());
        f.cursor.next = 2;
        let flattened = flat(&f.tree);
        let interface = InMemoryInterface::default();
        let context = context(&flattened, &interface);
        let mut state = ParseState::new(f.root, &mut f.tree, &mut f.cursor, &context);

        assert_eq!(state.consume_all_positional("a"), Reply::Handled);
        assert_eq!(state.next(), 4);
        assert_eq!(f.tree.get(f.root).unwrap().positional_args(), &["a", "b", "c"]);
    }

    #[test]
    fn usage_terminates() {
        // Setup
        let mut f = fixture(&["prog"], ParseFlags::empty());
        let flattened = flat(&f.tree);
        let interface = InMemoryInterface::default();
        let context = context(&flattened, &interface);
        let mut state = ParseState::new(f.root, &mut f.tree, &mut f.cursor, &context);

        // Execute
        let result = state.usage();

        // Verify
        assert_eq!(result, Err(Termination::new(EX_USAGE)));
        assert_contains!(interface.error_output(), "Usage: prog [OPTION...]");
        assert_contains!(interface.error_output(), "Try `prog --help'");
        assert_eq!(f.cursor.error_code, EX_USAGE);
    }

    #[test]
    fn helpers_follow_child_flags() {
        // Setup
        let mut f = fixture(&["prog"], ParseFlags::empty());
        f.tree
            .get_mut(f.child)
            .unwrap()
            .set_child_flags(ParseFlags::NO_EXIT)
            .unwrap();
        let flattened = flat(&f.tree);
        let interface = InMemoryInterface::default();
        let context = context(&flattened, &interface);

        // Execute
        let child_result = ParseState::new(f.child, &mut f.tree, &mut f.cursor, &context)
            .error("child problem");
        let root_result = ParseState::new(f.root, &mut f.tree, &mut f.cursor, &context)
            .error("root problem");

        // Verify
        assert_eq!(child_result, Ok(()));
        assert_eq!(root_result, Err(Termination::new(1)));
        assert_contains!(interface.error_output(), "prog: child problem");
        assert_contains!(interface.error_output(), "prog: root problem");
    }

    #[test]
    fn failure_zero_status_terminates() {
        let mut f = fixture(&["prog"], ParseFlags::empty());
        let flattened = flat(&f.tree);
        let interface = InMemoryInterface::default();
        let context = context(&flattened, &interface);
        let mut state = ParseState::new(f.root, &mut f.tree, &mut f.cursor, &context);

        assert_eq!(state.failure(0, 0, "warning"), Err(Termination::new(0)));
        assert_eq!(state.failure(2, 0, "fatal"), Err(Termination::new(2)));
        assert_eq!(interface.errors(), vec!["prog: warning", "prog: fatal"]);
    }

    #[test]
    fn silent_helpers_still_terminate() {
        // Setup
        let mut f = fixture(&["prog"], ParseFlags::NO_ERRS);
        f.tree
            .get_mut(f.child)
            .unwrap()
            .set_child_flags(ParseFlags::NO_ERRS)
            .unwrap();
        let flattened = flat(&f.tree);
        let interface = InMemoryInterface::default();
        let context = context(&flattened, &interface);
        let mut state = ParseState::new(f.child, &mut f.tree, &mut f.cursor, &context);

        // Execute & Verify
        assert_eq!(state.error("bad"), Err(Termination::new(1)));
        assert_eq!(state.failure(0, 0, "note"), Err(Termination::new(0)));
        assert_eq!(
            state.state_help(Stream::Out, HelpFlags::LONG),
            Err(Termination::new(0))
        );
        assert_eq!(state.usage(), Err(Termination::new(EX_USAGE)));
        assert_eq!(f.cursor.error_code, EX_USAGE);
        assert!(interface.errors().is_empty());
        assert_eq!(interface.output(), "");
    }
}
