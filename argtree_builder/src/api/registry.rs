use std::collections::HashMap;

use crate::api::hook::HelpFilterFn;
use crate::api::{ArgOption, ConfigError, Hook, HookKind, Node, NodeId, Termination, Tree};
use crate::constant::ENODATA;
use crate::model::{HelpKey, ParseFlags};
use crate::parser::{
    flatten, terminal_width, ConsoleInterface, ParseContext, Router, TextFilter, UserInterface,
};
use crate::prelude::KeyHandler;
use crate::scanner::scan;

#[cfg(feature = "tracing_debug")]
use tracing::debug;

#[derive(Default)]
struct HelpFilters<'a> {
    filters: Vec<Option<HelpFilterFn<'a>>>,
}

impl<'a> TextFilter for HelpFilters<'a> {
    fn filter(&self, node: NodeId, key: HelpKey, text: &str) -> Option<String> {
        match self.filters.get(node.index()) {
            Some(Some(filter)) => filter(key, text),
            _ => None,
        }
    }
}

/// The parser tree together with the parse-wide configuration and results.
///
/// The first parser created is the root; every other parser sits somewhere underneath it.
/// Options belong to parsers, and a single [`ParserRegistry::parse`] runs them all over the same arguments.
///
/// ### Example
/// ```
/// # use argtree_builder::{ArgOption, GenericHandler, ParserRegistry};
/// let mut registry = ParserRegistry::new(["program", "-v", "input.txt"]);
/// let root = registry.create_parser(None, GenericHandler).unwrap();
/// let child = registry.create_parser(Some(root), GenericHandler).unwrap();
/// registry.node_mut(child).unwrap().add_option(ArgOption::new('v', "verbose")).unwrap();
///
/// assert!(registry.try_parse().unwrap());
///
/// let root_node = registry.node(root).unwrap();
/// assert_eq!(root_node.parsed_options()[0].long_name, "verbose");
/// assert_eq!(root_node.positional_args(), &["input.txt"]);
/// ```
pub struct ParserRegistry<'a> {
    argv: Vec<String>,
    tree: Tree,
    handlers: Vec<Box<dyn KeyHandler + 'a>>,
    hooks: Vec<HashMap<HookKind, Hook<'a>>>,
    filters: HelpFilters<'a>,
    parse_flags: ParseFlags,
    program_version: Option<String>,
    bug_address: Option<String>,
    version_hook: Option<Box<dyn Fn(&str) -> String + 'a>>,
    domain: Option<String>,
    root_has_parsed_options: bool,
    root_has_positional_args: bool,
    user_interface: Box<dyn UserInterface>,
    terminal_width: Option<usize>,
    parsed: bool,
    status: i32,
    error_code: i32,
    end_index: Option<usize>,
}

impl<'a> ParserRegistry<'a> {
    /// Create a registry over `argv` (program name first), writing to the console.
    pub fn new(argv: impl IntoIterator<Item = impl Into<String>>) -> Self {
        let mut registry = Self::with_interface(argv, Box::new(ConsoleInterface::default()));
        registry.terminal_width = terminal_width();
        registry
    }

    /// Create a registry over the process' arguments.
    pub fn from_env() -> Self {
        Self::new(std::env::args())
    }

    /// Create a registry writing through `user_interface`.
    /// Help is wrapped at the default right margin, whatever the terminal.
    pub fn with_interface(
        argv: impl IntoIterator<Item = impl Into<String>>,
        user_interface: Box<dyn UserInterface>,
    ) -> Self {
        Self {
            argv: argv.into_iter().map(Into::into).collect(),
            tree: Tree::default(),
            handlers: Vec::default(),
            hooks: Vec::default(),
            filters: HelpFilters::default(),
            parse_flags: ParseFlags::empty(),
            program_version: None,
            bug_address: None,
            version_hook: None,
            domain: None,
            root_has_parsed_options: true,
            root_has_positional_args: true,
            user_interface,
            terminal_width: None,
            parsed: false,
            status: ENODATA,
            error_code: 0,
            end_index: None,
        }
    }

    /// Create a parser under `parent`, or under the root when `parent` is `None`.
    /// The first parser created becomes the root.
    ///
    /// Fails when `parent` is neither the root nor one of its descendants.
    pub fn create_parser(
        &mut self,
        parent: Option<NodeId>,
        handler: impl KeyHandler + 'a,
    ) -> Result<NodeId, ConfigError> {
        if let Some(parent) = parent {
            if !self.tree.is_parent_valid(Some(parent)) {
                return Err(ConfigError::InvalidParent(parent));
            }
        }

        let id = self.tree.insert(parent);
        self.handlers.push(Box::new(handler));
        self.hooks.push(HashMap::default());
        self.filters.filters.push(None);

        #[cfg(feature = "tracing_debug")]
        {
            debug!("Created parser {id} under {parent:?}.");
        }

        Ok(id)
    }

    /// Create a parser with its options.
    /// Every option is checked first: on failure no parser is created.
    ///
    /// ### Example
    /// ```
    /// # use argtree_builder::{ArgOption, ConfigError, GenericHandler, OptionFlags, ParserRegistry};
    /// let mut registry = ParserRegistry::new(["program"]);
    /// let result = registry.create_parser_with_options(
    ///     None,
    ///     vec![ArgOption::short('a'), ArgOption::short('b').flags(OptionFlags::from_bits(0x400))],
    ///     GenericHandler,
    /// );
    /// assert!(matches!(result, Err(ConfigError::IllegalFlags { .. })));
    /// assert_eq!(registry.root(), None);
    /// ```
    pub fn create_parser_with_options(
        &mut self,
        parent: Option<NodeId>,
        options: impl IntoIterator<Item = ArgOption>,
        handler: impl KeyHandler + 'a,
    ) -> Result<NodeId, ConfigError> {
        let options: Vec<ArgOption> = options.into_iter().collect();

        for option in &options {
            let flags = option.flags.normalized();

            if !flags.is_legal() {
                return Err(ConfigError::IllegalFlags {
                    flags: flags.bits(),
                    legal: crate::model::OptionFlags::ALL.bits(),
                });
            }
        }

        let id = self.create_parser(parent, handler)?;
        self.node_mut(id)
            .expect("internal error - created parser must exist")
            .add_options(options)?;
        Ok(id)
    }

    /// The root parser, once one was created.
    pub fn root(&self) -> Option<NodeId> {
        self.tree.root()
    }

    /// A parser's configuration and results.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.tree.get(id)
    }

    /// A parser's configuration, to modify.
    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.tree.get_mut(id)
    }

    /// Whether a parser may be created under `parent` (`None` is only valid while there is no root).
    pub fn is_parent_valid(&self, parent: Option<NodeId>) -> bool {
        self.tree.is_parent_valid(parent)
    }

    /// Move `child` under `parent`, detaching it from its current parent.
    /// Does nothing when it already is a direct child.
    ///
    /// Fails for unknown parsers, for the root, and when `parent` sits underneath `child`.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), ConfigError> {
        self.tree.add_child(parent, child)
    }

    /// Whether `child` is directly underneath `parent`.
    pub fn is_direct_child(&self, parent: NodeId, child: NodeId) -> bool {
        self.tree.is_direct_child(parent, child)
    }

    /// Whether `node` is anywhere underneath `ancestor`.
    pub fn is_descendant(&self, ancestor: NodeId, node: NodeId) -> bool {
        self.tree.is_descendant(ancestor, node)
    }

    /// Replace a parser's key handler.
    pub fn set_handler(
        &mut self,
        id: NodeId,
        handler: impl KeyHandler + 'a,
    ) -> Result<(), ConfigError> {
        if !self.tree.contains(id) {
            return Err(ConfigError::UnknownNode(id));
        }

        self.handlers[id.index()] = Box::new(handler);
        Ok(())
    }

    /// Register a hook on a parser, replacing any hook of the same kind.
    ///
    /// ### Example
    /// ```
    /// # use argtree_builder::{GenericHandler, Hook, Reply, ParserRegistry};
    /// let mut registry = ParserRegistry::new(["program", "a", "b"]);
    /// let root = registry.create_parser(None, GenericHandler).unwrap();
    /// registry
    ///     .add_hook(
    ///         root,
    ///         Hook::positional(|arg, state| {
    ///             state.record_positional(arg.to_uppercase());
    ///             Ok(Reply::Handled)
    ///         }),
    ///     )
    ///     .unwrap();
    /// assert!(registry.try_parse().unwrap());
    /// assert_eq!(registry.node(root).unwrap().positional_args(), &["A", "B"]);
    /// ```
    pub fn add_hook(&mut self, id: NodeId, hook: Hook<'a>) -> Result<(), ConfigError> {
        if !self.tree.contains(id) {
            return Err(ConfigError::UnknownNode(id));
        }

        match hook.into_filter() {
            Ok(filter) => self.filters.filters[id.index()] = Some(filter),
            Err(hook) => {
                self.hooks[id.index()].insert(hook.kind(), hook);
            }
        }

        Ok(())
    }

    /// Set the flags of the whole parse.
    pub fn set_parse_flags(&mut self, flags: ParseFlags) -> Result<(), ConfigError> {
        if !flags.is_legal() {
            return Err(ConfigError::IllegalFlags {
                flags: flags.bits(),
                legal: ParseFlags::ALL.bits(),
            });
        }

        self.parse_flags = flags;
        Ok(())
    }

    /// The flags of the whole parse.
    pub fn parse_flags(&self) -> ParseFlags {
        self.parse_flags
    }

    /// Set the version printed by `-V`/`--version` (which only exist once a version or version hook is set).
    pub fn set_program_version(&mut self, version: impl Into<String>) {
        self.program_version.replace(version.into());
    }

    /// The program version.
    pub fn program_version(&self) -> Option<&str> {
        self.program_version.as_deref()
    }

    /// Set the address shown as "Report bugs to ADDRESS." at the end of the help.
    pub fn set_bug_address(&mut self, address: impl Into<String>) {
        self.bug_address.replace(address.into());
    }

    /// The bug report address.
    pub fn bug_address(&self) -> Option<&str> {
        self.bug_address.as_deref()
    }

    /// Compute the `--version` output from the program name; takes precedence over the program version.
    pub fn set_version_hook(&mut self, hook: impl Fn(&str) -> String + 'a) {
        self.version_hook.replace(Box::new(hook));
    }

    /// Set the message translation domain (recorded only; messages are not translated).
    pub fn set_domain(&mut self, domain: impl Into<String>) {
        self.domain.replace(domain.into());
    }

    /// The message translation domain.
    pub fn domain(&self) -> Option<&str> {
        self.domain.as_deref()
    }

    /// Whether every parser records its options into the root's store (the default), or into its own.
    pub fn set_root_has_parsed_options(&mut self, value: bool) {
        self.root_has_parsed_options = value;
    }

    /// Whether options are recorded into the root's store.
    pub fn root_has_parsed_options(&self) -> bool {
        self.root_has_parsed_options
    }

    /// Whether every parser records its positional arguments into the root's store (the default), or into its own.
    pub fn set_root_has_positional_args(&mut self, value: bool) {
        self.root_has_positional_args = value;
    }

    /// Whether positional arguments are recorded into the root's store.
    pub fn root_has_positional_args(&self) -> bool {
        self.root_has_positional_args
    }

    /// Parse the arguments; only the first call parses.
    /// Returns whether the parse succeeded.
    ///
    /// When the parse terminates (ex: `--help`, or an error without [`ParseFlags::NO_EXIT`]),
    /// the parser tree is torn down and the process exits (via [`std::process::exit`]).
    pub fn parse(&mut self) -> bool {
        match self.try_parse() {
            Ok(success) => success,
            Err(termination) => std::process::exit(termination.code()),
        }
    }

    /// Parse the arguments like [`ParserRegistry::parse`], handing terminations back instead of exiting.
    ///
    /// Returns `Ok(false)` without parsing when there is no root, or when the registry has already parsed.
    pub fn try_parse(&mut self) -> Result<bool, Termination> {
        if self.parsed {
            return Ok(false);
        }

        let flattened = match flatten(&self.tree, self.parse_flags) {
            Some(flattened) => flattened,
            None => {
                self.status = ENODATA;
                return Ok(false);
            }
        };
        self.parsed = true;
        let context = ParseContext {
            flattened: &flattened,
            filters: &self.filters,
            user_interface: self.user_interface.as_ref(),
            program_version: self.program_version.as_deref(),
            version_hook: self.version_hook.as_deref(),
            bug_address: self.bug_address.as_deref(),
            root_has_parsed_options: self.root_has_parsed_options,
            root_has_positional_args: self.root_has_positional_args,
            terminal_width: self.terminal_width,
        };
        let mut router = Router {
            tree: &mut self.tree,
            handlers: &mut self.handlers,
            hooks: &mut self.hooks,
        };

        match scan(
            &flattened,
            &context,
            &mut router,
            self.argv.clone(),
            self.parse_flags,
        ) {
            Ok(outcome) => {
                self.status = outcome.status;
                self.error_code = outcome.error_code;
                self.end_index = outcome.end_index;
                Ok(outcome.status == 0)
            }
            Err(termination) => {
                self.clear_all_parsers();
                self.parsed = true;
                self.error_code = termination.code();
                Err(termination)
            }
        }
    }

    /// The status of the last parse: 0 on success, [`ENODATA`](crate::ENODATA) before any parse.
    pub fn status(&self) -> i32 {
        self.status
    }

    /// The error status set by the last error or help request.
    pub fn error_code(&self) -> i32 {
        self.error_code
    }

    /// The index of the first argument the parse did not consume.
    pub fn end_index(&self) -> Option<usize> {
        self.end_index
    }

    /// Whether the arguments were parsed.
    pub fn has_parsed(&self) -> bool {
        self.parsed
    }

    /// The argument vector, program name first.
    pub fn argv(&self) -> &[String] {
        &self.argv
    }

    /// Destroy every parser with its handler and hooks, and forget the last parse.
    /// The configuration (flags, version, bug address, ...) is kept.
    ///
    /// Handles to the destroyed parsers become invalid.
    pub fn clear_all_parsers(&mut self) {
        #[cfg(feature = "tracing_debug")]
        {
            debug!("Tearing down {} parsers.", self.tree.len());
        }

        self.tree.clear();
        self.handlers.clear();
        self.hooks.clear();
        self.filters.filters.clear();
        self.parsed = false;
        self.status = ENODATA;
        self.error_code = 0;
        self.end_index = None;
    }

    /// Whether the arguments ask for help, usage or version output (which would end the process during a parse).
    pub fn help_requested(&self) -> bool {
        let start = if self.parse_flags.contains(ParseFlags::PARSE_ARGV0) {
            0
        } else {
            1
        };
        let version_known = self.program_version.is_some() || self.version_hook.is_some();
        let help = !self.parse_flags.contains(ParseFlags::NO_HELP);
        let names_prefix = |arg: &str, name: &str, minimum: usize| {
            arg.strip_prefix("--")
                .map(|prefix| prefix.len() >= minimum && name.starts_with(prefix))
                .unwrap_or(false)
        };

        for arg in self.argv.iter().skip(start) {
            if arg == "--" {
                break;
            }

            if help && (arg == "-?" || names_prefix(arg, "help", 1) || names_prefix(arg, "usage", 1))
            {
                return true;
            }

            if version_known && (arg == "-V" || names_prefix(arg, "version", 2)) {
                return true;
            }
        }

        false
    }
}

/// The library version as `major << 16 | minor << 8 | patch`.
pub fn library_build_version() -> u32 {
    let part = |value: &str| value.parse::<u32>().unwrap_or(0);
    part(env!("CARGO_PKG_VERSION_MAJOR")) << 16
        | part(env!("CARGO_PKG_VERSION_MINOR")) << 8
        | part(env!("CARGO_PKG_VERSION_PATCH"))
}

/// The library version as text.
pub fn str_library_build_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
