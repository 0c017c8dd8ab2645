use crate::api::{ArgOption, HandlerResult, NodeId};
use crate::constant::*;
use crate::model::{Key, OptionFlags, ParseFlags};
use crate::parser::ParseContext;

/// The scanning position shared by the engine and the handlers.
#[derive(Debug)]
pub(crate) struct Cursor {
    pub(crate) argv: Vec<String>,
    pub(crate) next: usize,
    pub(crate) arg_num: usize,
    pub(crate) quoted: Option<usize>,
    pub(crate) flags: ParseFlags,
    pub(crate) name: String,
    pub(crate) error_code: i32,
}

impl Cursor {
    pub(crate) fn new(argv: Vec<String>, flags: ParseFlags) -> Self {
        let name = argv
            .first()
            .map(|program| program.rsplit('/').next().unwrap_or(program).to_string())
            .unwrap_or_default();
        let next = if flags.contains(ParseFlags::PARSE_ARGV0) {
            0
        } else {
            std::cmp::min(1, argv.len())
        };

        Self {
            argv,
            next,
            arg_num: 0,
            quoted: None,
            flags,
            name,
            error_code: 0,
        }
    }

    pub(crate) fn argc(&self) -> usize {
        self.argv.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Event {
    Init,
    Option(Key, Option<String>),
    Arg(String),
    Args,
    NoArgs,
    End,
    Success,
    Error,
    Fini,
}

/// The engine's view of one group, handed to the dispatcher with each event.
pub(crate) struct ScanState<'s> {
    pub(crate) cursor: &'s mut Cursor,
    pub(crate) input: Option<NodeId>,
    pub(crate) child_inputs: &'s mut [Option<NodeId>],
    pub(crate) context: &'s ParseContext<'s>,
}

/// Receives every event of the user's parser groups.
pub(crate) trait Dispatch {
    fn dispatch(&mut self, event: Event, state: &mut ScanState<'_>) -> HandlerResult;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Source {
    /// A user parser, by descriptor index.
    Parser(usize),
    Help,
    Version,
}

#[derive(Debug)]
pub(crate) struct Group {
    pub(crate) source: Source,
    pub(crate) parent: Option<usize>,
    pub(crate) parent_index: usize,
    pub(crate) input: Option<NodeId>,
    pub(crate) child_inputs: Vec<Option<NodeId>>,
    pub(crate) args_processed: usize,
}

impl Source {
    pub(crate) fn builtin_options(&self) -> Vec<ArgOption> {
        match self {
            Source::Parser(_) => Vec::default(),
            Source::Help => vec![
                ArgOption::new(HELP_SHORT, HELP_LONG).help(HELP_DOC).group(-1),
                ArgOption::new(Key::new(USAGE_KEY), USAGE_LONG).help(USAGE_DOC),
                ArgOption::new(Key::new(PROGRAM_NAME_KEY), PROGRAM_NAME_LONG)
                    .arg(PROGRAM_NAME_ARG)
                    .flags(OptionFlags::HIDDEN)
                    .help(PROGRAM_NAME_DOC),
            ],
            Source::Version => vec![ArgOption::new(VERSION_SHORT, VERSION_LONG)
                .help(VERSION_DOC)
                .group(-1)],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ArgRequirement {
    None,
    Required,
    Optional,
}

impl ArgRequirement {
    pub(crate) fn of(option: &ArgOption) -> Self {
        if !option.takes_arg() {
            ArgRequirement::None
        } else if option.arg_required() {
            ArgRequirement::Required
        } else {
            ArgRequirement::Optional
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ShortEntry {
    pub(crate) name: char,
    pub(crate) group: usize,
    pub(crate) requirement: ArgRequirement,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LongEntry {
    pub(crate) name: String,
    pub(crate) key: Key,
    pub(crate) group: usize,
    pub(crate) requirement: ArgRequirement,
}

/// Every short and long option of the tree, resolved to its group.
/// The first definition of a short or long name wins.
#[derive(Debug, Default)]
pub(crate) struct OptionIndex {
    pub(crate) shorts: Vec<ShortEntry>,
    pub(crate) longs: Vec<LongEntry>,
}

impl OptionIndex {
    /// Index one group's options; aliases share the argument requirement (and, when keyless, the key) of their canonical option.
    pub(crate) fn add_group(&mut self, group: usize, options: &[ArgOption]) {
        let mut canonical: Option<&ArgOption> = None;

        for option in options {
            if option.is_doc() {
                continue;
            }

            let real = if option.is_alias() {
                canonical.unwrap_or(option)
            } else {
                canonical = Some(option);
                option
            };
            let requirement = ArgRequirement::of(real);
            let key = if option.key.is_none() {
                real.key
            } else {
                option.key
            };

            if let Some(name) = option.short_name() {
                if self.short(name).is_none() {
                    self.shorts.push(ShortEntry {
                        name,
                        group,
                        requirement,
                    });
                }
            }

            if !option.long_name.is_empty() && self.exact(&option.long_name).is_none() {
                self.longs.push(LongEntry {
                    name: option.long_name.clone(),
                    key,
                    group,
                    requirement,
                });
            }
        }
    }

    pub(crate) fn short(&self, name: char) -> Option<&ShortEntry> {
        self.shorts.iter().find(|entry| entry.name == name)
    }

    pub(crate) fn exact(&self, name: &str) -> Option<&LongEntry> {
        self.longs.iter().find(|entry| entry.name == name)
    }

    /// Long options starting with `prefix`, in definition order.
    pub(crate) fn prefixed<'i>(&'i self, prefix: &'i str) -> impl Iterator<Item = &'i LongEntry> {
        self.longs
            .iter()
            .filter(move |entry| entry.name.starts_with(prefix))
    }
}

/// What the option matcher found at the cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Scanned {
    Option {
        key: Key,
        group: usize,
        name: String,
        arg: Option<String>,
    },
    /// A positional argument handed over in order (the cursor has moved past it).
    Arg(String),
    /// No more options; anything left from the cursor on is positional.
    End,
    /// A malformed or unknown option, with the message to report.
    Invalid(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ScanOutcome {
    pub(crate) status: i32,
    pub(crate) end_index: Option<usize>,
    pub(crate) error_code: i32,
}
