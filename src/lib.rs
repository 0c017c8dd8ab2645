//! `argtree` is a hierarchical, argp-style command line parser for Rust.
//!
//! A program builds a *tree* of parsers instead of a single flat option table.
//! Each parser owns its options, documentation, and the code reacting to its keys.
//! Library authors can hand out a parser for their own options, and the program attaches it under its root.
//! A single parse then runs every parser in the tree over the same arguments, and the help output lists them all.
//!
//! The command line conventions are those of GNU `argp`:
//! * Short options (`-v`), clusters (`-abc`) and long options (`--verbose`, `--dot=3`, unique prefixes like `--verb`).
//! * Options are permuted before positional arguments, unless `IN_ORDER` or `NO_ARGS` is set.
//! * `--` ends option processing.
//! * Built-in `-?`/`--help`, `--usage`, `--program-name` and (when a version is set) `-V`/`--version`.
//!
//! # Usage
//! ```no_run
#![doc = include_str!("../demos/dots.rs")]
//! ```
//!
//! ```console
//! $ dots --help
//! Usage: dots [OPTION...]
//!
//!   -d, --dot[=NUM]            Show some dots on the screen
//!       --dash                 Show a dash on the screen
//!   -?, --help                 Give this help list
//!       --usage                Give a short usage message
//!   -V, --version              Print program version
//!
//! Mandatory or optional arguments to long options are also mandatory or optional
//! for any corresponding short options.
//!
//! Report bugs to <dots@example.org>.
//!
//! $ dots -d3 --dash
//! ...-
//! ```
//!
//! # Parsers
//! Start with a [`ParserRegistry`] and create the root parser with [`ParserRegistry::create_parser`].
//! Every parser created afterwards attaches under the root, or under the parent it names.
//! [`ParserRegistry::add_child`] moves a parser elsewhere in the tree.
//!
//! Each parser has:
//! * A [`KeyHandler`](prelude::KeyHandler) deciding what to do with its option keys.
//! [`GenericHandler`] records every recognised option, and [`handler`] turns a closure into a handler.
//! * Options ([`ArgOption`]), added with [`Node::add_option`] or at creation via [`ParserRegistry::create_parser_with_options`].
//! * Optional [`Hook`]s for the other parse events: positional arguments, the end of the arguments, success, error, etc.
//! * Documentation: the usage arguments, text before and after the option listing, a child header and a help group.
//!
//! By default parsed options and positional arguments are recorded in the root parser, so the program finds every result in one place.
//! Turn this off with [`ParserRegistry::set_root_has_parsed_options`] / [`ParserRegistry::set_root_has_positional_args`].
//!
//! ```no_run
#![doc = include_str!("../demos/subcommands.rs")]
//! ```
//!
//! # Termination
//! Help, usage, version output and parse errors end the process (via [`std::process::exit`]) from within [`ParserRegistry::parse`].
//! Set [`ParseFlags::NO_EXIT`] to keep going, or use [`ParserRegistry::try_parse`] to receive the [`Termination`] instead.
//! In both cases the parser tree is torn down first.
//!
//! # Features
//! * `unit_test`: exposes the `InMemoryInterface`, capturing output for tests.
//! * `tracing_debug`: emits `tracing` debug events while building and parsing.
pub use argtree_builder::*;
