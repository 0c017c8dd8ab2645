/// Status reported by [`ParserRegistry::status`](crate::ParserRegistry::status) before any parse has completed.
pub const ENODATA: i32 = 61;
/// Status reported when a parse stops on a key or argument no parser claimed.
pub const EINVAL: i32 = 22;
/// Exit status for command line usage errors.
pub const EX_USAGE: i32 = 64;

pub(crate) const DOC_SEPARATOR: char = '\u{b}';
pub(crate) const ARGS_DOC_SEPARATOR: char = '\n';

pub(crate) const HELP_SHORT: char = '?';
pub(crate) const HELP_LONG: &str = "help";
pub(crate) const HELP_DOC: &str = "Give this help list";
pub(crate) const USAGE_KEY: i32 = -3;
pub(crate) const USAGE_LONG: &str = "usage";
pub(crate) const USAGE_DOC: &str = "Give a short usage message";
pub(crate) const PROGRAM_NAME_KEY: i32 = -2;
pub(crate) const PROGRAM_NAME_LONG: &str = "program-name";
pub(crate) const PROGRAM_NAME_ARG: &str = "NAME";
pub(crate) const PROGRAM_NAME_DOC: &str = "Set the program name";
pub(crate) const VERSION_SHORT: char = 'V';
pub(crate) const VERSION_LONG: &str = "version";
pub(crate) const VERSION_DOC: &str = "Print program version";

pub(crate) const DUP_ARGS_NOTE: &str = "Mandatory or optional arguments to long options are also mandatory or optional for any corresponding short options.";
pub(crate) const UNRECOGNIZED_KEY: &str = "(PROGRAM ERROR) Option should have been recognized!?";
pub(crate) const NO_VERSION: &str = "(PROGRAM ERROR) No version known!?";

pub(crate) const RIGHT_MARGIN: usize = 79;
pub(crate) const OPTION_COLUMN: usize = 2;
pub(crate) const LONG_OPTION_COLUMN: usize = 6;
pub(crate) const DOC_COLUMN: usize = 29;
pub(crate) const HEADER_COLUMN: usize = 1;
pub(crate) const USAGE_INDENT: usize = 12;
