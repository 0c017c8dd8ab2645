/// Identifies an option, both on the command line and to the handler receiving it.
///
/// Keys in the printable ASCII range double as the short option character (ex: `Key::from('d')` is `-d`).
/// Any other nonzero value is a key with no short form, typically paired with a long name.
/// `Key::NONE` (zero) means "no key".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Key(i32);

impl Key {
    /// The absent key.
    pub const NONE: Key = Key(0);

    /// Create a key from its raw value.
    pub const fn new(value: i32) -> Self {
        Key(value)
    }

    /// The raw value.
    pub const fn value(&self) -> i32 {
        self.0
    }

    /// Whether this is [`Key::NONE`].
    pub const fn is_none(&self) -> bool {
        self.0 == 0
    }

    /// The short option character for this key, if it has one.
    pub fn as_short(&self) -> Option<char> {
        match u8::try_from(self.0) {
            Ok(byte) if (0x20..=0x7e).contains(&byte) => Some(byte as char),
            _ => None,
        }
    }
}

impl From<char> for Key {
    fn from(value: char) -> Self {
        Key(value as i32)
    }
}

impl From<i32> for Key {
    fn from(value: i32) -> Self {
        Key(value)
    }
}

impl std::fmt::Display for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.as_short() {
            Some(c) => write!(f, "{c}"),
            None => write!(f, "{}", self.0),
        }
    }
}

/// Check that `value` only uses bits from `legal`.
///
/// ### Example
/// ```
/// # use argtree_builder::flags_ok;
/// assert!(flags_ok(0b0101, 0b0111));
/// assert!(!flags_ok(0b1000, 0b0111));
/// ```
pub fn flags_ok(value: u32, legal: u32) -> bool {
    legal == value | legal
}

macro_rules! bitmask {
    (
        $(#[$outer:meta])*
        $name:ident {
            $(
                $(#[$inner:meta])*
                const $flag:ident = $value:expr;
            )*
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
        pub struct $name(u32);

        impl $name {
            $(
                $(#[$inner])*
                pub const $flag: $name = $name($value);
            )*

            /// No flags.
            pub const fn empty() -> Self {
                $name(0)
            }

            /// Wrap raw bits as is (bits outside the legal set are kept, so they may be validated).
            pub const fn from_bits(bits: u32) -> Self {
                $name(bits)
            }

            /// The raw bits.
            pub const fn bits(&self) -> u32 {
                self.0
            }

            /// Whether no flag is set.
            pub const fn is_empty(&self) -> bool {
                self.0 == 0
            }

            /// Whether every flag in `other` is set.
            pub const fn contains(&self, other: Self) -> bool {
                self.0 & other.0 == other.0
            }

            /// Whether any flag in `other` is set.
            pub const fn intersects(&self, other: Self) -> bool {
                self.0 & other.0 != 0
            }

            /// These flags with every flag in `other` cleared.
            pub const fn without(self, other: Self) -> Self {
                $name(self.0 & !other.0)
            }
        }

        impl std::ops::BitOr for $name {
            type Output = Self;

            fn bitor(self, rhs: Self) -> Self {
                $name(self.0 | rhs.0)
            }
        }

        impl std::ops::BitOrAssign for $name {
            fn bitor_assign(&mut self, rhs: Self) {
                self.0 |= rhs.0;
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{:#x}", self.0)
            }
        }
    };
}

bitmask! {
    /// Flags that steer a whole parse, or a subtree of it when set as a child's flags.
    ParseFlags {
        /// Treat `argv[0]` as an ordinary argument instead of the program name.
        const PARSE_ARGV0 = 0x01;
        /// Print no error messages. The engine then also skips exiting on its own errors; handler helpers still terminate.
        const NO_ERRS = 0x02;
        /// Stop at the first non-option argument, leaving it unconsumed.
        const NO_ARGS = 0x04;
        /// Hand over positional arguments in the order they appear, interleaved with options.
        const IN_ORDER = 0x08;
        /// Do not provide the built-in help options.
        const NO_HELP = 0x10;
        /// Never terminate the process.
        const NO_EXIT = 0x20;
        /// Allow long options to be introduced with a single dash.
        const LONG_ONLY = 0x40;
        /// `NO_EXIT | NO_ERRS | NO_HELP`.
        const SILENT = 0x32;
        /// Every legal parse flag.
        const ALL = 0x7f;
    }
}

bitmask! {
    /// Flags describing a single option.
    OptionFlags {
        /// The option's argument may be omitted.
        const ARG_OPTIONAL = 0x01;
        /// Leave the option out of help output.
        const HIDDEN = 0x02;
        /// Another name for the closest preceding non-alias option.
        const ALIAS = 0x04;
        /// A documentation entry, not an option.
        const DOC = 0x08;
        /// Leave the option out of the long usage line.
        const NO_USAGE = 0x10;
        /// Do not translate the documentation text (only meaningful together with `DOC`).
        const NO_TRANS = 0x20;
        /// Every legal option flag.
        const ALL = 0x3f;
    }
}

bitmask! {
    /// Selects what the help helpers print.
    HelpFlags {
        /// The long usage line, listing every option.
        const USAGE = 0x001;
        /// The short usage line.
        const SHORT_USAGE = 0x002;
        /// The "Try ..." pointer to the help options.
        const SEE = 0x004;
        /// The option listing.
        const LONG = 0x008;
        /// The documentation preceding the option listing.
        const PRE_DOC = 0x010;
        /// The documentation following the option listing.
        const POST_DOC = 0x020;
        /// `PRE_DOC | POST_DOC`.
        const DOC = 0x030;
        /// The bug report address.
        const BUG_ADDR = 0x040;
        /// Show long options with a single dash.
        const LONG_ONLY = 0x080;
        /// Terminate with the usage error status afterwards.
        const EXIT_ERR = 0x100;
        /// Terminate successfully afterwards.
        const EXIT_OK = 0x200;
        /// `SEE | EXIT_ERR`.
        const STD_ERR = 0x104;
        /// `SHORT_USAGE | SEE | EXIT_ERR`.
        const STD_USAGE = 0x106;
        /// `SHORT_USAGE | LONG | DOC | BUG_ADDR | EXIT_OK`.
        const STD_HELP = 0x27a;
    }
}

impl ParseFlags {
    /// Whether only legal parse flags are set.
    pub fn is_legal(&self) -> bool {
        flags_ok(self.0, Self::ALL.0)
    }
}

impl OptionFlags {
    /// Whether only legal option flags are set.
    pub fn is_legal(&self) -> bool {
        flags_ok(self.0, Self::ALL.0)
    }

    /// `NO_TRANS` only applies to documentation entries, so it is cleared from anything else.
    pub fn normalized(self) -> Self {
        if self.contains(Self::NO_TRANS) && !self.contains(Self::DOC) {
            self.without(Self::NO_TRANS)
        } else {
            self
        }
    }
}

/// Which piece of help text a help filter is being asked about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HelpKey {
    /// Documentation printed before the option listing.
    PreDoc,
    /// Documentation printed after the option listing.
    PostDoc,
    /// A group or child header.
    Header,
    /// Extra text appended at the very end (the offered text is empty).
    Extra,
    /// The note about mandatory/optional arguments of long and short options.
    DupArgsNote,
    /// The arguments documentation of the usage line.
    ArgsDoc,
}

/// The stream help or error text is written to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    /// Standard output.
    Out,
    /// Standard error.
    Err,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;
    use rstest::rstest;

    #[rstest]
    #[case('d', Some('d'))]
    #[case(' ', Some(' '))]
    #[case('~', Some('~'))]
    #[case('\u{7f}', None)]
    #[case('é', None)]
    fn key_as_short(#[case] c: char, #[case] expected: Option<char>) {
        assert_eq!(Key::from(c).as_short(), expected);
    }

    #[rstest]
    #[case(0)]
    #[case(-3)]
    #[case(256)]
    #[case(0x1000)]
    fn key_without_short(#[case] value: i32) {
        assert_eq!(Key::new(value).as_short(), None);
    }

    #[test]
    fn key_display() {
        assert_eq!(Key::from('x').to_string(), "x");
        assert_eq!(Key::new(-2).to_string(), "-2");
    }

    #[test]
    fn flags_ok_subset_property() {
        let mut rng = rand::thread_rng();

        for _ in 0..1000 {
            let value: u32 = rng.gen();
            let legal: u32 = rng.gen();
            assert_eq!(flags_ok(value, legal), value & !legal == 0);
            assert!(flags_ok(value & legal, legal));
        }
    }

    #[rstest]
    #[case(ParseFlags::empty(), true)]
    #[case(ParseFlags::SILENT, true)]
    #[case(ParseFlags::ALL, true)]
    #[case(ParseFlags::from_bits(0x80), false)]
    #[case(ParseFlags::from_bits(0x7f | 0x100), false)]
    fn parse_flags_legal(#[case] flags: ParseFlags, #[case] expected: bool) {
        assert_eq!(flags.is_legal(), expected);
    }

    #[test]
    fn composite_flags() {
        assert_eq!(
            ParseFlags::SILENT,
            ParseFlags::NO_EXIT | ParseFlags::NO_ERRS | ParseFlags::NO_HELP
        );
        assert_eq!(HelpFlags::DOC, HelpFlags::PRE_DOC | HelpFlags::POST_DOC);
        assert_eq!(HelpFlags::STD_ERR, HelpFlags::SEE | HelpFlags::EXIT_ERR);
        assert_eq!(
            HelpFlags::STD_USAGE,
            HelpFlags::SHORT_USAGE | HelpFlags::SEE | HelpFlags::EXIT_ERR
        );
        assert_eq!(
            HelpFlags::STD_HELP,
            HelpFlags::SHORT_USAGE
                | HelpFlags::LONG
                | HelpFlags::DOC
                | HelpFlags::BUG_ADDR
                | HelpFlags::EXIT_OK
        );
    }

    #[rstest]
    #[case(OptionFlags::NO_TRANS, OptionFlags::empty())]
    #[case(OptionFlags::NO_TRANS | OptionFlags::HIDDEN, OptionFlags::HIDDEN)]
    #[case(
        OptionFlags::NO_TRANS | OptionFlags::DOC,
        OptionFlags::NO_TRANS | OptionFlags::DOC
    )]
    #[case(OptionFlags::ARG_OPTIONAL, OptionFlags::ARG_OPTIONAL)]
    fn option_flags_normalized(#[case] flags: OptionFlags, #[case] expected: OptionFlags) {
        assert_eq!(flags.normalized(), expected);
    }

    #[test]
    fn flags_set_operations() {
        let flags = ParseFlags::NO_EXIT | ParseFlags::IN_ORDER;
        assert!(flags.contains(ParseFlags::NO_EXIT));
        assert!(!flags.contains(ParseFlags::SILENT));
        assert!(flags.intersects(ParseFlags::SILENT));
        assert_eq!(flags.without(ParseFlags::NO_EXIT), ParseFlags::IN_ORDER);
        assert_eq!(flags.to_string(), "0x28");
    }
}
