use std::cmp::Ordering;

use crate::api::ConfigError;
use crate::model::{Key, OptionFlags};

/// An option a parser accepts, or a documentation entry in its help listing.
///
/// ### Example
/// ```
/// # use argtree_builder::{ArgOption, Key, OptionFlags};
/// let dot = ArgOption::new('d', "dot")
///     .arg("NUM")
///     .flags(OptionFlags::ARG_OPTIONAL)
///     .help("Show some dots.");
/// assert_eq!(dot.key, Key::from('d'));
/// assert!(!dot.arg_required());
/// ```
#[derive(Debug, Clone, Default)]
pub struct ArgOption {
    /// The key, which is also the short option when printable.
    pub key: Key,
    /// The long name (empty for none).
    pub long_name: String,
    /// The argument placeholder shown in help (empty when the option takes no argument).
    pub arg_name: String,
    /// The option flags.
    pub flags: OptionFlags,
    /// The help group (0 inherits the group of the previous entry).
    pub group: i32,
    /// The help text.
    pub doc: String,
}

impl ArgOption {
    /// An option with both a key and a long name.
    pub fn new(key: impl Into<Key>, long_name: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            long_name: long_name.into(),
            ..Self::default()
        }
    }

    /// An option with only a short form.
    pub fn short(key: char) -> Self {
        Self::new(key, "")
    }

    /// A help listing header, starting a new group.
    pub fn header(text: impl Into<String>, group: i32) -> Self {
        Self {
            group,
            doc: text.into(),
            ..Self::default()
        }
    }

    /// Set the argument placeholder, making the option take an argument.
    pub fn arg(mut self, arg_name: impl Into<String>) -> Self {
        self.arg_name = arg_name.into();
        self
    }

    /// Add flags.
    pub fn flags(mut self, flags: OptionFlags) -> Self {
        self.flags |= flags;
        self
    }

    /// Set the help group.
    pub fn group(mut self, group: i32) -> Self {
        self.group = group;
        self
    }

    /// Set the help text.
    pub fn help(mut self, doc: impl Into<String>) -> Self {
        self.doc = doc.into();
        self
    }

    /// Whether the option takes an argument at all.
    pub fn takes_arg(&self) -> bool {
        !self.arg_name.is_empty()
    }

    /// Whether the option's argument must be given.
    pub fn arg_required(&self) -> bool {
        self.takes_arg() && !self.flags.contains(OptionFlags::ARG_OPTIONAL)
    }

    /// Whether this is a documentation entry rather than an option.
    pub fn is_doc(&self) -> bool {
        self.flags.contains(OptionFlags::DOC)
    }

    /// Whether this names the closest preceding non-alias option.
    pub fn is_alias(&self) -> bool {
        self.flags.contains(OptionFlags::ALIAS)
    }

    /// Whether this is a group header (no key and no name).
    pub fn is_header(&self) -> bool {
        self.key.is_none() && self.long_name.is_empty()
    }

    /// The short option character, when the key has one and this is a real option.
    pub fn short_name(&self) -> Option<char> {
        if self.is_doc() {
            None
        } else {
            self.key.as_short()
        }
    }

    fn precedes(&self, other: &Self) -> bool {
        precedes(
            (self.key, self.long_name.as_str()),
            (other.key, other.long_name.as_str()),
        )
    }
}

// Keys order by value, a key against a name by the name's first character, names lexically.
// Anything else (a header on either side) has no order.
fn precedes(this: (Key, &str), other: (Key, &str)) -> bool {
    let first = |name: &str| name.chars().next().map(|c| c as i32);
    let ((key, name), (other_key, other_name)) = (this, other);

    match (key.is_none(), other_key.is_none()) {
        (false, false) => key < other_key,
        (false, true) if !other_name.is_empty() => Some(key.value()) < first(other_name),
        (true, false) if !name.is_empty() => first(name) < Some(other_key.value()),
        (true, true) if !name.is_empty() && !other_name.is_empty() => name < other_name,
        _ => false,
    }
}

impl PartialEq for ArgOption {
    fn eq(&self, other: &Self) -> bool {
        (!self.key.is_none() && self.key == other.key)
            || (!self.long_name.is_empty() && self.long_name == other.long_name)
    }
}

impl PartialOrd for ArgOption {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if self == other {
            Some(Ordering::Equal)
        } else if self.precedes(other) {
            Some(Ordering::Less)
        } else if other.precedes(self) {
            Some(Ordering::Greater)
        } else {
            None
        }
    }
}

/// A recognised option occurrence, as recorded by a parser.
///
/// Two occurrences are equal when their keys or their long names match; the argument is not compared.
/// They order like [`ArgOption`]s.
#[derive(Debug, Clone, Default)]
pub struct ParsedOption {
    /// The option key.
    pub key: Key,
    /// The option's long name (empty for none).
    pub long_name: String,
    /// The argument, when one was given.
    pub arg: Option<String>,
}

impl ParsedOption {
    /// Record an occurrence.
    pub fn new(key: Key, long_name: impl Into<String>, arg: Option<&str>) -> Self {
        Self {
            key,
            long_name: long_name.into(),
            arg: arg.map(str::to_string),
        }
    }

    /// Whether this is the empty sentinel (no key and no long name).
    pub fn is_empty(&self) -> bool {
        self.key.is_none() && self.long_name.is_empty()
    }
}

impl PartialEq for ParsedOption {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key || self.long_name == other.long_name
    }
}

impl PartialOrd for ParsedOption {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        let this = (self.key, self.long_name.as_str());
        let that = (other.key, other.long_name.as_str());

        if self == other {
            Some(Ordering::Equal)
        } else if precedes(this, that) {
            Some(Ordering::Less)
        } else if precedes(that, this) {
            Some(Ordering::Greater)
        } else {
            None
        }
    }
}

/// The result of checking a key (and its argument) against an option table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Classification<'t> {
    /// The key names this option and its argument requirement is met.
    Ok(&'t ArgOption),
    /// No option has this key.
    Unknown,
    /// The option requires an argument but none was given.
    NeedsArg,
}

/// The ordered options of one parser.
#[derive(Debug, Clone, Default)]
pub struct OptionTable {
    entries: Vec<ArgOption>,
}

impl OptionTable {
    /// Append an option, keeping insertion order.
    ///
    /// Fails only when the (normalized) option flags use illegal bits.
    /// Duplicate keys or names are accepted as is.
    pub fn add(&mut self, mut option: ArgOption) -> Result<(), ConfigError> {
        option.flags = option.flags.normalized();

        if !option.flags.is_legal() {
            return Err(ConfigError::IllegalFlags {
                flags: option.flags.bits(),
                legal: OptionFlags::ALL.bits(),
            });
        }

        self.entries.push(option);
        Ok(())
    }

    /// Append options in order, stopping at the first failure (earlier options stay added).
    pub fn add_all(
        &mut self,
        options: impl IntoIterator<Item = ArgOption>,
    ) -> Result<(), ConfigError> {
        for option in options {
            self.add(option)?;
        }

        Ok(())
    }

    /// The first option with this (nonzero) key.
    pub fn find(&self, key: Key) -> Option<&ArgOption> {
        self.position(key).map(|index| &self.entries[index])
    }

    /// Check `key` and its argument against the table.
    ///
    /// An alias is held to the argument requirement of the option it names.
    pub fn classify(&self, key: Key, arg: Option<&str>) -> Classification<'_> {
        let index = match self.position(key) {
            Some(index) => index,
            None => return Classification::Unknown,
        };
        let option = &self.entries[index];
        let canonical = self.entries[..=index]
            .iter()
            .rev()
            .find(|entry| !entry.is_alias())
            .unwrap_or(option);

        if canonical.arg_required() && arg.is_none() {
            Classification::NeedsArg
        } else {
            Classification::Ok(option)
        }
    }

    /// The options in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &ArgOption> {
        self.entries.iter()
    }

    /// The options as a slice.
    pub fn as_slice(&self) -> &[ArgOption] {
        &self.entries
    }

    /// The number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn position(&self, key: Key) -> Option<usize> {
        if key.is_none() {
            return None;
        }

        self.entries.iter().position(|entry| entry.key == key)
    }
}
