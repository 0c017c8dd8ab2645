use crate::model::{Key, ParseFlags};
use crate::scanner::model::{ArgRequirement, Cursor, LongEntry, OptionIndex, Scanned};

#[cfg(feature = "tracing_debug")]
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Ordering {
    /// Options first; non-options are moved behind them.
    Permute,
    /// Non-options are handed over where they appear.
    InOrder,
    /// Option scanning stops at the first non-option.
    RequireOrder,
}

impl Ordering {
    pub(crate) fn of(flags: ParseFlags) -> Self {
        if flags.contains(ParseFlags::IN_ORDER) {
            Ordering::InOrder
        } else if flags.contains(ParseFlags::NO_ARGS) {
            Ordering::RequireOrder
        } else {
            Ordering::Permute
        }
    }
}

enum Lookup {
    Found(LongEntry),
    Ambiguous(Vec<String>),
    Missing,
}

/// Finds the next option at the cursor, getopt style.
pub(crate) struct OptionMatcher<'i> {
    index: &'i OptionIndex,
    ordering: Ordering,
    long_only: bool,
    // Byte offset of the next short option within a `-abc` cluster.
    cluster: Option<usize>,
    // Non-options jumped over to reach the current option token.
    skipped: usize,
}

fn is_option(token: &str) -> bool {
    token.len() > 1 && token.starts_with('-')
}

impl<'i> OptionMatcher<'i> {
    pub(crate) fn new(index: &'i OptionIndex, flags: ParseFlags) -> Self {
        Self {
            index,
            ordering: Ordering::of(flags),
            long_only: flags.contains(ParseFlags::LONG_ONLY),
            cluster: None,
            skipped: 0,
        }
    }

    pub(crate) fn next(&mut self, cursor: &mut Cursor) -> Scanned {
        if let Some(offset) = self.cluster {
            return self.short_option(cursor, offset);
        }

        if cursor.next >= cursor.argc() {
            return Scanned::End;
        }

        if !is_option(&cursor.argv[cursor.next]) {
            match self.ordering {
                Ordering::InOrder => {
                    let arg = cursor.argv[cursor.next].clone();
                    cursor.next += 1;
                    return Scanned::Arg(arg);
                }
                Ordering::RequireOrder => return Scanned::End,
                Ordering::Permute => {
                    let position = (cursor.next + 1..cursor.argc())
                        .find(|position| is_option(&cursor.argv[*position]));

                    match position {
                        Some(position) => {
                            cursor.argv[cursor.next..=position].rotate_right(1);
                            self.skipped = position - cursor.next;
                        }
                        None => return Scanned::End,
                    }
                }
            }
        }

        let token = cursor.argv[cursor.next].clone();

        #[cfg(feature = "tracing_debug")]
        {
            debug!("Matching option token '{token}' at {}.", cursor.next);
        }

        if token == "--" {
            cursor.next += 1;
            cursor.quoted = Some(cursor.next);
            self.skipped = 0;
            return Scanned::End;
        }

        if let Some(body) = token.strip_prefix("--") {
            return self.long_option(cursor, body, "--");
        }

        if self.long_only {
            let single = token[1..].chars().count() == 1;
            let first = token[1..].chars().next();
            let is_short = first.map(|c| self.index.short(c).is_some()).unwrap_or(false);

            if !single || !is_short {
                let (name, _) = split_value(&token[1..]);

                match self.lookup(name) {
                    Lookup::Missing if is_short => {}
                    _ => return self.long_option(cursor, &token[1..], "-"),
                }
            }
        }

        self.short_option(cursor, 1)
    }

    fn lookup(&self, name: &str) -> Lookup {
        if let Some(entry) = self.index.exact(name) {
            return Lookup::Found(entry.clone());
        }

        let candidates: Vec<&LongEntry> = self.index.prefixed(name).collect();

        match candidates.first() {
            None => Lookup::Missing,
            Some(first) => {
                let same = candidates.iter().all(|candidate| {
                    candidate.key == first.key
                        && candidate.group == first.group
                        && candidate.requirement == first.requirement
                });

                if same {
                    Lookup::Found((*first).clone())
                } else {
                    Lookup::Ambiguous(
                        candidates
                            .iter()
                            .map(|candidate| candidate.name.clone())
                            .collect(),
                    )
                }
            }
        }
    }

    fn long_option(&mut self, cursor: &mut Cursor, body: &str, dashes: &str) -> Scanned {
        let (name, value) = split_value(body);

        let entry = match self.lookup(name) {
            Lookup::Found(entry) => entry,
            Lookup::Ambiguous(names) => {
                self.finish_token(cursor);
                let possibilities: String = names
                    .iter()
                    .map(|candidate| format!(" '{dashes}{candidate}'"))
                    .collect();
                return Scanned::Invalid(format!(
                    "option '{dashes}{name}' is ambiguous; possibilities:{possibilities}"
                ));
            }
            Lookup::Missing => {
                self.finish_token(cursor);
                return Scanned::Invalid(format!("unrecognized option '{dashes}{name}'"));
            }
        };

        let arg = match (entry.requirement, value) {
            (ArgRequirement::None, Some(_)) => {
                self.finish_token(cursor);
                return Scanned::Invalid(format!(
                    "option '{dashes}{}' doesn't allow an argument",
                    entry.name
                ));
            }
            (ArgRequirement::Required, None) => match self.separate_argument(cursor) {
                Some(arg) => Some(arg),
                None => {
                    return Scanned::Invalid(format!(
                        "option '{dashes}{}' requires an argument",
                        entry.name
                    ))
                }
            },
            (_, value) => {
                self.finish_token(cursor);
                value.map(str::to_string)
            }
        };

        Scanned::Option {
            key: entry.key,
            group: entry.group,
            name: format!("{dashes}{}", entry.name),
            arg,
        }
    }

    fn short_option(&mut self, cursor: &mut Cursor, offset: usize) -> Scanned {
        let token = cursor.argv[cursor.next].clone();
        let name = match token[offset..].chars().next() {
            Some(name) => name,
            None => {
                self.finish_token(cursor);
                return Scanned::End;
            }
        };
        let rest_offset = offset + name.len_utf8();
        let rest = &token[rest_offset..];

        let entry = match self.index.short(name) {
            Some(entry) => entry.clone(),
            None => {
                self.advance_cluster(cursor, &token, rest_offset);
                return Scanned::Invalid(format!("invalid option -- '{name}'"));
            }
        };

        let arg = match entry.requirement {
            ArgRequirement::None => {
                self.advance_cluster(cursor, &token, rest_offset);
                None
            }
            ArgRequirement::Optional => {
                self.finish_token(cursor);
                Some(rest.to_string()).filter(|rest| !rest.is_empty())
            }
            ArgRequirement::Required if !rest.is_empty() => {
                self.finish_token(cursor);
                Some(rest.to_string())
            }
            ArgRequirement::Required => match self.separate_argument(cursor) {
                Some(arg) => Some(arg),
                None => {
                    return Scanned::Invalid(format!("option requires an argument -- '{name}'"))
                }
            },
        };

        Scanned::Option {
            key: Key::from(name),
            group: entry.group,
            name: format!("-{name}"),
            arg,
        }
    }

    fn advance_cluster(&mut self, cursor: &mut Cursor, token: &str, offset: usize) {
        if offset >= token.len() {
            self.finish_token(cursor);
        } else {
            self.cluster = Some(offset);
        }
    }

    fn finish_token(&mut self, cursor: &mut Cursor) {
        cursor.next += 1;
        self.cluster = None;
        self.skipped = 0;
    }

    // Take the element after the option token, pulling it in front of any skipped non-options.
    fn separate_argument(&mut self, cursor: &mut Cursor) -> Option<String> {
        let position = cursor.next + 1 + self.skipped;
        self.cluster = None;
        self.skipped = 0;

        if position < cursor.argc() {
            cursor.argv[cursor.next + 1..=position].rotate_right(1);
            let arg = cursor.argv[cursor.next + 1].clone();
            cursor.next += 2;
            Some(arg)
        } else {
            cursor.next += 1;
            None
        }
    }
}

fn split_value(body: &str) -> (&str, Option<&str>) {
    match body.split_once('=') {
        Some((name, value)) => (name, Some(value)),
        None => (body, None),
    }
}
