use terminal_size::{terminal_size, Width};

use crate::api::{ArgOption, ChildHeader, NodeId};
use crate::constant::*;
use crate::model::{HelpFlags, HelpKey, OptionFlags, ParseFlags};
use crate::parser::interface::{wrap, ColumnRenderer};
use crate::parser::ParseContext;
use crate::scanner::Source;

/// The width of the attached terminal, if any.
pub(crate) fn terminal_width() -> Option<usize> {
    if let Some((Width(terminal_width), _)) = terminal_size() {
        Some(terminal_width as usize)
    } else {
        None
    }
}

struct Cluster {
    header: ChildHeader,
    group: i32,
    owner: NodeId,
}

/// One line of the option listing: an option with its aliases, or a header.
struct Entry<'o> {
    options: Vec<&'o ArgOption>,
    group: i32,
    cluster: Option<usize>,
    owner: NodeId,
    order: usize,
}

impl<'o> Entry<'o> {
    fn canonical(&self) -> &'o ArgOption {
        self.options[0]
    }

    fn is_header(&self) -> bool {
        self.canonical().is_header()
    }

    fn visible(&self) -> impl Iterator<Item = &'o ArgOption> + '_ {
        self.options
            .iter()
            .copied()
            .filter(|option| !option.flags.contains(OptionFlags::HIDDEN))
    }

    fn shorts(&self) -> Vec<char> {
        self.visible().filter_map(|option| option.short_name()).collect()
    }

    fn longs(&self) -> Vec<&'o str> {
        self.visible()
            .filter(|option| !option.long_name.is_empty())
            .map(|option| option.long_name.as_str())
            .collect()
    }

    fn is_hidden(&self) -> bool {
        self.canonical()
            .flags
            .contains(OptionFlags::HIDDEN)
    }

    fn in_usage(&self) -> bool {
        let canonical = self.canonical();
        !self.is_header()
            && !self.is_hidden()
            && !canonical.is_doc()
            && !canonical
                .flags
                .contains(OptionFlags::NO_USAGE)
    }

    // Names sort case-insensitively, on the first short name or else the first long name.
    fn name_key(&self) -> (String, String) {
        let name = match self.shorts().first() {
            Some(short) => short.to_string(),
            None => self
                .longs()
                .first()
                .map(|long| long.to_string())
                .unwrap_or_default(),
        };
        (name.to_lowercase(), name)
    }
}

// Groups order as 0, 1, 2, ..., then -m, ..., -1.
fn group_rank(group: i32) -> (bool, i32) {
    (group < 0, group)
}

struct Listing<'o> {
    clusters: Vec<Cluster>,
    entries: Vec<Entry<'o>>,
}

impl<'o> Listing<'o> {
    fn build(context: &'o ParseContext<'_>, builtins: &'o [ArgOption]) -> Self {
        let mut listing = Listing {
            clusters: Vec::default(),
            entries: Vec::default(),
        };
        let flattened = context.flattened;
        let root = flattened.root();
        listing.visit(context, root, None);
        listing.add_options(builtins, None, flattened.owner(root));
        listing.sort();
        listing
    }

    fn visit(&mut self, context: &'o ParseContext<'_>, descriptor: usize, cluster: Option<usize>) {
        let flattened = context.flattened;
        let owner = flattened.owner(descriptor);
        let current = flattened.descriptor(descriptor);
        self.add_options(&current.options, cluster, owner);

        for child in &current.children {
            let child_cluster = if child.header != ChildHeader::Absent || child.group != 0 {
                self.clusters.push(Cluster {
                    header: child.header.clone(),
                    group: child.group,
                    owner: flattened.owner(child.descriptor),
                });
                Some(self.clusters.len() - 1)
            } else {
                cluster
            };

            self.visit(context, child.descriptor, child_cluster);
        }
    }

    fn add_options(&mut self, options: &'o [ArgOption], cluster: Option<usize>, owner: NodeId) {
        let mut group = 0;

        for option in options {
            if option.is_alias() && !option.is_header() {
                if let Some(entry) = self.entries.last_mut() {
                    if entry.owner == owner && !entry.is_header() {
                        entry.options.push(option);
                        continue;
                    }
                }
            }

            group = if option.group != 0 {
                option.group
            } else if option.is_header() {
                group + 1
            } else {
                group
            };
            let order = self.entries.len();
            self.entries.push(Entry {
                options: vec![option],
                group,
                cluster,
                owner,
                order,
            });
        }
    }

    fn sort(&mut self) {
        let clusters = &self.clusters;
        self.entries.sort_by_cached_key(|entry| {
            let (top, clustered) = match entry.cluster {
                Some(cluster) => (clusters[cluster].group, Some(cluster)),
                None => (entry.group, None),
            };
            (
                group_rank(top),
                clustered,
                group_rank(entry.group),
                !entry.is_header(),
                entry.name_key(),
                entry.order,
            )
        });
    }
}

/// Render the help selected by `flags`.
pub(crate) fn render_help(
    context: &ParseContext<'_>,
    parse_flags: ParseFlags,
    name: &str,
    flags: HelpFlags,
) -> String {
    let mut builtins = Vec::default();

    if !parse_flags.contains(ParseFlags::NO_HELP) {
        builtins.extend(Source::Help.builtin_options());
    }

    if context.version_known() {
        builtins.extend(Source::Version.builtin_options());
    }

    let listing = Listing::build(context, &builtins);
    let printer = Printer {
        context,
        listing: &listing,
        right_margin: context.right_margin(),
        long_only: flags.contains(HelpFlags::LONG_ONLY),
    };
    let mut lines: Vec<String> = Vec::default();
    let mut anything = false;

    if flags.intersects(HelpFlags::USAGE | HelpFlags::SHORT_USAGE) {
        lines.extend(printer.usage(name, flags.contains(HelpFlags::SHORT_USAGE)));
        anything = true;
    }

    if flags.contains(HelpFlags::PRE_DOC) {
        let docs = printer.docs(HelpKey::PreDoc);
        anything |= !docs.is_empty();
        lines.extend(docs);
    }

    if flags.contains(HelpFlags::SEE) && !parse_flags.contains(ParseFlags::NO_HELP) {
        let dashes = if printer.long_only { "-" } else { "--" };
        lines.push(format!(
            "Try `{name} {dashes}{HELP_LONG}' or `{name} {dashes}{USAGE_LONG}' for more information."
        ));
        anything = true;
    }

    if flags.contains(HelpFlags::LONG) {
        let options = printer.options();

        if !options.is_empty() {
            if anything {
                lines.push(String::default());
            }

            lines.extend(options);
            anything = true;
        }
    }

    if flags.contains(HelpFlags::POST_DOC) {
        let mut docs = printer.docs(HelpKey::PostDoc);
        docs.extend(printer.docs(HelpKey::Extra));

        if !docs.is_empty() {
            if anything {
                lines.push(String::default());
            }

            lines.extend(docs);
            anything = true;
        }
    }

    if flags.contains(HelpFlags::BUG_ADDR) {
        if let Some(address) = context.bug_address {
            if anything {
                lines.push(String::default());
            }

            lines.push(format!("Report bugs to {address}."));
        }
    }

    lines.join("\n")
}

struct Printer<'p, 'o> {
    context: &'p ParseContext<'p>,
    listing: &'p Listing<'o>,
    right_margin: usize,
    long_only: bool,
}

impl<'p, 'o> Printer<'p, 'o> {
    fn long_prefix(&self) -> &'static str {
        if self.long_only {
            "-"
        } else {
            "--"
        }
    }

    fn usage(&self, name: &str, short: bool) -> Vec<String> {
        let mut options: Vec<String> = Vec::default();
        let entries = &self.listing.entries;

        if short {
            if entries.iter().any(|entry| !entry.is_header()) {
                options.push("[OPTION...]".to_string());
            }
        } else {
            let flags: String = entries
                .iter()
                .filter(|entry| entry.in_usage() && !entry.canonical().takes_arg())
                .flat_map(|entry| entry.shorts())
                .collect();

            if !flags.is_empty() {
                options.push(format!("[-{flags}]"));
            }

            for entry in entries.iter().filter(|entry| entry.in_usage()) {
                let canonical = entry.canonical();

                if canonical.takes_arg() {
                    for short in entry.shorts() {
                        if canonical.arg_required() {
                            options.push(format!("[-{short} {}]", canonical.arg_name));
                        } else {
                            options.push(format!("[-{short}[{}]]", canonical.arg_name));
                        }
                    }
                }
            }

            for entry in entries.iter().filter(|entry| entry.in_usage()) {
                let canonical = entry.canonical();

                for long in entry.longs() {
                    options.push(format!(
                        "[{}{long}{}]",
                        self.long_prefix(),
                        long_arg(canonical)
                    ));
                }
            }
        }

        let mut out = Vec::default();

        for (i, alternative) in self.args_alternatives().iter().enumerate() {
            let prefix = if i == 0 { "Usage:" } else { "  or: " };
            let mut tokens = vec![name.to_string()];
            tokens.extend(options.iter().cloned());
            tokens.extend(alternative.split(' ').filter(|word| !word.is_empty()).map(str::to_string));
            out.extend(fill(prefix, &tokens, USAGE_INDENT, self.right_margin));
        }

        out
    }

    // Every combination of the parsers' argument documentation alternatives.
    fn args_alternatives(&self) -> Vec<String> {
        let flattened = self.context.flattened;
        let mut combinations = vec![String::default()];

        for descriptor in flattened.pre_order() {
            let text = self.context.filtered(
                flattened.owner(descriptor),
                HelpKey::ArgsDoc,
                &flattened.descriptor(descriptor).usage,
            );

            if text.is_empty() {
                continue;
            }

            let alternatives: Vec<&str> = text.split(ARGS_DOC_SEPARATOR).collect();
            combinations = combinations
                .iter()
                .flat_map(|prefix| {
                    alternatives.iter().map(move |alternative| {
                        if prefix.is_empty() {
                            alternative.to_string()
                        } else {
                            format!("{prefix} {alternative}")
                        }
                    })
                })
                .collect();
        }

        combinations
    }

    fn docs(&self, key: HelpKey) -> Vec<String> {
        let flattened = self.context.flattened;
        let mut out = Vec::default();

        for descriptor in flattened.pre_order() {
            let current = flattened.descriptor(descriptor);
            let original = match key {
                HelpKey::PreDoc => current.pre_doc.as_str(),
                HelpKey::PostDoc => current.post_doc.as_str(),
                _ => "",
            };
            let text = self
                .context
                .filtered(flattened.owner(descriptor), key, original);

            if !text.is_empty() {
                out.extend(wrap(&text, self.right_margin, self.right_margin));
            }
        }

        out
    }

    fn options(&self) -> Vec<String> {
        let renderer = ColumnRenderer::new(DOC_COLUMN, self.right_margin);
        let mut out: Vec<String> = Vec::default();
        let mut previous: Option<(Option<usize>, i32)> = None;
        let mut suppressed_dup_arg = false;

        for entry in &self.listing.entries {
            if entry.is_hidden() {
                continue;
            }

            let position = (entry.cluster, entry.group);

            if previous.is_some() && previous != Some(position) {
                separate(&mut out);
            }

            if let Some(cluster) = entry.cluster {
                if previous.map(|(cluster, _)| cluster) != Some(entry.cluster) {
                    self.cluster_header(&mut out, &self.listing.clusters[cluster]);
                }
            }

            previous = Some(position);

            if entry.is_header() {
                let text = self.context.filtered(
                    entry.owner,
                    HelpKey::Header,
                    &entry.canonical().doc,
                );
                self.header(&mut out, &text);
                continue;
            }

            let (names, suppressed) = self.names(entry);
            suppressed_dup_arg |= suppressed;
            out.extend(renderer.render(&names, &entry.canonical().doc));
        }

        if suppressed_dup_arg {
            let root = self.context.flattened.owner(self.context.flattened.root());
            let note = self
                .context
                .filtered(root, HelpKey::DupArgsNote, DUP_ARGS_NOTE);
            out.push(String::default());
            out.extend(wrap(&note, self.right_margin, self.right_margin));
        }

        out
    }

    fn cluster_header(&self, out: &mut Vec<String>, cluster: &Cluster) {
        if let ChildHeader::Text(text) = &cluster.header {
            let text = self.context.filtered(cluster.owner, HelpKey::Header, text);
            self.header(out, &text);
        }
    }

    fn header(&self, out: &mut Vec<String>, text: &str) {
        if text.is_empty() {
            return;
        }

        separate(out);
        let width = self.right_margin - HEADER_COLUMN;

        for line in wrap(text, width, width) {
            out.push(format!("{:HEADER_COLUMN$}{line}", ""));
        }
    }

    // The names column, and whether a short option's argument was left to its long form.
    fn names(&self, entry: &Entry<'_>) -> (String, bool) {
        let canonical = entry.canonical();

        if canonical.is_doc() {
            let names: Vec<String> = entry
                .visible()
                .map(|option| option.long_name.clone())
                .filter(|name| !name.is_empty())
                .collect();
            return (
                format!("{:OPTION_COLUMN$}{}", "", names.join(", ")),
                false,
            );
        }

        let shorts = entry.shorts();
        let longs = entry.longs();
        let mut names: Vec<String> = Vec::default();
        let mut suppressed = false;

        for short in &shorts {
            if !canonical.takes_arg() {
                names.push(format!("-{short}"));
            } else if !longs.is_empty() {
                names.push(format!("-{short}"));
                suppressed = true;
            } else if canonical.arg_required() {
                names.push(format!("-{short} {}", canonical.arg_name));
            } else {
                names.push(format!("-{short}[{}]", canonical.arg_name));
            }
        }

        for long in &longs {
            names.push(format!("{}{long}{}", self.long_prefix(), long_arg(canonical)));
        }

        let column = if shorts.is_empty() {
            LONG_OPTION_COLUMN
        } else {
            OPTION_COLUMN
        };
        (format!("{:column$}{}", "", names.join(", ")), suppressed)
    }
}

fn long_arg(option: &ArgOption) -> String {
    if !option.takes_arg() {
        String::default()
    } else if option.arg_required() {
        format!("={}", option.arg_name)
    } else {
        format!("[={}]", option.arg_name)
    }
}

fn separate(out: &mut Vec<String>) {
    if out.last().map(|line| !line.is_empty()).unwrap_or(false) {
        out.push(String::default());
    }
}

// Lay tokens out after `prefix`, continuing on indented lines at the right margin.
fn fill(prefix: &str, tokens: &[String], indent: usize, right_margin: usize) -> Vec<String> {
    let mut out = Vec::default();
    let mut current = prefix.to_string();

    for token in tokens {
        if !current.trim().is_empty() && current.len() + 1 + token.len() > right_margin {
            out.push(current);
            current = " ".repeat(indent - 1);
        }

        current.push(' ');
        current.push_str(token);
    }

    out.push(current);
    out
}
