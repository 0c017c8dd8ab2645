use crate::api::{ArgOption, Classification, ConfigError, NodeId, OptionTable, ParsedOption};
use crate::constant::DOC_SEPARATOR;
use crate::model::{Key, ParseFlags};

/// The header shown before a child parser's options in help output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ChildHeader {
    /// No header; the child's options merge into its parent's listing unless it has a group.
    #[default]
    Absent,
    /// An empty header: the child's options are kept together but nothing is printed.
    Empty,
    /// A printed header.
    Text(String),
}

/// The configuration and results of one parser in the tree.
///
/// Nodes are created through [`ParserRegistry::create_parser`](crate::ParserRegistry::create_parser)
/// and accessed with [`ParserRegistry::node`](crate::ParserRegistry::node) / [`ParserRegistry::node_mut`](crate::ParserRegistry::node_mut).
#[derive(Debug, Default)]
pub struct Node {
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    options: OptionTable,
    usage: String,
    pre_doc: String,
    post_doc: String,
    child_header: ChildHeader,
    group: i32,
    child_flags: ParseFlags,
    pub(crate) parsed_options: Vec<ParsedOption>,
    pub(crate) positional_args: Vec<String>,
}

impl Node {
    pub(crate) fn new(parent: Option<NodeId>) -> Self {
        Self {
            parent,
            ..Self::default()
        }
    }

    /// The parent parser (`None` for the root).
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// The child parsers, in the order they were attached.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Add an option; fails when its flags use illegal bits.
    pub fn add_option(&mut self, option: ArgOption) -> Result<(), ConfigError> {
        self.options.add(option)
    }

    /// Add options in order, stopping at the first failure.
    pub fn add_options(
        &mut self,
        options: impl IntoIterator<Item = ArgOption>,
    ) -> Result<(), ConfigError> {
        self.options.add_all(options)
    }

    /// The first option with this key.
    pub fn find_option(&self, key: Key) -> Option<&ArgOption> {
        self.options.find(key)
    }

    /// Check `key` and its argument against this parser's options.
    pub fn classify(&self, key: Key, arg: Option<&str>) -> Classification<'_> {
        self.options.classify(key, arg)
    }

    /// This parser's options.
    pub fn options(&self) -> &OptionTable {
        &self.options
    }

    /// Set the arguments documentation of the usage line (alternatives separated by `'\n'`).
    pub fn set_usage(&mut self, usage: impl Into<String>) {
        self.usage = usage.into();
    }

    /// The arguments documentation of the usage line.
    pub fn usage(&self) -> &str {
        &self.usage
    }

    /// Set the documentation.
    /// Text before the first `'\v'` precedes the option listing, the rest follows it.
    ///
    /// ### Example
    /// ```
    /// # use argtree_builder::{GenericHandler, ParserRegistry};
    /// let mut registry = ParserRegistry::new(["program"]);
    /// let root = registry.create_parser(None, GenericHandler).unwrap();
    /// let node = registry.node_mut(root).unwrap();
    /// node.set_doc("Before the options.\u{b}After the options.");
    /// assert_eq!(node.pre_doc(), "Before the options.");
    /// assert_eq!(node.post_doc(), "After the options.");
    /// ```
    pub fn set_doc(&mut self, doc: &str) {
        match doc.split_once(DOC_SEPARATOR) {
            Some((pre, post)) => {
                self.pre_doc = pre.to_string();
                self.post_doc = post.to_string();
            }
            None => {
                self.pre_doc = doc.to_string();
                self.post_doc.clear();
            }
        }
    }

    /// Set the documentation preceding the option listing (anything from a `'\v'` on is ignored).
    pub fn set_pre_doc(&mut self, doc: &str) {
        self.pre_doc = match doc.split_once(DOC_SEPARATOR) {
            Some((pre, _)) => pre.to_string(),
            None => doc.to_string(),
        };
    }

    /// Set the documentation following the option listing (anything up to a `'\v'` is ignored).
    pub fn set_post_doc(&mut self, doc: &str) {
        self.post_doc = match doc.split_once(DOC_SEPARATOR) {
            Some((_, post)) => post.to_string(),
            None => doc.to_string(),
        };
    }

    /// The combined documentation, re-joined with `'\v'` when there is text after the listing.
    pub fn doc(&self) -> String {
        if self.post_doc.is_empty() {
            self.pre_doc.clone()
        } else {
            format!("{}{DOC_SEPARATOR}{}", self.pre_doc, self.post_doc)
        }
    }

    /// The documentation preceding the option listing.
    pub fn pre_doc(&self) -> &str {
        &self.pre_doc
    }

    /// The documentation following the option listing.
    pub fn post_doc(&self) -> &str {
        &self.post_doc
    }

    /// Set the header shown above this parser's options when it is a child.
    ///
    /// An empty `header` removes the header, unless `empty_means_empty` asks for an empty (unprinted) header instead.
    pub fn set_child_header(&mut self, header: &str, empty_means_empty: bool) {
        self.child_header = if !header.is_empty() {
            ChildHeader::Text(header.to_string())
        } else if empty_means_empty {
            ChildHeader::Empty
        } else {
            ChildHeader::Absent
        };
    }

    /// The header shown above this parser's options.
    pub fn child_header(&self) -> &ChildHeader {
        &self.child_header
    }

    /// Set the help group this parser's options appear in; ignored on the root.
    pub fn set_group(&mut self, group: i32) {
        if !self.is_root() {
            self.group = group;
        }
    }

    /// The help group.
    pub fn group(&self) -> i32 {
        self.group
    }

    /// Set the parse flags for this parser's subtree; zero inherits them.
    ///
    /// Fails on illegal bits.
    /// On the root this validates but stores nothing (the root uses the registry's parse flags).
    pub fn set_child_flags(&mut self, flags: ParseFlags) -> Result<(), ConfigError> {
        if !flags.is_legal() {
            return Err(ConfigError::IllegalFlags {
                flags: flags.bits(),
                legal: ParseFlags::ALL.bits(),
            });
        }

        if !self.is_root() {
            self.child_flags = flags;
        }

        Ok(())
    }

    /// The explicitly set child flags (zero when inherited).
    pub fn child_flags(&self) -> ParseFlags {
        self.child_flags
    }

    /// The options recorded into this parser's store.
    pub fn parsed_options(&self) -> &[ParsedOption] {
        &self.parsed_options
    }

    /// The positional arguments recorded into this parser's store.
    pub fn positional_args(&self) -> &[String] {
        &self.positional_args
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Tree;
    use rstest::rstest;

    #[rstest]
    #[case("", "", "")]
    #[case("pre", "pre", "")]
    #[case("pre\u{b}post", "pre", "post")]
    #[case("\u{b}post", "", "post")]
    #[case("pre\u{b}", "pre", "")]
    #[case("pre\u{b}post\u{b}more", "pre", "post\u{b}more")]
    fn set_doc_split(#[case] doc: &str, #[case] pre: &str, #[case] post: &str) {
        // Setup
        let mut node = Node::default();

        // Execute
        node.set_doc(doc);

        // Verify
        assert_eq!(node.pre_doc(), pre);
        assert_eq!(node.post_doc(), post);
    }

    #[test]
    fn set_doc_clears() {
        let mut node = Node::default();
        node.set_doc("pre\u{b}post");
        node.set_doc("");

        assert_eq!(node.doc(), "");
    }

    #[rstest]
    #[case("A", "B", "A\u{b}B")]
    #[case("A", "", "A")]
    #[case("", "B", "\u{b}B")]
    #[case("A\u{b}ignored", "ignored\u{b}B", "A\u{b}B")]
    fn pre_post_round_trip(#[case] pre: &str, #[case] post: &str, #[case] expected: &str) {
        // Setup
        let mut node = Node::default();

        // Execute
        node.set_pre_doc(pre);
        node.set_post_doc(post);

        // Verify
        assert_eq!(node.doc(), expected);

        let mut copy = Node::default();
        copy.set_doc(&node.doc());
        assert_eq!(copy.pre_doc(), node.pre_doc());
        assert_eq!(copy.post_doc(), node.post_doc());
    }

    #[rstest]
    #[case("Header:", false, ChildHeader::Text("Header:".to_string()))]
    #[case("Header:", true, ChildHeader::Text("Header:".to_string()))]
    #[case("", true, ChildHeader::Empty)]
    #[case("", false, ChildHeader::Absent)]
    fn child_header(#[case] header: &str, #[case] empty: bool, #[case] expected: ChildHeader) {
        let mut node = Node::default();
        node.set_child_header(header, empty);

        assert_eq!(node.child_header(), &expected);
    }

    #[test]
    fn root_ignores_group_and_child_flags() {
        // Setup
        let mut tree = Tree::default();
        let root = tree.insert(None);
        let child = tree.insert(Some(root));

        // Execute
        let root_node = tree.get_mut(root).unwrap();
        root_node.set_group(3);
        root_node.set_child_flags(ParseFlags::NO_EXIT).unwrap();
        let child_node = tree.get_mut(child).unwrap();
        child_node.set_group(3);
        child_node.set_child_flags(ParseFlags::NO_EXIT).unwrap();

        // Verify
        assert_eq!(tree.get(root).unwrap().group(), 0);
        assert_eq!(tree.get(root).unwrap().child_flags(), ParseFlags::empty());
        assert_eq!(tree.get(child).unwrap().group(), 3);
        assert_eq!(tree.get(child).unwrap().child_flags(), ParseFlags::NO_EXIT);
    }

    #[test]
    fn child_flags_illegal() {
        let mut node = Node::new(None);

        assert_matches!(
            node.set_child_flags(ParseFlags::from_bits(0x200)),
            Err(ConfigError::IllegalFlags { flags: 0x200, .. })
        );
    }

    #[test]
    fn options() {
        let mut node = Node::default();
        node.add_options(vec![
            ArgOption::new('d', "dot").arg("NUM"),
            ArgOption::short('x'),
        ])
        .unwrap();

        assert_eq!(node.options().len(), 2);
        assert_eq!(node.find_option(Key::from('x')).unwrap().key, Key::from('x'));
        assert_eq!(node.classify(Key::from('d'), None), Classification::NeedsArg);
        assert!(node.parsed_options().is_empty());
        assert!(node.positional_args().is_empty());
    }
}
