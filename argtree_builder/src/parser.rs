mod flatten;
mod interface;
mod printer;
pub(crate) mod report;
mod router;

pub(crate) use flatten::*;
#[cfg(any(test, feature = "unit_test"))]
pub use interface::InMemoryInterface;
pub use interface::{ConsoleInterface, UserInterface};
pub(crate) use printer::{render_help, terminal_width};
pub(crate) use router::Router;

use crate::api::NodeId;
use crate::constant::{DOC_COLUMN, RIGHT_MARGIN};
use crate::model::HelpKey;

/// Rewrites help text per parser; `None` (or an empty text) keeps the original.
pub(crate) trait TextFilter {
    fn filter(&self, node: NodeId, key: HelpKey, text: &str) -> Option<String>;
}

// Narrowest right margin worth wrapping documentation into.
const MINIMUM_DOC_WIDTH: usize = 20;

/// Everything a parse needs besides the tree and the handlers.
pub(crate) struct ParseContext<'h> {
    pub(crate) flattened: &'h Flattened,
    pub(crate) filters: &'h dyn TextFilter,
    pub(crate) user_interface: &'h dyn UserInterface,
    pub(crate) program_version: Option<&'h str>,
    pub(crate) version_hook: Option<&'h dyn Fn(&str) -> String>,
    pub(crate) bug_address: Option<&'h str>,
    pub(crate) root_has_parsed_options: bool,
    pub(crate) root_has_positional_args: bool,
    pub(crate) terminal_width: Option<usize>,
}

impl<'h> ParseContext<'h> {
    pub(crate) fn version_known(&self) -> bool {
        self.program_version.is_some() || self.version_hook.is_some()
    }

    /// The text after the owning parser's help filter.
    pub(crate) fn filtered(&self, node: NodeId, key: HelpKey, text: &str) -> String {
        match self.filters.filter(node, key, text) {
            Some(replacement) if !replacement.is_empty() => replacement,
            _ => text.to_string(),
        }
    }

    pub(crate) fn right_margin(&self) -> usize {
        match self.terminal_width {
            Some(width) if width > DOC_COLUMN + MINIMUM_DOC_WIDTH => width - 1,
            _ => RIGHT_MARGIN,
        }
    }
}

#[cfg(test)]
pub(crate) mod test {
    use super::*;
    use crate::api::Tree;
    use crate::model::ParseFlags;

    #[derive(Debug, Default)]
    pub(crate) struct NoFilters;

    impl TextFilter for NoFilters {
        fn filter(&self, _node: NodeId, _key: HelpKey, _text: &str) -> Option<String> {
            None
        }
    }

    /// A context over `flattened` writing into `interface`, with no version, bug address or filters.
    pub(crate) fn context<'h>(
        flattened: &'h Flattened,
        interface: &'h InMemoryInterface,
    ) -> ParseContext<'h> {
        ParseContext {
            flattened,
            filters: &NoFilters,
            user_interface: interface,
            program_version: None,
            version_hook: None,
            bug_address: None,
            root_has_parsed_options: true,
            root_has_positional_args: true,
            terminal_width: None,
        }
    }

    pub(crate) fn flat(tree: &Tree) -> Flattened {
        flatten(tree, ParseFlags::empty()).unwrap()
    }

    #[test]
    fn right_margin() {
        let mut tree = Tree::default();
        tree.insert(None);
        let flattened = flat(&tree);
        let interface = InMemoryInterface::default();
        let mut context = context(&flattened, &interface);

        assert_eq!(context.right_margin(), RIGHT_MARGIN);

        context.terminal_width = Some(120);
        assert_eq!(context.right_margin(), 119);

        context.terminal_width = Some(30);
        assert_eq!(context.right_margin(), RIGHT_MARGIN);
    }

    #[test]
    fn filtered_falls_back() {
        struct Upper;

        impl TextFilter for Upper {
            fn filter(&self, _node: NodeId, key: HelpKey, text: &str) -> Option<String> {
                match key {
                    HelpKey::PreDoc => Some(text.to_uppercase()),
                    _ => None,
                }
            }
        }

        let mut tree = Tree::default();
        let root = tree.insert(None);
        let flattened = flat(&tree);
        let interface = InMemoryInterface::default();
        let mut context = context(&flattened, &interface);
        context.filters = &Upper;

        assert_eq!(context.filtered(root, HelpKey::PreDoc, "abc"), "ABC");
        assert_eq!(context.filtered(root, HelpKey::PostDoc, "abc"), "abc");
    }
}
