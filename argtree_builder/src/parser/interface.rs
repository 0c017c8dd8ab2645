#[cfg(any(test, feature = "unit_test"))]
use std::cell::RefCell;
#[cfg(any(test, feature = "unit_test"))]
use std::rc::Rc;

/// Where help, usage and error text is written.
///
/// The default is [`ConsoleInterface`].
/// Supply another implementation through [`ParserRegistry::with_interface`](crate::ParserRegistry::with_interface).
pub trait UserInterface {
    /// Write a message to standard output.
    fn print(&self, message: String);

    /// Write a message to standard error.
    fn print_error(&self, message: String);
}

/// Writes to the process' standard output and standard error.
#[derive(Debug, Default)]
pub struct ConsoleInterface {}

impl UserInterface for ConsoleInterface {
    fn print(&self, message: String) {
        println!("{message}");
    }

    fn print_error(&self, message: String) {
        eprintln!("{message}");
    }
}

/// Collects output in memory, for tests.
///
/// Clones share the same buffers, so keep a clone to inspect what the registry printed.
///
/// ### Example
/// ```
/// # use argtree_builder::{InMemoryInterface, UserInterface};
/// let interface = InMemoryInterface::default();
/// let shared = interface.clone();
/// shared.print("hello".to_string());
/// assert_eq!(interface.output(), "hello");
/// assert_eq!(interface.error_output(), "");
/// ```
#[cfg(any(test, feature = "unit_test"))]
#[derive(Debug, Default, Clone)]
pub struct InMemoryInterface {
    messages: Rc<RefCell<Vec<String>>>,
    errors: Rc<RefCell<Vec<String>>>,
}

#[cfg(any(test, feature = "unit_test"))]
impl InMemoryInterface {
    /// Every standard output message, in order.
    pub fn messages(&self) -> Vec<String> {
        self.messages.borrow().clone()
    }

    /// Every standard error message, in order.
    pub fn errors(&self) -> Vec<String> {
        self.errors.borrow().clone()
    }

    /// Standard output as one text.
    pub fn output(&self) -> String {
        self.messages.borrow().join("\n")
    }

    /// Standard error as one text.
    pub fn error_output(&self) -> String {
        self.errors.borrow().join("\n")
    }
}

#[cfg(any(test, feature = "unit_test"))]
impl UserInterface for InMemoryInterface {
    fn print(&self, message: String) {
        self.messages.borrow_mut().push(message);
    }

    fn print_error(&self, message: String) {
        self.errors.borrow_mut().push(message);
    }
}

/// Renders a left column (ex: option names) followed by wrapped text starting at a fixed column.
#[derive(Debug)]
pub(crate) struct ColumnRenderer {
    column: usize,
    right_margin: usize,
}

// Left text running this far past the column pushes the text onto the next line.
const OVERHANG: usize = 3;

impl ColumnRenderer {
    pub(crate) fn new(column: usize, right_margin: usize) -> Self {
        assert!(column + 2 <= right_margin);
        Self {
            column,
            right_margin,
        }
    }

    pub(crate) fn render(&self, left: &str, text: &str) -> Vec<String> {
        if text.trim().is_empty() {
            return vec![left.to_string()];
        }

        let width = self.right_margin - self.column;
        let mut out = Vec::default();
        let mut current = left.to_string();
        let first_width = if left.len() > self.column + OVERHANG {
            out.push(current);
            current = " ".repeat(self.column);
            width
        } else if left.len() >= self.column {
            current.push_str(&" ".repeat(OVERHANG));
            std::cmp::max(self.right_margin.saturating_sub(current.len()), 2)
        } else {
            current.push_str(&" ".repeat(self.column - left.len()));
            width
        };

        for (i, line) in wrap(text, first_width, width).into_iter().enumerate() {
            if i == 0 {
                current.push_str(&line);
                out.push(current.trim_end().to_string());
                current = String::default();
            } else if line.is_empty() {
                out.push(line);
            } else {
                out.push(format!("{:indent$}{line}", "", indent = self.column));
            }
        }

        out
    }
}

/// Wrap text into lines, keeping explicit newlines.
/// The first line may be given a different width than the rest.
pub(crate) fn wrap(text: &str, first_width: usize, width: usize) -> Vec<String> {
    let mut lines = Vec::default();

    for paragraph in text.split('\n') {
        let target = if lines.is_empty() { first_width } else { width };
        let mut chunks = chunk(paragraph, target, width);

        if chunks.is_empty() {
            lines.push(String::default());
        } else {
            lines.append(&mut chunks);
        }
    }

    while lines.last().map(|line| line.is_empty()).unwrap_or(false) {
        lines.pop();
    }

    lines
}

fn chunk(paragraph: &str, first_width: usize, width: usize) -> Vec<String> {
    let mut lines: Vec<String> = Vec::default();
    let mut current = String::default();

    for word in paragraph.split(' ') {
        if word.is_empty() {
            continue;
        }

        let limit = if lines.is_empty() { first_width } else { width };

        if current.is_empty() {
            hyphenate(limit, width, &mut lines, &mut current, word);
        } else if current.len() + word.len() + 1 <= limit {
            current.push(' ');
            current.push_str(word);
        } else {
            lines.push(current);
            current = String::default();
            hyphenate(width, width, &mut lines, &mut current, word);
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }

    lines
}

// Split a word that does not fit on a line of its own.
fn hyphenate(
    first_width: usize,
    width: usize,
    lines: &mut Vec<String>,
    current: &mut String,
    word: &str,
) {
    let chars: Vec<char> = word.chars().collect();
    let mut left = 0;
    let mut increment = first_width.max(2) - 1;

    while left + increment + 1 < chars.len() {
        let part: String = chars[left..left + increment].iter().collect();
        lines.push(format!("{part}-"));
        left += increment;
        increment = width.max(2) - 1;
    }

    current.extend(chars[left..].iter());
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", 10, vec![])]
    #[case("a b c", 10, vec!["a b c"])]
    #[case("abc def ghi", 7, vec!["abc def", "ghi"])]
    #[case("abc  def", 7, vec!["abc def"])]
    #[case("abcdefghij", 5, vec!["abcd-", "efgh-", "ij"])]
    #[case("one\ntwo", 10, vec!["one", "two"])]
    #[case("one\n\ntwo\n", 10, vec!["one", "", "two"])]
    fn wrap_text(#[case] text: &str, #[case] width: usize, #[case] expected: Vec<&str>) {
        assert_eq!(wrap(text, width, width), expected);
    }

    #[test]
    fn wrap_first_line() {
        assert_eq!(wrap("aa bb cc dd", 2, 5), vec!["aa", "bb cc", "dd"]);
    }

    #[test]
    fn column_renderer_pads() {
        // Setup
        let renderer = ColumnRenderer::new(10, 30);

        // Execute
        let lines = renderer.render("  -a", "Some text that needs wrapping here.");

        // Verify
        assert_eq!(
            lines,
            vec!["  -a      Some text that needs", "          wrapping here."]
        );
    }

    #[test]
    fn column_renderer_overhang() {
        let renderer = ColumnRenderer::new(10, 30);

        assert_eq!(renderer.render("  --abcdefg", "Text"), vec!["  --abcdefg   Text"]);
        assert_eq!(
            renderer.render("  --abcdefghijk", "Text"),
            vec!["  --abcdefghijk", "          Text"]
        );
    }

    #[test]
    fn column_renderer_empty_text() {
        let renderer = ColumnRenderer::new(10, 30);

        assert_eq!(renderer.render("  -a", ""), vec!["  -a"]);
    }

    #[test]
    fn in_memory_shares() {
        let interface = InMemoryInterface::default();
        let other = interface.clone();

        other.print("a".to_string());
        other.print("b".to_string());
        other.print_error("c".to_string());

        assert_eq!(interface.messages(), vec!["a", "b"]);
        assert_eq!(interface.output(), "a\nb");
        assert_eq!(interface.errors(), vec!["c"]);
        assert_eq!(interface.error_output(), "c");
    }
}
