use argtree::prelude::*;
use argtree::{
    ArgOption, HandlerResult, Hook, Key, OptionFlags, ParseState, ParserRegistry, Reply,
};

const ELLIPSIS: Key = Key::new(777);
const DASH: Key = Key::new(888);

struct Dots;

impl KeyHandler for Dots {
    fn handle_key(
        &mut self,
        key: Key,
        arg: Option<&str>,
        state: &mut ParseState<'_>,
    ) -> HandlerResult {
        if state.handle_known_key(key, arg) == Reply::Unknown {
            return Ok(Reply::Unknown);
        }

        if key == Key::from('d') {
            let dots = arg.and_then(|value| value.parse().ok()).unwrap_or(1);
            print!("{}", ".".repeat(dots));
            Ok(Reply::Handled)
        } else if key == ELLIPSIS {
            print!("...");
            Ok(Reply::Handled)
        } else if key == DASH {
            print!("-");
            Ok(Reply::Handled)
        } else {
            Ok(Reply::Unknown)
        }
    }
}

fn main() {
    let mut registry = ParserRegistry::from_env();
    registry.set_program_version("dots 1.0");
    registry.set_bug_address("<dots@example.org>");

    let root = registry
        .create_parser_with_options(
            None,
            vec![
                ArgOption::new('d', "dot")
                    .arg("NUM")
                    .flags(OptionFlags::ARG_OPTIONAL)
                    .help("Show some dots on the screen"),
                ArgOption::new(ELLIPSIS, "ellipsis")
                    .flags(OptionFlags::HIDDEN)
                    .help("Show an ellipsis on the screen"),
                ArgOption::new(DASH, "dash").help("Show a dash on the screen"),
            ],
            Dots,
        )
        .expect("the dots options are legal");
    registry
        .add_hook(
            root,
            Hook::positional(|_, state| {
                state.failure(1, 0, "too many arguments")?;
                Ok(Reply::Handled)
            }),
        )
        .expect("the root parser exists");
    registry
        .add_hook(
            root,
            Hook::end(|_| {
                println!();
                Ok(Reply::Handled)
            }),
        )
        .expect("the root parser exists");

    registry.parse();
}
