use argtree::prelude::*;
use argtree::*;
use assert_matches::assert_matches;
use rstest::rstest;
use std::cell::RefCell;

fn registry<'a>(argv: &[&str]) -> (ParserRegistry<'a>, InMemoryInterface) {
    let interface = InMemoryInterface::default();
    let registry = ParserRegistry::with_interface(argv.to_vec(), Box::new(interface.clone()));
    (registry, interface)
}

fn dot() -> ArgOption {
    ArgOption::new('d', "dot")
        .arg("NUM")
        .help("Show some dots on the screen")
}

#[test]
fn mandatory_argument() {
    // Setup
    let seen = RefCell::new(Vec::default());
    let (mut registry, _) = registry(&["prog", "-d", "3"]);
    registry
        .create_parser_with_options(
            None,
            vec![dot()],
            handler(|key, arg: Option<&str>, state: &mut ParseState<'_>| {
                seen.borrow_mut().push((key, arg.map(str::to_string)));
                Ok(state.handle_known_key(key, arg))
            }),
        )
        .unwrap();

    // Execute
    let result = registry.try_parse();

    // Verify
    assert_eq!(result, Ok(true));
    drop(registry);
    assert_eq!(
        seen.into_inner(),
        vec![(Key::from('d'), Some("3".to_string()))]
    );
}

#[test]
fn optional_argument_absent() {
    // Setup
    let outcome = RefCell::new(None);
    let (mut registry, _) = registry(&["prog", "-d"]);
    registry
        .create_parser_with_options(
            None,
            vec![dot().flags(OptionFlags::ARG_OPTIONAL)],
            handler(|key, arg: Option<&str>, state: &mut ParseState<'_>| {
                let ok = matches!(state.classify(key, arg), Classification::Ok(_));
                outcome.replace(Some((ok, arg.map(str::to_string))));
                Ok(Reply::Handled)
            }),
        )
        .unwrap();

    // Execute
    let result = registry.try_parse();

    // Verify
    assert_eq!(result, Ok(true));
    drop(registry);
    assert_eq!(outcome.into_inner(), Some((true, None)));
}

#[rstest]
#[case(vec!["prog", "-d"], "prog: option requires an argument -- 'd'")]
#[case(vec!["prog", "--dot"], "prog: option '--dot' requires an argument")]
fn mandatory_argument_missing(#[case] argv: Vec<&str>, #[case] message: &str) {
    // Setup
    let (mut registry, interface) = registry(&argv);
    registry
        .create_parser_with_options(None, vec![dot()], GenericHandler)
        .unwrap();

    // Execute
    let result = registry.try_parse();

    // Verify
    assert_eq!(result, Err(Termination::new(EX_USAGE)));
    assert_eq!(
        interface.errors(),
        vec![
            message,
            "Try `prog --help' or `prog --usage' for more information."
        ]
    );
}

#[test]
fn handler_reports_needs_arg() {
    // Setup
    let (mut registry, interface) = registry(&["prog", "-d"]);
    registry
        .set_parse_flags(ParseFlags::NO_EXIT)
        .unwrap();
    let root = registry
        .create_parser_with_options(
            None,
            vec![dot().flags(OptionFlags::ARG_OPTIONAL)],
            GenericHandler,
        )
        .unwrap();
    // The handler holds the option to a stricter requirement than the table does.
    registry
        .set_handler(
            root,
            handler(|key, arg: Option<&str>, state: &mut ParseState<'_>| {
                if arg.is_none() {
                    state.failure(3, 0, "--dot needs a count")?;
                }

                Ok(state.handle_known_key(key, arg))
            }),
        )
        .unwrap();

    // Execute
    let result = registry.try_parse();

    // Verify
    assert_eq!(result, Ok(true));
    assert_eq!(registry.error_code(), 3);
    assert_eq!(interface.errors(), vec!["prog: --dot needs a count"]);
}

#[test]
fn root_and_child_route_keys() {
    // Setup
    let (mut registry, _) = registry(&["prog", "one", "-a", "--bravo=x", "two"]);
    let root = registry
        .create_parser_with_options(None, vec![ArgOption::new('a', "alpha")], GenericHandler)
        .unwrap();
    let child = registry
        .create_parser_with_options(
            Some(root),
            vec![ArgOption::new('b', "bravo").arg("B")],
            GenericHandler,
        )
        .unwrap();

    // Execute
    let result = registry.try_parse();

    // Verify
    assert_eq!(result, Ok(true));
    let root_node = registry.node(root).unwrap();
    assert_eq!(
        root_node.parsed_options(),
        &[
            ParsedOption::new(Key::from('a'), "alpha", None),
            ParsedOption::new(Key::from('b'), "bravo", Some("x")),
        ]
    );
    assert_eq!(root_node.positional_args(), &["one", "two"]);
    assert!(registry.node(child).unwrap().parsed_options().is_empty());
    assert_eq!(registry.end_index(), Some(5));
}

#[test]
fn decentralised_results() {
    // Setup
    let (mut registry, _) = registry(&["prog", "-b", "x"]);
    registry.set_root_has_parsed_options(false);
    registry.set_root_has_positional_args(false);
    let root = registry.create_parser(None, GenericHandler).unwrap();
    let child = registry
        .create_parser_with_options(Some(root), vec![ArgOption::short('b')], GenericHandler)
        .unwrap();

    // Execute
    let result = registry.try_parse();

    // Verify
    assert_eq!(result, Ok(true));
    assert!(registry.node(root).unwrap().parsed_options().is_empty());
    assert_eq!(registry.node(child).unwrap().parsed_options().len(), 1);
    // The root is offered the argument first.
    assert_eq!(registry.node(root).unwrap().positional_args(), &["x"]);
}

#[test]
fn clear_and_rebuild() {
    // Setup
    let (mut registry, _) = registry(&["prog", "-a", "x"]);
    let old_root = registry
        .create_parser_with_options(None, vec![ArgOption::short('a')], GenericHandler)
        .unwrap();
    assert_eq!(registry.try_parse(), Ok(true));

    // Execute
    registry.clear_all_parsers();
    let new_root = registry.create_parser(None, GenericHandler).unwrap();

    // Verify
    assert_eq!(registry.root(), Some(new_root));
    assert_ne!(old_root, new_root);
    assert!(registry.node(old_root).is_none());
    let node = registry.node(new_root).unwrap();
    assert!(node.parsed_options().is_empty());
    assert!(node.positional_args().is_empty());
    assert!(node.options().is_empty());
}

#[test]
fn reparented_child_changes_help() {
    // Setup
    let (mut registry, interface) = registry(&["prog", "--help"]);
    registry.set_parse_flags(ParseFlags::NO_EXIT).unwrap();
    let root = registry.create_parser(None, GenericHandler).unwrap();
    let a = registry.create_parser(Some(root), GenericHandler).unwrap();
    let b = registry
        .create_parser_with_options(
            Some(root),
            vec![ArgOption::new('b', "bravo").help("From b")],
            GenericHandler,
        )
        .unwrap();
    let node = registry.node_mut(a).unwrap();
    node.set_child_header("Options from a:", false);
    node.add_option(ArgOption::new('a', "alpha").help("From a"))
        .unwrap();

    // Execute
    registry.add_child(a, b).unwrap();
    let result = registry.try_parse();

    // Verify
    assert_eq!(result, Ok(true));
    assert!(registry.is_descendant(root, b));
    assert!(!registry.is_direct_child(root, b));
    let output = interface.output();
    let header = output.find("Options from a:").unwrap();
    assert!(output.find("--alpha").unwrap() > header);
    assert!(output.find("--bravo").unwrap() > header);
}

#[test]
fn cycles_rejected() {
    let (mut registry, _) = registry(&["prog"]);
    let root = registry.create_parser(None, GenericHandler).unwrap();
    let a = registry.create_parser(Some(root), GenericHandler).unwrap();
    let b = registry.create_parser(Some(a), GenericHandler).unwrap();

    assert_eq!(
        registry.add_child(b, a),
        Err(ConfigError::Cycle {
            parent: b,
            child: a
        })
    );
    assert_eq!(
        registry.add_child(a, root),
        Err(ConfigError::RootReparent(root))
    );
    assert_eq!(registry.add_child(root, a), Ok(()));
    assert!(registry.is_direct_child(root, a));
}

#[test]
fn hooks_see_lifecycle() {
    // Setup
    let events = RefCell::new(Vec::default());
    let (mut registry, _) = registry(&["prog"]);
    let root = registry.create_parser(None, GenericHandler).unwrap();
    let record = |name: &'static str| {
        let events = &events;
        move |_: &mut ParseState<'_>| -> HandlerResult {
            events.borrow_mut().push(name);
            Ok(Reply::Handled)
        }
    };
    registry.add_hook(root, Hook::begin(record("begin"))).unwrap();
    registry
        .add_hook(root, Hook::no_positional(record("no positional")))
        .unwrap();
    registry.add_hook(root, Hook::end(record("end"))).unwrap();
    registry.add_hook(root, Hook::success(record("success"))).unwrap();
    registry.add_hook(root, Hook::error(record("error"))).unwrap();
    registry.add_hook(root, Hook::finish(record("finish"))).unwrap();

    // Execute
    let result = registry.try_parse();

    // Verify
    assert_eq!(result, Ok(true));
    drop(registry);
    assert_eq!(
        events.into_inner(),
        vec!["begin", "no positional", "end", "success", "finish"]
    );
}

#[test]
fn failing_hook_stops_parse() {
    let (mut registry, _) = registry(&["prog", "x"]);
    let root = registry.create_parser(None, GenericHandler).unwrap();
    registry
        .add_hook(root, Hook::positional(|_, _| Ok(Reply::Failed(9))))
        .unwrap();

    assert_eq!(registry.try_parse(), Ok(false));
    assert_eq!(registry.status(), 9);
    assert_eq!(registry.end_index(), None);
}

#[test]
fn help_output() {
    // Setup
    let (mut registry, interface) = registry(&["/usr/bin/dots", "--help"]);
    registry.set_program_version("dots 1.0");
    registry.set_bug_address("<dots@example.org>");
    let root = registry
        .create_parser_with_options(
            None,
            vec![dot().flags(OptionFlags::ARG_OPTIONAL)],
            GenericHandler,
        )
        .unwrap();
    registry
        .node_mut(root)
        .unwrap()
        .set_doc("Print dots.\u{b}Dots are printed in order.");

    // Execute
    let result = registry.try_parse();

    // Verify
    assert_eq!(result, Err(Termination::new(0)));
    assert_eq!(registry.root(), None);
    let output = interface.output();
    assert!(output.starts_with("Usage: dots [OPTION...]\nPrint dots.\n"));
    assert!(output.contains("  -d, --dot[=NUM]            Show some dots on the screen"));
    assert!(output.contains("  -?, --help                 Give this help list"));
    assert!(output.contains("  -V, --version              Print program version"));
    assert!(output.contains("Dots are printed in order."));
    assert!(output.ends_with("Report bugs to <dots@example.org>."));
}

#[test]
fn usage_output() {
    let (mut registry, interface) = registry(&["prog", "--usage"]);
    let root = registry
        .create_parser_with_options(None, vec![ArgOption::short('a')], GenericHandler)
        .unwrap();
    registry.node_mut(root).unwrap().set_usage("FILE");

    assert_eq!(registry.try_parse(), Err(Termination::new(0)));
    assert_eq!(
        interface.output(),
        "Usage: prog [-a?] [--help] [--usage] FILE"
    );
}

#[test]
fn parse_flags_validated() {
    let (mut registry, _) = registry(&["prog"]);

    assert_matches!(
        registry.set_parse_flags(ParseFlags::from_bits(0x100)),
        Err(ConfigError::IllegalFlags { flags: 0x100, .. })
    );
    assert!(flags_ok(ParseFlags::SILENT.bits(), ParseFlags::ALL.bits()));
}

#[test]
fn library_version() {
    assert_eq!(str_library_build_version(), env!("CARGO_PKG_VERSION"));
    assert!(library_build_version() > 0);
}
