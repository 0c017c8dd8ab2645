use argtree::{handler, ArgOption, HelpKey, Hook, Key, OptionFlags, ParserRegistry, Reply};

const PGRP: Key = Key::new(1);
const SESSION: Key = Key::new(2);

fn report(prefix: &str, key: Key, arg: Option<&str>) {
    match arg {
        Some(arg) => println!("{prefix} {key}: {arg}"),
        None => println!("{prefix} {key}"),
    }
}

fn main() {
    let mut registry = ParserRegistry::from_env();
    registry.set_program_version("listing 1.0");
    registry.set_bug_address("<listing@example.org>");

    let root = registry
        .create_parser_with_options(
            None,
            vec![
                ArgOption::new('p', "pid").arg("PID").help("List the process PID"),
                ArgOption::new(PGRP, "pgrp")
                    .arg("PGRP")
                    .help("List processes in the process group PGRP"),
                ArgOption::new('P', "no-parent").help("Include processes without parents"),
                ArgOption::short('x').flags(OptionFlags::ALIAS),
                ArgOption::new('r', "reverse").help("Reverse the order of any sort"),
                ArgOption::new(Key::NONE, "gratuitously-long-reverse-option")
                    .flags(OptionFlags::ALIAS),
                ArgOption::new(SESSION, "session")
                    .arg("SID")
                    .flags(OptionFlags::ARG_OPTIONAL)
                    .help(
                        "Add the processes from the session SID (which defaults to the sid of the current process)",
                    ),
                ArgOption::header("Here are some more options:", 0),
                ArgOption::new('f', "foonly")
                    .arg("ZOT")
                    .flags(OptionFlags::ARG_OPTIONAL)
                    .help("Glork a foonly"),
                ArgOption::new('z', "zaza").help("Snit a zar"),
            ],
            handler(|key, arg, state| {
                let reply = state.handle_known_key(key, arg);

                if reply == Reply::Handled {
                    report("KEY", key, arg);
                }

                Ok(reply)
            }),
        )
        .expect("the listing options are legal");

    let node = registry.node_mut(root).expect("the root parser exists");
    node.set_usage("STRING");
    node.set_doc(
        "Test program for hierarchical parsing.\u{b}This doc string comes after the options.\nCurrent user: %s",
    );

    let child = registry
        .create_parser_with_options(
            Some(root),
            vec![
                ArgOption::new('s', "subopt1").help("Nested option 1"),
                ArgOption::new('S', "subopt2").help("Nested option 2"),
                ArgOption::header("Some more nested options:", 10),
                ArgOption::new('q', "subopt4").help("Nested option 4").group(1),
            ],
            handler(|key, arg, state| {
                let reply = state.handle_known_key(key, arg);

                if reply == Reply::Handled {
                    report("SUB KEY", key, arg);
                }

                Ok(reply)
            }),
        )
        .expect("the nested options are legal");

    let node = registry.node_mut(child).expect("the child parser exists");
    node.set_usage("STRING...\n-");
    node.set_doc("\u{b}This doc string comes from the nested parser.");

    registry
        .add_hook(
            root,
            Hook::positional(|arg, state| {
                if state.arg_num() > 0 {
                    return Ok(Reply::Unknown);
                }

                println!("ARG: {arg}");
                state.record_positional(arg);
                Ok(Reply::Handled)
            }),
        )
        .expect("the root parser exists");
    registry
        .add_hook(
            root,
            Hook::no_positional(|_| {
                println!("NO ARGS");
                Ok(Reply::Handled)
            }),
        )
        .expect("the root parser exists");
    registry
        .add_hook(
            root,
            Hook::help_filter(|key, text| match key {
                HelpKey::PostDoc => {
                    let user = std::env::var("USER").unwrap_or_else(|_| "unknown".to_string());
                    Some(text.replace("%s", &user))
                }
                _ => None,
            }),
        )
        .expect("the root parser exists");
    registry
        .add_hook(
            child,
            Hook::positional(|arg, _| {
                println!("SUB ARG: {arg}");
                Ok(Reply::Handled)
            }),
        )
        .expect("the child parser exists");

    if registry.parse() {
        if let Some(node) = registry.node(root) {
            println!("Options: {}", node.parsed_options().len());
            println!("Positional: {:?}", node.positional_args());
        }
    }
}
