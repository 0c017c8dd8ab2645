use crate::api::{HandlerResult, Reply, Termination};
use crate::constant::*;
use crate::model::{HelpFlags, Key, ParseFlags, Stream};
use crate::parser::{report, Flattened, ParseContext};
use crate::scanner::matcher::OptionMatcher;
use crate::scanner::model::*;

#[cfg(feature = "tracing_debug")]
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    Ok,
    BadKey,
    Failed(i32),
}

impl From<Reply> for Status {
    fn from(value: Reply) -> Self {
        match value {
            Reply::Handled | Reply::Failed(0) => Status::Ok,
            Reply::Unknown => Status::BadKey,
            Reply::Failed(code) => Status::Failed(code),
        }
    }
}

impl Status {
    fn proceeds(&self) -> bool {
        matches!(self, Status::Ok | Status::BadKey)
    }

    fn code(&self) -> i32 {
        match self {
            Status::Ok => 0,
            Status::BadKey => EINVAL,
            Status::Failed(code) => *code,
        }
    }
}

/// Scan `argv` against the flattened parser tree, sending every event to `dispatch`.
///
/// Returns the scan status and the index of the first unconsumed argument,
/// or the termination a handler (or a built-in option) asked for.
pub(crate) fn scan(
    flattened: &Flattened,
    context: &ParseContext<'_>,
    dispatch: &mut dyn Dispatch,
    argv: Vec<String>,
    flags: ParseFlags,
) -> Result<ScanOutcome, Termination> {
    let groups = build_groups(flattened, context, flags);
    let mut index = OptionIndex::default();

    for (position, group) in groups.iter().enumerate() {
        match group.source {
            Source::Parser(descriptor) => {
                index.add_group(position, &flattened.descriptor(descriptor).options)
            }
            source => index.add_group(position, &source.builtin_options()),
        }
    }

    #[cfg(feature = "tracing_debug")]
    {
        debug!(
            "Scanning {} groups with {} short and {} long options.",
            groups.len(),
            index.shorts.len(),
            index.longs.len()
        );
    }

    let mut engine = Engine {
        context,
        dispatch,
        groups,
        cursor: Cursor::new(argv, flags),
        try_getopt: true,
    };
    let mut matcher = OptionMatcher::new(&index, flags);
    engine.run(&mut matcher)
}

fn build_groups(
    flattened: &Flattened,
    context: &ParseContext<'_>,
    flags: ParseFlags,
) -> Vec<Group> {
    let mut groups = Vec::default();
    push_parser(&mut groups, flattened, flattened.root(), None, 0);

    if !flags.contains(ParseFlags::NO_HELP) {
        groups.push(builtin(Source::Help));
    }

    if context.version_known() {
        groups.push(builtin(Source::Version));
    }

    groups
}

// Pre-order: a parser's group comes before its children's.
fn push_parser(
    groups: &mut Vec<Group>,
    flattened: &Flattened,
    descriptor: usize,
    parent: Option<usize>,
    parent_index: usize,
) {
    let position = groups.len();
    let children = &flattened.descriptor(descriptor).children;
    groups.push(Group {
        source: Source::Parser(descriptor),
        parent,
        parent_index,
        input: match parent {
            Some(_) => None,
            None => Some(flattened.owner(descriptor)),
        },
        child_inputs: vec![None; children.len()],
        args_processed: 0,
    });

    for (i, child) in children.iter().enumerate() {
        push_parser(groups, flattened, child.descriptor, Some(position), i);
    }
}

fn builtin(source: Source) -> Group {
    Group {
        source,
        parent: None,
        parent_index: 0,
        input: None,
        child_inputs: Vec::default(),
        args_processed: 0,
    }
}

struct Engine<'e, 'c> {
    context: &'e ParseContext<'c>,
    dispatch: &'e mut dyn Dispatch,
    groups: Vec<Group>,
    cursor: Cursor,
    try_getopt: bool,
}

impl<'e, 'c> Engine<'e, 'c> {
    fn run(&mut self, matcher: &mut OptionMatcher<'_>) -> Result<ScanOutcome, Termination> {
        let status = self.init()?;

        if !status.proceeds() {
            return Ok(self.outcome(status, None));
        }

        let mut status = Status::Ok;
        let mut arg_ebadkey = false;

        while status == Status::Ok {
            status = self.parse_next(matcher, &mut arg_ebadkey)?;
        }

        self.finalize(status, arg_ebadkey)
    }

    fn init(&mut self) -> Result<Status, Termination> {
        let mut status = Status::Ok;
        let mut position = 0;

        while position < self.groups.len() && status.proceeds() {
            if let Some(parent) = self.groups[position].parent {
                let parent_index = self.groups[position].parent_index;
                self.groups[position].input = self.groups[parent]
                    .child_inputs
                    .get(parent_index)
                    .copied()
                    .flatten();
            }

            status = self.call(position, Event::Init)?;
            position += 1;
        }

        Ok(status)
    }

    fn call(&mut self, position: usize, event: Event) -> Result<Status, Termination> {
        let Engine {
            context,
            dispatch,
            groups,
            cursor,
            ..
        } = self;
        let group = &mut groups[position];

        #[cfg(feature = "tracing_debug")]
        {
            debug!("Event {event:?} for group {position} ({:?}).", group.source);
        }

        let reply = match group.source {
            Source::Parser(_) => {
                cursor.arg_num = group.args_processed;
                let mut state = ScanState {
                    cursor,
                    input: group.input,
                    child_inputs: &mut group.child_inputs,
                    context: *context,
                };
                dispatch.dispatch(event, &mut state)
            }
            Source::Help => help_event(cursor, context, event),
            Source::Version => version_event(cursor, context, event),
        }?;

        Ok(Status::from(reply))
    }

    fn parse_next(
        &mut self,
        matcher: &mut OptionMatcher<'_>,
        arg_ebadkey: &mut bool,
    ) -> Result<Status, Termination> {
        if let Some(quoted) = self.cursor.quoted {
            if self.cursor.next < quoted {
                self.cursor.quoted = None;
            }
        }

        let scanned = if self.try_getopt && self.cursor.quoted.is_none() {
            matcher.next(&mut self.cursor)
        } else {
            Scanned::End
        };

        match scanned {
            Scanned::End => {
                self.try_getopt = false;

                if self.cursor.next >= self.cursor.argc()
                    || self.cursor.flags.contains(ParseFlags::NO_ARGS)
                {
                    *arg_ebadkey = true;
                    return Ok(Status::BadKey);
                }

                let arg = self.cursor.argv[self.cursor.next].clone();
                self.cursor.next += 1;
                let status = self.parse_arg(arg)?;
                *arg_ebadkey = status == Status::BadKey;
                Ok(status)
            }
            Scanned::Arg(arg) => {
                let status = self.parse_arg(arg)?;
                *arg_ebadkey = status == Status::BadKey;
                Ok(status)
            }
            Scanned::Invalid(message) => {
                if !self.cursor.flags.contains(ParseFlags::NO_ERRS) {
                    self.context
                        .user_interface
                        .print_error(format!("{}: {message}", self.cursor.name));
                }

                *arg_ebadkey = false;
                Ok(Status::BadKey)
            }
            Scanned::Option {
                key,
                group,
                name,
                arg,
            } => {
                *arg_ebadkey = false;
                let status = self.call(group, Event::Option(key, arg))?;

                if status == Status::BadKey {
                    let flags = self.cursor.flags;
                    report::error(
                        &mut self.cursor,
                        self.context,
                        flags,
                        &format!("{name}: {UNRECOGNIZED_KEY}"),
                        EX_USAGE,
                    )?;
                }

                Ok(status)
            }
        }
    }

    // The argument was just consumed: `next` points past it.
    fn parse_arg(&mut self, arg: String) -> Result<Status, Termination> {
        let index = self.cursor.next - 1;
        self.cursor.next = index;
        let mut status = Status::BadKey;
        let mut took_rest = false;
        let mut position = 0;

        while position < self.groups.len() && status == Status::BadKey {
            self.cursor.next += 1;
            took_rest = false;
            status = self.call(position, Event::Arg(arg.clone()))?;

            if status == Status::BadKey {
                self.cursor.next = index;
                took_rest = true;
                status = self.call(position, Event::Args)?;
            }

            position += 1;
        }

        if status == Status::Ok {
            if took_rest {
                self.cursor.next = self.cursor.argc();
            }

            if self.cursor.next > index {
                self.groups[position - 1].args_processed += self.cursor.next - index;
            } else {
                self.try_getopt = true;
            }
        }

        Ok(status)
    }

    fn finalize(
        &mut self,
        mut status: Status,
        arg_ebadkey: bool,
    ) -> Result<ScanOutcome, Termination> {
        if status == Status::BadKey && arg_ebadkey {
            status = Status::Ok;
        }

        let mut end_index = None;

        if status == Status::Ok {
            if self.cursor.next == self.cursor.argc() {
                for position in 0..self.groups.len() {
                    if !status.proceeds() {
                        break;
                    }

                    if self.groups[position].args_processed == 0 {
                        status = self.call(position, Event::NoArgs)?;
                    }
                }

                for position in (0..self.groups.len()).rev() {
                    if !status.proceeds() {
                        break;
                    }

                    status = self.call(position, Event::End)?;
                }

                if status == Status::BadKey {
                    status = Status::Ok;
                }
            }

            end_index = Some(self.cursor.next);
        }

        if status != Status::Ok {
            if status == Status::BadKey {
                let flags = self.cursor.flags;
                report::state_help(
                    &mut self.cursor,
                    self.context,
                    flags,
                    Stream::Err,
                    HelpFlags::STD_ERR,
                )?;
            }

            for position in 0..self.groups.len() {
                self.call(position, Event::Error)?;
            }
        } else {
            for position in (0..self.groups.len()).rev() {
                if !status.proceeds() {
                    break;
                }

                status = self.call(position, Event::Success)?;
            }

            if status == Status::BadKey {
                status = Status::Ok;
            }
        }

        for position in (0..self.groups.len()).rev() {
            self.call(position, Event::Fini)?;
        }

        Ok(self.outcome(status, end_index))
    }

    fn outcome(&self, status: Status, end_index: Option<usize>) -> ScanOutcome {
        #[cfg(feature = "tracing_debug")]
        {
            debug!("Scan finished with {status:?} at {end_index:?}.");
        }

        ScanOutcome {
            status: status.code(),
            end_index,
            error_code: self.cursor.error_code,
        }
    }
}

fn help_event(cursor: &mut Cursor, context: &ParseContext<'_>, event: Event) -> HandlerResult {
    let flags = cursor.flags;

    match event {
        Event::Option(key, _) if key == Key::from(HELP_SHORT) => {
            report::state_help(cursor, context, flags, Stream::Out, HelpFlags::STD_HELP)?;
            Ok(Reply::Handled)
        }
        Event::Option(key, _) if key == Key::new(USAGE_KEY) => {
            report::state_help(
                cursor,
                context,
                flags,
                Stream::Out,
                HelpFlags::USAGE | HelpFlags::EXIT_OK,
            )?;
            Ok(Reply::Handled)
        }
        Event::Option(key, Some(name)) if key == Key::new(PROGRAM_NAME_KEY) => {
            cursor.name = name;
            Ok(Reply::Handled)
        }
        _ => Ok(Reply::Unknown),
    }
}

fn version_event(cursor: &mut Cursor, context: &ParseContext<'_>, event: Event) -> HandlerResult {
    match event {
        Event::Option(key, _) if key == Key::from(VERSION_SHORT) => {
            let flags = cursor.flags;

            if let Some(hook) = context.version_hook {
                context.user_interface.print(hook(&cursor.name));
            } else if let Some(version) = context.program_version {
                context.user_interface.print(version.to_string());
            } else {
                report::error(cursor, context, flags, NO_VERSION, EX_USAGE)?;
            }

            if !flags.contains(ParseFlags::NO_EXIT) {
                return Err(Termination::new(0));
            }

            Ok(Reply::Handled)
        }
        _ => Ok(Reply::Unknown),
    }
}
