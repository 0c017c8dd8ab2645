use crate::api::Termination;
use crate::constant::EX_USAGE;
use crate::model::{HelpFlags, ParseFlags, Stream};
use crate::parser::{render_help, ParseContext};
use crate::scanner::Cursor;

#[cfg(feature = "tracing_debug")]
use tracing::debug;

fn terminate(flags: ParseFlags, code: i32) -> Result<(), Termination> {
    if flags.contains(ParseFlags::NO_EXIT) {
        Ok(())
    } else {
        #[cfg(feature = "tracing_debug")]
        {
            debug!("Requesting termination with exit status {code}.");
        }

        Err(Termination::new(code))
    }
}

fn print_help(
    cursor: &Cursor,
    context: &ParseContext<'_>,
    flags: ParseFlags,
    stream: Stream,
    mut help: HelpFlags,
) {
    if flags.contains(ParseFlags::LONG_ONLY) {
        help |= HelpFlags::LONG_ONLY;
    }

    let text = render_help(context, flags, &cursor.name, help);

    if !text.is_empty() {
        match stream {
            Stream::Out => context.user_interface.print(text),
            Stream::Err => context.user_interface.print_error(text),
        }
    }
}

/// Print help to `stream`, then terminate if `help` asks for it.
/// Nothing happens under `NO_ERRS`.
/// Used by the engine for its built-in options and diagnostics.
pub(crate) fn state_help(
    cursor: &mut Cursor,
    context: &ParseContext<'_>,
    flags: ParseFlags,
    stream: Stream,
    help: HelpFlags,
) -> Result<(), Termination> {
    if flags.contains(ParseFlags::NO_ERRS) {
        return Ok(());
    }

    print_help(cursor, context, flags, stream, help);

    if help.contains(HelpFlags::EXIT_ERR) {
        cursor.error_code = EX_USAGE;
        terminate(flags, EX_USAGE)
    } else if help.contains(HelpFlags::EXIT_OK) {
        terminate(flags, 0)
    } else {
        Ok(())
    }
}

/// Print `prog: message` and the pointer to the help options, then terminate with `code`.
/// Nothing happens under `NO_ERRS`.
/// Used by the engine for its own diagnostics.
pub(crate) fn error(
    cursor: &mut Cursor,
    context: &ParseContext<'_>,
    flags: ParseFlags,
    message: &str,
    code: i32,
) -> Result<(), Termination> {
    if flags.contains(ParseFlags::NO_ERRS) {
        return Ok(());
    }

    report_error(cursor, context, flags, message, code)
}

/// A handler's error: record `code`, print `prog: message` and the pointer to the help options
/// (unless `NO_ERRS`), then terminate with `code`.
pub(crate) fn report_error(
    cursor: &mut Cursor,
    context: &ParseContext<'_>,
    flags: ParseFlags,
    message: &str,
    code: i32,
) -> Result<(), Termination> {
    cursor.error_code = code;

    if !flags.contains(ParseFlags::NO_ERRS) {
        context
            .user_interface
            .print_error(format!("{}: {message}", cursor.name));
        print_help(cursor, context, flags, Stream::Err, HelpFlags::SEE);
    }

    terminate(flags, code)
}

/// A handler's failure: record `status`, print `prog: message` followed by the text of `errnum`
/// when nonzero (unless `NO_ERRS`), then terminate with `status`, zero included.
pub(crate) fn report_failure(
    cursor: &mut Cursor,
    context: &ParseContext<'_>,
    flags: ParseFlags,
    status: i32,
    errnum: i32,
    message: &str,
) -> Result<(), Termination> {
    cursor.error_code = status;

    if !flags.contains(ParseFlags::NO_ERRS) {
        let mut line = format!("{}: {message}", cursor.name);

        if errnum != 0 {
            line.push_str(&format!(": {}", std::io::Error::from_raw_os_error(errnum)));
        }

        context.user_interface.print_error(line);
    }

    terminate(flags, status)
}

/// A handler's help request: print the help (unless `NO_ERRS`), then terminate.
/// The status is the usage error status when `help` has `EXIT_ERR`, otherwise 0.
pub(crate) fn report_help(
    cursor: &mut Cursor,
    context: &ParseContext<'_>,
    flags: ParseFlags,
    stream: Stream,
    help: HelpFlags,
) -> Result<(), Termination> {
    if !flags.contains(ParseFlags::NO_ERRS) {
        print_help(cursor, context, flags, stream, help);
    }

    if help.contains(HelpFlags::EXIT_ERR) {
        cursor.error_code = EX_USAGE;
        terminate(flags, EX_USAGE)
    } else {
        terminate(flags, 0)
    }
}
