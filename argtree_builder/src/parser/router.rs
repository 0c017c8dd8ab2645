use std::collections::HashMap;

use crate::api::{Action, HandlerResult, Hook, HookKind, ParseState, Reply, Tree};
use crate::prelude::KeyHandler;
use crate::scanner::{Dispatch, Event, ScanState};

#[cfg(feature = "tracing_debug")]
use tracing::debug;

/// Sends each scanner event to the parser it targets: options to the key handler, everything else to the hooks.
pub(crate) struct Router<'r, 'a> {
    pub(crate) tree: &'r mut Tree,
    pub(crate) handlers: &'r mut [Box<dyn KeyHandler + 'a>],
    pub(crate) hooks: &'r mut [HashMap<HookKind, Hook<'a>>],
}

fn hook_kind(event: &Event) -> Option<HookKind> {
    match event {
        Event::Init => Some(HookKind::Begin),
        Event::Args => Some(HookKind::MorePositional),
        Event::NoArgs => Some(HookKind::NoPositional),
        Event::End => Some(HookKind::End),
        Event::Success => Some(HookKind::Success),
        Event::Error => Some(HookKind::Error),
        Event::Fini => Some(HookKind::Finish),
        Event::Option(..) | Event::Arg(_) => None,
    }
}

impl<'r, 'a> Dispatch for Router<'r, 'a> {
    fn dispatch(&mut self, event: Event, scan: &mut ScanState<'_>) -> HandlerResult {
        let node = match scan.input {
            Some(node) => node,
            None => return Ok(Reply::Unknown),
        };

        if event == Event::Init {
            let children = scan.context.flattened.children_of(node);

            for (slot, child) in scan.child_inputs.iter_mut().zip(children) {
                *slot = Some(child);
            }
        }

        #[cfg(feature = "tracing_debug")]
        let description = format!("{event:?}");
        let mut state = ParseState::new(node, self.tree, scan.cursor, scan.context);
        let hooks = &mut self.hooks[node.index()];

        let result = match event {
            Event::Option(key, arg) => {
                self.handlers[node.index()].handle_key(key, arg.as_deref(), &mut state)
            }
            Event::Arg(arg) => match hooks.get_mut(&HookKind::Positional) {
                Some(Hook {
                    action: Action::Positional(action),
                    ..
                }) => action(&arg, &mut state),
                _ => Ok(state.consume_all_positional(&arg)),
            },
            other => match hook_kind(&other).and_then(|kind| hooks.get_mut(&kind)) {
                Some(Hook {
                    action: Action::State(action),
                    ..
                }) => action(&mut state),
                _ => Ok(Reply::Unknown),
            },
        };

        #[cfg(feature = "tracing_debug")]
        {
            debug!("Routed {description} to {node}: {result:?}.");
        }

        result
    }
}
