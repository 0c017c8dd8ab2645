mod core;
mod matcher;
mod model;

pub(crate) use self::core::scan;
pub(crate) use model::*;
