mod error;
mod hook;
mod node;
mod option;
mod registry;
mod state;
mod tree;

pub use error::*;
pub use hook::*;
pub use node::*;
pub use option::*;
pub use registry::*;
pub use state::*;
pub use tree::NodeId;

pub(crate) use tree::Tree;
