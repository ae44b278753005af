pub mod error;
pub mod handle;
pub mod node;
pub mod parser;
pub mod prune;
pub mod tree;

pub use error::TreeError;
pub use handle::TreeHandle;
pub use node::{Node, NodeId};
pub use tree::{Tree, TreeSnapshot};
