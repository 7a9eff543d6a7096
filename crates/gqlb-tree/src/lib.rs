#![doc = include_str!("../README.md")]
#![forbid(unsafe_code)]
#![deny(missing_debug_implementations, nonstandard_style)]
#![warn(future_incompatible, unreachable_pub, rust_2018_idioms)]

mod builder;
mod draw;
mod edit;
mod error;
mod node;
mod persist;
mod query;
mod tree;

pub use draw::Cursor;
pub use draw::Screen;
pub use draw::Style;
pub use edit::edit;
pub use edit::EditCommand;
pub use error::BuildError;
pub use error::QueryError;
pub use error::QueryErrorKind;
pub use error::RestoreError;
pub use node::NodeId;
pub use tree::Key;
pub use tree::Tree;
