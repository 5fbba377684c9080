pub mod config;
pub mod dom;
pub mod engine;
pub mod names;
pub mod patterns;
pub mod registry;
pub mod render;
pub mod replace;
pub mod validator;
pub mod walk;

pub use config::{Blacklist, ConfigUpdate, EmojifyConfig, Mode};
pub use dom::{Document, DomError, NodeId};
pub use engine::Emojify;
pub use names::NameWhitelist;
pub use registry::PatternRegistry;
pub use render::{ElementReplacer, Replacer};
pub use validator::Validator;
