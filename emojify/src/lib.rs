//! Emoticon and `:named:` emoji replacement for strings and HTML trees.
//!
//! ```
//! let out = emojify::replace("hello :)");
//! assert!(out.starts_with("hello <img "));
//! ```

pub mod emojify;

pub use crate::emojify::engine::{
    default_config, emoji_names, replace, replace_with, run, run_with, set_config,
};
pub use crate::emojify::{
    Blacklist, ConfigUpdate, Document, DomError, ElementReplacer, Emojify, EmojifyConfig, Mode,
    NameWhitelist, NodeId, Replacer,
};
