use std::sync::{PoisonError, RwLock};

use anyhow::Result;
use once_cell::sync::Lazy;

use super::config::{ConfigUpdate, EmojifyConfig};
use super::dom::{self, Document, NodeId};
use super::names::NameWhitelist;
use super::render::{ElementReplacer, Replacer};
use super::{replace, walk};

/// A configuration paired with a name whitelist, exposing the string and DOM
/// engines. Configuration changes between calls take effect on the next call.
#[derive(Debug, Clone)]
pub struct Emojify {
    config: EmojifyConfig,
    names: NameWhitelist,
}

impl Default for Emojify {
    fn default() -> Self {
        Self::new(EmojifyConfig::default())
    }
}

impl Emojify {
    pub fn new(config: EmojifyConfig) -> Self {
        Self {
            config,
            names: NameWhitelist::bundled().clone(),
        }
    }

    pub fn with_whitelist(mut self, names: NameWhitelist) -> Self {
        self.names = names;
        self
    }

    /// The live configuration record.
    pub fn config(&self) -> &EmojifyConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut EmojifyConfig {
        &mut self.config
    }

    pub fn set_config(&mut self, update: ConfigUpdate) {
        self.config.merge(update);
    }

    /// Merge a JSON object of configuration fields. Unknown fields are ignored.
    pub fn set_config_json(&mut self, json: &str) -> Result<()> {
        self.set_config(ConfigUpdate::from_json(json)?);
        Ok(())
    }

    /// Names accepted by the `:name:` syntax. See [`emoji_names`] for how
    /// `+1` and `-1` are handled.
    pub fn emoji_names(&self) -> &[String] {
        self.names.names()
    }

    pub fn whitelist(&self) -> &NameWhitelist {
        &self.names
    }

    pub fn replace(&self, input: &str) -> String {
        replace::replace(input, &self.config, &self.names)
    }

    pub fn replace_with(&self, input: &str, replacer: &dyn Replacer) -> String {
        replace::replace_with(input, &self.config, &self.names, replacer)
    }

    pub fn run(&self, doc: &mut Document, root: Option<NodeId>) -> dom::Result<usize> {
        walk::run(doc, root, &self.config, &self.names)
    }

    pub fn run_with(
        &self,
        doc: &mut Document,
        root: Option<NodeId>,
        replacer: &dyn ElementReplacer,
    ) -> dom::Result<usize> {
        walk::run_with(doc, root, &self.config, &self.names, replacer)
    }
}

static DEFAULT_CONFIG: Lazy<RwLock<EmojifyConfig>> =
    Lazy::new(|| RwLock::new(EmojifyConfig::default()));

/// Copy of the process-wide configuration. The lock is released before any
/// engine work, so replacers may call [`set_config`].
fn current_config() -> EmojifyConfig {
    DEFAULT_CONFIG
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}

/// Replace emoji in `input` using the process-wide configuration.
pub fn replace(input: &str) -> String {
    replace::replace(input, &current_config(), NameWhitelist::bundled())
}

pub fn replace_with(input: &str, replacer: &dyn Replacer) -> String {
    replace::replace_with(input, &current_config(), NameWhitelist::bundled(), replacer)
}

/// Run the DOM engine with the process-wide configuration.
pub fn run(doc: &mut Document, root: Option<NodeId>) -> dom::Result<usize> {
    walk::run(doc, root, &current_config(), NameWhitelist::bundled())
}

pub fn run_with(
    doc: &mut Document,
    root: Option<NodeId>,
    replacer: &dyn ElementReplacer,
) -> dom::Result<usize> {
    walk::run_with(doc, root, &current_config(), NameWhitelist::bundled(), replacer)
}

/// Merge `update` into the process-wide configuration.
pub fn set_config(update: ConfigUpdate) {
    DEFAULT_CONFIG
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .merge(update);
}

/// The live process-wide configuration record. Reads observe every later
/// [`set_config`]; drop a read guard before calling it on the same thread.
pub fn default_config() -> &'static RwLock<EmojifyConfig> {
    &DEFAULT_CONFIG
}

/// The bundled whitelist. Names starting with `+` or `-` are left out since
/// `:+1:` and `:-1:` resolve through the emoticon table as `thumbsup` and
/// `thumbsdown`.
pub fn emoji_names() -> &'static [String] {
    NameWhitelist::bundled().names()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emojify::config::Mode;

    #[test]
    fn instance_config_changes_apply_to_next_call() {
        let mut emojify = Emojify::default();
        assert!(emojify.replace(":)").starts_with("<img "));

        emojify.set_config(ConfigUpdate::default().mode(Mode::Sprite));
        assert_eq!(
            emojify.replace(":)"),
            "<span class='emoji emoji-smile' title=':smile:'></span>"
        );

        emojify.set_config_json(r#"{"ignore_emoticons": true}"#).unwrap();
        assert_eq!(emojify.replace(":)"), ":)");
    }

    #[test]
    fn custom_whitelist() {
        let emojify = Emojify::default().with_whitelist(NameWhitelist::from_list("shipit"));
        assert_eq!(emojify.emoji_names(), ["shipit"]);
        assert!(emojify.replace(":shipit:").contains("shipit.png"));
        assert_eq!(emojify.replace(":smile:"), ":smile:");
    }

    #[test]
    fn bad_json_is_an_error() {
        let mut emojify = Emojify::default();
        assert!(emojify.set_config_json("{mode:").is_err());
        assert_eq!(emojify.config(), &EmojifyConfig::default());
    }
}
