use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

use super::patterns::NAMED_INNER;

/// Comma-joined name list baked in at compile time. When set it replaces the
/// gemoji shortcodes shipped with the `emojis` crate.
const BUILD_NAMES: Option<&str> = option_env!("EMOJIFY_NAMES");

static BUNDLED: Lazy<NameWhitelist> = Lazy::new(|| match BUILD_NAMES {
    Some(list) => NameWhitelist::from_list(list),
    None => NameWhitelist::from_names(
        emojis::iter().flat_map(|emoji| emoji.shortcodes().map(str::to_string)),
    ),
});

static NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!("^{NAMED_INNER}$")).expect("emoji name regex"));

/// Canonical short names accepted by the `:name:` syntax.
#[derive(Clone, Debug, Default)]
pub struct NameWhitelist {
    ordered: Vec<String>,
    lookup: HashSet<String>,
}

impl NameWhitelist {
    /// The whitelist compiled into this build.
    pub fn bundled() -> &'static NameWhitelist {
        &BUNDLED
    }

    /// Parse a comma-joined list. Blank entries are skipped, so an empty list
    /// yields an empty whitelist.
    pub fn from_list(list: &str) -> Self {
        Self::from_names(list.split(',').map(|s| s.trim().to_string()))
    }

    /// Keeps first-seen order and drops duplicates and names the `:name:`
    /// syntax could never match.
    pub fn from_names<I>(names: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut whitelist = Self::default();
        for name in names {
            if !NAME_RE.is_match(&name) || whitelist.lookup.contains(&name) {
                continue;
            }
            whitelist.lookup.insert(name.clone());
            whitelist.ordered.push(name);
        }
        whitelist
    }

    pub fn contains(&self, name: &str) -> bool {
        self.lookup.contains(name)
    }

    /// The stored copy of `name`, if whitelisted.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.lookup.get(name).map(String::as_str)
    }

    pub fn names(&self) -> &[String] {
        &self.ordered
    }

    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }
}
