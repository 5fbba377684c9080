use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use super::names::NameWhitelist;
use super::patterns::{self, PatternId};

/// Capture groups contributed by one alternative of the combined pattern.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum GroupSlot {
    /// `outer` wraps the whole `:name:` token, `inner` isolates the name.
    Named { outer: usize, inner: usize },
    Emoticon { group: usize, name: &'static str },
}

/// One alternation regex over the active pattern table plus the mapping from
/// capture group index back to canonical names.
#[derive(Clone, Debug)]
pub struct PatternRegistry {
    regex: Regex,
    slots: Vec<GroupSlot>,
    ignore_emoticons: bool,
}

static FULL: Lazy<PatternRegistry> = Lazy::new(|| PatternRegistry::build(false));
static NAMED_ONLY: Lazy<PatternRegistry> = Lazy::new(|| PatternRegistry::build(true));

impl PatternRegistry {
    /// Prebuilt registry for the given emoticon toggle.
    pub fn shared(ignore_emoticons: bool) -> &'static PatternRegistry {
        if ignore_emoticons { &NAMED_ONLY } else { &FULL }
    }

    pub fn build(ignore_emoticons: bool) -> Self {
        let mut sources = Vec::new();
        let mut slots = Vec::new();
        // group 0 is the whole match
        let mut next_group = 1;

        for entry in patterns::active_entries(ignore_emoticons) {
            match entry.id {
                PatternId::Named => {
                    sources.push(ascii_fold(entry.pattern, format!("(:({}):)", entry.pattern)));
                    slots.push(GroupSlot::Named {
                        outer: next_group,
                        inner: next_group + 1,
                    });
                    next_group += 2;
                }
                PatternId::Emoticon(name) => {
                    sources.push(ascii_fold(entry.pattern, format!("({})", entry.pattern)));
                    slots.push(GroupSlot::Emoticon {
                        group: next_group,
                        name,
                    });
                    next_group += 1;
                }
            }
        }

        let source = format!("(?i){}", sources.join("|"));
        let regex = Regex::new(&source).expect("combined emoji pattern");
        debug_assert_eq!(regex.captures_len(), next_group);

        Self {
            regex,
            slots,
            ignore_emoticons,
        }
    }

    pub fn regex(&self) -> &Regex {
        &self.regex
    }

    pub fn ignores_emoticons(&self) -> bool {
        self.ignore_emoticons
    }

    /// Canonical name for a raw match, or `None` when a `:name:` token is not
    /// in the whitelist.
    pub fn resolve<'w>(&self, caps: &Captures<'_>, names: &'w NameWhitelist) -> Option<&'w str> {
        for slot in &self.slots {
            match *slot {
                GroupSlot::Named { outer, inner } => {
                    if let (Some(_), Some(name)) = (caps.get(outer), caps.get(inner)) {
                        return names.get(name.as_str());
                    }
                }
                GroupSlot::Emoticon { group, name } => {
                    if caps.get(group).is_some_and(|m| !m.is_empty()) {
                        return Some(name);
                    }
                }
            }
        }
        None
    }
}

/// Limit case folding to ASCII for ASCII entries, so `s` never matches `ſ`
/// and `k` never matches the Kelvin sign. Entries with non-ASCII literals
/// stay in Unicode mode, where those literals are allowed.
fn ascii_fold(pattern: &str, group: String) -> String {
    if pattern.is_ascii() {
        format!("(?-u:{group})")
    } else {
        group
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve_first(
        registry: &PatternRegistry,
        names: &NameWhitelist,
        input: &str,
    ) -> Option<String> {
        let caps = registry.regex().captures(input)?;
        registry.resolve(&caps, names).map(str::to_string)
    }

    #[test]
    fn resolves_emoticons_by_group() {
        let registry = PatternRegistry::build(false);
        let names = NameWhitelist::default();
        for (input, name) in [
            (":)", "smile"),
            (":O", "open_mouth"),
            ("X-D", "stuck_out_tongue_closed_eyes"),
            ("&lt;3", "heart"),
            ("</3", "broken_heart"),
            (":'(", "sob"),
        ] {
            assert_eq!(resolve_first(&registry, &names, input).as_deref(), Some(name));
        }
    }

    #[test]
    fn last_table_entry_resolves() {
        let registry = PatternRegistry::build(false);
        let names = NameWhitelist::default();
        assert_eq!(resolve_first(&registry, &names, ":-1:").as_deref(), Some("thumbsdown"));
        assert_eq!(resolve_first(&registry, &names, ":+1:").as_deref(), Some("thumbsup"));
    }

    #[test]
    fn named_requires_whitelist_membership() {
        let registry = PatternRegistry::build(false);
        let names = NameWhitelist::from_list("rocket");
        assert_eq!(resolve_first(&registry, &names, ":rocket:").as_deref(), Some("rocket"));
        assert_eq!(resolve_first(&registry, &names, ":nope:"), None);
    }

    #[test]
    fn case_folding_is_ascii_only() {
        let registry = PatternRegistry::build(false);
        let names = NameWhitelist::from_list("kiss");
        assert_eq!(resolve_first(&registry, &names, ":S").as_deref(), Some("confounded"));
        assert_eq!(resolve_first(&registry, &names, "&LT;3").as_deref(), Some("heart"));
        assert_eq!(resolve_first(&registry, &names, ":KISS:").as_deref(), None);
        assert_eq!(resolve_first(&registry, &names, ":\u{2019}(").as_deref(), Some("sob"));

        assert!(!registry.regex().is_match(":\u{17f}"));
        assert!(!registry.regex().is_match(":\u{212a}iss:"));
    }

    #[test]
    fn ignoring_emoticons_drops_punctuation() {
        let registry = PatternRegistry::shared(true);
        assert!(registry.ignores_emoticons());
        assert!(!registry.regex().is_match(":) :P <3"));
        let names = NameWhitelist::default();
        assert_eq!(resolve_first(registry, &names, ":-1:").as_deref(), Some("thumbsdown"));
    }
}
