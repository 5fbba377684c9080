use log::{debug, trace};
use regex::Captures;

use super::config::EmojifyConfig;
use super::names::NameWhitelist;
use super::registry::PatternRegistry;
use super::render::{self, Replacer};
use super::validator::Validator;

/// Replace every accepted emoji in `input` with the default markup for
/// `config`. Rejected candidates are left untouched.
pub fn replace(input: &str, config: &EmojifyConfig, names: &NameWhitelist) -> String {
    replace_inner(input, config, names, None)
}

/// Like [`replace`], but `replacer` produces the markup and the configured
/// mode and tag type are ignored.
pub fn replace_with(
    input: &str,
    config: &EmojifyConfig,
    names: &NameWhitelist,
    replacer: &dyn Replacer,
) -> String {
    replace_inner(input, config, names, Some(replacer))
}

fn replace_inner(
    input: &str,
    config: &EmojifyConfig,
    names: &NameWhitelist,
    replacer: Option<&dyn Replacer>,
) -> String {
    if input.is_empty() {
        return String::new();
    }

    let registry = PatternRegistry::shared(config.ignore_emoticons);
    let mut validator = Validator::new();
    let mut accepted = 0usize;

    let output = registry.regex().replace_all(input, |caps: &Captures<'_>| {
        let whole = caps.get_match();
        let raw = whole.as_str();

        let Some(name) = registry.resolve(caps, names) else {
            trace!("unknown emoji name in {raw:?} at {}", whole.start());
            return raw.to_string();
        };
        if !validator.accept(input, whole.start(), whole.end()) {
            trace!("rejected {raw:?} at {}", whole.start());
            return raw.to_string();
        }

        accepted += 1;
        match replacer {
            Some(replacer) => replacer.replace(raw, name),
            None => render::render_markup(config, name),
        }
    });

    debug!("emojified {accepted} match(es) in {} bytes", input.len());
    output.into_owned()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn empty_input() {
        assert_eq!(
            replace("", &EmojifyConfig::default(), NameWhitelist::bundled()),
            ""
        );
    }

    #[test]
    fn replacer_sees_raw_text_and_name() {
        let out = replace_with(
            "ok ;-) fine",
            &EmojifyConfig::default(),
            NameWhitelist::bundled(),
            &|raw: &str, name: &str| format!("[{raw}|{name}]"),
        );
        assert_eq!(out, "ok [;-)|wink] fine");
    }

    #[test]
    fn whitelist_gates_named_emoji() {
        let names = NameWhitelist::from_list("rocket");
        let out = replace_with(
            ":rocket: :smile:",
            &EmojifyConfig::default(),
            &names,
            &|_: &str, name: &str| format!("<{name}>"),
        );
        assert_eq!(out, "<rocket> :smile:");
    }

    #[test]
    fn empty_whitelist_never_resolves_named() {
        let names = NameWhitelist::from_list("");
        let out = replace(":smile: :)", &EmojifyConfig::default(), &names);
        assert!(out.starts_with(":smile: <img "));
    }
}
