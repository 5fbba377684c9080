/// Which alternative of the combined pattern an entry contributes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PatternId {
    /// The generic `:name:` syntax, validated against the name whitelist.
    Named,
    /// A punctuation emoticon with a fixed canonical name.
    Emoticon(&'static str),
}

#[derive(Clone, Copy, Debug)]
pub struct PatternEntry {
    pub id: PatternId,
    /// Regex source without capture groups of its own.
    pub pattern: &'static str,
}

impl PatternEntry {
    const fn emoticon(name: &'static str, pattern: &'static str) -> Self {
        Self {
            id: PatternId::Emoticon(name),
            pattern,
        }
    }

    pub fn name(&self) -> Option<&'static str> {
        match self.id {
            PatternId::Named => None,
            PatternId::Emoticon(name) => Some(name),
        }
    }
}

/// Inner name of the `:name:` syntax. It may not start with `-` so that
/// `:-1:` falls through to the `thumbsdown` emoticon.
pub const NAMED_INNER: &str = r"[a-z0-9A-Z_][a-z0-9A-Z_-]*";

/// Emoticons that stay active when `ignore_emoticons` is set.
pub const KEPT_WHEN_IGNORING: &[&str] = &["thumbsup", "thumbsdown"];

/// Ordered pattern table. Order decides precedence inside the alternation:
/// for a given start position the first listed alternative wins.
pub static PATTERN_TABLE: &[PatternEntry] = &[
    PatternEntry {
        id: PatternId::Named,
        pattern: NAMED_INNER,
    },
    /* :-)  */ PatternEntry::emoticon("smile", r":-?\)"),
    /* :o   */ PatternEntry::emoticon("open_mouth", r":o"),
    /* :-o  */ PatternEntry::emoticon("scream", r":-o"),
    /* :-]  */ PatternEntry::emoticon("smirk", r"[:;]-?\]"),
    /* :-D  */ PatternEntry::emoticon("grinning", r"[:;]-?d"),
    /* X-D  */ PatternEntry::emoticon("stuck_out_tongue_closed_eyes", r"x-d"),
    /* ;-p  */ PatternEntry::emoticon("stuck_out_tongue_winking_eye", r"[:;]-?p"),
    /* :-[ / :-@ */ PatternEntry::emoticon("rage", r":-?[\[@]"),
    /* :-(  */ PatternEntry::emoticon("frowning", r":-?\("),
    /* :'-( */ PatternEntry::emoticon("sob", r":['’]-?\(|:&#x27;\("),
    /* :-*  */ PatternEntry::emoticon("kissing_heart", r":-?\*"),
    /* ;-)  */ PatternEntry::emoticon("wink", r";-?\)"),
    /* :-/  */ PatternEntry::emoticon("pensive", r":-?/"),
    /* :-s  */ PatternEntry::emoticon("confounded", r":-?s"),
    /* :-|  */ PatternEntry::emoticon("flushed", r":-?\|"),
    /* :-$  */ PatternEntry::emoticon("relaxed", r":-?\$"),
    /* :-x  */ PatternEntry::emoticon("mask", r":-x"),
    /* <3   */ PatternEntry::emoticon("heart", r"<3|&lt;3"),
    /* </3  */ PatternEntry::emoticon("broken_heart", r"</3|&lt;&#x2F;3"),
    /* :+1: */ PatternEntry::emoticon("thumbsup", r":\+1:"),
    /* :-1: */ PatternEntry::emoticon("thumbsdown", r":-1:"),
];

/// Table entries active for the given emoticon toggle, in table order.
pub fn active_entries(ignore_emoticons: bool) -> impl Iterator<Item = &'static PatternEntry> {
    PATTERN_TABLE.iter().filter(move |entry| match entry.id {
        PatternId::Named => true,
        PatternId::Emoticon(name) => !ignore_emoticons || KEPT_WHEN_IGNORING.contains(&name),
    })
}

/// Canonical names of every emoticon in the table.
pub fn emoticon_names() -> impl Iterator<Item = &'static str> {
    PATTERN_TABLE.iter().filter_map(PatternEntry::name)
}
