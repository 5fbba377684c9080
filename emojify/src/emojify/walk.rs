//! In-place emoji replacement over a document subtree.
//!
//! The walk runs in two phases. First every eligible text node is scanned
//! and its accepted matches are recorded without touching the tree. Then the
//! matches of each node are spliced in descending offset order: a split only
//! moves text to the right of the split point, so offsets of matches further
//! left stay valid.

use log::{debug, trace};
use regex::Regex;

use super::config::{Blacklist, EmojifyConfig};
use super::dom::{Document, DomError, NodeData, NodeId, Result};
use super::names::NameWhitelist;
use super::registry::PatternRegistry;
use super::render::{self, ElementReplacer};
use super::validator::Validator;

/// How the walk treats a node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Visit {
    /// Text node: scan it.
    Accept,
    /// Blacklisted element or non-text leaf: skip it and its subtree.
    Reject,
    /// Ordinary element: descend without scanning it.
    Skip,
}

/// Compiled form of the configured [`Blacklist`].
#[derive(Debug)]
pub struct NodeFilter {
    ids: Vec<String>,
    classes: Option<Regex>,
    elements: Option<Regex>,
}

impl NodeFilter {
    pub fn new(blacklist: &Blacklist) -> Self {
        Self {
            ids: blacklist.ids.clone(),
            classes: whole_word_regex(&blacklist.classes),
            elements: whole_word_regex(&blacklist.elements),
        }
    }

    pub fn classify(&self, doc: &Document, id: NodeId) -> Visit {
        match doc.data(id) {
            Some(NodeData::Text(_)) => Visit::Accept,
            Some(NodeData::Element(el)) => {
                if self.is_blacklisted(doc, id, &el.tag) {
                    Visit::Reject
                } else {
                    Visit::Skip
                }
            }
            Some(NodeData::Comment(_)) | None => Visit::Reject,
        }
    }

    fn is_blacklisted(&self, doc: &Document, id: NodeId, tag: &str) -> bool {
        if tag.eq_ignore_ascii_case("svg") {
            return true;
        }
        if self.elements.as_ref().is_some_and(|re| re.is_match(tag)) {
            return true;
        }
        if let Some(re) = &self.classes {
            if doc
                .class_name(id)
                .split_ascii_whitespace()
                .any(|class| re.is_match(class))
            {
                return true;
            }
        }
        doc.attr(id, "id")
            .is_some_and(|el_id| self.ids.iter().any(|b| b == el_id))
    }
}

/// Case-insensitive regex matching any entry of `list` as a whole word.
/// An empty list matches nothing.
fn whole_word_regex(list: &[String]) -> Option<Regex> {
    let alternatives: Vec<String> = list
        .iter()
        .filter(|s| !s.is_empty())
        .map(|s| regex::escape(s))
        .collect();
    if alternatives.is_empty() {
        return None;
    }
    // escaped literals always compile
    Regex::new(&format!("(?i)^(?:{})$", alternatives.join("|"))).ok()
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct PlannedMatch<'n> {
    start: usize,
    end: usize,
    name: &'n str,
}

/// Replace accepted emoji below the chosen root with default elements.
/// Returns the number of inserted elements.
pub fn run(
    doc: &mut Document,
    root: Option<NodeId>,
    config: &EmojifyConfig,
    names: &NameWhitelist,
) -> Result<usize> {
    run_inner(doc, root, config, names, None)
}

/// Like [`run`], but `replacer` builds each element. The matched text is
/// dropped and the returned node is inserted in its place.
pub fn run_with(
    doc: &mut Document,
    root: Option<NodeId>,
    config: &EmojifyConfig,
    names: &NameWhitelist,
    replacer: &dyn ElementReplacer,
) -> Result<usize> {
    run_inner(doc, root, config, names, Some(replacer))
}

/// The explicit root, else the `only_crawl_id` element, else the body.
pub fn resolve_root(
    doc: &Document,
    root: Option<NodeId>,
    config: &EmojifyConfig,
) -> Result<NodeId> {
    if let Some(root) = root {
        if doc.data(root).is_none() {
            return Err(DomError::UnknownNode(root));
        }
        return Ok(root);
    }
    match config.only_crawl_id.as_deref() {
        Some(id) => doc
            .element_by_id(id)
            .ok_or_else(|| DomError::MissingRoot(id.to_string())),
        None => Ok(doc.body()),
    }
}

/// Text nodes below `root` in document order, honoring the filter.
pub fn collect_text_nodes(doc: &Document, root: NodeId, filter: &NodeFilter) -> Vec<NodeId> {
    let mut out = vec![];
    collect_into(doc, root, filter, &mut out);
    out
}

fn collect_into(doc: &Document, parent: NodeId, filter: &NodeFilter, out: &mut Vec<NodeId>) {
    for &child in doc.children(parent) {
        match filter.classify(doc, child) {
            Visit::Accept => out.push(child),
            Visit::Reject => {}
            Visit::Skip => collect_into(doc, child, filter, out),
        }
    }
}

fn scan<'n>(
    registry: &PatternRegistry,
    names: &'n NameWhitelist,
    text: &str,
) -> Vec<PlannedMatch<'n>> {
    let mut validator = Validator::new();
    let mut matches = vec![];

    for caps in registry.regex().captures_iter(text) {
        let whole = caps.get_match();
        let Some(name) = registry.resolve(&caps, names) else {
            continue;
        };
        if validator.accept(text, whole.start(), whole.end()) {
            matches.push(PlannedMatch {
                start: whole.start(),
                end: whole.end(),
                name,
            });
        } else {
            trace!("rejected {:?} at {}", whole.as_str(), whole.start());
        }
    }
    matches
}

fn run_inner(
    doc: &mut Document,
    root: Option<NodeId>,
    config: &EmojifyConfig,
    names: &NameWhitelist,
    replacer: Option<&dyn ElementReplacer>,
) -> Result<usize> {
    let root = resolve_root(doc, root, config)?;
    let registry = PatternRegistry::shared(config.ignore_emoticons);
    let filter = NodeFilter::new(&config.blacklist);

    let plan: Vec<(NodeId, Vec<PlannedMatch<'_>>)> = collect_text_nodes(doc, root, &filter)
        .into_iter()
        .filter_map(|node| {
            let matches = scan(registry, names, doc.text(node)?);
            (!matches.is_empty()).then_some((node, matches))
        })
        .collect();

    let mut inserted = 0;
    for (node, matches) in &plan {
        for m in matches.iter().rev() {
            splice(doc, *node, m, config, replacer)?;
            inserted += 1;
        }
    }

    debug!("emojified {inserted} match(es) in {} text node(s)", plan.len());
    Ok(inserted)
}

/// Swap `start..end` of `node` for a replacement element. `node` keeps the
/// text before the match.
fn splice(
    doc: &mut Document,
    node: NodeId,
    m: &PlannedMatch<'_>,
    config: &EmojifyConfig,
    replacer: Option<&dyn ElementReplacer>,
) -> Result<()> {
    let fragment = doc.split_text(node, m.start)?;
    doc.split_text(fragment, m.end - m.start)?;
    let raw = doc.text(fragment).unwrap_or_default().to_string();

    match replacer {
        Some(replacer) => {
            let element = replacer.build(doc, &raw, m.name);
            doc.replace_child(fragment, element)?;
        }
        None => {
            let element = render::build_element(doc, config, m.name)?;
            doc.replace_child(fragment, element)?;
            doc.append_child(element, fragment)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::emojify::config::ConfigUpdate;

    fn titles(doc: &Document) -> Vec<String> {
        doc.elements_by_class(doc.body(), "emoji")
            .into_iter()
            .filter_map(|n| doc.attr(n, "title").map(str::to_string))
            .collect()
    }

    #[test]
    fn classifies_nodes() {
        let doc = Document::parse_fragment(
            r#"<p>a</p><pre>b</pre><SVG>c</SVG><div class="x No-Emojify">d</div><span id="skip">e</span><!--f-->"#,
        );
        let mut blacklist = Blacklist::default();
        blacklist.ids.push("skip".into());
        let filter = NodeFilter::new(&blacklist);
        let visits: Vec<Visit> = doc
            .children(doc.body())
            .iter()
            .map(|&n| filter.classify(&doc, n))
            .collect();
        assert_eq!(
            visits,
            [
                Visit::Skip,
                Visit::Reject,
                Visit::Reject,
                Visit::Reject,
                Visit::Reject,
                Visit::Reject
            ]
        );
    }

    #[test]
    fn element_names_match_whole_tags() {
        // `a` must not blacklist `span`, `table` and friends
        let doc = Document::parse_fragment("<span>:)</span><table><tr><td>:)</td></tr></table><a>:)</a>");
        let filter = NodeFilter::new(&Blacklist::default());
        assert_eq!(collect_text_nodes(&doc, doc.body(), &filter).len(), 2);
    }

    #[test]
    fn empty_lists_blacklist_nothing() {
        let doc = Document::parse_fragment("<pre class=\"x\">:)</pre>");
        let filter = NodeFilter::new(&Blacklist {
            ids: vec![],
            classes: vec![],
            elements: vec![],
        });
        assert_eq!(collect_text_nodes(&doc, doc.body(), &filter).len(), 1);
    }

    #[test]
    fn splices_in_place_and_keeps_surrounding_text() {
        let mut doc = Document::parse_fragment("<p>hi :) and <b>:D</b> bye</p>");
        let count = run(&mut doc, None, &EmojifyConfig::default(), NameWhitelist::bundled()).unwrap();
        assert_eq!(count, 2);
        assert_eq!(titles(&doc), [":smile:", ":grinning:"]);
        assert_eq!(doc.text_content(doc.body()), "hi :) and :D bye");
        assert_eq!(
            doc.inner_html(doc.body()),
            concat!(
                r#"<p>hi <img align="absmiddle" alt=":smile:" class="emoji" src="images/emoji/smile.png" title=":smile:"> and "#,
                r#"<b><img align="absmiddle" alt=":grinning:" class="emoji" src="images/emoji/grinning.png" title=":grinning:"></b> bye</p>"#,
            )
        );
    }

    #[test]
    fn reverse_splicing_keeps_order() {
        let mut doc = Document::parse_fragment(":):(;)");
        run(&mut doc, None, &EmojifyConfig::default(), NameWhitelist::bundled()).unwrap();
        assert_eq!(titles(&doc), [":smile:", ":frowning:", ":wink:"]);
    }

    #[test]
    fn only_crawl_id_restricts_root() {
        let mut doc = Document::parse_fragment(r#"<p>:)</p><div id="here">:)</div>"#);
        let mut config = EmojifyConfig::default();
        config.merge(ConfigUpdate::default().only_crawl_id(Some("here")));
        assert_eq!(run(&mut doc, None, &config, NameWhitelist::bundled()), Ok(1));
        let here = doc.element_by_id("here").unwrap();
        assert_eq!(doc.elements_by_class(here, "emoji").len(), 1);

        config.merge(ConfigUpdate::default().only_crawl_id(Some("gone")));
        assert_eq!(
            run(&mut doc, None, &config, NameWhitelist::bundled()),
            Err(DomError::MissingRoot("gone".into()))
        );
    }

    #[test]
    fn explicit_root_beats_only_crawl_id() {
        let mut doc = Document::parse_fragment(r#"<p id="a">:)</p><p id="b">:)</p>"#);
        let mut config = EmojifyConfig::default();
        config.merge(ConfigUpdate::default().only_crawl_id(Some("a")));
        let b = doc.element_by_id("b").unwrap();
        assert_eq!(run(&mut doc, Some(b), &config, NameWhitelist::bundled()), Ok(1));
        assert_eq!(doc.elements_by_class(b, "emoji").len(), 1);
    }

    #[test]
    fn replacer_element_replaces_fragment() {
        let mut doc = Document::parse_fragment("<p>x :) y</p>");
        let replacer = |doc: &mut Document, raw: &str, name: &str| {
            let el = doc.create_element("i");
            let text = doc.create_text(format!("{raw}={name}"));
            let _ = doc.append_child(el, text);
            el
        };
        run_with(
            &mut doc,
            None,
            &EmojifyConfig::default(),
            NameWhitelist::bundled(),
            &replacer,
        )
        .unwrap();
        assert_eq!(doc.inner_html(doc.body()), "<p>x <i>:)=smile</i> y</p>");
    }

    #[test]
    fn running_twice_is_not_idempotent_for_text_children() {
        // Default elements keep the matched text, so a second pass finds it
        // again unless the emoji class is blacklisted.
        let mut doc = Document::parse_fragment(":)");
        let config = EmojifyConfig::default();
        run(&mut doc, None, &config, NameWhitelist::bundled()).unwrap();
        run(&mut doc, None, &config, NameWhitelist::bundled()).unwrap();
        assert_eq!(doc.elements_by_class(doc.body(), "emoji").len(), 2);
    }
}
