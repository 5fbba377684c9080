use super::config::EmojifyConfig;
use super::dom::{Document, NodeId, Result};

/// Caller-supplied markup for an accepted match in string mode.
pub trait Replacer {
    fn replace(&self, raw: &str, name: &str) -> String;
}

impl<F> Replacer for F
where
    F: Fn(&str, &str) -> String,
{
    fn replace(&self, raw: &str, name: &str) -> String {
        self(raw, name)
    }
}

/// Caller-supplied element for an accepted match in DOM mode. The returned
/// node is inserted as is.
pub trait ElementReplacer {
    fn build(&self, doc: &mut Document, raw: &str, name: &str) -> NodeId;
}

impl<F> ElementReplacer for F
where
    F: Fn(&mut Document, &str, &str) -> NodeId,
{
    fn build(&self, doc: &mut Document, raw: &str, name: &str) -> NodeId {
        self(doc, raw, name)
    }
}

fn img_src(config: &EmojifyConfig, name: &str) -> String {
    format!("{}/{}.png", config.img_dir, name)
}

/// Default markup for an accepted emoji.
pub fn render_markup(config: &EmojifyConfig, name: &str) -> String {
    match config.element_tag() {
        "img" => format!(
            "<img align='absmiddle' alt=':{name}:' class='emoji' src='{src}' title=':{name}:' />",
            src = img_src(config, name),
        ),
        tag => format!("<{tag} class='emoji emoji-{name}' title=':{name}:'></{tag}>"),
    }
}

/// Default element for an accepted emoji, created detached and childless.
pub fn build_element(doc: &mut Document, config: &EmojifyConfig, name: &str) -> Result<NodeId> {
    let tag = config.element_tag();
    let el = doc.create_element(tag);
    let title = format!(":{name}:");

    if tag == "img" {
        doc.set_attribute(el, "align", "absmiddle")?;
        doc.set_attribute(el, "alt", title.as_str())?;
        doc.set_attribute(el, "class", "emoji")?;
        doc.set_attribute(el, "src", img_src(config, name))?;
    } else {
        doc.set_attribute(el, "class", format!("emoji emoji-{name}"))?;
    }
    doc.set_attribute(el, "title", title)?;
    Ok(el)
}
