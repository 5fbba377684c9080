use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use env_logger::Env;
use log::debug;

use emojify::{ConfigUpdate, Document, Emojify, EmojifyConfig, Mode};

/// Replace emoticons and :named: emoji with image or sprite markup.
#[derive(Debug, Parser)]
#[command(name = "emojify", version)]
struct Args {
    /// Input file; stdin when omitted.
    file: Option<PathBuf>,

    /// YAML configuration file.
    #[arg(long, default_value = "emojify.yml")]
    config: PathBuf,

    /// Rendering mode: img, sprite or data-uri.
    #[arg(long)]
    mode: Option<Mode>,

    /// Base path for image URLs.
    #[arg(long)]
    img_dir: Option<String>,

    /// Element tag overriding the one implied by the mode.
    #[arg(long)]
    tag_type: Option<String>,

    /// Only replace :named: emoji, :+1: and :-1:.
    #[arg(long)]
    ignore_emoticons: bool,

    /// Treat the input as an HTML fragment and honor the blacklist.
    #[arg(long)]
    html: bool,

    /// Print the known emoji names and exit.
    #[arg(long)]
    names: bool,
}

impl Args {
    fn config_update(&self) -> ConfigUpdate {
        let mut update = ConfigUpdate::default();
        if let Some(mode) = self.mode {
            update = update.mode(mode);
        }
        if let Some(img_dir) = &self.img_dir {
            update = update.img_dir(img_dir.as_str());
        }
        if let Some(tag_type) = &self.tag_type {
            update = update.tag_type(Some(tag_type.as_str()));
        }
        if self.ignore_emoticons {
            update = update.ignore_emoticons(true);
        }
        update
    }
}

fn main() -> Result<()> {
    env_logger::init_from_env(Env::default().default_filter_or("warn"));
    let args = Args::parse();

    let mut emojify = Emojify::new(EmojifyConfig::load(Some(&args.config)));
    emojify.set_config(args.config_update());
    debug!("using config {:?}", emojify.config());

    let stdout = io::stdout();
    let mut out = stdout.lock();

    if args.names {
        for name in emojify.emoji_names() {
            writeln!(out, "{name}")?;
        }
        return Ok(());
    }

    let input = match &args.file {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("reading input at {}", path.display()))?,
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("reading stdin")?;
            buf
        }
    };

    let output = if args.html {
        let mut doc = Document::parse_fragment(&input);
        emojify.run(&mut doc, None)?;
        doc.inner_html(doc.body())
    } else {
        emojify.replace(&input)
    };

    out.write_all(output.as_bytes())?;
    out.flush()?;
    Ok(())
}
