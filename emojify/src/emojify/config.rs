use std::fmt;
use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use confik::{Configuration, EnvSource};
use serde::{Deserialize, Deserializer, Serialize};

use self::sources::{DefaultsSource, YamlFileSource};

/// Rendering strategy for replacement elements.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Configuration)]
#[serde(rename_all = "kebab-case")]
#[confik(forward(serde(rename_all = "kebab-case")))]
pub enum Mode {
    /// `<img>` pointing at `{img_dir}/{name}.png`.
    #[default]
    Img,
    /// `<span>` styled by a sprite sheet keyed on `emoji-{name}`.
    Sprite,
    /// `<span>` styled by a data-URI stylesheet keyed on `emoji-{name}`.
    DataUri,
}

impl Mode {
    /// Element tag used when no explicit `tag_type` is configured.
    pub fn tag(self) -> &'static str {
        match self {
            Mode::Img => "img",
            Mode::Sprite | Mode::DataUri => "span",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Img => "img",
            Mode::Sprite => "sprite",
            Mode::DataUri => "data-uri",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown mode `{0}`, expected one of img, sprite, data-uri")]
pub struct UnknownMode(String);

impl FromStr for Mode {
    type Err = UnknownMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "img" | "image" => Ok(Mode::Img),
            "sprite" => Ok(Mode::Sprite),
            "data-uri" => Ok(Mode::DataUri),
            _ => Err(UnknownMode(s.to_string())),
        }
    }
}

/// Regions of a tree the DOM walk never scans.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Configuration)]
pub struct Blacklist {
    #[serde(default)]
    pub ids: Vec<String>,
    #[serde(default)]
    pub classes: Vec<String>,
    #[serde(default)]
    pub elements: Vec<String>,
}

impl Default for Blacklist {
    fn default() -> Self {
        Self {
            ids: vec![],
            classes: vec!["no-emojify".into()],
            elements: vec![
                "script".into(),
                "textarea".into(),
                "a".into(),
                "pre".into(),
                "code".into(),
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Configuration)]
pub struct EmojifyConfig {
    pub blacklist: Blacklist,
    /// Element tag overriding the one implied by `mode`.
    pub tag_type: Option<String>,
    /// Id of the only element `run` crawls when no root is passed.
    pub only_crawl_id: Option<String>,
    pub img_dir: String,
    /// Keep only `:name:`, `:+1:` and `:-1:` active.
    pub ignore_emoticons: bool,
    pub mode: Mode,
}

impl Default for EmojifyConfig {
    fn default() -> Self {
        Self {
            blacklist: Blacklist::default(),
            tag_type: None,
            only_crawl_id: None,
            img_dir: "images/emoji".into(),
            ignore_emoticons: false,
            mode: Mode::Img,
        }
    }
}

impl EmojifyConfig {
    /// Load configuration from compiled-in defaults, then `path` (if present),
    /// then environment variables. Falls back to the defaults when parsing fails.
    pub fn load(path: Option<&Path>) -> Self {
        let mut builder = EmojifyConfig::builder();
        builder.override_with(DefaultsSource::new(EmojifyConfig::default()));

        if let Some(path) = path.filter(|p| p.exists()) {
            builder.override_with(YamlFileSource::new(path));
        }

        builder.override_with(EnvSource::new());

        match builder.try_build() {
            Ok(cfg) => cfg,
            Err(err) => {
                log::warn!("Failed to load emojify config or env overrides: {err}. Using defaults.");
                EmojifyConfig::default()
            }
        }
    }

    /// Shallow-merge a partial update. Fields absent from `update` keep their
    /// current value.
    pub fn merge(&mut self, update: ConfigUpdate) {
        let ConfigUpdate {
            blacklist,
            tag_type,
            only_crawl_id,
            img_dir,
            ignore_emoticons,
            mode,
        } = update;

        if let Some(blacklist) = blacklist {
            self.blacklist = blacklist;
        }
        if let Some(tag_type) = tag_type {
            self.tag_type = tag_type;
        }
        if let Some(only_crawl_id) = only_crawl_id {
            self.only_crawl_id = only_crawl_id;
        }
        if let Some(img_dir) = img_dir {
            self.img_dir = img_dir;
        }
        if let Some(ignore_emoticons) = ignore_emoticons {
            self.ignore_emoticons = ignore_emoticons;
        }
        if let Some(mode) = mode {
            self.mode = mode;
        }
    }

    /// Tag of the element a default replacement produces.
    pub fn element_tag(&self) -> &str {
        self.tag_type
            .as_deref()
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| self.mode.tag())
    }
}

/// Partial configuration accepted by `set_config`.
///
/// Unknown fields are ignored. For `tag_type` and `only_crawl_id` an explicit
/// `null` clears the value while a missing field leaves it alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ConfigUpdate {
    #[serde(default)]
    pub blacklist: Option<Blacklist>,
    #[serde(default, deserialize_with = "present")]
    pub tag_type: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub only_crawl_id: Option<Option<String>>,
    #[serde(default)]
    pub img_dir: Option<String>,
    #[serde(default)]
    pub ignore_emoticons: Option<bool>,
    #[serde(default)]
    pub mode: Option<Mode>,
}

impl ConfigUpdate {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("parsing emojify config update")
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).context("parsing emojify config update")
    }

    pub fn mode(mut self, mode: Mode) -> Self {
        self.mode = Some(mode);
        self
    }

    pub fn tag_type(mut self, tag_type: Option<&str>) -> Self {
        self.tag_type = Some(tag_type.map(str::to_string));
        self
    }

    pub fn img_dir(mut self, img_dir: impl Into<String>) -> Self {
        self.img_dir = Some(img_dir.into());
        self
    }

    pub fn ignore_emoticons(mut self, ignore: bool) -> Self {
        self.ignore_emoticons = Some(ignore);
        self
    }

    pub fn only_crawl_id(mut self, id: Option<&str>) -> Self {
        self.only_crawl_id = Some(id.map(str::to_string));
        self
    }

    pub fn blacklist(mut self, blacklist: Blacklist) -> Self {
        self.blacklist = Some(blacklist);
        self
    }
}

/// Marks a field as present even when its value is `null`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

mod sources {
    use std::error::Error;
    use std::path::PathBuf;

    use confik::Source;
    use serde::Serialize;
    use serde::de::DeserializeOwned;

    /// Feeds a fully populated value into the builder so that file and env
    /// sources only need to carry the fields they change.
    #[derive(Debug)]
    pub struct DefaultsSource<C> {
        value: C,
    }

    impl<C> DefaultsSource<C> {
        pub fn new(value: C) -> Self {
            Self { value }
        }
    }

    impl<C, T> Source<T> for DefaultsSource<C>
    where
        C: Serialize + std::fmt::Debug + Clone,
        T: DeserializeOwned + confik::ConfigurationBuilder,
    {
        fn allows_secrets(&self) -> bool {
            false
        }

        fn provide(&self) -> Result<T, Box<dyn Error + Sync + Send>> {
            let value = serde_json::to_value(&self.value)?;
            Ok(serde_json::from_value(value)?)
        }
    }

    #[derive(Debug)]
    pub struct YamlFileSource {
        path: PathBuf,
    }

    impl YamlFileSource {
        pub fn new(path: impl Into<PathBuf>) -> Self {
            Self { path: path.into() }
        }
    }

    impl<T> Source<T> for YamlFileSource
    where
        T: DeserializeOwned + confik::ConfigurationBuilder,
    {
        fn allows_secrets(&self) -> bool {
            false
        }

        fn provide(&self) -> Result<T, Box<dyn Error + Sync + Send>> {
            let contents = std::fs::read_to_string(&self.path)?;
            let parsed = serde_yaml::from_str(&contents)?;
            Ok(parsed)
        }
    }
}
