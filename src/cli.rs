use std::{path::PathBuf, sync::OnceLock};

use clap::Parser;
use indexmap::IndexMap;
use regex::Regex;

pub const DEFAULT_STYLESHEET: &str = "src/styles/tailwind.css";
pub const DEFAULT_CONFIG: &str = "theme.meta.json";

/// Scaffold CLI entrypoint.
///
/// Flags are captured raw and interpreted by [`parse_flags`], so unknown
/// flags pass through without error.
#[derive(Parser, Debug)]
#[command(
    name = "scaffold",
    version,
    about = "Generate a themed Astro + Tailwind starter tree",
    after_help = "Flags: --yes --force --name=<title> --path=<css> --no-postcss \
                  --config=<file> --show --dry-run --verbose"
)]
pub struct Cli {
    /// Flags of the form --key or --key=value.
    #[arg(
        value_name = "FLAG",
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    pub flags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptValue {
    Flag,
    Value(String),
}

/// Flat flag map, immutable once parsed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Options {
    entries: IndexMap<String, OptValue>,
}

impl Options {
    pub fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn get(&self, key: &str) -> Option<&OptValue> {
        self.entries.get(key)
    }

    /// String value of `--key=value`; bare flags and empty values yield `None`.
    pub fn value(&self, key: &str) -> Option<&str> {
        match self.get(key) {
            Some(OptValue::Value(v)) if !v.is_empty() => Some(v.as_str()),
            _ => None,
        }
    }
}

fn flag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^--([^=]+)(?:=(.*))?$").expect("static regex"))
}

pub fn parse_flags<I, S>(args: I) -> Options
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut entries = IndexMap::new();
    for arg in args {
        let arg = arg.as_ref();
        match flag_re().captures(arg) {
            Some(caps) => {
                let value = match caps.get(2) {
                    Some(v) => OptValue::Value(v.as_str().to_string()),
                    None => OptValue::Flag,
                };
                entries.insert(caps[1].to_string(), value);
            }
            None => {
                entries.insert(arg.to_string(), OptValue::Flag);
            }
        }
    }
    Options { entries }
}

/// Typed view over the flags the scaffolder understands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub yes: bool,
    pub force: bool,
    pub name: Option<String>,
    pub stylesheet: String,
    pub postcss: bool,
    pub config: PathBuf,
    pub show: bool,
    pub dry_run: bool,
    pub verbose: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Settings::from_options(&Options::default())
    }
}

impl Settings {
    pub fn from_options(opts: &Options) -> Self {
        Settings {
            yes: opts.has("yes"),
            force: opts.has("force"),
            name: opts.value("name").map(str::to_string),
            stylesheet: opts.value("path").unwrap_or(DEFAULT_STYLESHEET).to_string(),
            postcss: !opts.has("no-postcss"),
            config: PathBuf::from(opts.value("config").unwrap_or(DEFAULT_CONFIG)),
            show: opts.has("show"),
            dry_run: opts.has("dry-run"),
            verbose: opts.has("verbose"),
        }
    }
}
