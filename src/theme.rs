use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, bail};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Token name -> color literal, in emission order.
pub type Tokens = IndexMap<String, String>;

/// Core tokens every consumer can rely on, in emission order.
pub const CORE_TOKENS: [&str; 6] = [
    "bg",
    "fg",
    "primary",
    "primary-foreground",
    "muted",
    "border",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeConfig {
    pub name: String,
    pub description: String,
    pub colors: ColorMap,
}

/// Light tokens plus the dark-mode overrides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorMap {
    pub tokens: Tokens,
    pub dark: Tokens,
}

/// User-supplied theme metadata; every field may be omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ThemeOverrides {
    pub name: Option<String>,
    pub description: Option<String>,
    pub colors: Option<ColorOverrides>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColorOverrides {
    pub dark: Option<Tokens>,
    pub tokens: Tokens,
}

/// Colors are merged by shape only: scalar values are stringified, and
/// nested or null values are dropped rather than rejecting the whole file.
impl<'de> Deserialize<'de> for ColorOverrides {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let mut raw = IndexMap::<String, Value>::deserialize(deserializer)?;
        let dark = match raw.shift_remove("dark") {
            Some(Value::Object(map)) => Some(scalar_tokens("colors.dark", map)),
            Some(Value::Null) | None => None,
            Some(other) => {
                tracing::warn!("ignoring colors.dark: expected a table, got {other}");
                None
            }
        };
        Ok(ColorOverrides {
            dark,
            tokens: scalar_tokens("colors", raw),
        })
    }
}

fn scalar_tokens(section: &str, raw: impl IntoIterator<Item = (String, Value)>) -> Tokens {
    raw.into_iter()
        .filter_map(|(key, value)| match value {
            Value::String(s) => Some((key, s)),
            Value::Number(n) => Some((key, n.to_string())),
            Value::Bool(b) => Some((key, b.to_string())),
            other => {
                tracing::warn!("ignoring {section}.{key}: not a color literal ({other})");
                None
            }
        })
        .collect()
}

/// Theme with every default token present in both palettes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedTheme {
    pub name: String,
    pub description: String,
    pub light: Tokens,
    pub dark: Tokens,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThemeSource {
    ConfigFile(PathBuf),
    Manifest,
    Defaults,
    /// The theme input could not be used; defaults were applied instead.
    Fallback { path: PathBuf, reason: String },
}

#[derive(Debug, Clone)]
pub struct Resolution {
    pub theme: ResolvedTheme,
    pub source: ThemeSource,
}

pub fn default_theme() -> ThemeConfig {
    let tokens = |pairs: [(&str, &str); 6]| -> Tokens {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    };

    ThemeConfig {
        name: "Astro Theme Skeleton".to_string(),
        description: "A lean starter theme for Astro 5 and Tailwind CSS v4.".to_string(),
        colors: ColorMap {
            tokens: tokens([
                ("bg", "#ffffff"),
                ("fg", "#18181b"),
                ("primary", "#4f46e5"),
                ("primary-foreground", "#ffffff"),
                ("muted", "#f4f4f5"),
                ("border", "#e4e4e7"),
            ]),
            dark: tokens([
                ("bg", "#09090b"),
                ("fg", "#fafafa"),
                ("primary", "#818cf8"),
                ("primary-foreground", "#09090b"),
                ("muted", "#27272a"),
                ("border", "#27272a"),
            ]),
        },
    }
}

/// Overlay `top` onto `base` key by key; new keys keep their own order after base keys.
pub fn overlay(base: &Tokens, top: &Tokens) -> Tokens {
    let mut out = base.clone();
    for (k, v) in top {
        out.insert(k.clone(), v.clone());
    }
    out
}

/// Top level is shallow, `colors` is merged key-wise, `colors.dark` is replaced whole.
pub fn merge(defaults: &ThemeConfig, overrides: &ThemeOverrides) -> ThemeConfig {
    let colors = match &overrides.colors {
        Some(c) => ColorMap {
            tokens: overlay(&defaults.colors.tokens, &c.tokens),
            dark: c.dark.clone().unwrap_or_else(|| defaults.colors.dark.clone()),
        },
        None => defaults.colors.clone(),
    };

    ThemeConfig {
        name: overrides
            .name
            .clone()
            .unwrap_or_else(|| defaults.name.clone()),
        description: overrides
            .description
            .clone()
            .unwrap_or_else(|| defaults.description.clone()),
        colors,
    }
}

/// Dark palette inherits every light token it does not override.
pub fn derive_palettes(defaults: &ThemeConfig, merged: &ThemeConfig) -> ResolvedTheme {
    let light = overlay(&defaults.colors.tokens, &merged.colors.tokens);
    let dark = overlay(&light, &merged.colors.dark);
    ResolvedTheme {
        name: merged.name.clone(),
        description: merged.description.clone(),
        light,
        dark,
    }
}

pub fn resolve(overrides: &ThemeOverrides) -> ResolvedTheme {
    let defaults = default_theme();
    derive_palettes(&defaults, &merge(&defaults, overrides))
}

/// Parse a theme metadata file; `.toml` files are read as TOML, anything else as JSON.
pub fn load_overrides(path: &Path) -> Result<ThemeOverrides> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("reading theme file {}", path.display()))?;
    let is_toml = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
    if is_toml {
        toml::from_str(&raw).with_context(|| format!("parsing TOML {}", path.display()))
    } else {
        serde_json::from_str(&raw).with_context(|| format!("parsing JSON {}", path.display()))
    }
}

/// Embedded `theme` field of a manifest. `Ok(None)` when the field is absent
/// or not a key-value structure.
pub fn manifest_theme(manifest: &Value) -> Result<Option<ThemeOverrides>> {
    match manifest.get("theme") {
        Some(theme @ Value::Object(_)) => {
            let overrides = ThemeOverrides::deserialize(theme)
                .context("manifest `theme` field has an unexpected shape")?;
            Ok(Some(overrides))
        }
        _ => Ok(None),
    }
}

fn read_manifest(path: &Path) -> Result<Value> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("reading manifest {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing JSON {}", path.display()))
}

/// Resolve the theme for a project rooted at `root`.
///
/// Precedence: `config_path` (relative paths are taken from `root`), then the
/// manifest's `theme` field, then the built-in defaults. A malformed config
/// file falls back to defaults without consulting the manifest.
pub fn resolve_theme(root: &Path, config_path: &Path, manifest_path: &Path) -> Resolution {
    let config_path = root.join(config_path);
    if config_path.is_file() {
        return match load_overrides(&config_path) {
            Ok(overrides) => {
                tracing::debug!(path = %config_path.display(), "theme from config file");
                Resolution {
                    theme: resolve(&overrides),
                    source: ThemeSource::ConfigFile(config_path),
                }
            }
            Err(err) => {
                tracing::warn!(path = %config_path.display(), "unreadable theme config: {err:#}");
                Resolution {
                    theme: resolve(&ThemeOverrides::default()),
                    source: ThemeSource::Fallback {
                        path: config_path,
                        reason: format!("{err:#}"),
                    },
                }
            }
        };
    }

    let manifest_path = root.join(manifest_path);
    let embedded = match read_manifest(&manifest_path) {
        Ok(manifest) => manifest_theme(&manifest),
        Err(err) => {
            tracing::debug!("no usable manifest theme: {err:#}");
            Ok(None)
        }
    };

    match embedded {
        Ok(Some(overrides)) => {
            tracing::debug!(path = %manifest_path.display(), "theme from manifest");
            Resolution {
                theme: resolve(&overrides),
                source: ThemeSource::Manifest,
            }
        }
        Ok(None) => Resolution {
            theme: resolve(&ThemeOverrides::default()),
            source: ThemeSource::Defaults,
        },
        Err(err) => {
            tracing::warn!(path = %manifest_path.display(), "ignoring manifest theme: {err:#}");
            Resolution {
                theme: resolve(&ThemeOverrides::default()),
                source: ThemeSource::Fallback {
                    path: manifest_path,
                    reason: format!("{err:#}"),
                },
            }
        }
    }
}

/// Check the resolved palettes still carry every default token.
pub fn validate_complete(theme: &ResolvedTheme) -> Result<()> {
    let defaults = default_theme();
    for key in defaults.colors.tokens.keys() {
        if !theme.light.contains_key(key) {
            bail!("light palette is missing token {key}");
        }
        if !theme.dark.contains_key(key) {
            bail!("dark palette is missing token {key}");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn overrides(json: &str) -> ThemeOverrides {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn no_input_resolves_to_defaults_verbatim() {
        let defaults = default_theme();
        let resolved = resolve(&ThemeOverrides::default());
        assert_eq!(resolved.name, defaults.name);
        assert_eq!(resolved.description, defaults.description);
        assert_eq!(resolved.light, defaults.colors.tokens);
        assert_eq!(resolved.dark, overlay(&defaults.colors.tokens, &defaults.colors.dark));
        assert_eq!(merge(&defaults, &ThemeOverrides::default()), defaults);
    }

    #[test]
    fn single_color_override_keeps_other_defaults() {
        let defaults = default_theme();
        let resolved = resolve(&overrides(r##"{ "colors": { "primary": "#111111" } }"##));
        assert_eq!(resolved.light["primary"], "#111111");
        for (k, v) in &defaults.colors.tokens {
            if k != "primary" {
                assert_eq!(&resolved.light[k], v, "token {k} drifted");
            }
        }
    }

    #[test]
    fn partial_maps_always_resolve_complete() {
        let inputs = [
            r#"{}"#,
            r#"{ "colors": {} }"#,
            r##"{ "colors": { "bg": "#000000", "accent": "#ff00ff" } }"##,
            r##"{ "colors": { "dark": { "fg": "#eeeeee" } } }"##,
            r##"{ "name": "X", "colors": { "muted": "#999999", "dark": {} } }"##,
        ];
        for input in inputs {
            let resolved = resolve(&overrides(input));
            validate_complete(&resolved).unwrap_or_else(|err| panic!("{input}: {err}"));
        }
    }

    #[test]
    fn empty_dark_override_matches_light() {
        let resolved = resolve(&overrides(
            r##"{ "colors": { "primary": "#123456", "dark": {} } }"##,
        ));
        assert_eq!(resolved.dark, resolved.light);
    }

    #[test]
    fn dark_inherits_unoverridden_light_tokens() {
        let resolved = resolve(&overrides(
            r##"{ "colors": { "accent": "#ff00ff", "dark": { "bg": "#000000" } } }"##,
        ));
        assert_eq!(resolved.dark["bg"], "#000000");
        assert_eq!(resolved.dark["accent"], "#ff00ff");
        assert_eq!(resolved.dark["primary"], resolved.light["primary"]);
    }

    #[test]
    fn extra_tokens_follow_default_order() {
        let resolved = resolve(&overrides(r##"{ "colors": { "accent": "#ff00ff", "bg": "#000" } }"##));
        let keys: Vec<_> = resolved.light.keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            ["bg", "fg", "primary", "primary-foreground", "muted", "border", "accent"]
        );
    }

    #[test]
    fn non_string_colors_do_not_discard_the_file() {
        let parsed = overrides(
            r##"{ "name": "Kept", "colors": { "primary": 5, "bg": ["#000"], "fg": "#222222", "dark": { "muted": true } } }"##,
        );
        let resolved = resolve(&parsed);
        assert_eq!(resolved.name, "Kept");
        assert_eq!(resolved.light["primary"], "5");
        assert_eq!(resolved.light["bg"], default_theme().colors.tokens["bg"]);
        assert_eq!(resolved.light["fg"], "#222222");
        assert_eq!(resolved.dark["muted"], "true");
    }

    #[test]
    fn non_table_dark_is_ignored() {
        let parsed = overrides(r##"{ "colors": { "dark": "#000000" } }"##);
        assert_eq!(parsed.colors.unwrap().dark, None);
    }

    #[test]
    fn manifest_theme_requires_object() {
        let manifest: Value = serde_json::from_str(r#"{ "theme": "dark" }"#).unwrap();
        assert_eq!(manifest_theme(&manifest).unwrap(), None);

        let manifest: Value = serde_json::from_str(r#"{ "theme": { "name": "Pkg" } }"#).unwrap();
        let found = manifest_theme(&manifest).unwrap().unwrap();
        assert_eq!(found.name.as_deref(), Some("Pkg"));

        let manifest: Value = serde_json::from_str(r#"{ "theme": { "colors": 3 } }"#).unwrap();
        assert!(manifest_theme(&manifest).is_err());
    }

    #[test]
    fn config_file_wins_over_manifest() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("theme.meta.json"), r#"{ "name": "From Config" }"#).unwrap();
        fs::write(
            dir.path().join("package.json"),
            r#"{ "theme": { "name": "From Manifest" } }"#,
        )
        .unwrap();

        let res = resolve_theme(dir.path(), Path::new("theme.meta.json"), Path::new("package.json"));
        assert_eq!(res.theme.name, "From Config");
        assert!(matches!(res.source, ThemeSource::ConfigFile(_)));
    }

    #[test]
    fn manifest_used_without_config_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("package.json"),
            r##"{ "name": "site", "theme": { "description": "Pkg desc", "colors": { "fg": "#222222" } } }"##,
        )
        .unwrap();

        let res = resolve_theme(dir.path(), Path::new("theme.meta.json"), Path::new("package.json"));
        assert_eq!(res.source, ThemeSource::Manifest);
        assert_eq!(res.theme.description, "Pkg desc");
        assert_eq!(res.theme.name, default_theme().name);
        assert_eq!(res.theme.light["fg"], "#222222");
    }

    #[test]
    fn malformed_config_falls_back_to_defaults_only() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("theme.meta.json"), "{ not json").unwrap();
        fs::write(
            dir.path().join("package.json"),
            r#"{ "theme": { "name": "From Manifest" } }"#,
        )
        .unwrap();

        let res = resolve_theme(dir.path(), Path::new("theme.meta.json"), Path::new("package.json"));
        assert_eq!(res.theme, resolve(&ThemeOverrides::default()));
        match res.source {
            ThemeSource::Fallback { reason, .. } => {
                assert!(reason.contains("parsing JSON"), "unexpected reason: {reason}")
            }
            other => panic!("expected fallback, got {other:?}"),
        }
    }

    #[test]
    fn missing_everything_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let res = resolve_theme(dir.path(), Path::new("theme.meta.json"), Path::new("package.json"));
        assert_eq!(res.source, ThemeSource::Defaults);
        assert_eq!(res.theme, resolve(&ThemeOverrides::default()));
    }

    #[test]
    fn toml_config_is_supported() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("theme.toml"),
            "name = \"Toml Theme\"\n\n[colors]\nprimary = \"#abcdef\"\n\n[colors.dark]\nprimary = \"#010101\"\n",
        )
        .unwrap();

        let res = resolve_theme(dir.path(), Path::new("theme.toml"), Path::new("package.json"));
        assert_eq!(res.theme.name, "Toml Theme");
        assert_eq!(res.theme.light["primary"], "#abcdef");
        assert_eq!(res.theme.dark["primary"], "#010101");
        assert_eq!(res.theme.dark["bg"], res.theme.light["bg"]);
    }
}
