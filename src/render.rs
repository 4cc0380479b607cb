use anyhow::{Context, Result, bail};
use indexmap::IndexMap;
use tera::{Context as TeraContext, Tera};

use crate::{
    cli::Settings,
    theme::{CORE_TOKENS, ResolvedTheme, Tokens},
};

pub const POSTCSS_TEMPLATE: &str = "postcss.config.cjs.tera";

/// Relative output path -> file content, in write order.
pub type RenderedTree = IndexMap<String, String>;

/// Embedded templates, named by their output path plus `.tera`.
const TEMPLATES: &[(&str, &str)] = &[
    (
        "src/components/Layout.astro.tera",
        include_str!("../templates/src/components/Layout.astro.tera"),
    ),
    (
        "src/pages/index.astro.tera",
        include_str!("../templates/src/pages/index.astro.tera"),
    ),
    (
        "src/pages/about.astro.tera",
        include_str!("../templates/src/pages/about.astro.tera"),
    ),
    (
        "astro.config.mjs.tera",
        include_str!("../templates/astro.config.mjs.tera"),
    ),
    (
        "tailwind.config.mjs.tera",
        include_str!("../templates/tailwind.config.mjs.tera"),
    ),
    (".gitignore.tera", include_str!("../templates/.gitignore.tera")),
    (
        "tsconfig.build.json.tera",
        include_str!("../templates/tsconfig.build.json.tera"),
    ),
    ("README.md.tera", include_str!("../templates/README.md.tera")),
    (
        POSTCSS_TEMPLATE,
        include_str!("../templates/postcss.config.cjs.tera"),
    ),
];

/// Render every generated file for `theme`. Pure: no filesystem access.
pub fn render_tree(theme: &ResolvedTheme, settings: &Settings) -> Result<RenderedTree> {
    let stylesheet_path = relative_output_path(&settings.stylesheet)?;
    let ctx = build_context(theme, settings)?;
    let tera = build_tera()?;

    let mut tree = RenderedTree::new();
    tree.insert(stylesheet_path, stylesheet(theme));

    for (name, _) in TEMPLATES {
        if *name == POSTCSS_TEMPLATE && !settings.postcss {
            continue;
        }
        let rendered = tera
            .render(name, &ctx)
            .with_context(|| format!("rendering template {name}"))?;
        let out = strip_tera_extension(name);
        if tree.contains_key(out) {
            bail!("stylesheet path {out} collides with a generated file; pick another --path");
        }
        tree.insert(out.to_string(), rendered);
    }

    Ok(tree)
}

fn build_tera() -> Result<Tera> {
    let mut tera = Tera::default();
    tera.add_raw_templates(TEMPLATES.iter().copied())
        .context("registering embedded templates")?;
    tera.autoescape_on(vec![]);
    Ok(tera)
}

fn build_context(theme: &ResolvedTheme, settings: &Settings) -> Result<TeraContext> {
    let mut ctx = TeraContext::new();
    ctx.try_insert("name", display_name(theme, settings))?;
    ctx.try_insert("description", &theme.description)?;
    ctx.try_insert("light", &theme.light)?;
    ctx.try_insert("dark", &theme.dark)?;
    ctx.try_insert("stylesheet_path", &relative_output_path(&settings.stylesheet)?)?;
    ctx.try_insert("stylesheet_href", &stylesheet_href(&settings.stylesheet))?;
    Ok(ctx)
}

/// `--name` wins over the theme's own name for rendered output only.
pub fn display_name<'a>(theme: &'a ResolvedTheme, settings: &'a Settings) -> &'a str {
    settings.name.as_deref().unwrap_or(&theme.name)
}

fn strip_tera_extension(name: &str) -> &str {
    name.strip_suffix(".tera").unwrap_or(name)
}

fn normalize_separators(path: &str) -> String {
    path.replace('\\', "/")
}

fn trim_root(path: &str) -> String {
    normalize_separators(path).trim_start_matches('/').to_string()
}

/// Output key for a user-supplied path, always relative to the project root.
pub fn relative_output_path(path: &str) -> Result<String> {
    let rel = trim_root(path);
    if rel.is_empty() || rel.split('/').any(|part| part == "..") {
        bail!("output path {path} must stay inside the project root");
    }
    Ok(rel)
}

/// Site-absolute link target for the stylesheet.
pub fn stylesheet_href(path: &str) -> String {
    format!("/{}", trim_root(path))
}

/// Tailwind entry point followed by the light, dark, and legacy variable blocks.
pub fn stylesheet(theme: &ResolvedTheme) -> String {
    let mut out = String::from("@import \"tailwindcss\";\n\n");
    out.push_str(&css_block(":root", "color-", &theme.light));
    out.push('\n');
    out.push_str(&css_block(
        ":root.dark,\n:root[data-theme=\"dark\"]",
        "color-",
        &theme.dark,
    ));
    out.push('\n');
    out.push_str("/* Unprefixed core tokens for consumers that only read :root. */\n");
    out.push_str(&legacy_block(&theme.light));
    out
}

/// One `--<prefix><key>: <value>;` line per token inside `selector { ... }`.
pub fn css_block(selector: &str, prefix: &str, tokens: &Tokens) -> String {
    let mut out = format!("{selector} {{\n");
    for (key, value) in tokens {
        out.push_str(&format!("  --{prefix}{key}: {value};\n"));
    }
    out.push_str("}\n");
    out
}

pub fn legacy_block(light: &Tokens) -> String {
    let core: Tokens = CORE_TOKENS
        .iter()
        .filter_map(|key| light.get(*key).map(|v| (key.to_string(), v.clone())))
        .collect();
    css_block(":root", "", &core)
}
