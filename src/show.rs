use crate::{
    render,
    theme::{Resolution, ThemeSource, Tokens},
};

pub fn print_theme(resolution: &Resolution, display_name: &str) {
    let theme = &resolution.theme;
    println!("Theme: {display_name}");
    println!("Description: {}", theme.description);
    println!("Source: {}", describe_source(&resolution.source));
    println!();

    let label_width = max_label_width(&theme.light, &theme.dark);
    print_section("Colors (Light)", &theme.light, label_width);
    print_section("Colors (Dark)", &theme.dark, label_width);

    println!("Stylesheet");
    print!("{}", render::stylesheet(theme));
}

pub fn describe_source(source: &ThemeSource) -> String {
    match source {
        ThemeSource::ConfigFile(path) => path.display().to_string(),
        ThemeSource::Manifest => "package.json `theme` field".to_string(),
        ThemeSource::Defaults => "built-in defaults".to_string(),
        ThemeSource::Fallback { path, .. } => {
            format!("built-in defaults ({} unusable)", path.display())
        }
    }
}

fn max_label_width(light: &Tokens, dark: &Tokens) -> usize {
    light
        .keys()
        .chain(dark.keys())
        .map(String::len)
        .max()
        .unwrap_or(0)
        .max(8)
}

fn print_section(title: &str, tokens: &Tokens, label_width: usize) {
    if tokens.is_empty() {
        return;
    }

    println!("{title}");
    println!(
        "{:<width$}  {:<6}  {}",
        "token",
        "swatch",
        "value",
        width = label_width
    );
    println!(
        "{:-<width$}  {:-<6}  {}",
        "",
        "",
        "-----",
        width = label_width
    );

    for (label, value) in tokens {
        println!(
            "{:<width$}  {}  {value}",
            label,
            swatch(value),
            width = label_width
        );
    }
    println!();
}

fn swatch(value: &str) -> String {
    if let Some((r, g, b)) = hex_to_rgb(value) {
        let luminance = (0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32) / 255.0;
        let text = if luminance < 0.5 { 255 } else { 0 };
        return format!("\u{1b}[48;2;{r};{g};{b}m\u{1b}[38;2;{text};{text};{text}m      \u{1b}[0m");
    }
    format!("{:<6}", "?")
}

/// `#rgb` or `#rrggbb`; anything else has no swatch.
fn hex_to_rgb(hex: &str) -> Option<(u8, u8, u8)> {
    let digits = hex.strip_prefix('#')?;
    if !digits.is_ascii() {
        return None;
    }
    match digits.len() {
        3 => {
            let channel = |i: usize| u8::from_str_radix(&digits[i..i + 1].repeat(2), 16).ok();
            Some((channel(0)?, channel(1)?, channel(2)?))
        }
        6 => {
            let r = u8::from_str_radix(&digits[0..2], 16).ok()?;
            let g = u8::from_str_radix(&digits[2..4], 16).ok()?;
            let b = u8::from_str_radix(&digits[4..6], 16).ok()?;
            Some((r, g, b))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_to_rgb() {
        assert_eq!(hex_to_rgb("#A1B2C3"), Some((0xA1, 0xB2, 0xC3)));
        assert_eq!(hex_to_rgb("#fff"), Some((255, 255, 255)));
        assert_eq!(hex_to_rgb("123456"), None);
        assert_eq!(hex_to_rgb("#ffff"), None);
        assert_eq!(hex_to_rgb("oklch(0.7 0.1 200)"), None);
    }

    #[test]
    fn non_hex_values_get_placeholder_swatch() {
        assert_eq!(swatch("hsl(0 0% 0%)"), "?     ");
        assert!(swatch("#000000").contains("48;2;0;0;0"));
    }
}
