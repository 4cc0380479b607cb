use std::path::Path;

use anyhow::Result;

use crate::{
    cli::Settings,
    manifest::{self, INSTALL_HINT, MANIFEST_FILE},
    render, show, status,
    theme::{self, ThemeSource},
    writer::{self, Prompt},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Completed,
    Cancelled,
    Shown,
    DryRun,
}

/// One scaffolding pass over the project rooted at `root`.
///
/// Nothing is written before the overwrite confirmation is answered.
pub fn run(root: &Path, settings: &Settings, prompt: &mut dyn Prompt) -> Result<RunStatus> {
    let manifest_path = manifest::require_manifest(root)?;

    let resolution = theme::resolve_theme(root, &settings.config, Path::new(MANIFEST_FILE));
    if let ThemeSource::Fallback { path, reason } = &resolution.source {
        status::warn(&format!(
            "Ignoring theme from {} ({reason}); using defaults.",
            path.display()
        ));
    }
    theme::validate_complete(&resolution.theme)?;

    if settings.show {
        show::print_theme(
            &resolution,
            render::display_name(&resolution.theme, settings),
        );
        return Ok(RunStatus::Shown);
    }

    let tree = render::render_tree(&resolution.theme, settings)?;

    if settings.dry_run {
        writer::preview(root, &tree, settings.force);
        return Ok(RunStatus::DryRun);
    }

    if !settings.yes && !writer::confirm_overwrite(root, &tree, prompt)? {
        status::warn("Operation cancelled.");
        return Ok(RunStatus::Cancelled);
    }

    writer::write_tree(root, &tree, settings.force)?;
    advise_styling_dependency(&manifest_path);

    status::ok("Scaffold complete. Run: pnpm dev");
    Ok(RunStatus::Completed)
}

fn advise_styling_dependency(manifest_path: &Path) {
    match manifest::has_styling_dependency(manifest_path) {
        Ok(true) => {}
        Ok(false) => {
            status::warn("Tailwind is not in your dependencies. Install it with:");
            println!("   {INSTALL_HINT}");
        }
        Err(err) => tracing::warn!("skipping dependency check: {err:#}"),
    }
}
