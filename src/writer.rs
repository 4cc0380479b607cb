use std::{
    fs,
    io::{self, BufRead, Write},
    path::Path,
};

use anyhow::{Context, Result};

use crate::{render::RenderedTree, status};

/// Source of interactive answers.
pub trait Prompt {
    fn ask(&mut self, question: &str) -> Result<String>;
}

/// Blocking line read from standard input.
pub struct StdinPrompt;

impl Prompt for StdinPrompt {
    fn ask(&mut self, question: &str) -> Result<String> {
        print!("{question}");
        io::stdout().flush().context("flushing stdout")?;
        let mut line = String::new();
        io::stdin()
            .lock()
            .read_line(&mut line)
            .context("reading answer from stdin")?;
        Ok(line)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Create,
    Overwrite,
    Skip,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteReport {
    pub path: String,
    pub action: Action,
}

/// Paths from `tree` that already exist under `root`.
pub fn collisions(root: &Path, tree: &RenderedTree) -> Vec<String> {
    tree.keys()
        .filter(|rel| root.join(rel).exists())
        .cloned()
        .collect()
}

pub fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

/// One yes/no question covering every existing target. No question is asked
/// when nothing collides.
pub fn confirm_overwrite(
    root: &Path,
    tree: &RenderedTree,
    prompt: &mut dyn Prompt,
) -> Result<bool> {
    let existing = collisions(root, tree);
    if existing.is_empty() {
        return Ok(true);
    }

    status::warn("Some files already exist:");
    for path in &existing {
        println!("  - {path}");
    }
    let answer = prompt.ask("Overwrite them? (y/N) ")?;
    Ok(is_yes(&answer))
}

pub fn plan(root: &Path, tree: &RenderedTree, force: bool) -> Vec<WriteReport> {
    tree.keys()
        .map(|rel| {
            let action = match (root.join(rel).exists(), force) {
                (false, _) => Action::Create,
                (true, true) => Action::Overwrite,
                (true, false) => Action::Skip,
            };
            WriteReport {
                path: rel.clone(),
                action,
            }
        })
        .collect()
}

/// Write every file of `tree` under `root`. Existing files are skipped unless
/// `force` is set.
pub fn write_tree(root: &Path, tree: &RenderedTree, force: bool) -> Result<Vec<WriteReport>> {
    let reports = plan(root, tree, force);
    for report in &reports {
        let target = root.join(&report.path);
        match report.action {
            Action::Skip => {
                tracing::debug!(path = %report.path, "exists, skipping");
            }
            Action::Create | Action::Overwrite => {
                ensure_parent(&target)?;
                fs::write(&target, &tree[&report.path])
                    .with_context(|| format!("writing {}", target.display()))?;
            }
        }
        announce(report);
    }
    Ok(reports)
}

fn ensure_parent(target: &Path) -> Result<()> {
    let Some(parent) = target.parent() else {
        return Ok(());
    };
    if !parent.exists() {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating directory {}", parent.display()))?;
        status::ok(&format!("+ dir  {}", parent.display()));
    }
    Ok(())
}

fn announce(report: &WriteReport) {
    match report.action {
        Action::Create => status::ok(&format!("+ file {}", report.path)),
        Action::Overwrite => status::ok(&format!("± file {}", report.path)),
        Action::Skip => status::warn(&format!("~ skip {} (exists)", report.path)),
    }
}

/// Same report as `write_tree` without touching the filesystem.
pub fn preview(root: &Path, tree: &RenderedTree, force: bool) -> Vec<WriteReport> {
    let reports = plan(root, tree, force);
    for report in &reports {
        let verb = match report.action {
            Action::Create => "would create",
            Action::Overwrite => "would overwrite",
            Action::Skip => "would skip",
        };
        status::info(&format!("{verb} {}", report.path));
    }
    reports
}
