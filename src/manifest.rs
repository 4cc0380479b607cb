use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use serde_json::{Map, Value};

pub const MANIFEST_FILE: &str = "package.json";
pub const STYLING_DEPENDENCY: &str = "tailwindcss";
pub const INSTALL_HINT: &str = "pnpm add -D tailwindcss @tailwindcss/vite autoprefixer";

/// Dependency tables of `package.json`; everything else is ignored.
#[derive(Debug, Default, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub dependencies: Option<Map<String, Value>>,
    #[serde(default, rename = "devDependencies")]
    pub dev_dependencies: Option<Map<String, Value>>,
}

impl Manifest {
    pub fn has_dependency(&self, name: &str) -> bool {
        [&self.dependencies, &self.dev_dependencies]
            .into_iter()
            .flatten()
            .any(|deps| deps.contains_key(name))
    }
}

pub fn manifest_path(root: &Path) -> PathBuf {
    root.join(MANIFEST_FILE)
}

/// The manifest marks the project root; refuse to run without one.
pub fn require_manifest(root: &Path) -> Result<PathBuf> {
    let path = manifest_path(root);
    if !path.is_file() {
        bail!(
            "{MANIFEST_FILE} not found in {}; run this from the project root",
            root.display()
        );
    }
    Ok(path)
}

pub fn load_manifest(path: &Path) -> Result<Manifest> {
    let raw =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing JSON {}", path.display()))
}

pub fn has_styling_dependency(path: &Path) -> Result<bool> {
    Ok(load_manifest(path)?.has_dependency(STYLING_DEPENDENCY))
}
