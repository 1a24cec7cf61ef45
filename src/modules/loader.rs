// src/modules/loader.rs
use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use glob::{glob, Pattern};
use log::{debug, info, warn};
use crate::modules::definition::{DeclarativeModule, ModuleDefinition};
use crate::modules::registry::{self, ModuleRegistry};

/// Discovers declarative modules and registers them. Directories are walked
/// in order, so a later directory overrides modules with the same ID.
#[derive(Debug, Clone)]
pub struct Loader {
    builtin_dir: PathBuf,
    user_dir: Option<PathBuf>,
    extra_dirs: Vec<PathBuf>,
    loaded: usize,
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

impl Loader {
    /// Built-in modules sit next to the executable (`./modules` during
    /// development); user modules live under the platform config dir.
    pub fn new() -> Self {
        Self::with_dirs(default_builtin_dir(), dirs::config_dir().map(|d| d.join("sif").join("modules")))
    }

    pub fn with_dirs(builtin_dir: impl Into<PathBuf>, user_dir: Option<PathBuf>) -> Self {
        Self {
            builtin_dir: builtin_dir.into(),
            user_dir,
            extra_dirs: Vec::new(),
            loaded: 0,
        }
    }

    /// Adds a directory walked after the user directory.
    pub fn add_dir(&mut self, dir: impl Into<PathBuf>) -> &mut Self {
        self.extra_dirs.push(dir.into());
        self
    }

    pub fn builtin_dir(&self) -> &Path {
        &self.builtin_dir
    }

    pub fn user_dir(&self) -> Option<&Path> {
        self.user_dir.as_deref()
    }

    /// Definitions registered by the last `load_all*` call, overrides included.
    pub fn loaded(&self) -> usize {
        self.loaded
    }

    /// Loads into the process-wide registry.
    pub fn load_all(&mut self) -> usize {
        self.load_all_into(registry::global())
    }

    pub fn load_all_into(&mut self, registry: &ModuleRegistry) -> usize {
        let mut dirs = vec![self.builtin_dir.clone()];
        dirs.extend(self.user_dir.clone());
        dirs.extend(self.extra_dirs.iter().cloned());

        self.loaded = dirs.iter().map(|dir| load_dir(dir, registry)).sum();
        info!("Loaded {} modules ({} unique)", self.loaded, registry.count());
        self.loaded
    }
}

/// Loads every `*.yml`/`*.yaml` file under `dir`. A broken file is logged and
/// skipped; a missing directory loads nothing.
pub fn load_dir(dir: &Path, registry: &ModuleRegistry) -> usize {
    if !dir.is_dir() {
        debug!("Module directory {} not found, skipping", dir.display());
        return 0;
    }

    let root = Pattern::escape(&dir.display().to_string());
    let mut paths: Vec<PathBuf> = Vec::new();
    for ext in ["yml", "yaml"] {
        let glob_pattern = format!("{}/**/*.{}", root, ext);
        match glob(&glob_pattern) {
            Ok(entries) => {
                for entry in entries {
                    match entry {
                        Ok(path) => paths.push(path),
                        Err(e) => warn!("Error accessing module file: {}", e),
                    }
                }
            },
            Err(e) => warn!("Failed to search for module files in {}: {}", dir.display(), e),
        }
    }
    paths.sort();

    let mut count = 0;
    for path in paths {
        match ModuleDefinition::from_file(&path) {
            Ok(def) => {
                debug!("Loaded module {} from {}", def.id, path.display());
                registry.register(Arc::new(DeclarativeModule::new(def, Some(path))));
                count += 1;
            },
            Err(e) => {
                warn!("Failed to load module {}: {}", path.display(), e);
            },
        }
    }
    count
}

fn default_builtin_dir() -> PathBuf {
    env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join("modules")))
        .filter(|dir| dir.is_dir())
        .unwrap_or_else(|| PathBuf::from("modules"))
}
