use std::path::{Path, PathBuf};

/// Separator between entries of `package.path` / `package.cpath`.
pub const PATH_LIST_SEPARATOR: &str = ";";

/// Extension of Lua source modules.
pub const SCRIPT_EXTENSION: &str = "lua";

/// Bootstrap script, relative to the bundled script root.
pub const BOOTSTRAP_SCRIPT: &str = "uth/init.lua";

/// Build a Lua search path from `roots`, in order.
///
/// Each root contributes `<root>/?.<ext>` followed by `<root>/?/init.<ext>`.
/// No separator is left at the end, so appending to the result later can
/// never produce an empty `;;` entry (which Lua would expand to its default
/// path).
pub fn search_path<P: AsRef<Path>>(roots: &[P], extension: &str) -> String {
    roots
        .iter()
        .flat_map(|root| {
            let root = normalize_root(root.as_ref());
            [
                format!("{root}/?.{extension}"),
                format!("{root}/?/init.{extension}"),
            ]
        })
        .collect::<Vec<_>>()
        .join(PATH_LIST_SEPARATOR)
}

fn normalize_root(root: &Path) -> String {
    let root = root.to_string_lossy();
    if root.is_empty() {
        return ".".to_string();
    }
    // A bare "/" trims to "", which the patterns turn back into "/?.lua".
    root.trim_end_matches(['/', '\\']).to_string()
}

/// Resolved filesystem locations a script state needs.
///
/// Script roots are listed in resolution priority: bundled uth scripts,
/// then the third-party runtime's scripts, then project scripts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptPaths {
    pub bundled_scripts: PathBuf,
    pub runtime_scripts: PathBuf,
    pub runtime_natives: PathBuf,
    pub project_scripts: PathBuf,
    pub project_natives: PathBuf,
    pub log_dir: PathBuf,
}

impl ScriptPaths {
    /// Value for `package.path`.
    pub fn module_search_path(&self) -> String {
        search_path(
            &[
                &self.bundled_scripts,
                &self.runtime_scripts,
                &self.project_scripts,
            ],
            SCRIPT_EXTENSION,
        )
    }

    /// Value for `package.cpath`, using the platform's shared library extension.
    pub fn native_search_path(&self) -> String {
        search_path(
            &[&self.runtime_natives, &self.project_natives],
            std::env::consts::DLL_EXTENSION,
        )
    }

    pub fn bootstrap_script(&self) -> PathBuf {
        self.bundled_scripts.join(BOOTSTRAP_SCRIPT)
    }
}
