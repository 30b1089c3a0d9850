//! The bundled demo models and the CLI commands for working with them.
use super::{RunOpts, handle_run_command};
use crate::settings::Settings;
use anyhow::{Context, Result, ensure};
use clap::Subcommand;
use include_dir::{Dir, DirEntry, include_dir};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// The demo models shipped inside the binary.
const DEMOS_DIR: Dir = include_dir!("demos");

/// The available subcommands for managing demo models.
#[derive(Subcommand)]
pub enum DemoSubcommands {
    /// List available demos.
    List,
    /// Show the README for a demo.
    Info {
        /// The name of the demo.
        name: String,
    },
    /// Copy a demo model into a new directory.
    Extract {
        /// The name of the demo to extract.
        name: String,
        /// The destination folder for the demo.
        new_path: Option<PathBuf>,
    },
    /// Run a demo.
    Run {
        /// The name of the demo to run.
        name: String,
        /// Other run options
        #[command(flatten)]
        opts: RunOpts,
    },
}

impl DemoSubcommands {
    /// Execute the supplied demo subcommand
    pub fn execute(self) -> Result<()> {
        match self {
            Self::List => handle_demo_list_command(),
            Self::Info { name } => handle_demo_info_command(&name)?,
            Self::Extract { name, new_path } => {
                handle_demo_extract_command(&name, new_path.as_deref())?;
            }
            Self::Run { name, opts } => handle_demo_run_command(&name, &opts, None)?,
        }

        Ok(())
    }
}

/// Names of the bundled demos
pub fn demo_names() -> impl Iterator<Item = &'static str> {
    DEMOS_DIR
        .dirs()
        .filter_map(|dir| dir.path().file_name()?.to_str())
}

/// Handle the `demo list` command.
fn handle_demo_list_command() {
    for name in demo_names() {
        println!("{name}");
    }
}

/// Handle the `demo info` command.
fn handle_demo_info_command(name: &str) -> Result<()> {
    let path: PathBuf = [name, "README.txt"].iter().collect();
    let readme = DEMOS_DIR
        .get_file(path)
        .context("Demo not found.")?
        .contents_utf8()
        .context("README.txt is not UTF-8 encoded")?;

    println!("{readme}");

    Ok(())
}

/// Handle the `demo extract` command
fn handle_demo_extract_command(name: &str, dest: Option<&Path>) -> Result<()> {
    let dest = dest.unwrap_or(Path::new(name));
    extract_demo(name, dest)
}

/// Copy the named demo into `new_path`, which must not already exist
pub fn extract_demo(name: &str, new_path: &Path) -> Result<()> {
    let demo_dir = DEMOS_DIR.get_dir(name).context("Demo not found.")?;

    ensure!(
        !new_path.exists(),
        "Destination directory {} already exists",
        new_path.display()
    );

    fs::create_dir(new_path)?;
    copy_dir_contents(demo_dir, demo_dir.path(), new_path)
}

/// Recursively write the entries of `dir` below `dest`, with paths taken relative to `root`
fn copy_dir_contents(dir: &Dir, root: &Path, dest: &Path) -> Result<()> {
    for entry in dir.entries() {
        let relative = entry.path().strip_prefix(root)?;
        let path = dest.join(relative);
        match entry {
            DirEntry::Dir(sub_dir) => {
                fs::create_dir(&path)?;
                copy_dir_contents(sub_dir, root, dest)?;
            }
            DirEntry::File(file) => fs::write(&path, file.contents())
                .with_context(|| format!("Could not write {}", path.display()))?,
        }
    }

    Ok(())
}

/// Handle the `demo run` command.
pub fn handle_demo_run_command(
    name: &str,
    opts: &RunOpts,
    settings: Option<Settings>,
) -> Result<()> {
    let temp_dir = TempDir::new().context("Failed to create temporary directory.")?;
    let model_path = temp_dir.path().join(name);
    extract_demo(name, &model_path)?;
    handle_run_command(&model_path, opts, settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::load_model;
    use tempfile::tempdir;

    #[test]
    fn test_demo_names() {
        assert!(demo_names().any(|name| name == "simple"));
    }

    #[test]
    fn test_extract_demo() {
        let dir = tempdir().unwrap();
        let dest = dir.path().join("simple");
        extract_demo("simple", &dest).unwrap();

        assert!(dest.join("model.toml").is_file());
        assert!(dest.join("scenarios").join("best.csv").is_file());
        let model = load_model(&dest).unwrap();
        assert_eq!(model.scenarios.len(), 3);
    }

    #[test]
    fn test_extract_demo_existing_dest() {
        let dir = tempdir().unwrap();
        assert!(extract_demo("simple", dir.path()).is_err());
    }

    #[test]
    fn test_extract_demo_unknown() {
        let dir = tempdir().unwrap();
        assert!(extract_demo("nonexistent", &dir.path().join("x")).is_err());
    }
}
