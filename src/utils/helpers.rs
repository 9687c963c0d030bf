//! Helpers for tau.
//!
//! Utility functions used by the app and the entry point:
//! - Locating the home directory and displaying it as "~" in paths
//! - Expanding "~" in user supplied paths
//! - Opening paths/files in the user's chosen editor

use crate::config::Editor;

use std::io;
use std::path::{MAIN_SEPARATOR, Path, PathBuf};

/// The user's home directory, if one can be determined.
pub fn get_home() -> Option<PathBuf> {
    dirs::home_dir()
}

/// Opens a specified path/file in the configured editor ("nvim" or "vim" etc.).
///
/// Temporary disables raw mode and exits alternate sceen while the editor runs.
/// On return, restores raw mode and alternate sceen.
pub fn open_in_editor(editor: &Editor, file_path: &Path) -> io::Result<()> {
    use crossterm::{
        execute,
        terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
    };

    let mut stdout = io::stdout();
    disable_raw_mode()?;
    execute!(stdout, LeaveAlternateScreen)?;

    let status = std::process::Command::new(editor.cmd())
        .arg(file_path)
        .status();

    execute!(io::stdout(), EnterAlternateScreen)?;
    enable_raw_mode()?;

    match status? {
        s if s.success() => Ok(()),
        s => Err(io::Error::other(format!("{} exited with {s}", editor.cmd()))),
    }
}

/// Util function to shorten home directory to ~.
/// Is used by the path bar in the render function.
pub fn shorten_home_path<P: AsRef<Path>>(path: P) -> String {
    let path = path.as_ref();
    if let Some(home_dir) = get_home()
        && let Ok(stripped) = path.strip_prefix(&home_dir)
    {
        if stripped.as_os_str().is_empty() {
            return "~".to_string();
        } else {
            let mut short = stripped.display().to_string();
            if short.starts_with(MAIN_SEPARATOR) {
                short.remove(0);
            }
            return format!("~{}{}", MAIN_SEPARATOR, short);
        }
    }
    path.display().to_string()
}

/// Expands a leading "~" to the home directory.
pub fn expand_home_path(input: &str) -> PathBuf {
    if input == "~"
        && let Some(home) = get_home()
    {
        return home;
    }
    if let Some(rest) = input
        .strip_prefix("~/")
        .or_else(|| input.strip_prefix(&format!("~{MAIN_SEPARATOR}")))
        && let Some(home) = get_home()
    {
        return home.join(rest);
    }
    PathBuf::from(input)
}

/// Resolves the directory given on the command line.
///
/// Expands "~", makes relative paths absolute against the current directory and, when the
/// argument names a file, opens its parent directory instead.
pub fn resolve_initial_dir(arg: &str) -> io::Result<PathBuf> {
    let expanded = expand_home_path(arg.trim());
    let absolute = if expanded.is_absolute() {
        expanded
    } else {
        std::env::current_dir()?.join(expanded)
    };

    let target = if absolute.is_file() {
        absolute
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or(absolute)
    } else {
        absolute
    };

    if !target.is_dir() {
        return Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("'{}' is not a directory", target.display()),
        ));
    }
    Ok(target)
}

/// Helper utils integration tests
#[cfg(test)]
mod tests {
    use super::*;

    use std::error;
    use std::fs::File;
    use tempfile::tempdir;

    #[test]
    fn test_shorten_home_path() -> Result<(), Box<dyn error::Error>> {
        let Some(home) = get_home() else {
            return Ok(());
        };
        assert_eq!(shorten_home_path(&home), "~");
        assert_eq!(
            shorten_home_path(home.join("projects")),
            format!("~{MAIN_SEPARATOR}projects")
        );
        assert_eq!(shorten_home_path("/not/under/home"), "/not/under/home");
        Ok(())
    }

    #[test]
    fn test_expand_home_path() -> Result<(), Box<dyn error::Error>> {
        let Some(home) = get_home() else {
            return Ok(());
        };
        assert_eq!(expand_home_path("~"), home);
        assert_eq!(expand_home_path("~/src"), home.join("src"));
        assert_eq!(expand_home_path("~user"), PathBuf::from("~user"));
        assert_eq!(expand_home_path("/tmp"), PathBuf::from("/tmp"));
        Ok(())
    }

    #[test]
    fn test_resolve_initial_dir() -> Result<(), Box<dyn error::Error>> {
        let dir = tempdir()?;
        let file = dir.path().join("notes.txt");
        File::create(&file)?;

        let dir_str = dir.path().to_str().ok_or("tempdir not valid UTF-8")?;
        let file_str = file.to_str().ok_or("path not valid UTF-8")?;

        assert_eq!(resolve_initial_dir(dir_str)?, dir.path());
        assert_eq!(resolve_initial_dir(file_str)?, dir.path());

        let missing = dir.path().join("missing");
        let missing_str = missing.to_str().ok_or("path not valid UTF-8")?;
        assert!(resolve_initial_dir(missing_str).is_err());
        Ok(())
    }
}
