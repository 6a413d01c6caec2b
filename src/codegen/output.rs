//! Writing generated files
//!
//! Handles output directory creation, the overwrite policy for files that
//! already exist, and atomic replacement of the target file.

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::error::SqlgenError;
use crate::schema::to_file_case;

/// Asks whether an existing file may be replaced
pub trait OverwritePrompt {
    fn confirm(&mut self, path: &Path) -> bool;
}

impl<F> OverwritePrompt for F
where
    F: FnMut(&Path) -> bool,
{
    fn confirm(&mut self, path: &Path) -> bool {
        self(path)
    }
}

/// Interactive prompt that asks on `output` and reads the answer from `input`
pub struct TerminalPrompt<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> TerminalPrompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl TerminalPrompt<io::StdinLock<'static>, io::Stderr> {
    /// Prompt on stderr, answer from stdin
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stderr())
    }
}

impl<R: BufRead, W: Write> OverwritePrompt for TerminalPrompt<R, W> {
    fn confirm(&mut self, path: &Path) -> bool {
        let asked = write!(
            self.output,
            "File {} already exists. Overwrite? [y/N]: ",
            path.display()
        )
        .and_then(|_| self.output.flush());
        if let Err(e) = asked {
            warn!(error = ?e, "Failed to show overwrite prompt");
            return false;
        }

        let mut answer = String::new();
        match self.input.read_line(&mut answer) {
            Ok(_) => matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"),
            Err(e) => {
                warn!(error = ?e, "Failed to read overwrite answer");
                false
            }
        }
    }
}

/// Result of a write that did not fail
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    Written(PathBuf),
    /// The file existed and the prompt declined to replace it
    Skipped(PathBuf),
}

impl WriteOutcome {
    pub fn path(&self) -> &Path {
        match self {
            Self::Written(path) | Self::Skipped(path) => path,
        }
    }
}

/// Writes one file per table into an output directory
#[derive(Debug, Clone)]
pub struct DeclarationWriter {
    output_dir: PathBuf,
    extension: &'static str,
    force: bool,
}

impl DeclarationWriter {
    pub fn new(output_dir: impl Into<PathBuf>, extension: &'static str, force: bool) -> Self {
        Self {
            output_dir: output_dir.into(),
            extension,
            force,
        }
    }

    /// File that holds the declaration for `table_name`
    pub fn target_path(&self, table_name: &str) -> PathBuf {
        self.output_dir
            .join(format!("{}.{}", to_file_case(table_name), self.extension))
    }

    /// Write `source` for `table_name`
    ///
    /// An existing file is replaced when `force` is set. Otherwise `prompt`
    /// is asked once; without a prompt the file is replaced. The target
    /// either keeps its old contents or receives all of `source`.
    pub fn write(
        &self,
        table_name: &str,
        source: &str,
        prompt: Option<&mut (dyn OverwritePrompt + '_)>,
    ) -> Result<WriteOutcome, SqlgenError> {
        fs::create_dir_all(&self.output_dir).map_err(|source| SqlgenError::OutputDir {
            path: self.output_dir.clone(),
            source,
        })?;

        let path = self.target_path(table_name);

        if path.exists() && !self.force {
            if let Some(prompt) = prompt {
                if !prompt.confirm(&path) {
                    debug!(table = ?table_name, path = ?path, "Overwrite declined");
                    return Ok(WriteOutcome::Skipped(path));
                }
            }
        }

        let output_error = |source: io::Error| SqlgenError::Output {
            table: table_name.to_string(),
            path: path.clone(),
            source,
        };

        let permissions = target_permissions(&path);

        let mut file = NamedTempFile::new_in(&self.output_dir).map_err(output_error)?;
        file.write_all(source.as_bytes()).map_err(output_error)?;
        if let Some(permissions) = permissions {
            file.as_file()
                .set_permissions(permissions)
                .map_err(output_error)?;
        }
        file.as_file().sync_all().map_err(output_error)?;
        file.persist(&path).map_err(|e| output_error(e.error))?;

        debug!(table = ?table_name, path = ?path, bytes = source.len(), "Wrote file");
        Ok(WriteOutcome::Written(path))
    }
}

/// Permissions the written file should end up with
///
/// A replaced file keeps its mode. A new file gets 0644 on unix, since
/// temporary files are created owner-only.
fn target_permissions(path: &Path) -> Option<fs::Permissions> {
    match fs::metadata(path) {
        Ok(metadata) => Some(metadata.permissions()),
        Err(_) => new_file_permissions(),
    }
}

#[cfg(unix)]
fn new_file_permissions() -> Option<fs::Permissions> {
    use std::os::unix::fs::PermissionsExt;

    Some(fs::Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn new_file_permissions() -> Option<fs::Permissions> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tempfile::TempDir;

    const EXISTING: &str = "existing content";
    const GENERATED: &str = "package models\n\ntype Users struct {\n}\n";

    fn writer(dir: &Path, force: bool) -> DeclarationWriter {
        DeclarationWriter::new(dir, "go", force)
    }

    #[test]
    fn test_target_path_uses_file_case() {
        let writer = writer(Path::new("/tmp/out"), false);
        assert_eq!(
            writer.target_path("UserAccounts"),
            PathBuf::from("/tmp/out/user_accounts.go")
        );
        assert_eq!(
            writer.target_path("user_accounts"),
            PathBuf::from("/tmp/out/user_accounts.go")
        );
    }

    #[test]
    fn test_write_creates_nested_directory() {
        let temp_dir = TempDir::new().unwrap();
        let output_dir = temp_dir.path().join("nested").join("models");

        let outcome = writer(&output_dir, false)
            .write("users", GENERATED, None)
            .unwrap();

        let expected = output_dir.join("users.go");
        assert_eq!(outcome, WriteOutcome::Written(expected.clone()));
        assert_eq!(fs::read_to_string(expected).unwrap(), GENERATED);
    }

    #[test]
    fn test_write_fails_when_directory_cannot_be_created() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("blocker");
        fs::write(&blocker, "not a directory").unwrap();

        let err = writer(&blocker.join("models"), false)
            .write("users", GENERATED, None)
            .unwrap_err();

        assert!(matches!(err, SqlgenError::OutputDir { .. }));
    }

    #[test]
    fn test_force_overwrites_without_prompt() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("users.go");
        fs::write(&path, EXISTING).unwrap();

        let mut calls = 0;
        let mut prompt = |_: &Path| {
            calls += 1;
            false
        };
        let outcome = writer(temp_dir.path(), true)
            .write("users", GENERATED, Some(&mut prompt))
            .unwrap();

        assert_eq!(outcome, WriteOutcome::Written(path.clone()));
        assert_eq!(calls, 0);
        assert_eq!(fs::read_to_string(path).unwrap(), GENERATED);
    }

    #[test]
    fn test_declined_prompt_skips_and_keeps_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("users.go");
        fs::write(&path, EXISTING).unwrap();

        let mut prompt = |_: &Path| false;
        let outcome = writer(temp_dir.path(), false)
            .write("users", GENERATED, Some(&mut prompt))
            .unwrap();

        assert_eq!(outcome, WriteOutcome::Skipped(path.clone()));
        assert_eq!(fs::read(&path).unwrap(), EXISTING.as_bytes());
    }

    #[test]
    fn test_accepted_prompt_overwrites_and_asks_once() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("users.go");
        fs::write(&path, EXISTING).unwrap();

        let mut asked = Vec::new();
        let mut prompt = |p: &Path| {
            asked.push(p.to_path_buf());
            true
        };
        let outcome = writer(temp_dir.path(), false)
            .write("users", GENERATED, Some(&mut prompt))
            .unwrap();

        assert_eq!(outcome, WriteOutcome::Written(path.clone()));
        assert_eq!(asked, vec![path.clone()]);
        assert_eq!(fs::read_to_string(path).unwrap(), GENERATED);
    }

    #[test]
    fn test_prompt_not_asked_for_new_file() {
        let temp_dir = TempDir::new().unwrap();

        let mut calls = 0;
        let mut prompt = |_: &Path| {
            calls += 1;
            false
        };
        let outcome = writer(temp_dir.path(), false)
            .write("users", GENERATED, Some(&mut prompt))
            .unwrap();

        assert!(matches!(outcome, WriteOutcome::Written(_)));
        assert_eq!(calls, 0);
    }

    #[test]
    fn test_no_prompt_and_no_force_overwrites() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("users.go");
        fs::write(&path, EXISTING).unwrap();

        writer(temp_dir.path(), false)
            .write("users", GENERATED, None)
            .unwrap();

        assert_eq!(fs::read_to_string(path).unwrap(), GENERATED);
    }

    #[test]
    fn test_repeated_forced_writes_are_identical() {
        let temp_dir = TempDir::new().unwrap();
        let writer = writer(temp_dir.path(), true);

        let first = writer.write("users", GENERATED, None).unwrap();
        let first_bytes = fs::read(first.path()).unwrap();
        let second = writer.write("users", GENERATED, None).unwrap();
        let second_bytes = fs::read(second.path()).unwrap();

        assert_eq!(first, second);
        assert_eq!(first_bytes, second_bytes);
    }

    #[test]
    fn test_no_temporary_files_left_behind() {
        let temp_dir = TempDir::new().unwrap();

        writer(temp_dir.path(), true)
            .write("users", GENERATED, None)
            .unwrap();

        let entries: Vec<_> = fs::read_dir(temp_dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(entries, vec![std::ffi::OsString::from("users.go")]);
    }

    #[cfg(unix)]
    fn mode(path: &Path) -> u32 {
        use std::os::unix::fs::PermissionsExt;

        fs::metadata(path).unwrap().permissions().mode() & 0o777
    }

    #[cfg(unix)]
    #[test]
    fn test_new_file_is_world_readable() {
        let temp_dir = TempDir::new().unwrap();

        let outcome = writer(temp_dir.path(), false)
            .write("users", GENERATED, None)
            .unwrap();

        assert_eq!(mode(outcome.path()), 0o644);
    }

    #[cfg(unix)]
    #[test]
    fn test_overwrite_keeps_existing_mode() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("users.go");
        fs::write(&path, EXISTING).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o640)).unwrap();

        writer(temp_dir.path(), true)
            .write("users", GENERATED, None)
            .unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), GENERATED);
        assert_eq!(mode(&path), 0o640);
    }

    #[test]
    fn test_terminal_prompt_answers() {
        for (answer, expected) in [
            ("y\n", true),
            ("YES\n", true),
            ("  yes  \n", true),
            ("n\n", false),
            ("\n", false),
            ("", false),
            ("yep\n", false),
        ] {
            let mut shown = Vec::new();
            let mut prompt = TerminalPrompt::new(Cursor::new(answer), &mut shown);

            assert_eq!(
                prompt.confirm(Path::new("models/users.go")),
                expected,
                "{answer:?}"
            );
            drop(prompt);
            assert_eq!(
                String::from_utf8(shown).unwrap(),
                "File models/users.go already exists. Overwrite? [y/N]: "
            );
        }
    }
}
