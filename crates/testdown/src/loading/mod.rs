//! Builds test trees from directories and Markdown documents on disk.
//!
//! Directories become [`Suite`]s, files ending in [`DOCUMENT_SUFFIX`] become
//! [`Document`]s and every other entry is ignored. Within a document, each
//! fenced code block marked `testdown` is paired with the nearest preceding
//! unmarked block to form an [`Assertion`].

pub mod cancel;

use crate::models::test::split_skip_marker;
use crate::models::{Assertion, DanglingAssertion, Document, Suite, Test};
use crate::parsing::info::CodeInfo;
use crate::parsing::{CommonMark, MarkdownParser};
use cancel::Cancel;
use relative_path::{Component, RelativePath, RelativePathBuf};
use std::fs;
use std::path::{Path, PathBuf};

/// File name suffix of Markdown documents that contain assertions.
pub const DOCUMENT_SUFFIX: &str = ".testdown.md";

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: RelativePathBuf,
        source: std::io::Error,
    },
    #[error("{0} is not a testdown document")]
    NotATestDocument(RelativePathBuf),
    #[error("{0} is outside the root directory")]
    OutsideRoot(RelativePathBuf),
    #[error("loading was cancelled before reading {path}")]
    Cancelled { path: RelativePathBuf },
}

/// Returns true if the file should be treated as a Markdown document that
/// (potentially) contains assertions.
pub fn is_test_document(file_name: &str) -> bool {
    file_name.ends_with(DOCUMENT_SUFFIX)
}

/// Loads [`Test`] trees from a directory on disk.
///
/// All paths handled by the loader, and all paths recorded in the tree, are
/// relative to `root`.
#[derive(Debug, Clone)]
pub struct Loader<P = CommonMark> {
    root: PathBuf,
    parser: P,
}

impl Loader {
    /// Creates a loader that parses documents with [`CommonMark`].
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_parser(root, CommonMark::new())
    }
}

impl<P: MarkdownParser> Loader<P> {
    pub fn with_parser(root: impl Into<PathBuf>, parser: P) -> Self {
        Self {
            root: root.into(),
            parser,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the tests loaded from the file or directory at `path`.
    ///
    /// Any failure to read the filesystem aborts the whole load; no partial
    /// tree is returned. Paths that leave the root are rejected.
    pub fn load<C>(&self, cancel: &C, path: &RelativePath) -> Result<Test, LoadError>
    where
        C: Cancel + ?Sized,
    {
        let path = path.normalize();
        if path.components().next() == Some(Component::ParentDir) {
            return Err(LoadError::OutsideRoot(path));
        }
        check_cancelled(cancel, &path)?;

        let metadata = fs::metadata(path.to_path(&self.root)).map_err(io_error(&path))?;
        if metadata.is_dir() {
            Ok(self.load_suite(cancel, path)?.into())
        } else {
            Ok(self.load_document(cancel, path)?.into())
        }
    }

    fn load_suite<C>(&self, cancel: &C, dir: RelativePathBuf) -> Result<Suite, LoadError>
    where
        C: Cancel + ?Sized,
    {
        check_cancelled(cancel, &dir)?;
        log::debug!("loading suite from {}", display(&dir));

        let mut entries = fs::read_dir(dir.to_path(&self.root))
            .and_then(|entries| entries.collect::<Result<Vec<_>, _>>())
            .map_err(io_error(&dir))?;
        entries.sort_by_key(|entry| entry.file_name());

        let (name, skip) = split_skip_marker(base_name(&dir));
        let mut suite = Suite {
            name,
            dir,
            skip,
            tests: Vec::new(),
        };

        for entry in entries {
            let file_name = entry.file_name();
            let Some(file_name) = file_name.to_str() else {
                log::warn!(
                    "ignoring {} in {}: name is not valid UTF-8",
                    file_name.to_string_lossy(),
                    display(&suite.dir)
                );
                continue;
            };

            let path = suite.dir.join(file_name);
            let file_type = entry.file_type().map_err(io_error(&path))?;

            if file_type.is_dir() {
                suite.tests.push(self.load_suite(cancel, path)?.into());
            } else if is_test_document(file_name) {
                suite.tests.push(self.load_document(cancel, path)?.into());
            } else {
                log::trace!("ignoring {path}: not a testdown document");
            }
        }

        Ok(suite)
    }

    fn load_document<C>(&self, cancel: &C, file: RelativePathBuf) -> Result<Document, LoadError>
    where
        C: Cancel + ?Sized,
    {
        check_cancelled(cancel, &file)?;

        if !is_test_document(base_name(&file)) {
            return Err(LoadError::NotATestDocument(file));
        }

        log::debug!("loading document {file}");
        let source = fs::read_to_string(file.to_path(&self.root)).map_err(io_error(&file))?;

        Ok(self.parse_document(file, &source))
    }

    /// Builds a [`Document`] from Markdown source that was read from `file`.
    ///
    /// Input blocks are paired with the assertion block that follows them. An
    /// input block that is followed by another input block before any
    /// assertion is silently replaced; an assertion with no input to pair with
    /// is recorded in [`Document::errors`] and pairing carries on.
    pub fn parse_document(&self, file: RelativePathBuf, source: &str) -> Document {
        let (name, skip) = split_skip_marker(base_name(&file));
        let mut document = Document {
            name,
            file,
            skip,
            assertions: Vec::new(),
            errors: Vec::new(),
        };

        let mut pending: Option<PendingInput> = None;

        for block in self.parser.fenced_blocks(source) {
            let info = CodeInfo::parse(block.info.as_deref());
            let line = block.line(source);

            if !info.is_assertion {
                let input = PendingInput {
                    line,
                    language: info.language,
                    content: block.content,
                };
                if let Some(dropped) = pending.replace(input) {
                    log::debug!(
                        "{}:{}: input block replaced by the block at line {line} before any assertion",
                        document.file,
                        dropped.line
                    );
                }
                continue;
            }

            match pending.take() {
                Some(input) => document.assertions.push(Assertion {
                    name: format!("L{}", input.line),
                    file: document.file.clone(),
                    line: input.line,
                    skip: info.skip,
                    input_language: input.language,
                    input: input.content,
                    output_language: info.language,
                    expected_output: block.content,
                }),
                None => {
                    let error = DanglingAssertion {
                        file: document.file.clone(),
                        line,
                    };
                    log::warn!("{error}");
                    document.errors.push(error);
                }
            }
        }

        document
    }
}

/// An input block that has not yet been paired with an assertion block.
struct PendingInput {
    line: usize,
    language: String,
    content: String,
}

fn check_cancelled<C>(cancel: &C, path: &RelativePath) -> Result<(), LoadError>
where
    C: Cancel + ?Sized,
{
    if cancel.is_cancelled() {
        return Err(LoadError::Cancelled {
            path: path.to_relative_path_buf(),
        });
    }
    Ok(())
}

fn io_error(path: &RelativePath) -> impl FnOnce(std::io::Error) -> LoadError + '_ {
    move |source| LoadError::Io {
        path: path.to_relative_path_buf(),
        source,
    }
}

/// The last component of `path`; the root itself is named `.`.
fn base_name(path: &RelativePath) -> &str {
    path.file_name().unwrap_or(".")
}

fn display(path: &RelativePath) -> &str {
    match path.as_str() {
        "" => ".",
        path => path,
    }
}
