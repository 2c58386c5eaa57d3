use std::path::{Path, PathBuf};

use tracing::{info, warn};
use walkdir::WalkDir;

use crate::{
    configuration::SourceSettings,
    domain::entities::source_item::{ContentType, SourceItem, SourceType},
    ports::source_processor::{SourceProcessor, SourceProcessorError},
};

/// Collects source items from the files of a directory tree.
///
/// Files are walked in file name order and split on blank lines, then consecutive
/// paragraphs are merged while they fit in `max_chunk_chars`. The same tree always gives
/// the same items in the same order.
pub struct FileSourceProcessor {
    root_directory: PathBuf,
    extensions: Vec<String>,
    max_chunk_chars: usize,
}

impl FileSourceProcessor {
    pub fn new(
        root_directory: impl Into<PathBuf>,
        extensions: &[String],
        max_chunk_chars: usize,
    ) -> Self {
        Self {
            root_directory: root_directory.into(),
            extensions: extensions
                .iter()
                .map(|extension| extension.trim_start_matches('.').to_lowercase())
                .collect(),
            max_chunk_chars,
        }
    }

    pub fn from_settings(settings: &SourceSettings) -> Self {
        Self::new(
            &settings.root_directory,
            &settings.extensions,
            settings.max_chunk_chars,
        )
    }

    fn extension_of(path: &Path) -> Option<String> {
        path.extension()
            .and_then(|extension| extension.to_str())
            .map(str::to_lowercase)
    }

    fn is_indexed(&self, path: &Path) -> bool {
        Self::extension_of(path)
            .map(|extension| self.extensions.contains(&extension))
            .unwrap_or(false)
    }

    fn read_error(location: &Path, source: std::io::Error) -> SourceProcessorError {
        SourceProcessorError::ReadError {
            location: location.display().to_string(),
            source,
        }
    }
}

impl SourceProcessor for FileSourceProcessor {
    #[tracing::instrument(name = "Processing source files", skip(self), fields(root_directory = %self.root_directory.display()))]
    fn process(&self) -> Result<Vec<SourceItem>, SourceProcessorError> {
        if !self.root_directory.is_dir() {
            return Err(SourceProcessorError::InvalidRoot(
                self.root_directory.display().to_string(),
            ));
        }

        let mut source_items = vec![];

        for entry in WalkDir::new(&self.root_directory).sort_by_file_name() {
            let entry = entry.map_err(|e| {
                let location = e
                    .path()
                    .unwrap_or(self.root_directory.as_path())
                    .to_path_buf();
                Self::read_error(&location, e.into())
            })?;

            if !entry.file_type().is_file() || !self.is_indexed(entry.path()) {
                continue;
            }

            let content = match std::fs::read_to_string(entry.path()) {
                Ok(content) => content,
                Err(error) if error.kind() == std::io::ErrorKind::InvalidData => {
                    warn!(path = %entry.path().display(), "Skipping file not encoded in UTF-8");
                    continue;
                }
                Err(error) => return Err(Self::read_error(entry.path(), error)),
            };

            let relative_path = entry
                .path()
                .strip_prefix(&self.root_directory)
                .unwrap_or(entry.path())
                .to_string_lossy()
                .replace('\\', "/");
            let content_type = content_type_of(entry.path());

            source_items.extend(
                split_paragraphs(&content, self.max_chunk_chars)
                    .into_iter()
                    .enumerate()
                    .map(|(index, piece)| SourceItem {
                        content: piece,
                        content_type,
                        source_type: SourceType::File,
                        source_location: format!("{}#{}", relative_path, index),
                    }),
            );
        }

        info!(nb_items = source_items.len(), "Processed source files");
        Ok(source_items)
    }
}

fn content_type_of(path: &Path) -> ContentType {
    match FileSourceProcessor::extension_of(path).as_deref() {
        Some("md" | "mdx" | "markdown") => ContentType::Markdown,
        Some("txt" | "rst" | "adoc") | None => ContentType::Text,
        Some(_) => ContentType::Code,
    }
}

/// Splits a content on blank lines and merges consecutive paragraphs up to `max_chars`.
///
/// A single paragraph longer than `max_chars` is kept whole.
fn split_paragraphs(content: &str, max_chars: usize) -> Vec<String> {
    let content = content.replace("\r\n", "\n");
    let mut pieces: Vec<String> = vec![];
    let mut current = String::new();
    // Counted in chars, `current.len()` is in bytes
    let mut current_chars = 0;

    for paragraph in content
        .split("\n\n")
        .map(str::trim)
        .filter(|paragraph| !paragraph.is_empty())
    {
        let paragraph_chars = paragraph.chars().count();

        if !current.is_empty() && current_chars + 2 + paragraph_chars > max_chars {
            pieces.push(std::mem::take(&mut current));
            current_chars = 0;
        }
        if !current.is_empty() {
            current.push_str("\n\n");
            current_chars += 2;
        }
        current.push_str(paragraph);
        current_chars += paragraph_chars;
    }

    if !current.is_empty() {
        pieces.push(current);
    }

    pieces
}
