//! Input tree traversal and output naming.
//!
//! The input root holds one subdirectory per conversation; the directory name
//! is the conversation id.

use crate::defaults;
use crate::error::{CallstitchError, Result};
use chrono::NaiveDateTime;
use std::fs;
use std::path::{Path, PathBuf};

/// A conversation directory found under the input root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationDir {
    pub id: String,
    pub path: PathBuf,
}

/// List conversation directories under `root`, sorted by id.
///
/// Directories whose names are not valid UTF-8 are left out, since the id is
/// reused in the output file name. Fails if `root` is missing or has no
/// usable subdirectories.
pub fn conversation_dirs(root: &Path) -> Result<Vec<ConversationDir>> {
    if !root.is_dir() {
        return Err(CallstitchError::InputDirNotFound {
            path: root.display().to_string(),
        });
    }

    let mut dirs = Vec::new();
    for entry in fs::read_dir(root)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        let Ok(id) = entry.file_name().into_string() else {
            continue;
        };
        dirs.push(ConversationDir {
            id,
            path: entry.path(),
        });
    }

    if dirs.is_empty() {
        return Err(CallstitchError::NoConversations {
            path: root.display().to_string(),
        });
    }

    dirs.sort_by(|a, b| a.id.cmp(&b.id));
    Ok(dirs)
}

/// File names directly inside a conversation directory, sorted.
///
/// Subdirectories and names that are not valid UTF-8 are left out; neither
/// can be a turn clip.
pub fn clip_names(dir: &Path) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            continue;
        }
        if let Ok(name) = entry.file_name().into_string() {
            names.push(name);
        }
    }
    names.sort();
    Ok(names)
}

/// `<timestamp>_<conversation id>_stereo.<extension>`
pub fn output_file_name(conversation_id: &str, extension: &str, at: NaiveDateTime) -> String {
    format!(
        "{}_{}_{}.{}",
        at.format(defaults::TIMESTAMP_FORMAT),
        conversation_id,
        defaults::OUTPUT_SUFFIX,
        extension
    )
}
