use ignore::WalkBuilder;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::mpsc;

use crate::filter::Filter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    ClassFile,
    Archive,
}

/// One thing the decoder will be fed: a loose class file or an archive of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Input {
    pub path: PathBuf,
    pub kind: InputKind,
}

impl Input {
    /// Label recorded on every class decoded from an archive.
    pub fn archive_name(&self) -> Option<String> {
        match self.kind {
            InputKind::Archive => self
                .path
                .file_name()
                .map(|s| s.to_string_lossy().to_string()),
            InputKind::ClassFile => None,
        }
    }
}

/// Walks every root and returns the class files and archives found, deduplicated
/// by canonical path and sorted. A root may itself be a class file or an archive.
pub fn collect_inputs(roots: &[PathBuf], filter: &Filter) -> Vec<Input> {
    let mut found: BTreeMap<PathBuf, Input> = BTreeMap::new();

    for root in roots {
        if !root.exists() {
            tracing::warn!(path = %root.display(), "input path does not exist; skipping");
            continue;
        }

        let paths = if root.is_dir() {
            walk(root)
        } else {
            vec![root.clone()]
        };

        for path in paths {
            let Some(kind) = classify(&path, filter) else {
                continue;
            };
            let key = path.canonicalize().unwrap_or_else(|_| path.clone());
            found.entry(key).or_insert(Input { path, kind });
        }
    }

    found.into_values().collect()
}

fn walk(base_path: &Path) -> Vec<PathBuf> {
    let (tx, rx) = mpsc::channel();

    let walker = WalkBuilder::new(base_path)
        .hidden(false)
        .git_ignore(false)
        .git_global(false)
        .git_exclude(false)
        .build_parallel();

    walker.run(|| {
        let tx = tx.clone();
        Box::new(move |entry| {
            if let Ok(entry) = entry
                && entry.file_type().is_some_and(|t| t.is_file())
            {
                let _ = tx.send(entry.path().to_path_buf());
            }
            ignore::WalkState::Continue
        })
    });

    drop(tx);
    rx.iter().collect()
}

pub fn classify(path: &Path, filter: &Filter) -> Option<InputKind> {
    let ext = path.extension()?.to_string_lossy().to_ascii_lowercase();
    match ext.as_str() {
        "class" => {
            let file_name = path.file_name()?.to_string_lossy();
            filter
                .accept_inner_class(&file_name)
                .then_some(InputKind::ClassFile)
        }
        "jar" | "zip" | "war" => Some(InputKind::Archive),
        _ => None,
    }
}

/// `com/acme/Foo.class` to `com.acme.Foo`.
pub fn class_path_to_class_name(class_path: &str) -> String {
    class_path
        .trim_end_matches(".class")
        .replace(['/', '\\'], ".")
}
