use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileKind {
    File,
    Folder,
}

/// A row in the file manager. Sizes and dates are display strings only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileEntry {
    pub name: &'static str,
    pub kind: FileKind,
    pub size: &'static str,
    pub modified: &'static str,
}

const fn folder(name: &'static str, modified: &'static str) -> FileEntry {
    FileEntry {
        name,
        kind: FileKind::Folder,
        size: "-",
        modified,
    }
}

const fn file(name: &'static str, size: &'static str, modified: &'static str) -> FileEntry {
    FileEntry {
        name,
        kind: FileKind::File,
        size,
        modified,
    }
}

const SAMPLE_FILES: &[FileEntry] = &[
    folder("world", "Today, 14:32"),
    folder("plugins", "Today, 12:10"),
    folder("logs", "Today, 14:35"),
    file("server.properties", "1.2 KB", "Yesterday, 18:04"),
    file("ops.json", "156 B", "Yesterday, 18:04"),
    file("whitelist.json", "2 B", "3 days ago"),
    file("server.jar", "45.2 MB", "Last week"),
];

pub fn sample_files() -> &'static [FileEntry] {
    SAMPLE_FILES
}
