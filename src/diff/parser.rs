// Unified diff 解析
// 把 GitHub 返回的 diff 文本切分为按文件的条目

use serde::{Deserialize, Serialize};

/// 单个 hunk：`@@ ... @@` 行和其后的内容行
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hunk {
    pub header: String,
    pub body: String,
}

/// One changed file.
///
/// Git metadata lines (`diff --git`, `index`, mode lines, `---`/`+++`) are
/// consumed into `path`; `header` keeps any other text that appears before
/// the first hunk, which is normally empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDiff {
    pub path: String,
    pub header: String,
    pub hunks: Vec<Hunk>,
}

const METADATA_PREFIXES: [&str; 14] = [
    "index ",
    "new file mode",
    "deleted file mode",
    "old mode",
    "new mode",
    "similarity index",
    "dissimilarity index",
    "rename from",
    "rename to",
    "copy from",
    "copy to",
    "--- ",
    "+++ ",
    "Binary files",
];

/// 解析 unified diff，保持文件出现的顺序
pub fn parse_diff(diff: &str) -> Vec<FileDiff> {
    let mut files: Vec<FileDiff> = Vec::new();
    let mut in_hunk = false;

    for line in diff.lines() {
        if let Some(rest) = line.strip_prefix("diff --git ") {
            files.push(FileDiff {
                path: path_from_git_line(rest),
                header: String::new(),
                hunks: Vec::new(),
            });
            in_hunk = false;
            continue;
        }

        let Some(file) = files.last_mut() else {
            continue;
        };

        if line.starts_with("@@") {
            file.hunks.push(Hunk {
                header: line.to_string(),
                body: String::new(),
            });
            in_hunk = true;
            continue;
        }

        if in_hunk {
            if line.starts_with("\\ ") {
                // "\ No newline at end of file"
                continue;
            }
            if let Some(hunk) = file.hunks.last_mut() {
                hunk.body.push_str(line);
                hunk.body.push('\n');
            }
            continue;
        }

        if METADATA_PREFIXES.iter().any(|p| line.starts_with(p)) {
            if let Some(target) = line.strip_prefix("+++ ") {
                if target != "/dev/null" {
                    file.path = target.strip_prefix("b/").unwrap_or(target).to_string();
                }
            }
            continue;
        }

        file.header.push_str(line);
        file.header.push('\n');
    }

    files
}

/// `a/<path> b/<path>` 中取 b 侧路径
fn path_from_git_line(rest: &str) -> String {
    match rest.rfind(" b/") {
        Some(idx) => rest[idx + 3..].to_string(),
        None => rest.to_string(),
    }
}

/// Drop one leading `+` from every line, leaving the added text only.
pub fn strip_added_markers(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for segment in text.split_inclusive('\n') {
        out.push_str(segment.strip_prefix('+').unwrap_or(segment));
    }
    out
}
