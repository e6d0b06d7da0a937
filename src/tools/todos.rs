// find_todos tool.
// Walks a repository tree and scans text files for TODO/FIXME/HACK/NOTE markers.

use std::sync::LazyLock;

use base64::{Engine as _, engine::general_purpose::STANDARD};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::context::{OracleContext, RepoRef};
use crate::error::{OracleError, Result};
use crate::github::{FileContent, Params, Repository, Tree};

const TEXT_EXTENSIONS: &[&str] = &[
    ".md", ".txt", ".py", ".js", ".ts", ".tsx", ".jsx", ".java", ".go", ".rb", ".rs", ".cpp", ".c",
    ".cs", ".json", ".yml", ".yaml", ".toml", ".ini", ".sh", ".bat", ".ps1",
];
const DEFAULT_PATHS: &[&str] = &["src", "app", "."];
const FALLBACK_BRANCH: &str = "main";

static MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(TODO|FIXME|HACK|NOTE)\b[:\- ]?(.*)").expect("marker pattern is valid")
});

fn default_max_files() -> usize {
    120
}

#[derive(Debug, Clone, Deserialize)]
pub struct FindTodosArgs {
    pub paths: Option<Vec<String>>,
    #[serde(rename = "ref")]
    pub git_ref: Option<String>,
    #[serde(default = "default_max_files")]
    pub max_files: usize,
    pub owner: Option<String>,
    pub repo: Option<String>,
}

impl Default for FindTodosArgs {
    fn default() -> Self {
        Self {
            paths: None,
            git_ref: None,
            max_files: default_max_files(),
            owner: None,
            repo: None,
        }
    }
}

/// A marker found in a file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Todo {
    pub file: String,
    pub line: usize,
    pub tag: String,
    pub text: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TodoReport {
    pub count: usize,
    #[serde(rename = "ref")]
    pub git_ref: String,
    pub scanned_files: usize,
    pub todos: Vec<Todo>,
    pub note: Option<String>,
}

pub async fn find_todos(ctx: &OracleContext, args: FindTodosArgs) -> Result<TodoReport> {
    let repo = ctx.resolve_repo(args.owner.as_deref(), args.repo.as_deref())?;

    let git_ref = match args.git_ref.filter(|r| !r.is_empty()) {
        Some(git_ref) => git_ref,
        None => default_branch(ctx, &repo).await?,
    };

    let tree_path = format!("{}/git/trees/{}", repo.api_path(), git_ref);
    let tree: Tree = serde_json::from_value(
        ctx.get(&tree_path, &Params::new().with("recursive", 1))
            .await?,
    )?;

    let wanted: Vec<String> = match args.paths {
        Some(paths) if !paths.is_empty() => paths,
        _ => DEFAULT_PATHS.iter().map(|p| p.to_string()).collect(),
    };

    let mut todos = Vec::new();
    let mut scanned = 0;

    for entry in tree.tree.iter().filter(|e| e.is_blob()) {
        if scanned >= args.max_files {
            break;
        }
        if !is_wanted(&entry.path, &wanted) {
            continue;
        }

        let contents_path = format!("{}/contents/{}", repo.api_path(), entry.path);
        let payload = match ctx
            .get(&contents_path, &Params::new().with("ref", git_ref.as_str()))
            .await
        {
            Ok(payload) => payload,
            Err(OracleError::Remote(failure)) => {
                debug!(file = %entry.path, status = failure.status, "skipping unreadable file");
                continue;
            }
            Err(e) => return Err(e),
        };

        let Some(text) = decode_content(payload) else {
            continue;
        };
        scanned += 1;
        todos.extend(scan_text(&entry.path, &text));
    }

    let note = (scanned >= args.max_files)
        .then(|| "max_files limit reached; results truncated".to_string());

    Ok(TodoReport {
        count: todos.len(),
        git_ref,
        scanned_files: scanned,
        todos,
        note,
    })
}

async fn default_branch(ctx: &OracleContext, repo: &RepoRef) -> Result<String> {
    let meta: Repository = serde_json::from_value(ctx.get(&repo.api_path(), &Params::new()).await?)?;
    Ok(meta
        .default_branch
        .unwrap_or_else(|| FALLBACK_BRANCH.to_string()))
}

/// Text file under one of the wanted prefixes. `.` or an empty prefix means the whole tree.
pub fn is_wanted(path: &str, wanted: &[String]) -> bool {
    if !TEXT_EXTENSIONS.iter().any(|ext| path.ends_with(ext)) {
        return false;
    }
    wanted.iter().any(|prefix| {
        let prefix = prefix.trim_end_matches('/');
        prefix.is_empty()
            || prefix == "."
            || path == prefix
            || path.starts_with(&format!("{}/", prefix))
    })
}

/// Decode a base64 file payload. Directories and other encodings yield `None`.
fn decode_content(payload: Value) -> Option<String> {
    if payload.is_array() {
        return None;
    }
    let content: FileContent = serde_json::from_value(payload).ok()?;
    if content.encoding.as_deref() != Some("base64") {
        return None;
    }
    let cleaned: String = content
        .content?
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    let bytes = STANDARD.decode(cleaned).ok()?;
    Some(String::from_utf8_lossy(&bytes).into_owned())
}

/// Find markers line by line; the first marker on a line wins.
pub fn scan_text(file: &str, text: &str) -> Vec<Todo> {
    text.lines()
        .enumerate()
        .filter_map(|(idx, line)| {
            let caps = MARKER.captures(line)?;
            let rest = caps.get(2).map_or("", |m| m.as_str()).trim();
            Some(Todo {
                file: file.to_string(),
                line: idx + 1,
                tag: caps[1].to_uppercase(),
                text: if rest.is_empty() {
                    line.trim().to_string()
                } else {
                    rest.to_string()
                },
            })
        })
        .collect()
}
