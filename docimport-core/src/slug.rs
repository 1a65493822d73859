use std::sync::OnceLock;

use regex::Regex;

fn markup() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<[^>]*>").expect("static regex"))
}

fn separators() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[\s./]+").expect("static regex"))
}

fn disallowed() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^a-z0-9_-]").expect("static regex"))
}

fn dash_runs() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"-{2,}").expect("static regex"))
}

/// Normalises a name into a URL-safe slug.
///
/// Lowercases, drops markup, turns dots, slashes and whitespace into dashes,
/// removes anything outside `[a-z0-9_-]` and collapses dash runs.
/// Underscores survive, so `get_post` stays `get_post`.
pub fn normalize(input: &str) -> String {
    let lowered = input.to_lowercase();
    let stripped = markup().replace_all(&lowered, "");
    let dashed = separators().replace_all(&stripped, "-");
    let cleaned = disallowed().replace_all(&dashed, "");
    let collapsed = dash_runs().replace_all(&cleaned, "-");
    collapsed.trim_matches('-').to_string()
}

/// Slug of the source-file term for a parsed file path.
pub fn file_slug(path: &str) -> String {
    normalize(&path.replace('/', "_"))
}
