//! Offline Linter
//! 
//! Cheap per-language checks producing one diagnostic string.

use nexus_core::files::{Language, SourceFile};

const PYTHON_BLOCK_STARTS: [&str; 4] = ["def ", "if ", "for ", "while "];

/// Lint file content for a language
pub fn lint_file(content: &str, language: Language) -> String {
    if content.trim().is_empty() {
        return "Error: file is empty.".to_string();
    }

    let problems = match language {
        Language::Python => python_colons(content),
        Language::C | Language::Cpp | Language::Java | Language::JavaScript => brace_balance(content),
        Language::Html => div_balance(content),
        Language::Css | Language::React => Vec::new(),
    };

    if problems.is_empty() {
        "✅ No obvious syntax errors detected.".to_string()
    } else {
        format!("⚠️ Problems detected:\n{}", problems.join("\n"))
    }
}

fn python_colons(content: &str) -> Vec<String> {
    content
        .split('\n')
        .enumerate()
        .filter_map(|(idx, line)| {
            let line = line.trim();
            let opens_block = PYTHON_BLOCK_STARTS.iter().any(|start| line.starts_with(start));
            (opens_block && !line.ends_with(':'))
                .then(|| format!("Line {}: invalid syntax, missing ':' at end of statement.", idx + 1))
        })
        .collect()
}

fn brace_balance(content: &str) -> Vec<String> {
    let balance: i64 = content
        .chars()
        .map(|c| match c {
            '{' => 1,
            '}' => -1,
            _ => 0,
        })
        .sum();

    if balance != 0 {
        vec![format!("Error: unbalanced braces {{}} (diff: {}).", balance)]
    } else {
        Vec::new()
    }
}

fn div_balance(content: &str) -> Vec<String> {
    let open = content.matches("<div").count();
    let close = content.matches("</div>").count();
    if open != close {
        vec![format!(
            "Warning: <div> count ({}) and </div> count ({}) do not match.",
            open, close
        )]
    } else {
        Vec::new()
    }
}

/// Offline debugger report for a file
pub fn debug_report(file: &SourceFile) -> String {
    format!(
        "[OFFLINE DEBUGGER]\nFile: {}\nLanguage: {}\n-------------------\n\n{}",
        file.name,
        file.language,
        lint_file(&file.content, file.language)
    )
}
