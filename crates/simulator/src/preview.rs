//! HTML Preview Assembly
//! 
//! The active HTML file is the document shell. Stylesheets from the
//! collection go before `</head>`, other scripts before `</body>`.

use nexus_core::files::{Language, SourceFile};
use tracing::debug;

/// Splice every CSS file and every JavaScript file except the shell into it
pub fn assemble_document(shell: &SourceFile, files: &[SourceFile]) -> String {
    let styles: Vec<String> = files
        .iter()
        .filter(|f| f.language == Language::Css)
        .map(|f| format!("<style>/* {} */\n{}</style>", f.name, f.content))
        .collect();

    let scripts: Vec<String> = files
        .iter()
        .filter(|f| f.language == Language::JavaScript && f.id != shell.id)
        .map(|f| format!("<script>/* {} */\n{}</script>", f.name, f.content))
        .collect();

    debug!(
        "Assembling {} with {} stylesheet(s) and {} script(s)",
        shell.name,
        styles.len(),
        scripts.len()
    );

    let mut document = shell.content.clone();

    if !styles.is_empty() {
        let block = styles.join("\n");
        document = match document.find("</head>") {
            Some(at) => splice(&document, at, &format!("{}\n", block)),
            None => format!("{}\n{}", block, document),
        };
    }

    if !scripts.is_empty() {
        let block = scripts.join("\n");
        document = match document.find("</body>") {
            Some(at) => splice(&document, at, &format!("{}\n", block)),
            None => format!("{}\n{}", document, block),
        };
    }

    document
}

/// Insert `text` at byte offset `at`
fn splice(document: &str, at: usize, text: &str) -> String {
    let mut out = String::with_capacity(document.len() + text.len());
    out.push_str(&document[..at]);
    out.push_str(text);
    out.push_str(&document[at..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str, language: Language, content: &str) -> SourceFile {
        SourceFile::with_content(name, language, content)
    }

    #[test]
    fn test_splice_into_head_and_body() {
        let shell = file("index.html", Language::Html, "<html><head></head><body><p>x</p></body></html>");
        let files = vec![
            shell.clone(),
            file("a.css", Language::Css, "p{}"),
            file("app.js", Language::JavaScript, "go()"),
            file("b.css", Language::Css, "h1{}"),
        ];
        let html = assemble_document(&shell, &files);
        assert_eq!(
            html,
            "<html><head><style>/* a.css */\np{}</style>\n<style>/* b.css */\nh1{}</style>\n</head>\
             <body><p>x</p><script>/* app.js */\ngo()</script>\n</body></html>"
        );
    }

    #[test]
    fn test_missing_head_and_body() {
        let shell = file("index.html", Language::Html, "<p>bare</p>");
        let files = vec![
            shell.clone(),
            file("s.css", Language::Css, "p{}"),
            file("m.js", Language::JavaScript, "x()"),
        ];
        let html = assemble_document(&shell, &files);
        assert_eq!(html, "<style>/* s.css */\np{}</style>\n<p>bare</p>\n<script>/* m.js */\nx()</script>");
    }

    #[test]
    fn test_no_assets_leaves_shell_untouched() {
        let shell = file("index.html", Language::Html, "<head></head><body></body>");
        let files = vec![shell.clone(), file("main.py", Language::Python, "print(1)")];
        assert_eq!(assemble_document(&shell, &files), shell.content);
    }

    #[test]
    fn test_only_first_closing_tag_used() {
        let shell = file("index.html", Language::Html, "</head></head>");
        let files = vec![shell.clone(), file("a.css", Language::Css, "")];
        let html = assemble_document(&shell, &files);
        assert_eq!(html, "<style>/* a.css */\n</style>\n</head></head>");
        assert_eq!(html.matches("<style>").count(), 1);
    }

    #[test]
    fn test_repeatable() {
        let shell = file("index.html", Language::Html, "<head></head><body></body>");
        let files = vec![shell.clone(), file("a.css", Language::Css, "a{}"), file("b.js", Language::JavaScript, "b()")];
        assert_eq!(assemble_document(&shell, &files), assemble_document(&shell, &files));
    }
}
