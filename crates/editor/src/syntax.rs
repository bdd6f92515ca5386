//! Syntax Highlighting
//! 
//! Tree-sitter based highlighting that renders file content as HTML-like
//! markup (`<span class="token KIND">`) for the overlay layer. Grammars
//! without a usable query degrade to escaped plain text.

use std::collections::HashMap;
use std::fmt::Write as _;

use nexus_core::files::Language;
use once_cell::sync::Lazy;
use streaming_iterator::StreamingIterator;
use tracing::{debug, warn};
use tree_sitter::{Parser, Query, QueryCursor};

/// Highlight type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HighlightType {
    Keyword,
    String,
    Number,
    Comment,
    Function,
    Type,
    Attribute,
    Property,
    Constant,
    Namespace,
    Tag,
}

impl HighlightType {
    /// Convert from tree-sitter capture name
    pub fn from_capture_name(name: &str) -> Option<Self> {
        match name {
            "keyword" | "keyword.control" | "keyword.function" => Some(Self::Keyword),
            "string" | "string.special" => Some(Self::String),
            "number" | "float" => Some(Self::Number),
            "comment" => Some(Self::Comment),
            "function" | "function.method" => Some(Self::Function),
            "type" | "type.builtin" => Some(Self::Type),
            "attribute" => Some(Self::Attribute),
            "property" => Some(Self::Property),
            "constant" | "constant.builtin" => Some(Self::Constant),
            "namespace" => Some(Self::Namespace),
            "tag" => Some(Self::Tag),
            _ => None,
        }
    }

    /// Token kind used in the class attribute
    pub fn class_name(&self) -> &'static str {
        match self {
            Self::Keyword => "keyword",
            Self::String => "string",
            Self::Number => "number",
            Self::Comment => "comment",
            Self::Function => "function",
            Self::Type => "class-name",
            Self::Attribute => "attr-name",
            Self::Property => "property",
            Self::Constant => "boolean",
            Self::Namespace => "namespace",
            Self::Tag => "tag",
        }
    }
}

/// A highlighted byte range in the text
#[derive(Debug, Clone)]
pub struct HighlightRange {
    pub start: usize,
    pub end: usize,
    pub highlight_type: HighlightType,
    pattern_index: usize,
}

/// Anything that can turn source text into overlay markup
pub trait Highlight: Send + Sync {
    /// Markup for `text`; stripping tags and unescaping must give back `text`
    fn highlight(&self, text: &str, grammar_id: &str) -> String;
}

/// Escapes text without adding any tokens
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainHighlighter;

impl Highlight for PlainHighlighter {
    fn highlight(&self, text: &str, _grammar_id: &str) -> String {
        escape_html(text)
    }
}

struct Grammar {
    language: tree_sitter::Language,
    query: Option<Query>,
}

impl Grammar {
    fn load(id: &str, language: tree_sitter::Language, source: &str) -> Self {
        let query = match Query::new(&language, source) {
            Ok(query) => Some(query),
            Err(e) => {
                warn!("Highlight query for {} rejected, using plain text: {}", id, e);
                None
            }
        };
        Self { language, query }
    }
}

/// Highlighter backed by the bundled tree-sitter grammars
pub struct TreeSitterHighlighter {
    grammars: HashMap<&'static str, Grammar>,
}

impl TreeSitterHighlighter {
    /// Load every bundled grammar
    pub fn new() -> Self {
        let jsx_source = format!("{}\n{}", JSX_HIGHLIGHTS, JAVASCRIPT_HIGHLIGHTS);
        let table: [(&'static str, tree_sitter::Language, &str); 8] = [
            ("python", tree_sitter_python::LANGUAGE.into(), PYTHON_HIGHLIGHTS),
            ("c", tree_sitter_c::LANGUAGE.into(), C_HIGHLIGHTS),
            ("cpp", tree_sitter_cpp::LANGUAGE.into(), CPP_HIGHLIGHTS),
            ("java", tree_sitter_java::LANGUAGE.into(), JAVA_HIGHLIGHTS),
            ("javascript", tree_sitter_javascript::LANGUAGE.into(), JAVASCRIPT_HIGHLIGHTS),
            ("jsx", tree_sitter_javascript::LANGUAGE.into(), &jsx_source),
            ("html", tree_sitter_html::LANGUAGE.into(), HTML_HIGHLIGHTS),
            ("css", tree_sitter_css::LANGUAGE.into(), CSS_HIGHLIGHTS),
        ];

        let grammars = table
            .into_iter()
            .map(|(id, language, source)| (id, Grammar::load(id, language, source)))
            .collect();

        Self { grammars }
    }

    /// Whether a grammar with this id is bundled
    pub fn supports(&self, grammar_id: &str) -> bool {
        self.grammars.contains_key(grammar_id)
    }

    /// Highlighted ranges, or None when the grammar is unknown or unusable
    pub fn highlights(&self, text: &str, grammar_id: &str) -> Option<Vec<HighlightRange>> {
        let grammar = self.grammars.get(grammar_id)?;
        let query = grammar.query.as_ref()?;

        let mut parser = Parser::new();
        if let Err(e) = parser.set_language(&grammar.language) {
            warn!("Failed to set language {}: {}", grammar_id, e);
            return None;
        }
        let tree = parser.parse(text, None)?;

        let mut ranges = Vec::new();
        let mut cursor = QueryCursor::new();
        let mut matches = cursor.matches(query, tree.root_node(), text.as_bytes());
        while let Some(m) = matches.next() {
            for capture in m.captures {
                let name = query.capture_names()[capture.index as usize];
                if let Some(highlight_type) = HighlightType::from_capture_name(name) {
                    ranges.push(HighlightRange {
                        start: capture.node.start_byte(),
                        end: capture.node.end_byte(),
                        highlight_type,
                        pattern_index: m.pattern_index,
                    });
                }
            }
        }

        // Outer and earlier-listed captures win over nested ones
        ranges.sort_by(|a, b| {
            a.start
                .cmp(&b.start)
                .then(b.end.cmp(&a.end))
                .then(a.pattern_index.cmp(&b.pattern_index))
        });
        debug!("{} highlight ranges for {}", ranges.len(), grammar_id);
        Some(ranges)
    }
}

impl Default for TreeSitterHighlighter {
    fn default() -> Self {
        Self::new()
    }
}

impl Highlight for TreeSitterHighlighter {
    fn highlight(&self, text: &str, grammar_id: &str) -> String {
        match self.highlights(text, grammar_id) {
            Some(ranges) => to_markup(text, &ranges),
            None => escape_html(text),
        }
    }
}

static DEFAULT_HIGHLIGHTER: Lazy<TreeSitterHighlighter> = Lazy::new(TreeSitterHighlighter::new);

/// Shared highlighter with every bundled grammar
pub fn default_highlighter() -> &'static TreeSitterHighlighter {
    &DEFAULT_HIGHLIGHTER
}

/// Escape `&`, `<` and `>`
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

fn to_markup(text: &str, ranges: &[HighlightRange]) -> String {
    let mut out = String::with_capacity(text.len() * 2);
    let mut pos = 0;
    for range in ranges {
        if range.start < pos
            || range.start >= range.end
            || range.end > text.len()
            || !text.is_char_boundary(range.start)
            || !text.is_char_boundary(range.end)
        {
            continue;
        }
        out.push_str(&escape_html(&text[pos..range.start]));
        let _ = write!(
            out,
            "<span class=\"token {}\">{}</span>",
            range.highlight_type.class_name(),
            escape_html(&text[range.start..range.end])
        );
        pos = range.end;
    }
    out.push_str(&escape_html(&text[pos..]));
    out
}

/// Render content with a given highlighter for the overlay layer
pub fn render_with(highlighter: &dyn Highlight, content: &str, language: Language) -> String {
    let mut markup = highlighter.highlight(content, language.grammar_id());
    // A trailing newline needs a line box or the overlay ends one row short
    if content.ends_with('\n') {
        markup.push_str("<br />");
    }
    markup
}

/// Render content with the shared tree-sitter highlighter
pub fn render_highlighted(content: &str, language: Language) -> String {
    render_with(default_highlighter(), content, language)
}

// Highlight queries for the bundled grammars

const PYTHON_HIGHLIGHTS: &str = r#"
(comment) @comment
(string) @string
(integer) @number
(float) @number
[(true) (false) (none)] @constant.builtin
(decorator) @attribute
(function_definition name: (identifier) @function)
(class_definition name: (identifier) @type)
(call function: (identifier) @function)
(call function: (attribute attribute: (identifier) @function.method))
[
  "def" "class" "return" "if" "elif" "else" "for" "while" "in" "not"
  "and" "or" "import" "from" "as" "pass" "break" "continue" "try"
  "except" "finally" "raise" "with" "lambda" "yield" "global" "assert"
  "del" "async" "await"
] @keyword
"#;

const C_HIGHLIGHTS: &str = r##"
(comment) @comment
(string_literal) @string
(char_literal) @string
(system_lib_string) @string
(number_literal) @number
[(true) (false)] @constant.builtin
(primitive_type) @type.builtin
(type_identifier) @type
(function_declarator declarator: (identifier) @function)
(call_expression function: (identifier) @function)
[
  "#include" "#define" "if" "else" "for" "while" "do" "return" "break"
  "continue" "switch" "case" "default" "struct" "enum" "union" "typedef"
  "static" "const" "sizeof" "goto" "extern"
] @keyword
"##;

const CPP_HIGHLIGHTS: &str = r##"
(comment) @comment
(string_literal) @string
(raw_string_literal) @string
(char_literal) @string
(system_lib_string) @string
(number_literal) @number
[(true) (false)] @constant.builtin
(primitive_type) @type.builtin
(type_identifier) @type
(namespace_identifier) @namespace
(function_declarator declarator: (identifier) @function)
(call_expression function: (identifier) @function)
[
  "#include" "#define" "if" "else" "for" "while" "do" "return" "break"
  "continue" "switch" "case" "default" "struct" "enum" "union" "typedef"
  "static" "const" "sizeof" "extern" "class" "namespace" "public"
  "private" "protected" "template" "typename" "new" "delete" "using"
  "virtual" "try" "catch" "throw"
] @keyword
"##;

const JAVA_HIGHLIGHTS: &str = r#"
(line_comment) @comment
(block_comment) @comment
(string_literal) @string
(character_literal) @string
(decimal_integer_literal) @number
(hex_integer_literal) @number
(decimal_floating_point_literal) @number
[(true) (false) (null_literal)] @constant.builtin
(marker_annotation) @attribute
(annotation) @attribute
(integral_type) @type.builtin
(floating_point_type) @type.builtin
(boolean_type) @type.builtin
(void_type) @type.builtin
(type_identifier) @type
(method_declaration name: (identifier) @function)
(method_invocation name: (identifier) @function.method)
[
  "public" "private" "protected" "static" "final" "abstract" "class"
  "interface" "extends" "implements" "new" "return" "if" "else" "for"
  "while" "do" "switch" "case" "default" "try" "catch" "finally" "throw"
  "throws" "import" "package" "break" "continue"
] @keyword
"#;

const JAVASCRIPT_HIGHLIGHTS: &str = r#"
(comment) @comment
(string) @string
(template_string) @string
(regex) @string
(number) @number
[(true) (false) (null) (undefined)] @constant.builtin
(function_declaration name: (identifier) @function)
(call_expression function: (identifier) @function)
(call_expression function: (member_expression property: (property_identifier) @function.method))
(property_identifier) @property
[
  "var" "let" "const" "function" "return" "if" "else" "for" "while" "do"
  "switch" "case" "default" "break" "continue" "new" "class" "extends"
  "import" "export" "from" "async" "await" "try" "catch" "finally"
  "throw" "typeof" "instanceof" "in" "of"
] @keyword
"#;

const JSX_HIGHLIGHTS: &str = r#"
(jsx_opening_element name: (identifier) @tag)
(jsx_closing_element name: (identifier) @tag)
(jsx_self_closing_element name: (identifier) @tag)
(jsx_attribute (property_identifier) @attribute)
"#;

const HTML_HIGHLIGHTS: &str = r#"
(comment) @comment
(doctype) @keyword
(tag_name) @tag
(attribute_name) @attribute
(quoted_attribute_value) @string
(attribute_value) @string
"#;

const CSS_HIGHLIGHTS: &str = r#"
(comment) @comment
(at_keyword) @keyword
(important) @keyword
(tag_name) @tag
(class_name) @type
(id_name) @type
(property_name) @property
(string_value) @string
(color_value) @constant
(integer_value) @number
(float_value) @number
"#;
