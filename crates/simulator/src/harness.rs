//! JavaScript Console Harness
//! 
//! Wraps a script so that `console.log` output, uncaught errors and
//! thrown exceptions end up as text in the preview body.

const HARNESS_HEAD: &str = r#"<script>
  const oldLog = console.log;
  const logs = [];
  console.log = (...args) => {
    logs.push(args.join(' '));
    document.body.innerText = logs.join('\n');
    oldLog.apply(console, args);
  };
  window.onerror = function(message) {
    document.body.innerText += '\n🛑 Error: ' + message;
  };
  try {
"#;

const HARNESS_TAIL: &str = r#"
  } catch (e) {
    document.body.innerText += '\n🛑 Exception: ' + e.message;
  }
</script>"#;

/// Wrap source code in the console-capturing harness
pub fn wrap_script(source: &str) -> String {
    let mut out = String::with_capacity(HARNESS_HEAD.len() + source.len() + HARNESS_TAIL.len());
    out.push_str(HARNESS_HEAD);
    out.push_str(source);
    out.push_str(HARNESS_TAIL);
    out
}

/// Buffer behind the overridden `console.log`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogBuffer {
    lines: Vec<String>,
}

impl LogBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// One `console.log` call; arguments are joined by a space
    pub fn log(&mut self, args: &[&str]) {
        self.lines.push(args.join(" "));
    }

    /// Text shown in the preview body
    pub fn render(&self) -> String {
        self.lines.join("\n")
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// What the harness would print for `console.log` calls whose arguments
/// are literals; other arguments appear as written.
pub fn captured_log(source: &str) -> String {
    let mut buffer = LogBuffer::new();
    let mut rest = source;
    while let Some(at) = rest.find("console.log(") {
        rest = &rest[at + "console.log(".len()..];
        let (args, consumed) = split_call_args(rest);
        let rendered: Vec<String> = args.iter().map(|arg| literal_value(arg)).collect();
        let refs: Vec<&str> = rendered.iter().map(String::as_str).collect();
        buffer.log(&refs);
        rest = &rest[consumed..];
    }
    buffer.render()
}

/// Split the text after `(` into top-level arguments, up to the matching `)`
fn split_call_args(text: &str) -> (Vec<String>, usize) {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for (idx, c) in text.char_indices() {
        if let Some(q) = quote {
            current.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' | '`' => {
                quote = Some(c);
                current.push(c);
            }
            '(' | '[' | '{' => {
                depth += 1;
                current.push(c);
            }
            ')' if depth == 0 => {
                if !current.trim().is_empty() {
                    args.push(current.trim().to_string());
                }
                return (args, idx + 1);
            }
            ')' | ']' | '}' => {
                depth = depth.saturating_sub(1);
                current.push(c);
            }
            ',' if depth == 0 => {
                args.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(c),
        }
    }

    if !current.trim().is_empty() {
        args.push(current.trim().to_string());
    }
    (args, text.len())
}

/// Unquote a string literal; anything else is returned as written
fn literal_value(arg: &str) -> String {
    let (Some(first), Some(last)) = (arg.chars().next(), arg.chars().last()) else {
        return String::new();
    };
    if arg.len() < 2 || first != last || !matches!(first, '"' | '\'' | '`') {
        return arg.to_string();
    }

    let inner = &arg[1..arg.len() - 1];
    let mut out = String::with_capacity(inner.len());
    let mut escaped = false;
    for c in inner.chars() {
        if escaped {
            out.push(match c {
                'n' => '\n',
                't' => '\t',
                other => other,
            });
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else {
            out.push(c);
        }
    }
    out
}
