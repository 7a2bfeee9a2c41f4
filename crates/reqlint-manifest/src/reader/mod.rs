//! Logical-line assembly for requirements manifests.
//!
//! Handles the line-level format before any requirement parsing: comment
//! lines, blank lines, trailing inline comments, and backslash continuations.
//! Line numbers are 1-based and refer to the first physical line of a
//! logical line.

/// One logical manifest line with its source position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicalLine {
    pub text: String,
    pub line: usize,
}

/// Split manifest content into logical lines.
///
/// Comment-only and blank lines are dropped. A trailing backslash folds the
/// next physical line into the current logical line.
pub fn logical_lines(content: &str) -> Vec<LogicalLine> {
    let mut lines = Vec::new();
    let mut pending = String::new();
    let mut pending_start = 0;

    for (idx, physical) in content.lines().enumerate() {
        let number = idx + 1;

        if pending.is_empty() {
            pending_start = number;
        }

        match physical.trim_end().strip_suffix('\\') {
            Some(head) => {
                pending.push_str(head);
                continue;
            },
            None => pending.push_str(physical),
        }

        let text = strip_comment(&pending).trim().to_string();
        pending.clear();

        if !text.is_empty() {
            lines.push(LogicalLine {
                text,
                line: pending_start,
            });
        }
    }

    // A dangling continuation at EOF is treated as a complete line
    let text = strip_comment(&pending).trim().to_string();
    if !text.is_empty() {
        lines.push(LogicalLine {
            text,
            line: pending_start,
        });
    }

    lines
}

/// Remove a trailing inline comment.
///
/// A `#` starts a comment when it appears at the start of the line or after
/// whitespace, and is not inside a quoted string.
fn strip_comment(line: &str) -> &str {
    let mut quote: Option<char> = None;
    let mut prev_is_space = true;

    for (pos, c) in line.char_indices() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {},
            None => match c {
                '\'' | '"' => quote = Some(c),
                '#' if prev_is_space => return &line[..pos],
                _ => {},
            },
        }
        prev_is_space = c.is_whitespace();
    }

    line
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comments_and_blanks_dropped() {
        let content = "\
# development tooling
flake8==4.0.1

   # indented comment
pandas==1.3.5
";
        let lines = logical_lines(content);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].text, "flake8==4.0.1");
        assert_eq!(lines[0].line, 2);
        assert_eq!(lines[1].text, "pandas==1.3.5");
        assert_eq!(lines[1].line, 5);
    }

    #[test]
    fn test_inline_comment() {
        let lines = logical_lines("scipy>=1.4.1 # pinned for ABI\n");
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].text, "scipy>=1.4.1");
    }

    #[test]
    fn test_hash_inside_quotes_kept() {
        let lines = logical_lines("pkg==1.0; sys_platform == 'a#b'\n");
        assert_eq!(lines[0].text, "pkg==1.0; sys_platform == 'a#b'");
    }

    #[test]
    fn test_hash_without_leading_space_kept() {
        // not a comment: no whitespace before the hash
        let lines = logical_lines("pkg==1.0+abc#def\n");
        assert_eq!(lines[0].text, "pkg==1.0+abc#def");
    }

    #[test]
    fn test_continuation() {
        let content = "scipy>=1.4.1, \\\n    <=1.10.1\n";
        let lines = logical_lines(content);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].text, "scipy>=1.4.1,     <=1.10.1");
        assert_eq!(lines[0].line, 1);
    }

    #[test]
    fn test_dangling_continuation_at_eof() {
        let lines = logical_lines("flake8==4.0.1\\");
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].text, "flake8==4.0.1");
    }

    #[test]
    fn test_whitespace_only_file() {
        assert!(logical_lines("\n   \n\t\n").is_empty());
    }
}
