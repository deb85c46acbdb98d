/// A parsed leading frontmatter block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frontmatter {
    /// Key/value pairs in document order. Values are kept as raw strings,
    /// never type-coerced.
    pub entries: Vec<(String, String)>,
    /// Byte offset into the original content where the body begins, i.e.
    /// just past the newline of the closing delimiter line.
    pub body_start: usize,
}

/// Parses a leading `---`-delimited frontmatter block.
///
/// The block must open on the very first line and close on a later `---`
/// line that is itself terminated by a newline; anything else means the
/// document has no frontmatter and `None` is returned. Lines inside the
/// block without a `:` are ignored.
pub fn parse(content: &str) -> Option<Frontmatter> {
    let rest = content.strip_prefix("---")?;
    let open_end = rest.find('\n')?;
    if !rest[..open_end].trim().is_empty() {
        return None;
    }

    let inner = &rest[open_end + 1..];
    let base = 3 + open_end + 1;

    let mut entries = vec![];
    let mut pos = 0;
    loop {
        // A final line without a newline cannot be the closing delimiter.
        let line_len = inner[pos..].find('\n')?;
        let line = &inner[pos..pos + line_len];

        if is_closing_delimiter(line) {
            return Some(Frontmatter {
                entries,
                body_start: base + pos + line_len + 1,
            });
        }

        if let Some(colon) = line.find(':') {
            let key = line[..colon].trim().to_string();
            let value = line[colon + 1..].trim().to_string();
            entries.push((key, value));
        }

        pos += line_len + 1;
    }
}

fn is_closing_delimiter(line: &str) -> bool {
    line.strip_prefix("---")
        .is_some_and(|rest| rest.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_simple_block() {
        let content = "---\na: 1\nb: 2\n---\nBody";
        let fm = parse(content).unwrap();
        assert_eq!(
            fm.entries,
            vec![("a".to_string(), "1".to_string()), ("b".to_string(), "2".to_string())]
        );
        assert_eq!(&content[fm.body_start..], "Body");
    }

    #[test]
    fn values_are_not_type_coerced() {
        let content = "---\ncount: 42\nflag: true\n---\n";
        let fm = parse(content).unwrap();
        assert_eq!(fm.entries[0].1, "42");
        assert_eq!(fm.entries[1].1, "true");
    }

    #[test]
    fn splits_on_first_colon_only() {
        let content = "---\nurl: https://example.com\n---\n";
        let fm = parse(content).unwrap();
        assert_eq!(
            fm.entries,
            vec![("url".to_string(), "https://example.com".to_string())]
        );
    }

    #[test]
    fn lines_without_colon_are_ignored() {
        let content = "---\nmalformed line\nkey: value\n---\nBody";
        let fm = parse(content).unwrap();
        assert_eq!(fm.entries.len(), 1);
        assert_eq!(fm.entries[0].0, "key");
    }

    #[test]
    fn no_opening_delimiter_means_no_frontmatter() {
        assert_eq!(parse("# Heading\n---\n"), None);
    }

    #[test]
    fn unclosed_block_means_no_frontmatter() {
        assert_eq!(parse("---\na: 1\n"), None);
        // closing delimiter with no trailing newline does not count
        assert_eq!(parse("---\na: 1\n---"), None);
    }

    #[test]
    fn delimiter_lines_may_carry_trailing_whitespace() {
        let content = "---  \na: 1\n---\t\nBody";
        let fm = parse(content).unwrap();
        assert_eq!(&content[fm.body_start..], "Body");
    }

    #[test]
    fn a_thematic_break_later_in_the_body_is_not_frontmatter() {
        let content = "---\na: 1\n---\nBody\n---\nmore";
        let fm = parse(content).unwrap();
        assert_eq!(fm.entries.len(), 1);
        assert_eq!(&content[fm.body_start..], "Body\n---\nmore");
    }
}
