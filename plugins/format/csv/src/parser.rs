// ═══════════════════════════════════════════════════════════════
//  RFC 4180 field splitter
// ═══════════════════════════════════════════════════════════════

/// Split one line into fields.
///
/// With `quoting`, a field starting with `"` runs to the matching quote,
/// `""` inside it is a literal quote, and characters between the closing
/// quote and the next delimiter are dropped. An unterminated quote keeps
/// whatever was read. A trailing delimiter yields a final empty field.
pub(crate) fn split_fields(line: &str, delimiter: char, quoting: bool) -> Vec<String> {
    if !quoting {
        return line.split(delimiter).map(str::to_string).collect();
    }

    let mut fields = Vec::new();
    let mut chars = line.chars().peekable();
    let mut field = String::new();

    loop {
        let mut delimited = false;
        if chars.peek() == Some(&'"') {
            chars.next();
            while let Some(c) = chars.next() {
                if c != '"' {
                    field.push(c);
                } else if chars.peek() == Some(&'"') {
                    chars.next();
                    field.push('"');
                } else {
                    break;
                }
            }
            delimited = chars.by_ref().any(|c| c == delimiter);
        } else {
            for c in chars.by_ref() {
                if c == delimiter {
                    delimited = true;
                    break;
                }
                field.push(c);
            }
        }

        fields.push(std::mem::take(&mut field));

        if chars.peek().is_none() {
            if delimited {
                fields.push(String::new());
            }
            break;
        }
    }

    fields
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_split() {
        assert_eq!(split_fields("1,a", ',', true), vec!["1", "a"]);
        assert_eq!(split_fields("1\ta", '\t', false), vec!["1", "a"]);
    }

    #[test]
    fn empty_fields_are_kept() {
        assert_eq!(split_fields(",a,", ',', true), vec!["", "a", ""]);
        assert_eq!(split_fields("", ',', true), vec![""]);
        assert_eq!(split_fields("a,,b", ',', false), vec!["a", "", "b"]);
    }

    #[test]
    fn quoted_fields() {
        assert_eq!(
            split_fields(r#""a,b","say ""hi""",c"#, ',', true),
            vec!["a,b", r#"say "hi""#, "c"]
        );
        assert_eq!(split_fields(r#""x"junk,y"#, ',', true), vec!["x", "y"]);
        assert_eq!(split_fields(r#""open,end"#, ',', true), vec!["open,end"]);
    }

    #[test]
    fn quoting_disabled_keeps_quotes() {
        assert_eq!(split_fields(r#""a",b"#, ',', false), vec![r#""a""#, "b"]);
    }
}
