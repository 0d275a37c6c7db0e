//! Quote-tolerant field splitting for delimiter-separated access logs.

/// Split one line into fields on `separator`.
///
/// A field that starts with `"` is quoted: `""` inside it is a literal quote,
/// and a quote followed by the separator or end of line closes it. Any other
/// quote is kept as-is, in quoted and unquoted fields alike, and an
/// unterminated quoted field runs to the end of the line. Consecutive
/// separators produce empty fields. Only the first record is read; a trailing
/// newline is ignored and an empty line yields no fields.
pub fn split_fields(line: &str, separator: char) -> Vec<String> {
    let line = line
        .strip_suffix('\n')
        .map(|l| l.strip_suffix('\r').unwrap_or(l))
        .unwrap_or(line);
    if line.is_empty() {
        return Vec::new();
    }

    let mut fields = Vec::new();
    let mut chars = line.chars().peekable();

    'field: loop {
        let mut field = String::new();

        if chars.peek() == Some(&'"') {
            chars.next();
            loop {
                match chars.next() {
                    Some('"') => match chars.peek() {
                        Some('"') => {
                            chars.next();
                            field.push('"');
                        }
                        Some(&c) if c == separator => {
                            chars.next();
                            fields.push(field);
                            continue 'field;
                        }
                        Some('\n') | None => {
                            fields.push(field);
                            return fields;
                        }
                        // bare quote
                        Some(_) => field.push('"'),
                    },
                    Some(c) => field.push(c),
                    None => {
                        fields.push(field);
                        return fields;
                    }
                }
            }
        }

        loop {
            match chars.next() {
                Some(c) if c == separator => {
                    fields.push(field);
                    continue 'field;
                }
                Some('\n') | None => {
                    fields.push(field);
                    return fields;
                }
                Some(c) => field.push(c),
            }
        }
    }
}
