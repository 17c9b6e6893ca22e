use crate::settings::DEFAULT_MAX_ATTR_LEN;

/// Split `line` on any of `delims`, dropping empty pieces, and return the
/// trimmed piece at `index`.
///
/// Empty pieces are skipped so that runs of delimiters (`"--"`) count as
/// one separator, which is how MegaCLI's dash-delimited lines read.
pub fn segment<'a>(line: &'a str, delims: &[char], index: usize) -> Option<&'a str> {
    line.split(|c: char| delims.contains(&c))
        .filter(|piece| !piece.is_empty())
        .nth(index)
        .map(str::trim)
}

/// Whitespace token at `index` (zero-based)
pub fn token(line: &str, index: usize) -> Option<&str> {
    line.split_whitespace().nth(index)
}

/// Parse the integer prefix of `text`: optional sign, then digits.
/// Trailing text such as `%`, `.` or `s` is ignored.
pub fn leading_int(text: &str) -> Option<i64> {
    let text = text.trim_start();
    let (sign, digits) = match text.as_bytes().first()? {
        b'-' => (-1, &text[1..]),
        b'+' => (1, &text[1..]),
        _ => (1, text),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    digits[..end].parse::<i64>().ok().map(|value| sign * value)
}

/// Copy `value` into a new string of at most `max_len` characters
pub fn bounded(value: &str, max_len: usize) -> String {
    value.chars().take(max_len).collect()
}

/// Extracts trimmed, length-bounded fields from single output lines.
///
/// Every method first checks that `marker` occurs literally in the line;
/// spacing and case must match what MegaCLI prints.
#[derive(Debug, Clone, Copy)]
pub struct FieldExtractor {
    max_len: usize,
}

impl Default for FieldExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTR_LEN)
    }
}

impl FieldExtractor {
    pub fn new(max_len: usize) -> Self {
        Self { max_len }
    }

    /// Text piece at `index` after splitting on `delims`
    pub fn text(&self, line: &str, marker: &str, delims: &[char], index: usize) -> Option<String> {
        if !line.contains(marker) {
            return None;
        }
        // A marker with nothing after its delimiter yields an empty value
        Some(bounded(segment(line, delims, index).unwrap_or(""), self.max_len))
    }

    /// Value after the first colon: `"Product Name    : PERC H710"`
    pub fn colon_text(&self, line: &str, marker: &str) -> Option<String> {
        self.text(line, marker, &[':'], 1)
    }

    /// Integer at the start of the piece at `index` after splitting on `delims`
    pub fn int(&self, line: &str, marker: &str, delims: &[char], index: usize) -> Option<u32> {
        if !line.contains(marker) {
            return None;
        }
        segment(line, delims, index)
            .and_then(leading_int)
            .and_then(|value| u32::try_from(value).ok())
    }

    /// Integer at the start of whitespace token `index`:
    /// `"Enclosure Device ID: 32"` has the id at token 3.
    pub fn int_token(&self, line: &str, marker: &str, index: usize) -> Option<u32> {
        if !line.contains(marker) {
            return None;
        }
        token(line, index)
            .and_then(leading_int)
            .and_then(|value| u32::try_from(value).ok())
    }

    /// Assign a bounded text field when the marker matches. Returns whether
    /// the line was consumed.
    pub fn assign_text(&self, dest: &mut String, line: &str, marker: &str) -> bool {
        match self.colon_text(line, marker) {
            Some(value) => {
                *dest = value;
                true
            }
            None => false,
        }
    }
}
