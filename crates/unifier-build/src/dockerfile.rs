use crate::error::PatchError;

/// Token that marks the base-image line of a Dockerfile.
pub const FROM_ANCHOR: &str = "FROM ";

/// Replace the first `FROM` line of a Dockerfile.
///
/// The first line whose trimmed content starts with `FROM ` is replaced in
/// full by `new_from_line`. The replaced line keeps its own terminator
/// (`\r\n`, `\n` or `\r`, or none on an unterminated last line); every other
/// line is passed through byte for byte. Later `FROM` lines of multi-stage
/// builds are left alone.
///
/// # Examples
///
/// ```
/// use unifier_build::dockerfile::patch_dockerfile;
///
/// let text = "# base\r\nFROM a:1\r\nRUN true\r\n";
/// let patched = patch_dockerfile(text, "FROM b:2").unwrap();
/// assert_eq!(patched, "# base\r\nFROM b:2\r\nRUN true\r\n");
/// ```
///
/// # Errors
///
/// [`PatchError::NoFromLine`] if no line qualifies.
pub fn patch_dockerfile(text: &str, new_from_line: &str) -> Result<String, PatchError> {
    let mut offset = 0;
    for line in split_lines(text) {
        let (content, ending) = split_ending(line);
        if content.trim().starts_with(FROM_ANCHOR) {
            let end = offset + line.len();
            let mut patched = String::with_capacity(text.len() + new_from_line.len());
            patched.push_str(&text[..offset]);
            patched.push_str(new_from_line);
            patched.push_str(ending);
            patched.push_str(&text[end..]);
            return Ok(patched);
        }
        offset += line.len();
    }
    Err(PatchError::NoFromLine)
}

/// Split into lines, each keeping its terminator.
fn split_lines(text: &str) -> impl Iterator<Item = &str> {
    let bytes = text.as_bytes();
    let mut start = 0;
    std::iter::from_fn(move || {
        if start >= bytes.len() {
            return None;
        }
        let mut i = start;
        while i < bytes.len() {
            match bytes[i] {
                b'\n' => {
                    i += 1;
                    break;
                }
                b'\r' => {
                    i += if bytes.get(i + 1) == Some(&b'\n') { 2 } else { 1 };
                    break;
                }
                _ => i += 1,
            }
        }
        let line = &text[start..i];
        start = i;
        Some(line)
    })
}

fn split_ending(line: &str) -> (&str, &str) {
    for ending in ["\r\n", "\n", "\r"] {
        if let Some(content) = line.strip_suffix(ending) {
            return (content, ending);
        }
    }
    (line, "")
}
