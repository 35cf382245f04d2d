use std::sync::LazyLock;

use regex::Regex;

use crate::error::PatchError;

/// An `image:` key on its own line, capturing the indentation.
///
/// CRLF mode keeps `\r` out of the matched value so the line terminator
/// survives the rewrite.
static IMAGE_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?mR)^([ \t]*)image:[ \t]*.*$").expect("image line pattern is valid")
});

/// Point the first `image:` key of a compose file at `new_image`.
///
/// The matched line becomes `{indent}image: {new_image}`; the indentation
/// and line terminator are kept, the old value is discarded. Only the first
/// occurrence is rewritten, even when several services declare an image.
///
/// # Examples
///
/// ```
/// use unifier_build::compose::patch_compose;
///
/// let text = "services:\n  app:\n    image: old:1\n";
/// let patched = patch_compose(text, "new:2").unwrap();
/// assert_eq!(patched, "services:\n  app:\n    image: new:2\n");
/// ```
///
/// # Errors
///
/// [`PatchError::NoImageLine`] if no line matches.
pub fn patch_compose(text: &str, new_image: &str) -> Result<String, PatchError> {
    let caps = IMAGE_LINE.captures(text).ok_or(PatchError::NoImageLine)?;
    let (Some(line), Some(indent)) = (caps.get(0), caps.get(1)) else {
        return Err(PatchError::NoImageLine);
    };

    Ok(format!(
        "{before}{indent}image: {new_image}{after}",
        before = &text[..line.start()],
        indent = indent.as_str(),
        after = &text[line.end()..],
    ))
}
