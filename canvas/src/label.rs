//! Splitting a block's text into renderable parts.

#[cfg(test)]
#[path = "label_test.rs"]
mod label_test;

/// One visual segment of a block label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LabelPart {
    /// The called function's name, drawn emphasized.
    Function(String),
    /// One call argument, drawn as a pill.
    Param(String),
    /// Text that is not a call expression, drawn as-is.
    Text(String),
}

/// Parse `name(a, b, c)` into a function part followed by its params.
///
/// The name must be a single word (`[A-Za-z0-9_]+`) immediately followed by a
/// parenthesized argument list that ends the string. Params are trimmed and
/// empty ones dropped. Anything else comes back as a single [`LabelPart::Text`].
#[must_use]
pub fn parse_label(text: &str) -> Vec<LabelPart> {
    let Some((name, args)) = split_call(text) else {
        return vec![LabelPart::Text(text.to_string())];
    };

    let mut parts = vec![LabelPart::Function(name.to_string())];
    parts.extend(
        args.split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(|p| LabelPart::Param(p.to_string())),
    );
    parts
}

fn split_call(text: &str) -> Option<(&str, &str)> {
    let open = text.find('(')?;
    let name = &text[..open];
    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return None;
    }
    let rest = text[open + 1..].strip_suffix(')')?;
    Some((name, rest))
}
