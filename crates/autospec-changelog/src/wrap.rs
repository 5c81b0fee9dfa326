/// Maximum width of a changelog item line.
pub const LINEWRAP_WIDTH: usize = 75;

const ITEM_PREFIX: &str = "- ";
const CONTINUATION_PREFIX: &str = "  ";

/// Render one changelog item as `- <text>` lines, greedily wrapped at
/// [`LINEWRAP_WIDTH`] columns with a two-space continuation indent.
///
/// Words longer than the available width are kept whole on their own line.
pub fn wrap_item(text: &str) -> Vec<String> {
    wrap_item_at(text, LINEWRAP_WIDTH)
}

pub(crate) fn wrap_item_at(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::from(ITEM_PREFIX);
    let mut has_word = false;

    for word in text.split_whitespace() {
        let needed = current.chars().count() + usize::from(has_word) + word.chars().count();
        if has_word && needed > width {
            lines.push(std::mem::replace(&mut current, String::from(CONTINUATION_PREFIX)));
            has_word = false;
        }
        if has_word {
            current.push(' ');
        }
        current.push_str(word);
        has_word = true;
    }

    if has_word || lines.is_empty() {
        lines.push(current.trim_end().to_string());
    }
    lines
}
