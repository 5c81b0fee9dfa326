/// Segmentation state while walking the lines of a commit message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    BeforeSubject,
    Subject,
    BeforeBody,
    InContinuation,
    Body,
}

const ELLIPSES: [&str; 2] = ["...", "\u{2026}"];

fn strip_leading_ellipsis(line: &str) -> Option<&str> {
    ELLIPSES.iter().find_map(|e| line.strip_prefix(e))
}

fn strip_trailing_ellipsis(text: &str) -> &str {
    ELLIPSES
        .iter()
        .find_map(|e| text.strip_suffix(e))
        .unwrap_or(text)
        .trim_end()
}

fn push_words(item: &mut String, line: &str) {
    let line = line.trim();
    if line.is_empty() {
        return;
    }
    if !item.is_empty() {
        item.push(' ');
    }
    item.push_str(line);
}

fn start_item(items: &mut Vec<String>, line: &str) {
    let mut item = String::new();
    push_words(&mut item, line.strip_prefix('-').unwrap_or(line));
    items.push(item);
}

/// Split a commit message into changelog items.
///
/// The subject (first paragraph) is always the first item. After it, only
/// dash-prefixed lines open further items; a paragraph of free-form prose
/// ends the changelog part of the message. A paragraph opening with an
/// ellipsis continues the subject.
///
/// ```
/// use autospec_changelog::commitlog_to_changelog_items;
///
/// let items = commitlog_to_changelog_items("Fix build\n\n- drop patch\n- new dep\n");
/// assert_eq!(items, ["Fix build", "drop patch", "new dep"]);
/// ```
pub fn commitlog_to_changelog_items(commitlog: &str) -> Vec<String> {
    let mut items: Vec<String> = Vec::new();
    let mut state = State::BeforeSubject;

    for raw in commitlog.lines() {
        let line = raw.trim();
        let blank = line.is_empty();

        state = match state {
            State::BeforeSubject => {
                if blank {
                    State::BeforeSubject
                } else {
                    start_item(&mut items, line);
                    State::Subject
                }
            }
            State::Subject => {
                if blank {
                    State::BeforeBody
                } else {
                    if let Some(subject) = items.last_mut() {
                        push_words(subject, line);
                    }
                    State::Subject
                }
            }
            State::BeforeBody => {
                if blank {
                    State::BeforeBody
                } else if let Some(rest) = strip_leading_ellipsis(line) {
                    if let Some(subject) = items.first_mut() {
                        let trimmed = strip_trailing_ellipsis(subject).len();
                        subject.truncate(trimmed);
                        push_words(subject, rest);
                    }
                    State::InContinuation
                } else if line.starts_with('-') {
                    start_item(&mut items, line);
                    State::Body
                } else {
                    break;
                }
            }
            State::InContinuation => {
                if blank {
                    State::BeforeBody
                } else if line.starts_with('-') {
                    start_item(&mut items, line);
                    State::Body
                } else {
                    if let Some(subject) = items.first_mut() {
                        push_words(subject, line);
                    }
                    State::InContinuation
                }
            }
            State::Body => {
                if blank {
                    break;
                } else if line.starts_with('-') {
                    start_item(&mut items, line);
                    State::Body
                } else {
                    if let Some(item) = items.last_mut() {
                        push_words(item, line);
                    }
                    State::Body
                }
            }
        };
    }

    items
}
