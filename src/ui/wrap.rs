use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Wraps text to a display width, breaking at whitespace when possible.
/// Leading/trailing blank lines are dropped and blank runs are capped at `max_empty_lines`.
pub fn wrap_text(text: &str, max_width: usize, max_empty_lines: usize) -> Vec<String> {
    let mut lines = Vec::new();
    for raw_line in text.lines() {
        wrap_line(raw_line, max_width.max(1), &mut lines);
    }
    trim_empty_edges(&mut lines);
    collapse_empty_lines(&mut lines, max_empty_lines);
    lines
}

fn wrap_line(raw_line: &str, max_width: usize, lines: &mut Vec<String>) {
    if raw_line.trim().is_empty() {
        lines.push(String::new());
        return;
    }

    let mut current = String::new();
    let mut current_width = 0usize;
    // byte offset in `current` just after the last whitespace, and the width up to it
    let mut break_at: Option<(usize, usize)> = None;

    for character in raw_line.chars() {
        let char_width = UnicodeWidthChar::width(character).unwrap_or(0).max(1);

        if current_width + char_width > max_width && current_width > 0 {
            match break_at.filter(|(offset, _)| *offset < current.len()) {
                Some((offset, width_before)) => {
                    let rest = current.split_off(offset);
                    push_wrapped(lines, &current);
                    current = rest;
                    current_width -= width_before;
                    // the carried word may still leave no room for this character
                    if current_width + char_width > max_width {
                        push_wrapped(lines, &std::mem::take(&mut current));
                        current_width = 0;
                    }
                }
                None => {
                    push_wrapped(lines, &std::mem::take(&mut current));
                    current_width = 0;
                }
            }
            break_at = None;
            if current.is_empty() && character.is_whitespace() {
                continue;
            }
        }

        current.push(character);
        current_width += char_width;
        if character.is_whitespace() {
            break_at = Some((current.len(), current_width));
        }
    }

    push_wrapped(lines, &current);
}

/// Pushes a wrapped segment; whitespace-only segments produced by a break are dropped
fn push_wrapped(lines: &mut Vec<String>, segment: &str) {
    if !segment.trim().is_empty() {
        lines.push(segment.trim_end().to_string());
    }
}

fn trim_empty_edges(lines: &mut Vec<String>) {
    while lines.first().is_some_and(String::is_empty) {
        lines.remove(0);
    }
    while lines.last().is_some_and(String::is_empty) {
        lines.pop();
    }
}

fn collapse_empty_lines(lines: &mut Vec<String>, max_empty_lines: usize) {
    let mut empty_run = 0usize;
    lines.retain(|line| {
        if line.is_empty() {
            empty_run += 1;
            empty_run <= max_empty_lines
        } else {
            empty_run = 0;
            true
        }
    });
}

pub fn display_width(text: &str) -> usize {
    UnicodeWidthStr::width(text)
}
