//! Greedy packing of report lines into message-sized bodies.

/// Packs `lines` into newline-joined bodies of at most `max_chars` characters,
/// counting one separator per line. A line is never split; a single line
/// longer than the budget gets a chunk of its own. Input order is preserved
/// and every line lands in exactly one chunk.
pub fn chunk_lines(lines: &[String], max_chars: usize) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut current_len = 0usize;

    for line in lines {
        let added = line.chars().count() + 1;
        if current_len + added > max_chars && !current.is_empty() {
            parts.push(current.join("\n"));
            current = vec![line.as_str()];
            current_len = added;
        } else {
            current.push(line.as_str());
            current_len += added;
        }
    }
    if !current.is_empty() {
        parts.push(current.join("\n"));
    }
    parts
}
