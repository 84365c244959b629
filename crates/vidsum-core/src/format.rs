/// Collapse a text onto a single line: inner newlines and runs of
/// whitespace become one space, leading/trailing whitespace is dropped.
///
/// Line-oriented artifacts (transcripts.txt, summary.txt) rely on this so
/// that line N of the file is exactly entry N of the sequence.
pub fn single_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
