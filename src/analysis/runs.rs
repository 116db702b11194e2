//! Splitting a line's characters into uniformly styled runs.

use crate::model::{Character, TextRun};

/// Group characters into maximal runs of identical bold/italic/size.
///
/// Concatenating the returned runs reproduces the characters' text exactly.
pub fn segment_runs(chars: &[Character]) -> Vec<TextRun> {
    let mut runs: Vec<TextRun> = Vec::new();

    for c in chars {
        match runs.last_mut() {
            Some(run)
                if run.bold == c.style.bold
                    && run.italic == c.style.italic
                    && run.font_size == c.font_size =>
            {
                run.text.push(c.text);
            }
            _ => runs.push(TextRun {
                text: c.text.to_string(),
                bold: c.style.bold,
                italic: c.style.italic,
                font_size: c.font_size,
            }),
        }
    }

    runs
}

/// Append `other` to `runs`, separated by a single space.
///
/// The space joins the last existing run; adjacent runs with identical style
/// are coalesced so the result stays minimal.
pub fn join_runs(runs: &mut Vec<TextRun>, other: Vec<TextRun>) {
    if other.is_empty() {
        return;
    }
    if let Some(last) = runs.last_mut() {
        if !last.text.ends_with(' ') {
            last.text.push(' ');
        }
    }
    for run in other {
        match runs.last_mut() {
            Some(last) if last.same_style(&run) => last.text.push_str(&run.text),
            _ => runs.push(run),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::runs_text;

    fn ch(c: char, font: &str, size: f32) -> Character {
        Character::new(c, font, size, 0.0, 0.0)
    }

    #[test]
    fn test_two_runs_on_style_change() {
        let chars = vec![
            ch('A', "Helvetica-Bold", 12.0),
            ch('B', "Helvetica-Bold", 12.0),
            ch('C', "Helvetica", 12.0),
        ];
        let runs = segment_runs(&chars);
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].text, "AB");
        assert!(runs[0].bold);
        assert_eq!(runs[1].text, "C");
        assert!(!runs[1].bold);
        assert_eq!(runs_text(&runs), "ABC");
    }

    #[test]
    fn test_size_and_italic_changes_split() {
        let chars = vec![
            ch('a', "Times-Roman", 10.0),
            ch('b', "Times-Roman", 11.0),
            ch('c', "Times-Italic", 11.0),
            ch('d', "Times-Italic", 11.0),
        ];
        let runs = segment_runs(&chars);
        let texts: Vec<&str> = runs.iter().map(|r| r.text.as_str()).collect();
        assert_eq!(texts, vec!["a", "b", "cd"]);
        assert!(runs[2].italic);
    }

    #[test]
    fn test_whitespace_is_preserved() {
        let chars: Vec<Character> = " a  b ".chars().map(|c| ch(c, "Arial", 12.0)).collect();
        let runs = segment_runs(&chars);
        assert_eq!(runs.len(), 1);
        assert_eq!(runs_text(&runs), " a  b ");
    }

    #[test]
    fn test_empty_line_has_no_runs() {
        assert!(segment_runs(&[]).is_empty());
    }

    #[test]
    fn test_join_runs_inserts_space_and_coalesces() {
        let mut runs = vec![TextRun::plain("first line", 12.0)];
        join_runs(&mut runs, vec![TextRun::plain("second", 12.0)]);
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].text, "first line second");

        let mut bold = TextRun::plain("bold", 12.0);
        bold.bold = true;
        join_runs(&mut runs, vec![bold]);
        assert_eq!(runs.len(), 2);
        assert_eq!(runs_text(&runs), "first line second bold");
    }
}
