use anyhow::{Context, Result, bail};
use std::io::{self, IsTerminal, Read};

pub const MAX_INPUT_SIZE: usize = 1024 * 1024; // 1MB

/// Returns the question given on the command line, or reads it from stdin.
///
/// With attachments the question may be left out entirely; an interactive
/// stdin then yields an empty question instead of an error.
///
/// # Errors
///
/// Fails when stdin is a terminal with no question and no attachments, when
/// the input exceeds [`MAX_INPUT_SIZE`] or is not valid UTF-8.
pub fn read_question(question: Option<String>, has_attachments: bool) -> Result<String> {
    let stdin = io::stdin();
    let interactive = stdin.is_terminal();
    resolve_question(question, has_attachments, interactive, stdin.lock())
}

fn resolve_question<R: Read>(
    question: Option<String>,
    has_attachments: bool,
    interactive: bool,
    reader: R,
) -> Result<String> {
    if let Some(question) = question {
        return Ok(question);
    }

    if interactive {
        if has_attachments {
            return Ok(String::new());
        }
        bail!(
            "No question given.\n\n\
             Pass it as an argument: docchat ask \"What is the refund policy?\"\n\
             Or pipe it in: echo \"...\" | docchat ask"
        );
    }

    read_limited(reader)
}

fn read_limited<R: Read>(mut reader: R) -> Result<String> {
    let mut buffer = Vec::new();
    let mut chunk = [0u8; 8192];

    loop {
        let bytes_read = reader
            .read(&mut chunk)
            .context("Failed to read from stdin")?;

        if bytes_read == 0 {
            break;
        }

        buffer.extend_from_slice(&chunk[..bytes_read]);

        if buffer.len() > MAX_INPUT_SIZE {
            bail!(
                "Input size ({:.1} MB) exceeds maximum allowed size (1 MB).",
                buffer.len() as f64 / 1024.0 / 1024.0
            );
        }
    }

    String::from_utf8(buffer).context("Input is not valid UTF-8")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_question_argument_wins() {
        let question = resolve_question(
            Some("Where is the handbook?".into()),
            false,
            false,
            Cursor::new(b"ignored".to_vec()),
        )
        .unwrap();
        assert_eq!(question, "Where is the handbook?");
    }

    #[test]
    fn test_piped_question() {
        let question =
            resolve_question(None, false, false, Cursor::new(b"From stdin".to_vec())).unwrap();
        assert_eq!(question, "From stdin");
    }

    #[test]
    fn test_terminal_without_question_fails() {
        let result = resolve_question(None, false, true, Cursor::new(Vec::new()));
        assert!(result.unwrap_err().to_string().contains("No question given"));
    }

    #[test]
    fn test_terminal_with_attachments_allows_empty_question() {
        let question = resolve_question(None, true, true, Cursor::new(Vec::new())).unwrap();
        assert!(question.is_empty());
    }

    #[test]
    fn test_read_limited_unicode() {
        let content = "¿Cuál es la política?\n日本語";
        let result = read_limited(Cursor::new(content.as_bytes())).unwrap();
        assert_eq!(result, content);
    }

    #[test]
    fn test_read_limited_empty() {
        let result = read_limited(Cursor::new(Vec::new())).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_read_limited_at_max_size() {
        let content = "x".repeat(MAX_INPUT_SIZE);
        let result = read_limited(Cursor::new(content.into_bytes())).unwrap();
        assert_eq!(result.len(), MAX_INPUT_SIZE);
    }

    #[test]
    fn test_read_limited_exceeds_max_size() {
        let content = "x".repeat(MAX_INPUT_SIZE + 1);
        let result = read_limited(Cursor::new(content.into_bytes()));
        assert!(result.unwrap_err().to_string().contains("exceeds maximum"));
    }

    #[test]
    fn test_read_limited_invalid_utf8() {
        let result = read_limited(Cursor::new(vec![0xff, 0xfe]));
        assert!(result.is_err());
    }
}
