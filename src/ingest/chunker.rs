use crate::config::IngestConfig;

/// Split one page of manual text into overlapping chunks
///
/// Uses character-based approximation: ~4 characters per token. Chunk ends
/// are pulled back to a whitespace or sentence boundary when one exists in the
/// last 20% of the window. All slicing happens on UTF-8 character boundaries.
pub fn chunk_text(text: &str, config: &IngestConfig) -> Vec<String> {
    if text.trim().is_empty() {
        return Vec::new();
    }

    let char_size = config.chunk_size_tokens.max(1) * 4;
    let char_overlap = config.chunk_overlap_tokens * 4;

    // Largest char boundary at or before byte_pos
    let find_char_boundary = |byte_pos: usize| -> usize {
        if byte_pos >= text.len() {
            return text.len();
        }
        (0..=byte_pos)
            .rev()
            .find(|&i| text.is_char_boundary(i))
            .unwrap_or(0)
    };

    let mut chunks = Vec::new();
    let mut start_byte = 0;

    while start_byte < text.len() {
        start_byte = find_char_boundary(start_byte);

        let end_byte = find_char_boundary((start_byte + char_size).min(text.len()));

        let chunk_end_byte = if end_byte < text.len() {
            let search_start_byte = find_char_boundary(end_byte.saturating_sub(char_size / 5));
            text.get(search_start_byte..end_byte)
                .and_then(|window| {
                    window
                        .char_indices()
                        .rev()
                        .find(|(_, c)| c.is_whitespace() || matches!(c, '.' | '!' | '?'))
                        .map(|(offset, c)| search_start_byte + offset + c.len_utf8())
                })
                .filter(|&boundary| boundary > start_byte)
                .unwrap_or(end_byte)
        } else {
            end_byte
        };

        match text.get(start_byte..chunk_end_byte) {
            Some(chunk) => {
                let chunk = chunk.trim();
                if !chunk.is_empty() {
                    chunks.push(chunk.to_string());
                }
            }
            None => break,
        }

        if chunk_end_byte >= text.len() {
            break;
        }

        let overlap_start = find_char_boundary(chunk_end_byte.saturating_sub(char_overlap));
        // Start the overlap on a word boundary when the window has one
        let starts_word = text[..overlap_start]
            .chars()
            .next_back()
            .map_or(true, char::is_whitespace);
        let new_start_byte = if starts_word {
            overlap_start
        } else {
            text.get(overlap_start..chunk_end_byte)
                .and_then(|window| window.find(char::is_whitespace))
                .map_or(overlap_start, |offset| overlap_start + offset)
        };
        start_byte = if new_start_byte > start_byte && new_start_byte < chunk_end_byte {
            new_start_byte
        } else {
            chunk_end_byte
        };
    }

    chunks
}

/// Estimate token count from text
///
/// Uses approximation: 1 token ≈ 4 characters
pub fn estimate_tokens(text: &str) -> usize {
    (text.len() + 3) / 4
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(size: usize, overlap: usize) -> IngestConfig {
        IngestConfig {
            chunk_size_tokens: size,
            chunk_overlap_tokens: overlap,
        }
    }

    #[test]
    fn test_estimate_tokens() {
        assert_eq!(estimate_tokens("test"), 1);
        assert_eq!(estimate_tokens("testtest"), 2);
        assert_eq!(estimate_tokens("testtest12"), 3);
        assert_eq!(estimate_tokens(""), 0);
    }

    #[test]
    fn test_chunk_empty_text() {
        assert!(chunk_text("", &config(300, 50)).is_empty());
        assert!(chunk_text("   \n\t ", &config(300, 50)).is_empty());
    }

    #[test]
    fn test_short_text_single_chunk() {
        let chunks = chunk_text("  The ABS warning lamp lights up.  ", &config(300, 50));
        assert_eq!(chunks, vec!["The ABS warning lamp lights up."]);
    }

    #[test]
    fn test_long_text_splits_with_overlap() {
        let text = (0..400).map(|i| format!("w{} ", i)).collect::<String>();
        let chunks = chunk_text(&text, &config(50, 10));

        assert!(chunks.len() >= 3);
        for chunk in &chunks {
            assert!(chunk.len() <= 50 * 4);
        }
        // the word that ends one chunk reappears at the start of the next
        let last_word = chunks[0].split_whitespace().last().unwrap();
        assert!(chunks[1].contains(last_word));
    }

    #[test]
    fn test_chunks_break_on_word_boundaries() {
        let text = "brake ".repeat(200);
        for chunk in chunk_text(&text, &config(20, 5)) {
            assert!(chunk.split_whitespace().all(|w| w == "brake"), "split mid-word: {chunk}");
        }
    }

    #[test]
    fn test_multibyte_text_is_safe() {
        let text = "Überprüfen Sie den Reifendruck – Ölstand prüfen. ".repeat(60);
        let chunks = chunk_text(&text, &config(30, 8));
        assert!(chunks.len() > 1);
        assert!(chunks.iter().all(|c| !c.is_empty()));
    }

    #[test]
    fn test_unbroken_text_still_progresses() {
        let text = "x".repeat(1000);
        let chunks = chunk_text(&text, &config(50, 10));
        assert!(chunks.len() >= 5);
        assert!(chunks.iter().all(|c| c.len() <= 200));
    }
}
