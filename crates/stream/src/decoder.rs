/// Marker the server appends once the answer is complete.
pub const SENTINEL: &str = "[DONE]";

/// Incremental UTF-8 decoder for a chunked body.
///
/// Multi-byte sequences split across chunk boundaries are held back until
/// the rest arrives. Invalid bytes decode to U+FFFD instead of failing.
#[derive(Debug, Default)]
pub struct Utf8ChunkDecoder {
    pending: Vec<u8>,
}

impl Utf8ChunkDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn decode(&mut self, chunk: &[u8]) -> String {
        self.pending.extend_from_slice(chunk);

        let mut decoded = String::with_capacity(self.pending.len());
        let mut consumed = 0;

        loop {
            let input = &self.pending[consumed..];
            match std::str::from_utf8(input) {
                Ok(valid) => {
                    decoded.push_str(valid);
                    consumed = self.pending.len();
                    break;
                }
                Err(error) => {
                    let valid_up_to = error.valid_up_to();
                    decoded.push_str(&String::from_utf8_lossy(&input[..valid_up_to]));

                    match error.error_len() {
                        Some(invalid_len) => {
                            decoded.push(char::REPLACEMENT_CHARACTER);
                            consumed += valid_up_to + invalid_len;
                        }
                        // Incomplete sequence at the tail: wait for the next chunk.
                        None => {
                            consumed += valid_up_to;
                            break;
                        }
                    }
                }
            }
        }

        self.pending.drain(..consumed);
        decoded
    }

    /// Flushes bytes still waiting for a continuation once the body has ended.
    pub fn finish(&mut self) -> String {
        if self.pending.is_empty() {
            return String::new();
        }

        self.pending.clear();
        char::REPLACEMENT_CHARACTER.to_string()
    }
}

/// Text decoded from one body chunk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodedChunk {
    /// Text safe to append to the accumulator. Never contains the sentinel.
    pub text: String,
    /// True once the sentinel was found; nothing after it is ever returned.
    pub sentinel: bool,
}

/// Turns raw body chunks into answer text and detects the end-of-answer sentinel.
///
/// Text preceding the sentinel in the same chunk is kept. A trailing fragment
/// that could be the start of a sentinel split over two chunks is held back
/// until the next chunk settles it.
#[derive(Debug, Default)]
pub struct AnswerDecoder {
    utf8: Utf8ChunkDecoder,
    held: String,
    finished: bool,
}

impl AnswerDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn push(&mut self, chunk: &[u8]) -> DecodedChunk {
        if self.finished {
            return DecodedChunk::default();
        }

        let decoded = self.utf8.decode(chunk);
        self.scan(decoded)
    }

    /// Returns held text once the body ended without a sentinel.
    pub fn finish(&mut self) -> String {
        if self.finished {
            return String::new();
        }

        self.finished = true;
        let mut rest = std::mem::take(&mut self.held);
        rest.push_str(&self.utf8.finish());
        rest
    }

    fn scan(&mut self, decoded: String) -> DecodedChunk {
        let mut window = std::mem::take(&mut self.held);
        window.push_str(&decoded);

        if let Some(index) = window.find(SENTINEL) {
            window.truncate(index);
            self.finished = true;
            return DecodedChunk {
                text: window,
                sentinel: true,
            };
        }

        let split = window.len() - partial_sentinel_suffix(&window);
        self.held = window.split_off(split);

        DecodedChunk {
            text: window,
            sentinel: false,
        }
    }
}

/// Length of the longest proper sentinel prefix that `text` ends with.
fn partial_sentinel_suffix(text: &str) -> usize {
    (1..SENTINEL.len())
        .rev()
        .find(|len| text.ends_with(&SENTINEL[..*len]))
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utf8_sequence_split_across_chunks_is_reassembled() {
        let bytes = "réponse".as_bytes();
        let mut decoder = Utf8ChunkDecoder::new();

        // 'é' is two bytes; cut between them.
        let first = decoder.decode(&bytes[..2]);
        let second = decoder.decode(&bytes[2..]);

        assert_eq!(first, "r");
        assert_eq!(second, "éponse");
        assert_eq!(decoder.finish(), "");
    }

    #[test]
    fn invalid_bytes_become_replacement_characters() {
        let mut decoder = Utf8ChunkDecoder::new();
        assert_eq!(decoder.decode(b"a\xFFb"), "a\u{FFFD}b");
    }

    #[test]
    fn truncated_sequence_at_end_of_body_is_flushed_as_replacement() {
        let mut decoder = Utf8ChunkDecoder::new();
        assert_eq!(decoder.decode(&"é".as_bytes()[..1]), "");
        assert_eq!(decoder.finish(), "\u{FFFD}");
    }

    #[test]
    fn chunks_pass_through_until_sentinel() {
        let mut decoder = AnswerDecoder::new();

        let rendered = ["Hel", "lo wor", "ld"]
            .iter()
            .map(|chunk| decoder.push(chunk.as_bytes()))
            .collect::<Vec<_>>();
        assert!(rendered.iter().all(|chunk| !chunk.sentinel));
        assert_eq!(
            rendered
                .iter()
                .map(|chunk| chunk.text.as_str())
                .collect::<String>(),
            "Hello world"
        );

        let last = decoder.push(b"[DONE]");
        assert_eq!(last, DecodedChunk {
            text: String::new(),
            sentinel: true,
        });
        assert!(decoder.is_finished());
    }

    #[test]
    fn text_before_sentinel_in_same_chunk_is_kept() {
        let mut decoder = AnswerDecoder::new();
        let chunk = decoder.push(b"fin de l'article.[DONE]ignored");

        assert!(chunk.sentinel);
        assert_eq!(chunk.text, "fin de l'article.");
        assert_eq!(decoder.push(b"more"), DecodedChunk::default());
    }

    #[test]
    fn sentinel_split_across_chunks_is_detected() {
        let mut decoder = AnswerDecoder::new();

        let first = decoder.push(b"Article 12 [DO");
        assert_eq!(first.text, "Article 12 ");
        assert!(!first.sentinel);

        let second = decoder.push(b"NE]");
        assert_eq!(second.text, "");
        assert!(second.sentinel);
    }

    #[test]
    fn held_bracket_is_released_when_no_sentinel_follows() {
        let mut decoder = AnswerDecoder::new();

        assert_eq!(decoder.push(b"voir [").text, "voir ");
        assert_eq!(decoder.push(b"annexe]").text, "[annexe]");
        assert_eq!(decoder.push(b" [D").text, " ");
        assert_eq!(decoder.finish(), "[D");
        assert_eq!(decoder.finish(), "");
    }
}
