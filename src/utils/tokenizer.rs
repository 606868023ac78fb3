//! Name tokenizer.
//!
//! Splits release-style names on a fixed delimiter set while keeping protected
//! phrases (`WEB-DL`, `DDP5.1`, `H.265`, ...) in one piece.

/// Delimiter characters used for tokenization.
pub const DELIMITERS: &[char] = &[
    '-', '.', ',', '_', ' ', '[', ']', '(', ')', '{', '}', '@', ':', '：',
];

/// Tokenizer for media names.
#[derive(Debug, Clone, Default)]
pub struct Tokenizer {
    /// Longest first, so `DDP.5.1` wins over any shorter overlap.
    protected: Vec<String>,
}

impl Tokenizer {
    /// Create a tokenizer with the given protected phrases.
    pub fn new<I, S>(protected: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut protected: Vec<String> = protected
            .into_iter()
            .map(Into::into)
            .filter(|p| !p.is_empty())
            .collect();
        protected.sort_by(|a, b| b.len().cmp(&a.len()));
        Self { protected }
    }

    /// Split a name into tokens, left to right, dropping empty tokens.
    pub fn split(&self, name: &str) -> Vec<String> {
        let mut tokens = Vec::new();
        let mut current = String::new();
        let mut rest = name;

        while let Some(c) = rest.chars().next() {
            if let Some(len) = self.protected_at(rest) {
                current.push_str(&rest[..len]);
                rest = &rest[len..];
                continue;
            }

            if DELIMITERS.contains(&c) {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            } else {
                current.push(c);
            }
            rest = &rest[c.len_utf8()..];
        }

        if !current.is_empty() {
            tokens.push(current);
        }

        tokens
    }

    /// Byte length of the protected phrase starting `text`, if any.
    fn protected_at(&self, text: &str) -> Option<usize> {
        self.protected
            .iter()
            .find(|phrase| starts_with_ignore_ascii_case(text, phrase))
            .map(|phrase| phrase.len())
    }
}

fn starts_with_ignore_ascii_case(text: &str, prefix: &str) -> bool {
    text.len() >= prefix.len()
        && text.is_char_boundary(prefix.len())
        && text[..prefix.len()].eq_ignore_ascii_case(prefix)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokenizer() -> Tokenizer {
        Tokenizer::new(["WEB-DL", "DDP5.1", "DDP.5.1", "H.265", "DTS-HD", "MA 5.1"])
    }

    #[test]
    fn test_split_basic() {
        let tokens = tokenizer().split("Show.Name.S02.1080p");
        assert_eq!(tokens, vec!["Show", "Name", "S02", "1080p"]);
    }

    #[test]
    fn test_protected_phrases_stay_whole() {
        let tokens = tokenizer().split("Movie.2020.2160p.web-dl.H.265.DDP.5.1-GROUP");
        assert_eq!(
            tokens,
            vec!["Movie", "2020", "2160p", "web-dl", "H.265", "DDP.5.1", "GROUP"]
        );
    }

    #[test]
    fn test_protected_phrase_with_space() {
        let tokens = tokenizer().split("Movie DTS-HD MA 5.1");
        assert_eq!(tokens, vec!["Movie", "DTS-HD", "MA 5.1"]);
    }

    #[test]
    fn test_empty_tokens_suppressed() {
        let tokens = tokenizer().split("[Group]..Title__(2019)");
        assert_eq!(tokens, vec!["Group", "Title", "2019"]);
    }

    #[test]
    fn test_no_delimiters_single_token() {
        assert_eq!(tokenizer().split("流浪地球"), vec!["流浪地球"]);
        assert!(tokenizer().split("").is_empty());
    }

    #[test]
    fn test_non_delimiter_characters_preserved() {
        let name = "权力的游戏：第一季.Game.of.Thrones";
        let joined: String = tokenizer().split(name).concat();
        let expected: String = name.chars().filter(|c| !DELIMITERS.contains(c)).collect();
        assert_eq!(joined, expected);
    }
}
