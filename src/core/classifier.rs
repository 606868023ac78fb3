//! Token classifier chain and title accumulation.
//!
//! Each token of a name is tested against an ordered list of predicates. The
//! first predicate that recognises the token decides its class; a token nobody
//! recognises is plain title text.

use crate::core::patterns;
use crate::models::config::ClassifyConfig;
use crate::models::media::NameInfo;
use crate::utils::chinese::{split_chs_eng_title, split_title_alias};
use crate::utils::tokenizer::Tokenizer;
use std::collections::HashSet;

/// Outcome of classifying one token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenClass {
    /// Listed false positive, dropped without stopping the title.
    Escaped,
    Resolution,
    Year(u16),
    Format(String),
    Source,
    Studio,
    Channel,
    /// Season tag; `prefix` is any text glued in front of it (`黄石S01`).
    Season { prefix: String, number: u32 },
    Plain,
}

impl TokenClass {
    /// Whether the token carries metadata and stops title accumulation.
    pub fn is_metadata(&self) -> bool {
        !matches!(self, TokenClass::Escaped | TokenClass::Plain)
    }
}

/// What kind of entry a name belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameTarget {
    Movie,
    Show { is_collection: bool },
}

/// Label sets the membership predicates test against.
#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
    escape: HashSet<String>,
    sources: HashSet<String>,
    studios: HashSet<String>,
    channels: HashSet<String>,
}

impl Vocabulary {
    pub fn from_config(config: &ClassifyConfig) -> Self {
        Self {
            escape: config.escape_tokens.iter().cloned().collect(),
            sources: config.sources.iter().map(|s| s.to_lowercase()).collect(),
            studios: config.studios.iter().map(|s| s.to_lowercase()).collect(),
            channels: config.channels.iter().map(|s| s.to_uppercase()).collect(),
        }
    }
}

type Predicate = fn(&Vocabulary, &str) -> Option<TokenClass>;

/// Predicates shared by every target, in evaluation order.
const CHAIN: &[Predicate] = &[
    escaped, resolution, year, format, source, studio, channel,
];

fn escaped(vocab: &Vocabulary, token: &str) -> Option<TokenClass> {
    vocab.escape.contains(token).then_some(TokenClass::Escaped)
}

fn resolution(_: &Vocabulary, token: &str) -> Option<TokenClass> {
    patterns::match_resolution(token).map(|_| TokenClass::Resolution)
}

fn year(_: &Vocabulary, token: &str) -> Option<TokenClass> {
    patterns::match_year(token).map(TokenClass::Year)
}

fn format(_: &Vocabulary, token: &str) -> Option<TokenClass> {
    patterns::match_format(token).map(|f| TokenClass::Format(f.to_string()))
}

fn source(vocab: &Vocabulary, token: &str) -> Option<TokenClass> {
    vocab
        .sources
        .contains(&token.to_lowercase())
        .then_some(TokenClass::Source)
}

fn studio(vocab: &Vocabulary, token: &str) -> Option<TokenClass> {
    vocab
        .studios
        .contains(&token.to_lowercase())
        .then_some(TokenClass::Studio)
}

fn channel(vocab: &Vocabulary, token: &str) -> Option<TokenClass> {
    vocab
        .channels
        .contains(&token.to_uppercase())
        .then_some(TokenClass::Channel)
}

fn season(_: &Vocabulary, token: &str) -> Option<TokenClass> {
    patterns::match_season(token).map(|(prefix, number)| TokenClass::Season {
        prefix: prefix.to_string(),
        number,
    })
}

/// Classify a single token.
pub fn classify(vocab: &Vocabulary, token: &str, target: NameTarget) -> TokenClass {
    let shows_only: &[Predicate] = match target {
        NameTarget::Movie => &[],
        NameTarget::Show { .. } => &[season],
    };

    CHAIN
        .iter()
        .chain(shows_only)
        .find_map(|predicate| predicate(vocab, token))
        .unwrap_or(TokenClass::Plain)
}

/// Title accumulation state.
///
/// Plain tokens are appended until the first metadata token after the title
/// has started; from then on nothing else joins the title.
#[derive(Debug, Default)]
pub struct TitleAccumulator {
    title: String,
    started: bool,
    suppressed: bool,
}

impl TitleAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a metadata token.
    pub fn metadata(&mut self) {
        self.suppressed = true;
    }

    /// Record a plain token.
    pub fn plain(&mut self, token: &str) {
        if !self.started {
            self.started = true;
            self.suppressed = false;
        }
        if !self.suppressed {
            self.title.push_str(token);
            self.title.push(' ');
        }
    }

    /// Append text verbatim, regardless of state.
    pub fn push_raw(&mut self, text: &str) {
        self.title.push_str(text);
    }

    pub fn finish(self) -> String {
        self.title.trim().to_string()
    }
}

/// Result of classifying a whole name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Classified {
    pub name: NameInfo,
    /// Season tag found in the name, shows only.
    pub season: Option<u32>,
}

/// Tokenizer plus classifier chain.
#[derive(Debug, Clone, Default)]
pub struct Classifier {
    tokenizer: Tokenizer,
    vocab: Vocabulary,
}

impl Classifier {
    pub fn new(config: &ClassifyConfig) -> Self {
        Self {
            tokenizer: Tokenizer::new(config.protected_phrases.iter().cloned()),
            vocab: Vocabulary::from_config(config),
        }
    }

    pub fn tokenize(&self, name: &str) -> Vec<String> {
        self.tokenizer.split(name)
    }

    /// Tokenize and classify an already corrected name.
    pub fn classify_name(&self, name: &str, target: NameTarget) -> Classified {
        let mut info = NameInfo::default();
        let mut season = None;
        let mut title = TitleAccumulator::new();

        for token in self.tokenize(name) {
            let class = classify(&self.vocab, &token, target);
            match class {
                TokenClass::Escaped | TokenClass::Resolution => {}
                TokenClass::Year(found) => {
                    // `Reply.1994.2013`: the earlier year belongs to the title
                    if matches!(target, NameTarget::Show { .. }) && info.year > 0 {
                        title.push_raw(&info.year.to_string());
                    }
                    info.year = found;
                }
                TokenClass::Format(ref format) => info.format = format.clone(),
                TokenClass::Source => info.source = token.clone(),
                TokenClass::Studio => info.studio = token.clone(),
                TokenClass::Channel => {}
                TokenClass::Season { ref prefix, number } => match target {
                    NameTarget::Show {
                        is_collection: true,
                    } => continue,
                    _ => {
                        if !prefix.is_empty() {
                            title.plain(prefix);
                        }
                        season = Some(number);
                    }
                },
                TokenClass::Plain => {
                    title.plain(&token);
                    continue;
                }
            }

            if class.is_metadata() {
                title.metadata();
            }
        }

        let (title, alias) = split_title_alias(&title.finish());
        let (chs, eng) = split_chs_eng_title(&title);
        info.title = title.trim().to_string();
        info.alias_title = alias.trim().to_string();
        info.chs_title = chs;
        info.eng_title = eng;

        Classified { name: info, season }
    }
}
