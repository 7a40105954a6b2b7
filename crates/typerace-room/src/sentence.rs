//! Sentence providers: where target sentences come from.

use rand::Rng;

const KOREAN: &[&str] = &[
    "빠른 갈색 여우가 게으른 개를 뛰어넘습니다",
    "오늘 날씨가 정말 좋습니다",
    "프로그래밍은 재미있는 활동입니다",
    "커피 한 잔의 여유를 즐기세요",
    "인생은 짧고 예술은 길다",
    "천 리 길도 한 걸음부터 시작한다",
    "호랑이에게 물려가도 정신만 차리면 산다",
    "가는 말이 고와야 오는 말이 곱다",
    "낮말은 새가 듣고 밤말은 쥐가 듣는다",
    "백문이 불여일견이라는 말이 있다",
];

const ENGLISH: &[&str] = &[
    "The quick brown fox jumps over the lazy dog",
    "Hello world this is a typing test",
    "Programming is fun and creative",
    "Practice makes perfect every day",
    "Life is short art is long",
    "A journey of a thousand miles begins with a single step",
    "To be or not to be that is the question",
    "All that glitters is not gold",
    "Better late than never they say",
    "Actions speak louder than words",
];

/// Supplies the target sentence for a new game.
///
/// Implementations must always return a non-empty sentence and must not
/// fail on an unrecognized language: they fall back to some default.
pub trait SentenceProvider: Send + Sync + 'static {
    /// Returns a sentence for the given language selector.
    fn sentence(&self, language: &str) -> String;
}

/// The bundled Korean and English corpora, picked uniformly at random.
///
/// `"english"`/`"en"` and `"korean"`/`"ko"` (any case) select one corpus.
/// Any other selector draws from both.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinSentences;

impl SentenceProvider for BuiltinSentences {
    fn sentence(&self, language: &str) -> String {
        let mut rng = rand::rng();
        let picked = match language.trim().to_ascii_lowercase().as_str() {
            "english" | "en" => ENGLISH[rng.random_range(0..ENGLISH.len())],
            "korean" | "ko" => KOREAN[rng.random_range(0..KOREAN.len())],
            _ => {
                let i = rng.random_range(0..KOREAN.len() + ENGLISH.len());
                if i < KOREAN.len() {
                    KOREAN[i]
                } else {
                    ENGLISH[i - KOREAN.len()]
                }
            }
        };
        picked.to_string()
    }
}

/// Always returns the same sentence. Handy for demos and tests.
#[derive(Debug, Clone)]
pub struct FixedSentence(pub String);

impl FixedSentence {
    pub fn new(sentence: impl Into<String>) -> Self {
        Self(sentence.into())
    }
}

impl SentenceProvider for FixedSentence {
    fn sentence(&self, _language: &str) -> String {
        self.0.clone()
    }
}
