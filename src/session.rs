//! Session — the screen state machine behind the front end.
//!
//! Model + update only, no rendering. The front end feeds it input and the
//! outcome of each reading, and draws whatever `screen()` says.
//!
//! ```text
//! Entry ─submit→ Loading ─ok→ Result ─reset/try_another→ Entry
//!                   │
//!                   └─err→ Error ─retry→ Loading
//!                            └─back_to_entry→ Entry
//! ```

use crate::oracle::{OracleError, Query, Reading};
use crate::share::share_text;
use crate::theme::{theme_for, Theme, DEFAULT_THEME};

/// Rotating lines shown while a reading is in flight.
pub const LOADING_PHRASES: [&str; 5] = [
    "Consulting the blockchain orakle...",
    "Reading your digital aura...",
    "Decrypting personality hashes...",
    "Sifting through the mempool of your soul...",
    "Aligning with the genesis block...",
];

/// Which screen is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Entry,
    Loading,
    Result,
    Error,
}

/// One browser-session's worth of state. Nothing outlives it.
#[derive(Debug, Clone)]
pub struct Session {
    screen: Screen,
    words: [String; 3],
    reading: Option<Reading>,
    error: Option<String>,
    loading_index: usize,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            screen: Screen::Entry,
            words: Default::default(),
            reading: None,
            error: None,
            loading_index: 0,
        }
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn words(&self) -> &[String; 3] {
        &self.words
    }

    pub fn reading(&self) -> Option<&Reading> {
        self.reading.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Set word `index` (0..3), normalized. Ignored while loading or out of range.
    pub fn set_word(&mut self, index: usize, value: &str) {
        if self.screen == Screen::Loading {
            return;
        }
        if let Some(slot) = self.words.get_mut(index) {
            *slot = crate::oracle::reading::normalize_word(value);
        }
    }

    /// All three words present and nothing in flight.
    pub fn can_submit(&self) -> bool {
        self.screen != Screen::Loading && self.words.iter().all(|w| !w.is_empty())
    }

    /// Start a reading. Returns the query to send, or `None` if blocked.
    pub fn submit(&mut self) -> Option<Query> {
        if !self.can_submit() {
            return None;
        }
        let query = Query::new(self.words.clone()).ok()?;
        self.screen = Screen::Loading;
        self.error = None;
        self.loading_index = 0;
        Some(query)
    }

    /// Record the outcome of the in-flight reading. Ignored unless loading.
    pub fn finish(&mut self, outcome: Result<Reading, OracleError>) {
        if self.screen != Screen::Loading {
            return;
        }
        match outcome {
            Ok(reading) if reading.is_valid => {
                self.reading = Some(reading);
                self.screen = Screen::Result;
            }
            Ok(reading) => {
                self.error = Some(OracleError::rejected(reading.error_message).to_string());
                self.screen = Screen::Error;
            }
            Err(e) => {
                self.error = Some(e.to_string());
                self.screen = Screen::Error;
            }
        }
    }

    /// Re-issue the same words after a failure.
    pub fn retry(&mut self) -> Option<Query> {
        if self.screen != Screen::Error {
            return None;
        }
        self.submit()
    }

    /// Leave the error screen, keeping the words.
    pub fn back_to_entry(&mut self) {
        if self.screen == Screen::Error {
            self.screen = Screen::Entry;
        }
    }

    /// Forget everything and start over.
    pub fn reset(&mut self) {
        if self.screen == Screen::Loading {
            return;
        }
        self.words = Default::default();
        self.reading = None;
        self.error = None;
        self.screen = Screen::Entry;
    }

    /// Clear the words for another go.
    pub fn try_another(&mut self) {
        if self.screen == Screen::Loading {
            return;
        }
        self.words = Default::default();
        self.screen = Screen::Entry;
    }

    pub fn loading_phrase(&self) -> &'static str {
        LOADING_PHRASES[self.loading_index % LOADING_PHRASES.len()]
    }

    /// Rotate to the next loading phrase and return it.
    pub fn advance_loading(&mut self) -> &'static str {
        self.loading_index = (self.loading_index + 1) % LOADING_PHRASES.len();
        self.loading_phrase()
    }

    /// Theme for the reading on screen, or the default.
    pub fn theme(&self) -> Theme {
        match (self.screen, &self.reading) {
            (Screen::Result, Some(r)) => theme_for(&r.coin),
            _ => DEFAULT_THEME,
        }
    }

    /// Share text for the reading on screen.
    pub fn share_text(&self) -> Option<String> {
        match (self.screen, &self.reading) {
            (Screen::Result, Some(r)) => Some(share_text(&self.words, r)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading() -> Reading {
        Reading {
            is_valid: true,
            error_message: None,
            coin: "Pepe".into(),
            ticker: "PEPE".into(),
            verdict: "You are a meme that became a mood.".into(),
            traits: vec!["ironic".into(), "tender".into(), "loud".into()],
            uncomfortable_truth: "You laugh first so nobody laughs at you.".into(),
        }
    }

    fn filled() -> Session {
        let mut s = Session::new();
        s.set_word(0, "ironic");
        s.set_word(1, " tender ");
        s.set_word(2, "loud");
        s
    }

    #[test]
    fn starts_on_entry() {
        let s = Session::new();
        assert_eq!(s.screen(), Screen::Entry);
        assert!(!s.can_submit());
        assert_eq!(s.theme(), DEFAULT_THEME);
    }

    #[test]
    fn submit_blocked_until_all_words() {
        let mut s = Session::new();
        s.set_word(0, "ironic");
        s.set_word(1, "tender");
        assert!(s.submit().is_none());
        assert_eq!(s.screen(), Screen::Entry);

        s.set_word(2, "   ");
        assert!(s.submit().is_none());

        s.set_word(2, "loud");
        let q = s.submit().unwrap();
        assert_eq!(q.words()[1], "tender");
        assert_eq!(s.screen(), Screen::Loading);
    }

    #[test]
    fn out_of_range_word_ignored() {
        let mut s = filled();
        s.set_word(3, "extra");
        assert_eq!(s.words()[2], "loud");
    }

    #[test]
    fn no_second_submit_while_loading() {
        let mut s = filled();
        assert!(s.submit().is_some());
        assert!(!s.can_submit());
        assert!(s.submit().is_none());

        s.set_word(0, "changed");
        assert_eq!(s.words()[0], "ironic");
    }

    #[test]
    fn success_shows_result() {
        let mut s = filled();
        s.submit();
        s.finish(Ok(reading()));
        assert_eq!(s.screen(), Screen::Result);
        assert_eq!(s.reading().unwrap().coin, "Pepe");
        assert_eq!(s.theme().emoji, "🐸");
        assert!(s.share_text().unwrap().contains("matched me to Pepe (PEPE)"));
    }

    #[test]
    fn invalid_reading_never_reaches_result() {
        let mut s = filled();
        s.submit();
        s.finish(Ok(Reading {
            is_valid: false,
            error_message: Some("Only the soul, please.".into()),
            coin: "Bitcoin".into(),
            ..Reading::default()
        }));
        assert_eq!(s.screen(), Screen::Error);
        assert_eq!(s.error(), Some("Only the soul, please."));
        assert!(s.reading().is_none());
        assert!(s.share_text().is_none());
    }

    #[test]
    fn error_then_retry_reuses_words() {
        let mut s = filled();
        let first = s.submit().unwrap();
        s.finish(Err(OracleError::EmptyResponse));
        assert_eq!(s.screen(), Screen::Error);
        assert_eq!(s.error(), Some("The orakle is silent. Try again."));

        let again = s.retry().unwrap();
        assert_eq!(first, again);
        assert_eq!(s.screen(), Screen::Loading);
        assert!(s.error().is_none());
    }

    #[test]
    fn retry_only_from_error() {
        let mut s = filled();
        assert!(s.retry().is_none());
        assert_eq!(s.screen(), Screen::Entry);
    }

    #[test]
    fn back_to_entry_keeps_words() {
        let mut s = filled();
        s.submit();
        s.finish(Err(OracleError::Configuration));
        s.back_to_entry();
        assert_eq!(s.screen(), Screen::Entry);
        assert_eq!(s.words()[0], "ironic");
    }

    #[test]
    fn reset_clears_everything() {
        let mut s = filled();
        s.submit();
        s.finish(Ok(reading()));
        s.reset();
        assert_eq!(s.screen(), Screen::Entry);
        assert!(s.reading().is_none());
        assert!(s.words().iter().all(String::is_empty));
    }

    #[test]
    fn try_another_clears_words() {
        let mut s = filled();
        s.submit();
        s.finish(Ok(reading()));
        s.try_another();
        assert_eq!(s.screen(), Screen::Entry);
        assert!(s.words().iter().all(String::is_empty));
        assert_eq!(s.theme(), DEFAULT_THEME);
    }

    #[test]
    fn finish_ignored_when_not_loading() {
        let mut s = filled();
        s.finish(Ok(reading()));
        assert_eq!(s.screen(), Screen::Entry);
        assert!(s.reading().is_none());
    }

    #[test]
    fn loading_phrases_rotate() {
        let mut s = filled();
        s.submit();
        assert_eq!(s.loading_phrase(), LOADING_PHRASES[0]);
        for expected in LOADING_PHRASES.iter().skip(1) {
            assert_eq!(s.advance_loading(), *expected);
        }
        assert_eq!(s.advance_loading(), LOADING_PHRASES[0]);
    }
}
