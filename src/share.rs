//! Share text — the brag line a reading turns into, and back.

use std::sync::OnceLock;

use regex::Regex;

use crate::oracle::Reading;

/// Fields recovered from a share text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharedReading {
    pub words: [String; 3],
    pub coin: String,
    pub ticker: String,
    pub verdict: String,
    pub uncomfortable_truth: String,
}

/// Render the share text for a reading.
pub fn share_text(words: &[String; 3], reading: &Reading) -> String {
    format!(
        "I typed \"{}\", \"{}\", \"{}\" and the orakle matched me to {} ({}).\n\n\"{}\"\n\nThe uncomfortable truth: {}\n\nwhat coin are you?",
        words[0],
        words[1],
        words[2],
        reading.coin,
        reading.ticker,
        reading.verdict,
        reading.uncomfortable_truth,
    )
}

fn share_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r#"(?s)^I typed "(.*?)", "(.*?)", "(.*?)" and the orakle matched me to ([^\n]*) \(([^()\n]*)\)\.\n\n"(.*)"\n\nThe uncomfortable truth: (.*)\n\nwhat coin are you\?$"#,
        )
        .expect("valid regex")
    })
}

/// Parse a share text back into its fields. `None` if it isn't one.
pub fn parse_share_text(text: &str) -> Option<SharedReading> {
    let caps = share_pattern().captures(text)?;
    let field = |i: usize| caps.get(i).map(|m| m.as_str().to_string()).unwrap_or_default();
    Some(SharedReading {
        words: [field(1), field(2), field(3)],
        coin: field(4),
        ticker: field(5),
        verdict: field(6),
        uncomfortable_truth: field(7),
    })
}
