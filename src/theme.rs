//! Coin themes — color and emoji keyed by substring of the coin name.
//!
//! Pure lookup, recomputed per render. First key (in table order) contained
//! in the lowercased coin name wins.

/// A color/emoji pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    /// `#RRGGBB`.
    pub color: &'static str,
    pub emoji: &'static str,
}

impl Theme {
    /// Decode the hex color into RGB components.
    pub fn rgb(&self) -> Option<(u8, u8, u8)> {
        let hex = self.color.strip_prefix('#')?;
        if hex.len() != 6 {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
        Some((channel(0)?, channel(2)?, channel(4)?))
    }
}

/// Fallback when no key matches.
pub const DEFAULT_THEME: Theme = Theme {
    color: "#F7931A",
    emoji: "✨",
};

const fn theme(color: &'static str, emoji: &'static str) -> Theme {
    Theme { color, emoji }
}

/// Lookup table, in match priority order.
pub const COIN_THEMES: [(&str, Theme); 25] = [
    ("bitcoin", theme("#F7931A", "₿")),
    ("ethereum", theme("#627EEA", "⟠")),
    ("solana", theme("#9945FF", "◎")),
    ("dogecoin", theme("#C3A634", "🐕")),
    ("xrp", theme("#00AAE4", "✕")),
    ("cardano", theme("#0033AD", "₳")),
    ("chainlink", theme("#375BD2", "⬡")),
    ("monero", theme("#FF6600", "ɱ")),
    ("pepe", theme("#3DFFC0", "🐸")),
    ("avalanche", theme("#E84142", "🔺")),
    ("uniswap", theme("#FF007A", "🦄")),
    ("aave", theme("#B6509E", "👻")),
    ("polkadot", theme("#E6007A", "●")),
    ("shiba", theme("#FFA500", "🐕")),
    ("arbitrum", theme("#28A0F0", "💙")),
    ("optimism", theme("#FF0420", "🔴")),
    ("near", theme("#000000", "Ⓝ")),
    ("fantom", theme("#1969FF", "👻")),
    ("injective", theme("#00A3FF", "🥷")),
    ("sui", theme("#4DA2FF", "💧")),
    ("aptos", theme("#2DD4BF", "A")),
    ("maker", theme("#1AAB9B", "M")),
    ("compound", theme("#00D395", "C")),
    ("curve", theme("#0000FF", "🌈")),
    ("lido", theme("#00A3FF", "🏝️")),
];

/// Key of the first theme matching `coin`, if any.
pub fn theme_key(coin: &str) -> Option<&'static str> {
    find(coin).map(|(key, _)| key)
}

/// Theme for a coin name, or `DEFAULT_THEME`.
pub fn theme_for(coin: &str) -> Theme {
    find(coin).map_or(DEFAULT_THEME, |(_, theme)| theme)
}

fn find(coin: &str) -> Option<(&'static str, Theme)> {
    let lower = coin.to_lowercase();
    COIN_THEMES
        .iter()
        .find(|(key, _)| lower.contains(key))
        .copied()
}
