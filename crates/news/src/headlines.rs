//! Headline source (§4.3 News). A live deployment wires a real headline
//! provider (NEWS_API_KEY, a NewsAPI.org-style client) in behind this
//! trait; this crate ships a deterministic generator so the tool is
//! exercisable without outside credentials, mirroring `market`'s
//! `SyntheticQuoteSource`.

pub trait HeadlineSource: Send + Sync {
    fn headlines(&self, symbol: &str) -> Vec<String>;
}

const TEMPLATES: &[&str] = &[
    "{sym} reports record profit and raises guidance",
    "Analysts bullish on {sym} after strong growth numbers",
    "{sym} shares rally on partnership announcement",
    "Regulatory concern weighs on {sym} outlook",
    "{sym} misses earnings expectations, shares decline",
];

fn seed(symbol: &str) -> u64 {
    let mut hash: u64 = 0xcbf29ce484222325;
    for b in symbol.bytes() {
        hash ^= b as u64;
        hash = hash.wrapping_mul(0x100000001b3);
    }
    hash
}

#[derive(Default)]
pub struct SyntheticHeadlineSource;

impl SyntheticHeadlineSource {
    pub fn new() -> Self {
        Self
    }
}

impl HeadlineSource for SyntheticHeadlineSource {
    fn headlines(&self, symbol: &str) -> Vec<String> {
        if symbol.trim().is_empty() {
            return Vec::new();
        }
        let s = seed(&symbol.to_uppercase());
        let count = 2 + (s % 3) as usize; // 2-4 headlines
        (0..count)
            .map(|i| {
                let template = TEMPLATES[(s.wrapping_add(i as u64) % TEMPLATES.len() as u64) as usize];
                template.replace("{sym}", &symbol.to_uppercase())
            })
            .collect()
    }
}
