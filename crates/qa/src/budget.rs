//! Context budget enforcement.
//!
//! The site data goes into the prompt as a compact JSON object
//! (`{"url":"text",...}`). Its size in characters is the one metric used
//! everywhere: for the "does it fit" check and for the running total while
//! evicting. Each eviction subtracts exactly the characters the entry
//! contributed (its `"url":"text"` pair plus one separating comma), so the
//! running total always equals the serialized size of what is left.
//!
//! # Eviction policy
//!
//! | Step | Rule |
//! |------|------|
//! | Order | Longest text first (character count, descending) |
//! | Ties | Ascending URL |
//! | Granularity | Whole entries; text is never split |
//! | Stop | As soon as the total fits, or nothing is left |

use sitesage_core::PageMap;
use tracing::{debug, warn};

/// Characters taken by the enclosing `{` and `}`.
const OBJECT_OVERHEAD: usize = 2;

/// Serialized size, in characters, of `pages` as a compact JSON object.
///
/// Equal to `serde_json::to_string(pages)?.chars().count()`.
pub fn serialized_size(pages: &PageMap) -> usize {
    let entries: usize = pages.iter().map(|(url, text)| entry_size(url, text)).sum();
    OBJECT_OVERHEAD + entries + pages.len().saturating_sub(1)
}

/// Characters of one `"url":"text"` pair.
fn entry_size(url: &str, text: &str) -> usize {
    json_string_len(url) + 1 + json_string_len(text)
}

/// Length of `s` as a JSON string literal, quotes included.
fn json_string_len(s: &str) -> usize {
    2 + s
        .chars()
        .map(|c| match c {
            '"' | '\\' | '\n' | '\r' | '\t' | '\u{08}' | '\u{0c}' => 2,
            c if (c as u32) < 0x20 => 6,
            _ => 1,
        })
        .sum::<usize>()
}

/// One evicted entry, in eviction order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Eviction {
    pub url: String,
    /// Length of the evicted text in characters.
    pub text_chars: usize,
    /// Serialized characters released by removing the entry.
    pub released: usize,
}

/// The outcome of budget enforcement.
#[derive(Debug, Clone)]
pub struct Trimmed {
    /// The entries that fit, in URL order.
    pub pages: PageMap,
    /// What was removed, in the order it was removed.
    pub evicted: Vec<Eviction>,
    /// Serialized size before trimming.
    pub original_size: usize,
    /// Serialized size of `pages`.
    pub size: usize,
}

impl Trimmed {
    pub fn was_trimmed(&self) -> bool {
        !self.evicted.is_empty()
    }

    /// URLs of the kept entries, in URL order.
    pub fn sources(&self) -> Vec<String> {
        self.pages.keys().cloned().collect()
    }
}

/// Fits a corpus under a maximum serialized size by evicting whole entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BudgetEnforcer {
    max_chars: usize,
}

impl BudgetEnforcer {
    pub fn new(max_chars: usize) -> Self {
        Self { max_chars }
    }

    pub fn max_chars(&self) -> usize {
        self.max_chars
    }

    /// Select the entries of `pages` that fit the budget.
    ///
    /// Works on a copy; `pages` is never modified. Deterministic for a given
    /// input. The result fits the budget unless it is empty.
    pub fn enforce(&self, pages: &PageMap) -> Trimmed {
        let original_size = serialized_size(pages);
        let mut kept = pages.clone();

        if original_size <= self.max_chars {
            return Trimmed {
                pages: kept,
                evicted: Vec::new(),
                original_size,
                size: original_size,
            };
        }

        let mut order: Vec<(&String, &String, usize)> = pages
            .iter()
            .map(|(url, text)| (url, text, text.chars().count()))
            .collect();
        order.sort_by(|a, b| b.2.cmp(&a.2).then_with(|| a.0.cmp(b.0)));

        let mut size = original_size;
        let mut evicted = Vec::new();

        for (url, text, text_chars) in order {
            if size <= self.max_chars {
                break;
            }

            kept.remove(url);
            let separator = usize::from(!kept.is_empty());
            let released = entry_size(url, text) + separator;
            size -= released;

            debug!(url = %url, text_chars, released, size, "Evicted page");
            evicted.push(Eviction {
                url: url.clone(),
                text_chars,
                released,
            });
        }

        warn!(
            original_size,
            size,
            budget = self.max_chars,
            evicted = evicted.len(),
            kept = kept.len(),
            "Site data exceeds the context budget, dropped the longest pages. \
             Lower crawler.max_depth to avoid trimming"
        );

        Trimmed {
            pages: kept,
            evicted,
            original_size,
            size,
        }
    }
}
