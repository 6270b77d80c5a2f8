use crate::core::order::MAX_UNITS;
use crate::domain::model::InterpretationResult;
use crate::domain::ports::TranscriptInterpreter;
use crate::utils::error::{KioskError, Result};
use async_trait::async_trait;
use regex::Regex;

const COUNTERS: &str = "개|그릇|접시|인분|인승|명|병|잔";

const KOREAN_NUMBERS: &[(&str, u32)] = &[
    ("한", 1),
    ("하나", 1),
    ("일", 1),
    ("두", 2),
    ("둘", 2),
    ("이", 2),
    ("세", 3),
    ("셋", 3),
    ("삼", 3),
    ("서", 3),
    ("네", 4),
    ("넷", 4),
    ("사", 4),
    ("다섯", 5),
    ("오", 5),
    ("여섯", 6),
    ("육", 6),
    ("일곱", 7),
    ("칠", 7),
    ("여덟", 8),
    ("팔", 8),
    ("아홉", 9),
    ("구", 9),
    ("열", 10),
    ("십", 10),
    ("스물", 20),
    ("스무", 20),
    ("이십", 20),
    ("서른", 30),
    ("삼십", 30),
    ("마흔", 40),
    ("사십", 40),
    ("쉰", 50),
    ("오십", 50),
];

fn korean_number(word: &str) -> Option<u32> {
    KOREAN_NUMBERS
        .iter()
        .find(|(name, _)| *name == word)
        .map(|(_, value)| *value)
}

struct Keyword {
    text: String,
    patterns: Vec<Regex>,
}

impl Keyword {
    fn new(text: &str) -> Result<Self> {
        let k = regex::escape(text);
        let sources = [
            format!(r"([가-힣]+)\s*(?:{COUNTERS})\s*{k}"),
            format!(r"{k}\s*([가-힣]+)\s*(?:{COUNTERS})"),
            format!(r"([가-힣]+)\s+{k}"),
            format!(r"{k}\s+([가-힣]+)"),
            format!(r"(\d+)\s*(?:{COUNTERS})?\s*{k}"),
            format!(r"{k}\s*(\d+)\s*(?:{COUNTERS})?"),
        ];
        let patterns = sources
            .iter()
            .map(|source| {
                Regex::new(source).map_err(|e| KioskError::ConfigError {
                    message: format!("invalid keyword '{}': {}", text, e),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            text: text.to_string(),
            patterns,
        })
    }

    /// Quantity spoken next to the keyword, 1 when none is found, at most `MAX_UNITS`.
    fn quantity_in(&self, text: &str) -> u32 {
        self.spoken_quantity(text).min(MAX_UNITS)
    }

    fn spoken_quantity(&self, text: &str) -> u32 {
        for pattern in &self.patterns {
            let Some(word) = pattern.captures(text).and_then(|c| c.get(1)) else {
                continue;
            };
            let word = word.as_str().trim();
            if let Ok(quantity) = word.parse::<u32>() {
                if quantity > 0 {
                    return quantity;
                }
                continue;
            }
            if let Some(quantity) = korean_number(word) {
                return quantity;
            }
        }
        1
    }
}

struct MenuKeywords {
    menu: String,
    keywords: Vec<Keyword>,
}

/// Offline interpreter: finds menu keywords and the quantities spoken next to them.
///
/// Menus are checked in order; the first keyword hit for a menu is removed
/// from the text so a later, shorter keyword ("수육") cannot re-match it.
pub struct KeywordInterpreter {
    menus: Vec<MenuKeywords>,
}

impl KeywordInterpreter {
    pub fn new(entries: Vec<(String, Vec<String>)>) -> Result<Self> {
        let menus = entries
            .into_iter()
            .map(|(menu, keywords)| {
                let keywords = keywords
                    .iter()
                    .map(|k| Keyword::new(k))
                    .collect::<Result<Vec<_>>>()?;
                Ok(MenuKeywords { menu, keywords })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { menus })
    }

    pub fn extract(&self, transcript: &str) -> InterpretationResult {
        let mut text = transcript.to_string();
        let mut order_items: Vec<(String, u32)> = Vec::new();

        for menu in &self.menus {
            let Some(keyword) = menu.keywords.iter().find(|k| text.contains(k.text.as_str())) else {
                continue;
            };
            let quantity = keyword.quantity_in(&text);
            match order_items.iter_mut().find(|(name, _)| *name == menu.menu) {
                Some((_, total)) => *total = total.saturating_add(quantity).min(MAX_UNITS),
                None => order_items.push((menu.menu.clone(), quantity)),
            }
            text = text.replacen(keyword.text.as_str(), "", 1);
        }

        InterpretationResult { order_items }
    }
}

#[async_trait]
impl TranscriptInterpreter for KeywordInterpreter {
    async fn interpret(&self, transcript: &str) -> Result<InterpretationResult> {
        let result = self.extract(transcript);
        tracing::debug!("Keyword extraction of '{}': {:?}", transcript, result.order_items);
        Ok(result)
    }
}

/// Keyword lists for the built-in gukbap menu.
pub fn default_keywords() -> Vec<(String, Vec<String>)> {
    let table: [(&str, &[&str]); 6] = [
        ("돼지국밥", &["돼지국밥", "돼지 국밥", "돼지"]),
        ("순대국밥", &["순대국밥", "순대 국밥", "순대"]),
        ("내장국밥", &["내장국밥", "내장 국밥", "내장"]),
        ("섞어국밥", &["섞어국밥", "섞어 국밥", "섞어"]),
        ("수육 반접시", &["수육 반접시", "수육 반 접시", "반접시"]),
        ("수육 한접시", &["수육 한접시", "수육 한 접시", "수육"]),
    ];
    table
        .iter()
        .map(|(menu, keywords)| {
            (
                menu.to_string(),
                keywords.iter().map(|k| k.to_string()).collect(),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn interpreter() -> KeywordInterpreter {
        KeywordInterpreter::new(default_keywords()).unwrap()
    }

    fn items(pairs: &[(&str, u32)]) -> Vec<(String, u32)> {
        pairs.iter().map(|(n, q)| (n.to_string(), *q)).collect()
    }

    #[test]
    fn test_korean_numeral_after_keyword() {
        let result = interpreter().extract("순대국밥 두 개");
        assert_eq!(result.order_items, items(&[("순대국밥", 2)]));
    }

    #[test]
    fn test_digits_and_short_stems() {
        let result = interpreter().extract("돼지 3그릇 내장국밥 다섯 개");
        assert_eq!(result.order_items, items(&[("돼지국밥", 3), ("내장국밥", 5)]));
    }

    #[test]
    fn test_default_quantity_is_one() {
        let result = interpreter().extract("섞어국밥 주세요");
        assert_eq!(result.order_items, items(&[("섞어국밥", 1)]));
    }

    #[test]
    fn test_half_plate_does_not_match_full_plate() {
        let result = interpreter().extract("수육 반접시 하나");
        assert_eq!(result.order_items, items(&[("수육 반접시", 1)]));
    }

    #[test]
    fn test_oversized_quantity_is_clamped() {
        let result = interpreter().extract("돼지국밥 4000000000개");
        assert_eq!(result.order_items, items(&[("돼지국밥", MAX_UNITS)]));

        let result = interpreter().extract("순대국밥 99999999999개");
        assert!(result.order_items[0].1 <= MAX_UNITS);
    }

    #[test]
    fn test_no_menu_mentioned() {
        assert!(interpreter().extract("안녕하세요").order_items.is_empty());
    }

    #[tokio::test]
    async fn test_interpret_never_fails() {
        let result = interpreter().interpret("").await.unwrap();
        assert!(result.order_items.is_empty());
    }
}
