use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// A sellable catalog entry. Prices are in won.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: u32,
    pub name: String,
    pub price: u64,
}

impl MenuItem {
    pub fn new(id: u32, name: impl Into<String>, price: u64) -> Self {
        Self {
            id,
            name: name.into(),
            price,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderLine {
    pub item: Arc<MenuItem>,
    pub quantity: u32,
}

impl OrderLine {
    pub fn subtotal(&self) -> u64 {
        self.item.price * u64::from(self.quantity)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderSnapshot {
    pub lines: Vec<OrderLine>,
    pub total: u64,
}

impl OrderSnapshot {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// "돼지국밥 2개, 순대국밥 1개"
    pub fn summary(&self) -> String {
        self.lines
            .iter()
            .map(|line| format!("{} {}개", line.item.name, line.quantity))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    pub summary: String,
    pub total: u64,
    pub completed_at: DateTime<Utc>,
}

/// Name to quantity pairs returned by the interpretation service, in reply order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InterpretationResult {
    pub order_items: Vec<(String, u32)>,
}

/// Identifies the authoritative voice session. Only ever increases.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SessionToken(pub u64);

impl SessionToken {
    pub fn next(self) -> Self {
        SessionToken(self.0 + 1)
    }
}

impl fmt::Display for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Listening,
    Processing,
    Terminated,
}

impl SessionState {
    pub fn is_active(self) -> bool {
        matches!(self, SessionState::Listening | SessionState::Processing)
    }
}

/// Formats won amounts with thousands separators, e.g. `9,000원`.
pub fn format_won(amount: u64) -> String {
    let digits = amount.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out.push('원');
    out
}
