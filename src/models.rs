//! Core data models for the fund assistant

use serde::{Deserialize, Serialize};
use std::fmt;

//
// ================= Intents =================
//

/// The fixed intents every question is ranked against.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    CountRecords,
    Performance,
    Greeting,
    UnknownDetails,
}

impl Intent {
    /// Candidate order sent to the classifier on every call.
    pub const ALL: [Intent; 4] = [
        Intent::CountRecords,
        Intent::Performance,
        Intent::Greeting,
        Intent::UnknownDetails,
    ];

    /// Natural-language label the zero-shot model scores against.
    pub fn label(&self) -> &'static str {
        match self {
            Intent::CountRecords => "count the number of trades or holdings",
            Intent::Performance => "check the profit and loss performance",
            Intent::Greeting => "greeting",
            Intent::UnknownDetails => "ask about manager, ceo, sector, or unknown details",
        }
    }

    pub fn from_label(label: &str) -> Option<Intent> {
        Intent::ALL.into_iter().find(|intent| intent.label() == label)
    }

    pub fn candidate_labels() -> Vec<&'static str> {
        Intent::ALL.iter().map(Intent::label).collect()
    }
}

/// One ranked entry from a classifier.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LabelScore {
    pub label: String,
    pub score: f64,
}

impl LabelScore {
    pub fn new(label: impl Into<String>, score: f64) -> Self {
        Self {
            label: label.into(),
            score,
        }
    }
}

//
// ================= Records =================
//

/// One row of the holdings table. Columns other than these are ignored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HoldingRecord {
    #[serde(rename = "PortfolioName", default)]
    pub portfolio_name: Option<String>,
    #[serde(
        rename = "PL_YTD",
        default,
        deserialize_with = "csv::invalid_option"
    )]
    pub pl_ytd: Option<f64>,
}

/// One row of the trades table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TradeRecord {
    #[serde(rename = "PortfolioName", default)]
    pub portfolio_name: Option<String>,
}

//
// ================= Resolution =================
//

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Route {
    Performance,
    Count,
    Greeting,
    Fallback,
}

/// Answer plus the reasoning that produced it.
#[derive(Debug, Clone, Serialize)]
pub struct Resolution {
    pub answer: String,
    pub route: Route,
    pub rule: &'static str,
    pub top_intent: Option<LabelScore>,
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Route::Performance => "Performance",
            Route::Count => "Count",
            Route::Greeting => "Greeting",
            Route::Fallback => "Fallback",
        };
        write!(f, "{}", s)
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}
