//! Decision policy for routing questions
//!
//! Ordered rules, first match wins. Deterministic given the question and the
//! classifier's top intent.

use crate::models::{Intent, LabelScore, Route};
use tracing::debug;

/// Substrings that force the performance route
pub const PERFORMANCE_KEYWORDS: &[&str] = &["best", "better", "worst", "profit", "p&l"];

/// Substrings that force the count route
pub const COUNT_KEYWORDS: &[&str] = &["how many", "count", "number of"];

/// Greeting only wins above this confidence (strict)
pub const GREETING_THRESHOLD: f64 = 0.8;

/// What a rule gets to look at
pub struct RuleInput<'a> {
    /// Question text, lowercased once
    pub lowered: &'a str,
    pub top_intent: Option<&'a LabelScore>,
}

impl<'a> RuleInput<'a> {
    fn top_is(&self, intent: Intent) -> bool {
        self.top_intent
            .map(|top| top.label == intent.label())
            .unwrap_or(false)
    }
}

/// Trait for decision rules
pub trait DecisionRule: Send + Sync {
    fn name(&self) -> &'static str;

    /// Route taken when this rule matches
    fn route(&self) -> Route;

    fn matches(&self, input: &RuleInput<'_>) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub rule: &'static str,
    pub route: Route,
}

const FALLBACK_DECISION: Decision = Decision {
    rule: "fallback",
    route: Route::Fallback,
};

/// Ordered rule table
pub struct DecisionPolicy {
    rules: Vec<Box<dyn DecisionRule>>,
}

impl DecisionPolicy {
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    pub fn add_rule(&mut self, rule: Box<dyn DecisionRule>) {
        self.rules.push(rule);
    }

    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|rule| rule.name()).collect()
    }

    /// First matching rule decides; an empty or exhausted table falls back
    pub fn decide(&self, input: &RuleInput<'_>) -> Decision {
        for rule in &self.rules {
            if rule.matches(input) {
                debug!(rule = rule.name(), route = ?rule.route(), "Rule matched");
                return Decision {
                    rule: rule.name(),
                    route: rule.route(),
                };
            }
        }

        FALLBACK_DECISION
    }
}

impl Default for DecisionPolicy {
    fn default() -> Self {
        Self::new()
    }
}

//
// ================= Rules =================
//

/// Rule: performance keywords bypass the classifier
pub struct PerformanceOverrideRule;

impl DecisionRule for PerformanceOverrideRule {
    fn name(&self) -> &'static str {
        "performance_override"
    }

    fn route(&self) -> Route {
        Route::Performance
    }

    fn matches(&self, input: &RuleInput<'_>) -> bool {
        PERFORMANCE_KEYWORDS.iter().any(|kw| input.lowered.contains(kw))
    }
}

/// Rule: count intent, or count keywords
pub struct CountOverrideRule;

impl DecisionRule for CountOverrideRule {
    fn name(&self) -> &'static str {
        "count_override"
    }

    fn route(&self) -> Route {
        Route::Count
    }

    fn matches(&self, input: &RuleInput<'_>) -> bool {
        input.top_is(Intent::CountRecords)
            || COUNT_KEYWORDS.iter().any(|kw| input.lowered.contains(kw))
    }
}

/// Rule: greeting intent above the confidence threshold
pub struct ConfidentGreetingRule {
    pub threshold: f64,
}

impl DecisionRule for ConfidentGreetingRule {
    fn name(&self) -> &'static str {
        "confident_greeting"
    }

    fn route(&self) -> Route {
        Route::Greeting
    }

    fn matches(&self, input: &RuleInput<'_>) -> bool {
        input
            .top_intent
            .map(|top| top.label == Intent::Greeting.label() && top.score > self.threshold)
            .unwrap_or(false)
    }
}

/// Rule: always matches
pub struct FallbackRule;

impl DecisionRule for FallbackRule {
    fn name(&self) -> &'static str {
        FALLBACK_DECISION.rule
    }

    fn route(&self) -> Route {
        FALLBACK_DECISION.route
    }

    fn matches(&self, _input: &RuleInput<'_>) -> bool {
        true
    }
}

/// Create the standard policy: performance, count, greeting, fallback
pub fn create_default_policy() -> DecisionPolicy {
    let mut policy = DecisionPolicy::new();
    policy.add_rule(Box::new(PerformanceOverrideRule));
    policy.add_rule(Box::new(CountOverrideRule));
    policy.add_rule(Box::new(ConfidentGreetingRule {
        threshold: GREETING_THRESHOLD,
    }));
    policy.add_rule(Box::new(FallbackRule));
    policy
}
