//! Deterministic rule-frequency evaluation.
//!
//! A rule is due once the whole days since the last maintenance reach its
//! frequency in days. A table model may be asked which rule is due, but its
//! answer is only kept when it names a rule the deterministic pass already
//! found due.

use chrono::{DateTime, Utc};
use std::collections::HashSet;
use tracing::{debug, info, warn};

use upkeep_core::{AssetId, Decision, ParsedInstant, Reason, RuleId, elapsed_days};

use crate::capability::{ClassificationCapability, RuleTable};
use crate::job::{Evaluation, EvaluationKind};
use crate::rule::{Rule, scalar_to_string};

/// Window suggested whenever any rule is due, regardless of which or how many.
pub const RULE_WINDOW_DAYS: i64 = 7;

/// Fixed question put to the table model during the advisory step.
pub const ADVISORY_QUERY: &str = "Which rule_id is due?";

/// Advisory table columns, in order.
pub const TABLE_COLUMNS: [&str; 7] = [
    "rule_id",
    "frequency_value",
    "frequency_unit",
    "elapsed_days",
    "due_days",
    "is_due",
    "name",
];

/// Derived due state of one rule. Not persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DueState {
    pub rule_id: RuleId,
    pub elapsed_days: i64,
    /// `None` when the frequency is unusable; such a rule is never due.
    pub due_days: Option<i64>,
    pub is_due: bool,
}

impl DueState {
    pub fn compute(rule_id: RuleId, elapsed_days: i64, due_days: Option<i64>) -> Self {
        let is_due = due_days.is_some_and(|d| elapsed_days >= d);
        Self {
            rule_id,
            elapsed_days,
            due_days,
            is_due,
        }
    }
}

/// Deterministic rule-frequency evaluation with an optional advisory cross-check.
///
/// The advisor can only ever corroborate: it never adds or removes a due rule
/// and never changes `shouldCreateEvent`.
#[derive(Clone, Copy)]
pub struct RuleEngine<'a> {
    advisor: Option<&'a dyn ClassificationCapability>,
}

impl<'a> RuleEngine<'a> {
    /// Engine without the advisory step.
    pub fn deterministic() -> Self {
        Self { advisor: None }
    }

    pub fn with_advisor(advisor: &'a dyn ClassificationCapability) -> Self {
        Self {
            advisor: Some(advisor),
        }
    }

    pub fn evaluate(
        &self,
        rules: &[Rule],
        last_maintenance: &ParsedInstant,
        now: DateTime<Utc>,
    ) -> Decision {
        if rules.is_empty() {
            return Decision::no_event();
        }

        let last = match last_maintenance {
            ParsedInstant::Valid(at) => *at,
            ParsedInstant::Absent => {
                return Decision::declined(
                    Reason::MissingLastMaintenance,
                    "lastMaintenance is missing for this asset; overdue rules cannot be determined",
                );
            }
            ParsedInstant::Malformed(raw) => {
                warn!(last_maintenance = %raw, "unparsable lastMaintenance");
                return Decision::declined(
                    Reason::MissingLastMaintenance,
                    format!(
                        "lastMaintenance {raw:?} could not be parsed; \
                         overdue rules cannot be determined"
                    ),
                );
            }
        };

        let elapsed = elapsed_days(last, now);
        let evaluated = evaluate_rules(rules, elapsed);

        let due_ids: Vec<RuleId> = evaluated
            .iter()
            .filter(|e| e.state.is_due)
            .map(|e| e.state.rule_id.clone())
            .collect();

        if due_ids.is_empty() {
            debug!(elapsed_days = elapsed, rules = evaluated.len(), "no rule is due");
            return Decision::no_event();
        }

        let corroborated_rule_id = self.advisor.and_then(|advisor| advise(advisor, &evaluated));

        Decision {
            should_create_event: true,
            reason: Some(Reason::MultipleRulesDue),
            explanation: Some(format!("{} rules are due", due_ids.len())),
            suggested_window_days: Some(RULE_WINDOW_DAYS),
            due_rule_ids: Some(due_ids),
            corroborated_rule_id,
            ..Decision::default()
        }
    }
}

/// One rule after due computation, with the text cells shown to the advisor.
#[derive(Debug, Clone)]
struct EvaluatedRule<'r> {
    rule: &'r Rule,
    state: DueState,
}

impl EvaluatedRule<'_> {
    fn table_row(&self) -> Vec<String> {
        vec![
            self.state.rule_id.to_string(),
            scalar_to_string(&self.rule.frequency.value),
            scalar_to_string(&self.rule.frequency.unit),
            self.state.elapsed_days.to_string(),
            self.state.due_days.map(|d| d.to_string()).unwrap_or_default(),
            if self.state.is_due { "YES" } else { "NO" }.to_string(),
            self.rule.label().to_string(),
        ]
    }
}

/// Due states for every usable rule, in input order.
///
/// Blank ids are skipped; a repeated id keeps its first occurrence.
pub fn due_states(rules: &[Rule], elapsed_days: i64) -> Vec<DueState> {
    evaluate_rules(rules, elapsed_days)
        .into_iter()
        .map(|e| e.state)
        .collect()
}

/// The table presented to the advisor.
pub fn advisory_table(rules: &[Rule], elapsed_days: i64) -> RuleTable {
    build_table(&evaluate_rules(rules, elapsed_days))
}

fn evaluate_rules(rules: &[Rule], elapsed: i64) -> Vec<EvaluatedRule<'_>> {
    let mut seen: HashSet<RuleId> = HashSet::with_capacity(rules.len());
    let mut out = Vec::with_capacity(rules.len());

    for rule in rules {
        let rule_id: RuleId = match rule.rule_id.parse() {
            Ok(id) => id,
            Err(_) => {
                warn!("skipping rule without rule_id");
                continue;
            }
        };

        if !seen.insert(rule_id.clone()) {
            warn!(rule_id = %rule_id, "duplicate rule_id; keeping the first occurrence");
            continue;
        }

        let due_days = rule.frequency.to_days();
        if due_days.is_none() {
            warn!(
                rule_id = %rule_id,
                value = %rule.frequency.value,
                unit = %rule.frequency.unit,
                "unusable frequency; rule excluded from due evaluation"
            );
        }

        out.push(EvaluatedRule {
            rule,
            state: DueState::compute(rule_id, elapsed, due_days),
        });
    }

    out
}

fn build_table(evaluated: &[EvaluatedRule<'_>]) -> RuleTable {
    let mut table = RuleTable::new(TABLE_COLUMNS.to_vec());
    for e in evaluated {
        table.push_row(e.table_row());
    }
    table
}

/// Ask the advisor which rule is due. Returns the id only if it names a rule
/// the deterministic pass already found due; anything else is discarded.
///
/// An exact id match is preferred; otherwise the answer may match an id that
/// differs only by surrounding whitespace.
fn advise(
    advisor: &dyn ClassificationCapability,
    evaluated: &[EvaluatedRule<'_>],
) -> Option<RuleId> {
    let table = build_table(evaluated);

    let answer = match advisor.answer_over_table(&table, ADVISORY_QUERY) {
        Ok(a) => a,
        Err(e) if e.is_expected() => {
            debug!(error = %e, "advisory step skipped");
            return None;
        }
        Err(e) => {
            warn!(error = %e, "advisory step failed; keeping deterministic result");
            return None;
        }
    };

    let answer = answer.answer.trim();
    let matched = evaluated
        .iter()
        .find(|e| e.state.rule_id.as_str() == answer)
        .or_else(|| evaluated.iter().find(|e| e.state.rule_id.as_str().trim() == answer));
    let Some(matched) = matched else {
        debug!(answer, "advisory answer does not name a known rule; discarded");
        return None;
    };

    if !matched.state.is_due {
        debug!(
            rule_id = %matched.state.rule_id,
            "advisory answer names a rule that is not due; discarded"
        );
        return None;
    }

    info!(
        rule_id = %matched.state.rule_id,
        model = %advisor.descriptor().name,
        "advisory step corroborates due rule"
    );
    Some(matched.state.rule_id.clone())
}

/// Rule-frequency evaluation request for one asset.
#[derive(Debug, Clone)]
pub struct RuleCheck {
    pub asset_id: AssetId,
    pub last_maintenance: ParsedInstant,
    pub now: DateTime<Utc>,
    pub rules: Vec<Rule>,
}

impl Evaluation for RuleCheck {
    fn kind(&self) -> EvaluationKind {
        EvaluationKind::RuleCheck
    }

    fn asset_id(&self) -> &AssetId {
        &self.asset_id
    }

    fn run(&self, capability: &dyn ClassificationCapability) -> Decision {
        RuleEngine::with_advisor(capability).evaluate(
            &self.rules,
            &self.last_maintenance,
            self.now,
        )
    }
}
