//! Client-side gate for shift creation.
//!
//! Every rule runs regardless of earlier failures so that the attendant
//! sees the full list at once. Errors block the submission, warnings need
//! an explicit confirmation.

use crate::utils::error::{AuditError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShiftType {
    Day,
    Night,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Nozzle {
    pub id: String,
    #[serde(default)]
    pub island_id: Option<String>,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendantAssignment {
    pub attendant_id: String,
    pub attendant_name: String,
    #[serde(default)]
    pub island_ids: Vec<String>,
    #[serde(default)]
    pub nozzle_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftPlan {
    pub shift_date: NaiveDate,
    pub shift_type: ShiftType,
    #[serde(default)]
    pub assignments: Vec<AttendantAssignment>,
    #[serde(default)]
    pub nozzles: Vec<Nozzle>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageSeverity {
    Error,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftMessage {
    pub severity: MessageSeverity,
    pub text: String,
}

impl ShiftMessage {
    fn error(text: String) -> Self {
        Self {
            severity: MessageSeverity::Error,
            text,
        }
    }

    fn warning(text: String) -> Self {
        Self {
            severity: MessageSeverity::Warning,
            text,
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == MessageSeverity::Error
    }
}

impl fmt::Display for ShiftMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.severity {
            MessageSeverity::Error => write!(f, "ERROR: {}", self.text),
            MessageSeverity::Warning => write!(f, "WARNING: {}", self.text),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftReport {
    pub messages: Vec<ShiftMessage>,
}

impl ShiftReport {
    pub fn errors(&self) -> impl Iterator<Item = &ShiftMessage> {
        self.messages.iter().filter(|m| m.is_error())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ShiftMessage> {
        self.messages.iter().filter(|m| !m.is_error())
    }

    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }

    pub fn requires_confirmation(&self) -> bool {
        self.warnings().next().is_some()
    }

    pub fn rendered(&self) -> Vec<String> {
        self.messages.iter().map(ToString::to_string).collect()
    }

    /// 錯誤一律擋下；警告需使用者確認後才放行
    pub fn gate(&self, confirmed: bool) -> Result<()> {
        let errors = self.errors().count();
        if errors > 0 {
            return Err(AuditError::ShiftBlocked {
                errors,
                messages: self.rendered(),
            });
        }
        let warnings = self.warnings().count();
        if warnings > 0 && !confirmed {
            return Err(AuditError::ConfirmationRequired {
                warnings,
                messages: self.rendered(),
            });
        }
        if warnings > 0 {
            tracing::info!("✅ {} shift warning(s) confirmed by user", warnings);
        }
        Ok(())
    }
}

pub fn validate_shift(plan: &ShiftPlan, today: NaiveDate) -> ShiftReport {
    let mut messages = Vec::new();

    // 1. 至少一位加油員
    if plan.assignments.is_empty() {
        messages.push(ShiftMessage::error(
            "At least one attendant must be selected".to_string(),
        ));
    }

    // 2. 每位加油員至少一個島
    for assignment in &plan.assignments {
        if assignment.island_ids.is_empty() {
            messages.push(ShiftMessage::error(format!(
                "Attendant {} has no island assigned",
                assignment.attendant_name
            )));
        }
    }

    // 3. 每位加油員至少一支油槍
    for assignment in &plan.assignments {
        if assignment.nozzle_ids.is_empty() {
            messages.push(ShiftMessage::error(format!(
                "Attendant {} has no nozzle assigned",
                assignment.attendant_name
            )));
        }
    }

    // 4. 油槍不可重複指派
    let holders = nozzle_holders(plan);
    for (nozzle_id, attendants) in &holders {
        if attendants.len() > 1 {
            let names: Vec<&str> = attendants
                .iter()
                .map(|a| a.attendant_name.as_str())
                .collect();
            messages.push(ShiftMessage::error(format!(
                "Nozzle {} is assigned to more than one attendant: {}",
                nozzle_id,
                names.join(", ")
            )));
        }
    }

    // 5. 未指派的啟用油槍
    let mut unassigned: Vec<&str> = Vec::new();
    for nozzle in plan.nozzles.iter().filter(|n| n.active) {
        let id = nozzle.id.as_str();
        if !holders.contains_key(id) && !unassigned.contains(&id) {
            unassigned.push(id);
        }
    }
    if !unassigned.is_empty() {
        messages.push(ShiftMessage::warning(format!(
            "Active nozzles with no attendant: {}",
            unassigned.join(", ")
        )));
    }

    // 6. 班別日期不是今天
    if plan.shift_date != today {
        messages.push(ShiftMessage::warning(format!(
            "Shift date {} is not today ({})",
            plan.shift_date, today
        )));
    }

    tracing::debug!(
        "Shift validation for {}: {} message(s)",
        plan.shift_date,
        messages.len()
    );

    ShiftReport { messages }
}

/// Nozzle id to the attendants holding it, each attendant counted once.
fn nozzle_holders(plan: &ShiftPlan) -> BTreeMap<&str, Vec<&AttendantAssignment>> {
    let mut holders: BTreeMap<&str, Vec<&AttendantAssignment>> = BTreeMap::new();
    for assignment in &plan.assignments {
        for nozzle_id in &assignment.nozzle_ids {
            let attendants = holders.entry(nozzle_id.as_str()).or_default();
            if !attendants
                .iter()
                .any(|a| a.attendant_id == assignment.attendant_id)
            {
                attendants.push(assignment);
            }
        }
    }
    holders
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
    }

    fn nozzle(id: &str, active: bool) -> Nozzle {
        Nozzle {
            id: id.to_string(),
            island_id: Some("I1".to_string()),
            active,
        }
    }

    fn assignment(name: &str, islands: &[&str], nozzles: &[&str]) -> AttendantAssignment {
        AttendantAssignment {
            attendant_id: name.to_lowercase(),
            attendant_name: name.to_string(),
            island_ids: islands.iter().map(|s| s.to_string()).collect(),
            nozzle_ids: nozzles.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn plan(assignments: Vec<AttendantAssignment>, nozzles: Vec<Nozzle>) -> ShiftPlan {
        ShiftPlan {
            shift_date: today(),
            shift_type: ShiftType::Day,
            assignments,
            nozzles,
        }
    }

    #[test]
    fn test_clean_plan_has_no_messages() {
        let report = validate_shift(
            &plan(
                vec![
                    assignment("Alice", &["I1"], &["N1"]),
                    assignment("Bob", &["I1"], &["N2"]),
                ],
                vec![nozzle("N1", true), nozzle("N2", true)],
            ),
            today(),
        );
        assert!(report.messages.is_empty());
        assert!(report.gate(false).is_ok());
    }

    #[test]
    fn test_duplicate_nozzle_reports_both_attendants() {
        let report = validate_shift(
            &plan(
                vec![
                    assignment("Alice", &["I1"], &["N1"]),
                    assignment("Bob", &["I1"], &["N1"]),
                ],
                vec![nozzle("N1", true)],
            ),
            today(),
        );
        let errors: Vec<_> = report.errors().collect();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].text.contains("N1"));
        assert!(errors[0].text.contains("Alice"));
        assert!(errors[0].text.contains("Bob"));
        assert!(errors[0].to_string().starts_with("ERROR: "));
    }

    #[test]
    fn test_unassigned_active_nozzle_warns() {
        let report = validate_shift(
            &plan(
                vec![assignment("Alice", &["I1"], &["N1"])],
                vec![nozzle("N1", true), nozzle("N2", true), nozzle("N3", false)],
            ),
            today(),
        );
        let warnings: Vec<_> = report.warnings().collect();
        assert_eq!(warnings.len(), 1);
        assert_eq!(
            warnings[0].to_string(),
            "WARNING: Active nozzles with no attendant: N2"
        );
        assert!(!report.has_errors());
    }

    #[test]
    fn test_repeated_roster_nozzle_listed_once() {
        let report = validate_shift(
            &plan(
                vec![assignment("Alice", &["I1"], &["N1"])],
                vec![
                    nozzle("N3", true),
                    nozzle("N2", true),
                    nozzle("N1", true),
                    nozzle("N2", true),
                ],
            ),
            today(),
        );
        let warnings: Vec<_> = report.warnings().collect();
        assert_eq!(warnings.len(), 1);
        assert_eq!(
            warnings[0].to_string(),
            "WARNING: Active nozzles with no attendant: N3, N2"
        );
    }

    #[test]
    fn test_rules_do_not_short_circuit() {
        let mut shift = plan(
            vec![
                assignment("Alice", &[], &["N1"]),
                assignment("Bob", &["I1"], &[]),
                assignment("Carol", &["I1"], &["N1"]),
            ],
            vec![nozzle("N1", true), nozzle("N2", true)],
        );
        shift.shift_date = NaiveDate::from_ymd_opt(2026, 10, 15).unwrap();

        let rendered = validate_shift(&shift, today()).rendered();
        assert_eq!(
            rendered,
            vec![
                "ERROR: Attendant Alice has no island assigned".to_string(),
                "ERROR: Attendant Bob has no nozzle assigned".to_string(),
                "ERROR: Nozzle N1 is assigned to more than one attendant: Alice, Carol"
                    .to_string(),
                "WARNING: Active nozzles with no attendant: N2".to_string(),
                "WARNING: Shift date 2026-10-15 is not today (2026-10-16)".to_string(),
            ]
        );
    }

    #[test]
    fn test_empty_plan_errors_and_warns() {
        let report = validate_shift(&plan(vec![], vec![nozzle("N1", true)]), today());
        assert_eq!(report.errors().count(), 1);
        assert_eq!(report.warnings().count(), 1);
        assert!(matches!(
            report.gate(true),
            Err(AuditError::ShiftBlocked { errors: 1, .. })
        ));
    }

    #[test]
    fn test_warnings_need_confirmation() {
        let report = validate_shift(
            &plan(
                vec![assignment("Alice", &["I1"], &["N1"])],
                vec![nozzle("N1", true), nozzle("N2", true)],
            ),
            today(),
        );
        assert!(matches!(
            report.gate(false),
            Err(AuditError::ConfirmationRequired { warnings: 1, .. })
        ));
        assert!(report.gate(true).is_ok());
    }

    #[test]
    fn test_same_attendant_listing_nozzle_twice_is_not_duplicate() {
        let report = validate_shift(
            &plan(
                vec![assignment("Alice", &["I1"], &["N1", "N1"])],
                vec![nozzle("N1", true)],
            ),
            today(),
        );
        assert!(report.messages.is_empty());
    }
}
