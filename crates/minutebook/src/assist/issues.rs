//! Local issue detection and summary synthesis.

use crate::record::{AgendaItem, Decision};
use crate::text::normalize;

use super::MeetingMetadata;

/// List what is missing from the minutes, in field order.
///
/// Metadata fields are only checked when `metadata` is supplied. Items are
/// numbered from 1 in the order given.
#[must_use]
pub fn compute_issues(
    metadata: Option<&MeetingMetadata>,
    agenda_items: &[AgendaItem],
    decisions: &[Decision],
) -> Vec<String> {
    let mut issues = Vec::new();

    if let Some(meta) = metadata {
        let required = [
            (&meta.title, "Meeting title is not specified."),
            (&meta.date, "Meeting date is not specified."),
            (&meta.time, "Meeting time is not specified."),
            (&meta.location, "Meeting location is not specified."),
            (&meta.meeting_type, "Meeting type is not specified."),
            (&meta.department, "Department is not specified."),
            (&meta.chairman, "Chairman name is not specified."),
            (&meta.secretary, "Secretary name is not specified."),
        ];
        for (value, issue) in required {
            if normalize(value).is_empty() {
                issues.push(issue.to_string());
            }
        }
    }

    for (index, agenda) in agenda_items.iter().enumerate() {
        let n = index + 1;
        if normalize(&agenda.item).is_empty() {
            issues.push(format!("Agenda item {n} is empty."));
        }
        if normalize(&agenda.speaker).is_empty() {
            issues.push(format!("Speaker for agenda item {n} is not specified."));
        }
    }

    for (index, decision) in decisions.iter().enumerate() {
        let n = index + 1;
        if normalize(&decision.decision).is_empty() {
            issues.push(format!("Decision {n} text is empty."));
        }
        if normalize(&decision.responsible).is_empty() {
            issues.push(format!("Responsible party for decision {n} is not specified."));
        }
        if normalize(&decision.deadline).is_empty() {
            issues.push(format!("Deadline for decision {n} is not specified."));
        }
    }

    issues
}

/// Build the templated executive summary, or `None` when nothing applies.
#[must_use]
pub fn basic_summary(title: Option<&str>, agenda_count: usize, decision_count: usize) -> Option<String> {
    let mut parts = Vec::with_capacity(3);

    let title = title.map(normalize).unwrap_or_default();
    if !title.is_empty() {
        parts.push(format!("A meeting was held titled: {title}."));
    }
    if agenda_count > 0 {
        parts.push(format!("{agenda_count} agenda items were discussed."));
    }
    if decision_count > 0 {
        parts.push(format!(
            "{decision_count} decisions/recommendations were drafted with owners and deadlines assigned."
        ));
    }

    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn agenda(item: &str, speaker: &str) -> AgendaItem {
        AgendaItem {
            item: item.to_string(),
            speaker: speaker.to_string(),
        }
    }

    #[test]
    fn test_empty_agenda_text_reported_once() {
        let issues = compute_issues(None, &[agenda("", "x")], &[]);
        assert_eq!(issues, vec!["Agenda item 1 is empty.".to_string()]);
    }

    #[test]
    fn test_whitespace_counts_as_empty() {
        let issues = compute_issues(None, &[agenda("  ", " \t ")], &[]);
        assert_eq!(issues.len(), 2);
        assert!(issues[1].contains("Speaker for agenda item 1"));
    }

    #[test]
    fn test_decision_issues_in_field_order() {
        let decisions = [
            Decision {
                decision: "Hire".to_string(),
                ..Decision::default()
            },
            Decision::default(),
        ];
        let issues = compute_issues(None, &[], &decisions);
        assert_eq!(
            issues,
            vec![
                "Responsible party for decision 1 is not specified.",
                "Deadline for decision 1 is not specified.",
                "Decision 2 text is empty.",
                "Responsible party for decision 2 is not specified.",
                "Deadline for decision 2 is not specified.",
            ]
        );
    }

    #[test]
    fn test_metadata_checked_only_when_supplied() {
        assert!(compute_issues(None, &[], &[]).is_empty());

        let meta = MeetingMetadata {
            title: "Budget".to_string(),
            chairman: "Ahmed".to_string(),
            ..MeetingMetadata::default()
        };
        let issues = compute_issues(Some(&meta), &[], &[]);
        assert_eq!(issues.len(), 6);
        assert_eq!(issues[0], "Meeting date is not specified.");
        assert_eq!(issues[5], "Secretary name is not specified.");
    }

    #[test]
    fn test_metadata_issues_precede_item_issues() {
        let meta = MeetingMetadata::default();
        let issues = compute_issues(Some(&meta), &[agenda("", "")], &[]);
        assert_eq!(issues.len(), 10);
        assert_eq!(issues[0], "Meeting title is not specified.");
        assert_eq!(issues[8], "Agenda item 1 is empty.");
    }

    #[test]
    fn test_basic_summary() {
        assert_eq!(basic_summary(None, 0, 0), None);
        assert_eq!(basic_summary(Some("  "), 0, 0), None);
        assert_eq!(
            basic_summary(Some("Budget  review"), 2, 0).unwrap(),
            "A meeting was held titled: Budget review. 2 agenda items were discussed."
        );
        let summary = basic_summary(None, 0, 3).unwrap();
        assert!(summary.starts_with("3 decisions/recommendations"));
    }
}
