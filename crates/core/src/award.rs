// Award rules for approved participations
//
// Every approval produces exactly one ledger entry. The amount depends on the
// event type; the reason tells the audit trail why.

use crate::event::{Event, EventType};

/// Reason recorded for a manual grant without an explicit reason.
pub const DEFAULT_GRANT_REASON: &str = "Special grant";

/// Why an approval produced the amount it did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AwardKind {
    /// Single, survey, or eligible practice event.
    Participation,
    /// Practice session without enrolment in its annual parent.
    PracticeIneligible,
    /// Enrolment in an annual programme; stamps come from its practice sessions.
    AnnualEnrolment,
}

/// Ledger change for one approved participation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Award {
    pub kind: AwardKind,
    pub amount: i32,
    pub reason: String,
}

/// Decide the award for approving a participation in `event`.
///
/// `has_parent_participation` is whether the participant has any participation,
/// whatever its status, in the event's parent. It only matters for practice
/// events.
pub fn decide_award(event: &Event, has_parent_participation: bool) -> Award {
    let kind = match event.event_type {
        EventType::Single | EventType::Survey => AwardKind::Participation,
        EventType::Practice if event.parent_event_id.is_some() && has_parent_participation => {
            AwardKind::Participation
        }
        EventType::Practice => AwardKind::PracticeIneligible,
        EventType::Annual => AwardKind::AnnualEnrolment,
    };

    match kind {
        AwardKind::Participation => Award {
            kind,
            amount: event.effective_points(),
            reason: format!("{}: participation approved", event.title),
        },
        AwardKind::PracticeIneligible => Award {
            kind,
            amount: 0,
            reason: format!("{}: not eligible, no stamp", event.title),
        },
        AwardKind::AnnualEnrolment => Award {
            kind,
            amount: 0,
            reason: format!("{}: annual enrolment approved, no stamp", event.title),
        },
    }
}

/// Reason recorded when a participation is rejected.
pub fn rejection_reason(event_title: &str) -> String {
    format!("{}: rejected, no stamp", event_title)
}

/// Reason recorded when stamps are spent on a reward.
pub fn redemption_reason(reward_name: &str) -> String {
    format!("Reward request: {}", reward_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn event(event_type: EventType, points: i32, parent: Option<Uuid>) -> Event {
        Event {
            id: Uuid::now_v7(),
            title: "Futsal practice".to_string(),
            description: None,
            date: None,
            location: None,
            start_time: None,
            end_time: None,
            capacity: None,
            contact_name: None,
            notes: None,
            event_type,
            points,
            is_active: true,
            parent_event_id: parent,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_single_and_survey_award_points() {
        let award = decide_award(&event(EventType::Single, 2, None), false);
        assert_eq!(award.amount, 2);
        assert_eq!(award.kind, AwardKind::Participation);
        assert_eq!(award.reason, "Futsal practice: participation approved");

        let award = decide_award(&event(EventType::Survey, 0, None), false);
        assert_eq!(award.amount, 1);
    }

    #[test]
    fn test_practice_requires_parent_participation() {
        let parent = Some(Uuid::now_v7());

        let eligible = decide_award(&event(EventType::Practice, 3, parent), true);
        assert_eq!(eligible.amount, 3);

        let ineligible = decide_award(&event(EventType::Practice, 3, parent), false);
        assert_eq!(ineligible.amount, 0);
        assert_eq!(ineligible.kind, AwardKind::PracticeIneligible);
        assert_eq!(ineligible.reason, "Futsal practice: not eligible, no stamp");
    }

    #[test]
    fn test_practice_without_parent_awards_nothing() {
        let award = decide_award(&event(EventType::Practice, 3, None), true);
        assert_eq!(award.amount, 0);
        assert_eq!(award.kind, AwardKind::PracticeIneligible);
    }

    #[test]
    fn test_annual_has_its_own_reason() {
        let award = decide_award(&event(EventType::Annual, 5, None), false);
        assert_eq!(award.amount, 0);
        assert_eq!(award.kind, AwardKind::AnnualEnrolment);
        assert!(award.reason.contains("annual enrolment"));
    }
}
