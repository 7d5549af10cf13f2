use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::{SubmissionError, SubmissionResult};
use crate::models::{ModerationDecision, ModerationState, SubmissionStatus};

/// Moderation capability for a record type that embeds a [`ModerationState`].
///
/// Only `pending → approved` and `pending → rejected` are legal through
/// [`Moderatable::transition`]. Anything else, scraped records included,
/// reports [`SubmissionError::NotFoundOrWrongState`].
pub trait Moderatable {
    fn record_id(&self) -> Uuid;

    fn moderation(&self) -> &ModerationState;

    fn moderation_mut(&mut self) -> &mut ModerationState;

    fn status(&self) -> SubmissionStatus {
        self.moderation().status
    }

    fn is_publicly_visible(&self) -> bool {
        self.status().is_publicly_visible()
    }

    /// Review a pending record. Approval leaves an existing rejection reason in place.
    fn transition(
        &mut self,
        decision: &ModerationDecision,
        moderator: Uuid,
        at: DateTime<Utc>,
    ) -> SubmissionResult<()> {
        if self.status() != SubmissionStatus::Pending {
            return Err(SubmissionError::NotFoundOrWrongState(self.record_id()));
        }

        self.moderation_mut().record_review(decision, moderator, at);
        Ok(())
    }

    /// Administrative override with no status precondition. Approval clears
    /// any rejection reason so the record stays consistent.
    fn override_decision(&mut self, decision: &ModerationDecision, moderator: Uuid, at: DateTime<Utc>) {
        let state = self.moderation_mut();
        state.record_review(decision, moderator, at);
        if matches!(decision, ModerationDecision::Approve) {
            state.rejection_reason = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Record {
        id: Uuid,
        moderation: ModerationState,
    }

    impl Moderatable for Record {
        fn record_id(&self) -> Uuid {
            self.id
        }

        fn moderation(&self) -> &ModerationState {
            &self.moderation
        }

        fn moderation_mut(&mut self) -> &mut ModerationState {
            &mut self.moderation
        }
    }

    fn pending() -> Record {
        Record {
            id: Uuid::new_v4(),
            moderation: ModerationState::submitted(Uuid::new_v4(), Utc::now()),
        }
    }

    fn reject(reason: &str) -> ModerationDecision {
        ModerationDecision::Reject {
            reason: reason.to_string(),
        }
    }

    #[test]
    fn test_reject_records_reviewer_and_reason() {
        let mut record = pending();
        let moderator = Uuid::new_v4();
        let at = Utc::now();

        record.transition(&reject("spam"), moderator, at).unwrap();

        assert_eq!(record.status(), SubmissionStatus::Rejected);
        assert_eq!(record.moderation.reviewed_by, Some(moderator));
        assert_eq!(record.moderation.reviewed_at, Some(at));
        assert_eq!(record.moderation.rejection_reason.as_deref(), Some("spam"));
        assert!(!record.is_publicly_visible());
    }

    #[test]
    fn test_second_decision_is_wrong_state() {
        let mut record = pending();
        record
            .transition(&ModerationDecision::Approve, Uuid::new_v4(), Utc::now())
            .unwrap();
        let first_review = record.moderation.reviewed_at;

        let err = record
            .transition(&reject("late"), Uuid::new_v4(), Utc::now())
            .unwrap_err();

        assert!(matches!(err, SubmissionError::NotFoundOrWrongState(id) if id == record.id));
        assert_eq!(record.status(), SubmissionStatus::Approved);
        assert_eq!(record.moderation.reviewed_at, first_review);
    }

    #[test]
    fn test_scraped_records_cannot_transition() {
        let mut record = Record {
            id: Uuid::new_v4(),
            moderation: ModerationState::scraped(),
        };

        for decision in [ModerationDecision::Approve, reject("nope")] {
            let err = record.transition(&decision, Uuid::new_v4(), Utc::now()).unwrap_err();
            assert!(matches!(err, SubmissionError::NotFoundOrWrongState(_)));
        }
        assert_eq!(record.status(), SubmissionStatus::Scraped);
        assert!(record.moderation.reviewed_by.is_none());
    }

    #[test]
    fn test_approve_keeps_stale_reason_but_override_clears_it() {
        let mut record = pending();
        record.moderation.rejection_reason = Some("old".into());

        record
            .transition(&ModerationDecision::Approve, Uuid::new_v4(), Utc::now())
            .unwrap();
        assert_eq!(record.moderation.rejection_reason.as_deref(), Some("old"));

        record.override_decision(&reject("duplicate"), Uuid::new_v4(), Utc::now());
        assert_eq!(record.status(), SubmissionStatus::Rejected);

        record.override_decision(&ModerationDecision::Approve, Uuid::new_v4(), Utc::now());
        assert_eq!(record.status(), SubmissionStatus::Approved);
        assert!(record.moderation.rejection_reason.is_none());
    }
}
