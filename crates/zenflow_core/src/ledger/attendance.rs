use super::{CreditBalance, LedgerError, LedgerResult, MarkOutcome, RemoveOutcome};
use crate::model::attendance::AttendanceRecord;
use crate::model::class::StudioClass;
use crate::model::snapshot::Snapshot;
use chrono::{DateTime, Utc};

struct Resolved {
    class_index: usize,
    member_index: usize,
}

fn resolve(snapshot: &Snapshot, class_id: &str, member_id: &str) -> LedgerResult<Resolved> {
    let class_index = snapshot
        .classes
        .iter()
        .position(|class| class.id == class_id)
        .ok_or_else(|| LedgerError::UnknownClass(class_id.to_string()))?;
    let member_index = snapshot
        .members
        .iter()
        .position(|member| member.id == member_id)
        .ok_or_else(|| LedgerError::UnknownMember(member_id.to_string()))?;
    Ok(Resolved {
        class_index,
        member_index,
    })
}

fn sync_detail(detail: Option<&mut StudioClass>, updated: &StudioClass) {
    if let Some(view) = detail.filter(|view| view.id == updated.id) {
        view.attendees = updated.attendees.clone();
    }
}

/// Checks a member into a class.
///
/// Appends a `present` record, inserts the member into the attendee set and
/// consumes one credit when the member has any. A member at zero credit is
/// still checked in; the counter stays at zero.
pub fn mark_attendance(
    snapshot: &mut Snapshot,
    detail: Option<&mut StudioClass>,
    class_id: &str,
    member_id: &str,
    at: DateTime<Utc>,
) -> LedgerResult<MarkOutcome> {
    let resolved = resolve(snapshot, class_id, member_id)?;

    let record = AttendanceRecord::present(class_id, member_id, at);
    let record_id = record.id.clone();
    snapshot.records.push(record);

    let class = &mut snapshot.classes[resolved.class_index];
    class.attendees.insert(member_id.to_string());
    sync_detail(detail, class);

    let member = &mut snapshot.members[resolved.member_index];
    let credit_charged = member.consume_credit();

    Ok(MarkOutcome {
        record_id,
        credit_charged,
        remaining_classes: member.remaining_classes,
    })
}

/// Checks a member out of a class.
///
/// Deletes every record for the pair, drops the member from the attendee
/// set and refunds one credit. The refund is unconditional: it happens even
/// when the mark did not consume a credit or the member was not present.
pub fn remove_attendance(
    snapshot: &mut Snapshot,
    detail: Option<&mut StudioClass>,
    class_id: &str,
    member_id: &str,
) -> LedgerResult<RemoveOutcome> {
    let resolved = resolve(snapshot, class_id, member_id)?;

    let before = snapshot.records.len();
    snapshot
        .records
        .retain(|record| !record.is_for(class_id, member_id));
    let records_removed = before - snapshot.records.len();

    let class = &mut snapshot.classes[resolved.class_index];
    let was_present = class.attendees.remove(member_id);
    sync_detail(detail, class);

    let member = &mut snapshot.members[resolved.member_index];
    member.refund_credit();

    Ok(RemoveOutcome {
        records_removed,
        was_present,
        remaining_classes: member.remaining_classes,
    })
}

/// Adds purchased credit to a member.
pub fn top_up(snapshot: &mut Snapshot, member_id: &str, amount: u32) -> LedgerResult<CreditBalance> {
    if amount == 0 {
        return Err(LedgerError::InvalidAmount);
    }
    let member = snapshot
        .members
        .iter_mut()
        .find(|member| member.id == member_id)
        .ok_or_else(|| LedgerError::UnknownMember(member_id.to_string()))?;

    member.add_purchased_credit(amount);
    Ok(CreditBalance {
        remaining_classes: member.remaining_classes,
        total_purchased_classes: member.total_purchased_classes,
    })
}
