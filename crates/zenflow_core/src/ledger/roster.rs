use crate::model::class::StudioClass;
use crate::model::member::Member;
use crate::model::snapshot::Snapshot;

/// One line of the attendance-taking list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterEntry<'a> {
    pub member: &'a Member,
    pub present: bool,
}

/// Members for check-in, present ones first.
///
/// Both groups keep the member collection order.
pub fn roster<'a>(snapshot: &'a Snapshot, class: &StudioClass) -> Vec<RosterEntry<'a>> {
    let mut entries: Vec<RosterEntry<'a>> = snapshot
        .members
        .iter()
        .map(|member| RosterEntry {
            member,
            present: class.is_attending(&member.id),
        })
        .collect();
    // stable sort: `true` sorts before `false` under `Reverse`
    entries.sort_by_key(|entry| std::cmp::Reverse(entry.present));
    entries
}
