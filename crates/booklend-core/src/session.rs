//! Year-end promotion.

use crate::{Member, MAX_YEAR};

/// What a promotion did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromotionSummary {
    /// Students moved up one year.
    pub promoted: usize,
    /// Final-year students removed from the roster.
    pub graduated: Vec<Member>,
}

/// Move every student up a year; final-year students leave the roster.
///
/// Teachers are untouched. There is no undo.
///
/// ```
/// use booklend_core::{promote, Member, MemberDraft};
///
/// let mut roster = vec![
///     Member::from_draft("M1", MemberDraft::student("Ali", 3, None)).unwrap(),
///     Member::from_draft("M2", MemberDraft::student("Siti", 6, None)).unwrap(),
///     Member::from_draft("M3", MemberDraft::teacher("Cikgu Lee")).unwrap(),
/// ];
/// let summary = promote(&mut roster);
/// assert_eq!(summary.promoted, 1);
/// assert_eq!(summary.graduated[0].name, "SITI");
/// assert_eq!(roster[0].year, Some(4));
/// assert_eq!(roster.len(), 2);
/// ```
pub fn promote(members: &mut Vec<Member>) -> PromotionSummary {
    let mut summary = PromotionSummary::default();
    let mut kept = Vec::with_capacity(members.len());
    for mut member in members.drain(..) {
        match (member.is_student(), member.year) {
            (true, Some(year)) if year >= MAX_YEAR => summary.graduated.push(member),
            (true, Some(year)) => {
                member.year = Some(year + 1);
                summary.promoted += 1;
                kept.push(member);
            }
            _ => kept.push(member),
        }
    }
    *members = kept;
    summary
}
