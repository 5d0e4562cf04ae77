//! List reconciliation between two snapshots.
//!
//! Given the snapshot a view last rendered and the snapshot it should render
//! now, [`diff`] produces a short positional edit script so the view can
//! update incrementally instead of redrawing everything.
//!
//! # Algorithm
//!
//! 1. Identity is the book id. Ids must be unique within each snapshot.
//! 2. Books present in both snapshots are matched by a longest common
//!    subsequence over ids. Because ids are unique this reduces to a longest
//!    increasing subsequence over the new positions of the surviving books,
//!    taken in old order. Among equally long candidates the one that keeps the
//!    earliest old positions wins.
//! 3. Edits are emitted in four passes: removals (descending index), moves of
//!    matched books outside the subsequence, insertions (ascending index), and
//!    content updates at final positions.
//!
//! Every index refers to the list as it stands after the preceding edit has
//! been applied, the way list widgets consume change notifications.

use crate::{Book, BookId};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// A single positional change to a rendered list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum Edit {
    /// Remove the item at `index`
    Remove { index: usize, id: BookId },
    /// Remove the item at `from`, then insert it at `to`
    Move { from: usize, to: usize, id: BookId },
    /// Insert a new item at `index`
    Insert { index: usize, book: Book },
    /// Same item, new content, at `index`
    Update { index: usize, book: Book },
}

/// An ordered list of edits turning one snapshot into another.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EditScript {
    edits: Vec<Edit>,
}

impl EditScript {
    pub fn edits(&self) -> &[Edit] {
        &self.edits
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Edit> {
        self.edits.iter()
    }

    pub fn len(&self) -> usize {
        self.edits.len()
    }

    /// True when both snapshots were identical.
    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    pub fn removals(&self) -> usize {
        self.count(|e| matches!(e, Edit::Remove { .. }))
    }

    pub fn moves(&self) -> usize {
        self.count(|e| matches!(e, Edit::Move { .. }))
    }

    pub fn insertions(&self) -> usize {
        self.count(|e| matches!(e, Edit::Insert { .. }))
    }

    pub fn updates(&self) -> usize {
        self.count(|e| matches!(e, Edit::Update { .. }))
    }

    fn count(&self, pred: impl Fn(&Edit) -> bool) -> usize {
        self.edits.iter().filter(|e| pred(e)).count()
    }

    /// Replay the script against a rendered list.
    ///
    /// # Panics
    ///
    /// Panics if `list` is not the old snapshot this script was computed from.
    pub fn apply(&self, list: &mut Vec<Book>) {
        for edit in &self.edits {
            match edit {
                Edit::Remove { index, .. } => {
                    list.remove(*index);
                }
                Edit::Move { from, to, .. } => {
                    let book = list.remove(*from);
                    list.insert(*to, book);
                }
                Edit::Insert { index, book } => list.insert(*index, book.clone()),
                Edit::Update { index, book } => list[*index] = book.clone(),
            }
        }
    }
}

impl<'a> IntoIterator for &'a EditScript {
    type Item = &'a Edit;
    type IntoIter = std::slice::Iter<'a, Edit>;

    fn into_iter(self) -> Self::IntoIter {
        self.edits.iter()
    }
}

/// Compute the edit script from `old` to `new`.
pub fn diff(old: &[Book], new: &[Book]) -> EditScript {
    let new_pos: HashMap<BookId, usize> = new.iter().enumerate().map(|(j, b)| (b.id, j)).collect();
    let old_by_id: HashMap<BookId, &Book> = old.iter().map(|b| (b.id, b)).collect();

    // New positions of surviving books, in old order.
    let survivor_ids: Vec<BookId> = old
        .iter()
        .map(|b| b.id)
        .filter(|id| new_pos.contains_key(id))
        .collect();
    let survivors: Vec<usize> = survivor_ids.iter().map(|id| new_pos[id]).collect();
    let stable: HashSet<BookId> = earliest_increasing_subsequence(&survivors)
        .into_iter()
        .map(|k| new[survivors[k]].id)
        .collect();

    let mut edits = Vec::new();

    for (index, book) in old.iter().enumerate().rev() {
        if !new_pos.contains_key(&book.id) {
            edits.push(Edit::Remove { index, id: book.id });
        }
    }

    // Working-list order as slot keys: a survivor starts in its old slot
    // `(k, 0)`; a moved book lands directly after the previous survivor in new
    // order, one step further along that survivor's chain.
    let old_slot: HashMap<BookId, Slot> = survivor_ids
        .iter()
        .enumerate()
        .map(|(k, &id)| (id, (k as i64, 0)))
        .collect();
    let mut landings: Vec<(BookId, Slot, Slot)> = Vec::new();
    let mut previous: Option<Slot> = None;
    for book in new {
        let Some(&slot) = old_slot.get(&book.id) else {
            continue;
        };
        let key = if stable.contains(&book.id) {
            slot
        } else {
            let (root, depth) = previous.unwrap_or((-1, 0));
            let landing = (root, depth + 1);
            landings.push((book.id, slot, landing));
            landing
        };
        previous = Some(key);
    }

    let mut slots: Vec<Slot> = old_slot.values().copied().collect();
    slots.extend(landings.iter().map(|&(_, _, to)| to));
    slots.sort_unstable();
    let rank = |slot: Slot| slots.partition_point(|&s| s < slot);

    let mut occupied = Occupancy::new(slots.len());
    for &slot in old_slot.values() {
        occupied.insert(rank(slot));
    }
    for (id, from_slot, to_slot) in landings {
        let from = occupied.before(rank(from_slot));
        occupied.remove(rank(from_slot));
        let to = occupied.before(rank(to_slot));
        occupied.insert(rank(to_slot));

        if from != to {
            edits.push(Edit::Move { from, to, id });
        }
    }

    for (index, book) in new.iter().enumerate() {
        if !old_by_id.contains_key(&book.id) {
            edits.push(Edit::Insert {
                index,
                book: book.clone(),
            });
        }
    }

    for (index, book) in new.iter().enumerate() {
        if let Some(previous) = old_by_id.get(&book.id) {
            if *previous != book {
                edits.push(Edit::Update {
                    index,
                    book: book.clone(),
                });
            }
        }
    }

    EditScript { edits }
}

/// Position key in the working list: (old survivor index or -1, chain depth).
type Slot = (i64, usize);

/// Fenwick tree counting occupied slots, for positions in O(log n).
struct Occupancy {
    tree: Vec<usize>,
}

impl Occupancy {
    fn new(len: usize) -> Self {
        Self {
            tree: vec![0; len + 1],
        }
    }

    fn insert(&mut self, slot: usize) {
        let mut i = slot + 1;
        while i < self.tree.len() {
            self.tree[i] += 1;
            i += i & i.wrapping_neg();
        }
    }

    fn remove(&mut self, slot: usize) {
        let mut i = slot + 1;
        while i < self.tree.len() {
            self.tree[i] -= 1;
            i += i & i.wrapping_neg();
        }
    }

    /// Number of occupied slots strictly before `slot`.
    fn before(&self, slot: usize) -> usize {
        let mut i = slot;
        let mut count = 0;
        while i > 0 {
            count += self.tree[i];
            i -= i & i.wrapping_neg();
        }
        count
    }
}

/// Indices into `seq` of its longest strictly increasing subsequence,
/// preferring the earliest indices when several have maximal length.
///
/// `seq` must not contain duplicates.
fn earliest_increasing_subsequence(seq: &[usize]) -> Vec<usize> {
    // longest[i]: length of the longest increasing subsequence starting at i
    let mut longest = vec![0; seq.len()];
    // best_start[l]: largest first value of any increasing subsequence of
    // length l + 1 found so far; strictly decreasing in l
    let mut best_start: Vec<usize> = Vec::new();

    for i in (0..seq.len()).rev() {
        let value = seq[i];
        let len = best_start.partition_point(|&s| s > value);
        if len == best_start.len() {
            best_start.push(value);
        } else {
            best_start[len] = value;
        }
        longest[i] = len + 1;
    }

    let mut need = best_start.len();
    let mut picked = Vec::with_capacity(need);
    let mut last: Option<usize> = None;
    for (i, &value) in seq.iter().enumerate() {
        if need == 0 {
            break;
        }
        if longest[i] == need && last.map_or(true, |l| value > l) {
            picked.push(i);
            last = Some(value);
            need -= 1;
        }
    }

    picked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NewBook;

    fn book(id: BookId, title: &str) -> Book {
        NewBook::new("", title, "Author").with_id(id)
    }

    fn abc() -> Vec<Book> {
        vec![book(1, "A"), book(2, "B"), book(3, "C")]
    }

    fn replay(old: &[Book], new: &[Book]) -> EditScript {
        let script = diff(old, new);
        let mut list = old.to_vec();
        script.apply(&mut list);
        assert_eq!(list, new);
        script
    }

    #[test]
    fn identical_lists_produce_nothing() {
        let script = replay(&abc(), &abc());
        assert!(script.is_empty());
    }

    #[test]
    fn removal_in_the_middle() {
        let old = abc();
        let new = vec![old[0].clone(), old[2].clone()];

        let script = replay(&old, &new);
        assert_eq!(script.edits(), &[Edit::Remove { index: 1, id: 2 }]);
    }

    #[test]
    fn insertion_into_empty_list() {
        let new = vec![book(10, "X"), book(11, "Y")];

        let script = replay(&[], &new);
        assert_eq!(
            script.edits(),
            &[
                Edit::Insert {
                    index: 0,
                    book: new[0].clone()
                },
                Edit::Insert {
                    index: 1,
                    book: new[1].clone()
                },
            ]
        );
    }

    #[test]
    fn clearing_removes_from_the_back() {
        let script = replay(&abc(), &[]);
        assert_eq!(
            script.edits(),
            &[
                Edit::Remove { index: 2, id: 3 },
                Edit::Remove { index: 1, id: 2 },
                Edit::Remove { index: 0, id: 1 },
            ]
        );
    }

    #[test]
    fn content_change_is_an_update_not_a_move() {
        let old = abc();
        let mut new = old.clone();
        new[1] = new[1].with_read(true);

        let script = replay(&old, &new);
        assert_eq!(
            script.edits(),
            &[Edit::Update {
                index: 1,
                book: new[1].clone()
            }]
        );
    }

    #[test]
    fn rotation_moves_one_item() {
        let old = vec![book(1, "A"), book(2, "B"), book(3, "C"), book(4, "D")];
        let new = vec![old[1].clone(), old[2].clone(), old[3].clone(), old[0].clone()];

        let script = replay(&old, &new);
        assert_eq!(
            script.edits(),
            &[Edit::Move {
                from: 0,
                to: 3,
                id: 1
            }]
        );
    }

    #[test]
    fn swap_keeps_earliest_old_item_in_place() {
        let old = vec![book(1, "A"), book(2, "B")];
        let new = vec![old[1].clone(), old[0].clone()];

        let script = replay(&old, &new);
        assert_eq!(
            script.edits(),
            &[Edit::Move {
                from: 1,
                to: 0,
                id: 2
            }]
        );
    }

    #[test]
    fn moved_books_chain_behind_each_other() {
        let old: Vec<Book> = (1..=5).map(|id| book(id, "X")).collect();
        let new = vec![
            old[4].clone(),
            old[3].clone(),
            old[0].clone(),
            old[1].clone(),
            old[2].clone(),
        ];

        let script = replay(&old, &new);
        assert_eq!(
            script.edits(),
            &[
                Edit::Move {
                    from: 4,
                    to: 0,
                    id: 5
                },
                Edit::Move {
                    from: 4,
                    to: 1,
                    id: 4
                },
            ]
        );
    }

    #[test]
    fn long_reversal() {
        let old: Vec<Book> = (0..5_000).map(|id| book(id, "X")).collect();
        let new: Vec<Book> = old.iter().rev().cloned().collect();

        let script = replay(&old, &new);
        assert_eq!(script.moves(), 4_999);
        assert_eq!(
            script.edits()[0],
            Edit::Move {
                from: 4_999,
                to: 0,
                id: 4_999
            }
        );
    }

    #[test]
    fn reinserted_id_is_a_new_item() {
        // A different id with identical content is not the same item.
        let old = vec![book(1, "A")];
        let new = vec![book(2, "A")];

        let script = replay(&old, &new);
        assert_eq!(script.removals(), 1);
        assert_eq!(script.insertions(), 1);
        assert_eq!(script.updates(), 0);
    }

    #[test]
    fn mixed_changes() {
        let old = vec![book(1, "A"), book(2, "B"), book(3, "C"), book(4, "D")];
        let new = vec![
            book(5, "E"),
            old[2].clone(),
            old[0].with_read(true),
            book(6, "F"),
            old[3].clone(),
        ];

        let script = replay(&old, &new);
        assert_eq!(script.removals(), 1);
        assert_eq!(script.insertions(), 2);
        assert_eq!(script.moves(), 1);
        assert_eq!(script.updates(), 1);
    }

    #[test]
    fn earliest_subsequence_prefers_early_indices() {
        assert_eq!(earliest_increasing_subsequence(&[]), Vec::<usize>::new());
        assert_eq!(earliest_increasing_subsequence(&[1, 0]), vec![0]);
        assert_eq!(earliest_increasing_subsequence(&[3, 0, 1, 2]), vec![1, 2, 3]);
        assert_eq!(earliest_increasing_subsequence(&[2, 3, 0, 1]), vec![0, 1]);
    }

    #[test]
    fn script_serialization() {
        let script = diff(&abc(), &abc()[..2]);
        let json = serde_json::to_string(&script).unwrap();
        assert_eq!(json, r#"[{"op":"remove","index":2,"id":3}]"#);
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        /// Old and new lists over a small id space so they overlap often.
        fn arb_lists() -> impl Strategy<Value = (Vec<Book>, Vec<Book>)> {
            let arb_list = || {
                proptest::sample::subsequence((1..=12).collect::<Vec<BookId>>(), 0..=12)
                    .prop_shuffle()
                    .prop_flat_map(|ids| {
                        let n = ids.len();
                        (Just(ids), proptest::collection::vec(any::<bool>(), n))
                    })
                    .prop_map(|(ids, flags)| {
                        ids.into_iter()
                            .zip(flags)
                            .map(|(id, read)| book(id, "T").with_read(read))
                            .collect::<Vec<_>>()
                    })
            };
            (arb_list(), arb_list())
        }

        proptest! {
            #[test]
            fn prop_apply_reaches_new((old, new) in arb_lists()) {
                let script = diff(&old, &new);
                let mut list = old.clone();
                script.apply(&mut list);
                prop_assert_eq!(list, new);
            }

            #[test]
            fn prop_only_unmatched_items_are_removed_or_inserted((old, new) in arb_lists()) {
                let script = diff(&old, &new);
                let shared = old
                    .iter()
                    .filter(|b| new.iter().any(|n| n.id == b.id))
                    .count();
                prop_assert_eq!(script.removals(), old.len() - shared);
                prop_assert_eq!(script.insertions(), new.len() - shared);
                prop_assert!(script.moves() < shared.max(1));
            }

            #[test]
            fn prop_diff_is_deterministic((old, new) in arb_lists()) {
                prop_assert_eq!(diff(&old, &new), diff(&old, &new));
            }
        }
    }
}
