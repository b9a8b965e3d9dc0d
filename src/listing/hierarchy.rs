use std::collections::HashMap;

use serde::Serialize;

use crate::models::UserRecord;

#[derive(Debug, Clone)]
struct Slot {
    user: UserRecord,
    children: Vec<usize>,
}

impl Slot {
    fn new(user: &UserRecord) -> Self {
        Self {
            user: user.clone(),
            children: Vec::new(),
        }
    }
}

/// Users arranged by who created them.
///
/// Nodes live in an arena and refer to their children by index. A `Forest` is
/// assembled once by [`build`] and is read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct Forest {
    slots: Vec<Slot>,
    roots: Vec<usize>,
}

impl Forest {
    /// Total number of nodes, roots and children alike.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn root_count(&self) -> usize {
        self.roots.len()
    }

    pub fn roots(&self) -> impl Iterator<Item = NodeRef<'_>> + '_ {
        self.roots.iter().map(move |&index| NodeRef {
            forest: self,
            index,
        })
    }

    /// Depth-first walk yielding each node with its depth (roots are 0).
    pub fn walk(&self) -> Vec<(usize, NodeRef<'_>)> {
        let mut out = Vec::with_capacity(self.slots.len());
        let mut stack: Vec<(usize, usize)> = self.roots.iter().rev().map(|&i| (0, i)).collect();
        while let Some((depth, index)) = stack.pop() {
            out.push((depth, NodeRef { forest: self, index }));
            for &child in self.slots[index].children.iter().rev() {
                stack.push((depth + 1, child));
            }
        }
        out
    }

    pub fn find(&self, id: i64) -> Option<NodeRef<'_>> {
        self.slots
            .iter()
            .position(|slot| slot.user.id == id)
            .map(|index| NodeRef { forest: self, index })
    }

    pub fn contains(&self, id: i64) -> bool {
        self.find(id).is_some()
    }

    /// Owned copy of the tree, e.g. for JSON output.
    pub fn to_nodes(&self) -> Vec<HierarchyNode> {
        self.roots().map(|root| root.to_node()).collect()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct NodeRef<'a> {
    forest: &'a Forest,
    index: usize,
}

impl<'a> NodeRef<'a> {
    pub fn user(&self) -> &'a UserRecord {
        &self.forest.slots[self.index].user
    }

    pub fn children(self) -> impl Iterator<Item = NodeRef<'a>> {
        let forest = self.forest;
        forest.slots[self.index]
            .children
            .iter()
            .map(move |&index| NodeRef { forest, index })
    }

    pub fn child_count(&self) -> usize {
        self.forest.slots[self.index].children.len()
    }

    pub fn to_node(&self) -> HierarchyNode {
        HierarchyNode {
            user: self.user().clone(),
            children: self.children().map(|child| child.to_node()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HierarchyNode {
    #[serde(flatten)]
    pub user: UserRecord,
    pub children: Vec<HierarchyNode>,
}

/// Arrange `records` into a forest headed by `current`.
///
/// Records created by the current user hang under it; records created by
/// another known user hang under that user; everything else is a root. The
/// forest is one level deep: a record whose creator is itself nested is
/// surfaced as an extra root rather than attached as a grandchild.
pub fn build(records: &[UserRecord], current: Option<&UserRecord>) -> Forest {
    let mut slots: Vec<Slot> = Vec::with_capacity(records.len() + 1);
    let mut index: HashMap<i64, usize> = HashMap::with_capacity(records.len() + 1);
    let mut order: Vec<usize> = Vec::with_capacity(records.len());

    for user in records {
        if index.contains_key(&user.id) {
            tracing::warn!("Duplicate user id {} ignored while building hierarchy", user.id);
            continue;
        }
        index.insert(user.id, slots.len());
        order.push(slots.len());
        slots.push(Slot::new(user));
    }

    let current_slot = current.map(|cur| {
        *index.entry(cur.id).or_insert_with(|| {
            slots.push(Slot::new(cur));
            slots.len() - 1
        })
    });

    let mut parent: Vec<Option<usize>> = vec![None; slots.len()];
    for &slot in &order {
        if Some(slot) == current_slot {
            continue;
        }
        let user = &slots[slot].user;
        parent[slot] = match user.creator_id() {
            Some(creator) if creator == user.id => None,
            Some(creator) => index.get(&creator).copied(),
            None => None,
        };
    }

    let mut roots: Vec<usize> = Vec::with_capacity(slots.len());
    let mut stranded: Vec<usize> = Vec::new();
    roots.extend(current_slot);

    for &slot in &order {
        if Some(slot) == current_slot {
            continue;
        }
        match parent[slot] {
            None => roots.push(slot),
            Some(p) if parent[p].is_none() => slots[p].children.push(slot),
            Some(_) => stranded.push(slot),
        }
    }

    if !stranded.is_empty() {
        tracing::debug!(
            "{} users nested below another child surfaced as roots",
            stranded.len()
        );
    }
    roots.extend(stranded);

    Forest { slots, roots }
}
