//! Relationship edges between people
//!
//! An edge is owned by one person and names that person's role toward the
//! target: a mother holds `Mother -> child`, the child holds `Daughter -> mother`.
//! Edges are created in mirrored pairs through [`Bond`] and are never removed;
//! only the `active` flag of spousal edges ever changes.

use serde::{Deserialize, Serialize};

use crate::components::{Gender, PersonId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelationshipKind {
    Husband,
    Wife,
    Father,
    Mother,
    Son,
    Daughter,
    Brother,
    Sister,
    Grandfather,
    Grandmother,
    Grandson,
    Granddaughter,
    Uncle,
    Aunt,
    Niece,
    Nephew,
    Cousin,
    Friend,
    Enemy,
}

impl RelationshipKind {
    pub fn is_spousal(self) -> bool {
        matches!(self, Self::Husband | Self::Wife)
    }

    /// Kinship by descent. Any such edge between two people rules out marriage.
    pub fn is_blood(self) -> bool {
        !matches!(self, Self::Husband | Self::Wife | Self::Friend | Self::Enemy)
    }

    /// Gender implied by the label, if it is gendered.
    pub fn gender(self) -> Option<Gender> {
        use RelationshipKind::*;
        match self {
            Husband | Father | Son | Brother | Grandfather | Grandson | Uncle | Nephew => {
                Some(Gender::Male)
            }
            Wife | Mother | Daughter | Sister | Grandmother | Granddaughter | Aunt | Niece => {
                Some(Gender::Female)
            }
            Cousin | Friend | Enemy => None,
        }
    }

    /// The label the target of this edge holds back toward its owner, given
    /// the target's gender.
    pub fn reciprocal(self, target_gender: Gender) -> RelationshipKind {
        use RelationshipKind::*;
        let pick = |male, female| match target_gender {
            Gender::Male => male,
            Gender::Female => female,
        };
        match self {
            Husband | Wife => pick(Husband, Wife),
            Father | Mother => pick(Son, Daughter),
            Son | Daughter => pick(Father, Mother),
            Brother | Sister => pick(Brother, Sister),
            Grandfather | Grandmother => pick(Grandson, Granddaughter),
            Grandson | Granddaughter => pick(Grandfather, Grandmother),
            Uncle | Aunt => pick(Nephew, Niece),
            Niece | Nephew => pick(Uncle, Aunt),
            Cousin => Cousin,
            Friend => Friend,
            Enemy => Enemy,
        }
    }
}

/// A mirrored edge pair, read from its first endpoint: `Parent` means the
/// first endpoint is the parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bond {
    Spouse,
    Parent,
    Sibling,
    Grandparent,
    AuntOrUncle,
    Cousin,
    Friend,
    Enemy,
}

impl Bond {
    /// Labels for `from -> to` and `to -> from`.
    pub fn labels(self, from: Gender, to: Gender) -> (RelationshipKind, RelationshipKind) {
        use RelationshipKind::*;
        let forward = match self {
            Bond::Spouse => gendered(from, Husband, Wife),
            Bond::Parent => gendered(from, Father, Mother),
            Bond::Sibling => gendered(from, Brother, Sister),
            Bond::Grandparent => gendered(from, Grandfather, Grandmother),
            Bond::AuntOrUncle => gendered(from, Uncle, Aunt),
            Bond::Cousin => Cousin,
            Bond::Friend => Friend,
            Bond::Enemy => Enemy,
        };
        (forward, forward.reciprocal(to))
    }
}

fn gendered(gender: Gender, male: RelationshipKind, female: RelationshipKind) -> RelationshipKind {
    match gender {
        Gender::Male => male,
        Gender::Female => female,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
    target: PersonId,
    kind: RelationshipKind,
    active: bool,
}

impl Relationship {
    pub fn target(&self) -> PersonId {
        self.target
    }

    pub fn kind(&self) -> RelationshipKind {
        self.kind
    }

    pub fn is_active(&self) -> bool {
        self.active
    }
}

/// Outgoing edges of one person, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationships {
    edges: Vec<Relationship>,
}

impl Relationships {
    pub fn iter(&self) -> impl Iterator<Item = &Relationship> + '_ {
        self.edges.iter()
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Targets of every edge whose kind satisfies `pred`, active or not.
    pub fn targets<'a>(
        &'a self,
        pred: impl Fn(RelationshipKind) -> bool + 'a,
    ) -> impl Iterator<Item = PersonId> + 'a {
        self.edges
            .iter()
            .filter(move |r| pred(r.kind))
            .map(|r| r.target)
    }

    pub fn spouse(&self) -> Option<PersonId> {
        self.edges
            .iter()
            .find(|r| r.active && r.kind.is_spousal())
            .map(|r| r.target)
    }

    pub fn children(&self) -> impl Iterator<Item = PersonId> + '_ {
        self.targets(|k| matches!(k, RelationshipKind::Father | RelationshipKind::Mother))
    }

    pub fn parents(&self) -> impl Iterator<Item = PersonId> + '_ {
        self.targets(|k| matches!(k, RelationshipKind::Son | RelationshipKind::Daughter))
    }

    pub fn siblings(&self) -> impl Iterator<Item = PersonId> + '_ {
        self.targets(|k| matches!(k, RelationshipKind::Brother | RelationshipKind::Sister))
    }

    pub fn children_had(&self) -> usize {
        self.children().count()
    }

    pub fn has_active(&self, kind: RelationshipKind, target: PersonId) -> bool {
        self.edges
            .iter()
            .any(|r| r.active && r.kind == kind && r.target == target)
    }

    pub fn is_blood_relative_of(&self, target: PersonId) -> bool {
        self.edges
            .iter()
            .any(|r| r.target == target && r.kind.is_blood())
    }

    pub(crate) fn push(&mut self, target: PersonId, kind: RelationshipKind) {
        self.edges.push(Relationship {
            target,
            kind,
            active: true,
        });
    }

    /// Deactivates every spousal edge. Returns how many were still active.
    pub(crate) fn end_marriages(&mut self) -> usize {
        let mut ended = 0;
        for edge in self.edges.iter_mut().filter(|r| r.kind.is_spousal()) {
            if edge.active {
                edge.active = false;
                ended += 1;
            }
        }
        ended
    }
}
