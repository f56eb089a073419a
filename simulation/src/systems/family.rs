//! Family System
//!
//! Birth of a child to two parents, and the cascade of kinship edges it
//! implies. Every edge of a birth is planned from the parents' edges as they
//! stood before the birth, then committed in one step.

use tracing::debug;

use crate::components::{Date, Health, PersonId};
use crate::error::{Result, SimError};
use crate::relationships::{Bond, Relationships};
use crate::world::SimulationWorld;

/// Chance that a child is born dead.
pub const INFANT_MORTALITY: f64 = 0.2;

/// Relatives of a child-to-be, read from the parents' edges before the birth.
/// Each list is de-duplicated in first-seen order.
#[derive(Debug, Default)]
struct Kin {
    siblings: Vec<PersonId>,
    grandparents: Vec<PersonId>,
    /// Aunts and uncles, each with the cousins they contribute.
    aunts_uncles: Vec<(PersonId, Vec<PersonId>)>,
}

impl Kin {
    fn bonds(&self, parents: [PersonId; 2], child: PersonId) -> Vec<(PersonId, PersonId, Bond)> {
        let mut bonds = Vec::new();
        bonds.extend(self.siblings.iter().map(|&s| (s, child, Bond::Sibling)));
        bonds.extend(self.grandparents.iter().map(|&g| (g, child, Bond::Grandparent)));
        for (aunt_uncle, cousins) in &self.aunts_uncles {
            bonds.push((*aunt_uncle, child, Bond::AuntOrUncle));
            bonds.extend(cousins.iter().map(|&c| (c, child, Bond::Cousin)));
        }
        bonds.extend(parents.iter().map(|&p| (p, child, Bond::Parent)));
        bonds
    }
}

fn extend_unique(into: &mut Vec<PersonId>, ids: impl Iterator<Item = PersonId>, skip: &[PersonId]) {
    for id in ids {
        if !into.contains(&id) && !skip.contains(&id) {
            into.push(id);
        }
    }
}

impl SimulationWorld {
    fn kin_before_birth(&self, parents: [PersonId; 2]) -> Result<Kin> {
        let mut kin = Kin::default();
        let mut aunts_uncles = Vec::new();
        for parent in parents {
            self.with_relationships(parent, |r: &Relationships| {
                extend_unique(&mut kin.siblings, r.children(), &parents);
                extend_unique(&mut kin.grandparents, r.parents(), &parents);
                extend_unique(&mut aunts_uncles, r.siblings(), &parents);
            })?;
        }

        let mut seen_cousins = Vec::new();
        for aunt_uncle in aunts_uncles {
            let mut cousins = Vec::new();
            self.with_relationships(aunt_uncle, |r| {
                extend_unique(&mut cousins, r.children(), &parents);
            })?;
            cousins.retain(|c| !seen_cousins.contains(c) && !kin.siblings.contains(c));
            seen_cousins.extend(cousins.iter().copied());
            kin.aunts_uncles.push((aunt_uncle, cousins));
        }
        Ok(kin)
    }

    /// Create a child of `parent_a` and `parent_b` born on `birth_date`.
    ///
    /// The child gets random attributes and a generated name, may be born
    /// dead, and receives sibling, grandparent, aunt/uncle, cousin and parent
    /// edges (all mirrored). On error nothing is created.
    pub fn spawn_offspring(
        &mut self,
        parent_a: PersonId,
        parent_b: PersonId,
        birth_date: Date,
    ) -> Result<PersonId> {
        if parent_a == parent_b {
            return Err(SimError::SelfRelationship(parent_a));
        }
        let parents = [parent_a, parent_b];
        let kin = self.kin_before_birth(parents)?;
        let newcomer = self.random_newcomer(birth_date)?;
        let child = self.insert(newcomer);

        if let Err(err) = self.commit_bonds(&kin.bonds(parents, child)) {
            self.discard(child)?;
            return Err(err);
        }

        let stillborn = self.chance(child, self.config.rules.infant_mortality)?;
        if stillborn {
            let entity = self.entity(child)?;
            self.world.get::<&mut Health>(entity)?.die();
        }
        debug!(
            child = %child,
            parents = ?parents,
            siblings = kin.siblings.len(),
            stillborn,
            "Born"
        );
        Ok(child)
    }
}
