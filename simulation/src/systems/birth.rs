//! Birth System
//!
//! Married couples try for children once a year. The attempt budget shrinks
//! with every child the actor already has, and the first successful attempt
//! ends the year's trying.

use rand::Rng;
use tracing::debug;

use crate::components::{Date, PersonId};
use crate::error::Result;
use crate::relationships::Relationships;
use crate::world::SimulationWorld;

/// Conception attempts per year for someone with no children yet
pub const MAXIMUM_PROCREATION_ATTEMPTS: i32 = 52;

/// Attempts lost per child already had
pub const ATTEMPTS_LOST_PER_CHILD: i32 = 5;

/// Success chance of a single attempt
pub const PROCREATION_SUCCESS_RATE: f64 = 0.025;

/// Litter size rolls below this are triplets
pub const TRIPLETS_BELOW: f64 = 0.0014;

/// Litter size rolls below this (and not triplets) are twins
pub const TWINS_BELOW: f64 = 0.033;

pub fn litter_size(roll: f64, triplets_below: f64, twins_below: f64) -> u8 {
    if roll < triplets_below {
        3
    } else if roll < twins_below {
        2
    } else {
        1
    }
}

#[derive(Debug, Clone, Copy)]
struct Litter {
    parents: [PersonId; 2],
    birth_date: Date,
    remaining: u8,
}

/// Children of one conception, born one per call to `next`.
///
/// Each step creates a person and writes their kinship edges, so this is a
/// single pass: it holds the world mutably until dropped, and dropping it
/// early leaves the rest of the litter unborn.
pub struct Offspring<'w> {
    world: &'w mut SimulationWorld,
    litter: Option<Litter>,
}

impl<'w> Offspring<'w> {
    fn none(world: &'w mut SimulationWorld) -> Self {
        Self {
            world,
            litter: None,
        }
    }

    /// Children not yet born.
    pub fn remaining(&self) -> usize {
        self.litter.map_or(0, |l| usize::from(l.remaining))
    }

    pub fn birth_date(&self) -> Option<Date> {
        self.litter.map(|l| l.birth_date)
    }
}

impl Iterator for Offspring<'_> {
    type Item = Result<PersonId>;

    fn next(&mut self) -> Option<Self::Item> {
        let litter = self.litter.as_mut()?;
        if litter.remaining == 0 {
            return None;
        }
        litter.remaining -= 1;
        let ([a, b], date) = (litter.parents, litter.birth_date);

        let child = self.world.spawn_offspring(a, b, date);
        if child.is_err() {
            self.litter = None;
        }
        Some(child)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.remaining()))
    }
}

impl SimulationWorld {
    /// Yearly attempt budget of `id`; zero or negative means no attempts.
    pub fn procreation_attempts(&self, id: PersonId) -> Result<i32> {
        let rules = &self.config.rules;
        let had = self.with_relationships(id, Relationships::children_had)?;
        let had = i32::try_from(had).unwrap_or(i32::MAX);
        Ok(rules
            .max_procreation_attempts
            .saturating_sub(rules.attempts_lost_per_child.saturating_mul(had)))
    }

    /// Try for children with the actor's spouse this year.
    ///
    /// Eligibility and conception are settled here; the returned iterator
    /// only delivers the children. It is empty when the actor is single,
    /// either partner cannot procreate, or no attempt succeeds.
    pub fn try_to_procreate(&mut self, actor: PersonId, when: Date) -> Result<Offspring<'_>> {
        let Some(spouse) = self.spouse(actor)? else {
            return Ok(Offspring::none(self));
        };
        if !self.can_procreate(actor, when)? || !self.can_procreate(spouse, when)? {
            return Ok(Offspring::none(self));
        }

        let attempts = self.procreation_attempts(actor)?;
        let rate = self.config.rules.procreation_success_rate;
        let mut conceived = false;
        for _ in 0..attempts {
            if self.chance(actor, rate)? {
                conceived = true;
                break;
            }
        }
        if !conceived {
            return Ok(Offspring::none(self));
        }

        let roll = self.draw(spouse, |rng| rng.gen::<f64>())?;
        let count = litter_size(roll, self.config.rules.triplets_below, self.config.rules.twins_below);
        let birth_date = Date::random_in_year(&mut self.rng, when.year())?;
        debug!(person = %actor, spouse = %spouse, count, %birth_date, "Conceived");

        Ok(Offspring {
            world: self,
            litter: Some(Litter {
                parents: [actor, spouse],
                birth_date,
                remaining: count,
            }),
        })
    }
}
