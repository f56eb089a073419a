//! Aging - age and procreation eligibility
//!
//! Age is never stored; it is computed from the birth year on demand.

use crate::components::{BirthDate, Date, Health, PersonId};
use crate::error::Result;
use crate::world::SimulationWorld;

pub const MINIMUM_BREEDING_AGE: i32 = 16;
pub const MAXIMUM_BREEDING_AGE: i32 = 40;

impl SimulationWorld {
    /// Age in whole calendar years at `when`.
    pub fn age(&self, id: PersonId, when: Date) -> Result<i32> {
        Ok(self.read::<BirthDate>(id)?.0.years_until(when))
    }

    /// Alive, fertile, and within the breeding ages.
    pub fn can_procreate(&self, id: PersonId, when: Date) -> Result<bool> {
        let health = self.read::<Health>(id)?;
        if health.is_dead() || health.is_barren() {
            return Ok(false);
        }
        Ok(self.config.rules.breeding_ages.contains(&self.age(id, when)?))
    }
}
