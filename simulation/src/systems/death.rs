//! Death System
//!
//! Linear hazard: the chance of dying this year is age / maximum age, so
//! anyone at or past the maximum age dies for certain.

use tracing::debug;

use crate::components::{Date, Health, PersonId};
use crate::error::Result;
use crate::relationships::Relationships;
use crate::world::SimulationWorld;

pub const MAXIMUM_AGE: i32 = 80;

/// Yearly death probability for `age`, clamped to [0, 1].
pub fn death_probability(age: i32, max_age: i32) -> f64 {
    (f64::from(age) / f64::from(max_age)).clamp(0.0, 1.0)
}

impl SimulationWorld {
    /// Roll this year's death for `id`. Returns whether they died.
    ///
    /// The already dead do not roll again, but a marriage they entered after
    /// dying is ended here, on both sides.
    pub fn try_to_die(&mut self, id: PersonId, when: Date) -> Result<bool> {
        if self.read::<Health>(id)?.is_dead() {
            if self.end_marriage(id)?.is_some() {
                debug!(person = %id, "Marriage to the dead ended");
            }
            return Ok(false);
        }
        let p = death_probability(self.age(id, when)?, self.config.rules.max_age);
        if !self.chance(id, p)? {
            return Ok(false);
        }
        self.die(id)?;
        Ok(true)
    }

    /// Mark dead and end the marriage on both sides. No other edge changes.
    fn die(&mut self, id: PersonId) -> Result<()> {
        let entity = self.entity(id)?;
        self.world.get::<&mut Health>(entity)?.die();
        let widowed = self.end_marriage(id)?;
        debug!(person = %id, widowed = ?widowed, "Died");
        Ok(())
    }

    /// Deactivate the spousal edges of `id` and its active spouse, if any.
    /// Returns the former spouse.
    fn end_marriage(&mut self, id: PersonId) -> Result<Option<PersonId>> {
        let Some(spouse) = self.spouse(id)? else {
            return Ok(None);
        };
        let (entity, spouse_entity) = (self.entity(id)?, self.entity(spouse)?);
        self.world.get::<&mut Relationships>(spouse_entity)?.end_marriages();
        self.world.get::<&mut Relationships>(entity)?.end_marriages();
        Ok(Some(spouse))
    }
}
