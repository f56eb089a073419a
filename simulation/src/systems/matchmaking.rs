//! Matchmaking System
//!
//! An eligible single walks the candidate pool in order and proposes to the
//! first compatible person. Both sides roll to accept; the first pair that
//! both accept marry and the search stops. A refused proposal moves on to the
//! next candidate.

use tracing::debug;

use crate::components::{Date, Gender, PersonId};
use crate::error::Result;
use crate::relationships::{Bond, RelationshipKind};
use crate::world::SimulationWorld;

/// Minimum age for marriage
pub const MINIMUM_MARRYING_AGE: i32 = 20;

/// Maximum age for marriage
pub const MAXIMUM_MARRYING_AGE: i32 = 60;

/// Chance that each party accepts a proposal
pub const MARRIAGE_RATE: f64 = 0.5;

/// Acceptance multiplier between mutual friends
pub const FRIENDSHIP_BONUS: f64 = 1.5;

impl SimulationWorld {
    /// Single and within the marrying ages.
    pub fn can_marry(&self, id: PersonId, when: Date) -> Result<bool> {
        if self.spouse(id)?.is_some() {
            return Ok(false);
        }
        Ok(self.config.rules.marrying_ages.contains(&self.age(id, when)?))
    }

    /// A blood-kin edge exists between `a` and `b`, held by either side.
    pub fn are_related(&self, a: PersonId, b: PersonId) -> Result<bool> {
        Ok(self.with_relationships(a, |r| r.is_blood_relative_of(b))?
            || self.with_relationships(b, |r| r.is_blood_relative_of(a))?)
    }

    /// `a` holds an active Friend edge toward `b`.
    pub fn is_friend_of(&self, a: PersonId, b: PersonId) -> Result<bool> {
        self.with_relationships(a, |r| r.has_active(RelationshipKind::Friend, b))
    }

    /// `a` holds an active Enemy edge toward `b`.
    pub fn is_enemy_of(&self, a: PersonId, b: PersonId) -> Result<bool> {
        self.with_relationships(a, |r| r.has_active(RelationshipKind::Enemy, b))
    }

    pub fn befriend(&mut self, a: PersonId, b: PersonId) -> Result<()> {
        if self.is_friend_of(a, b)? && self.is_friend_of(b, a)? {
            return Ok(());
        }
        self.link(a, b, Bond::Friend)
    }

    pub fn declare_enemies(&mut self, a: PersonId, b: PersonId) -> Result<()> {
        if self.is_enemy_of(a, b)? && self.is_enemy_of(b, a)? {
            return Ok(());
        }
        self.link(a, b, Bond::Enemy)
    }

    fn is_compatible(
        &self,
        actor: PersonId,
        actor_gender: Gender,
        candidate: PersonId,
        when: Date,
    ) -> Result<bool> {
        Ok(candidate != actor
            && self.can_marry(candidate, when)?
            && self.gender(candidate)? != actor_gender
            && !self.is_enemy_of(actor, candidate)?
            && !self.is_enemy_of(candidate, actor)?
            && !self.are_related(actor, candidate)?)
    }

    /// Try to marry `actor` to someone from `pool`. Returns the new spouse.
    pub fn try_to_wed(
        &mut self,
        actor: PersonId,
        pool: &[PersonId],
        when: Date,
    ) -> Result<Option<PersonId>> {
        if !self.can_marry(actor, when)? {
            return Ok(None);
        }
        let actor_gender = self.gender(actor)?;

        for &candidate in pool {
            if !self.is_compatible(actor, actor_gender, candidate, when)? {
                continue;
            }

            let mut rate = self.config.rules.marriage_rate;
            if self.is_friend_of(actor, candidate)? && self.is_friend_of(candidate, actor)? {
                rate *= self.config.rules.friendship_bonus;
            }
            let actor_accepts = self.chance(actor, rate)?;
            let candidate_accepts = self.chance(candidate, rate)?;
            if actor_accepts && candidate_accepts {
                self.link(actor, candidate, Bond::Spouse)?;
                debug!(person = %actor, spouse = %candidate, year = when.year(), "Married");
                return Ok(Some(candidate));
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{Race, Sex};
    use crate::config::SimConfig;
    use crate::world::PersonSpec;

    fn world(marriage_rate: f64) -> SimulationWorld {
        let mut config = SimConfig::default();
        config.rules.marriage_rate = marriage_rate;
        SimulationWorld::new(config).unwrap()
    }

    fn adult(w: &mut SimulationWorld, name: &str, sex: Sex) -> PersonId {
        w.spawn_person(PersonSpec::new(name, Race::Halfling, sex).born(Date::from_year(0).unwrap()))
            .unwrap()
    }

    fn year(y: i32) -> Date {
        Date::from_year(y).unwrap()
    }

    #[test]
    fn test_marrying_age_bounds() {
        let mut w = world(1.0);
        let id = adult(&mut w, "Pip", Sex::Male);
        assert!(!w.can_marry(id, year(19)).unwrap());
        assert!(w.can_marry(id, year(20)).unwrap());
        assert!(w.can_marry(id, year(60)).unwrap());
        assert!(!w.can_marry(id, year(61)).unwrap());
    }

    #[test]
    fn test_first_accepting_candidate_wins() {
        let mut w = world(1.0);
        let actor = adult(&mut w, "Pip", Sex::Male);
        let first = adult(&mut w, "Rosie", Sex::Female);
        let second = adult(&mut w, "Lily", Sex::Female);
        let pool = [actor, first, second];

        assert_eq!(w.try_to_wed(actor, &pool, year(25)).unwrap(), Some(first));
        assert_eq!(w.spouse(actor).unwrap(), Some(first));
        assert_eq!(w.spouse(first).unwrap(), Some(actor));
        assert_eq!(w.spouse(second).unwrap(), None);

        let edges = w.relationships(actor).unwrap();
        let edge = edges.iter().next().unwrap();
        assert_eq!(edge.kind(), RelationshipKind::Husband);
        let edges = w.relationships(first).unwrap();
        assert_eq!(edges.iter().next().unwrap().kind(), RelationshipKind::Wife);

        // Married people are no longer eligible.
        assert_eq!(w.try_to_wed(actor, &pool, year(26)).unwrap(), None);
        assert_eq!(w.try_to_wed(second, &pool, year(26)).unwrap(), None);
    }

    #[test]
    fn test_same_gender_and_enemies_are_skipped() {
        let mut w = world(1.0);
        let actor = adult(&mut w, "Pip", Sex::Male);
        let same = adult(&mut w, "Sam", Sex::Male);
        let enemy = adult(&mut w, "Lobelia", Sex::Female);
        let match_ = adult(&mut w, "Rosie", Sex::Female);
        w.declare_enemies(actor, enemy).unwrap();

        let pool = [same, enemy, match_];
        assert_eq!(w.try_to_wed(actor, &pool, year(30)).unwrap(), Some(match_));
    }

    #[test]
    fn test_blood_relatives_never_marry() {
        let mut w = world(1.0);
        let father = adult(&mut w, "Drogo", Sex::Male);
        let daughter = adult(&mut w, "Daisy", Sex::Female);
        let cousin = adult(&mut w, "Camellia", Sex::Female);
        w.link(father, daughter, Bond::Parent).unwrap();
        w.link(father, cousin, Bond::Cousin).unwrap();

        assert!(w.are_related(father, daughter).unwrap());
        assert!(w.are_related(daughter, father).unwrap());
        let pool = [daughter, cousin];
        assert_eq!(w.try_to_wed(father, &pool, year(30)).unwrap(), None);
    }

    #[test]
    fn test_unrelated_kin_of_others_may_marry() {
        let mut w = world(1.0);
        let actor = adult(&mut w, "Pip", Sex::Male);
        let his_sister = adult(&mut w, "Pearl", Sex::Female);
        let stranger = adult(&mut w, "Rosie", Sex::Female);
        w.link(his_sister, actor, Bond::Sibling).unwrap();

        assert!(!w.are_related(actor, stranger).unwrap());
        let pool = [his_sister, stranger];
        assert_eq!(w.try_to_wed(actor, &pool, year(30)).unwrap(), Some(stranger));
    }

    #[test]
    fn test_zero_rate_never_marries() {
        let mut w = world(0.0);
        let actor = adult(&mut w, "Pip", Sex::Male);
        let other = adult(&mut w, "Rosie", Sex::Female);
        for _ in 0..50 {
            assert_eq!(w.try_to_wed(actor, &[other], year(30)).unwrap(), None);
        }
    }

    #[test]
    fn test_friendship_bonus_can_make_acceptance_certain() {
        let mut config = SimConfig::default();
        config.rules.marriage_rate = 0.5;
        config.rules.friendship_bonus = 2.0;
        let mut w = SimulationWorld::new(config).unwrap();
        let actor = adult(&mut w, "Pip", Sex::Male);
        let friend = adult(&mut w, "Rosie", Sex::Female);
        w.befriend(actor, friend).unwrap();
        assert!(w.is_friend_of(friend, actor).unwrap());

        assert_eq!(w.try_to_wed(actor, &[friend], year(30)).unwrap(), Some(friend));
    }

    #[test]
    fn test_befriend_is_idempotent() {
        let mut w = world(1.0);
        let a = adult(&mut w, "Pip", Sex::Male);
        let b = adult(&mut w, "Merry", Sex::Male);
        w.befriend(a, b).unwrap();
        w.befriend(b, a).unwrap();
        assert_eq!(w.relationships(a).unwrap().len(), 1);
        assert_eq!(w.relationships(b).unwrap().len(), 1);
        assert!(w.befriend(a, a).is_err());
    }
}
