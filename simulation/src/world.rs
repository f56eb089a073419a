//! Simulation World - main orchestrator
//!
//! People are hecs entities spawned with their full component set and never
//! despawned; death is a status change. The roster keeps creation order,
//! which is also the iteration order of every tick phase.

use std::collections::{HashMap, HashSet};

use hecs::{Component, Entity, EntityBuilder, World};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Bernoulli, Distribution};
use serde::Serialize;
use tracing::info;

use crate::components::*;
use crate::config::{RngMode, SimConfig};
use crate::error::{Result, SimError};
use crate::names::{self, NameSource};
use crate::relationships::{Bond, Relationship, Relationships};

/// Chance that a newly created person is barren for life.
pub const INFERTILITY_RATE: f64 = 0.06;

/// Explicit attributes for a person created outside of procreation.
#[derive(Debug, Clone, PartialEq)]
pub struct PersonSpec {
    pub name: String,
    pub race: Race,
    pub sex: Sex,
    /// Defaults to 1 January of the current calendar year.
    pub birth_date: Option<Date>,
    /// Defaults to the gender matching `sex`.
    pub gender: Option<Gender>,
}

impl PersonSpec {
    pub fn new(name: impl Into<String>, race: Race, sex: Sex) -> Self {
        Self {
            name: name.into(),
            race,
            sex,
            birth_date: None,
            gender: None,
        }
    }

    pub fn born(mut self, date: Date) -> Self {
        self.birth_date = Some(date);
        self
    }

    pub fn gender(mut self, gender: Gender) -> Self {
        self.gender = Some(gender);
        self
    }
}

/// Owned view of one person, for inspection and comparison.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PersonRecord {
    pub id: PersonId,
    pub name: String,
    pub race: Race,
    pub sex: Sex,
    pub gender: Gender,
    pub birth_date: Date,
    pub health: Health,
    pub relationships: Vec<Relationship>,
}

/// What happened during one yearly tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TickReport {
    pub year: i32,
    pub marriages: u32,
    pub births: u32,
    pub deaths: u32,
    pub population: usize,
    pub living: usize,
}

/// Fully resolved attributes of a person about to be spawned.
pub(crate) struct Newcomer {
    name: String,
    race: Race,
    sex: Sex,
    gender: Gender,
    birth_date: Date,
    fertility: Fertility,
}

pub struct SimulationWorld {
    pub(crate) world: World,
    pub(crate) calendar: Calendar,
    pub(crate) config: SimConfig,
    pub(crate) rng: StdRng,
    next_person_id: u64,
    index: HashMap<PersonId, Entity>,
    roster: Vec<PersonId>,
    names: Box<dyn NameSource>,
}

impl SimulationWorld {
    pub fn new(config: SimConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            world: World::new(),
            calendar: Calendar::new(config.start_year),
            rng: StdRng::seed_from_u64(config.seed),
            config,
            next_person_id: 1,
            index: HashMap::new(),
            roster: Vec::new(),
            names: Box::new(names::default_names()),
        })
    }

    /// Replace the built-in syllable table.
    pub fn with_name_source(mut self, names: impl NameSource + 'static) -> Self {
        self.names = Box::new(names);
        self
    }

    // ------------------------------------------------------------------
    // Creation
    // ------------------------------------------------------------------

    /// Seed initial population with random people.
    pub fn seed_population(&mut self, count: usize) -> Result<Vec<PersonId>> {
        info!("Seeding {} initial population...", count);
        let ids = (0..count)
            .map(|_| self.spawn_random())
            .collect::<Result<Vec<_>>>()?;
        info!("Population seeded. Entity count: {}", self.roster.len());
        Ok(ids)
    }

    /// Create a person with random race, sex, gender, birth date and name.
    pub fn spawn_random(&mut self) -> Result<PersonId> {
        let birth_date = Date::random(&mut self.rng, self.config.seed_birth_years.clone())?;
        let newcomer = self.random_newcomer(birth_date)?;
        Ok(self.insert(newcomer))
    }

    /// Create a person from explicit attributes.
    pub fn spawn_person(&mut self, spec: PersonSpec) -> Result<PersonId> {
        let birth_date = match spec.birth_date {
            Some(date) => date,
            None => Date::from_year(self.calendar.year)?,
        };
        let fertility = self.roll_fertility();
        Ok(self.insert(Newcomer {
            name: spec.name,
            race: spec.race,
            sex: spec.sex,
            gender: spec.gender.unwrap_or_else(|| Gender::from(spec.sex)),
            birth_date,
            fertility,
        }))
    }

    pub(crate) fn random_newcomer(&mut self, birth_date: Date) -> Result<Newcomer> {
        let syllables = self.rng.gen_range(self.config.name_syllables.clone());
        let name = self.names.compose(syllables, &mut self.rng)?;
        Ok(Newcomer {
            name,
            race: Race::random(&mut self.rng),
            sex: Sex::random(&mut self.rng),
            gender: Gender::random(&mut self.rng),
            birth_date,
            fertility: self.roll_fertility(),
        })
    }

    fn roll_fertility(&mut self) -> Fertility {
        if self.rng.gen_bool(self.config.rules.infertility_rate) {
            Fertility::Barren
        } else {
            Fertility::Fertile
        }
    }

    /// Spawn with every component at once and enroll in the roster.
    pub(crate) fn insert(&mut self, newcomer: Newcomer) -> PersonId {
        let id = PersonId(self.next_person_id);
        self.next_person_id += 1;

        let mut builder = EntityBuilder::new();
        builder
            .add(Person {
                id,
                name: newcomer.name,
            })
            .add(newcomer.race)
            .add(newcomer.sex)
            .add(newcomer.gender)
            .add(BirthDate(newcomer.birth_date))
            .add(Health::new(newcomer.fertility))
            .add(Relationships::default());
        if self.config.rng_mode == RngMode::PerEntity {
            builder.add(EntityRng(StdRng::seed_from_u64(self.rng.gen())));
        }
        let entity = self.world.spawn(builder.build());

        self.index.insert(id, entity);
        self.roster.push(id);
        id
    }

    /// Undo an [`insert`](Self::insert) whose follow-up failed.
    pub(crate) fn discard(&mut self, id: PersonId) -> Result<()> {
        let entity = self.index.remove(&id).ok_or(SimError::UnknownPerson(id))?;
        self.roster.retain(|&p| p != id);
        self.world.despawn(entity)?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Graph mutation
    // ------------------------------------------------------------------

    /// Write the mirrored edge pairs of `bonds`, each read from its first id.
    /// Every endpoint is resolved before the first edge is written, so either
    /// all pairs land or none do.
    pub(crate) fn commit_bonds(&mut self, bonds: &[(PersonId, PersonId, Bond)]) -> Result<()> {
        let mut edges = Vec::with_capacity(bonds.len() * 2);
        for &(from, to, bond) in bonds {
            if from == to {
                return Err(SimError::SelfRelationship(from));
            }
            let (from_entity, to_entity) = (self.entity(from)?, self.entity(to)?);
            let from_gender = *self.world.get::<&Gender>(from_entity)?;
            let to_gender = *self.world.get::<&Gender>(to_entity)?;
            let (forward, backward) = bond.labels(from_gender, to_gender);
            edges.push((from_entity, to, forward));
            edges.push((to_entity, from, backward));
        }
        // Endpoints resolved above were spawned with every component.
        for (owner, target, kind) in edges {
            self.world.get::<&mut Relationships>(owner)?.push(target, kind);
        }
        Ok(())
    }

    pub(crate) fn link(&mut self, from: PersonId, to: PersonId, bond: Bond) -> Result<()> {
        self.commit_bonds(&[(from, to, bond)])
    }

    // ------------------------------------------------------------------
    // Randomness
    // ------------------------------------------------------------------

    /// Run `f` against `id`'s own stream, or the world stream if it has none.
    pub(crate) fn draw<T>(&mut self, id: PersonId, f: impl FnOnce(&mut StdRng) -> T) -> Result<T> {
        let entity = self.entity(id)?;
        Ok(match self.world.get::<&mut EntityRng>(entity) {
            Ok(mut own) => f(&mut own.0),
            Err(_) => f(&mut self.rng),
        })
    }

    /// Bernoulli trial for `id`; `p` is clamped to [0, 1].
    pub(crate) fn chance(&mut self, id: PersonId, p: f64) -> Result<bool> {
        let Ok(trial) = Bernoulli::new(p.clamp(0.0, 1.0)) else {
            return Ok(false);
        };
        self.draw(id, |rng| trial.sample(rng))
    }

    // ------------------------------------------------------------------
    // Lookup
    // ------------------------------------------------------------------

    pub(crate) fn entity(&self, id: PersonId) -> Result<Entity> {
        self.index
            .get(&id)
            .copied()
            .ok_or(SimError::UnknownPerson(id))
    }

    pub(crate) fn read<T: Component + Clone>(&self, id: PersonId) -> Result<T> {
        let entity = self.entity(id)?;
        let component = self.world.get::<&T>(entity)?;
        Ok(T::clone(&component))
    }

    pub(crate) fn with_relationships<T>(
        &self,
        id: PersonId,
        f: impl FnOnce(&Relationships) -> T,
    ) -> Result<T> {
        let entity = self.entity(id)?;
        let relationships = self.world.get::<&Relationships>(entity)?;
        Ok(f(&relationships))
    }

    /// Everyone ever created, in creation order.
    pub fn population(&self) -> &[PersonId] {
        &self.roster
    }

    pub fn len(&self) -> usize {
        self.roster.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roster.is_empty()
    }

    pub fn living_count(&self) -> usize {
        self.world
            .query::<&Health>()
            .iter()
            .filter(|(_, health)| health.is_alive())
            .count()
    }

    pub fn calendar(&self) -> &Calendar {
        &self.calendar
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn name(&self, id: PersonId) -> Result<String> {
        Ok(self.read::<Person>(id)?.name)
    }

    pub fn race(&self, id: PersonId) -> Result<Race> {
        self.read(id)
    }

    pub fn sex(&self, id: PersonId) -> Result<Sex> {
        self.read(id)
    }

    pub fn gender(&self, id: PersonId) -> Result<Gender> {
        self.read(id)
    }

    pub fn birth_date(&self, id: PersonId) -> Result<Date> {
        Ok(self.read::<BirthDate>(id)?.0)
    }

    pub fn health(&self, id: PersonId) -> Result<Health> {
        self.read(id)
    }

    pub fn relationships(&self, id: PersonId) -> Result<Relationships> {
        self.read(id)
    }

    pub fn spouse(&self, id: PersonId) -> Result<Option<PersonId>> {
        self.with_relationships(id, Relationships::spouse)
    }

    pub fn children(&self, id: PersonId) -> Result<Vec<PersonId>> {
        self.with_relationships(id, |r| r.children().collect())
    }

    pub fn parents(&self, id: PersonId) -> Result<Vec<PersonId>> {
        self.with_relationships(id, |r| r.parents().collect())
    }

    pub fn siblings(&self, id: PersonId) -> Result<Vec<PersonId>> {
        self.with_relationships(id, |r| r.siblings().collect())
    }

    pub fn record(&self, id: PersonId) -> Result<PersonRecord> {
        let person = self.read::<Person>(id)?;
        Ok(PersonRecord {
            id: person.id,
            name: person.name,
            race: self.race(id)?,
            sex: self.sex(id)?,
            gender: self.gender(id)?,
            birth_date: self.birth_date(id)?,
            health: self.health(id)?,
            relationships: self.with_relationships(id, |r| r.iter().cloned().collect())?,
        })
    }

    pub fn records(&self) -> Result<Vec<PersonRecord>> {
        self.roster.iter().map(|&id| self.record(id)).collect()
    }

    // ------------------------------------------------------------------
    // Driver
    // ------------------------------------------------------------------

    /// Run one simulation tick (one year): marriage, procreation, death.
    ///
    /// All three phases walk the roster as it stood when the tick began, so
    /// children born this year are not visited until next year. Newborns are
    /// enrolled as they are born, after everyone already listed; they are in
    /// the graph from that moment, so a tick that fails part-way still lists
    /// every child it produced.
    pub fn tick(&mut self) -> Result<TickReport> {
        let when = Date::from_year(self.calendar.year)?;
        let snapshot = self.roster.clone();

        let mut marriages = 0;
        for &id in &snapshot {
            if self.try_to_wed(id, &snapshot, when)?.is_some() {
                marriages += 1;
            }
        }

        // A couple gets one chance per year, whichever partner comes first.
        let mut seen = HashSet::new();
        let mut births = 0;
        for &id in &snapshot {
            if seen.contains(&id) || !self.can_procreate(id, when)? {
                continue;
            }
            seen.insert(id);
            if let Some(spouse) = self.spouse(id)? {
                seen.insert(spouse);
            }
            for child in self.try_to_procreate(id, when)? {
                child?;
                births += 1;
            }
        }

        let mut deaths = 0;
        for &id in &snapshot {
            if self.try_to_die(id, when)? {
                deaths += 1;
            }
        }

        let report = TickReport {
            year: when.year(),
            marriages,
            births,
            deaths,
            population: self.roster.len(),
            living: self.living_count(),
        };
        info!(
            year = report.year,
            marriages, births, deaths,
            living = report.living,
            "Year complete"
        );

        self.calendar.advance();
        Ok(report)
    }

    /// Run `years` ticks back to back.
    pub fn run(&mut self, years: u32) -> Result<Vec<TickReport>> {
        (0..years).map(|_| self.tick()).collect()
    }
}
