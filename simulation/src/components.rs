//! ECS Components and value types for simulated people
//!
//! Everything here is plain data. Lifecycle rules live in `systems`.

use std::fmt;
use std::ops::Range;

use chrono::{Datelike, NaiveDate};
use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};

// ============================================================================
// Identity Components
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PersonId(pub u64);

impl fmt::Display for PersonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub id: PersonId,
    pub name: String,
}

// ============================================================================
// Person Components
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sex {
    Male,
    Female,
}

impl Sex {
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        if rng.gen::<bool>() {
            Sex::Female
        } else {
            Sex::Male
        }
    }
}

/// Social gender. Relationship labels (Husband/Wife, Son/Daughter, ...) are
/// chosen from this, never from [`Sex`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        if rng.gen::<bool>() {
            Gender::Female
        } else {
            Gender::Male
        }
    }
}

impl From<Sex> for Gender {
    fn from(sex: Sex) -> Self {
        match sex {
            Sex::Male => Gender::Male,
            Sex::Female => Gender::Female,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Race {
    Dwarf,
    Elf,
    Human,
    Gnome,
    Halfling,
}

impl Race {
    pub const ALL: [Race; 5] = [Race::Dwarf, Race::Elf, Race::Human, Race::Gnome, Race::Halfling];

    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BirthDate(pub Date);

// ============================================================================
// Health
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Vitality {
    Alive,
    Dead,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Fertility {
    Fertile,
    Barren,
}

/// One member of the health status set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HealthFlag {
    Alive,
    Dead,
    Fertile,
    Barren,
}

/// Health status set. Holds exactly one of Alive/Dead and exactly one of
/// Fertile/Barren; fertility is fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Health {
    vitality: Vitality,
    fertility: Fertility,
}

impl Health {
    pub fn new(fertility: Fertility) -> Self {
        Self {
            vitality: Vitality::Alive,
            fertility,
        }
    }

    pub fn vitality(&self) -> Vitality {
        self.vitality
    }

    pub fn fertility(&self) -> Fertility {
        self.fertility
    }

    pub fn is_alive(&self) -> bool {
        self.vitality == Vitality::Alive
    }

    pub fn is_dead(&self) -> bool {
        self.vitality == Vitality::Dead
    }

    pub fn is_barren(&self) -> bool {
        self.fertility == Fertility::Barren
    }

    pub fn flags(&self) -> [HealthFlag; 2] {
        let vitality = match self.vitality {
            Vitality::Alive => HealthFlag::Alive,
            Vitality::Dead => HealthFlag::Dead,
        };
        let fertility = match self.fertility {
            Fertility::Fertile => HealthFlag::Fertile,
            Fertility::Barren => HealthFlag::Barren,
        };
        [vitality, fertility]
    }

    pub fn contains(&self, flag: HealthFlag) -> bool {
        self.flags().contains(&flag)
    }

    /// Returns `false` if already dead.
    pub(crate) fn die(&mut self) -> bool {
        let was_alive = self.is_alive();
        self.vitality = Vitality::Dead;
        was_alive
    }
}

// ============================================================================
// Randomness
// ============================================================================

/// Private random stream for one entity, present only in
/// [`RngMode::PerEntity`](crate::config::RngMode::PerEntity) worlds.
#[derive(Debug, Clone)]
pub struct EntityRng(pub(crate) StdRng);

// ============================================================================
// Calendar
// ============================================================================

/// Calendar date. Ages and eligibility only ever compare years.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Date(NaiveDate);

impl Date {
    pub fn new(year: i32, month: u32, day: u32) -> Result<Self> {
        NaiveDate::from_ymd_opt(year, month, day)
            .map(Self)
            .ok_or(SimError::InvalidDate { year, month, day })
    }

    /// 1 January of `year`.
    pub fn from_year(year: i32) -> Result<Self> {
        Self::new(year, 1, 1)
    }

    /// Uniformly random day within `year`.
    pub fn random_in_year<R: Rng + ?Sized>(rng: &mut R, year: i32) -> Result<Self> {
        let ordinal = rng.gen_range(1..=days_in_year(year));
        NaiveDate::from_yo_opt(year, ordinal)
            .map(Self)
            .ok_or(SimError::InvalidDate { year, month: 1, day: 1 })
    }

    /// Random day in a year drawn from `years`; an empty range pins the year
    /// to `years.start`.
    pub fn random<R: Rng + ?Sized>(rng: &mut R, years: Range<i32>) -> Result<Self> {
        let year = if years.start >= years.end {
            years.start
        } else {
            rng.gen_range(years)
        };
        Self::random_in_year(rng, year)
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    pub fn day(&self) -> u32 {
        self.0.day()
    }

    /// Whole years from `self` to `when`, counting calendar years only.
    pub fn years_until(&self, when: Date) -> i32 {
        when.year() - self.year()
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn days_in_year(year: i32) -> u32 {
    if NaiveDate::from_yo_opt(year, 366).is_some() {
        366
    } else {
        365
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Calendar {
    pub tick: u64,
    pub year: i32,
}

impl Calendar {
    pub fn new(year: i32) -> Self {
        Self { tick: 0, year }
    }

    pub fn advance(&mut self) {
        self.tick += 1;
        self.year += 1;
    }
}
