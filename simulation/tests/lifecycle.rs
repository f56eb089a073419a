use std::collections::HashMap;

use simulation::{
    Date, HealthFlag, PersonId, PersonRecord, PersonSpec, Race, RelationshipKind, RngMode, Sex,
    SimConfig, SimulationWorld,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

/// Rules under which nobody dies of age and nobody is barren or stillborn.
fn sheltered(seed: u64) -> SimConfig {
    let mut config = SimConfig {
        seed,
        ..SimConfig::default()
    };
    config.rules.max_age = i32::MAX;
    config.rules.infertility_rate = 0.0;
    config.rules.infant_mortality = 0.0;
    config
}

/// Longer lives than the defaults so the graph gets a few generations deep.
fn busy(seed: u64, rng_mode: RngMode) -> SimConfig {
    let mut config = SimConfig {
        seed,
        rng_mode,
        ..SimConfig::default()
    };
    config.rules.max_age = 200;
    config
}

fn founder(world: &mut SimulationWorld, name: &str, sex: Sex) -> PersonId {
    world
        .spawn_person(PersonSpec::new(name, Race::Human, sex).born(Date::from_year(0).unwrap()))
        .unwrap()
}

fn assert_graph_consistent(world: &SimulationWorld) {
    let records: HashMap<PersonId, PersonRecord> = world
        .records()
        .unwrap()
        .into_iter()
        .map(|r| (r.id, r))
        .collect();

    for record in records.values() {
        let health = record.health;
        assert!(health.contains(HealthFlag::Alive) ^ health.contains(HealthFlag::Dead));
        assert!(health.contains(HealthFlag::Fertile) ^ health.contains(HealthFlag::Barren));

        let active_spouses = record
            .relationships
            .iter()
            .filter(|r| r.kind().is_spousal() && r.is_active())
            .count();
        assert!(active_spouses <= 1, "{} has {active_spouses} spouses", record.id);
        if health.is_dead() {
            assert_eq!(active_spouses, 0, "{} is dead but still married", record.id);
        }

        for edge in &record.relationships {
            assert_ne!(edge.target(), record.id);
            let target = &records[&edge.target()];
            if let Some(gender) = edge.kind().gender() {
                assert_eq!(gender, record.gender, "{:?} held by {}", edge.kind(), record.id);
            }

            let reciprocal = edge.kind().reciprocal(target.gender);
            let count = |from: &PersonRecord, to: PersonId, kind: RelationshipKind, active_only: bool| {
                from.relationships
                    .iter()
                    .filter(|r| r.target() == to && r.kind() == kind)
                    .filter(|r| !active_only || r.is_active())
                    .count()
            };
            assert_eq!(
                count(record, target.id, edge.kind(), false),
                count(target, record.id, reciprocal, false),
                "{} -{:?}-> {} is not mirrored",
                record.id,
                edge.kind(),
                target.id
            );
            assert_eq!(
                count(record, target.id, edge.kind(), true),
                count(target, record.id, reciprocal, true)
            );

            if edge.kind().is_spousal() {
                let related = |a: &PersonRecord, b: PersonId| {
                    a.relationships
                        .iter()
                        .any(|r| r.target() == b && r.kind().is_blood())
                };
                assert!(!related(record, target.id) && !related(target, record.id));
            }
        }
    }
}

#[test]
fn graph_stays_consistent_over_generations() {
    init_tracing();
    for rng_mode in [RngMode::PerEntity, RngMode::Shared] {
        let mut world = SimulationWorld::new(busy(7, rng_mode)).unwrap();
        world.seed_population(120).unwrap();
        let reports = world.run(80).unwrap();

        assert_eq!(reports.len(), 80);
        assert_eq!(reports.last().unwrap().population, world.len());
        assert_graph_consistent(&world);
    }
}

#[test]
fn default_rules_keep_graph_consistent() {
    init_tracing();
    let mut world = SimulationWorld::new(SimConfig::default()).unwrap();
    world.seed_population(100).unwrap();
    world.run(180).unwrap();
    assert_graph_consistent(&world);
}

#[test]
fn same_seed_same_history() {
    for rng_mode in [RngMode::PerEntity, RngMode::Shared] {
        let history = || {
            let mut world = SimulationWorld::new(busy(2024, rng_mode)).unwrap();
            world.seed_population(80).unwrap();
            let reports = world.run(60).unwrap();
            (reports, world.records().unwrap())
        };
        assert_eq!(history(), history());
    }
}

#[test]
fn couple_marries_and_has_children() {
    init_tracing();
    let mut config = sheltered(11);
    config.rules.marriage_rate = 1.0;
    let mut world = SimulationWorld::new(config).unwrap();
    let wife = founder(&mut world, "Arwen", Sex::Female);
    let husband = founder(&mut world, "Aragorn", Sex::Male);

    let mut children = Vec::new();
    for _ in 0..=20 {
        world.tick().unwrap();
        children = world.children(wife).unwrap();
        if !children.is_empty() {
            break;
        }
    }

    assert_eq!(world.spouse(wife).unwrap(), Some(husband));
    assert_eq!(world.spouse(husband).unwrap(), Some(wife));
    assert!(!children.is_empty(), "no child after 21 years of marriage");
    assert_eq!(world.children(husband).unwrap(), children);
    for child in children {
        let record = world.record(child).unwrap();
        let parents: Vec<_> = record
            .relationships
            .iter()
            .filter(|r| r.target() == wife || r.target() == husband)
            .map(|r| (r.target(), r.kind()))
            .collect();
        assert_eq!(parents.len(), 2);
        for (parent, kind) in parents {
            let parent_gender = world.gender(parent).unwrap();
            assert_eq!(kind.gender(), Some(record.gender));
            let back = world
                .relationships(parent)
                .unwrap()
                .iter()
                .find(|r| r.target() == child)
                .map(|r| r.kind())
                .unwrap();
            assert_eq!(back, kind.reciprocal(parent_gender));
        }
    }
    assert_graph_consistent(&world);
}

#[test]
fn a_couple_procreates_once_per_year() {
    let mut config = sheltered(5);
    config.rules.marriage_rate = 1.0;
    config.rules.procreation_success_rate = 1.0;
    config.rules.triplets_below = 0.0;
    config.rules.twins_below = 0.0;
    let mut world = SimulationWorld::new(config).unwrap();
    let wife = founder(&mut world, "Rosie", Sex::Female);
    founder(&mut world, "Sam", Sex::Male);

    let first = world.tick().unwrap();
    assert_eq!((first.marriages, first.births), (1, 1));
    let second = world.tick().unwrap();
    assert_eq!((second.marriages, second.births), (0, 1));
    assert_eq!(world.children(wife).unwrap().len(), 2);
    assert_eq!(world.len(), 4);
}

#[test]
fn newborns_join_the_roster_after_their_elders() {
    let mut config = sheltered(3);
    config.rules.marriage_rate = 1.0;
    config.rules.procreation_success_rate = 1.0;
    let mut world = SimulationWorld::new(config).unwrap();
    let wife = founder(&mut world, "Rosie", Sex::Female);
    let husband = founder(&mut world, "Sam", Sex::Male);

    let report = world.tick().unwrap();
    assert!(report.births >= 1);
    assert_eq!(&world.population()[..2], &[wife, husband]);
    assert_eq!(world.population().len(), 2 + report.births as usize);
    assert_eq!(world.children(wife).unwrap(), world.population()[2..].to_vec());
}

/// Marriage open from birth, and a hazard that is zero for anyone born in
/// the tick year, so only the people killed by hand are dead.
fn mourning(seed: u64) -> SimConfig {
    let mut config = sheltered(seed);
    config.start_year = 30;
    config.rules.max_age = 1000;
    config.rules.marrying_ages = 0..=60;
    config.rules.marriage_rate = 1.0;
    config
}

fn newborn(world: &mut SimulationWorld, name: &str, sex: Sex) -> PersonId {
    world
        .spawn_person(PersonSpec::new(name, Race::Elf, sex).born(Date::from_year(30).unwrap()))
        .unwrap()
}

#[test]
fn the_dead_do_not_stay_married() {
    init_tracing();
    let mut world = SimulationWorld::new(mourning(13)).unwrap();
    let ghost = founder(&mut world, "Isildur", Sex::Male);
    let living = newborn(&mut world, "Nimloth", Sex::Female);
    assert!(world.try_to_die(ghost, Date::from_year(1000).unwrap()).unwrap());

    // The dead are still eligible to wed, so the ghost proposes first.
    let report = world.tick().unwrap();
    assert_eq!(report.marriages, 1);
    assert_eq!(report.deaths, 0);

    assert_eq!(world.spouse(ghost).unwrap(), None);
    assert_eq!(world.spouse(living).unwrap(), None);
    let edges = world.relationships(living).unwrap();
    let wife = edges.iter().find(|r| r.target() == ghost).unwrap();
    assert_eq!(wife.kind(), RelationshipKind::Wife);
    assert!(!wife.is_active());
    assert_graph_consistent(&world);
}

#[test]
fn widows_may_remarry() {
    init_tracing();
    let mut world = SimulationWorld::new(mourning(17)).unwrap();
    let suitor = newborn(&mut world, "Beregond", Sex::Male);
    let widow = newborn(&mut world, "Ioreth", Sex::Female);
    let husband = founder(&mut world, "Hurin", Sex::Male);
    let when = Date::from_year(30).unwrap();
    assert_eq!(world.try_to_wed(widow, &[husband], when).unwrap(), Some(husband));
    assert!(world.try_to_die(husband, Date::from_year(1000).unwrap()).unwrap());
    assert_eq!(world.spouse(widow).unwrap(), None);

    let report = world.tick().unwrap();
    assert_eq!(report.marriages, 1);
    assert_eq!(world.spouse(widow).unwrap(), Some(suitor));
    assert_eq!(world.spouse(suitor).unwrap(), Some(widow));

    let edges = world.relationships(widow).unwrap();
    let to_husband = edges.iter().find(|r| r.target() == husband).unwrap();
    assert!(!to_husband.is_active());
    assert_eq!(edges.len(), 2);
    assert_graph_consistent(&world);
}

#[test]
fn reaching_maximum_age_is_fatal() {
    let config = SimConfig {
        start_year: 80,
        ..SimConfig::default()
    };
    let mut world = SimulationWorld::new(config).unwrap();
    let elder = founder(&mut world, "Bilbo", Sex::Male);
    let wife = founder(&mut world, "Lobelia", Sex::Female);
    world.tick().unwrap();

    assert!(world.health(elder).unwrap().is_dead());
    assert!(world.health(wife).unwrap().is_dead());
    assert_eq!(world.living_count(), 0);
    // The dead stay in the population.
    assert_eq!(world.len(), 2);
    assert!(world.record(elder).is_ok());
}

#[test]
fn tick_report_serializes() {
    let mut world = SimulationWorld::new(SimConfig::default()).unwrap();
    world.seed_population(10).unwrap();
    let report = world.tick().unwrap();
    let json = serde_json::to_value(report).unwrap();
    assert_eq!(json["year"], 20);
    assert_eq!(json["population"], 10 + u64::from(report.births));

    let record = world.record(world.population()[0]).unwrap();
    let json = serde_json::to_value(&record).unwrap();
    assert_eq!(json["id"], 1);
}
