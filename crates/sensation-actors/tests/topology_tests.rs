//! Building the actor topology from configuration documents.

use sensation_actors::prelude::*;
use sensation_protocol::Region;
use sensation_test_helpers::prelude::*;
use tracing_test::traced_test;

const LEFT: DriverAddress = DriverAddress::new(1, 0x40);
const RIGHT: DriverAddress = DriverAddress::new(1, 0x41);

const TWO_HANDS: &str = r#"
vibration:
  regions:
    - name: LEFT_HAND
      driver_address: "0x40"
      actors:
        - { index: 0, outlet: 0, position: thumb }
        - { index: 1, outlet: 1, position: palm }
    - name: RIGHT_HAND
      driver_address: "0x41"
      actors:
        - { index: 0, outlet: 0, position: thumb }
        - { index: 1, outlet: 1, position: palm }
"#;

fn load(yaml: &str) -> ActorConfig {
    must(ActorConfig::from_yaml_str(yaml))
}

#[test]
fn two_regions_on_two_drivers() -> TestResult {
    let bus = MockBus::with_devices([LEFT, RIGHT]);
    let topology = Topology::build(&load(TWO_HANDS), &bus, 1700.0);

    assert_eq!(topology.driver_count(), 2);
    assert_eq!(topology.actor_count(), 4);
    for region in [Region::LeftHand, Region::RightHand] {
        let actors = must_some(topology.region(region), "region missing");
        assert_eq!(actors.len(), 2);
    }

    let thumb = must_some(topology.actor(Region::LeftHand, 0), "thumb missing");
    assert_eq!(thumb.position, "thumb");
    assert_eq!(thumb.motor.driver().address(), LEFT);
    assert_eq!(thumb.motor.outlet(), 0);

    for driver in bus.opened() {
        assert_eq!(driver.frequencies(), vec![1700.0]);
    }
    Ok(())
}

#[test]
fn regions_share_a_driver_at_the_same_address() {
    let yaml = r#"
vibration:
  regions:
    - name: LEFT_FOREARM
      driver_address: "0x40"
      actors:
        - { index: 0, outlet: 0, position: wrist }
    - name: LEFT_UPPER_ARM
      driver_address: "0x40"
      actors:
        - { index: 0, outlet: 8, position: biceps }
"#;
    let bus = MockBus::with_devices([LEFT]);
    let topology = Topology::build(&load(yaml), &bus, 1700.0);

    assert_eq!(bus.opened().len(), 1);
    assert_eq!(topology.driver_count(), 1);

    let forearm = must_some(topology.actor(Region::LeftForearm, 0), "forearm");
    let upper = must_some(topology.actor(Region::LeftUpperArm, 0), "upper arm");
    assert_eq!(
        forearm.motor.driver().address(),
        upper.motor.driver().address()
    );

    let driver = must_some(bus.driver(LEFT), "driver not opened");
    assert_eq!(driver.frequencies().len(), 1);
}

#[test]
fn repeated_region_merges_actors() {
    let yaml = r#"
vibration:
  regions:
    - name: CHEST
      driver_address: "0x40"
      actors:
        - { index: 0, outlet: 0, position: left }
    - name: CHEST
      driver_address: "0x41"
      actors:
        - { index: 1, outlet: 0, position: right }
"#;
    let bus = MockBus::with_devices([LEFT, RIGHT]);
    let topology = Topology::build(&load(yaml), &bus, 1700.0);

    let chest = must_some(topology.region(Region::Chest), "chest missing");
    assert_eq!(chest.len(), 2);
    let right = must_some(chest.get(&1), "second actor missing");
    assert_eq!(right.motor.driver().address(), RIGHT);
}

#[traced_test]
#[test]
fn region_without_answering_driver_is_skipped() {
    let bus = MockBus::with_devices([LEFT]);
    let topology = Topology::build(&load(TWO_HANDS), &bus, 1700.0);

    assert_eq!(topology.driver_count(), 1);
    assert!(topology.region(Region::RightHand).is_none());
    assert_eq!(topology.actor_count(), 2);
    assert!(logs_contain("No driver available - ignoring region"));
}

#[traced_test]
#[test]
fn unknown_region_name_is_skipped() {
    let yaml = r#"
vibration:
  regions:
    - name: LEFT_TAIL
      driver_address: "0x40"
      actors:
        - { index: 0, outlet: 0, position: tip }
    - name: HEAD
      driver_address: "0x40"
      actors:
        - { index: 0, outlet: 1, position: forehead }
"#;
    let bus = MockBus::with_devices([LEFT]);
    let topology = Topology::build(&load(yaml), &bus, 1700.0);

    assert_eq!(topology.actor_count(), 1);
    assert!(topology.actor(Region::Head, 0).is_some());
    assert!(logs_contain("Region with unknown name configured - ignoring region"));
    assert!(logs_contain("LEFT_TAIL"));
}

#[test]
fn find_reports_unconfigured_actors() {
    let bus = MockBus::with_devices([LEFT, RIGHT]);
    let topology = Topology::build(&load(TWO_HANDS), &bus, 1700.0);

    let palm = must(topology.find(Region::RightHand, 1));
    assert_eq!(palm.position, "palm");

    for (region, index) in [(Region::RightHand, 2), (Region::Chest, 0)] {
        assert!(matches!(
            topology.find(region, index),
            Err(ActorError::UnknownActor { region: r, index: i }) if r == region && i == index
        ));
    }
}

#[traced_test]
#[test]
fn first_definition_of_an_index_wins() {
    let yaml = r#"
vibration:
  regions:
    - name: BACK
      driver_address: "0x40"
      actors:
        - { index: 3, outlet: 0, position: first }
        - { index: 3, outlet: 1, position: second }
"#;
    let bus = MockBus::with_devices([LEFT]);
    let topology = Topology::build(&load(yaml), &bus, 1700.0);

    let actor = must_some(topology.actor(Region::Back, 3), "actor missing");
    assert_eq!(actor.position, "first");
    assert_eq!(actor.motor.outlet(), 0);
    assert_eq!(topology.actor_count(), 1);
    assert!(logs_contain("ignoring subsequent definition"));
}

#[traced_test]
#[test]
fn outlet_beyond_the_chip_is_skipped() {
    let yaml = r#"
vibration:
  regions:
    - name: HIP
      driver_address: "0x40"
      actors:
        - { index: 0, outlet: 16, position: belt }
"#;
    let bus = MockBus::with_devices([LEFT]);
    let topology = Topology::build(&load(yaml), &bus, 1700.0);

    assert_eq!(topology.actor_count(), 0);
    assert!(logs_contain("Outlet out of range - ignoring actor"));
}

#[traced_test]
#[test]
fn negative_warmup_skips_the_actor() {
    let yaml = r#"
vibration:
  regions:
    - name: HIP
      driver_address: "0x40"
      actors:
        - { index: 0, outlet: 0, position: belt, min_intensity_warmup: -0.2 }
        - { index: 1, outlet: 1, position: buckle }
"#;
    let bus = MockBus::with_devices([LEFT]);
    let topology = Topology::build(&load(yaml), &bus, 1700.0);

    assert_eq!(topology.actor_count(), 1);
    assert!(topology.actor(Region::Hip, 0).is_none());
    assert!(logs_contain("Invalid motor parameters - ignoring actor"));
    assert!(logs_contain("warmup"));
}

#[test]
fn layered_parameters_reach_the_motor() {
    let yaml = r#"
vibration:
  actor_min_intensity: 0.2
  actor_mapping_curve_degree: 2.0
  regions:
    - name: LEFT_FOOT
      driver_address: "0x40"
      actor_min_intensity_warmup: 0.5
      actors:
        - { index: 0, outlet: 0, position: heel, min_intensity: 0.4 }
        - { index: 1, outlet: 1, position: toes }
"#;
    let bus = MockBus::with_devices([LEFT]);
    let topology = Topology::build(&load(yaml), &bus, 1700.0);

    let heel = must_some(topology.actor(Region::LeftFoot, 0), "heel").motor.params();
    let toes = must_some(topology.actor(Region::LeftFoot, 1), "toes").motor.params();

    assert!((heel.min_intensity - 0.4).abs() < f32::EPSILON);
    assert!((toes.min_intensity - 0.2).abs() < f32::EPSILON);
    assert!((toes.curve_degree - 2.0).abs() < f32::EPSILON);
    assert_eq!(toes.warmup, std::time::Duration::from_millis(500));
}

#[tokio::test(start_paused = true)]
async fn all_off_silences_every_driver() {
    let bus = MockBus::with_devices([LEFT, RIGHT]);
    let topology = Topology::build(&load(TWO_HANDS), &bus, 1700.0);

    let palm = must_some(topology.actor(Region::RightHand, 1), "palm");
    must(palm.motor.set_intensity(1.0, 100));

    must(topology.all_off());

    for driver in bus.opened() {
        assert_eq!(driver.all_writes(), vec![(0, 0)]);
    }
    assert!(palm.motor.intensity().abs() < f32::EPSILON);
    let right = must_some(bus.driver(RIGHT), "right driver");
    let last = must_some(right.last_write(), "palm was never written");
    assert_eq!(last.off_tick, 0);
}
