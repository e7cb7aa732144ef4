//! Behaviour tests for skill gap analysis over saved dashboard states.
//!
//! Each scenario builds a raw saved state, runs it through migration, and
//! checks the gap report the dashboard would render.
#![expect(
    clippy::expect_used,
    reason = "test code uses expect for clear failure messages"
)]

use peerdesk::domain::{GapStatus, MigrationReport, SkillGapReport, migrate_state, skill_gap_for};
use rstest::fixture;
use rstest_bdd::Slot;
use rstest_bdd_macros::{ScenarioState, given, scenario, then, when};
use serde_json::{Value, json};

#[derive(Default, ScenarioState)]
struct SkillGapWorld {
    own_skills: Slot<Vec<Value>>,
    peers: Slot<Vec<Value>>,
    report: Slot<SkillGapReport>,
    migration: Slot<MigrationReport>,
}

impl SkillGapWorld {
    fn push_peer(&self, name: &str, skills: &str) {
        let mut peers = self.peers.get().unwrap_or_default();
        peers.push(json!({
            "name": name,
            "company": "",
            "skills": split(skills),
        }));
        self.peers.set(peers);
    }

    fn saved_state(&self) -> Value {
        json!({
            "profile": { "name": "Priya", "companies": [] },
            "mySkills": self.own_skills.get().unwrap_or_default(),
            "peers": self.peers.get().unwrap_or_default(),
            "resources": []
        })
    }

    fn report(&self) -> SkillGapReport {
        self.report.get().expect("skill gap should be computed")
    }
}

fn split(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|skill| !skill.is_empty())
        .map(str::to_owned)
        .collect()
}

#[fixture]
fn world() -> SkillGapWorld {
    SkillGapWorld::default()
}

#[given("a saved state with own skills {skills}")]
fn a_saved_state_with_own_skills(world: &SkillGapWorld, skills: String) {
    let entries = split(&skills)
        .into_iter()
        .map(|skill| json!({ "skill": skill, "company": "" }))
        .collect();
    world.own_skills.set(entries);
}

#[given("a legacy saved state with bare skills {skills}")]
fn a_legacy_saved_state_with_bare_skills(world: &SkillGapWorld, skills: String) {
    world
        .own_skills
        .set(split(&skills).into_iter().map(Value::String).collect());
}

#[given("a peer {name} with skills {skills}")]
fn a_peer_with_skills(world: &SkillGapWorld, name: String, skills: String) {
    world.push_peer(&name, &skills);
}

#[when("the skill gap is computed")]
fn the_skill_gap_is_computed(world: &SkillGapWorld) {
    let migrated = migrate_state(world.saved_state()).expect("saved state should migrate");
    world.report.set(skill_gap_for(&migrated.state));
    world.migration.set(migrated.report);
}

#[then("the gap status is {status}")]
fn the_gap_status_is(world: &SkillGapWorld, status: String) {
    let expected = match status.as_str() {
        "gaps" => GapStatus::Gaps,
        "no peers" => GapStatus::NoPeers,
        "fully matched" => GapStatus::FullyMatched,
        other => panic!("unsupported gap status: {other}"),
    };
    assert_eq!(world.report().status, expected);
}

#[then("the missing skills are {skills}")]
fn the_missing_skills_are(world: &SkillGapWorld, skills: String) {
    let missing = world
        .report()
        .missing
        .into_iter()
        .map(|count| count.skill)
        .collect::<Vec<_>>();
    assert_eq!(missing, split(&skills));
}

#[then("no skills are missing")]
fn no_skills_are_missing(world: &SkillGapWorld) {
    assert!(world.report().missing.is_empty());
}

#[then("the comparison starts with {skills}")]
fn the_comparison_starts_with(world: &SkillGapWorld, skills: String) {
    let expected = split(&skills);
    let leading = world
        .report()
        .comparison
        .into_iter()
        .take(expected.len())
        .map(|row| row.skill)
        .collect::<Vec<_>>();
    assert_eq!(leading, expected);
}

#[then("the migration converted {count:usize} legacy skills")]
fn the_migration_converted_legacy_skills(world: &SkillGapWorld, count: usize) {
    let report = world.migration.get().expect("migration should run");
    assert_eq!(report.legacy_skills, count);
}

#[scenario(
    path = "tests/features/skill_gap.feature",
    name = "Peers hold skills the user lacks"
)]
fn peers_hold_skills_the_user_lacks(world: SkillGapWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/skill_gap.feature",
    name = "A user without peers has nothing to compare"
)]
fn a_user_without_peers_has_nothing_to_compare(world: SkillGapWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/skill_gap.feature",
    name = "Legacy saved state is migrated before analysis"
)]
fn legacy_saved_state_is_migrated_before_analysis(world: SkillGapWorld) {
    drop(world);
}
