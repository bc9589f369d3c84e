//! Spawn templates authored as RON data.
use combat_core::{
    AbilityUse, CastTarget, ContentOracle, ContentTables, DamageRange, Element, SpawnFlags,
    SpawnTemplate,
};

fn load() -> Vec<SpawnTemplate> {
    ron::from_str(include_str!("fixtures/templates.ron")).expect("fixture parses")
}

#[test]
fn templates_deserialize_with_defaults() {
    let templates = load();
    assert_eq!(templates.len(), 2);

    let bat = &templates[0];
    assert_eq!(bat.flags, SpawnFlags::empty());
    assert_eq!(bat.stats.hp, 12);
    assert_eq!(bat.stats.mp, 0);
    assert_eq!(bat.damage, DamageRange::new(1, 3));
    assert_eq!(bat.offensive_element, Element::Wind);
    assert_eq!(
        bat.abilities.offense,
        vec![AbilityUse::new("screech").with_interval(6)]
    );
    assert_eq!(bat.abilities.on_death[0].target, CastTarget::Group);
    assert!(bat.abilities.near_death.is_none());
    assert_eq!(bat.loot_table.as_deref(), Some("bat"));
    assert_eq!(bat.script, None);

    let warden = &templates[1];
    assert_eq!(
        warden.flags,
        SpawnFlags::MOVEMENT_DISABLED | SpawnFlags::DEATH_DISABLED
    );
    assert_eq!(warden.variance, 0.0);
    assert_eq!(warden.defensive_element, Element::None);
    let near_death = warden.abilities.near_death.as_ref().expect("near death");
    assert_eq!(near_death.health_percent, 25.0);
    assert_eq!(near_death.castables[0].damage_override(), Some((30, 45)));
    assert_eq!(warden.script.as_deref(), Some("warden"));
}

#[test]
fn loaded_templates_are_found_by_name() {
    let mut content = ContentTables::new();
    for template in load() {
        content.insert_template(template);
    }
    assert!(content.template("warden").is_some());
    assert!(content.require_template("lich").is_err());
}
