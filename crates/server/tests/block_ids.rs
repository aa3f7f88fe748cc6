use voxflow_server::block::{self, PropsTable};

#[test]
fn classic_ids_match_the_wire_protocol() {
    let ids = [
        ("air", block::AIR, 0),
        ("stone", block::STONE, 1),
        ("grass", block::GRASS, 2),
        ("dirt", block::DIRT, 3),
        ("sapling", block::SAPLING, 6),
        ("water", block::WATER, 8),
        ("still_water", block::STILL_WATER, 9),
        ("lava", block::LAVA, 10),
        ("still_lava", block::STILL_LAVA, 11),
        ("sand", block::SAND, 12),
        ("gravel", block::GRAVEL, 13),
        ("sponge", block::SPONGE, 19),
        ("glass", block::GLASS, 20),
    ];
    for (name, id, expected) in ids {
        assert_eq!(id.0, expected, "{name}");
    }
}

#[test]
fn property_table_defaults() {
    let props = PropsTable::classic();
    assert!(props.get(block::ROSE).killed_by_water);
    assert!(!props.get(block::STONE).killed_by_water);
    assert!(props.get(block::WHITE).killed_by_lava, "wool burns");
    assert!(props.get(block::GLASS).light_passes);
    assert!(!props.get(block::DIRT).light_passes);
    assert_eq!(props.get(block::DIRT).grass_variant, Some(block::GRASS));
    assert_eq!(props.get(block::GRASS).dirt_variant, Some(block::DIRT));
    assert!(props.get(block::AIR).grass_variant.is_none());
}

#[test]
fn liquid_families() {
    assert!(block::is_water(block::STILL_WATER));
    assert!(block::is_lava(block::FAST_LAVA));
    assert!(!block::is_lava(block::WATER));
    assert!(block::is_open(block::STILL_LAVA));
    assert!(!block::is_open(block::SAPLING));
    assert!(block::is_crushable(block::SAPLING));
    assert!(block::has_gravity(block::GRAVEL));
}
