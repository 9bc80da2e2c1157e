/// Tests for schema registration, flattening, and configuration errors

use netstate_shared::{FieldDescriptor, SchemaBuilder, SchemaError, SchemaRegistry};

fn vec3_builder() -> SchemaBuilder {
    SchemaBuilder::new("vec3")
        .field(FieldDescriptor::float("x", 0))
        .field(FieldDescriptor::float("y", 0))
        .field(FieldDescriptor::float("z", 0))
}

#[test]
fn duplicate_registration_is_a_configuration_error() {
    let mut registry = SchemaRegistry::new();
    registry.register(vec3_builder()).unwrap();

    assert_eq!(
        registry.register(vec3_builder()),
        Err(SchemaError::DuplicateType("vec3".to_string()))
    );
}

#[test]
fn resolving_an_unregistered_type_fails() {
    let registry = SchemaRegistry::new();
    assert_eq!(
        registry.resolve("ghost"),
        Err(SchemaError::UnknownType("ghost".to_string()))
    );
}

#[test]
fn base_types_must_be_registered_first() {
    let mut registry = SchemaRegistry::new();
    let result = registry.register(
        SchemaBuilder::new("door")
            .base("base_entity")
            .field(FieldDescriptor::boolean("open")),
    );
    assert_eq!(
        result,
        Err(SchemaError::UnknownType("base_entity".to_string()))
    );
}

#[test]
fn base_fields_come_along() {
    let mut registry = SchemaRegistry::new();
    registry
        .register(
            SchemaBuilder::new("base_entity")
                .field(FieldDescriptor::uint("model", 13))
                .field(FieldDescriptor::uint("effects", 8)),
        )
        .unwrap();

    let door = registry
        .register(
            SchemaBuilder::new("door")
                .base("base_entity")
                .field(FieldDescriptor::boolean("open")),
        )
        .unwrap();

    assert_eq!(door.field_count(), 3);
    assert!(door.field_id("model").is_some());
    assert!(door.field_id("open").is_some());
}

#[test]
fn nested_types_flatten_with_dotted_names() {
    let mut registry = SchemaRegistry::new();
    registry.register(vec3_builder()).unwrap();

    let player = registry
        .register(
            SchemaBuilder::new("player")
                .field(FieldDescriptor::float("health", 10).range(0.0, 100.0))
                .nested("origin", "vec3"),
        )
        .unwrap();

    assert_eq!(player.field_count(), 4);
    assert!(player.field_id("origin.x").is_some());
    assert!(player.field_id("origin.z").is_some());
}

#[test]
fn array_types_flatten_per_element() {
    let mut registry = SchemaRegistry::new();
    registry
        .register(
            SchemaBuilder::new("ammo_slot")
                .field(FieldDescriptor::uint("count", 9))
                .field(FieldDescriptor::enumeration("kind", 4)),
        )
        .unwrap();

    let weapon = registry
        .register(SchemaBuilder::new("weapon").array("ammo", "ammo_slot", 3))
        .unwrap();

    assert_eq!(weapon.field_count(), 6);
    assert!(weapon.field_id("ammo[0].count").is_some());
    assert!(weapon.field_id("ammo[2].kind").is_some());
    assert!(weapon.field_id("ammo[3].count").is_none());
}

#[test]
fn flat_layout_collisions_are_rejected() {
    let mut registry = SchemaRegistry::new();
    let result = registry.register(
        SchemaBuilder::new("broken")
            .field(FieldDescriptor::uint("flags", 8))
            .field(FieldDescriptor::boolean("flags")),
    );
    assert_eq!(
        result,
        Err(SchemaError::FieldCollision {
            type_name: "broken".to_string(),
            field: "flags".to_string(),
        })
    );
}

#[test]
fn hot_fields_sort_to_the_front() {
    let mut registry = SchemaRegistry::new();
    let schema = registry
        .register(
            SchemaBuilder::new("mover")
                .field(FieldDescriptor::string("name"))
                .field(FieldDescriptor::vector("velocity", 16).range(-4096.0, 4096.0).changes_often())
                .field(FieldDescriptor::uint("skin", 4)),
        )
        .unwrap();

    assert_eq!(schema.field_id("velocity"), Some(0));
    // declaration order is preserved within the cold group
    assert_eq!(schema.field_id("name"), Some(1));
    assert_eq!(schema.field_id("skin"), Some(2));
}

#[test]
fn registered_types_are_enumerable() {
    let mut registry = SchemaRegistry::new();
    registry.register(vec3_builder()).unwrap();

    assert!(registry.contains("vec3"));
    let names: Vec<_> = registry.type_names().collect();
    assert_eq!(names, vec!["vec3"]);
}
