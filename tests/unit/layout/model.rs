use super::*;

use crate::layout::LayoutResult;

fn parse(json: &str) -> LayoutDef {
    serde_json::from_str(json).unwrap()
}

#[test]
fn minimal_layout_parses_with_defaults() {
    let def = parse(r#"{ "width": 10, "height": 20 }"#);
    def.validate().unwrap();

    assert!(def.padding.is_none());
    assert!(def.unit.is_none());
    assert!(def.data.is_none());
    assert!(def.children.is_empty());

    let layout = def.lower();
    assert_eq!(layout.width(), 10);
    assert_eq!(layout.height(), 20);
    assert_eq!(layout.child_count(), 0);
    assert!(layout.render_unit().is_none());
}

#[test]
fn children_carry_offsets_and_flattened_fields() {
    let def = parse(
        r#"{
            "width": 100, "height": 100,
            "children": [
                { "x": 5, "y": 7, "width": 20, "height": 20, "unit": { "id": 1 } },
                { "width": 30, "height": 30 }
            ]
        }"#,
    );
    def.validate().unwrap();

    let layout = def.lower();
    assert_eq!(layout.child_count(), 2);
    assert_eq!(layout.x_for_child(0), 5);
    assert_eq!(layout.y_for_child(0), 7);
    assert_eq!(layout.x_for_child(1), 0);

    let first = layout.child_at(0).unwrap();
    let unit = first.render_unit().unwrap();
    assert_eq!(unit.id(), UnitId(1));
}

#[test]
fn unit_kind_defaults_follow_children() {
    let def = parse(
        r#"{
            "width": 100, "height": 100,
            "unit": { "id": 1 },
            "children": [
                { "width": 10, "height": 10, "unit": { "id": 2 } },
                { "width": 10, "height": 10, "unit": { "id": 3, "kind": "host" } }
            ]
        }"#,
    );
    def.validate().unwrap();
    let layout = def.lower();

    // A unit on a node with children defaults to host.
    assert_eq!(layout.render_unit().unwrap().render_type(), RenderType::Host);
    // A childless unit defaults to content unless overridden.
    let leaf = layout.child_at(0).unwrap().render_unit().unwrap();
    assert_eq!(leaf.render_type(), RenderType::Content);
    let forced = layout.child_at(1).unwrap().render_unit().unwrap();
    assert_eq!(forced.render_type(), RenderType::Host);
}

#[test]
fn padding_lowers_to_insets() {
    let def = parse(
        r#"{
            "width": 10, "height": 10,
            "padding": { "left": 1, "top": 2, "right": 3, "bottom": 4 }
        }"#,
    );
    let layout = def.lower();
    assert_eq!(layout.padding(), Some(EdgeInsets::new(1, 2, 3, 4)));
}

#[test]
fn duplicate_unit_ids_are_rejected() {
    let def = parse(
        r#"{
            "width": 100, "height": 100,
            "children": [
                { "width": 10, "height": 10, "unit": { "id": 5 } },
                { "width": 10, "height": 10, "unit": { "id": 5 } }
            ]
        }"#,
    );
    let err = def.validate().unwrap_err();
    assert!(matches!(err, TrellisError::Structure(_)));
}

#[test]
fn reserved_root_id_is_rejected() {
    let def = parse(r#"{ "width": 10, "height": 10, "unit": { "id": 0 } }"#);
    assert!(def.validate().is_err());
}

#[test]
fn negative_sizes_are_rejected() {
    let def = parse(r#"{ "width": -1, "height": 10 }"#);
    assert!(def.validate().is_err());
}

#[test]
fn missing_file_is_a_structure_error() {
    let err = LayoutDef::from_path("tests/data/does_not_exist.json").unwrap_err();
    assert!(matches!(err, TrellisError::Structure(_)));
}

#[test]
fn declared_unit_binds_and_unbinds_the_payload() {
    let unit = DeclaredUnit::new(UnitId(3), RenderType::Content);
    let mut content = unit.create_content().unwrap();

    let payload: LayoutData = Arc::new(serde_json::json!({ "label": "leaf" }));
    unit.bind(content.as_mut(), Some(&payload)).unwrap();

    let declared = content.downcast_ref::<DeclaredContent>().unwrap();
    assert_eq!(declared.unit, UnitId(3));
    assert_eq!(declared.data, Some(serde_json::json!({ "label": "leaf" })));

    unit.unbind(content.as_mut());
    let declared = content.downcast_ref::<DeclaredContent>().unwrap();
    assert_eq!(declared.data, None);
}
