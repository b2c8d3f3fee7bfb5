use layerval::{LayervalError, Resolver, Value};

mod support;

/// A scene where the "fx" layer is visible and already applied: the live
/// value of `rs.startFrame` embodies the layer's absolute override, while the
/// authored value survives on the apply node's `original` input.
fn scene_json(needs_apply_update: bool) -> String {
    format!(
        r#"{{
        "nodes": [
            {{
                "name": "rs",
                "attributes": [
                    {{
                        "name": "startFrame",
                        "value": 500.0,
                        "override_chain": [
                            {{"name": "applyAbs1", "kind": "apply_override"}}
                        ]
                    }}
                ]
            }},
            {{
                "name": "applyAbs1",
                "attributes": [
                    {{"name": "original", "value": 5.0}}
                ]
            }}
        ],
        "layers": [
            {{"name": "base", "base": true}},
            {{
                "name": "fx",
                "visible": true,
                "needs_apply_update": {needs_apply_update},
                "collections": [
                    {{
                        "name": "c",
                        "members": ["rs"],
                        "items": [
                            {{"override": {{"attribute": "startFrame", "kind": "absolute", "value": 500.0}}}}
                        ]
                    }}
                ]
            }}
        ]
    }}"#
    )
}

#[test]
fn visible_layer_reads_live_without_folding() {
    let (scene, mut layers) = support::build(&scene_json(false));
    let v = Resolver::attr_in_layer(&scene, &mut layers, "rs.startFrame", "fx").unwrap();
    assert_eq!(v, Value::Float(500.0));
    // Clean layer, so no refresh was issued.
    assert_eq!(layers.refreshes_applied(), 0);
}

#[test]
fn stale_visible_layer_is_refreshed_first() {
    let (scene, mut layers) = support::build(&scene_json(true));
    let v = Resolver::attr_in_layer(&scene, &mut layers, "rs.startFrame", "fx").unwrap();
    assert_eq!(v, Value::Float(500.0));
    assert_eq!(layers.refreshes_applied(), 1);
}

#[test]
fn refresh_is_retried_once_on_failure() {
    let (scene, mut layers) = support::build(&scene_json(true));
    layers.fail_refreshes(1);
    let v = Resolver::attr_in_layer(&scene, &mut layers, "rs.startFrame", "fx").unwrap();
    assert_eq!(v, Value::Float(500.0));
    assert_eq!(layers.refreshes_applied(), 1);
}

#[test]
fn second_refresh_failure_is_fatal() {
    let (scene, mut layers) = support::build(&scene_json(true));
    layers.fail_refreshes(2);
    let err = Resolver::attr_in_layer(&scene, &mut layers, "rs.startFrame", "fx").unwrap_err();
    assert!(matches!(err, LayervalError::EngineRefresh(layer) if layer == "fx"));
}

#[test]
fn refresh_happens_only_once_across_repeat_queries() {
    let (scene, mut layers) = support::build(&scene_json(true));
    for _ in 0..3 {
        Resolver::attr_in_layer(&scene, &mut layers, "rs.startFrame", "fx").unwrap();
    }
    // The first resolution clears the staleness flags in the registry.
    assert_eq!(layers.refreshes_applied(), 1);
}

#[test]
fn inactive_layer_query_bypasses_the_live_override() {
    // Same scene; the base layer must see the authored value, not the one the
    // visible layer applied.
    let (scene, mut layers) = support::build(&scene_json(false));
    let v = Resolver::attr_in_layer(&scene, &mut layers, "rs.startFrame", "base").unwrap();
    assert_eq!(v, Value::Float(5.0));
}
