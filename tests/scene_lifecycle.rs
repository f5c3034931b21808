//! E2E tests for graph-mutation events flowing through the plugin.

use bevy::prelude::*;
use nebula::core::config::SpaceConfig;
use nebula::core::identity::{LinkId, NodeId, SphereId};
use nebula::core::scene::SpaceScene;
use nebula::input::events::GraphEvent;
use nebula::SpacePlugin;

fn space_app() -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins)
        .insert_resource(SpaceConfig { seed: 11, ..Default::default() })
        .add_plugins(SpacePlugin);
    app
}

fn send(app: &mut App, events: impl IntoIterator<Item = GraphEvent>) {
    for event in events {
        app.world_mut().write_message(event);
    }
    app.update();
}

fn add_node(id: u64) -> GraphEvent {
    GraphEvent::AddNode { id: NodeId(id), label: format!("n{id}") }
}

#[test]
fn e2e_nodes_links_and_spheres_are_created() {
    let mut app = space_app();
    send(
        &mut app,
        [
            add_node(1),
            add_node(2),
            GraphEvent::AddLink { id: LinkId(1), from: NodeId(1), to: NodeId(2) },
            GraphEvent::AddSphere { id: SphereId(1), label: "pair".into() },
            GraphEvent::TagNode { node: NodeId(1), sphere: SphereId(1) },
            GraphEvent::TagNode { node: NodeId(2), sphere: SphereId(1) },
        ],
    );

    let scene = app.world().resource::<SpaceScene>();
    assert_eq!(scene.nodes().live_count(), 2);
    assert_eq!(scene.links().live_count(), 1);
    assert_eq!(scene.node_map().len(), 2);

    // Cluster bounds ran in the same frame.
    let sphere = scene.sphere(SphereId(1)).unwrap();
    let a = scene.node(NodeId(1)).unwrap().position;
    let b = scene.node(NodeId(2)).unwrap().position;
    assert!((sphere.center - (a + b) / 2.0).length() < 1e-4);
    assert!(sphere.radius >= 1.0);
}

#[test]
fn e2e_remove_node_cascades() {
    let mut app = space_app();
    send(
        &mut app,
        [
            add_node(1),
            add_node(2),
            add_node(3),
            GraphEvent::AddLink { id: LinkId(1), from: NodeId(1), to: NodeId(2) },
            GraphEvent::AddLink { id: LinkId(2), from: NodeId(2), to: NodeId(3) },
            GraphEvent::AddLink { id: LinkId(3), from: NodeId(1), to: NodeId(3) },
            GraphEvent::AddSphere { id: SphereId(1), label: String::new() },
            GraphEvent::TagNode { node: NodeId(2), sphere: SphereId(1) },
        ],
    );
    send(&mut app, [GraphEvent::RemoveNode { id: NodeId(2) }]);

    let scene = app.world().resource::<SpaceScene>();
    assert_eq!(scene.nodes().live_count(), 2);
    assert_eq!(scene.links().live_count(), 1);
    assert!(scene.link(LinkId(3)).is_ok());
    assert!(scene.link(LinkId(1)).is_err());
    assert!(scene.link(LinkId(2)).is_err());
    assert!(scene.sphere(SphereId(1)).unwrap().members.is_empty());
}

#[test]
fn e2e_recycled_slot_gets_fresh_identity() {
    let mut app = space_app();
    send(&mut app, [add_node(1), add_node(2)]);
    let old_slot = app.world().resource::<SpaceScene>().node_slot(NodeId(2)).unwrap();

    send(&mut app, [GraphEvent::RemoveNode { id: NodeId(2) }, add_node(7)]);

    let scene = app.world().resource::<SpaceScene>();
    assert_eq!(scene.node_slot(NodeId(7)).unwrap(), old_slot);
    assert_eq!(scene.node_id(old_slot), Some(NodeId(7)));
    assert!(scene.node_slot(NodeId(2)).is_err());
}

#[test]
fn e2e_failing_events_do_not_stop_the_stream() {
    let mut app = space_app();
    send(
        &mut app,
        [
            add_node(1),
            add_node(1),
            GraphEvent::AddLink { id: LinkId(1), from: NodeId(1), to: NodeId(99) },
            GraphEvent::SetNodeAttribute {
                id: NodeId(1),
                name: "space:bogus".into(),
                ty: nebula::core::attributes::AttributeType::Float,
                value: "1".into(),
            },
            add_node(2),
        ],
    );

    let scene = app.world().resource::<SpaceScene>();
    assert_eq!(scene.nodes().live_count(), 2);
    assert_eq!(scene.links().live_count(), 0);
    assert!(scene.link_map().is_empty());
}

#[test]
fn e2e_neighbor_spawns_near_anchor() {
    let mut app = space_app();
    send(&mut app, [add_node(1)]);
    send(
        &mut app,
        [GraphEvent::AddNeighbor {
            node: NodeId(2),
            link: LinkId(1),
            label: "child".into(),
            neighbor: NodeId(1),
        }],
    );

    let scene = app.world().resource::<SpaceScene>();
    let anchor = scene.node(NodeId(1)).unwrap().position;
    let child = scene.node(NodeId(2)).unwrap();
    assert_eq!(child.label, "child");
    assert!(child.position.distance(anchor) <= 2.0 + 1e-4);
    assert!(scene.link(LinkId(1)).is_ok());
}
