//! Unit tests for the diagram controller

use process_mapper_api::models::{
    Column, DiagramDocument, Edge, FontSize, FontWeight, NodeKind, Notification, Position,
};
use process_mapper_api::render::BorderEmphasis;
use process_mapper_api::services::mapper_service::{
    ContextAction, ContextTarget, DiagramError, KeyFocus, MAX_PENDING_NOTIFICATIONS,
    MapperService,
};
use serde_json::json;

fn place(service: &mut MapperService, kind: NodeKind, x: f64, y: f64) -> String {
    service.drop_node(kind, Position::new(x, y)).id.clone()
}

/// Three processes wired a -> b -> c plus a -> c.
fn triangle() -> (MapperService, [String; 3]) {
    let mut service = MapperService::new();
    let a = place(&mut service, NodeKind::Process, 0.0, 0.0);
    let b = place(&mut service, NodeKind::Process, 200.0, 0.0);
    let c = place(&mut service, NodeKind::Process, 100.0, 200.0);
    service.connect(&a, &b, None, None).unwrap();
    service.connect(&b, &c, None, None).unwrap();
    service.connect(&a, &c, None, None).unwrap();
    (service, [a, b, c])
}

#[test]
fn test_drop_node_uses_kind_defaults() {
    let mut service = MapperService::new();
    let id = place(&mut service, NodeKind::Database, 10.0, 20.0);

    let node = service.node(&id).unwrap();
    assert!(id.starts_with("database-"));
    assert_eq!(node.label(), "Database");
    assert_eq!(node.position, Position::new(10.0, 20.0));
    assert_eq!(node.data.columns(), Some(&[][..]));
}

#[test]
fn test_create_then_delete_node_leaves_edges_unchanged() {
    let (mut service, _) = triangle();
    let edges_before: Vec<Edge> = service.edges().to_vec();
    let nodes_before = service.nodes().len();

    let id = place(&mut service, NodeKind::Application, 400.0, 400.0);
    assert!(service.delete_node(&id));

    assert_eq!(service.nodes().len(), nodes_before);
    assert_eq!(service.edges(), &edges_before[..]);
}

#[test]
fn test_delete_node_removes_exactly_incident_edges() {
    let (mut service, [a, b, c]) = triangle();

    assert!(service.delete_node(&b));

    let remaining: Vec<(&str, &str)> = service
        .edges()
        .iter()
        .map(|e| (e.source.as_str(), e.target.as_str()))
        .collect();
    assert_eq!(remaining, vec![(a.as_str(), c.as_str())]);
    assert!(service.node(&b).is_none());
}

#[test]
fn test_delete_unknown_node_is_noop() {
    let (mut service, _) = triangle();
    assert!(!service.delete_node("process-missing"));
    assert_eq!(service.nodes().len(), 3);
    assert_eq!(service.edges().len(), 3);
}

#[test]
fn test_duplicate_offsets_by_fifty() {
    let mut service = MapperService::new();
    let id = place(&mut service, NodeKind::Schema, 100.0, 100.0);
    service
        .set_node_columns(&id, vec![Column::new("id", "uuid")])
        .unwrap();
    service.update_node_label(&id, "Orders", None, None);

    let copy = service.duplicate_node(&id).unwrap().clone();

    assert_ne!(copy.id, id);
    assert_eq!(copy.position, Position::new(150.0, 150.0));
    assert_eq!(copy.kind(), NodeKind::Schema);
    assert_eq!(copy.label(), "Orders");
    assert_eq!(copy.data.columns(), Some(&[Column::new("id", "uuid")][..]));
    assert_eq!(service.nodes().len(), 2);
}

#[test]
fn test_duplicate_unknown_node_fails() {
    let mut service = MapperService::new();
    assert_eq!(
        service.duplicate_node("nope").unwrap_err(),
        DiagramError::NodeNotFound("nope".to_string())
    );
}

#[test]
fn test_update_label_on_unknown_node_changes_nothing() {
    let (mut service, _) = triangle();
    let before = service.document();
    assert!(!service.update_node_label("process-missing", "X", None, None));
    assert_eq!(service.document(), before);
}

#[test]
fn test_connect_rejects_self_loops_and_duplicates() {
    let mut service = MapperService::new();
    let a = place(&mut service, NodeKind::Process, 0.0, 0.0);
    let b = place(&mut service, NodeKind::Database, 0.0, 200.0);

    assert!(matches!(
        service.connect(&a, &a, None, None),
        Err(DiagramError::InvalidConnection(_))
    ));

    let edge_id = service.connect(&a, &b, None, None).unwrap().id.clone();
    assert_eq!(edge_id, format!("reactflow__edge-{}-{}", a, b));
    assert!(matches!(
        service.connect(&a, &b, None, None),
        Err(DiagramError::DuplicateEdge(_))
    ));

    assert!(matches!(
        service.connect(&a, "missing", None, None),
        Err(DiagramError::NodeNotFound(_))
    ));
}

#[test]
fn test_connect_with_handles() {
    let mut service = MapperService::new();
    let a = place(&mut service, NodeKind::Process, 0.0, 0.0);
    let b = place(&mut service, NodeKind::Application, 300.0, 0.0);

    let source_handle = format!("{}-right-source", a);
    let target_handle = format!("{}-left-target", b);
    let edge = service
        .connect(&a, &b, Some(source_handle.clone()), Some(target_handle.clone()))
        .unwrap()
        .clone();

    assert_eq!(edge.source_handle.as_deref(), Some(source_handle.as_str()));
    assert!(edge.animated);
    assert_eq!(edge.data.text, "");
}

#[test]
fn test_delete_mode_click_deletes_instead_of_selecting() {
    let (mut service, [a, b, _]) = triangle();
    service.click_node(&a).unwrap();
    assert_eq!(service.selected_node(), Some(a.as_str()));

    assert!(service.toggle_delete_mode());
    assert_eq!(service.selected_node(), None);

    service.click_node(&b).unwrap();
    assert!(service.node(&b).is_none());
    assert_eq!(service.edges().len(), 1);

    let last_edge = service.edges()[0].id.clone();
    service.click_edge(&last_edge).unwrap();
    assert!(service.edges().is_empty());

    assert!(!service.toggle_delete_mode());
}

#[test]
fn test_edge_click_toggles_and_deselects_others() {
    let (mut service, _) = triangle();
    let first = service.edges()[0].id.clone();
    let second = service.edges()[1].id.clone();

    service.click_edge(&first).unwrap();
    service.click_edge(&second).unwrap();
    let selected = service.interaction().selected_edges;
    assert_eq!(selected, vec![second.clone()]);

    service.click_edge(&second).unwrap();
    assert!(service.interaction().selected_edges.is_empty());
}

#[test]
fn test_delete_key_respects_focus() {
    let (mut service, [a, _, _]) = triangle();
    service.click_node(&a).unwrap();

    assert!(!service.key_down("Delete", KeyFocus::TextInput));
    assert!(!service.key_down("Backspace", KeyFocus::Dialog));
    assert!(service.node(&a).is_some());

    assert!(service.key_down("Backspace", KeyFocus::Canvas));
    assert!(service.node(&a).is_none());
    assert_eq!(service.edges().len(), 1);
}

#[test]
fn test_delete_selected_counts_nodes_and_edges() {
    let (mut service, [a, _, _]) = triangle();
    // b -> c stays; select it and node a (which owns the other two edges)
    let b_to_c = service
        .edges()
        .iter()
        .find(|e| !e.touches(&a))
        .unwrap()
        .id
        .clone();
    service.click_edge(&b_to_c).unwrap();
    service.click_node(&a).unwrap();

    let summary = service.delete_selected_elements();

    assert_eq!(summary.nodes, 1);
    assert_eq!(summary.edges, 3);
    assert!(service.edges().is_empty());
    assert_eq!(service.nodes().len(), 2);
}

#[test]
fn test_database_columns_expand_and_collapse() {
    let mut service = MapperService::new();
    let id = place(&mut service, NodeKind::Database, 0.0, 0.0);

    // No rows: no disclosure control, nothing to expand
    let view = service.render_node(&id).unwrap().columns.unwrap();
    assert!(!view.disclosure_visible);
    assert!(!service.toggle_columns(&id).unwrap());

    service
        .set_node_columns(
            &id,
            vec![Column::new("id", "int"), Column::new("email", "text")],
        )
        .unwrap();
    let view = service.render_node(&id).unwrap().columns.unwrap();
    assert!(view.disclosure_visible);
    assert!(!view.expanded);
    assert!(view.rows.is_empty());

    assert!(service.toggle_columns(&id).unwrap());
    let view = service.render_node(&id).unwrap().columns.unwrap();
    assert!(view.expanded);
    assert_eq!(view.rows.len(), 2);
    assert_eq!(view.rows[1].name, "email");

    assert!(!service.toggle_columns(&id).unwrap());
    let view = service.render_node(&id).unwrap().columns.unwrap();
    assert!(view.rows.is_empty());
}

#[test]
fn test_columns_on_process_node_are_rejected() {
    let mut service = MapperService::new();
    let id = place(&mut service, NodeKind::Process, 0.0, 0.0);
    assert!(matches!(
        service.set_node_columns(&id, vec![Column::new("a", "b")]),
        Err(DiagramError::NoColumns { .. })
    ));
}

#[test]
fn test_text_annotation_edit_commits_on_pane_click() {
    let mut service = MapperService::new();
    let id = place(&mut service, NodeKind::Text, 0.0, 0.0);

    service.click_node(&id).unwrap();
    assert_eq!(service.text_editor().unwrap().node_id(), id);

    service.edit_text_draft("Nightly batch").unwrap();
    service.set_text_font_weight(FontWeight::Bold).unwrap();
    // Font choices apply straight away, text waits for the commit
    assert_eq!(
        service.node(&id).unwrap().data.font(),
        Some((FontSize::Px16, FontWeight::Bold))
    );
    assert_eq!(service.node(&id).unwrap().label(), "Click to edit text");

    service.click_pane();
    assert!(service.text_editor().is_none());
    assert_eq!(service.node(&id).unwrap().label(), "Nightly batch");
}

#[test]
fn test_selected_node_renders_emphasised() {
    let (mut service, [a, b, _]) = triangle();
    service.click_node(&a).unwrap();

    assert_eq!(
        service.render_node(&a).unwrap().border,
        BorderEmphasis::Selected
    );
    assert_eq!(
        service.render_node(&b).unwrap().border,
        BorderEmphasis::Normal
    );
}

#[test]
fn test_context_menu_duplicate_and_delete() {
    let (mut service, [a, _, _]) = triangle();

    service
        .open_context_menu(ContextTarget::Node(a.clone()), 10.0, 10.0)
        .unwrap();
    assert_eq!(
        service.context_menu().unwrap().actions(),
        vec![ContextAction::Duplicate, ContextAction::Delete]
    );
    service.context_menu_duplicate().unwrap();
    assert_eq!(service.nodes().len(), 4);
    assert!(service.context_menu().is_none());

    let edge = service.edges()[0].id.clone();
    service
        .open_context_menu(ContextTarget::Edge(edge.clone()), 0.0, 0.0)
        .unwrap();
    assert_eq!(
        service.context_menu().unwrap().actions(),
        vec![ContextAction::Delete]
    );
    service.context_menu_delete().unwrap();
    assert!(service.edge(&edge).is_none());

    assert_eq!(
        service.context_menu_delete().unwrap_err(),
        DiagramError::NoOpenEditor
    );
}

#[test]
fn test_node_dialog_label_commits_on_blur() {
    let (mut service, [a, _, _]) = triangle();
    service.double_click_node(&a).unwrap();

    service.set_dialog_label_draft("Ingest").unwrap();
    assert_eq!(service.node(&a).unwrap().label(), "Process");

    service.blur_dialog_label().unwrap();
    assert_eq!(service.node(&a).unwrap().label(), "Ingest");

    service.close_node_dialog();
    assert!(service.node_dialog().is_none());
}

#[test]
fn test_replace_diagram_prunes_dangling_edges_and_resets_state() {
    let (mut service, [a, b, _]) = triangle();
    service.click_node(&a).unwrap();

    let mut document = service.document();
    document.nodes.retain(|n| n.id != b);
    service.replace_diagram(document);

    assert_eq!(service.nodes().len(), 2);
    assert_eq!(service.edges().len(), 1);
    assert_eq!(service.selected_node(), None);
}

#[test]
fn test_from_document_round_trip() {
    let (service, _) = triangle();
    let document = service.document();
    let restored = MapperService::from_document(document.clone());
    assert_eq!(restored.document(), document);

    let empty = MapperService::from_document(DiagramDocument::default());
    assert!(empty.document().is_empty());
}

#[test]
fn test_imported_selected_node_is_deleted_with_selection() {
    let document: DiagramDocument = serde_json::from_value(json!({
        "nodes": [
            {"id": "p-1", "type": "process", "position": {"x": 0, "y": 0},
             "data": {"label": "Keep"}},
            {"id": "p-2", "type": "process", "position": {"x": 0, "y": 200},
             "data": {"label": "Drop"}, "selected": true}
        ],
        "edges": [{"id": "e1", "source": "p-1", "target": "p-2"}]
    }))
    .unwrap();

    let mut service = MapperService::from_document(document);
    assert_eq!(service.selected_node(), Some("p-2"));
    assert!(!service.node("p-2").unwrap().extra.contains_key("selected"));

    let summary = service.delete_selected_elements();
    assert_eq!((summary.nodes, summary.edges), (1, 1));
    assert_eq!(service.nodes().len(), 1);
    assert_eq!(service.nodes()[0].id, "p-1");
}

#[test]
fn test_notification_queue_drops_oldest_when_full() {
    let mut service = MapperService::new();
    for i in 0..MAX_PENDING_NOTIFICATIONS + 5 {
        service.notify(Notification::info("Note", i.to_string()));
    }

    assert_eq!(
        service.pending_notifications().count(),
        MAX_PENDING_NOTIFICATIONS
    );
    let notes = service.take_notifications();
    assert_eq!(notes[0].description, "5");
    assert_eq!(
        notes.last().unwrap().description,
        (MAX_PENDING_NOTIFICATIONS + 4).to_string()
    );
    assert_eq!(service.pending_notifications().count(), 0);
}
