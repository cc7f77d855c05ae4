//! Unit tests for JSON/TXT import and PNG/JSON/TXT export

use process_mapper_api::export::{ExportError, PngExporter, TxtExporter};
use process_mapper_api::models::{Column, DiagramDocument, Edge, Node, NodeKind, Position};
use process_mapper_api::services::{
    ExportFormat, ExportService, ImportError, ImportFormat, ImportService, MapperService,
};
use serde_json::{Value, json};

const PNG_MAGIC: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

fn saved_canvas() -> Value {
    json!({
        "nodes": [
            {
                "id": "process-1",
                "type": "process",
                "position": {"x": 0, "y": 0},
                "data": {"label": "Ingest"},
                "width": 150,
                "height": 50,
                "positionAbsolute": {"x": 0, "y": 0}
            },
            {
                "id": "database-1",
                "type": "database",
                "position": {"x": 0, "y": 200},
                "data": {"label": "Orders", "columns": [{"name": "id", "type": "int"}]}
            }
        ],
        "edges": [
            {
                "id": "e1",
                "source": "process-1",
                "target": "database-1",
                "type": "custom",
                "animated": true,
                "style": {"strokeWidth": 2},
                "markerEnd": {"type": "arrowclosed"},
                "data": {"text": "writes", "pathType": "step"},
                "zIndex": 3
            }
        ],
        "viewport": {"x": 12.5, "y": -4, "zoom": 0.75}
    })
}

fn two_node_service() -> (MapperService, String, String) {
    let mut service = MapperService::new();
    let a = service
        .drop_node(NodeKind::Process, Position::new(0.0, 0.0))
        .id
        .clone();
    let b = service
        .drop_node(NodeKind::Database, Position::new(300.0, 200.0))
        .id
        .clone();
    service.update_node_label(&a, "Ingest", None, None);
    service.update_node_label(&b, "Orders", None, None);
    service
        .set_node_columns(
            &b,
            vec![Column::new("id", "int"), Column::new("placed_at", "timestamp")],
        )
        .unwrap();
    service.connect(&a, &b, None, None).unwrap();
    (service, a, b)
}

#[test]
fn test_json_round_trip_keeps_unknown_fields() {
    let original = saved_canvas();
    let document = ImportService::parse_json(&original.to_string()).unwrap();

    assert_eq!(document.nodes.len(), 2);
    assert_eq!(document.nodes[1].label(), "Orders");
    assert_eq!(document.edges[0].data.text, "writes");

    let exported = ExportService::export_json(&document).unwrap();
    let value: Value = serde_json::from_str(&exported).unwrap();

    assert_eq!(value["viewport"], original["viewport"]);
    assert_eq!(value["nodes"][0]["width"], 150);
    assert_eq!(
        value["nodes"][0]["positionAbsolute"],
        original["nodes"][0]["positionAbsolute"]
    );
    assert_eq!(value["edges"][0]["zIndex"], 3);
    assert_eq!(value["edges"][0]["data"]["pathType"], "step");
    assert_eq!(
        value["nodes"][1]["data"]["columns"],
        json!([{"name": "id", "type": "int"}])
    );

    let again = ImportService::parse_json(&exported).unwrap();
    assert_eq!(again, document);
}

#[test]
fn test_export_then_import_restores_the_canvas() {
    let (service, _, _) = two_node_service();
    let document = service.document();

    let json = ExportService::export_json(&document).unwrap();
    let mut restored = MapperService::new();
    let summary = ImportService::import_into(&mut restored, "process-map.json", &json).unwrap();

    assert_eq!(summary.format, ImportFormat::Json);
    assert_eq!((summary.nodes, summary.edges), (2, 1));
    assert_eq!(restored.document(), document);
}

#[test]
fn test_json_requires_nodes_and_edges() {
    assert!(matches!(
        ImportService::parse_json(r#"{"edges": []}"#),
        Err(ImportError::MissingField("nodes"))
    ));
    assert!(matches!(
        ImportService::parse_json(r#"{"nodes": {}, "edges": []}"#),
        Err(ImportError::MissingField("nodes"))
    ));
    assert!(matches!(
        ImportService::parse_json("not json"),
        Err(ImportError::Malformed(_))
    ));
}

#[test]
fn test_json_rejects_duplicate_node_ids() {
    let content = json!({
        "nodes": [
            {"id": "n1", "type": "process", "position": {"x": 0, "y": 0}, "data": {"label": "A"}},
            {"id": "n1", "type": "text", "position": {"x": 5, "y": 5}, "data": {"label": "B"}}
        ],
        "edges": []
    });
    assert!(matches!(
        ImportService::parse_json(&content.to_string()),
        Err(ImportError::DuplicateNodeId(id)) if id == "n1"
    ));
}

#[test]
fn test_import_drops_edges_to_missing_nodes() {
    let mut content = saved_canvas();
    content["edges"]
        .as_array_mut()
        .unwrap()
        .push(json!({"id": "e2", "source": "process-1", "target": "gone"}));

    let mut service = MapperService::new();
    let summary =
        ImportService::import_into(&mut service, "map.json", &content.to_string()).unwrap();

    assert_eq!(summary.edges, 1);
    assert_eq!(summary.dropped_edges, vec!["e2".to_string()]);
    assert_eq!(service.edges().len(), 1);
}

#[test]
fn test_import_notifications() {
    let mut service = MapperService::new();

    let err = ImportService::import_into(&mut service, "diagram.xml", "<x/>").unwrap_err();
    assert!(matches!(err, ImportError::UnsupportedFormat(_)));
    let notes = service.take_notifications();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].title, "Import Failed");
    assert!(notes[0].is_error());

    ImportService::import_into(&mut service, "map.json", &saved_canvas().to_string()).unwrap();
    let notes = service.take_notifications();
    assert_eq!(notes[0].title, "Import Successful");
    assert_eq!(
        notes[0].description,
        "JSON data has been imported successfully."
    );
    assert!(service.take_notifications().is_empty());
}

#[test]
fn test_failed_import_leaves_canvas_alone() {
    let (mut service, _, _) = two_node_service();
    let before = service.document();

    assert!(ImportService::import_into(&mut service, "map.json", r#"{"nodes": []}"#).is_err());
    assert_eq!(service.document(), before);
}

#[test]
fn test_text_import_yields_empty_diagram() {
    let (mut service, _, _) = two_node_service();
    let report = TxtExporter::export(&service.document());

    let summary = ImportService::import_into(&mut service, "map.txt", &report).unwrap();

    assert_eq!(summary.format, ImportFormat::Txt);
    assert_eq!((summary.nodes, summary.edges), (0, 0));
    assert!(service.document().is_empty());
    assert_eq!(
        service.take_notifications()[0].description,
        "C4 model data has been imported successfully."
    );
}

#[test]
fn test_txt_report() {
    let (service, _, _) = two_node_service();
    let report = ExportService::export_txt(&service.document());

    assert_eq!(
        report,
        "C4 Diagram:\n\
         \n\
         Components:\n\
         - Ingest (process)\n\
         - Orders (database)\n  Columns:\n    - id: int\n    - placed_at: timestamp\n\
         \n\
         Relationships:\n\
         - Ingest -> Orders\n"
    );
}

#[test]
fn test_txt_report_lists_one_line_per_edge() {
    let (mut service, a, b) = two_node_service();
    let c = service
        .drop_node(NodeKind::Application, Position::new(600.0, 0.0))
        .id
        .clone();
    service.connect(&b, &c, None, None).unwrap();
    service.connect(&a, &c, None, None).unwrap();

    let report = ExportService::export_txt(&service.document());
    let relationships: Vec<&str> = report
        .split("Relationships:\n")
        .nth(1)
        .unwrap()
        .lines()
        .collect();

    assert_eq!(
        relationships,
        vec![
            "- Ingest -> Orders",
            "- Orders -> Application",
            "- Ingest -> Application"
        ]
    );
}

#[test]
fn test_txt_report_skips_edges_with_missing_endpoints() {
    let mut ingest = Node::new(NodeKind::Process, Position::new(0.0, 0.0));
    ingest.data.set_label("Ingest".to_string());
    let mut orders = Node::new(NodeKind::Application, Position::new(0.0, 200.0));
    orders.data.set_label("Orders".to_string());

    let edges = vec![
        Edge::new(ingest.id.clone(), orders.id.clone(), None, None),
        Edge::new(ingest.id.clone(), "process-missing", None, None),
        Edge::new("database-missing", orders.id.clone(), None, None),
    ];
    let document = DiagramDocument::new(vec![ingest, orders], edges);

    assert_eq!(
        TxtExporter::export(&document),
        "C4 Diagram:\n\nComponents:\n- Ingest (process)\n- Orders (application)\n\nRelationships:\n- Ingest -> Orders\n"
    );
}

#[test]
fn test_png_export_is_sized_to_the_nodes() {
    let (service, _, _) = two_node_service();
    let artifact = ExportService::export(&service.document(), ExportFormat::Png).unwrap();

    assert_eq!(artifact.content_type(), "image/png");
    assert_eq!(artifact.file_name(), "process-map.png");
    assert_eq!(artifact.bytes[..8], PNG_MAGIC);

    let decoded = image::load_from_memory(&artifact.bytes).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (530, 330));
}

#[test]
fn test_png_export_of_empty_canvas() {
    let bytes = PngExporter::export(&DiagramDocument::default()).unwrap();
    assert_eq!(bytes[..8], PNG_MAGIC);
}

#[test]
fn test_png_export_refuses_huge_canvas() {
    let mut service = MapperService::new();
    service.drop_node(NodeKind::Process, Position::new(0.0, 0.0));
    service.drop_node(NodeKind::Process, Position::new(20_000.0, 0.0));

    assert!(matches!(
        ExportService::export(&service.document(), ExportFormat::Png),
        Err(ExportError::TooLarge { .. })
    ));
}

#[test]
fn test_export_format_names() {
    assert_eq!("json".parse::<ExportFormat>(), Ok(ExportFormat::Json));
    assert!("svg".parse::<ExportFormat>().is_err());
    assert_eq!(ExportFormat::Txt.file_name(), "process-map.txt");
    assert_eq!(ExportFormat::Json.content_type(), "application/json");
}
