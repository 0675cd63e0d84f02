//! End-to-end pipeline tests over the bundled petstore fixture

use std::path::Path;
use std::sync::Arc;

use clientforge::generate_sdk;
use clientforge::generation::{ArgDefault, CollectingSink, Severity, parse_spec};
use clientforge::infrastructure::openapi::resolve_refs;
use serde_json::Value;

fn fixture() -> Value {
    serde_json::from_str(include_str!("fixtures/petstore.openapi.v3.json"))
        .expect("fixture parses")
}

fn fixture_path() -> String {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures/petstore.openapi.v3.json")
        .to_string_lossy()
        .into_owned()
}

#[test]
fn test_models_parse_in_declaration_order() {
    let resolved = resolve_refs(&fixture()).unwrap();
    let parsed = parse_spec(&resolved, Arc::new(CollectingSink::new())).unwrap();

    let names: Vec<&str> = parsed.models.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec!["Category", "Pet", "Dog", "Error"]);
}

#[test]
fn test_pet_model_properties() {
    let resolved = resolve_refs(&fixture()).unwrap();
    let parsed = parse_spec(&resolved, Arc::new(CollectingSink::new())).unwrap();

    let pet = parsed.models.iter().find(|m| m.name == "Pet").unwrap();
    let prop = |name: &str| pet.properties.iter().find(|p| p.name == name).unwrap();

    assert!(prop("id").read_only);
    assert_eq!(prop("id").ty, "NotRequired[int]");
    assert_eq!(prop("name").ty, "str");
    // The expanded Category copy resolves back to the named model.
    assert_eq!(prop("category").ty, "NotRequired[Category]");
    assert_eq!(prop("photoUrls").ty, "list[str]");
    assert_eq!(
        prop("status").ty,
        "NotRequired[Literal[\"available\", \"pending\", \"sold\"]]"
    );
    assert_eq!(prop("status").default.as_deref(), Some("'available'"));
}

#[test]
fn test_dog_model_flattens_inheritance() {
    let resolved = resolve_refs(&fixture()).unwrap();
    let parsed = parse_spec(&resolved, Arc::new(CollectingSink::new())).unwrap();

    let dog = parsed.models.iter().find(|m| m.name == "Dog").unwrap();
    let names: Vec<&str> = dog.properties.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["id", "name", "category", "photoUrls", "status", "barkVolume"]
    );

    let bark = dog.properties.iter().find(|p| p.name == "barkVolume").unwrap();
    assert!(bark.required);
    assert_eq!(bark.ty, "float");
}

#[test]
fn test_operations_parse_in_declaration_order() {
    let resolved = resolve_refs(&fixture()).unwrap();
    let parsed = parse_spec(&resolved, Arc::new(CollectingSink::new())).unwrap();

    let signatures: Vec<(String, String)> = parsed
        .operations
        .iter()
        .map(|op| (op.method.clone(), op.path.clone()))
        .collect();
    assert_eq!(
        signatures,
        vec![
            ("GET".to_string(), "/pets".to_string()),
            ("POST".to_string(), "/pets".to_string()),
            ("GET".to_string(), "/pets/{pet_id}".to_string()),
            ("DELETE".to_string(), "/pets/{pet_id}".to_string()),
            ("POST".to_string(), "/pets/{pet_id}/photo".to_string()),
        ]
    );
}

#[test]
fn test_list_pets_operation() {
    let resolved = resolve_refs(&fixture()).unwrap();
    let parsed = parse_spec(&resolved, Arc::new(CollectingSink::new())).unwrap();

    let list_pets = &parsed.operations[0];
    assert_eq!(list_pets.responses.success_type, "list[Pet]");
    // Only a skipped "default" entry on the error side.
    assert_eq!(list_pets.responses.error_type, "Any");

    assert_eq!(list_pets.args.len(), 2);
    assert_eq!(list_pets.args[0].name, "limit");
    assert_eq!(list_pets.args[0].ty, "Query[int]");
    assert_eq!(list_pets.args[0].default, ArgDefault::Literal("20".to_string()));
    assert_eq!(list_pets.args[1].default, ArgDefault::Unset);

    assert_eq!(
        list_pets.doc,
        "List pets.\n\nReturns all pets, optionally filtered by status.\n\nThe pet collection."
    );
}

#[test]
fn test_create_pet_operation_body() {
    let resolved = resolve_refs(&fixture()).unwrap();
    let parsed = parse_spec(&resolved, Arc::new(CollectingSink::new())).unwrap();

    let create_pet = &parsed.operations[1];
    assert_eq!(create_pet.args.len(), 1);
    assert_eq!(create_pet.args[0].name, "json");
    assert_eq!(create_pet.args[0].ty, "Pet");
    assert_eq!(create_pet.args[0].default, ArgDefault::Required);
    assert_eq!(create_pet.responses.success_type, "Pet");
    assert_eq!(create_pet.responses.error_type, "Error");
}

#[test]
fn test_reference_deduplication_across_occurrences() {
    let resolved = resolve_refs(&fixture()).unwrap();
    let parsed = parse_spec(&resolved, Arc::new(CollectingSink::new())).unwrap();

    // Pet is referenced from four different operations; every expanded copy
    // resolves to the same model name.
    assert_eq!(parsed.operations[1].responses.success_type, "Pet");
    assert_eq!(parsed.operations[2].responses.success_type, "Pet");
    assert!(parsed.operations[0].responses.success_type.contains("Pet"));
}

#[test]
fn test_delete_and_binary_operations() {
    let resolved = resolve_refs(&fixture()).unwrap();
    let parsed = parse_spec(&resolved, Arc::new(CollectingSink::new())).unwrap();

    let delete_pet = &parsed.operations[3];
    assert_eq!(delete_pet.responses.success_type, "None");
    assert_eq!(delete_pet.responses.error_type, "Error");

    let upload_photo = &parsed.operations[4];
    assert_eq!(upload_photo.responses.success_type, "bytes");
    let body = upload_photo.args.iter().find(|a| a.name == "content").unwrap();
    assert_eq!(body.ty, "bytes");
    // Path argument sorts before the body.
    assert_eq!(upload_photo.args[0].name, "pet_id");
}

#[test]
fn test_diagnostics_report_counts() {
    let resolved = resolve_refs(&fixture()).unwrap();
    let sink = Arc::new(CollectingSink::new());
    parse_spec(&resolved, sink.clone()).unwrap();

    let infos = sink.messages(Severity::Info);
    assert!(infos.iter().any(|m| m.contains("4 models, 5 operations")));
}

#[tokio::test]
async fn test_generate_sdk_writes_package() {
    let out = tempfile::tempdir().unwrap();
    let target = out.path().join("sdk");

    let parsed = generate_sdk(&fixture_path(), &target, Arc::new(CollectingSink::new()))
        .await
        .unwrap();
    assert_eq!(parsed.metadata.project_name, "petstore-lite");

    let pyproject = std::fs::read_to_string(target.join("pyproject.toml")).unwrap();
    assert!(pyproject.contains("name = \"petstore-lite\""));
    assert!(pyproject.contains("version = \"1.0.7\""));

    let models = std::fs::read_to_string(target.join("models.py")).unwrap();
    assert!(models.contains("class Pet(TypedDict):"));
    assert!(models.contains("class Dog(TypedDict):"));

    let client = std::fs::read_to_string(target.join("client.py")).unwrap();
    assert!(client.contains("def get_pets("));
    assert!(client.contains("def post_pets_pet_id_photo("));
    assert!(client.contains("f\"/pets/{pet_id}\""));

    assert!(target.join("_base.py").exists());
}
