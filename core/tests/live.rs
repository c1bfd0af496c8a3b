//! Runs against the real Trainingset API.
//!
//! Ignored by default. Run with
//! `TRAININGSET_API_KEY=... cargo test -p trainingset-core --test live -- --ignored --test-threads=1`.
//! Tasks and projects created here are removed again where the API allows.

use serde_json::{json, Value};
use trainingset_core::{AnnotationObject, Params, Session, TaskFilter};

fn session() -> Session {
    let api_key = std::env::var("TRAININGSET_API_KEY")
        .expect("TRAININGSET_API_KEY environment variable is not set");
    Session::new(&api_key)
}

fn task_template() -> Value {
    json!({
        "attachment_url": "http://placekitten.com/1920/1080",
        "instructions": "Lorem ipsum dolor sit amet, consectetur adipiscing elit.",
        "objects_to_annotate": [AnnotationObject::new("test", "rgba(0, 0, 0, 0)")],
    })
}

#[test]
#[ignore = "needs TRAININGSET_API_KEY and network access"]
fn create_every_task_type() {
    let session = session();

    let mut boxed = task_template();
    boxed["min_height"] = json!(0);
    boxed["min_width"] = json!(0);
    session.create_box_annotation_task(&boxed).unwrap();

    let mut line = task_template();
    line["min_vertices"] = json!(0);
    line["max_vertices"] = json!(999);
    session.create_line_annotation_task(&line).unwrap();
    session.create_polygon_annotation_task(&line).unwrap();

    session.create_point_annotation_task(&task_template()).unwrap();
    session.create_segmentation_task(&task_template()).unwrap();
    session.create_point_cloud_annotation_task(&task_template()).unwrap();

    let mut categorization = task_template();
    categorization["categories"] = json!(["category1", "category2"]);
    session.create_image_categorization_task(&categorization).unwrap();
}

#[test]
#[ignore = "needs TRAININGSET_API_KEY and network access"]
fn list_and_delete_task() {
    let session = session();

    let tasks = session.get_tasks_filtered(&TaskFilter::new().limit(1)).unwrap();
    let data = tasks["data"].as_array().unwrap();
    assert_eq!(data.len(), 1);

    let id = data[0]["_id"].as_str().unwrap();
    let result = session.delete_task(id).unwrap();
    assert_eq!(result["status"], "success");
}

#[test]
#[ignore = "needs TRAININGSET_API_KEY and network access"]
fn project_round_trip() {
    let session = session();

    session.create_project("rust sdk project").unwrap();
    let projects = session.get_projects().unwrap();
    let id = projects["data"][0]["_id"].as_str().unwrap();
    session.delete_project(id).unwrap();
}

#[test]
#[ignore = "needs network access"]
fn bad_key_is_rejected() {
    let session = Session::new("not-a-real-key");
    let err = session.get_tasks(&Params::new()).unwrap_err();
    assert!(!err.is_validation(), "{err:?}");
}
