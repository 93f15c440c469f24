//! Request routing and persistence

use std::sync::Arc;

use enrollkv::clock::ManualClock;
use enrollkv::error::{EnrollError, ErrorKind};
use enrollkv::{Reply, Request, StudentPatch, StudentService};
use tempfile::TempDir;

use super::{config_for, payload, setup, SequentialIds};

#[test]
fn test_execute_routes_mutations_and_queries() {
    let fx = setup();

    let created = fx
        .service
        .execute(Request::Create { payload: payload("Alice", "CS", "2022-09-01") })
        .unwrap()
        .into_student()
        .unwrap();

    let fetched = fx
        .service
        .execute(Request::Get { id: created.id.clone() })
        .unwrap();
    assert_eq!(fetched, Reply::Student(created.clone()));

    let updated = fx
        .service
        .execute(Request::Update {
            id: created.id.clone(),
            patch: StudentPatch::new().major("Math"),
        })
        .unwrap()
        .into_student()
        .unwrap();
    assert_eq!(updated.major, "Math");

    let count = fx
        .service
        .execute(Request::CountByMajor { major: "Math".into() })
        .unwrap();
    assert_eq!(count.count(), Some(1));

    fx.service.execute(Request::Delete { id: created.id.clone() }).unwrap();
    let list = fx.service.execute(Request::List).unwrap().into_students().unwrap();
    assert!(list.is_empty());
}

#[test]
fn test_execute_surfaces_error_kinds() {
    let fx = setup();

    let err = fx.service.execute(Request::Get { id: "nope".into() }).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let err = fx
        .service
        .execute(Request::Paginate { page: 0, page_size: 1 })
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
}

#[test]
fn test_request_json_shape() {
    let request: Request =
        serde_json::from_str(r#"{"op":"paginate","page":2,"pageSize":3}"#).unwrap();
    assert_eq!(request, Request::Paginate { page: 2, page_size: 3 });

    let request: Request = serde_json::from_str(
        r#"{"op":"update","id":"s001","patch":{"enrollmentDate":"2023-01-01"}}"#,
    )
    .unwrap();
    assert_eq!(
        request,
        Request::Update {
            id: "s001".into(),
            patch: StudentPatch::new().enrollment_date("2023-01-01"),
        }
    );
    assert_eq!(request.name(), "update");
}

#[test]
fn test_reply_serializes_as_bare_payload() {
    let fx = setup();
    fx.service.create(payload("Alice", "CS", "2022-09-01")).unwrap();

    let reply = fx.service.execute(Request::List).unwrap();
    let json = serde_json::to_value(&reply).unwrap();

    assert_eq!(json[0]["name"], "Alice");
    assert_eq!(json[0]["enrollmentDate"], "2022-09-01");
    assert!(json[0]["updatedAt"].is_null());
    assert_eq!(serde_json::to_value(Reply::Count(3)).unwrap(), 3);
}

#[test]
fn test_records_survive_reopen() {
    let temp = TempDir::new().unwrap();
    let open = || {
        StudentService::with_collaborators(
            config_for(&temp),
            Box::new(Arc::new(ManualClock::new(1))),
            Box::new(SequentialIds::default()),
        )
        .unwrap()
    };

    let id = {
        let service = open();
        let id = service.create(payload("Alice", "CS", "2022-09-01")).unwrap().id;
        service.update_major(&id, "Physics").unwrap();
        service.close().unwrap();
        id
    };

    let service = open();
    let student = service.get(&id).unwrap();
    assert_eq!(student.major, "Physics");
    assert_eq!(student.updated_at, Some(1));
}

#[test]
fn test_date_validation_can_be_disabled() {
    let temp = TempDir::new().unwrap();
    let config = enrollkv::Config::builder()
        .data_dir(temp.path())
        .validate_enrollment_date(false)
        .build();
    let service = StudentService::open(config).unwrap();

    let created = service.create(payload("Alice", "CS", "Fall 2022")).unwrap();
    assert_eq!(created.enrollment_date, "Fall 2022");
    assert!(matches!(
        service.create(payload("Bob", "CS", "")),
        Err(EnrollError::Validation(_))
    ));
}
