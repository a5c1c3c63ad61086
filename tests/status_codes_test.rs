//! How every operation interprets each class of status code.

mod common;

use common::*;
use integrations_document_library::{
    ApiError, ApiResult, CloudPath, CreateLibraryRequest, DocumentLibraryClient,
    DocumentLibraryResult, FileUpload, ImportFilesRequest, ImportRecord, Operation,
    RequestOptions, UpsertFileTagsRequest,
};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use wiremock::matchers::any;
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Debug)]
enum Outcome {
    Success,
    NoContent,
    Failure(ApiError),
}

fn classify<T>(result: ApiResult<T>) -> Outcome {
    match result {
        ApiResult::Success(_) => Outcome::Success,
        ApiResult::NoContent => Outcome::NoContent,
        ApiResult::Failure(error) => Outcome::Failure(error),
    }
}

/// A body the operation accepts on 200.
fn success_body(operation: Operation) -> Value {
    match operation {
        Operation::CreateLibrary | Operation::GetLibrary => library_json(),
        Operation::ListLibraries => json!([library_json()]),
        Operation::SearchLibrary => json!([]),
        Operation::GetItemInfo | Operation::UploadFile => file_json("a.txt"),
        Operation::ListFileTags => json!({ "status": "paid" }),
        Operation::ListChildren => json!([file_json("a.txt")]),
        Operation::Exists => json!({ "exists": true }),
        Operation::CreateDirectory => directory_json("docs"),
        Operation::ImportFiles => json!([file_json("a.txt")]),
        Operation::AntiVirusScanFile => json!({ "result": "Clean" }),
        _ => json!({}),
    }
}

async fn call(client: &DocumentLibraryClient, operation: Operation) -> DocumentLibraryResult<Outcome> {
    let id = library_id();
    let file = CloudPath::new("/a.txt")?;
    let options = RequestOptions::default();
    let items = client.items();
    let tags = client.tags();
    let libraries = client.libraries();

    let outcome = match operation {
        Operation::CreateLibrary => {
            classify(libraries.create_result(&CreateLibraryRequest::new("x"), &options).await?)
        }
        Operation::ListLibraries => classify(libraries.list_result(&options).await?),
        Operation::GetLibrary => classify(libraries.get_result(id, &options).await?),
        Operation::SearchLibrary => {
            classify(libraries.search_result(id, "*", None, &options).await?)
        }
        Operation::DownloadContent => classify(items.download_result(id, &file, &options).await?),
        Operation::GetItemInfo => classify(items.info_result(id, &file, &options).await?),
        Operation::ListFileTags => classify(tags.list_result(id, &file, &options).await?),
        Operation::UpsertFileTags => {
            let request = UpsertFileTagsRequest::new([("k", "v")]);
            classify(tags.upsert_result(id, &file, &request, &options).await?)
        }
        Operation::ClearFileTags => classify(tags.clear_result(id, &file, &options).await?),
        Operation::RemoveFileTag => classify(tags.remove_result(id, &file, "k", &options).await?),
        Operation::DeleteItem => classify(items.delete_result(id, &file, &options).await?),
        Operation::ListChildren => {
            classify(items.list_children_result(id, &CloudPath::root(), &options).await?)
        }
        Operation::Exists => classify(items.exists_result(id, &file, &options).await?),
        Operation::Copy => {
            let target = CloudPath::new("/b.txt")?;
            classify(items.copy_result(id, &file, &target, &options).await?)
        }
        Operation::Move => {
            let target = CloudPath::new("/b.txt")?;
            classify(items.move_item_result(id, &file, &target, &options).await?)
        }
        Operation::CreateDirectory => {
            let dir = CloudPath::new("/docs")?;
            classify(items.create_directory_result(id, &dir, &options).await?)
        }
        Operation::UploadFile => {
            let upload = FileUpload::new(file.clone(), "hello");
            classify(items.upload_result(id, &upload, &options).await?)
        }
        Operation::ImportFiles => {
            let request = ImportFilesRequest {
                files: vec![ImportRecord::new("a.txt", "ext-1")],
            };
            classify(items.import_result(id, None, &request, &options).await?)
        }
        Operation::AntiVirusScanFile => {
            classify(items.anti_virus_scan_result(id, &file, &options).await?)
        }
    };
    Ok(outcome)
}

async fn answer_everything(server: &MockServer, response: ResponseTemplate) {
    server.reset().await;
    Mock::given(any()).respond_with(response).mount(server).await;
}

#[tokio::test]
async fn test_ok_is_success() {
    let (server, client) = setup().await;

    for operation in Operation::ALL {
        answer_everything(
            &server,
            ResponseTemplate::new(200).set_body_json(success_body(operation)),
        )
        .await;

        let outcome = call(&client, operation).await.unwrap();
        assert!(matches!(outcome, Outcome::Success), "{operation}: {outcome:?}");
    }
}

#[tokio::test]
async fn test_no_content() {
    let (server, client) = setup().await;
    answer_everything(&server, ResponseTemplate::new(204)).await;

    for operation in Operation::ALL {
        let outcome = call(&client, operation).await.unwrap();
        assert!(matches!(outcome, Outcome::NoContent), "{operation}: {outcome:?}");
    }
}

#[tokio::test]
async fn test_documented_errors_are_failures() {
    let (server, client) = setup().await;

    for status in [400, 500] {
        answer_everything(
            &server,
            ResponseTemplate::new(status).set_body_json(error_json("Broken", "It broke")),
        )
        .await;

        for operation in Operation::ALL {
            match call(&client, operation).await.unwrap() {
                Outcome::Failure(ApiError::Domain(detail)) => {
                    assert_eq!(detail.code, "Broken", "{operation} on {status}");
                    let inner = detail.inner_error.unwrap();
                    assert_eq!(inner.codes().collect::<Vec<_>>(), vec!["PathNotFound"]);
                }
                other => panic!("{operation} on {status}: {other:?}"),
            }
        }
    }
}

#[tokio::test]
async fn test_other_status_is_unexpected() {
    let (server, client) = setup().await;

    for status in [201, 206, 409] {
        answer_everything(&server, ResponseTemplate::new(status).set_body_string("unexpected")).await;

        for operation in Operation::ALL {
            match call(&client, operation).await.unwrap() {
                Outcome::Failure(ApiError::UnexpectedStatus(err)) => {
                    assert_eq!(err.status_code, status, "{operation}");
                    assert_eq!(err.code, "UnexpectedStatusCode");
                    assert_eq!(err.target, operation.target());
                    assert_eq!(err.content.as_deref(), Some("unexpected"));
                }
                other => panic!("{operation} on {status}: {other:?}"),
            }
        }
    }
}

#[tokio::test]
async fn test_facade_raises_failure() {
    let (server, client) = setup().await;
    answer_everything(&server, ResponseTemplate::new(404)).await;

    let err = client
        .items()
        .delete(library_id(), &CloudPath::new("/a.txt").unwrap(), &RequestOptions::default())
        .await
        .unwrap_err();

    let api = err.api_error().unwrap();
    assert_eq!(api.status_code(), Some(404));
    assert_eq!(api.target(), Some("DocumentLibraryClient.DeleteItem"));
}
