use std::error;

use crate::domain::error::ErrorResponse;
use crate::domain::error::ErrorResponse::{
    EndpointNotFoundError, MethodNotAllowedError, PayloadTooLargeError,
};
use crate::domain::query;
use crate::domain::student::StudentPayload;
use crate::observability::propagators::HyperHeaderExtractor;
use crate::repository::StudentRepository;
use crate::response_handler::{transform, ResultResponse};
use crate::service::{
    create_student, delete_student, get_student, list_students, list_students_paged,
    search_students, search_students_paged, update_student,
};
use http_body_util::{combinators::BoxBody, BodyExt, Full, LengthLimitError, Limited};
use hyper::body::{Body, Bytes};
use hyper::{Method, Request, Response, StatusCode};
use opentelemetry::Context;
use tracing::{debug, instrument};
use tracing_opentelemetry::OpenTelemetrySpanExt;

/// What every request handler needs: the store and the body size limit.
#[derive(Debug)]
pub struct AppContext<R> {
    pub repository: R,
    pub max_body_bytes: usize,
}

#[instrument(skip_all, fields(method = %req.method(), path = %req.uri().path()))]
pub async fn router<B, R>(req: Request<B>, context: &AppContext<R>) -> ResultResponse
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn error::Error + Send + Sync>>,
    R: StudentRepository,
{
    let parent: Context = opentelemetry::global::get_text_map_propagator(|propagator| {
        propagator.extract(&HyperHeaderExtractor(req.headers()))
    });
    tracing::Span::current().set_parent(parent);

    let method = req.method().clone();
    let path = req.uri().path().to_owned();
    let params = query::decode(req.uri().query());
    let segments: Vec<&str> = path.trim_matches('/').split('/').collect();
    let repository = &context.repository;
    debug!("Routing request");

    match (&method, segments.as_slice()) {
        (&Method::GET, ["private", "status"]) => Ok(Response::new(full("OK"))),
        (&Method::GET, [""]) => {
            let no_content = Response::builder()
                .status(StatusCode::NO_CONTENT)
                .body(full(Bytes::new()))?;
            Ok(no_content)
        }
        (&Method::GET, ["api", "students"]) => transform(list_students(repository).await),
        (&Method::GET, ["api", "students", "paged"]) => match params.page_request() {
            Ok(request) => transform(list_students_paged(repository, request).await),
            Err(e) => e.handle(),
        },
        (&Method::GET, ["api", "students", "search"]) => match params.required("name") {
            Ok(name) => transform(search_students(repository, name).await),
            Err(e) => e.handle(),
        },
        (&Method::GET, ["api", "students", "search", "paged"]) => {
            match params.required("name").and_then(|name| Ok((name, params.page_request()?))) {
                Ok((name, request)) => {
                    transform(search_students_paged(repository, name, request).await)
                }
                Err(e) => e.handle(),
            }
        }
        (&Method::GET, ["api", "students", id]) => match parse_id(id) {
            Ok(id) => transform(get_student(repository, id).await),
            Err(e) => e.handle(),
        },
        (&Method::POST, ["api", "students"]) => {
            match read_payload(req.into_body(), context.max_body_bytes).await {
                Ok(payload) => transform(create_student(repository, payload).await),
                Err(e) => e.handle(),
            }
        }
        (&Method::PUT, ["api", "students", id]) => {
            let id = match parse_id(id) {
                Ok(id) => id,
                Err(e) => return e.handle(),
            };
            match read_payload(req.into_body(), context.max_body_bytes).await {
                Ok(payload) => transform(update_student(repository, id, payload).await),
                Err(e) => e.handle(),
            }
        }
        (&Method::DELETE, ["api", "students", id]) => match parse_id(id) {
            Ok(id) => transform(delete_student(repository, id).await),
            Err(e) => e.handle(),
        },
        (_, ["api", "students"]) | (_, ["api", "students", _]) => MethodNotAllowedError {}.handle(),
        _ => EndpointNotFoundError {}.handle(),
    }
}

fn parse_id(raw: &str) -> Result<u64, ErrorResponse> {
    str::parse::<u64>(raw)
        .map_err(|_| ErrorResponse::bad_request(format!("Invalid student id: '{raw}'")))
}

async fn read_payload<B>(body: B, limit: usize) -> Result<StudentPayload, ErrorResponse>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn error::Error + Send + Sync>>,
{
    let bytes = Limited::new(body, limit)
        .collect()
        .await
        .map_err(|e| {
            if e.downcast_ref::<LengthLimitError>().is_some() {
                PayloadTooLargeError {}
            } else {
                ErrorResponse::bad_request(format!("Could not read request body: {e}"))
            }
        })?
        .to_bytes();
    serde_json::from_slice(&bytes)
        .map_err(|e| ErrorResponse::bad_request(format!("Malformed request body: {e}")))
}

pub fn full<T: Into<Bytes>>(chunk: T) -> BoxBody<Bytes, hyper::Error> {
    Full::new(chunk.into())
        .map_err(|never| match never {})
        .boxed()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image_service::tests::png;
    use crate::repository::memory_repository::MemoryStudentRepository;
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine as _;
    use serde_json::{json, Value};

    fn context() -> AppContext<MemoryStudentRepository> {
        AppContext {
            repository: MemoryStudentRepository::new(),
            max_body_bytes: 1024 * 1024,
        }
    }

    async fn send(
        context: &AppContext<MemoryStudentRepository>,
        method: Method,
        uri: &str,
        body: Bytes,
    ) -> (StatusCode, Value) {
        let req = Request::builder()
            .method(method)
            .uri(uri)
            .body(Full::new(body))
            .unwrap();
        let response = router(req, context).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    async fn call(
        context: &AppContext<MemoryStudentRepository>,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let bytes = body
            .map(|value| Bytes::from(serde_json::to_vec(&value).unwrap()))
            .unwrap_or_default();
        send(context, method, uri, bytes).await
    }

    fn student(name: &str) -> Value {
        json!({ "name": name, "birthDate": "2001-05-17", "mobileNo": "555-0199" })
    }

    #[tokio::test]
    async fn status_endpoint() {
        let context = context();
        let req = Request::builder()
            .uri("/private/status")
            .body(Full::new(Bytes::new()))
            .unwrap();
        let response = router(req, &context).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(bytes, Bytes::from("OK"));
    }

    #[tokio::test]
    async fn create_read_update_delete() {
        let context = context();

        let mut body = student("Ada");
        body["photoBase64"] = json!(STANDARD.encode(png(1000, 500)));
        let (status, created) = call(&context, Method::POST, "/api/students", Some(body)).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["success"], json!(true));
        assert_eq!(created["message"], json!("Student created successfully"));
        assert_eq!(created["data"]["id"], json!(1));
        assert_eq!(created["data"]["birthDate"], json!("2001-05-17"));
        let photo = created["data"]["photoBase64"].as_str().unwrap().to_string();
        let stored = STANDARD.decode(&photo).unwrap();
        let image = image::load_from_memory(&stored).unwrap();
        assert_eq!((image.width(), image.height()), (300, 150));

        let (status, fetched) = call(&context, Method::GET, "/api/students/1", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched["message"], json!("Student retrieved successfully"));
        assert_eq!(fetched["data"]["photoBase64"], json!(photo));

        let mut body = student("Ada Lovelace");
        body["photoBase64"] = json!("");
        let (status, updated) = call(&context, Method::PUT, "/api/students/1", Some(body)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["data"]["name"], json!("Ada Lovelace"));
        assert_eq!(updated["data"]["photoBase64"], json!(photo));

        let (status, deleted) = call(&context, Method::DELETE, "/api/students/1", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(deleted["message"], json!("Student deleted successfully"));
        assert_eq!(deleted["data"], Value::Null);

        let (status, missing) = call(&context, Method::GET, "/api/students/1", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(missing["success"], json!(false));
        assert_eq!(missing["message"], json!("Student not found with id: '1'"));
    }

    #[tokio::test]
    async fn list_search_and_pages() {
        let context = context();
        for name in ["Ada", "Grace", "Adele", "Linus", "Adrian", "Alan"] {
            let (status, _) = call(&context, Method::POST, "/api/students", Some(student(name))).await;
            assert_eq!(status, StatusCode::CREATED);
        }

        let (_, all) = call(&context, Method::GET, "/api/students", None).await;
        assert_eq!(all["data"].as_array().unwrap().len(), 6);

        let (_, page) = call(&context, Method::GET, "/api/students/paged", None).await;
        assert_eq!(page["data"]["content"].as_array().unwrap().len(), 5);
        assert_eq!(page["data"]["currentPage"], json!(0));
        assert_eq!(page["data"]["totalPages"], json!(2));
        assert_eq!(page["data"]["totalItems"], json!(6));
        assert_eq!(page["data"]["pageSize"], json!(5));

        let (_, found) = call(&context, Method::GET, "/api/students/search?name=AD", None).await;
        let names: Vec<&str> = found["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|dto| dto["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["Ada", "Adele", "Adrian"]);

        let (_, found) = call(
            &context,
            Method::GET,
            "/api/students/search/paged?name=ad&page=1&size=2",
            None,
        )
        .await;
        assert_eq!(found["data"]["content"][0]["name"], json!("Adrian"));
        assert_eq!(found["data"]["totalPages"], json!(2));
    }

    #[tokio::test]
    async fn bad_requests() {
        let context = context();

        let (status, body) = call(&context, Method::GET, "/api/students/search", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], json!("Required parameter 'name' is not present"));

        let (status, _) = call(&context, Method::GET, "/api/students/paged?size=0", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = call(&context, Method::GET, "/api/students/abc", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = send(
            &context,
            Method::POST,
            "/api/students",
            Bytes::from_static(b"{not json"),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], json!(false));
    }

    #[tokio::test]
    async fn validation_errors_are_listed() {
        let context = context();
        let (status, body) = call(
            &context,
            Method::POST,
            "/api/students",
            Some(json!({ "name": "", "mobileNo": "1" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], json!("Validation failed"));
        assert_eq!(
            body["data"],
            json!({ "name": "Name cannot be empty", "birthDate": "Birth date cannot be empty" })
        );
    }

    #[tokio::test]
    async fn oversized_body_is_rejected() {
        let context = AppContext {
            repository: MemoryStudentRepository::new(),
            max_body_bytes: 16,
        };
        let (status, body) =
            call(&context, Method::POST, "/api/students", Some(student("Ada"))).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(body["message"], json!("Request body too large"));
    }

    #[tokio::test]
    async fn unknown_routes() {
        let context = context();
        let (status, _) = call(&context, Method::GET, "/nowhere", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = call(&context, Method::PATCH, "/api/students/1", None).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);

        let (status, _) = call(&context, Method::GET, "/", None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
    }
}
