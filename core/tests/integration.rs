//! Full CRUD lifecycle against a live server.
//!
//! Starts `todo_server` on a random port, then exercises every client
//! operation over real HTTP using ureq.

use std::thread::JoinHandle;

use todo_core::{ApiError, CreateTodo, HttpMethod, HttpRequest, HttpResponse, TodoClient, UpdateTodo};
use todo_server::{DrainOutcome, ServeError};
use tokio::sync::oneshot;

/// Execute an `HttpRequest` using ureq and return an `HttpResponse`.
///
/// Status codes are returned as data rather than `Err` so the client does
/// the status interpretation.
fn execute(req: HttpRequest) -> HttpResponse {
    let agent = ureq::Agent::config_builder()
        .http_status_as_error(false)
        .build()
        .new_agent();

    let mut response = match (req.method, req.body) {
        (HttpMethod::Get, _) => agent.get(&req.path).call(),
        (HttpMethod::Delete, _) => agent.delete(&req.path).call(),
        (HttpMethod::Post, Some(body)) => agent
            .post(&req.path)
            .content_type("application/json")
            .send(body.as_bytes()),
        (HttpMethod::Post, None) => agent.post(&req.path).send_empty(),
        (HttpMethod::Put, Some(body)) => agent
            .put(&req.path)
            .content_type("application/json")
            .send(body.as_bytes()),
        (HttpMethod::Put, None) => agent.put(&req.path).send_empty(),
    }
    .expect("HTTP transport error");

    let status = response.status().as_u16();
    let body = response.body_mut().read_to_string().unwrap_or_default();

    HttpResponse {
        status,
        headers: Vec::new(),
        body,
    }
}

struct LiveServer {
    client: TodoClient,
    stop: oneshot::Sender<()>,
    thread: JoinHandle<Result<DrainOutcome, ServeError>>,
}

fn start_server() -> LiveServer {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();
    let (stop, stop_rx) = oneshot::channel::<()>();

    let thread = std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            todo_server::run(listener, async move {
                let _ = stop_rx.await;
            })
            .await
        })
    });

    LiveServer {
        client: TodoClient::new(&format!("http://{addr}")),
        stop,
        thread,
    }
}

#[test]
fn crud_lifecycle() {
    let server = start_server();
    let client = &server.client;

    assert!(client.parse_health(execute(client.build_health())).unwrap());
    let version = client.parse_version(execute(client.build_version())).unwrap();
    assert_eq!(version, "1.0.0");

    let todos = client.parse_list_todos(execute(client.build_list_todos())).unwrap();
    assert!(todos.is_empty(), "expected empty list");

    let req = client
        .build_create_todo(&CreateTodo {
            title: "Integration test".to_string(),
        })
        .unwrap();
    let created = client.parse_create_todo(execute(req)).unwrap();
    assert_eq!(created.id, 1);
    assert_eq!(created.title, "Integration test");
    assert!(!created.completed);
    let id = created.id;

    let fetched = client.parse_get_todo(execute(client.build_get_todo(id))).unwrap();
    assert_eq!(fetched, created);

    let req = client
        .build_update_todo(
            id,
            &UpdateTodo {
                title: "Updated title".to_string(),
                completed: true,
            },
        )
        .unwrap();
    let updated = client.parse_update_todo(execute(req)).unwrap();
    assert_eq!(updated.title, "Updated title");
    assert!(updated.completed);

    let todos = client.parse_list_todos(execute(client.build_list_todos())).unwrap();
    assert_eq!(todos.len(), 1);

    client.parse_delete_todo(execute(client.build_delete_todo(id))).unwrap();

    let err = client.parse_get_todo(execute(client.build_get_todo(id))).unwrap_err();
    assert!(matches!(err, ApiError::NotFound));

    let err = client.parse_delete_todo(execute(client.build_delete_todo(id))).unwrap_err();
    assert!(matches!(err, ApiError::NotFound));

    let todos = client.parse_list_todos(execute(client.build_list_todos())).unwrap();
    assert!(todos.is_empty(), "expected empty list after delete");

    // healthz, version, 3 lists, create, 2 gets, update, 2 deletes, and
    // this metrics call itself.
    let snapshot = client.parse_metrics(execute(client.build_metrics())).unwrap();
    assert_eq!(snapshot.requests, 12);
    assert_eq!(snapshot.total_todos, 0);

    server.stop.send(()).unwrap();
    let outcome = server.thread.join().unwrap().unwrap();
    assert_eq!(outcome, DrainOutcome::Completed);
}

#[test]
fn validation_errors_surface_as_bad_request() {
    let server = start_server();
    let client = &server.client;

    let req = client
        .build_create_todo(&CreateTodo {
            title: "   ".to_string(),
        })
        .unwrap();
    let err = client.parse_create_todo(execute(req)).unwrap_err();
    assert!(matches!(err, ApiError::BadRequest { ref body } if body == "invalid payload"));

    let mut req = client.build_get_todo(0);
    req.path = req.path.replace("/todos/0", "/todos/abc");
    let err = client.parse_get_todo(execute(req)).unwrap_err();
    assert!(matches!(err, ApiError::BadRequest { ref body } if body == "invalid id"));

    let mut req = client.build_list_todos();
    req.method = HttpMethod::Delete;
    let err = client.parse_list_todos(execute(req)).unwrap_err();
    assert!(matches!(err, ApiError::MethodNotAllowed));

    server.stop.send(()).unwrap();
    server.thread.join().unwrap().unwrap();
}
