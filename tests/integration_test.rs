// Integration tests for the expense client
//
// These drive the full stack (commands, state containers, access objects,
// HTTP client and credential store) against mocked auth and API servers.

use mockito::{Matcher, Server, ServerGuard};
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;

use expense_client::{
    auth::{CredentialStore, MemoryCredentialStore, Profile, SqliteCredentialStore},
    commands::App,
    config::{CategoryCommand, CategoryFields, Command, Config, ExpenseCommand},
    error::SESSION_EXPIRED_MESSAGE,
    state,
};

// ==================================================================================================
// Test Helpers
// ==================================================================================================

fn test_config(api: &ServerGuard, auth: &ServerGuard) -> Config {
    Config {
        api_base_url: api.url(),
        auth_base_url: auth.url(),
        http_request_timeout: 5_000,
        credentials_db_file: PathBuf::from("unused.sqlite3"),
        log_level: "warn".to_string(),
    }
}

fn alice() -> Profile {
    Profile {
        id: "1".to_string(),
        login: "alice".to_string(),
    }
}

fn signed_in_store() -> Arc<MemoryCredentialStore> {
    Arc::new(MemoryCredentialStore::with_session("tok", &alice()).expect("seed store"))
}

async fn run(app: &App, command: Command) -> anyhow::Result<String> {
    let mut out = Vec::new();
    app.run(command, &mut out).await?;
    Ok(String::from_utf8(out).expect("utf-8 output"))
}

async fn mock_login(auth: &mut ServerGuard) -> mockito::Mock {
    auth.mock("POST", "/api/login")
        .match_body(Matcher::Json(json!({"login": "alice", "password": "secret"})))
        .with_status(200)
        .with_body(r#"{"perfil":{"id":"1","login":"alice"},"accessToken":"tok"}"#)
        .create_async()
        .await
}

// ==================================================================================================
// Session
// ==================================================================================================

#[tokio::test]
async fn test_login_then_whoami() {
    let api = Server::new_async().await;
    let mut auth = Server::new_async().await;
    let login = mock_login(&mut auth).await;

    let store = Arc::new(MemoryCredentialStore::new());
    let app = App::with_store(&test_config(&api, &auth), store.clone()).unwrap();

    let output = run(
        &app,
        Command::Login {
            login: "alice".to_string(),
            password: Some("secret".to_string()),
        },
    )
    .await
    .unwrap();
    assert_eq!(output, "Logged in as alice\n");

    assert!(app.auth.is_authenticated().await);
    assert_eq!(store.token().unwrap().as_deref(), Some("tok"));
    assert_eq!(store.profile().unwrap(), Some(alice()));
    assert_eq!(run(&app, Command::Whoami).await.unwrap(), "alice (id 1)\n");

    login.assert_async().await;
}

#[tokio::test]
async fn test_invalid_credentials_leave_store_empty() {
    let api = Server::new_async().await;
    let mut auth = Server::new_async().await;
    auth.mock("POST", "/api/login")
        .with_status(401)
        .create_async()
        .await;

    let store = Arc::new(MemoryCredentialStore::new());
    let app = App::with_store(&test_config(&api, &auth), store.clone()).unwrap();

    let err = run(
        &app,
        Command::Login {
            login: "alice".to_string(),
            password: Some("nope".to_string()),
        },
    )
    .await
    .unwrap_err();

    assert_eq!(err.to_string(), "Invalid login or password");
    assert_eq!(store.token().unwrap(), None);
    assert!(!app.auth.is_authenticated().await);
}

#[tokio::test]
async fn test_registration_rules_checked_before_request() {
    let api = Server::new_async().await;
    let mut auth = Server::new_async().await;
    let register = auth
        .mock("POST", "/api/register")
        .expect(0)
        .create_async()
        .await;

    let app = App::with_store(
        &test_config(&api, &auth),
        Arc::new(MemoryCredentialStore::new()),
    )
    .unwrap();

    let err = run(
        &app,
        Command::Register {
            login: "al".to_string(),
            password: Some("secret".to_string()),
        },
    )
    .await
    .unwrap_err();

    assert!(err.to_string().contains("at least 3"));
    register.assert_async().await;
}

#[tokio::test]
async fn test_session_survives_restart_with_sqlite_store() {
    let api = Server::new_async().await;
    let mut auth = Server::new_async().await;
    mock_login(&mut auth).await;

    let dir = std::env::temp_dir().join(format!("expense-client-it-{}", uuid::Uuid::new_v4()));
    let db = dir.join("credentials.sqlite3");
    let mut config = test_config(&api, &auth);
    config.credentials_db_file = db.clone();

    {
        let app = App::new(&config).unwrap();
        run(
            &app,
            Command::Login {
                login: "alice".to_string(),
                password: Some("secret".to_string()),
            },
        )
        .await
        .unwrap();
    }

    // Restored from disk without contacting the auth service
    let app = App::new(&config).unwrap();
    assert!(app.auth.is_authenticated().await);
    assert_eq!(app.auth.profile().await, Some(alice()));

    run(&app, Command::Logout).await.unwrap();
    let reopened = SqliteCredentialStore::open(&db).unwrap();
    assert_eq!(reopened.token().unwrap(), None);

    let _ = std::fs::remove_dir_all(dir);
}

#[tokio::test]
async fn test_resource_commands_require_session() {
    let api = Server::new_async().await;
    let auth = Server::new_async().await;
    let app = App::with_store(
        &test_config(&api, &auth),
        Arc::new(MemoryCredentialStore::new()),
    )
    .unwrap();

    let err = run(&app, Command::Categories(CategoryCommand::List))
        .await
        .unwrap_err();
    assert!(err.to_string().starts_with("Not logged in"));
}

// ==================================================================================================
// Categories and expenses
// ==================================================================================================

#[tokio::test]
async fn test_create_category_then_expense_then_overview() {
    let mut api = Server::new_async().await;
    let auth = Server::new_async().await;

    api.mock("POST", "/api/categorias")
        .match_header("authorization", "Bearer tok")
        .match_body(Matcher::Json(json!({"nome": "Food", "gastoMensal": 300.0})))
        .with_status(201)
        .with_body(r#"{"id":"c1","nome":"Food","gastoMensal":300,"gastoAtual":0,"totalGastos":0}"#)
        .create_async()
        .await;
    api.mock("GET", "/api/gastos")
        .with_status(200)
        .with_body(r#"[{"id":"e1","nome":"Taxi","valor":20,"categoriaId":"c1"}]"#)
        .create_async()
        .await;

    let app = App::with_store(&test_config(&api, &auth), signed_in_store()).unwrap();

    let output = run(
        &app,
        Command::Categories(CategoryCommand::Create {
            name: "  Food ".to_string(),
            fields: CategoryFields {
                budget: Some(300.0),
                ..CategoryFields::default()
            },
        }),
    )
    .await
    .unwrap();
    assert_eq!(output, "Created category Food (c1)\n");
    let names: Vec<_> = app
        .categories
        .categories()
        .await
        .into_iter()
        .map(|c| c.name)
        .collect();
    assert_eq!(names, vec!["Food"]);

    run(&app, Command::Expenses(ExpenseCommand::List { category: None }))
        .await
        .unwrap();

    api.mock("POST", "/api/gastos")
        .match_body(Matcher::Json(
            json!({"nome": "Lunch", "valor": 12.5, "categoriaId": "c1"}),
        ))
        .with_status(201)
        .with_body(r#"{"id":"e2","nome":"Lunch","valor":12.5,"categoriaId":"c1","categoriaNome":"Food"}"#)
        .create_async()
        .await;

    run(
        &app,
        Command::Expenses(ExpenseCommand::Create {
            name: "Lunch".to_string(),
            amount: 12.5,
            category: "c1".to_string(),
            description: None,
        }),
    )
    .await
    .unwrap();

    let ids: Vec<_> = app
        .expenses
        .expenses()
        .await
        .into_iter()
        .map(|e| e.id)
        .collect();
    assert_eq!(ids, vec!["e2", "e1"]);
    assert_eq!(app.expenses.total(Some("c1")).await, 32.5);
}

#[tokio::test]
async fn test_overview_refreshes_both_lists() {
    let mut api = Server::new_async().await;
    let auth = Server::new_async().await;

    let categories = api
        .mock("GET", "/api/categorias")
        .with_status(200)
        .with_body(
            r#"[{"id":"c1","nome":"Food","gastoMensal":100,"gastoAtual":150,"totalGastos":2},
                {"id":"c2","nome":"Fun","gastoMensal":0,"gastoAtual":10,"totalGastos":1}]"#,
        )
        .expect(1)
        .create_async()
        .await;
    let expenses = api
        .mock("GET", "/api/gastos")
        .with_status(200)
        .with_body(
            r#"[{"id":"e1","nome":"A","valor":100,"categoriaId":"c1"},
                {"id":"e2","nome":"B","valor":50,"categoriaId":"c1"},
                {"id":"e3","nome":"C","valor":10,"categoriaId":"c2"}]"#,
        )
        .expect(1)
        .create_async()
        .await;

    let app = App::with_store(&test_config(&api, &auth), signed_in_store()).unwrap();
    let output = run(&app, Command::Overview).await.unwrap();

    assert!(output.contains("Over budget: Food, Fun"));
    assert!(output.contains("3 expenses, total spent 160.00"));
    assert!(output.contains("(100%)"));
    assert!(!app.categories.loading().await);
    assert!(!app.expenses.loading().await);

    categories.assert_async().await;
    expenses.assert_async().await;
}

#[tokio::test]
async fn test_refresh_all_reports_each_side() {
    let mut api = Server::new_async().await;
    let auth = Server::new_async().await;
    api.mock("GET", "/api/categorias")
        .with_status(200)
        .with_body("[]")
        .create_async()
        .await;
    api.mock("GET", "/api/gastos")
        .with_status(500)
        .create_async()
        .await;

    let app = App::with_store(&test_config(&api, &auth), signed_in_store()).unwrap();
    let (categories, expenses) = state::refresh_all(&app.categories, &app.expenses).await;

    assert_eq!(categories.data(), Some(vec![]));
    assert_eq!(expenses.error(), Some("Failed to list expenses"));
    assert_eq!(app.categories.error().await, None);
    assert_eq!(
        app.expenses.error().await.as_deref(),
        Some("Failed to list expenses")
    );
}

#[tokio::test]
async fn test_delete_referenced_category_is_refused() {
    let mut api = Server::new_async().await;
    let auth = Server::new_async().await;
    api.mock("GET", "/api/categorias")
        .with_status(200)
        .with_body(r#"[{"id":"c1","nome":"Food"}]"#)
        .create_async()
        .await;
    api.mock("DELETE", "/api/categorias/c1")
        .with_status(400)
        .with_body(r#"{"message":"categoria possui gastos"}"#)
        .create_async()
        .await;

    let app = App::with_store(&test_config(&api, &auth), signed_in_store()).unwrap();
    run(&app, Command::Categories(CategoryCommand::List))
        .await
        .unwrap();

    let err = run(
        &app,
        Command::Categories(CategoryCommand::Delete {
            id: "c1".to_string(),
        }),
    )
    .await
    .unwrap_err();

    assert_eq!(err.to_string(), "categoria possui gastos");
    assert_eq!(app.categories.categories().await.len(), 1);
    assert!(app.auth.is_authenticated().await);
}

// ==================================================================================================
// Session expiry
// ==================================================================================================

#[tokio::test]
async fn test_unauthorized_response_ends_session() {
    let mut api = Server::new_async().await;
    let auth = Server::new_async().await;
    let list = api
        .mock("GET", "/api/gastos")
        .with_status(401)
        .expect(1)
        .create_async()
        .await;

    let store = signed_in_store();
    let app = App::with_store(&test_config(&api, &auth), store.clone()).unwrap();

    let err = run(&app, Command::Expenses(ExpenseCommand::List { category: None }))
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), SESSION_EXPIRED_MESSAGE);
    assert_eq!(store.token().unwrap(), None);
    assert_eq!(store.profile().unwrap(), None);
    assert!(!app.auth.is_authenticated().await);

    // Next command is refused locally; no second request goes out
    let err = run(&app, Command::Expenses(ExpenseCommand::List { category: None }))
        .await
        .unwrap_err();
    assert!(err.to_string().starts_with("Not logged in"));
    list.assert_async().await;
}

#[tokio::test]
async fn test_unreachable_api_reports_network_error() {
    let auth = Server::new_async().await;
    let config = Config {
        api_base_url: "http://127.0.0.1:1".to_string(),
        auth_base_url: auth.url(),
        http_request_timeout: 2_000,
        credentials_db_file: PathBuf::from("unused.sqlite3"),
        log_level: "warn".to_string(),
    };
    let store = signed_in_store();
    let app = App::with_store(&config, store.clone()).unwrap();

    let err = run(&app, Command::Overview).await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "Server is not responding. Check your connection."
    );
    // A network failure is not an authentication failure
    assert!(store.token().unwrap().is_some());
    assert!(app.auth.is_authenticated().await);
}
