//! Integration tests for the query endpoint.
//!
//! Tests cover:
//! - The same investigation asked in SQL, SPL, KQL and Sigma
//! - Inline datasets
//! - Error handling for bad dialects, sources and syntax

use axum::http::StatusCode;
use serde_json::{json, Value};

use super::common::{post_json, query, test_app};

fn usernames(response: &Value) -> Vec<String> {
    let mut names: Vec<String> = response["results"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["username"].as_str().unwrap().to_string())
        .collect();
    names.sort();
    names
}

#[tokio::test]
async fn test_sql_projection_keeps_only_selected_columns() {
    let (app, _state) = test_app();

    let (status, response) = query(
        app,
        "sql",
        "auth_logs",
        "SELECT username, source_ip FROM auth_logs WHERE action = 'failed_login';",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["returned_count"], 9);
    assert_eq!(response["columns"], json!(["username", "source_ip"]));
    for record in response["results"].as_array().unwrap() {
        assert_eq!(record.as_object().unwrap().len(), 2);
    }
}

#[tokio::test]
async fn test_sql_group_order_limit() {
    let (app, _state) = test_app();

    let (status, response) = query(
        app,
        "sql",
        "auth_logs",
        "SELECT username, COUNT(*) AS failures FROM auth_logs WHERE action = 'failed_login' \
         GROUP BY username ORDER BY failures DESC LIMIT 2",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        response["results"],
        json!([
            {"username": "admin", "failures": 4},
            {"username": "root", "failures": 3}
        ])
    );
}

#[tokio::test]
async fn test_spl_top_offender() {
    let (app, _state) = test_app();

    let (status, response) = query(
        app,
        "spl",
        "auth_logs",
        "search action=failed_login | stats count by username | sort -count | head 1",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["results"], json!([{"username": "admin", "count": 4}]));
}

#[tokio::test]
async fn test_kql_where_after_summarize_filters_groups() {
    let (app, _state) = test_app();

    let (status, response) = query(
        app,
        "kql",
        "auth_logs",
        r#"auth_logs | where action == "failed_login" | summarize count() by username | where count > 2"#,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(usernames(&response), vec!["admin", "root"]);
    let ops: Vec<&str> = response["pipeline"]
        .as_array()
        .unwrap()
        .iter()
        .map(|op| op["op"].as_str().unwrap())
        .collect();
    assert_eq!(ops, vec!["filter", "group_aggregate", "filter"]);
}

#[tokio::test]
async fn test_sigma_rules() {
    let (app, _state) = test_app();

    let rule = "title: Brute force\n\
                detection:\n  \
                  selection:\n    \
                    action: failed_login\n  \
                  condition: selection\n";
    let (status, response) = query(app.clone(), "sigma", "auth_logs", rule).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["returned_count"], 9);

    let rule = "title: Encoded PowerShell\n\
                detection:\n  \
                  selection:\n    \
                    process_name|endswith: .exe\n    \
                    command_line|contains: -enc\n  \
                  condition: selection\n";
    let (status, response) = query(app, "sigma", "process_events", rule).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["returned_count"], 1);
    assert_eq!(response["results"][0]["process_name"], "powershell.exe");
}

#[tokio::test]
async fn test_numeric_comparison_on_network_traffic() {
    let (app, _state) = test_app();

    let (status, response) = query(
        app,
        "sql",
        "network_traffic",
        "SELECT src_ip, bytes FROM network_traffic WHERE bytes > 100000 ORDER BY bytes DESC",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let bytes: Vec<i64> = response["results"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["bytes"].as_i64().unwrap())
        .collect();
    assert_eq!(bytes, vec![1_048_576, 734_003, 250_880]);
}

#[tokio::test]
async fn test_inline_dataset() {
    let (app, _state) = test_app();

    let body = json!({
        "query": "search action=failed_login | stats count by user | sort -count | head 1",
        "dialect": "spl",
        "dataset": [
            {"user": "a", "action": "failed_login"},
            {"user": "b", "action": "failed_login"},
            {"user": "a", "action": "failed_login"},
            {"user": "c", "action": "successful_login"}
        ]
    });
    let (status, response) = post_json(app, "/api/v1/query", body).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["results"], json!([{"user": "a", "count": 2}]));
}

#[tokio::test]
async fn test_query_errors() {
    let (app, _state) = test_app();

    let (status, response) = query(app.clone(), "sql", "auth_logs", "UPDATE auth_logs SET x = 1").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["error"], "parse_error");

    let (status, response) = query(app.clone(), "sigma", "auth_logs", "title: nothing here").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["error"], "parse_error");

    let (status, response) = query(app.clone(), "eql", "auth_logs", "any where true").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["error"], "unsupported_dialect");

    let (status, response) = query(app.clone(), "spl", "firewall_logs", "search x=1").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(response["error"], "unknown_data_source");

    let (status, response) = query(app, "spl", "auth_logs", "").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(response["error"], "validation_error");
}
