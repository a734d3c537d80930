// crates/token-sale-harness/tests/common/mod.rs
// ============================================================================
// Module: Harness Test Fixtures
// Description: Shared fixture locations and stub servers for unit tests.
// Purpose: Keep artifact fixtures and JSON-RPC stubs in one place.
// Dependencies: tiny_http, serde_json, token-sale-harness
// ============================================================================

#![allow(
    dead_code,
    clippy::unwrap_used,
    reason = "Each test binary uses a different subset of the fixtures."
)]

use std::path::PathBuf;
use std::thread;
use std::thread::JoinHandle;

use tiny_http::Header;
use tiny_http::Response;
use tiny_http::Server;
use token_sale_harness::ContractProject;
use token_sale_harness::DeploymentArtifact;
use token_sale_harness::config::ToolchainConfig;

/// Root of the fixture Hardhat project.
pub fn fixture_project_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures").join("project")
}

/// Fixture project with default toolchain commands.
pub fn fixture_project() -> ContractProject {
    ContractProject::locate(&fixture_project_dir(), ToolchainConfig::default()).unwrap()
}

/// Parsed fixture artifact by contract name.
pub fn fixture_artifact(name: &str) -> DeploymentArtifact {
    DeploymentArtifact::load(&fixture_project().artifact_path(name)).unwrap()
}

/// Serves `responses` in order, one per request, then stops. Returns the URL
/// and a handle yielding the request bodies received.
pub fn spawn_rpc_stub(responses: Vec<(u16, String)>) -> (String, JoinHandle<Vec<String>>) {
    let server = Server::http("127.0.0.1:0").unwrap();
    let addr = server.server_addr().to_ip().unwrap();
    let url = format!("http://{addr}");
    let handle = thread::spawn(move || {
        let mut bodies = Vec::new();
        for (status, body) in responses {
            let Ok(mut request) = server.recv() else {
                break;
            };
            let mut received = String::new();
            let _ = request.as_reader().read_to_string(&mut received);
            bodies.push(received);
            let header = Header::from_bytes("Content-Type", "application/json").unwrap();
            let response = Response::from_string(body).with_status_code(status).with_header(header);
            let _ = request.respond(response);
        }
        bodies
    });
    (url, handle)
}

/// Answers every JSON-RPC request with `result`, echoing the request id so
/// strict clients accept the reply. Runs until the process exits.
pub fn spawn_echo_stub(result: serde_json::Value) -> String {
    echo_stub(None, result)
}

/// Like [`spawn_echo_stub`] but only answers requests to `path`; anything else
/// gets a 404. Returns the base URL without the path.
pub fn spawn_echo_stub_at(path: &str, result: serde_json::Value) -> String {
    echo_stub(Some(path.to_string()), result)
}

/// Shared echo loop; `path` of `None` accepts every request.
fn echo_stub(path: Option<String>, result: serde_json::Value) -> String {
    let server = Server::http("127.0.0.1:0").unwrap();
    let addr = server.server_addr().to_ip().unwrap();
    thread::spawn(move || {
        for mut request in server.incoming_requests() {
            if path.as_deref().is_some_and(|expected| request.url() != expected) {
                let _ = request.respond(Response::from_string("not found").with_status_code(404));
                continue;
            }
            let mut received = String::new();
            let _ = request.as_reader().read_to_string(&mut received);
            let id = serde_json::from_str::<serde_json::Value>(&received)
                .ok()
                .and_then(|body| body.get("id").cloned())
                .unwrap_or(serde_json::Value::Null);
            let body = serde_json::json!({"jsonrpc": "2.0", "id": id, "result": result});
            let header = Header::from_bytes("Content-Type", "application/json").unwrap();
            let _ = request.respond(Response::from_string(body.to_string()).with_header(header));
        }
    });
    format!("http://{addr}")
}
