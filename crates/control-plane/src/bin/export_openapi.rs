// Export OpenAPI specification as JSON
//
// Usage: cargo run --bin export-openapi > docs/api/openapi.json
//
// This binary generates the OpenAPI spec without starting the API server.

use stamprally_control_plane::openapi::ApiDoc;

fn main() -> serde_json::Result<()> {
    println!("{}", ApiDoc::to_json()?);
    Ok(())
}
