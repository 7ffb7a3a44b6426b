//! Print the OpenAPI document as JSON.

use accounts::doc::ApiDoc;
use color_eyre::eyre::Result;
use utoipa::OpenApi;

#[expect(clippy::print_stdout, reason = "the document is the program's output")]
fn main() -> Result<()> {
    color_eyre::install()?;
    println!("{}", ApiDoc::openapi().to_pretty_json()?);
    Ok(())
}
