//! Structured output over an inline image.
//!
//! Usage: `cargo run -p openai-client --example structured -- path/to/cover.png`

use base64::Engine;
use openai_client::{ContentPart, Message, OpenAIClient, StructuredRequest};
use serde_json::json;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let client = OpenAIClient::from_env()?;

    let path = std::env::args().nth(1).ok_or("expected an image path")?;
    let bytes = std::fs::read(&path)?;
    let data_uri = format!("data:image/png;base64,{}", base64::engine::general_purpose::STANDARD.encode(&bytes));

    let schema = json!({
        "type": "object",
        "properties": {
            "caption": {
                "type": "string",
                "description": "One sentence describing the image"
            }
        },
        "required": ["caption"],
        "additionalProperties": false
    });

    let request = StructuredRequest::with_messages(
        "gpt-4o",
        vec![
            Message::system("Caption the image."),
            Message::user_parts(vec![ContentPart::image_url(data_uri)]),
        ],
        schema,
    )
    .with_schema_name("caption");

    let response = client.structured_output(request).await?;
    let parsed: serde_json::Value = serde_json::from_str(&response)?;
    println!("Caption: {}", parsed["caption"]);

    Ok(())
}
