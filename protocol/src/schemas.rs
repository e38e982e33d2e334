//! Response schemas and tool declarations for every model call.
//!
//! Schemas use the OpenAPI subset accepted by `generationConfig.responseSchema`.

use crate::models::FunctionDeclaration;
use serde_json::{json, Value};

pub const WEB_SEARCH_TOOL: &str = "webSearch";

fn string_array(description: &str) -> Value {
    json!({
        "type": "ARRAY",
        "items": { "type": "STRING" },
        "description": description,
    })
}

/// Output of document analysis.
pub fn document_analysis() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "topics": string_array("Key topics identified in the document."),
            "subtopics": string_array("Subtopics for each key topic."),
            "dataPoints": string_array("Important data points extracted from the document."),
            "quotes": string_array("Key quotes extracted from the document."),
            "summary": {
                "type": "STRING",
                "description": "A concise summary of the document content."
            }
        },
        "required": ["topics", "subtopics", "dataPoints", "quotes", "summary"],
        "propertyOrdering": ["topics", "subtopics", "dataPoints", "quotes", "summary"]
    })
}

pub fn generated_slide() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "id": { "type": "INTEGER", "description": "Unique identifier for the slide." },
            "title": { "type": "STRING", "description": "The title of the slide." },
            "content": { "type": "STRING", "description": "The main text content of the slide." },
            "visualPrompt": {
                "type": "STRING",
                "nullable": true,
                "description": "The prompt used to generate the visual OR the query used for web search. Null or omitted if no visual is used."
            },
            "visualDataUri": {
                "type": "STRING",
                "nullable": true,
                "description": "Optional HTTPS URL found via web search. Null or omitted when the visual must be generated later or no visual is used."
            }
        },
        "required": ["id", "title", "content"],
        "propertyOrdering": ["id", "title", "content", "visualPrompt", "visualDataUri"]
    })
}

/// Output of the presentation structure phase.
pub fn presentation_structure() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "slides": {
                "type": "ARRAY",
                "items": generated_slide(),
                "description": "An array of generated presentation slides."
            }
        },
        "required": ["slides"]
    })
}

pub fn regenerated_slide() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "regeneratedSlide": {
                "type": "STRING",
                "description": "The regenerated slide content with the new parameters."
            }
        },
        "required": ["regeneratedSlide"]
    })
}

/// Declaration of the tool the structure prompt may call to find existing images.
pub fn web_search_declaration() -> FunctionDeclaration {
    FunctionDeclaration {
        name: WEB_SEARCH_TOOL.to_string(),
        description: "Performs a web search for information or images based on a query. \
            Use this ONLY for finding existing images on the web, NOT for generating new ones."
            .to_string(),
        parameters: json!({
            "type": "OBJECT",
            "properties": {
                "query": {
                    "type": "STRING",
                    "description": "The search query for a suitable image."
                }
            },
            "required": ["query"]
        }),
    }
}
