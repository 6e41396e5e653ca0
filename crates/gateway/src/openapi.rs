//! Static OpenAPI 3 description of the gateway routes.

use axum::response::Json;
use serde_json::{Value, json};

/// The OpenAPI document served at `/openapi.json`.
pub fn document() -> Value {
    let error = json!({ "$ref": "#/components/schemas/Error" });

    json!({
        "openapi": "3.0.3",
        "info": {
            "title": "SiteSage",
            "description": "Ask questions about a crawled website.",
            "version": env!("CARGO_PKG_VERSION"),
        },
        "paths": {
            "/source_info": {
                "get": {
                    "summary": "The crawled site data, keyed by page URL",
                    "responses": {
                        "200": {
                            "description": "Full, untrimmed corpus",
                            "content": { "application/json": { "schema": {
                                "type": "object",
                                "additionalProperties": { "type": "string" },
                            }}},
                        },
                    },
                },
            },
            "/ask": {
                "post": {
                    "summary": "Answer a question using the site data",
                    "requestBody": {
                        "required": true,
                        "content": { "text/plain": { "schema": {
                            "type": "string",
                            "maxLength": sitesage_core::MAX_QUESTION_CHARS,
                        }}},
                    },
                    "responses": {
                        "200": {
                            "description": "The answer",
                            "content": { "application/json": { "schema": {
                                "$ref": "#/components/schemas/AskResponse",
                            }}},
                        },
                        "400": {
                            "description": "Invalid question, or the model refused to answer",
                            "content": { "application/json": { "schema": error.clone() } },
                        },
                        "502": {
                            "description": "The LLM call failed",
                            "content": { "application/json": { "schema": error } },
                        },
                    },
                },
            },
            "/health": {
                "get": {
                    "summary": "Liveness and corpus size",
                    "responses": { "200": { "description": "Service is up" } },
                },
            },
        },
        "components": {
            "schemas": {
                "AskResponse": {
                    "type": "object",
                    "required": ["response"],
                    "properties": {
                        "response": { "$ref": "#/components/schemas/Answer" },
                    },
                },
                "Answer": {
                    "type": "object",
                    "required": ["user_question", "answer", "usage", "sources"],
                    "properties": {
                        "user_question": { "type": "string" },
                        "answer": { "type": "string" },
                        "usage": {
                            "type": "object",
                            "properties": {
                                "input_tokens": { "type": "integer", "nullable": true },
                                "output_tokens": { "type": "integer", "nullable": true },
                            },
                        },
                        "sources": { "type": "array", "items": { "type": "string" } },
                    },
                },
                "Error": {
                    "type": "object",
                    "required": ["detail"],
                    "properties": { "detail": { "type": "string" } },
                },
            },
        },
    })
}

pub(crate) async fn openapi_handler() -> Json<Value> {
    Json(document())
}
