use axum::{Json, response::Html};
use serde_json::{Value, json};

fn owner_param() -> Value {
    json!({
        "in": "path",
        "name": "googleId",
        "required": true,
        "schema": { "type": "string" },
        "description": "The Google ID of the owner"
    })
}

fn id_param() -> Value {
    json!({
        "in": "path",
        "name": "id",
        "required": true,
        "schema": { "type": "string" },
        "description": "The ID of the product"
    })
}

fn responses(pairs: &[(&str, &str)]) -> Value {
    let mut out = serde_json::Map::new();
    for (code, description) in pairs {
        out.insert(code.to_string(), json!({ "description": description }));
    }
    Value::Object(out)
}

fn json_body(schema: Value) -> Value {
    json!({
        "required": true,
        "content": { "application/json": { "schema": schema } }
    })
}

fn product_fields() -> Value {
    json!({
        "ProductName": { "type": "string" },
        "Description": { "type": "string" },
        "CarModel": { "type": "string" },
        "NumberPlate": { "type": "string" },
        "picture": { "type": "array", "items": { "type": "string" }, "maxItems": 10 }
    })
}

fn sign_in_path() -> Value {
    let schema = json!({
        "type": "object",
        "properties": {
            "name": { "type": "string" },
            "email": { "type": "string" },
            "googleId": { "type": "string" },
            "verifiedEmail": { "type": "boolean" },
            "picture": { "type": "string" }
        },
        "required": ["name", "email", "googleId", "verifiedEmail", "picture"]
    });

    json!({
        "post": {
            "summary": "Authenticate or register a user using Google credentials",
            "description": "Creates the user if they don't exist, otherwise returns the stored user unchanged.",
            "tags": ["Users"],
            "requestBody": json_body(schema),
            "responses": responses(&[
                ("200", "User authenticated"),
                ("400", "Missing required fields in request body"),
                ("500", "Internal server error"),
            ])
        }
    })
}

fn create_path() -> Value {
    let mut properties = product_fields();
    if let Some(fields) = properties.as_object_mut() {
        fields.insert("googleId".to_string(), json!({ "type": "string" }));
    }
    let schema = json!({
        "type": "object",
        "properties": properties,
        "required": ["googleId", "ProductName", "Description", "CarModel", "NumberPlate", "picture"]
    });

    json!({
        "post": {
            "summary": "Create a new product",
            "tags": ["Products"],
            "requestBody": json_body(schema),
            "responses": responses(&[
                ("201", "Product saved successfully"),
                ("400", "Missing fields or more than 10 pictures"),
                ("500", "Server error while saving the product"),
            ])
        }
    })
}

fn list_path() -> Value {
    json!({
        "get": {
            "summary": "Get products by Google ID",
            "tags": ["Products"],
            "parameters": [owner_param()],
            "responses": responses(&[
                ("200", "List of products"),
                ("404", "No products found for this Google ID"),
                ("500", "Server error while fetching products"),
            ])
        }
    })
}

fn item_path() -> Value {
    let patch = json!({ "type": "object", "properties": product_fields() });

    json!({
        "get": {
            "summary": "Get a product by its ID and Google ID",
            "tags": ["Products"],
            "parameters": [owner_param(), id_param()],
            "responses": responses(&[
                ("200", "The product with the specified ID"),
                ("404", "Product not found"),
                ("500", "Server error while fetching the product"),
            ])
        },
        "put": {
            "summary": "Update a product by its ID and Google ID",
            "description": "Only non-empty fields are applied.",
            "tags": ["Products"],
            "parameters": [owner_param(), id_param()],
            "requestBody": json_body(patch),
            "responses": responses(&[
                ("200", "Product updated successfully"),
                ("400", "More than 10 pictures"),
                ("404", "Product not found or Google ID does not match"),
                ("500", "Server error while updating product"),
            ])
        },
        "delete": {
            "summary": "Delete a product by its ID and Google ID",
            "tags": ["Products"],
            "parameters": [owner_param(), id_param()],
            "responses": responses(&[
                ("200", "Product deleted successfully"),
                ("404", "Product not found or Google ID does not match"),
                ("500", "Server error while deleting product"),
            ])
        }
    })
}

fn photos_path() -> Value {
    let schema = json!({
        "type": "object",
        "properties": {
            "file": { "type": "array", "items": { "type": "string", "format": "binary" } },
            "existing": { "type": "integer", "minimum": 0 }
        }
    });

    json!({
        "post": {
            "summary": "Upload a batch of photos",
            "description": "Uploads every file concurrently. Failed files are listed, successful ones return URLs.",
            "tags": ["Photos"],
            "requestBody": {
                "required": true,
                "content": { "multipart/form-data": { "schema": schema } }
            },
            "responses": responses(&[
                ("200", "Upload outcome with uploaded URLs and failures"),
                ("400", "No photos, or the listing would exceed 10 photos"),
                ("503", "Photo storage is not configured"),
            ])
        }
    })
}

/// OpenAPI 3 description of the HTTP surface.
pub fn document() -> Value {
    let version = env!("CARGO_PKG_VERSION");

    json!({
        "openapi": "3.0.0",
        "info": {
            "title": "Car Management API",
            "version": version,
            "description": "API documentation for the car management system"
        },
        "paths": {
            "/api/auth/google": sign_in_path(),
            "/api/user/product": create_path(),
            "/api/user/product/{googleId}": list_path(),
            "/api/user/product/{googleId}/{id}": item_path(),
            "/api/user/photos": photos_path()
        }
    })
}

pub async fn swagger_json() -> Json<Value> {
    Json(document())
}

pub async fn swagger_ui() -> Html<&'static str> {
    Html(
        r##"
        <!doctype html>
        <html>
            <head>
                <title>Car Management API</title>
                <link rel="stylesheet" href="https://unpkg.com/swagger-ui-dist@5/swagger-ui.css">
            </head>
            <body>
                <div id="swagger-ui"></div>
                <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-bundle.js"></script>
                <script>
                    window.ui = SwaggerUIBundle({ url: "/swagger.json", dom_id: "#swagger-ui" });
                </script>
            </body>
        </html>
        "##,
    )
}
