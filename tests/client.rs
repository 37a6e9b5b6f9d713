use std::sync::Arc;

use carlot::client::{ApiClient, ClientError, ProductDraft};
use carlot::db::Database;
use carlot::handler::AppState;
use carlot::model::{ProductPatch, SignIn};
use carlot::photos::PhotoUpload;
use carlot::routes;

/// Serves the app on an ephemeral local port and returns its base URL.
async fn spawn_server() -> String {
    let db = Database::in_memory().await.expect("in-memory database");
    let app = routes::app(AppState {
        db: Arc::new(db),
        photos: None,
    });

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{address}")
}

fn profile(external_id: &str, name: &str) -> SignIn {
    SignIn {
        name: Some(name.to_string()),
        email: Some(format!("{external_id}@example.com")),
        external_id: Some(external_id.to_string()),
        email_verified: Some(true),
        picture_url: Some("https://img.example/avatar.png".to_string()),
    }
}

fn draft(name: &str) -> ProductDraft {
    ProductDraft {
        name: name.to_string(),
        description: "Garage kept".to_string(),
        car_model: "Model 3".to_string(),
        plate_number: "KA-05-0001".to_string(),
        pictures: vec!["https://img.example/1.jpg".to_string()],
    }
}

#[tokio::test]
async fn listing_lifecycle_through_a_session() {
    let client = ApiClient::new(&spawn_server().await);
    let session = client.sign_in(&profile("g-1", "Ada")).await.unwrap();
    assert_eq!(session.external_id(), "g-1");
    assert_eq!(session.user().name, "Ada");

    assert!(client.list_products(&session).await.unwrap().is_empty());

    let product = client.create_product(&session, draft("Daily driver")).await.unwrap();
    assert_eq!(product.owner_id, "g-1");

    let fetched = client.get_product(&session, product.id).await.unwrap();
    assert_eq!(fetched, product);

    let patch = ProductPatch {
        car_model: Some("Model Y".to_string()),
        ..Default::default()
    };
    let updated = client.update_product(&session, product.id, &patch).await.unwrap();
    assert_eq!(updated.car_model, "Model Y");
    assert_eq!(updated.name, "Daily driver");

    assert_eq!(client.list_products(&session).await.unwrap().len(), 1);

    client.delete_product(&session, product.id).await.unwrap();
    assert!(matches!(
        client.get_product(&session, product.id).await,
        Err(ClientError::NotFound(_))
    ));
}

#[tokio::test]
async fn sessions_cannot_see_each_others_listings() {
    let client = ApiClient::new(&spawn_server().await);
    let ada = client.sign_in(&profile("g-1", "Ada")).await.unwrap();
    let bob = client.sign_in(&profile("g-2", "Bob")).await.unwrap();

    let product = client.create_product(&ada, draft("Ada's car")).await.unwrap();

    assert!(matches!(
        client.get_product(&bob, product.id).await,
        Err(ClientError::NotFound(_))
    ));
    assert!(matches!(
        client.delete_product(&bob, product.id).await,
        Err(ClientError::NotFound(_))
    ));
    assert!(client.list_products(&bob).await.unwrap().is_empty());
    assert_eq!(client.list_products(&ada).await.unwrap().len(), 1);
}

#[tokio::test]
async fn validation_failures_surface_as_rejections() {
    let client = ApiClient::new(&spawn_server().await);
    let session = client.sign_in(&profile("g-1", "Ada")).await.unwrap();

    let mut too_many = draft("Overexposed");
    too_many.pictures = (0..11).map(|i| format!("https://img.example/{i}.jpg")).collect();
    assert!(matches!(
        client.create_product(&session, too_many).await,
        Err(ClientError::Rejected(_))
    ));

    let mut incomplete = profile("g-9", "Nobody");
    incomplete.email_verified = None;
    assert!(matches!(client.sign_in(&incomplete).await, Err(ClientError::Rejected(_))));
}

#[tokio::test]
async fn photo_upload_reports_missing_storage() {
    let client = ApiClient::new(&spawn_server().await);
    let photo = PhotoUpload::new("front.jpg", Some("image/jpeg"), vec![0xff, 0xd8]);

    match client.upload_photos(0, vec![photo]).await {
        Err(ClientError::Api { status, .. }) => assert_eq!(status, 503),
        other => panic!("expected 503, got {other:?}"),
    }
}
