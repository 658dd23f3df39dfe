//! Creating, listing, toggling and deleting shields over HTTP

mod common;

use common::*;
use http::{StatusCode, header};
use shared::models::{ShieldCreate, SortDirection, SortField};
use shield_server::db::repository::shield;

fn valid_fields() -> Vec<(&'static str, &'static str)> {
    vec![("street", "Main St 1"), ("client", "Acme"), ("amount", "1500.50")]
}

async fn seed(app: &TestApp, amount: f64) -> i64 {
    shield::create(
        &app.state.pool,
        ShieldCreate {
            street: "Side St".into(),
            client: "Seeded".into(),
            amount,
            photo_url: None,
        },
    )
    .await
    .unwrap()
    .id
}

#[tokio::test]
async fn test_create_without_photo() {
    let app = spawn_app().await;
    let cookie = app.login().await;

    let response = app.post_create(Some(&cookie), &valid_fields(), None).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/admin"));
    assert_eq!(app.count().await, 1);

    let page = shield::list(&app.state.pool, SortField::CreatedAt, SortDirection::Desc, 1, 20)
        .await
        .unwrap();
    let created = &page.items[0];
    assert_eq!(created.street, "Main St 1");
    assert_eq!(created.client, "Acme");
    assert_eq!(created.amount, 1500.50);
    assert!(!created.paid);
    assert!(created.paid_at.is_none());
    assert!(created.photo_url.is_none());

    // QR image written for the new id
    assert!(app.state.qr.path_for(created.id).exists());

    let html = app.admin_html(&cookie, "").await;
    assert!(html.contains("Shield added successfully!"));
    assert!(html.contains("1 500,50"));
}

#[tokio::test]
async fn test_empty_file_part_means_no_photo() {
    let app = spawn_app().await;
    let cookie = app.login().await;

    let response = app
        .post_create(Some(&cookie), &valid_fields(), Some(("", b"")))
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(app.count().await, 1);
}

#[tokio::test]
async fn test_nameless_file_part_is_ignored() {
    let app = spawn_app().await;
    let cookie = app.login().await;

    let response = app
        .post_create(Some(&cookie), &valid_fields(), Some(("", b"xx")))
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(app.count().await, 1);

    let record = shield::get(&app.state.pool, 1).await.unwrap();
    assert!(record.photo_url.is_none());
    assert!(app.admin_html(&cookie, "").await.contains("Shield added successfully!"));
}

#[tokio::test]
async fn test_record_kept_when_qr_cannot_be_written() {
    let app = spawn_app().await;
    let cookie = app.login().await;
    // A plain file where the QR directory should be
    std::fs::write(&app.state.config.qrcodes_dir, b"not a directory").unwrap();

    let response = app.post_create(Some(&cookie), &valid_fields(), None).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/admin"));
    assert_eq!(app.count().await, 1);

    let html = app.admin_html(&cookie, "").await;
    assert!(html.contains("Shield added successfully!"));
    assert!(html.contains("could not be generated"));
}

#[tokio::test]
async fn test_stored_photo_removed_when_insert_fails() {
    let app = spawn_app().await;
    let cookie = app.login().await;
    sqlx::query(
        "CREATE TRIGGER reject_shields BEFORE INSERT ON shields \
         BEGIN SELECT RAISE(ABORT, 'insert rejected'); END",
    )
    .execute(&app.state.pool)
    .await
    .unwrap();

    let response = app
        .post_create(Some(&cookie), &valid_fields(), Some(("sign.png", PNG_BYTES)))
        .await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(app.count().await, 0);

    // The upload ran (directory exists) but left nothing behind
    let photos_dir = &app.state.config.photos_dir;
    assert!(photos_dir.is_dir());
    assert_eq!(std::fs::read_dir(photos_dir).unwrap().count(), 0);
}

#[tokio::test]
async fn test_non_numeric_id_is_404() {
    let app = spawn_app().await;
    let cookie = app.login().await;

    let response = app.get("/toggle_paid/abc", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let response = app.post_empty("/delete_shield/abc", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let response = app.get("/download_qr/abc", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_create_rejects_invalid_amount() {
    let app = spawn_app().await;
    let cookie = app.login().await;

    for amount in ["0", "-5", "abc"] {
        let response = app
            .post_create(
                Some(&cookie),
                &[("street", "Main St"), ("client", "Acme"), ("amount", amount)],
                None,
            )
            .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "{amount}");
        let html = app.admin_html(&cookie, "").await;
        assert!(html.contains("Amount must be a positive number"), "{amount}");
    }
    assert_eq!(app.count().await, 0);
}

#[tokio::test]
async fn test_create_requires_all_fields() {
    let app = spawn_app().await;
    let cookie = app.login().await;

    let response = app
        .post_create(Some(&cookie), &[("street", "  "), ("client", "Acme"), ("amount", "10")], None)
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let html = app.admin_html(&cookie, "").await;
    assert!(html.contains("All fields are required"));
    assert_eq!(app.count().await, 0);
}

#[tokio::test]
async fn test_create_rejects_unsupported_photo() {
    let app = spawn_app().await;
    let cookie = app.login().await;

    let response = app
        .post_create(Some(&cookie), &valid_fields(), Some(("sign.gif", GIF_BYTES)))
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let html = app.admin_html(&cookie, "").await;
    assert!(html.contains("Only JPG and PNG images are allowed."));
    assert_eq!(app.count().await, 0);

    // A GIF renamed to .png is caught by content sniffing
    let response = app
        .post_create(Some(&cookie), &valid_fields(), Some(("sign.png", GIF_BYTES)))
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(app.count().await, 0);
}

#[tokio::test]
async fn test_create_with_local_photo_and_serve_it() {
    let app = spawn_app().await;
    let cookie = app.login().await;

    let response = app
        .post_create(Some(&cookie), &valid_fields(), Some(("Sign.PNG", PNG_BYTES)))
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let page = shield::list(&app.state.pool, SortField::CreatedAt, SortDirection::Desc, 1, 20)
        .await
        .unwrap();
    let photo = page.items[0].photo_url.clone().unwrap();
    assert!(photo.starts_with("shield_"));
    assert!(photo.ends_with(".png"));
    assert!(app.state.config.photos_dir.join(&photo).exists());

    // Photos are public
    let response = app.get(&format!("/static/photos/{photo}"), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "image/png");
    let bytes = http_body_util::BodyExt::collect(response.into_body())
        .await
        .unwrap()
        .to_bytes();
    assert_eq!(&bytes[..], PNG_BYTES);
}

#[tokio::test]
async fn test_pagination() {
    let app = spawn_app().await;
    let cookie = app.login().await;
    for i in 0..45 {
        seed(&app, 1.0 + i as f64).await;
    }

    let rows = |html: &str| html.matches("/toggle_paid/").count();
    assert_eq!(rows(&app.admin_html(&cookie, "?page=1").await), 20);
    assert_eq!(rows(&app.admin_html(&cookie, "?page=2").await), 20);
    assert_eq!(rows(&app.admin_html(&cookie, "?page=3").await), 5);
    assert_eq!(rows(&app.admin_html(&cookie, "?page=4").await), 0);

    // Garbage parameters fall back to defaults
    assert_eq!(rows(&app.admin_html(&cookie, "?page=abc&sort=x&dir=y").await), 20);
}

#[tokio::test]
async fn test_sort_by_amount() {
    let app = spawn_app().await;
    let cookie = app.login().await;
    for amount in [30.0, 10.0, 50.0] {
        seed(&app, amount).await;
    }

    let html = app.admin_html(&cookie, "?sort=amount&dir=desc").await;
    let pos = |needle: &str| html.find(needle).unwrap();
    assert!(pos("50,00") < pos("30,00"));
    assert!(pos("30,00") < pos("10,00"));

    let html = app.admin_html(&cookie, "?sort=amount&dir=asc").await;
    let pos = |needle: &str| html.find(needle).unwrap();
    assert!(pos("10,00") < pos("30,00"));
    assert!(pos("30,00") < pos("50,00"));
}

#[tokio::test]
async fn test_toggle_paid_twice() {
    let app = spawn_app().await;
    let cookie = app.login().await;
    let id = seed(&app, 100.0).await;

    let response = app.get(&format!("/toggle_paid/{id}"), Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let record = shield::get(&app.state.pool, id).await.unwrap();
    assert!(record.paid);
    assert!(record.paid_at.is_some());
    assert!(app.admin_html(&cookie, "").await.contains("Status changed to paid!"));

    app.get(&format!("/toggle_paid/{id}"), Some(&cookie)).await;
    let record = shield::get(&app.state.pool, id).await.unwrap();
    assert!(!record.paid);
    assert!(record.paid_at.is_none());
    assert!(app.admin_html(&cookie, "").await.contains("Status changed to unpaid!"));
}

#[tokio::test]
async fn test_toggle_missing_is_404() {
    let app = spawn_app().await;
    let cookie = app.login().await;

    let response = app.get("/toggle_paid/999", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_shield() {
    let app = spawn_app().await;
    let cookie = app.login().await;

    app.post_create(Some(&cookie), &valid_fields(), Some(("sign.png", PNG_BYTES)))
        .await;
    let created = shield::list(&app.state.pool, SortField::CreatedAt, SortDirection::Desc, 1, 20)
        .await
        .unwrap()
        .items
        .remove(0);
    let photo_path = app
        .state
        .config
        .photos_dir
        .join(created.photo_url.as_deref().unwrap());
    let qr_path = app.state.qr.path_for(created.id);
    assert!(photo_path.exists());
    assert!(qr_path.exists());

    let response = app
        .post_empty(&format!("/delete_shield/{}", created.id), Some(&cookie))
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/admin"));
    assert_eq!(app.count().await, 0);
    assert!(!photo_path.exists());
    assert!(!qr_path.exists());
    assert!(app.admin_html(&cookie, "").await.contains("Shield deleted!"));
}

#[tokio::test]
async fn test_delete_missing_is_404() {
    let app = spawn_app().await;
    let cookie = app.login().await;
    seed(&app, 10.0).await;

    let response = app.post_empty("/delete_shield/999", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(app.count().await, 1);
}
