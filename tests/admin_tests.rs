mod common;

use axum::http::{header, StatusCode};
use common::*;

const PNG: &[u8] = b"\x89PNG\r\n\x1a\nfake image bytes";

#[tokio::test]
async fn test_admin_pages_deny_without_session() {
    let backend = backend();
    let app = app(&backend);

    for path in [
        "/admin",
        "/admin/collections",
        "/admin/photosets",
        "/admin/videos",
        "/admin/settings",
    ] {
        let response = send(&app, get(path, None)).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{path}");
        let body = body_text(response).await;
        assert!(body.contains("Доступ запрещен"), "{path}");
        assert!(body.contains("href=\"/admin/login\""), "{path}");
    }
}

#[tokio::test]
async fn test_bad_credentials_show_localized_message() {
    let backend = backend();
    let app = app(&backend);

    let response = send(
        &app,
        post_form(
            "/admin/login",
            None,
            &[("email", ADMIN_EMAIL), ("password", "wrong")],
            &[],
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_text(response).await;
    assert!(body.contains("Неверный email или пароль"));
    assert!(body.contains(ADMIN_EMAIL));
}

#[tokio::test]
async fn test_sign_in_grants_dashboard_with_counts() {
    let backend = backend();
    let app = app(&backend);
    let cookie = sign_in(&app).await;

    let response = send(&app, get("/admin", Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains(ADMIN_EMAIL));
    assert!(body.contains("<p class=\"count\">3</p>"));
    assert!(body.contains("<p class=\"count\">1</p>"));

    // The login page sends signed-in admins on to the dashboard
    let response = send(&app, get("/admin/login", Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/admin");
}

#[tokio::test]
async fn test_sign_out_ends_session() {
    let backend = backend();
    let app = app(&backend);
    let cookie = sign_in(&app).await;

    let response = send(
        &app,
        post_form("/admin", Some(&cookie), &[("action", "sign-out")], &[]),
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/");

    let response = send(&app, get("/admin", Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_allow_list_forbids_other_users() {
    let backend = backend();
    backend.add_user("intern@brand.com", "pw");
    let app = app_with(&backend, config(&[("ADMIN_EMAILS", ADMIN_EMAIL)]));

    let cookie = sign_in_as(&app, "intern@brand.com", "pw").await;
    let response = send(&app, get("/admin/collections", Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = body_text(response).await;
    assert!(body.contains("нет прав администратора"));

    let cookie = sign_in(&app).await;
    let response = send(&app, get("/admin/collections", Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_edit_form_is_prefilled() {
    let backend = backend();
    let app = app(&backend);
    let cookie = sign_in(&app).await;

    let response = send(&app, get("/admin/collections?edit=c1", Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("name=\"editing_id\" value=\"c1\""));
    assert!(body.contains("value=\"Winter Tales\""));

    let response = send(&app, get("/admin/collections?new=1", Some(&cookie))).await;
    let body = body_text(response).await;
    assert!(!body.contains("name=\"editing_id\""));
    assert!(body.contains("name=\"title\""));
}

#[tokio::test]
async fn test_create_collection_with_uploaded_images() {
    let backend = backend();
    let app = app(&backend);
    let cookie = sign_in(&app).await;

    let response = send(
        &app,
        post_form(
            "/admin/collections",
            Some(&cookie),
            &[
                ("action", "save"),
                ("title", "Resort 2026"),
                ("season", "RS26"),
                ("images", "https://cdn.example.com/existing.jpg"),
                ("featured", "on"),
            ],
            &[
                FilePart {
                    field: "image_files",
                    file_name: "one.png",
                    content_type: "image/png",
                    data: PNG,
                },
                FilePart {
                    field: "image_files",
                    file_name: "two.webp",
                    content_type: "image/webp",
                    data: b"RIFFfakewebp",
                },
            ],
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("Изменения сохранены"));
    assert!(body.contains("Resort 2026"));
    // The form is cleared after a successful save
    assert!(!body.contains("name=\"editing_id\""));
    assert!(!body.contains("name=\"season\""));

    assert_eq!(backend.object_count("website-images"), 2);
    let rows = backend.rows("collections");
    let created = rows.iter().find(|r| r["title"] == "Resort 2026").unwrap();
    let images = created["images"].as_array().unwrap();
    assert_eq!(images.len(), 3);
    assert_eq!(images[0], "https://cdn.example.com/existing.jpg");
    assert!(images[1]
        .as_str()
        .unwrap()
        .starts_with("http://localhost:54321/storage/v1/object/public/website-images/collections/"));
}

#[tokio::test]
async fn test_rejected_file_type_uploads_nothing() {
    let backend = backend();
    let app = app(&backend);
    let cookie = sign_in(&app).await;

    let response = send(
        &app,
        post_form(
            "/admin/photosets",
            Some(&cookie),
            &[("action", "save"), ("title", "Animated"), ("category", "campaign")],
            &[
                FilePart {
                    field: "image_files",
                    file_name: "ok.png",
                    content_type: "image/png",
                    data: PNG,
                },
                FilePart {
                    field: "image_files",
                    file_name: "loop.gif",
                    content_type: "image/gif",
                    data: b"GIF89a",
                },
            ],
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_text(response).await;
    assert!(body.contains("Неподдерживаемый тип файла"));
    // The submitted values stay in the form
    assert!(body.contains("value=\"Animated\""));
    assert_eq!(backend.object_count("website-images"), 0);
    assert_eq!(backend.rows("photosets").len(), 3);
}

#[tokio::test]
async fn test_missing_bucket_shows_setup_instructions() {
    let bare = atelier_site::backend::MemoryBackend::new();
    bare.add_user(ADMIN_EMAIL, ADMIN_PASSWORD);
    let app = app(&bare);
    let cookie = sign_in(&app).await;

    let response = send(
        &app,
        post_form(
            "/admin/collections",
            Some(&cookie),
            &[("action", "save"), ("title", "No bucket")],
            &[FilePart {
                field: "image_files",
                file_name: "one.png",
                content_type: "image/png",
                data: PNG,
            }],
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = body_text(response).await;
    assert!(body.contains("Инструкция:"));
    assert!(body.contains("website-images"));
    assert!(bare.rows("collections").is_empty());
}

#[tokio::test]
async fn test_new_video_requires_media() {
    let backend = backend();
    let app = app(&backend);
    let cookie = sign_in(&app).await;

    let response = send(
        &app,
        post_form(
            "/admin/videos",
            Some(&cookie),
            &[("action", "save"), ("title", "Teaser")],
            &[],
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_text(response).await;
    assert!(body.contains("Загрузите видео и превью перед сохранением"));
    assert_eq!(backend.rows("videos").len(), 1);
}

#[tokio::test]
async fn test_video_upload_fills_paths() {
    let backend = backend();
    let app = app(&backend);
    let cookie = sign_in(&app).await;

    let response = send(
        &app,
        post_form(
            "/admin/videos",
            Some(&cookie),
            &[
                ("action", "save"),
                ("title", "Teaser"),
                ("redirect_url", "https://youtube.com/watch?v=teaser"),
            ],
            &[
                FilePart {
                    field: "video_file",
                    file_name: "teaser.mp4",
                    content_type: "video/mp4",
                    data: b"\x00\x00\x00\x18ftypmp42",
                },
                FilePart {
                    field: "thumbnail_file",
                    file_name: "teaser.jpg",
                    content_type: "image/jpeg",
                    data: b"\xff\xd8\xff\xe0",
                },
            ],
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(backend.object_count("website-videos"), 1);
    assert_eq!(backend.object_count("website-images"), 1);

    let rows = backend.rows("videos");
    let video = rows.iter().find(|r| r["title"] == "Teaser").unwrap();
    assert!(video["video_path"].as_str().unwrap().contains("/website-videos/videos/"));
    assert!(video["thumbnail"].as_str().unwrap().contains("/website-images/thumbnails/"));
}

#[tokio::test]
async fn test_delete_asks_for_confirmation() {
    let backend = backend();
    let app = app(&backend);
    let cookie = sign_in(&app).await;

    let response = send(
        &app,
        post_form(
            "/admin/photosets",
            Some(&cookie),
            &[("action", "delete"), ("id", "p2")],
            &[],
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("Вы уверены, что хотите удалить эту запись?"));
    assert!(body.contains("<strong>Coastline</strong>"));
    assert_eq!(backend.rows("photosets").len(), 3);

    let response = send(
        &app,
        post_form(
            "/admin/photosets",
            Some(&cookie),
            &[("action", "delete"), ("id", "p2"), ("confirmed", "true")],
            &[],
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("Запись удалена"));
    assert!(!body.contains("Coastline"));
    assert_eq!(backend.rows("photosets").len(), 2);
}

#[tokio::test]
async fn test_list_failure_offers_retry() {
    let backend = backend();
    backend.make_unavailable("collections");
    let app = app(&backend);
    let cookie = sign_in(&app).await;

    let response = send(&app, get("/admin/collections", Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("Ошибка загрузки коллекций"));
    assert!(body.contains("Попробовать снова"));
}

#[tokio::test]
async fn test_background_setting_reaches_public_site() {
    let backend = backend();
    let app = app(&backend);
    let cookie = sign_in(&app).await;

    let response = send(
        &app,
        post_form(
            "/admin/settings",
            Some(&cookie),
            &[
                ("action", "save"),
                ("background_image", "https://cdn.example.com/new-bg.jpg"),
            ],
            &[],
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("Фоновое изображение успешно обновлено"));

    let body = body_text(send(&app, get("/", None)).await).await;
    assert!(body.contains("new-bg.jpg"));
}

#[tokio::test]
async fn test_background_upload_goes_to_backgrounds_folder() {
    let backend = backend();
    let app = app(&backend);
    let cookie = sign_in(&app).await;

    let response = send(
        &app,
        post_form(
            "/admin/settings",
            Some(&cookie),
            &[("action", "save")],
            &[FilePart {
                field: "background_file",
                file_name: "bg.png",
                content_type: "image/png",
                data: PNG,
            }],
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let settings = backend.rows("settings");
    assert_eq!(settings.len(), 1);
    assert!(settings[0]["value"]
        .as_str()
        .unwrap()
        .contains("/website-images/backgrounds/"));
}

#[tokio::test]
async fn test_empty_background_is_rejected() {
    let backend = backend();
    let app = app(&backend);
    let cookie = sign_in(&app).await;

    let response = send(
        &app,
        post_form(
            "/admin/settings",
            Some(&cookie),
            &[("action", "save"), ("background_image", "")],
            &[],
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(backend.rows("settings").is_empty());
}

#[tokio::test]
async fn test_session_survives_failed_session_check() {
    let backend = backend();
    let app = app(&backend);
    let cookie = sign_in(&app).await;

    let response = send(&app, get("/admin", Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::OK);

    // While the auth service is unreachable the page is denied...
    backend.set_auth_available(false);
    let response = send(&app, get("/admin", Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // ...but the stored session is kept for when it comes back
    backend.set_auth_available(true);
    let response = send(&app, get("/admin", Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_revoked_session_is_cleared() {
    let backend = backend();
    let app = app(&backend);
    let cookie = sign_in(&app).await;

    let access_token = backend
        .sessions()
        .into_iter()
        .next()
        .expect("one issued session");
    backend.expire_token(&access_token);

    let response = send(&app, get("/admin", Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_editing_updates_row_in_place() {
    let cases: [(&str, &str, Vec<(&str, &str)>); 3] = [
        (
            "/admin/collections",
            "collections",
            vec![("editing_id", "c1"), ("title", "Winter Tales II"), ("season", "FW25")],
        ),
        (
            "/admin/photosets",
            "photosets",
            vec![
                ("editing_id", "p2"),
                ("title", "Coastline Revisited"),
                ("category", "editorial"),
            ],
        ),
        (
            "/admin/videos",
            "videos",
            vec![
                ("editing_id", "v1"),
                ("title", "Runway Cut"),
                ("video_path", "https://cdn.example.com/runway.mp4"),
                ("thumbnail", "https://cdn.example.com/thumb.jpg"),
                ("redirect_url", "https://youtube.com/watch?v=cut"),
            ],
        ),
    ];

    for (path, table, fields) in cases {
        let backend = backend();
        let app = app(&backend);
        let cookie = sign_in(&app).await;
        let before = backend.rows(table).len();
        let (_, id) = fields[0];
        let (_, title) = fields[1];

        let mut submitted = vec![("action", "save")];
        submitted.extend(fields.iter().copied());
        let response = send(&app, post_form(path, Some(&cookie), &submitted, &[])).await;

        assert_eq!(response.status(), StatusCode::OK, "{path}");
        let body = body_text(response).await;
        assert!(body.contains("Изменения сохранены"), "{path}");
        assert!(body.contains(title), "{path}");

        let rows = backend.rows(table);
        assert_eq!(rows.len(), before, "{path}");
        let updated = rows.iter().find(|r| r["id"] == id).unwrap();
        assert_eq!(updated["title"], title, "{path}");
    }
}
