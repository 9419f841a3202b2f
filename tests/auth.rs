//! Sign-up, login, logout and the admin gate

mod common;

use axum::http::{header, StatusCode};
use common::{header_str, location, spawn_app};
use ya_sites::db::repositories::UserRepository;
use ya_sites::models::UserRole;
use ya_sites::services::user::{INVALID_CREDENTIALS, PASSWORD_MISMATCH, USERNAME_TAKEN};
use ya_sites::services::RegisterInput;

const PASSWORD: &str = "correct horse battery";

#[tokio::test]
async fn test_signup_creates_user_and_redirects_to_login() {
    let app = spawn_app().await;

    let response = app
        .post("/auth/signup/", None)
        .form(&[("username", "новичок"), ("password1", PASSWORD), ("password2", PASSWORD)])
        .await;

    assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/auth/login/");
    let user = app
        .users()
        .get_by_username("новичок")
        .await
        .unwrap()
        .expect("user should exist");
    // First account on the site
    assert_eq!(user.role, UserRole::Admin);
}

#[tokio::test]
async fn test_signup_password_mismatch() {
    let app = spawn_app().await;

    let response = app
        .post("/auth/signup/", None)
        .form(&[("username", "новичок"), ("password1", PASSWORD), ("password2", "other")])
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert!(response.text().contains(PASSWORD_MISMATCH));
    assert!(app.state.user_service.is_first_user().await.unwrap());
}

#[tokio::test]
async fn test_signup_taken_username() {
    let app = spawn_app().await;
    app.create_user("занятый", UserRole::User).await;

    let response = app
        .post("/auth/signup/", None)
        .form(&[("username", "занятый"), ("password1", PASSWORD), ("password2", PASSWORD)])
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert!(response.text().contains(USERNAME_TAKEN));
}

#[tokio::test]
async fn test_login_sets_cookie_and_follows_next() {
    let app = spawn_app().await;
    app.state
        .user_service
        .register(RegisterInput::new("читатель", PASSWORD))
        .await
        .unwrap();

    let response = app
        .post("/auth/login/", None)
        .form(&[("username", "читатель"), ("password", PASSWORD), ("next", "/notes/list/")])
        .await;

    assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/notes/list/");
    let cookie = header_str(&response, header::SET_COOKIE);
    assert!(cookie.starts_with("session="));
    assert!(cookie.contains("HttpOnly"));

    let token = cookie
        .trim_start_matches("session=")
        .split(';')
        .next()
        .unwrap()
        .to_string();
    let user = app.state.user_service.validate_session(&token).await.unwrap();
    assert_eq!(user.map(|u| u.username), Some("читатель".to_string()));
}

#[tokio::test]
async fn test_login_ignores_foreign_next() {
    let app = spawn_app().await;
    app.state
        .user_service
        .register(RegisterInput::new("читатель", PASSWORD))
        .await
        .unwrap();

    let response = app
        .post("/auth/login/", None)
        .form(&[
            ("username", "читатель"),
            ("password", PASSWORD),
            ("next", "https://evil.example/"),
        ])
        .await;

    assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");
}

#[tokio::test]
async fn test_login_with_wrong_password() {
    let app = spawn_app().await;
    app.state
        .user_service
        .register(RegisterInput::new("читатель", PASSWORD))
        .await
        .unwrap();

    let response = app
        .post("/auth/login/", None)
        .form(&[("username", "читатель"), ("password", "wrong")])
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert!(response.text().contains(INVALID_CREDENTIALS));
    assert!(response.headers().get(header::SET_COOKIE).is_none());
}

#[tokio::test]
async fn test_logout_ends_session() {
    let app = spawn_app().await;
    let reader = app.client("читатель").await;

    let response = app.post("/auth/logout/", Some(&reader)).await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert!(header_str(&response, header::SET_COOKIE).contains("Max-Age=0"));

    let after = app.get("/notes/list/", Some(&reader)).await;
    assert_eq!(after.status_code(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn test_admin_page_requires_admin() {
    let app = spawn_app().await;
    let reader = app.client("читатель").await;

    let anonymous = app.get("/admin/news/add/", None).await;
    let regular = app.get("/admin/news/add/", Some(&reader)).await;

    assert_eq!(anonymous.status_code(), StatusCode::SEE_OTHER);
    assert_eq!(location(&anonymous), "/auth/login/?next=/admin/news/add/");
    assert_eq!(regular.status_code(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_admin_can_add_news() {
    let app = spawn_app().await;
    let admin = app.client_with_role("редактор", UserRole::Admin).await;

    let response = app
        .post("/admin/news/add/", Some(&admin))
        .form(&[("title", "Срочная новость"), ("text", "Подробности"), ("date", "2024-05-01")])
        .await;

    assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
    let home = app.get("/", None).await.text();
    assert!(home.contains("Срочная новость"));
    assert!(home.contains("datetime=\"2024-05-01\""));
}

#[tokio::test]
async fn test_admin_news_form_validation() {
    let app = spawn_app().await;
    let admin = app.client_with_role("редактор", UserRole::Admin).await;

    let response = app
        .post("/admin/news/add/", Some(&admin))
        .form(&[("title", ""), ("text", "Подробности"), ("date", "")])
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert!(response.text().contains(ya_sites::models::REQUIRED_FIELD));
    assert!(app.state.news_service.home().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_admin_news_form_reports_bad_date_with_other_errors() {
    let app = spawn_app().await;
    let admin = app.client_with_role("редактор", UserRole::Admin).await;

    let response = app
        .post("/admin/news/add/", Some(&admin))
        .form(&[("title", ""), ("text", ""), ("date", "01.05.2024")])
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let page = response.text();
    assert!(page.contains(ya_sites::api::admin::INVALID_DATE));
    assert_eq!(page.matches(ya_sites::models::REQUIRED_FIELD).count(), 2);
    assert!(app.state.news_service.home().await.unwrap().is_empty());
}
