//! Comment creation, editing and deletion through the news pages

mod common;

use axum::http::StatusCode;
use common::{location, login_url_for, spawn_app, TestApp};
use ya_sites::db::repositories::CommentRepository;
use ya_sites::models::{Comment, News, REQUIRED_FIELD};
use ya_sites::services::moderation::{BAD_WORDS, WARNING};

const COMMENT_TEXT: &str = "Текст комментария";
const NEW_COMMENT_TEXT: &str = "Обновлённый комментарий";

struct Fixture {
    app: TestApp,
    author: common::Client,
    reader: common::Client,
    news: News,
}

async fn setup() -> Fixture {
    let app = spawn_app().await;
    let author = app.client("Автор").await;
    let reader = app.client("Читатель").await;
    let news = app.create_news("Заголовок", None).await;
    Fixture {
        app,
        author,
        reader,
        news,
    }
}

impl Fixture {
    fn detail_url(&self) -> String {
        format!("/news/{}/", self.news.id)
    }

    fn comments_url(&self) -> String {
        format!("/news/{}/#comments", self.news.id)
    }

    async fn author_comment(&self) -> Comment {
        self.app
            .create_comment(&self.news, &self.author.user, COMMENT_TEXT, None)
            .await
    }

    async fn stored(&self, comment: &Comment) -> Option<Comment> {
        self.app.comment_repo().get_by_id(comment.id).await.unwrap()
    }
}

#[tokio::test]
async fn test_anonymous_user_cant_create_comment() {
    let f = setup().await;

    let response = f
        .app
        .post(&f.detail_url(), None)
        .form(&[("text", COMMENT_TEXT)])
        .await;

    assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), login_url_for(&f.detail_url()));
    assert_eq!(f.app.comment_count().await, 0);
}

#[tokio::test]
async fn test_user_can_create_comment() {
    let f = setup().await;

    let response = f
        .app
        .post(&f.detail_url(), Some(&f.author))
        .form(&[("text", COMMENT_TEXT)])
        .await;

    assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), f.comments_url());
    assert_eq!(f.app.comment_count().await, 1);

    let comments = f.app.comment_repo().list_by_news(f.news.id).await.unwrap();
    let comment = &comments[0].comment;
    assert_eq!(comment.text, COMMENT_TEXT);
    assert_eq!(comment.news_id, f.news.id);
    assert_eq!(comment.author_id, f.author.user.id);
}

#[tokio::test]
async fn test_comment_on_missing_news_is_not_found() {
    let f = setup().await;

    let response = f
        .app
        .post("/news/9999/", Some(&f.author))
        .form(&[("text", COMMENT_TEXT)])
        .await;

    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(f.app.comment_count().await, 0);
}

#[tokio::test]
async fn test_user_cant_use_bad_words() {
    let f = setup().await;

    for bad_word in BAD_WORDS {
        let text = format!("Какой-то текст, {}, еще текст", bad_word);
        let response = f
            .app
            .post(&f.detail_url(), Some(&f.author))
            .form(&[("text", text.as_str())])
            .await;

        assert_eq!(response.status_code(), StatusCode::OK);
        let html = response.text();
        assert!(html.contains(WARNING), "warning missing for {}", bad_word);
        assert!(html.contains(&text), "submitted text should be kept");
    }
    assert_eq!(f.app.comment_count().await, 0);
}

#[tokio::test]
async fn test_empty_comment_is_rejected() {
    let f = setup().await;

    let response = f
        .app
        .post(&f.detail_url(), Some(&f.author))
        .form(&[("text", "   ")])
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert!(response.text().contains(REQUIRED_FIELD));
    assert_eq!(f.app.comment_count().await, 0);
}

#[tokio::test]
async fn test_author_can_delete_comment() {
    let f = setup().await;
    let comment = f.author_comment().await;

    let response = f
        .app
        .post(&format!("/delete_comment/{}/", comment.id), Some(&f.author))
        .await;

    assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), f.comments_url());
    assert_eq!(f.app.comment_count().await, 0);
}

#[tokio::test]
async fn test_user_cant_delete_comment_of_another_user() {
    let f = setup().await;
    let comment = f.author_comment().await;

    let response = f
        .app
        .post(&format!("/delete_comment/{}/", comment.id), Some(&f.reader))
        .await;

    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(f.app.comment_count().await, 1);
}

#[tokio::test]
async fn test_anonymous_user_cant_delete_comment() {
    let f = setup().await;
    let comment = f.author_comment().await;
    let url = format!("/delete_comment/{}/", comment.id);

    let response = f.app.post(&url, None).await;

    assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), login_url_for(&url));
    assert_eq!(f.app.comment_count().await, 1);
}

#[tokio::test]
async fn test_author_can_edit_comment() {
    let f = setup().await;
    let comment = f.author_comment().await;

    let response = f
        .app
        .post(&format!("/edit_comment/{}/", comment.id), Some(&f.author))
        .form(&[("text", NEW_COMMENT_TEXT)])
        .await;

    assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), f.comments_url());
    let stored = f.stored(&comment).await.unwrap();
    assert_eq!(stored.text, NEW_COMMENT_TEXT);
    assert_eq!(stored.author_id, f.author.user.id);
}

#[tokio::test]
async fn test_user_cant_edit_comment_of_another_user() {
    let f = setup().await;
    let comment = f.author_comment().await;

    let response = f
        .app
        .post(&format!("/edit_comment/{}/", comment.id), Some(&f.reader))
        .form(&[("text", NEW_COMMENT_TEXT)])
        .await;

    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(f.stored(&comment).await.unwrap().text, COMMENT_TEXT);
}

#[tokio::test]
async fn test_edit_with_bad_word_keeps_old_text() {
    let f = setup().await;
    let comment = f.author_comment().await;

    let response = f
        .app
        .post(&format!("/edit_comment/{}/", comment.id), Some(&f.author))
        .form(&[("text", BAD_WORDS[1])])
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert!(response.text().contains(WARNING));
    assert_eq!(f.stored(&comment).await.unwrap().text, COMMENT_TEXT);
}

#[tokio::test]
async fn test_edit_without_form_body_by_other_user_is_not_found() {
    let f = setup().await;
    let comment = f.author_comment().await;

    let response = f
        .app
        .post(&format!("/edit_comment/{}/", comment.id), Some(&f.reader))
        .await;

    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(f.stored(&comment).await.unwrap().text, COMMENT_TEXT);
}

#[tokio::test]
async fn test_edit_without_form_body_by_author_requires_text() {
    let f = setup().await;
    let comment = f.author_comment().await;

    let response = f
        .app
        .post(&format!("/edit_comment/{}/", comment.id), Some(&f.author))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert!(response.text().contains(REQUIRED_FIELD));
    assert_eq!(f.stored(&comment).await.unwrap().text, COMMENT_TEXT);
}

#[tokio::test]
async fn test_comment_text_is_trimmed() {
    let f = setup().await;

    f.app
        .post(&f.detail_url(), Some(&f.author))
        .form(&[("text", "   Текст комментария \n")])
        .await;

    let comments = f.app.comment_repo().list_by_news(f.news.id).await.unwrap();
    assert_eq!(comments[0].comment.text, COMMENT_TEXT);
}
