//! What the notes pages show

mod common;

use common::spawn_app;

#[tokio::test]
async fn test_note_in_list_for_author_only() {
    let app = spawn_app().await;
    let author = app.client("Автор").await;
    let reader = app.client("Читатель").await;
    let note = app.create_note(&author.user, "Заголовок", "note-slug").await;
    let marker = format!("data-slug=\"{}\"", note.slug);

    let author_html = app.get("/notes/list/", Some(&author)).await.text();
    let reader_html = app.get("/notes/list/", Some(&reader)).await.text();

    assert!(author_html.contains(&marker));
    assert!(!reader_html.contains(&marker));
    assert!(!reader_html.contains("class=\"note-item\""));
}

#[tokio::test]
async fn test_notes_listed_in_creation_order() {
    let app = spawn_app().await;
    let author = app.client("Автор").await;
    for slug in ["first", "second", "third"] {
        app.create_note(&author.user, "Заголовок", slug).await;
    }

    let html = app.get("/notes/list/", Some(&author)).await.text();

    let first = html.find("data-slug=\"first\"").unwrap();
    let second = html.find("data-slug=\"second\"").unwrap();
    let third = html.find("data-slug=\"third\"").unwrap();
    assert!(first < second && second < third);
}

#[tokio::test]
async fn test_create_and_add_note_pages_contain_form() {
    let app = spawn_app().await;
    let author = app.client("Автор").await;
    let note = app.create_note(&author.user, "Заголовок", "note-slug").await;

    for path in ["/notes/add/".to_string(), format!("/notes/edit/{}/", note.slug)] {
        let html = app.get(&path, Some(&author)).await.text();
        assert!(html.contains("id=\"note-form\""), "no form on {}", path);
        assert!(html.contains("name=\"slug\""), "no slug field on {}", path);
    }
}

#[tokio::test]
async fn test_edit_form_is_prefilled() {
    let app = spawn_app().await;
    let author = app.client("Автор").await;
    let note = app.create_note(&author.user, "Старый заголовок", "note-slug").await;

    let html = app
        .get(&format!("/notes/edit/{}/", note.slug), Some(&author))
        .await
        .text();

    assert!(html.contains("value=\"Старый заголовок\""));
    assert!(html.contains("value=\"note-slug\""));
}
