mod common;

use anyhow::Result;
use axum::http::StatusCode;
use common::{assert_redirect, body_text, TestApp};
use pokemon_trainers::database::Store;
use pokemon_trainers::policy::RowFilter;

#[tokio::test]
async fn regular_user_lists_only_own_pokemon() -> Result<()> {
    let app = TestApp::new().await?;

    let body = body_text(app.get("/", Some(&app.user("ash").await?)).await?).await?;
    assert!(body.contains("sparky"));
    assert!(body.contains("sleepy"));
    assert!(!body.contains("leafy"));

    let body = body_text(app.get("/", Some(&app.user("misty").await?)).await?).await?;
    assert!(body.contains("leafy"));
    assert!(!body.contains("sparky"));
    Ok(())
}

#[tokio::test]
async fn manager_lists_every_pokemon() -> Result<()> {
    let app = TestApp::new().await?;

    let body = body_text(app.get("/", Some(&app.manager().await?)).await?).await?;
    for description in ["sparky", "leafy", "sleepy"] {
        assert!(body.contains(description), "missing {}", description);
    }
    // Ordered by species name
    let bulbasaur = body.find("Bulbasaur").unwrap_or(usize::MAX);
    let pikachu = body.find("Pikachu").unwrap_or(0);
    assert!(bulbasaur < pikachu);
    Ok(())
}

#[tokio::test]
async fn foreign_record_edit_is_a_silent_redirect() -> Result<()> {
    let app = TestApp::new().await?;
    let ash = app.user("ash").await?;

    let res = app.get("/pokemon/edit/2", Some(&ash)).await?;
    assert_redirect(&res, "/");

    let res = app
        .post_form("/pokemon/edit/2", Some(&ash), &[("description", "stolen"), ("base_total", "1")])
        .await?;
    assert_redirect(&res, "/");

    let record = app.store.get_pokemon(2, None).await?.expect("record 2");
    assert_eq!(record.description.as_deref(), Some("leafy"));
    assert_eq!(record.base_total, Some(320));
    assert_eq!(record.trainer, "misty");
    Ok(())
}

#[tokio::test]
async fn foreign_record_delete_is_a_silent_redirect() -> Result<()> {
    let app = TestApp::new().await?;

    let res = app.get("/pokemon/delete/2", Some(&app.user("ash").await?)).await?;
    assert_redirect(&res, "/");
    assert_eq!(app.store.pokemon_count(), 3);

    let res = app.get("/pokemon/delete/99", Some(&app.user("ash").await?)).await?;
    assert_redirect(&res, "/");
    assert_eq!(app.store.pokemon_count(), 3);
    Ok(())
}

#[tokio::test]
async fn owner_can_edit_and_delete() -> Result<()> {
    let app = TestApp::new().await?;
    let ash = app.user("ash").await?;

    let res = app.get("/pokemon/edit/1", Some(&ash)).await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(body_text(res).await?.contains("sparky"));

    let res = app
        .post_form("/pokemon/edit/1", Some(&ash), &[("description", "very sparky"), ("base_total", "330")])
        .await?;
    assert_redirect(&res, "/");
    let record = app.store.get_pokemon(1, None).await?.expect("record 1");
    assert_eq!(record.description.as_deref(), Some("very sparky"));
    assert_eq!(record.base_total, Some(330));

    let res = app.get("/pokemon/delete/1", Some(&ash)).await?;
    assert_redirect(&res, "/");
    assert_eq!(app.store.pokemon_count(), 2);
    assert!(app.store.get_pokemon(1, None).await?.is_none());
    Ok(())
}

#[tokio::test]
async fn regular_user_cannot_reassign_ownership() -> Result<()> {
    let app = TestApp::new().await?;

    let res = app
        .post_form(
            "/pokemon/edit/1",
            Some(&app.user("ash").await?),
            &[("trainer", "misty"), ("description", "zap")],
        )
        .await?;
    assert_redirect(&res, "/");

    let record = app.store.get_pokemon(1, None).await?.expect("record 1");
    assert_eq!(record.trainer, "ash");
    assert_eq!(record.description.as_deref(), Some("zap"));
    Ok(())
}

#[tokio::test]
async fn manager_reassigns_only_to_existing_trainers() -> Result<()> {
    let app = TestApp::new().await?;
    let oak = app.manager().await?;

    let res = app
        .post_form("/pokemon/edit/1", Some(&oak), &[("trainer", "gary"), ("description", "lost")])
        .await?;
    assert_redirect(&res, "/pokemon/edit/1");
    let record = app.store.get_pokemon(1, None).await?.expect("record 1");
    assert_eq!(record.trainer, "ash");
    assert_eq!(record.description.as_deref(), Some("sparky"));

    let res = app
        .post_form("/pokemon/edit/1", Some(&oak), &[("trainer", "misty"), ("description", "traded")])
        .await?;
    assert_redirect(&res, "/");
    let record = app.store.get_pokemon(1, None).await?.expect("record 1");
    assert_eq!(record.trainer, "misty");
    Ok(())
}

#[tokio::test]
async fn add_with_unknown_species_creates_nothing() -> Result<()> {
    let app = TestApp::new().await?;

    let res = app
        .post_form("/pokemon/add", Some(&app.user("ash").await?), &[("pokemon_name", "missingno")])
        .await?;
    assert_redirect(&res, "/pokemon/add");
    assert_eq!(app.store.pokemon_count(), 3);

    let res = app
        .post_form("/pokemon/add", Some(&app.user("ash").await?), &[("pokemon_name", "   ")])
        .await?;
    assert_redirect(&res, "/pokemon/add");
    assert_eq!(app.store.pokemon_count(), 3);
    Ok(())
}

#[tokio::test]
async fn regular_user_always_owns_what_they_add() -> Result<()> {
    let app = TestApp::new().await?;

    let res = app
        .post_form(
            "/pokemon/add",
            Some(&app.user("ash").await?),
            &[("pokemon_name", "mr.  MIME"), ("trainer", "misty"), ("description", "mimic"), ("base_total", "460")],
        )
        .await?;
    assert_redirect(&res, "/");
    assert_eq!(app.store.pokemon_count(), 4);

    let scope = RowFilter { trainer: "ash".to_string() };
    let mine = app.store.search_pokemon("Mr. Mime", Some(&scope)).await?;
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].pokedex_number, 122);
    assert_eq!(mine[0].base_total, Some(460));
    Ok(())
}

#[tokio::test]
async fn manager_adds_for_existing_trainers_only() -> Result<()> {
    let app = TestApp::new().await?;
    let oak = app.manager().await?;

    let res = app
        .post_form("/pokemon/add", Some(&oak), &[("pokemon_name", "pikachu"), ("trainer", "misty")])
        .await?;
    assert_redirect(&res, "/");
    let scope = RowFilter { trainer: "misty".to_string() };
    assert_eq!(app.store.search_pokemon("Pikachu", Some(&scope)).await?.len(), 1);

    let res = app
        .post_form("/pokemon/add", Some(&oak), &[("pokemon_name", "pikachu"), ("trainer", "gary")])
        .await?;
    assert_redirect(&res, "/pokemon/add");
    assert_eq!(app.store.pokemon_count(), 4);
    Ok(())
}

#[tokio::test]
async fn invalid_base_total_rerenders_the_form() -> Result<()> {
    let app = TestApp::new().await?;

    let res = app
        .post_form(
            "/pokemon/add",
            Some(&app.user("ash").await?),
            &[("pokemon_name", "pikachu"), ("base_total", "lots")],
        )
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(body_text(res).await?.contains("base total must be a whole number"));
    assert_eq!(app.store.pokemon_count(), 3);
    Ok(())
}

#[tokio::test]
async fn anonymous_callers_are_sent_home() -> Result<()> {
    let app = TestApp::new().await?;

    assert_redirect(&app.get("/pokemon/add", None).await?, "/");
    assert_redirect(&app.post_form("/pokemon/add", None, &[("pokemon_name", "pikachu")]).await?, "/");
    assert_redirect(&app.get("/pokemon/edit/1", None).await?, "/");
    assert_redirect(&app.get("/pokemon/delete/1", None).await?, "/");
    assert_eq!(app.store.pokemon_count(), 3);
    Ok(())
}

#[tokio::test]
async fn store_failure_is_rendered_on_the_listing() -> Result<()> {
    let app = TestApp::new().await?;
    let ash = app.user("ash").await?;
    app.store.set_unavailable(true);

    let res = app.get("/", Some(&ash)).await?;
    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = body_text(res).await?;
    assert!(body.contains("database error"));
    assert!(!body.contains("sparky"));
    Ok(())
}
