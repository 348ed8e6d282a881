mod common;

use anyhow::Result;
use axum::http::StatusCode;
use common::{assert_redirect, body_text, set_cookie, TestApp, PASSWORD};
use pokemon_trainers::config::UserAdminAccess;
use pokemon_trainers::database::models::Level;
use pokemon_trainers::database::Store;

#[tokio::test]
async fn manager_sees_user_list() -> Result<()> {
    let app = TestApp::new().await?;

    let res = app.get("/users", Some(&app.manager().await?)).await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body = body_text(res).await?;
    assert!(body.contains(r#"href="/users/edit/ash""#));
    assert!(body.contains(r#"href="/users/delete/misty""#));
    assert!(!body.contains("$2b$"));
    Ok(())
}

#[tokio::test]
async fn regular_user_denied_when_manager_only() -> Result<()> {
    let app = TestApp::with_user_admin(UserAdminAccess::ManagerOnly).await?;
    let ash = app.user("ash").await?;

    assert_redirect(&app.get("/users", Some(&ash)).await?, "/");
    assert_redirect(&app.get("/users/edit/misty", Some(&ash)).await?, "/");
    assert_redirect(&app.get("/users/delete/misty", Some(&ash)).await?, "/");

    let res = app
        .post_form("/users", Some(&ash), &[("username", "brock"), ("password", "onix")])
        .await?;
    assert_redirect(&res, "/");
    assert!(app.store.find_user("brock").await?.is_none());
    assert!(app.store.find_user("misty").await?.is_some());
    Ok(())
}

#[tokio::test]
async fn regular_user_allowed_when_any_authenticated() -> Result<()> {
    let app = TestApp::with_user_admin(UserAdminAccess::AnyAuthenticated).await?;

    let res = app.get("/users", Some(&app.user("ash").await?)).await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(body_text(res).await?.contains(r#"href="/users/edit/misty""#));

    // Still closed to anonymous callers
    assert_redirect(&app.get("/users", None).await?, "/");
    Ok(())
}

#[tokio::test]
async fn created_user_can_log_in() -> Result<()> {
    let app = TestApp::new().await?;

    let res = app
        .post_form(
            "/users",
            Some(&app.manager().await?),
            &[("username", "brock"), ("password", "onix-rock"), ("level", "u")],
        )
        .await?;
    assert_redirect(&res, "/users");

    let brock = app.store.find_user("brock").await?.expect("brock");
    assert_eq!(brock.level, Level::User);
    assert_ne!(brock.password, "onix-rock");

    let res = app
        .post_form("/login", None, &[("username", "brock"), ("password", "onix-rock")])
        .await?;
    assert_redirect(&res, "/");
    assert!(set_cookie(&res).is_some());
    Ok(())
}

#[tokio::test]
async fn duplicate_and_invalid_users_are_reported() -> Result<()> {
    let app = TestApp::new().await?;
    let oak = app.manager().await?;

    let res = app
        .post_form("/users", Some(&oak), &[("username", "ash"), ("password", "x")])
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(body_text(res).await?.contains("already exists"));

    let res = app
        .post_form("/users", Some(&oak), &[("username", "brock"), ("password", "")])
        .await?;
    assert!(body_text(res).await?.contains("password must not be empty"));

    let res = app
        .post_form("/users", Some(&oak), &[("username", "brock"), ("password", "x"), ("level", "admin")])
        .await?;
    assert!(body_text(res).await?.contains("unknown user level"));
    assert!(app.store.find_user("brock").await?.is_none());
    Ok(())
}

#[tokio::test]
async fn edit_changes_level_and_password() -> Result<()> {
    let app = TestApp::new().await?;

    let res = app.get("/users/edit/ash", Some(&app.manager().await?)).await?;
    assert_eq!(res.status(), StatusCode::OK);

    let res = app
        .post_form(
            "/users/edit/ash",
            Some(&app.manager().await?),
            &[("password", "new-secret"), ("level", "m")],
        )
        .await?;
    assert_redirect(&res, "/users");
    let ash = app.store.find_user("ash").await?.expect("ash");
    assert_eq!(ash.level, Level::Manager);

    let res = app
        .post_form("/login", None, &[("username", "ash"), ("password", PASSWORD)])
        .await?;
    assert!(body_text(res).await?.contains("Invalid login"));

    let res = app
        .post_form("/login", None, &[("username", "ash"), ("password", "new-secret")])
        .await?;
    assert_redirect(&res, "/");
    Ok(())
}

#[tokio::test]
async fn blank_password_on_edit_keeps_the_old_one() -> Result<()> {
    let app = TestApp::new().await?;

    let res = app
        .post_form("/users/edit/misty", Some(&app.manager().await?), &[("password", ""), ("level", "u")])
        .await?;
    assert_redirect(&res, "/users");

    let res = app
        .post_form("/login", None, &[("username", "misty"), ("password", PASSWORD)])
        .await?;
    assert_redirect(&res, "/");
    Ok(())
}

#[tokio::test]
async fn user_owning_pokemon_cannot_be_deleted() -> Result<()> {
    let app = TestApp::new().await?;

    let res = app.get("/users/delete/ash", Some(&app.manager().await?)).await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(body_text(res).await?.contains("still owns 2 pokemon"));
    assert!(app.store.find_user("ash").await?.is_some());
    Ok(())
}

#[tokio::test]
async fn manager_cannot_delete_themselves() -> Result<()> {
    let app = TestApp::new().await?;

    let res = app.get("/users/delete/oak", Some(&app.manager().await?)).await?;
    assert!(body_text(res).await?.contains("you cannot delete your own account"));
    assert!(app.store.find_user("oak").await?.is_some());
    Ok(())
}

#[tokio::test]
async fn user_without_pokemon_is_deleted() -> Result<()> {
    let app = TestApp::new().await?;
    let oak = app.manager().await?;

    app.post_form("/users", Some(&oak), &[("username", "brock"), ("password", "onix")])
        .await?;
    assert!(app.store.find_user("brock").await?.is_some());

    let res = app.get("/users/delete/brock", Some(&oak)).await?;
    assert_redirect(&res, "/users");
    assert!(app.store.find_user("brock").await?.is_none());
    Ok(())
}
