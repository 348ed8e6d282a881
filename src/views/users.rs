use axum::response::Html;

use super::{error_banner, escape, layout, table};
use crate::auth::Session;
use crate::database::models::{Level, User};

fn level_select(current: Level) -> String {
    let option = |level: Level| {
        let selected = if level == current { " selected" } else { "" };
        format!(r#"<option value="{}"{}>{}</option>"#, level.as_str(), selected, level.label())
    };
    format!(
        r#"<select name="level">{}{}</select>"#,
        option(Level::User),
        option(Level::Manager)
    )
}

pub fn users_page(session: &Session, users: &[User], error_message: Option<&str>) -> Html<String> {
    let rows = users
        .iter()
        .map(|u| {
            let name = escape(&u.username);
            vec![
                name.clone(),
                u.level.label().to_string(),
                format!(
                    r#"<a href="/users/edit/{name}">Edit</a> <a href="/users/delete/{name}">Delete</a>"#,
                    name = name
                ),
            ]
        })
        .collect();
    let body = format!(
        r#"{}
{}
<h2>New user</h2>
<form method="post" action="/users">
  <label>Username <input name="username" required></label>
  <label>Password <input name="password" type="password" required></label>
  {}
  <button type="submit">Create</button>
</form>"#,
        error_banner(error_message),
        table(&["Username", "Level", ""], rows),
        level_select(Level::User)
    );
    layout("Users", session, &body)
}

pub fn edit_user_page(session: &Session, user: &User, error_message: Option<&str>) -> Html<String> {
    let name = escape(&user.username);
    let body = format!(
        r#"{}
<form method="post" action="/users/edit/{}">
  <p>{}</p>
  <label>New password <input name="password" type="password" placeholder="leave blank to keep"></label>
  {}
  <button type="submit">Save</button>
</form>"#,
        error_banner(error_message),
        name,
        name,
        level_select(user.level)
    );
    layout("Edit user", session, &body)
}
