//! Server-rendered pages. Every interpolated value goes through [`escape`].

use axum::response::Html;

use crate::auth::Session;

mod pokemon;
mod users;

pub use pokemon::{add_pokemon_page, edit_pokemon_page, index_page, pokedex_results_page, pokemon_results_page};
pub use users::{edit_user_page, users_page};

pub fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

pub(crate) fn layout(title: &str, session: &Session, body: &str) -> Html<String> {
    let nav = match session {
        Session::Authenticated { username, level, .. } => {
            let users_link = if level.is_manager() { r#" | <a href="/users">Users</a>"# } else { "" };
            format!(
                r#"<nav><a href="/">Pokemon</a> | <a href="/pokemon/add">Add</a>{} | signed in as {} ({}) | <a href="/logout">Log out</a></nav>"#,
                users_link,
                escape(username),
                level.label()
            )
        }
        Session::Anonymous => String::new(),
    };

    Html(format!(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>{}</title></head>\n<body>\n{}\n<h1>{}</h1>\n{}\n</body>\n</html>\n",
        escape(title),
        nav,
        escape(title),
        body
    ))
}

pub(crate) fn error_banner(message: Option<&str>) -> String {
    match message {
        Some(msg) if !msg.is_empty() => format!("<p class=\"error\">{}</p>", escape(msg)),
        _ => String::new(),
    }
}

pub(crate) fn table(headers: &[&str], rows: Vec<Vec<String>>) -> String {
    if rows.is_empty() {
        return "<p>No results.</p>".to_string();
    }
    let head: String = headers.iter().map(|h| format!("<th>{}</th>", escape(h))).collect();
    let body: String = rows
        .into_iter()
        .map(|cells| format!("<tr>{}</tr>", cells.into_iter().map(|c| format!("<td>{}</td>", c)).collect::<String>()))
        .collect();
    format!("<table>\n<thead><tr>{}</tr></thead>\n<tbody>{}</tbody>\n</table>", head, body)
}

pub fn login_page(error_message: &str) -> Html<String> {
    let body = format!(
        r#"{}
<form method="post" action="/login">
  <label>Username <input name="username" required></label>
  <label>Password <input name="password" type="password" required></label>
  <button type="submit">Log in</button>
</form>
{}"#,
        error_banner(Some(error_message)),
        search_form("/searchPokedex", "Look up a species")
    );
    layout("Login", &Session::Anonymous, &body)
}

pub fn error_page(message: &str, session: &Session) -> Html<String> {
    let body = format!("{}\n<p><a href=\"/\">Back</a></p>", error_banner(Some(message)));
    layout("Something went wrong", session, &body)
}

pub(crate) fn search_form(action: &str, label: &str) -> String {
    format!(
        r#"<form method="post" action="{}">
  <label>{} <input name="pokemon_name"></label>
  <button type="submit">Search</button>
</form>"#,
        escape(action),
        escape(label)
    )
}
