use axum::response::Html;

use super::{error_banner, escape, layout, search_form, table};
use crate::auth::Session;
use crate::database::models::{PokedexEntry, PokemonListing};

fn optional(value: Option<&str>) -> String {
    value.map(escape).unwrap_or_default()
}

fn listing_rows(rows: &[PokemonListing], with_actions: bool) -> Vec<Vec<String>> {
    rows.iter()
        .map(|p| {
            let mut cells = vec![
                escape(&p.name),
                p.pokedex_number.to_string(),
                escape(&p.trainer),
                optional(p.description.as_deref()),
                p.base_total.map(|b| b.to_string()).unwrap_or_default(),
            ];
            if with_actions {
                cells.push(format!(
                    r#"<a href="/pokemon/edit/{id}">Edit</a> <a href="/pokemon/delete/{id}">Delete</a>"#,
                    id = p.id
                ));
            }
            cells
        })
        .collect()
}

const LISTING_HEADERS: [&str; 5] = ["Name", "Pokedex #", "Trainer", "Description", "Base total"];

pub fn index_page(session: &Session, pokemon: &[PokemonListing], error_message: Option<&str>) -> Html<String> {
    let mut headers = LISTING_HEADERS.to_vec();
    headers.push("");
    let body = format!(
        "{}\n{}\n{}\n{}",
        error_banner(error_message),
        search_form("/searchPokemon", "Find my pokemon"),
        search_form("/searchPokedex", "Look up a species"),
        table(&headers, listing_rows(pokemon, true))
    );
    layout("Pokemon", session, &body)
}

pub fn pokemon_results_page(
    session: &Session,
    query: &str,
    pokemon: &[PokemonListing],
    error_message: Option<&str>,
) -> Html<String> {
    let body = format!(
        "{}\n<p>Results for \"{}\"</p>\n{}\n<p><a href=\"/\">Back</a></p>",
        error_banner(error_message),
        escape(query),
        table(&LISTING_HEADERS, listing_rows(pokemon, false))
    );
    layout("Search results", session, &body)
}

pub fn pokedex_results_page(
    session: &Session,
    query: &str,
    entries: &[PokedexEntry],
    error_message: Option<&str>,
) -> Html<String> {
    let rows = entries
        .iter()
        .map(|e| {
            vec![
                e.pokedex_number.to_string(),
                escape(&e.name),
                optional(e.type_1.as_deref()),
                optional(e.type_2.as_deref()),
            ]
        })
        .collect();
    let body = format!(
        "{}\n<p>Pokedex results for \"{}\"</p>\n{}\n<p><a href=\"/\">Back</a></p>",
        error_banner(error_message),
        escape(query),
        table(&["Pokedex #", "Name", "Type", "Second type"], rows)
    );
    layout("Pokedex", session, &body)
}

pub fn add_pokemon_page(session: &Session, error_message: Option<&str>) -> Html<String> {
    // Regular users always own what they add, so only managers pick a trainer
    let trainer_field = if session.is_manager() {
        format!(
            r#"  <label>Trainer <input name="trainer" value="{}"></label>"#,
            escape(session.username().unwrap_or_default())
        )
    } else {
        String::new()
    };
    let body = format!(
        r#"{}
<form method="post" action="/pokemon/add">
  <label>Species <input name="pokemon_name" required></label>
{}
  <label>Description <input name="description"></label>
  <label>Base total <input name="base_total" inputmode="numeric"></label>
  <button type="submit">Add</button>
</form>"#,
        error_banner(error_message),
        trainer_field
    );
    layout("Add pokemon", session, &body)
}

pub fn edit_pokemon_page(session: &Session, pokemon: &PokemonListing, error_message: Option<&str>) -> Html<String> {
    let trainer_field = if session.is_manager() {
        format!(r#"  <label>Trainer <input name="trainer" value="{}"></label>"#, escape(&pokemon.trainer))
    } else {
        String::new()
    };
    let body = format!(
        r#"{}
<p>{} #{}</p>
<form method="post" action="/pokemon/edit/{}">
{}
  <label>Description <input name="description" value="{}"></label>
  <label>Base total <input name="base_total" value="{}" inputmode="numeric"></label>
  <button type="submit">Save</button>
</form>"#,
        error_banner(error_message),
        escape(&pokemon.name),
        pokemon.pokedex_number,
        pokemon.id,
        trainer_field,
        optional(pokemon.description.as_deref()),
        pokemon.base_total.map(|b| b.to_string()).unwrap_or_default()
    );
    layout("Edit pokemon", session, &body)
}
