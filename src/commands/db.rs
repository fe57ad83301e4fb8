//! Direct edits to the persons database
//!
//! These bypass state entirely, which makes them handy for seeding records
//! to import or for simulating drift.

use super::open_client;
use crate::Context;
use crate::cli::DbCommand;
use crate::config::DesiredConfig;
use crate::ui;
use anyhow::{Result, bail};
use persondb::Error as StoreError;
use colored::Colorize;
use persondb::{Client, Person};

pub fn run(ctx: &Context, cmd: DbCommand) -> Result<()> {
    let config = DesiredConfig::load_or_default(&ctx.config_path)?;
    let client = open_client(ctx, &config)?;

    match cmd {
        DbCommand::List => list(ctx, &client),
        DbCommand::Get { person_id } => get(&client, &person_id),
        DbCommand::Put {
            person_id,
            last_name,
            first_name,
        } => put(&client, &person_id, &last_name, first_name.as_deref()),
        DbCommand::Rm { person_id } => rm(&client, &person_id),
    }
}

fn list(ctx: &Context, client: &Client) -> Result<()> {
    let persons = client.list_persons().map_err(store_error)?;
    if persons.is_empty() {
        if !ctx.quiet {
            ui::dim("No persons in the database.");
        }
        return Ok(());
    }

    for person in &persons {
        println!("{}", describe(person));
    }
    Ok(())
}

fn get(client: &Client, person_id: &str) -> Result<()> {
    let Some(person) = client.read_person(person_id).map_err(store_error)? else {
        bail!("Person {person_id} not found in the database");
    };
    println!("{}", describe(&person));
    Ok(())
}

fn put(client: &Client, person_id: &str, last_name: &str, first_name: Option<&str>) -> Result<()> {
    if client.exists(person_id).map_err(store_error)? {
        client
            .update_person(person_id, last_name, first_name)
            .map_err(store_error)?;
        ui::success(&format!("Updated {person_id}"));
    } else {
        client
            .create_person(person_id, last_name, first_name)
            .map_err(store_error)?;
        ui::success(&format!("Created {person_id}"));
    }
    Ok(())
}

fn rm(client: &Client, person_id: &str) -> Result<()> {
    client.delete_person(person_id).map_err(store_error)?;
    ui::success(&format!("Deleted {person_id}"));
    Ok(())
}

/// Lead with the error's category, e.g. "Person not found: ..."
fn store_error(err: StoreError) -> anyhow::Error {
    let category = err.category().description();
    anyhow::Error::new(err).context(category)
}

fn describe(person: &Person) -> String {
    match &person.first_name {
        Some(first) => format!(
            "{}  {} {}",
            person.person_id.bold(),
            first,
            person.last_name
        ),
        None => format!("{}  {}", person.person_id.bold(), person.last_name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_creates_then_updates() {
        let client = Client::in_memory();

        put(&client, "p1", "Doe", None).unwrap();
        put(&client, "p1", "Roe", Some("Jane")).unwrap();

        let person = client.read_person("p1").unwrap().unwrap();
        assert_eq!(person.last_name, "Roe");
        assert_eq!(person.first_name.as_deref(), Some("Jane"));
    }

    #[test]
    fn test_rm_missing_reports_category() {
        let client = Client::in_memory();

        let err = rm(&client, "ghost").unwrap_err();
        assert_eq!(err.to_string(), "Person not found");
        assert!(format!("{err:#}").contains("ghost"));
    }

    #[test]
    fn test_get_missing() {
        let err = get(&Client::in_memory(), "ghost").unwrap_err();
        assert!(err.to_string().contains("not found"));
    }
}
