//! Inspect and edit the state file without touching the database

use crate::Context;
use crate::cli::StateCommand;
use crate::state::StateFile;
use crate::ui;
use anyhow::{Result, bail};
use declarative::Address;

pub fn run(ctx: &Context, cmd: StateCommand) -> Result<()> {
    match cmd {
        StateCommand::List => list(ctx),
        StateCommand::Show { address } => show(ctx, &address),
        StateCommand::Rm { address } => rm(ctx, &address),
    }
}

fn list(ctx: &Context) -> Result<()> {
    let file = StateFile::load(&ctx.state_path)?;
    if file.state.is_empty() {
        if !ctx.quiet {
            ui::dim("No resources in state.");
        }
        return Ok(());
    }

    for address in file.state.addresses() {
        println!("{address}");
    }
    Ok(())
}

fn show(ctx: &Context, address: &str) -> Result<()> {
    let address: Address = address.parse()?;
    let file = StateFile::load(&ctx.state_path)?;

    let Some(attributes) = file.state.get(&address) else {
        bail!("{address} is not in state");
    };

    ui::header(&address.to_string());
    match attributes.as_object() {
        Some(map) => {
            for (name, value) in map {
                ui::kv(name, &ui::format_value(value));
            }
        }
        None => println!("{}", serde_json::to_string_pretty(attributes)?),
    }
    Ok(())
}

fn rm(ctx: &Context, address: &str) -> Result<()> {
    let address: Address = address.parse()?;
    let mut file = StateFile::load(&ctx.state_path)?;

    if file.state.remove(&address).is_none() {
        bail!("{address} is not in state");
    }
    file.save()?;

    log::info!("Removed {address} from {}", file.path().display());
    ui::success(&format!(
        "Removed {address} from state; the database record was left alone"
    ));
    Ok(())
}
