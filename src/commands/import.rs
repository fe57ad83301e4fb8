use super::Session;
use crate::Context;
use crate::ui;
use anyhow::Result;
use declarative::{Address, Executor};

/// Adopt an existing record into state under `address`
pub fn run(ctx: &Context, address: &str, id: &str) -> Result<()> {
    let address: Address = address.parse()?;
    let mut session = Session::open(ctx, false)?;

    let imported = Executor::new(&session.registry, &session.client).import(
        &mut session.state.state,
        &address,
        id,
    )?;
    session.state.save()?;

    ui::success(&format!("Imported {id} as {address}"));
    if !ctx.quiet
        && let Some(attributes) = imported.as_object()
    {
        for (name, value) in attributes {
            ui::kv(name, &ui::format_value(value));
        }
    }
    Ok(())
}
