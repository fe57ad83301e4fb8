//! Plan, apply, destroy and refresh
//!
//! All four start by reconciling recorded state with the database, so
//! records deleted out of band drop out of state before anything is
//! planned.

use super::Session;
use crate::Context;
use crate::progress::{ConsoleProgress, PromptConfirm};
use crate::ui;
use anyhow::{Result, bail};
use colored::Colorize;
use declarative::{Action, ExecuteOptions, ExecuteSummary, ExecutionPlan, Executor, RefreshSummary};

/// Show what apply would change
pub fn plan(ctx: &Context, target: Option<&str>) -> Result<()> {
    let mut session = Session::open(ctx, true)?;
    let refreshed = refresh_state(&mut session, target)?;
    report_refresh(ctx, &refreshed);

    let desired = session.config.resources()?;
    let plan = declarative::plan(
        &session.registry,
        &session.client,
        &desired,
        &session.state.state,
        target,
    )?;

    print_plan(&plan);
    Ok(())
}

/// Make the database match the configuration
pub fn apply(ctx: &Context, target: Option<&str>, dry_run: bool, yes: bool) -> Result<()> {
    let mut session = Session::open(ctx, true)?;
    let refreshed = refresh_state(&mut session, target)?;
    report_refresh(ctx, &refreshed);
    if !dry_run && !refreshed.removed.is_empty() {
        session.state.save()?;
    }

    let desired = session.config.resources()?;
    let plan = declarative::plan(
        &session.registry,
        &session.client,
        &desired,
        &session.state.state,
        target,
    )?;

    run_plan(ctx, &mut session, &plan, dry_run, yes)
}

/// Delete every managed resource
pub fn destroy(ctx: &Context, target: Option<&str>, yes: bool) -> Result<()> {
    let mut session = Session::open(ctx, false)?;
    let refreshed = refresh_state(&mut session, target)?;
    report_refresh(ctx, &refreshed);
    if !refreshed.removed.is_empty() {
        session.state.save()?;
    }

    let plan = declarative::plan_destroy(&session.state.state, target);
    run_plan(ctx, &mut session, &plan, false, yes)
}

/// Reconcile state with the database and save it
pub fn refresh(ctx: &Context, target: Option<&str>) -> Result<()> {
    let mut session = Session::open(ctx, false)?;
    let refreshed = refresh_state(&mut session, target)?;
    session.state.save()?;

    report_refresh(ctx, &refreshed);
    ui::success(&format!(
        "Refreshed {} resource(s), saved {}",
        refreshed.refreshed.len(),
        session.state.path().display()
    ));
    Ok(())
}

fn refresh_state(session: &mut Session, target: Option<&str>) -> Result<RefreshSummary> {
    Executor::new(&session.registry, &session.client).refresh(&mut session.state.state, target)
}

fn report_refresh(ctx: &Context, refreshed: &RefreshSummary) {
    if ctx.quiet {
        return;
    }
    for address in &refreshed.removed {
        ui::warn(&format!("{address} no longer exists in the database; removed from state"));
    }
}

fn run_plan(
    ctx: &Context,
    session: &mut Session,
    plan: &ExecutionPlan,
    dry_run: bool,
    yes: bool,
) -> Result<()> {
    print_plan(plan);
    if plan.is_empty() {
        return Ok(());
    }

    let opts = ExecuteOptions {
        dry_run,
        verbose: ctx.verbose > 0,
    };

    let mut state = std::mem::take(&mut session.state.state);
    let file = &mut session.state;
    let summary = Executor::new(&session.registry, &session.client).apply(
        plan,
        &mut state,
        &opts,
        &mut ConsoleProgress::new(ctx.quiet),
        &mut PromptConfirm::new(yes),
        |snapshot| file.persist(snapshot),
    );
    file.state = state;
    let summary = summary?;

    report_summary(&summary, dry_run)
}

// ============================================================================
// Output
// ============================================================================

fn print_plan(plan: &ExecutionPlan) {
    let summary = plan.summary();
    if !summary.has_changes() {
        ui::success("No changes. Database matches the configuration.");
        return;
    }

    ui::header("Planned changes");
    for diff in plan.changes() {
        let marker = ui::action_symbol(diff.action);
        let verb = match diff.action {
            Action::Create => "will be created".green(),
            Action::Update => "will be updated in place".yellow(),
            Action::Replace => "must be replaced".magenta(),
            Action::Delete => "will be destroyed".red(),
            Action::NoChange => "unchanged".normal(),
        };
        println!("  {marker} {} {verb}", diff.address.to_string().bold());

        for change in &diff.changes {
            let line = match diff.action {
                Action::Create => ui::format_value(&change.after),
                _ => format!(
                    "{} → {}",
                    ui::format_value(&change.before),
                    ui::format_value(&change.after)
                ),
            };
            let forces = if change.forces_replace {
                " (forces replacement)".magenta().to_string()
            } else {
                String::new()
            };
            println!("      {}: {line}{forces}", change.name.dimmed());
        }
    }

    println!();
    println!(
        "Plan: {} to add, {} to change, {} to replace, {} to destroy.",
        summary.additions, summary.updates, summary.replacements, summary.removals
    );
}

fn report_summary(summary: &ExecuteSummary, dry_run: bool) -> Result<()> {
    println!();
    if dry_run {
        ui::warn(&format!(
            "Dry run - {} change(s) not applied",
            summary.skipped
        ));
        return Ok(());
    }

    if summary.total_changes() == 0 && summary.failed == 0 {
        ui::info("Nothing applied.");
        return Ok(());
    }

    ui::kv("created", &summary.created.to_string());
    ui::kv("updated", &summary.modified.to_string());
    ui::kv("replaced", &summary.replaced.to_string());
    ui::kv("destroyed", &summary.removed.to_string());

    if !summary.is_success() {
        bail!("{} resource(s) failed", summary.failed);
    }
    ui::success("Apply complete.");
    Ok(())
}
