use anyhow::Result;

use crate::{
    domain::events::AppEvent,
    usecases::{
        context::AppContext,
        contracts::{AppEventSource, ShellOrchestrator},
    },
};

use super::{terminal::TerminalSession, view};

pub fn start(
    context: &AppContext,
    event_source: &mut dyn AppEventSource,
    orchestrator: &mut dyn ShellOrchestrator,
) -> Result<()> {
    tracing::info!(
        log_level = %context.config.logging.level,
        viewer = %context.viewer,
        "starting TUI shell"
    );

    let mut terminal = TerminalSession::new()?;
    orchestrator.handle_event(AppEvent::Resized {
        width: terminal.width()?,
    })?;

    let outcome = run_loop(&mut terminal, event_source, orchestrator);
    orchestrator.shutdown();
    outcome
}

fn run_loop(
    terminal: &mut TerminalSession,
    event_source: &mut dyn AppEventSource,
    orchestrator: &mut dyn ShellOrchestrator,
) -> Result<()> {
    while orchestrator.state().is_running() {
        terminal.draw(|frame| view::render(frame, orchestrator.view()))?;
        dispatch_next(event_source, orchestrator)?;
    }

    Ok(())
}

/// Feeds at most one event to the orchestrator.
fn dispatch_next(
    event_source: &mut dyn AppEventSource,
    orchestrator: &mut dyn ShellOrchestrator,
) -> Result<()> {
    if let Some(event) = event_source.next_event()? {
        orchestrator.handle_event(event)?;
    }
    Ok(())
}
