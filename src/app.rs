use anyhow::Result;

use crate::{
    cli::{Cli, Command, RunArgs},
    domain::{
        self,
        ids::{ContextId, UserId},
    },
    infra, realtime, ui,
    usecases::{self, bootstrap, conversation::NavigationTarget},
};

pub fn run(cli: Cli) -> Result<()> {
    match cli.command_or_default() {
        Command::Run => {
            let args = &cli.run;
            let (context, _log_guard) =
                bootstrap::bootstrap(cli.config.as_deref(), args.as_user.as_deref())?;

            tracing::debug!(
                ui = ui::module_name(),
                domain = domain::module_name(),
                realtime = realtime::module_name(),
                usecases = usecases::module_name(),
                infra = infra::module_name(),
                "module boundaries loaded"
            );

            let target = navigation_target(args);
            let mut shell = bootstrap::compose_shell(&context, target)?;
            ui::shell::start(
                &context,
                shell.event_source.as_mut(),
                shell.orchestrator.as_mut(),
            )?;
        }
    }

    Ok(())
}

fn navigation_target(args: &RunArgs) -> Option<NavigationTarget> {
    let target = NavigationTarget {
        participant: args.participant.as_deref().map(UserId::new),
        context_id: args.context.as_deref().map(ContextId::new),
    };
    (!target.is_empty()).then_some(target)
}
