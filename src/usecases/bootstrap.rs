use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;

use crate::{
    domain::{presence::PresenceWindows, typing::TypingTimings},
    infra::{
        self,
        clock::SystemClock,
        config::{AppConfig, FileConfigAdapter},
        contracts::ConfigAdapter,
        error::AppError,
        identity::ConfigIdentity,
        memory_backend::InMemoryBackend,
        notifier::LogNotifier,
        seed::{apply_seed, load_seed_file},
        storage_layout::StorageLayout,
    },
    realtime::typing::RemoteTypingWindows,
    ui::CrosstermEventSource,
    usecases::{
        context::AppContext,
        contracts::{AppEventSource, Clock, IdentityProvider, ShellOrchestrator},
        conversation::{
            ConversationController, ConversationPorts, ConversationSettings, NavigationTarget,
        },
        shell::DefaultShellOrchestrator,
    },
};

pub struct ShellComposition {
    pub event_source: Box<dyn AppEventSource>,
    pub orchestrator: Box<dyn ShellOrchestrator>,
}

/// Loads config, resolves the current user and starts logging. The guard must
/// outlive the shell.
pub fn bootstrap(
    config_path: Option<&Path>,
    user_override: Option<&str>,
) -> anyhow::Result<(AppContext, WorkerGuard)> {
    let layout = StorageLayout::resolve()?;
    layout.ensure_dirs()?;

    let default_config = layout.default_config_file();
    let config_path = match config_path {
        Some(path) => Some(path),
        None => default_config.exists().then_some(default_config.as_path()),
    };
    let context = build_context(config_path, user_override)?;
    let guard = infra::logging::init(&context.config.logging, &layout.log_dir)?;

    tracing::info!(
        viewer = %context.viewer,
        config = ?config_path,
        "bootstrap complete"
    );
    Ok((context, guard))
}

fn build_context(config_path: Option<&Path>, user_override: Option<&str>) -> anyhow::Result<AppContext> {
    let config_adapter = FileConfigAdapter::new(config_path).with_user_override(user_override);
    let config = config_adapter.load()?;

    let viewer = ConfigIdentity::from_config(&config.identity)
        .current_user_id()
        .ok_or(AppError::MissingIdentity)?;

    Ok(AppContext::new(config, viewer))
}

pub fn conversation_settings(config: &AppConfig) -> ConversationSettings {
    ConversationSettings {
        poll_interval_ms: millis(config.realtime.poll_interval_ms),
        target_retry_delay_ms: millis(config.realtime.target_retry_delay_ms),
        page_size: config.realtime.page_size,
        typing: TypingTimings {
            idle_timeout_ms: millis(config.typing.idle_timeout_ms),
            refresh_interval_ms: millis(config.typing.refresh_interval_ms),
        },
        remote_typing: RemoteTypingWindows {
            stale_after_ms: millis(config.typing.stale_after_ms),
            clear_after_ms: millis(config.typing.clear_after_ms),
        },
        heartbeat_interval_ms: millis(config.presence.heartbeat_interval_ms),
        presence: PresenceWindows {
            online_fresh_ms: millis(config.presence.online_fresh_ms),
            recently_active_ms: millis(config.presence.recently_active_ms),
        },
    }
}

fn millis(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

/// Builds the backend, seeds it when configured and mounts the conversation view.
pub fn build_conversation(
    context: &AppContext,
    target: Option<NavigationTarget>,
    clock: &dyn Clock,
) -> Result<ConversationController, AppError> {
    let backend = InMemoryBackend::new();
    if let Some(seed_path) = &context.config.backend.seed_file {
        apply_seed(&backend, load_seed_file(seed_path)?);
    }

    let mut conversation = ConversationController::new(
        context.viewer.clone(),
        conversation_settings(&context.config),
        ConversationPorts {
            messages: Box::new(backend.clone()),
            typing: Box::new(backend.clone()),
            presence: Box::new(backend.clone()),
            transport: Box::new(backend),
            notifier: Box::new(LogNotifier),
        },
    );
    conversation.mount(target, clock.now_ms());
    Ok(conversation)
}

pub fn compose_shell(
    context: &AppContext,
    target: Option<NavigationTarget>,
) -> Result<ShellComposition, AppError> {
    let clock = SystemClock;
    let conversation = build_conversation(context, target, &clock)?;

    Ok(ShellComposition {
        event_source: Box::new(CrosstermEventSource::default()),
        orchestrator: Box::new(DefaultShellOrchestrator::new(conversation, Box::new(clock))),
    })
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::{domain::ids::UserId, usecases::contracts::Clock};

    struct FixedClock(i64);

    impl Clock for FixedClock {
        fn now_ms(&self) -> i64 {
            self.0
        }
    }

    #[test]
    fn missing_identity_fails_with_clear_error() {
        let error = build_context(Some(Path::new("./missing-config.toml")), None)
            .expect_err("identity is required");

        assert!(matches!(
            error.downcast_ref::<AppError>(),
            Some(AppError::MissingIdentity)
        ));
    }

    #[test]
    fn builds_context_with_defaults_and_user_override() {
        let context = build_context(Some(Path::new("./missing-config.toml")), Some("tenant-1"))
            .expect("context should build from defaults");

        assert_eq!(context.viewer, UserId::new("tenant-1"));
        assert_eq!(context.config.realtime, AppConfig::default().realtime);
    }

    #[test]
    fn settings_follow_configured_timings() {
        let mut config = AppConfig::default();
        config.typing.idle_timeout_ms = 2_500;
        config.presence.online_fresh_ms = 90_000;

        let settings = conversation_settings(&config);

        assert_eq!(settings.typing.idle_timeout_ms, 2_500);
        assert_eq!(settings.presence.online_fresh_ms, 90_000);
        assert_eq!(settings.poll_interval_ms, 10_000);
    }

    #[test]
    fn default_config_yields_default_settings() {
        assert_eq!(
            conversation_settings(&AppConfig::default()),
            ConversationSettings::default()
        );
    }

    #[test]
    fn seeded_conversation_mounts_on_target() {
        let temp_dir = tempfile::tempdir().expect("tempdir");
        let seed_path = temp_dir.path().join("seed.toml");
        fs::write(
            &seed_path,
            r#"[[messages]]
sender = "owner-7"
recipient = "tenant-1"
context = "listing-42"
text = "Viewing on Friday?"
created_at_ms = 100
"#,
        )
        .expect("write seed");

        let mut config = AppConfig::default();
        config.backend.seed_file = Some(seed_path);
        let context = AppContext::new(config, UserId::new("tenant-1"));

        let conversation = build_conversation(
            &context,
            Some(NavigationTarget {
                participant: Some(UserId::new("owner-7")),
                context_id: None,
            }),
            &FixedClock(1_000),
        )
        .expect("conversation must build");

        assert!(conversation.active().is_open());
        assert_eq!(conversation.thread_list().threads().len(), 1);
    }
}
