use crate::{
    domain::ids::UserId, infra::config::IdentityConfig, usecases::contracts::IdentityProvider,
};

/// Current user taken from configuration (or the `--as` override).
#[derive(Debug, Clone)]
pub struct ConfigIdentity {
    user_id: Option<UserId>,
}

impl ConfigIdentity {
    pub fn from_config(config: &IdentityConfig) -> Self {
        Self {
            user_id: config
                .user_id
                .as_deref()
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .map(UserId::new),
        }
    }
}

impl IdentityProvider for ConfigIdentity {
    fn current_user_id(&self) -> Option<UserId> {
        self.user_id.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_configured_user_id() {
        let identity = ConfigIdentity::from_config(&IdentityConfig {
            user_id: Some(" tenant-1 ".to_owned()),
        });

        assert_eq!(identity.current_user_id(), Some(UserId::new("tenant-1")));
    }

    #[test]
    fn missing_user_id_yields_none() {
        let identity = ConfigIdentity::from_config(&IdentityConfig::default());

        assert_eq!(identity.current_user_id(), None);
    }
}
