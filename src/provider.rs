//! Service providers.
//!
//! Providers are how services get into the [`Container`]. Booting an
//! application runs two passes: every provider's `register`, then every
//! provider's `boot`. `register` may only bind; `boot` may rely on anything
//! any provider registered.

use std::sync::Arc;

use tracing::debug;

use crate::auth::{PasswordHasher, Signer, UserProvider};
use crate::config::Config;
use crate::container::Container;
use crate::error::Error;
use crate::presets::Presets;

pub trait ServiceProvider: Send + Sync {
    fn name(&self) -> &'static str;

    fn register(&self, _container: &mut Container) -> Result<(), Error> {
        Ok(())
    }

    fn boot(&self, _container: &Container) -> Result<(), Error> {
        Ok(())
    }
}

/// Binds the framework's own services from the [`Config`]: the token
/// [`Signer`], the [`PasswordHasher`] and the built-in [`Presets`].
pub struct FrameworkProvider;

impl ServiceProvider for FrameworkProvider {
    fn name(&self) -> &'static str { "framework" }

    fn register(&self, container: &mut Container) -> Result<(), Error> {
        let config = container.make::<Config>()?;
        let signer = Signer::new(&config.key);
        let hasher = PasswordHasher::new(config.password_iterations);
        container
            .bind(signer)
            .bind(hasher)
            .bind(Presets::builtin());
        Ok(())
    }

    fn boot(&self, container: &Container) -> Result<(), Error> {
        debug!(presets = ?container.make::<Presets>()?.names(), "presets registered");
        Ok(())
    }
}

/// Binds the user store auth reads from.
pub struct AuthProvider {
    users: Arc<dyn UserProvider>,
}

impl AuthProvider {
    pub fn new(users: Arc<dyn UserProvider>) -> Self {
        Self { users }
    }
}

impl ServiceProvider for AuthProvider {
    fn name(&self) -> &'static str { "auth" }

    fn register(&self, container: &mut Container) -> Result<(), Error> {
        container.bind(Arc::clone(&self.users));
        Ok(())
    }

    fn boot(&self, container: &Container) -> Result<(), Error> {
        container.make::<Signer>()?;
        container.make::<PasswordHasher>()?;
        Ok(())
    }
}
