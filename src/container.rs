//! Typed service container.
//!
//! Providers bind services during boot; handlers and middleware read them
//! back through the request. One value per type: binding the same type
//! twice replaces the earlier value.
//!
//! Trait objects are bound through a sized handle:
//!
//! ```rust
//! use std::sync::Arc;
//! use trowel::Container;
//! use trowel::auth::{MemoryUsers, UserProvider};
//!
//! let mut container = Container::new();
//! container.bind::<Arc<dyn UserProvider>>(Arc::new(MemoryUsers::new()));
//! assert!(container.has::<Arc<dyn UserProvider>>());
//! ```

use std::any::{Any, TypeId, type_name};
use std::collections::HashMap;
use std::fmt;

use crate::error::Error;

#[derive(Default)]
pub struct Container {
    services: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl Container {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `value` as the container's `T`. Returns `&mut self` for chaining.
    pub fn bind<T: Send + Sync + 'static>(&mut self, value: T) -> &mut Self {
        self.services.insert(TypeId::of::<T>(), Box::new(value));
        self
    }

    pub fn get<T: Send + Sync + 'static>(&self) -> Option<&T> {
        self.services.get(&TypeId::of::<T>())?.downcast_ref()
    }

    /// Like [`get`](Container::get), but a missing binding is an error naming
    /// the type that was asked for.
    pub fn make<T: Send + Sync + 'static>(&self) -> Result<&T, Error> {
        self.get().ok_or(Error::MissingService(type_name::<T>()))
    }

    pub fn has<T: Send + Sync + 'static>(&self) -> bool {
        self.services.contains_key(&TypeId::of::<T>())
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container").field("services", &self.services.len()).finish()
    }
}
