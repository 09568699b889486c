//! Front-end presets.
//!
//! A preset names a front-end stack and the packages it adds to the
//! project's `package.json`. The registry only records them by name;
//! installing them is left to the tool that reads the registry.

use std::fmt;

/// `(package, version requirement)`
pub type Package = (&'static str, &'static str);

pub trait Preset: Send + Sync {
    fn name(&self) -> &'static str;
    fn packages(&self) -> &'static [Package];
}

pub struct Bootstrap;
pub struct Tailwind;
pub struct Vue;
pub struct React;

impl Preset for Bootstrap {
    fn name(&self) -> &'static str { "bootstrap" }
    fn packages(&self) -> &'static [Package] {
        &[("bootstrap", "^4.0.0"), ("jquery", "^3.2"), ("popper.js", "^1.12")]
    }
}

impl Preset for Tailwind {
    fn name(&self) -> &'static str { "tailwind" }
    fn packages(&self) -> &'static [Package] {
        &[("tailwindcss", "^1.0")]
    }
}

impl Preset for Vue {
    fn name(&self) -> &'static str { "vue" }
    fn packages(&self) -> &'static [Package] {
        &[("vue", "^2.5.17"), ("vue-template-compiler", "^2.5.17")]
    }
}

impl Preset for React {
    fn name(&self) -> &'static str { "react" }
    fn packages(&self) -> &'static [Package] {
        &[("@babel/preset-react", "^7.0.0"), ("react", "^16.2.0"), ("react-dom", "^16.2.0")]
    }
}

/// Named preset registry, in insertion order.
#[derive(Default)]
pub struct Presets {
    presets: Vec<Box<dyn Preset>>,
}

impl Presets {
    pub fn new() -> Self {
        Self::default()
    }

    /// The four presets the framework ships with.
    pub fn builtin() -> Self {
        let mut presets = Self::new();
        presets.add(Bootstrap);
        presets.add(Tailwind);
        presets.add(Vue);
        presets.add(React);
        presets
    }

    /// Adds `preset`, replacing one already registered under the same name.
    pub fn add(&mut self, preset: impl Preset + 'static) {
        self.presets.retain(|p| p.name() != preset.name());
        self.presets.push(Box::new(preset));
    }

    pub fn get(&self, name: &str) -> Option<&dyn Preset> {
        self.presets.iter().find(|p| p.name() == name).map(|p| p.as_ref())
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.presets.iter().map(|p| p.name()).collect()
    }
}

impl fmt::Debug for Presets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Custom;

    impl Preset for Custom {
        fn name(&self) -> &'static str { "vue" }
        fn packages(&self) -> &'static [Package] { &[("vue", "^3.0.0")] }
    }

    #[test]
    fn builtin_registers_four() {
        assert_eq!(Presets::builtin().names(), ["bootstrap", "tailwind", "vue", "react"]);
    }

    #[test]
    fn same_name_replaces() {
        let mut presets = Presets::builtin();
        presets.add(Custom);
        assert_eq!(presets.names(), ["bootstrap", "tailwind", "react", "vue"]);
        assert_eq!(presets.get("vue").unwrap().packages(), [("vue", "^3.0.0")]);
        assert!(presets.get("svelte").is_none());
    }
}
