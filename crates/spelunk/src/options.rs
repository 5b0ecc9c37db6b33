//! Options used to build a [`Spelunker`](crate::Spelunker)

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::modifier::SecretModifier;
use crate::source::SecretSource;

/// Configuration a [`Spelunker`](crate::Spelunker) is built from.
///
/// Only reachable through [`SpelunkerOption`]s.
#[derive(Clone, Default)]
pub struct Options {
    pub(crate) trim_value: bool,
    pub(crate) sources: HashMap<String, Arc<dyn SecretSource>>,
    pub(crate) modifiers: HashMap<String, Arc<dyn SecretModifier>>,
}

impl fmt::Debug for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut sources: Vec<_> = self.sources.keys().collect();
        sources.sort();
        let mut modifiers: Vec<_> = self.modifiers.keys().collect();
        modifiers.sort();

        f.debug_struct("Options")
            .field("trim_value", &self.trim_value)
            .field("sources", &sources)
            .field("modifiers", &modifiers)
            .finish()
    }
}

/// One step of configuration, applied in order.
///
/// Later options win: registering a source or modifier under a kind that is
/// already taken replaces the previous registration.
pub struct SpelunkerOption(Box<dyn FnOnce(&mut Options) + Send>);

impl SpelunkerOption {
    /// Wrap an arbitrary configuration step
    pub fn new(apply: impl FnOnce(&mut Options) + Send + 'static) -> Self {
        Self(Box::new(apply))
    }

    pub(crate) fn apply(self, opts: &mut Options) {
        (self.0)(opts)
    }
}

impl fmt::Debug for SpelunkerOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SpelunkerOption")
    }
}

/// Trim leading and trailing whitespace from dug up secrets (the default)
pub fn with_trim_value() -> SpelunkerOption {
    SpelunkerOption::new(|opts| opts.trim_value = true)
}

/// Return dug up secrets exactly as the last step produced them
pub fn without_trim_value() -> SpelunkerOption {
    SpelunkerOption::new(|opts| opts.trim_value = false)
}

/// Register `source` under its [`kind`](SecretSource::kind)
pub fn with_source<S>(source: S) -> SpelunkerOption
where
    S: SecretSource + 'static,
{
    SpelunkerOption::new(move |opts| {
        opts.sources
            .insert(source.kind().to_string(), Arc::new(source));
    })
}

/// Register `modifier` under its [`kind`](SecretModifier::kind)
pub fn with_modifier<M>(modifier: M) -> SpelunkerOption
where
    M: SecretModifier + 'static,
{
    SpelunkerOption::new(move |opts| {
        opts.modifiers
            .insert(modifier.kind().to_string(), Arc::new(modifier));
    })
}

/// The option set every [`Spelunker`](crate::Spelunker) starts from
pub(crate) fn defaults() -> Vec<SpelunkerOption> {
    #[allow(unused_mut)]
    let mut opts = vec![
        with_trim_value(),
        with_source(crate::builtin::source::SecretSourcePlain),
    ];

    #[cfg(feature = "env")]
    opts.push(with_source(crate::builtin::source::SecretSourceEnv));

    #[cfg(feature = "file")]
    opts.push(with_source(crate::builtin::source::SecretSourceFile));

    #[cfg(feature = "base64")]
    {
        opts.push(with_source(crate::builtin::source::SecretSourceBase64));
        opts.push(with_modifier(crate::builtin::modifier::SecretModifierBase64));
    }

    #[cfg(feature = "jsonpath")]
    opts.push(with_modifier(crate::builtin::modifier::SecretModifierJsonPath));

    opts
}
