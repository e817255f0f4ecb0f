//! Effects chain to engine directives.

use cornwall_audio::EffectDirective;
use cornwall_types::{lookup_effect, Effect};

use crate::{CornwallError, Result};

/// One directive per effect, in chain order. Parameter values are passed
/// through unchecked; the engine rejects what it cannot use.
pub fn compile(chain: &[Effect]) -> Result<Vec<EffectDirective>> {
    chain.iter().map(compile_effect).collect()
}

/// Arguments follow the catalog's parameter order. An absent parameter
/// takes its default, or is skipped if it has none.
pub fn compile_effect(effect: &Effect) -> Result<EffectDirective> {
    let spec =
        lookup_effect(&effect.name).ok_or_else(|| CornwallError::UnknownEffect(effect.name.clone()))?;

    let mut args = Vec::with_capacity(spec.params.len());
    for param in spec.params {
        let value = match effect.params.get(param.name) {
            Some(value) => value.to_string(),
            None => match param.default {
                Some(default) => default.to_string(),
                None => continue,
            },
        };
        args.push(format!("{}{}", param.prefix, value));
    }

    for key in effect.params.keys() {
        if !spec.params.iter().any(|p| p.name == key) {
            log::warn!(target: "effects", "{}: ignoring unknown parameter '{}'", spec.name, key);
        }
    }

    Ok(EffectDirective::new(spec.engine_name, args))
}
