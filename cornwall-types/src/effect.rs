//! Effects chains: per-track ordered lists of named effects.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::param::Params;
use crate::TrackId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Effect {
    pub name: String,
    #[serde(default)]
    pub params: Params,
}

impl Effect {
    pub fn new(name: &str, params: Params) -> Self {
        Self {
            name: name.to_string(),
            params,
        }
    }

    /// `k=v k=v` form used by list/info output.
    pub fn params_display(&self) -> String {
        self.params
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// The effects document: track id (as a string key) to its ordered chain.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EffectsChains(BTreeMap<String, Vec<Effect>>);

impl EffectsChains {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn chain(&self, id: TrackId) -> &[Effect] {
        self.0.get(&id.to_string()).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, id: TrackId) -> bool {
        self.0.contains_key(&id.to_string())
    }

    /// Chain for `id`, created empty if absent.
    pub fn chain_mut(&mut self, id: TrackId) -> &mut Vec<Effect> {
        self.0.entry(id.to_string()).or_default()
    }

    pub fn insert_empty(&mut self, id: TrackId) {
        self.0.insert(id.to_string(), Vec::new());
    }

    pub fn remove(&mut self, id: TrackId) -> Option<Vec<Effect>> {
        self.0.remove(&id.to_string())
    }

    /// Track ids that have a chain. Keys that are not numeric are skipped.
    pub fn track_ids(&self) -> Vec<TrackId> {
        self.0.keys().filter_map(|k| k.parse().ok()).collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::param::{parse_params, ParamValue};

    #[test]
    fn chain_order_is_preserved() {
        let mut chains = EffectsChains::new();
        let id = TrackId::new(2);
        chains.insert_empty(id);
        chains.chain_mut(id).push(Effect::new("bass", Params::new()));
        chains.chain_mut(id).push(Effect::new("reverb", Params::new()));
        let names: Vec<_> = chains.chain(id).iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["bass", "reverb"]);
    }

    #[test]
    fn missing_chain_reads_as_empty() {
        let chains = EffectsChains::new();
        assert!(chains.chain(TrackId::new(9)).is_empty());
        assert!(!chains.contains(TrackId::new(9)));
    }

    #[test]
    fn document_uses_string_keys() {
        let mut chains = EffectsChains::new();
        let params = parse_params(&["gain=6"]).unwrap();
        chains.chain_mut(TrackId::new(1)).push(Effect::new("bass", params));
        let json = serde_json::to_value(&chains).unwrap();
        assert_eq!(json["1"][0]["name"], "bass");
        assert_eq!(json["1"][0]["params"]["gain"], 6);
    }

    #[test]
    fn params_default_when_absent() {
        let effect: Effect = serde_json::from_str(r#"{"name":"flanger"}"#).unwrap();
        assert!(effect.params.is_empty());
    }

    #[test]
    fn params_display_joins_pairs() {
        let mut params = Params::new();
        params.insert("delay_ms".into(), ParamValue::Int(350));
        params.insert("decay".into(), ParamValue::Float(0.4));
        let effect = Effect::new("delay", params);
        assert_eq!(effect.params_display(), "decay=0.4 delay_ms=350");
    }
}
