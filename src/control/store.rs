use crate::effects::params::{EffectParams, ParamKey, ParamValue};
use crate::foundation::error::{RevealError, RevealResult};
use crate::foundation::observe::{Observer, Subscribers, SubscriptionId};

/// One accepted write to the parameter store.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct ParamChange {
    pub key: ParamKey,
    pub previous: ParamValue,
    pub value: ParamValue,
    /// Store version after the write.
    pub version: u64,
}

/// The user-facing base parameter set, with change notification.
///
/// Active effects never hold a reference into the store; the director copies values out when it
/// builds or live-syncs an effect.
#[derive(Debug, Default)]
pub struct ParamStore {
    params: EffectParams,
    version: u64,
    subscribers: Subscribers<ParamChange>,
}

impl ParamStore {
    pub fn new(params: EffectParams) -> Self {
        Self {
            params,
            ..Self::default()
        }
    }

    pub fn params(&self) -> &EffectParams {
        &self.params
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn get(&self, key: ParamKey) -> ParamValue {
        self.params.get(key)
    }

    /// Look up a key by name, as the control surface spells it.
    pub fn get_named(&self, name: &str) -> RevealResult<ParamValue> {
        Ok(self.get(name.parse()?))
    }

    /// Write `value`, clamping to the key's range. Observers hear about it only when the stored
    /// value actually changes.
    pub fn set(&mut self, key: ParamKey, value: &ParamValue) -> RevealResult<Option<ParamChange>> {
        let previous = self.params.get(key);
        let stored = self.params.set(key, value)?;
        if stored == previous {
            return Ok(None);
        }
        self.version += 1;
        let change = ParamChange {
            key,
            previous,
            value: stored,
            version: self.version,
        };
        tracing::debug!(key = %key, value = %change.value, "parameter changed");
        self.subscribers.emit(&change);
        Ok(Some(change))
    }

    pub fn set_named(&mut self, name: &str, value: &ParamValue) -> RevealResult<Option<ParamChange>> {
        let key: ParamKey = name.parse()?;
        self.set(key, value)
    }

    /// Replace the whole set, notifying once per changed key.
    pub fn replace(&mut self, params: &EffectParams) -> Vec<ParamChange> {
        let mut changes = Vec::new();
        for key in ParamKey::ALL {
            let value = params.get(key);
            match self.set(key, &value) {
                Ok(Some(change)) => changes.push(change),
                Ok(None) => {}
                Err(err) => tracing::warn!(key = %key, %err, "skipping invalid parameter"),
            }
        }
        changes
    }

    pub fn subscribe(&mut self, observer: impl Observer<ParamChange> + 'static) -> SubscriptionId {
        self.subscribers.subscribe(observer)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.unsubscribe(id)
    }
}

impl From<EffectParams> for ParamStore {
    fn from(params: EffectParams) -> Self {
        Self::new(params)
    }
}

/// Parse a raw control-surface value from text: numbers, booleans, `x,y,z` triples
/// and hex colours.
pub fn parse_value(raw: &str) -> RevealResult<ParamValue> {
    let raw = raw.trim();
    if let Ok(b) = raw.parse::<bool>() {
        return Ok(ParamValue::Flag(b));
    }
    if let Ok(v) = raw.parse::<f32>() {
        return Ok(ParamValue::Scalar(v));
    }
    let parts: Vec<&str> = raw.split(',').map(str::trim).collect();
    if parts.len() == 3 {
        let mut out = [0.0f32; 3];
        for (slot, part) in out.iter_mut().zip(&parts) {
            *slot = part
                .parse()
                .map_err(|_| RevealError::parameter(format!("invalid number '{part}' in '{raw}'")))?;
        }
        return Ok(ParamValue::Triple(out));
    }
    if raw.is_empty() {
        return Err(RevealError::parameter("empty parameter value"));
    }
    Ok(ParamValue::Text(raw.to_owned()))
}

#[cfg(test)]
#[path = "../../tests/unit/control/store.rs"]
mod tests;
