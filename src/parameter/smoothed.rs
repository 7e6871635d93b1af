use std::fmt::{Debug, Display};

use crate::{
    utils::smoothed::{LinearSmoothedValue, SmoothedValue},
    Error,
};

use super::{ParameterHandle, ParameterStore};

// -------------------------------------------------------------------------------------------------

/// Binds a [`SmoothedValue`] to a parameter in a [`ParameterStore`].
///
/// Stages call [`Self::update`] once per block to pick up the store's current value as new
/// smoothing target, then fetch ramped values per sample via [`Self::next_value`].
///
/// To configure the ramp of the smoother, use [`Self::smoother_mut`].
#[derive(Debug, Clone)]
pub struct SmoothedParameterValue<Value: SmoothedValue = LinearSmoothedValue> {
    /// The parameter's id in the store.
    id: &'static str,
    /// The resolved parameter handle.
    handle: ParameterHandle,
    /// The smoothed value of the parameter.
    value: Value,
}

impl<Value: SmoothedValue> SmoothedParameterValue<Value> {
    /// Create a new smoothed parameter value for the parameter with the given id, using a
    /// default instance of a smoother, initialized to the parameter's current value.
    pub fn new(store: &ParameterStore, id: &str) -> Result<Self, Error>
    where
        Value: From<f32>,
    {
        let handle = store.handle(id)?;
        let id = store.description(handle).id();
        let value = Value::from(store.load(handle));
        Ok(Self { id, handle, value })
    }

    /// Use the given smoother instance. Its value will be set to the parameter's current value
    /// with [`Self::init`] later on - all other smoother properties are kept intact.
    pub fn with_smoother(mut self, value: Value) -> Self {
        self.value = value;
        self
    }

    /// The parameter's id.
    pub fn id(&self) -> &'static str {
        self.id
    }

    /// The parameter's resolved store handle.
    pub fn handle(&self) -> ParameterHandle {
        self.handle
    }

    /// Mutable access to the smoother, e.g. to change its ramp settings.
    pub fn smoother_mut(&mut self) -> &mut Value {
        &mut self.value
    }

    /// Jump to the store's current value without smoothing.
    pub fn init(&mut self, store: &ParameterStore) {
        self.value.init(store.load(self.handle));
    }

    /// Use the store's current value as new smoothing target.
    #[inline]
    pub fn update(&mut self, store: &ParameterStore) {
        self.value.set_target(store.load(self.handle));
    }

    /// Test if ramping is necessary. When not, `target_value` can be used directly without
    /// ramping to avoid processing overhead.
    #[inline(always)]
    pub fn value_need_ramp(&self) -> bool {
        self.value.need_ramp()
    }

    /// Apply smoothing, if needed, and return current value. This should be called once
    /// per sample frame in stages.
    #[inline(always)]
    pub fn next_value(&mut self) -> f32 {
        self.value.next()
    }

    /// Access to the smoothed current value.
    #[inline(always)]
    pub fn current_value(&self) -> f32 {
        self.value.current()
    }

    /// Access to the smoothed target value.
    #[inline(always)]
    pub fn target_value(&self) -> f32 {
        self.value.target()
    }
}

impl<Value: SmoothedValue> Display for SmoothedParameterValue<Value> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.id, self.value.target())
    }
}

// -------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FloatParameter;

    #[test]
    fn follows_store() {
        let store =
            ParameterStore::new(vec![FloatParameter::new("gain", "Gain", 0.0..=2.0, 1.0)])
                .unwrap();
        let mut gain = SmoothedParameterValue::<LinearSmoothedValue>::new(&store, "gain")
            .unwrap()
            .with_smoother(LinearSmoothedValue::new(0.0, 2));
        gain.init(&store);
        assert_eq!(gain.id(), "gain");
        assert_eq!(gain.current_value(), 1.0);

        store.set_value("gain", 2.0).unwrap();
        gain.update(&store);
        assert!(gain.value_need_ramp());
        assert_eq!(gain.next_value(), 1.5);
        assert_eq!(gain.next_value(), 2.0);
        assert!(!gain.value_need_ramp());

        // unchanged values don't restart ramps
        gain.update(&store);
        assert!(!gain.value_need_ramp());
        assert_eq!(gain.to_string(), "gain: 2");

        assert!(SmoothedParameterValue::<LinearSmoothedValue>::new(&store, "nope").is_err());
    }
}
