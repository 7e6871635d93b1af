use std::sync::atomic::{AtomicU32, Ordering};

use super::FloatParameter;
use crate::Error;

// -------------------------------------------------------------------------------------------------

/// Resolved, index based reference to a parameter in a [`ParameterStore`].
///
/// Handles are resolved once via [`ParameterStore::handle`] when stages get created, so the
/// real-time thread never needs to look up parameters by their string id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParameterHandle(usize);

impl ParameterHandle {
    /// The parameter's index in its store.
    pub fn index(&self) -> usize {
        self.0
    }
}

// -------------------------------------------------------------------------------------------------

/// Thread-safe mapping from parameter id to the parameter's current plain value.
///
/// The set of parameters is fixed at construction time. Values are written by control threads
/// (UIs, automation, host) and read by the audio thread once per block. All reads and writes
/// are plain relaxed atomic loads and stores, so neither side can ever block the other.
#[derive(Debug)]
pub struct ParameterStore {
    parameters: Vec<FloatParameter>,
    values: Vec<AtomicU32>,
}

impl ParameterStore {
    /// Create a new store with the given parameter declarations, initialized to the
    /// parameter's default values. Parameter ids must be unique.
    pub fn new(parameters: Vec<FloatParameter>) -> Result<Self, Error> {
        for (index, parameter) in parameters.iter().enumerate() {
            if parameters[..index].iter().any(|p| p.id() == parameter.id()) {
                return Err(Error::ParameterError(format!(
                    "duplicate parameter id '{}'",
                    parameter.id()
                )));
            }
        }
        let values = parameters
            .iter()
            .map(|p| AtomicU32::new(p.default_value().to_bits()))
            .collect();
        Ok(Self { parameters, values })
    }

    /// All declared parameter descriptors, in declaration order.
    pub fn parameters(&self) -> &[FloatParameter] {
        &self.parameters
    }

    /// Resolve a parameter id to a handle for fast real-time access.
    pub fn handle(&self, id: &str) -> Result<ParameterHandle, Error> {
        self.parameters
            .iter()
            .position(|p| p.id() == id)
            .map(ParameterHandle)
            .ok_or_else(|| Error::ParameterNotFound(id.to_string()))
    }

    /// Access a parameter's descriptor by id.
    pub fn parameter(&self, id: &str) -> Result<&FloatParameter, Error> {
        Ok(self.description(self.handle(id)?))
    }

    /// Access a parameter's descriptor by handle.
    pub fn description(&self, handle: ParameterHandle) -> &FloatParameter {
        &self.parameters[handle.0]
    }

    /// Lock-free read of a parameter's current plain value.
    #[inline]
    pub fn load(&self, handle: ParameterHandle) -> f32 {
        f32::from_bits(self.values[handle.0].load(Ordering::Relaxed))
    }

    /// Lock-free write of a parameter's plain value, clamped into the parameter's range.
    #[inline]
    pub fn store(&self, handle: ParameterHandle, value: f32) {
        let value = self.parameters[handle.0].clamp_value(value);
        self.values[handle.0].store(value.to_bits(), Ordering::Relaxed);
    }

    /// Current plain value of the parameter with the given id.
    pub fn value(&self, id: &str) -> Result<f32, Error> {
        Ok(self.load(self.handle(id)?))
    }

    /// Current normalized value of the parameter with the given id.
    pub fn normalized_value(&self, id: &str) -> Result<f32, Error> {
        let handle = self.handle(id)?;
        Ok(self.description(handle).normalize_value(self.load(handle)))
    }

    /// Set a new plain value. Out of range values are clamped, non finite values rejected.
    pub fn set_value(&self, id: &str, value: f32) -> Result<(), Error> {
        let handle = self.handle(id)?;
        if !value.is_finite() {
            return Err(Error::ParameterError(format!(
                "value for '{id}' is not finite: {value}"
            )));
        }
        self.store(handle, value);
        Ok(())
    }

    /// Set a new value from a normalized 0.0-1.0 value, applying the parameter's value curve
    /// and step interval.
    pub fn set_normalized_value(&self, id: &str, normalized: f32) -> Result<(), Error> {
        let handle = self.handle(id)?;
        if !normalized.is_finite() {
            return Err(Error::ParameterError(format!(
                "normalized value for '{id}' is not finite: {normalized}"
            )));
        }
        let value = self
            .description(handle)
            .denormalize_value(normalized.clamp(0.0, 1.0));
        self.store(handle, value);
        Ok(())
    }

    /// Reset all parameters to their default values.
    pub fn reset_to_defaults(&self) {
        for (parameter, value) in self.parameters.iter().zip(&self.values) {
            value.store(parameter.default_value().to_bits(), Ordering::Relaxed);
        }
    }

    /// Copy of all current `(id, plain value)` pairs, e.g. to persist the parameter set.
    pub fn snapshot(&self) -> Vec<(&'static str, f32)> {
        self.parameters
            .iter()
            .zip(&self.values)
            .map(|(p, v)| (p.id(), f32::from_bits(v.load(Ordering::Relaxed))))
            .collect()
    }

    /// Apply a previously taken snapshot. Unknown ids get skipped with a warning, so state
    /// from older or newer parameter layouts can still be restored partially.
    pub fn restore<Id: AsRef<str>>(&self, snapshot: &[(Id, f32)]) -> Result<(), Error> {
        for (id, value) in snapshot {
            match self.set_value(id.as_ref(), *value) {
                Err(Error::ParameterNotFound(id)) => {
                    log::warn!("Ignoring unknown parameter '{id}' in snapshot");
                }
                result => result?,
            }
        }
        Ok(())
    }
}

// -------------------------------------------------------------------------------------------------
