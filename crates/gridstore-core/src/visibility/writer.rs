use crate::{types::Identifier, value::Value};

///
/// FieldVisibilityHandler
///
/// Produces the visibility formula for one field value of one entry.
///

pub trait FieldVisibilityHandler<T>: Send + Sync {
    fn visibility(&self, entry: &T, field: &Identifier, value: &Value) -> Vec<u8>;
}

///
/// VisibilityWriter
///
/// Caller-supplied default visibility, resolved per field.
///

pub trait VisibilityWriter<T>: Send + Sync {
    fn field_visibility_handler(&self, field: &Identifier) -> &dyn FieldVisibilityHandler<T>;
}

///
/// UnconstrainedVisibilityHandler
///

#[derive(Clone, Copy, Debug, Default)]
pub struct UnconstrainedVisibilityHandler;

impl<T> FieldVisibilityHandler<T> for UnconstrainedVisibilityHandler {
    fn visibility(&self, _entry: &T, _field: &Identifier, _value: &Value) -> Vec<u8> {
        Vec::new()
    }
}

///
/// GlobalVisibilityHandler
/// Same formula for every field of every entry.
///

#[derive(Clone, Debug)]
pub struct GlobalVisibilityHandler {
    formula: Vec<u8>,
}

impl GlobalVisibilityHandler {
    #[must_use]
    pub fn new(formula: impl Into<Vec<u8>>) -> Self {
        Self {
            formula: formula.into(),
        }
    }
}

impl<T> FieldVisibilityHandler<T> for GlobalVisibilityHandler {
    fn visibility(&self, _entry: &T, _field: &Identifier, _value: &Value) -> Vec<u8> {
        self.formula.clone()
    }
}

///
/// UniformVisibilityWriter
/// One handler for all fields.
///

pub struct UniformVisibilityWriter<T> {
    handler: Box<dyn FieldVisibilityHandler<T>>,
}

impl<T> UniformVisibilityWriter<T> {
    #[must_use]
    pub fn new(handler: impl FieldVisibilityHandler<T> + 'static) -> Self {
        Self {
            handler: Box::new(handler),
        }
    }

    /// Default writer: every field is visible to everyone.
    #[must_use]
    pub fn unconstrained() -> Self {
        Self::new(UnconstrainedVisibilityHandler)
    }

    #[must_use]
    pub fn global(formula: impl Into<Vec<u8>>) -> Self {
        Self::new(GlobalVisibilityHandler::new(formula))
    }
}

impl<T> Default for UniformVisibilityWriter<T> {
    fn default() -> Self {
        Self::unconstrained()
    }
}

impl<T> VisibilityWriter<T> for UniformVisibilityWriter<T> {
    fn field_visibility_handler(&self, _field: &Identifier) -> &dyn FieldVisibilityHandler<T> {
        self.handler.as_ref()
    }
}
