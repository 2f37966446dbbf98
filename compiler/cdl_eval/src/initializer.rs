//! Construction of host objects from `Type{field = value, ...}` literals.

use std::marker::PhantomData;

use cdl_ir::{HostObject, Value};

use crate::errors::{field_init, EvalResult};

/// Creates instances of one host type and sets their fields.
pub trait ObjectInitializer: Send + Sync {
    fn create_instance(&self) -> Box<dyn HostObject>;

    fn set_field(&self, instance: &mut dyn HostObject, field: &str, value: Value)
        -> EvalResult<()>;
}

/// Initializer for a `Default` host type with a typed field setter.
pub struct DefaultInitializer<T, F> {
    set_field: F,
    _marker: PhantomData<fn() -> T>,
}

impl<T, F> DefaultInitializer<T, F>
where
    T: HostObject + Default,
    F: Fn(&mut T, &str, Value) -> EvalResult<()> + Send + Sync,
{
    pub fn new(set_field: F) -> Self {
        DefaultInitializer {
            set_field,
            _marker: PhantomData,
        }
    }
}

impl<T, F> ObjectInitializer for DefaultInitializer<T, F>
where
    T: HostObject + Default,
    F: Fn(&mut T, &str, Value) -> EvalResult<()> + Send + Sync,
{
    fn create_instance(&self) -> Box<dyn HostObject> {
        Box::new(T::default())
    }

    fn set_field(
        &self,
        instance: &mut dyn HostObject,
        field: &str,
        value: Value,
    ) -> EvalResult<()> {
        let type_name = instance.type_name().to_string();
        let Some(target) = instance.as_any_mut().downcast_mut::<T>() else {
            return Err(field_init(&type_name, field, "instance has an unexpected type"));
        };
        (self.set_field)(target, field, value)
    }
}
