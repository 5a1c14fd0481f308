use std::{
    any::Any,
    fmt::{Debug, Display},
};

pub type BoxedWhatever = Box<dyn Whatever>;

/// An opaque, printable error value captured from a step body.
///
/// Every error a step returns is stored behind this trait so that a
/// single-failure section can hand the caller back the exact value the step
/// produced. [`downcast_ref`](dyn Whatever::downcast_ref) recovers the
/// concrete type.
pub trait Whatever: Any + Debug + Display + Send + Sync + 'static {}

impl<T> Whatever for T where T: Any + Debug + Display + Send + Sync {}

impl dyn Whatever {
    pub fn is<T: Whatever>(&self) -> bool {
        (self as &dyn Any).is::<T>()
    }

    pub fn downcast_ref<T: Whatever>(&self) -> Option<&T> {
        (self as &dyn Any).downcast_ref()
    }

    pub fn downcast<T: Whatever>(self: Box<Self>) -> Result<Box<T>, Box<Self>> {
        match self.is::<T>() {
            true => {
                let any: Box<dyn Any> = self;
                Ok(any.downcast().expect("type id checked before downcast"))
            }
            false => Err(self),
        }
    }
}
