//! The erased value carried between pipeline stages.
//!
//! Every operator works on [`Value`]; typed handles convert at the edges
//! through [`IntoValue`] and [`FromValue`]. Custom payloads are boxed into
//! [`Value::Object`] with [`impl_value_object!`](crate::impl_value_object),
//! and conversions between related custom types (for example a derived
//! payload sliced down to its base) are kept as data in a registry filled by
//! [`register_conversion`].

use std::{
  any::{Any, TypeId},
  collections::HashMap,
  fmt,
  sync::{Arc, RwLock},
};

use once_cell::sync::Lazy;

use crate::error::RxError;

/// A dynamically typed value.
#[derive(Clone, Debug, Default)]
pub enum Value {
  /// No value. Emitted by fire-and-forget event sources.
  #[default]
  Void,
  Int(i64),
  Double(f64),
  Bool(bool),
  Text(String),
  Array(Vec<Value>),
  /// An opaque boxed payload, compared by identity.
  Object(ObjectRef),
}

impl Value {
  /// Boxes an arbitrary payload.
  pub fn object<T: Any + Send + Sync>(value: T) -> Self { Value::Object(ObjectRef::new(value)) }

  /// Converts a copy of this value to `T`.
  pub fn to<T: FromValue>(&self) -> Result<T, RxError> { T::from_value(self.clone()) }

  pub fn is_void(&self) -> bool { matches!(self, Value::Void) }

  pub fn as_int(&self) -> Option<i64> {
    match self {
      Value::Int(i) => Some(*i),
      _ => None,
    }
  }

  pub fn as_double(&self) -> Option<f64> {
    match self {
      Value::Double(d) => Some(*d),
      Value::Int(i) => Some(*i as f64),
      _ => None,
    }
  }

  pub fn as_bool(&self) -> Option<bool> {
    match self {
      Value::Bool(b) => Some(*b),
      _ => None,
    }
  }

  pub fn as_str(&self) -> Option<&str> {
    match self {
      Value::Text(s) => Some(s),
      _ => None,
    }
  }

  pub fn as_array(&self) -> Option<&[Value]> {
    match self {
      Value::Array(items) => Some(items),
      _ => None,
    }
  }

  pub fn as_object(&self) -> Option<&ObjectRef> {
    match self {
      Value::Object(obj) => Some(obj),
      _ => None,
    }
  }

  /// Short description of the variant, used in conversion errors.
  pub fn kind_name(&self) -> &'static str {
    match self {
      Value::Void => "void",
      Value::Int(_) => "int",
      Value::Double(_) => "double",
      Value::Bool(_) => "bool",
      Value::Text(_) => "text",
      Value::Array(_) => "array",
      Value::Object(obj) => obj.type_name(),
    }
  }

  fn mismatch(self, expected: &'static str) -> RxError {
    RxError::type_mismatch(expected, self.kind_name())
  }
}

impl PartialEq for Value {
  fn eq(&self, other: &Self) -> bool {
    match (self, other) {
      (Value::Void, Value::Void) => true,
      (Value::Int(a), Value::Int(b)) => a == b,
      (Value::Double(a), Value::Double(b)) => a == b,
      (Value::Int(i), Value::Double(d)) | (Value::Double(d), Value::Int(i)) => *i as f64 == *d,
      (Value::Bool(a), Value::Bool(b)) => a == b,
      (Value::Text(a), Value::Text(b)) => a == b,
      (Value::Array(a), Value::Array(b)) => a == b,
      (Value::Object(a), Value::Object(b)) => a.ptr_eq(b),
      _ => false,
    }
  }
}

impl fmt::Display for Value {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Value::Void => Ok(()),
      Value::Int(i) => write!(f, "{i}"),
      Value::Double(d) => write!(f, "{d}"),
      Value::Bool(b) => write!(f, "{b}"),
      Value::Text(s) => f.write_str(s),
      Value::Array(items) => {
        f.write_str("[")?;
        for (i, item) in items.iter().enumerate() {
          if i > 0 {
            f.write_str(", ")?;
          }
          write!(f, "{item}")?;
        }
        f.write_str("]")
      }
      Value::Object(obj) => write!(f, "<{}>", obj.type_name()),
    }
  }
}

/// A reference-counted, type-erased payload.
#[derive(Clone)]
pub struct ObjectRef {
  type_id: TypeId,
  type_name: &'static str,
  data: Arc<dyn Any + Send + Sync>,
}

impl ObjectRef {
  pub fn new<T: Any + Send + Sync>(value: T) -> Self {
    ObjectRef {
      type_id: TypeId::of::<T>(),
      type_name: std::any::type_name::<T>(),
      data: Arc::new(value),
    }
  }

  pub fn downcast_ref<T: Any>(&self) -> Option<&T> { self.data.downcast_ref::<T>() }

  pub fn type_name(&self) -> &'static str { self.type_name }

  pub fn is<T: Any>(&self) -> bool { self.type_id == TypeId::of::<T>() }

  pub fn ptr_eq(&self, other: &ObjectRef) -> bool { Arc::ptr_eq(&self.data, &other.data) }
}

impl fmt::Debug for ObjectRef {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_tuple("ObjectRef").field(&self.type_name).finish()
  }
}

/// Conversion of a typed value into the erased representation.
pub trait IntoValue {
  fn into_value(self) -> Value;
}

/// Checked conversion from the erased representation.
pub trait FromValue: Sized {
  fn from_value(value: Value) -> Result<Self, RxError>;
}

impl IntoValue for Value {
  #[inline]
  fn into_value(self) -> Value { self }
}

impl FromValue for Value {
  #[inline]
  fn from_value(value: Value) -> Result<Self, RxError> { Ok(value) }
}

impl IntoValue for () {
  fn into_value(self) -> Value { Value::Void }
}

impl FromValue for () {
  fn from_value(value: Value) -> Result<Self, RxError> {
    match value {
      Value::Void => Ok(()),
      other => Err(other.mismatch("()")),
    }
  }
}

impl IntoValue for bool {
  fn into_value(self) -> Value { Value::Bool(self) }
}

impl FromValue for bool {
  fn from_value(value: Value) -> Result<Self, RxError> {
    match value {
      Value::Bool(b) => Ok(b),
      Value::Int(i) => Ok(i != 0),
      Value::Double(d) => Ok(d != 0.0),
      other => Err(other.mismatch("bool")),
    }
  }
}

impl IntoValue for String {
  fn into_value(self) -> Value { Value::Text(self) }
}

impl IntoValue for &str {
  fn into_value(self) -> Value { Value::Text(self.to_owned()) }
}

impl IntoValue for &String {
  fn into_value(self) -> Value { Value::Text(self.clone()) }
}

impl FromValue for String {
  fn from_value(value: Value) -> Result<Self, RxError> {
    match value {
      Value::Text(s) => Ok(s),
      other => Err(other.mismatch("String")),
    }
  }
}

impl<T: IntoValue> IntoValue for Vec<T> {
  fn into_value(self) -> Value { Value::Array(self.into_iter().map(IntoValue::into_value).collect()) }
}

impl<T: FromValue> FromValue for Vec<T> {
  fn from_value(value: Value) -> Result<Self, RxError> {
    match value {
      Value::Array(items) => items.into_iter().map(T::from_value).collect(),
      other => Err(other.mismatch("Vec")),
    }
  }
}

macro_rules! impl_int_value {
  ($($t:ty),*) => {
    $(
      impl IntoValue for $t {
        #[allow(unreachable_patterns)]
        fn into_value(self) -> Value {
          match i64::try_from(self) {
            Ok(i) => Value::Int(i),
            Err(_) => Value::Double(self as f64),
          }
        }
      }

      impl FromValue for $t {
        fn from_value(value: Value) -> Result<Self, RxError> {
          match value {
            Value::Int(i) => <$t>::try_from(i)
              .map_err(|_| RxError::type_mismatch(stringify!($t), format!("int {i} out of range"))),
            // `as` truncates toward zero and saturates at the bounds.
            Value::Double(d) => Ok(d as $t),
            Value::Bool(b) => Ok(b as $t),
            other => Err(other.mismatch(stringify!($t))),
          }
        }
      }
    )*
  };
}

impl_int_value!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

macro_rules! impl_float_value {
  ($($t:ty),*) => {
    $(
      impl IntoValue for $t {
        fn into_value(self) -> Value { Value::Double(self as f64) }
      }

      impl FromValue for $t {
        fn from_value(value: Value) -> Result<Self, RxError> {
          match value {
            Value::Double(d) => Ok(d as $t),
            Value::Int(i) => Ok(i as $t),
            Value::Bool(b) => Ok(if b { 1.0 } else { 0.0 }),
            other => Err(other.mismatch(stringify!($t))),
          }
        }
      }
    )*
  };
}

impl_float_value!(f32, f64);

macro_rules! impl_from_for_value {
  ($($t:ty),*) => {
    $(
      impl From<$t> for Value {
        #[inline]
        fn from(v: $t) -> Value { v.into_value() }
      }
    )*
  };
}

impl_from_for_value!(i32, i64, u32, usize, f32, f64, bool, String, &str, ());

/// Makes custom payload types usable as pipeline values by boxing them into
/// [`Value::Object`].
///
/// The types must be `Clone + Send + Sync + 'static`.
///
/// ```
/// use rxdyn::{impl_value_object, prelude::*};
///
/// #[derive(Clone, Debug, PartialEq)]
/// struct Point(i32, i32);
/// impl_value_object!(Point);
///
/// let v = Point(1, 2).into_value();
/// assert_eq!(v.to::<Point>().unwrap(), Point(1, 2));
/// ```
#[macro_export]
macro_rules! impl_value_object {
  ($($t:ty),+ $(,)?) => {
    $(
      impl $crate::value::IntoValue for $t {
        fn into_value(self) -> $crate::value::Value { $crate::value::Value::object(self) }
      }

      impl $crate::value::FromValue for $t {
        fn from_value(
          value: $crate::value::Value,
        ) -> ::std::result::Result<Self, $crate::error::RxError> {
          $crate::value::object_from_value::<$t>(value)
        }
      }
    )+
  };
}

/// Extracts a boxed payload of type `T`, consulting the conversion registry
/// when the stored payload has a different type.
pub fn object_from_value<T>(value: Value) -> Result<T, RxError>
where
  T: Any + Clone + Send + Sync,
{
  match value {
    Value::Object(obj) => {
      if let Some(t) = obj.downcast_ref::<T>() {
        return Ok(t.clone());
      }
      convert_registered::<T>(&obj)
        .ok_or_else(|| RxError::type_mismatch(std::any::type_name::<T>(), obj.type_name()))
    }
    other => Err(other.mismatch(std::any::type_name::<T>())),
  }
}

type Conversion = Arc<dyn Fn(&ObjectRef) -> Option<Box<dyn Any + Send>> + Send + Sync>;

static CONVERSIONS: Lazy<RwLock<HashMap<(TypeId, TypeId), Conversion>>> =
  Lazy::new(|| RwLock::new(HashMap::new()));

/// Registers the conversion from payload `S` to payload `D` through
/// `D: From<S>`.
///
/// This is how a derived payload is sliced down to its base when it is
/// pushed into an observer of the base type.
pub fn register_conversion<S, D>()
where
  S: Any + Clone + Send + Sync,
  D: From<S> + Any + Send,
{
  register_conversion_with::<S, D, _>(|s: &S| D::from(s.clone()));
}

/// Registers a conversion from payload `S` to payload `D` with an explicit
/// function. A later registration for the same pair replaces the earlier
/// one.
pub fn register_conversion_with<S, D, F>(f: F)
where
  S: Any + Send + Sync,
  D: Any + Send,
  F: Fn(&S) -> D + Send + Sync + 'static,
{
  let conversion: Conversion = Arc::new(move |obj: &ObjectRef| {
    obj
      .downcast_ref::<S>()
      .map(|s| Box::new(f(s)) as Box<dyn Any + Send>)
  });
  let mut table = CONVERSIONS.write().unwrap_or_else(|e| e.into_inner());
  table.insert((TypeId::of::<S>(), TypeId::of::<D>()), conversion);
}

fn convert_registered<T: Any>(obj: &ObjectRef) -> Option<T> {
  let conversion = {
    let table = CONVERSIONS.read().unwrap_or_else(|e| e.into_inner());
    table.get(&(obj.type_id, TypeId::of::<T>())).cloned()
  }?;
  conversion(obj)?.downcast::<T>().ok().map(|b| *b)
}
