//! # Host Value Graph
//!
//! The run-time object graph the kernel patches and searches. Reference types
//! ([`Object`], [`Array`], [`Function`], [`Pending`]) are shared handles: cloning
//! one clones the reference, never the referent, so identity survives being
//! passed around exactly as it does inside the host.
//!
//! Interior state is guarded by short `RwLock` sections. No lock is held while
//! host code runs, which keeps re-entrant access (an interceptor reading the
//! object whose method it intercepts) safe.

use crate::{function::Function, pending::Pending};
use bitflags::bitflags;
use std::{
    fmt,
    sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

/// A value living in the host's object graph.
#[derive(Clone, Default)]
pub enum Value {
    /// Host `null`/`undefined`.
    #[default]
    Null,
    /// A boolean.
    Bool(bool),
    /// A number (host numbers are doubles).
    Number(f64),
    /// An immutable string.
    String(Arc<str>),
    /// A shared sequence.
    Array(Array),
    /// A shared keyed structure.
    Object(Object),
    /// A shared callable.
    Function(Function),
    /// A deferred value that settles later.
    Pending(Pending),
}

impl Value {
    /// Returns `true` for [`Value::Null`].
    pub fn is_nullish(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// The host `typeof` name of this value.
    ///
    /// `Null` stands in for both host `null` and `undefined` and reports
    /// `"undefined"`.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "undefined",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) | Value::Object(_) | Value::Pending(_) => "object",
            Value::Function(_) => "function",
        }
    }

    /// Property read, the equivalent of `value?.[key]`.
    ///
    /// Objects expose their own properties, arrays their decimal indices and
    /// `length`, functions their metadata and `name`. Everything else yields
    /// [`Value::Null`].
    pub fn get(&self, key: &str) -> Value {
        match self {
            Value::Object(object) => object.get(key),
            Value::Array(array) => {
                if key == "length" {
                    return Value::Number(array.len() as f64);
                }
                key.parse::<usize>()
                    .map(|index| array.get(index))
                    .unwrap_or_default()
            }
            Value::Function(function) => match function.metadata().property(key) {
                Some(property) => property.value,
                None if key == "name" => Value::from(function.name()),
                None => Value::Null,
            },
            _ => Value::Null,
        }
    }

    /// Membership test, the equivalent of the host `key in value`.
    pub fn has(&self, key: &str) -> bool {
        match self {
            Value::Object(object) => object.contains_key(key),
            Value::Array(array) => {
                key == "length" || key.parse::<usize>().is_ok_and(|index| index < array.len())
            }
            Value::Function(function) => key == "name" || function.metadata().contains_key(key),
            _ => false,
        }
    }

    /// Returns the number if this is a [`Value::Number`].
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the boolean if this is a [`Value::Bool`].
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the string slice if this is a [`Value::String`].
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the object handle if this is a [`Value::Object`].
    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Value::Object(object) => Some(object),
            _ => None,
        }
    }

    /// Returns the array handle if this is a [`Value::Array`].
    pub fn as_array(&self) -> Option<&Array> {
        match self {
            Value::Array(array) => Some(array),
            _ => None,
        }
    }

    /// Returns the function handle if this is a [`Value::Function`].
    pub fn as_function(&self) -> Option<&Function> {
        match self {
            Value::Function(function) => Some(function),
            _ => None,
        }
    }

    /// Returns the pending handle if this is a [`Value::Pending`].
    pub fn as_pending(&self) -> Option<&Pending> {
        match self {
            Value::Pending(pending) => Some(pending),
            _ => None,
        }
    }

    /// Host truthiness.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::String(s) => !s.is_empty(),
            _ => true,
        }
    }
}

/// Strict equality: primitives compare by value (`NaN` never equals itself),
/// reference types by identity.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a.ptr_eq(b),
            (Value::Object(a), Value::Object(b)) => a.ptr_eq(b),
            (Value::Function(a), Value::Function(b)) => a.ptr_eq(b),
            (Value::Pending(a), Value::Pending(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

// Shallow on purpose: host graphs are routinely cyclic.
impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("Null"),
            Value::Bool(b) => write!(f, "Bool({b})"),
            Value::Number(n) => write!(f, "Number({n})"),
            Value::String(s) => write!(f, "String({s:?})"),
            Value::Array(array) => write!(f, "Array(len = {})", array.len()),
            Value::Object(object) => f.debug_tuple("Object").field(&object.keys()).finish(),
            Value::Function(function) => fmt::Debug::fmt(function, f),
            Value::Pending(_) => f.write_str("Pending"),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Array(array) => {
                for (index, item) in array.snapshot().iter().enumerate() {
                    if index > 0 {
                        f.write_str(",")?;
                    }
                    match item {
                        Value::Null => {}
                        Value::Array(_) => f.write_str("[array]")?,
                        other => fmt::Display::fmt(other, f)?,
                    }
                }
                Ok(())
            }
            Value::Null => f.write_str("undefined"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Number(n) => fmt_number(*n, f),
            Value::String(s) => f.write_str(s),
            Value::Object(_) => f.write_str("[object Object]"),
            Value::Function(function) => {
                write!(f, "function {}() {{ [native code] }}", function.name())
            }
            Value::Pending(_) => f.write_str("[object Promise]"),
        }
    }
}

fn fmt_number(n: f64, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if n.is_nan() {
        f.write_str("NaN")
    } else if n.is_infinite() {
        f.write_str(if n > 0.0 { "Infinity" } else { "-Infinity" })
    } else if n == 0.0 {
        f.write_str("0")
    } else if n.fract() == 0.0 && n.abs() < 1e21 {
        write!(f, "{n:.0}")
    } else {
        write!(f, "{n}")
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(Arc::from(s))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(Arc::from(s))
    }
}

impl From<Object> for Value {
    fn from(object: Object) -> Self {
        Value::Object(object)
    }
}

impl From<Array> for Value {
    fn from(array: Array) -> Self {
        Value::Array(array)
    }
}

impl From<Function> for Value {
    fn from(function: Function) -> Self {
        Value::Function(function)
    }
}

impl From<Pending> for Value {
    fn from(pending: Pending) -> Self {
        Value::Pending(pending)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(Array::from(items))
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or_default()
    }
}

bitflags! {
    /// Descriptor attributes of an object property.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct PropertyFlags: u8 {
        /// The value may be reassigned.
        const WRITABLE = 1 << 0;
        /// The key is visited by enumeration (and by cursor searches).
        const ENUMERABLE = 1 << 1;
        /// The descriptor may be redefined or removed.
        const CONFIGURABLE = 1 << 2;
    }
}

impl Default for PropertyFlags {
    fn default() -> Self {
        PropertyFlags::all()
    }
}

/// A property descriptor: a value plus its attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    /// The stored value.
    pub value: Value,
    /// The descriptor attributes.
    pub flags: PropertyFlags,
}

impl Property {
    /// Create a descriptor with explicit attributes.
    pub fn new(value: impl Into<Value>, flags: PropertyFlags) -> Self {
        Self {
            value: value.into(),
            flags,
        }
    }

    /// Create a writable, enumerable, configurable descriptor.
    pub fn data(value: impl Into<Value>) -> Self {
        Self::new(value, PropertyFlags::all())
    }

    /// Returns `true` if the value may be reassigned.
    pub fn is_writable(&self) -> bool {
        self.flags.contains(PropertyFlags::WRITABLE)
    }

    /// Returns `true` if the key takes part in enumeration.
    pub fn is_enumerable(&self) -> bool {
        self.flags.contains(PropertyFlags::ENUMERABLE)
    }

    /// Returns `true` if the descriptor may be redefined.
    pub fn is_configurable(&self) -> bool {
        self.flags.contains(PropertyFlags::CONFIGURABLE)
    }
}

pub(crate) fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

pub(crate) fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

/// A shared, insertion-ordered keyed structure.
#[derive(Clone, Default)]
pub struct Object(Arc<RwLock<Vec<(String, Property)>>>);

impl Object {
    /// Create an empty object.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a property value; missing keys yield [`Value::Null`].
    pub fn get(&self, key: &str) -> Value {
        self.property(key).map(|p| p.value).unwrap_or_default()
    }

    /// Read a full property descriptor.
    pub fn property(&self, key: &str) -> Option<Property> {
        read(&self.0)
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, p)| p.clone())
    }

    /// Returns `true` if the object has an own property `key`.
    pub fn contains_key(&self, key: &str) -> bool {
        read(&self.0).iter().any(|(k, _)| k == key)
    }

    /// Assignment: `object[key] = value`.
    ///
    /// New keys receive all attributes. Existing keys keep their attributes;
    /// a non-writable key is left untouched and `false` is returned.
    pub fn set(&self, key: impl Into<String>, value: impl Into<Value>) -> bool {
        let key = key.into();
        let mut entries = write(&self.0);
        match entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, property)) if property.is_writable() => {
                property.value = value.into();
                true
            }
            Some(_) => false,
            None => {
                entries.push((key, Property::data(value)));
                true
            }
        }
    }

    /// Define (or redefine) a property descriptor.
    ///
    /// A configurable key is replaced wholesale. A non-configurable but
    /// writable key only takes the new value. A key that is neither writable
    /// nor configurable is frozen and `false` is returned.
    pub fn define(&self, key: impl Into<String>, descriptor: Property) -> bool {
        let key = key.into();
        let mut entries = write(&self.0);
        match entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, property)) if property.is_configurable() => {
                *property = descriptor;
                true
            }
            Some((_, property)) if property.is_writable() => {
                property.value = descriptor.value;
                true
            }
            Some(_) => false,
            None => {
                entries.push((key, descriptor));
                true
            }
        }
    }

    /// Remove a configurable property, returning its descriptor.
    pub fn remove(&self, key: &str) -> Option<Property> {
        let mut entries = write(&self.0);
        let index = entries
            .iter()
            .position(|(k, p)| k == key && p.is_configurable())?;
        Some(entries.remove(index).1)
    }

    /// All own keys in insertion order.
    pub fn keys(&self) -> Vec<String> {
        read(&self.0).iter().map(|(k, _)| k.clone()).collect()
    }

    /// Enumerable own entries in insertion order, as a snapshot.
    pub fn enumerable_entries(&self) -> Vec<(String, Value)> {
        read(&self.0)
            .iter()
            .filter(|(_, p)| p.is_enumerable())
            .map(|(k, p)| (k.clone(), p.value.clone()))
            .collect()
    }

    /// All own descriptors in insertion order, as a snapshot.
    pub fn descriptors(&self) -> Vec<(String, Property)> {
        read(&self.0).clone()
    }

    /// A new object carrying copies of every own descriptor of `self`.
    ///
    /// Values that are references still point at the same referents.
    pub fn copy_descriptors(&self) -> Object {
        Object(Arc::new(RwLock::new(self.descriptors())))
    }

    /// Number of own properties.
    pub fn len(&self) -> usize {
        read(&self.0).len()
    }

    /// Returns `true` if the object has no own properties.
    pub fn is_empty(&self) -> bool {
        read(&self.0).is_empty()
    }

    /// Identity comparison.
    pub fn ptr_eq(&self, other: &Object) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Object {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let object = Object::new();
        for (key, value) in iter {
            object.set(key, value);
        }
        object
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Object").field(&self.keys()).finish()
    }
}

/// A shared sequence.
#[derive(Clone, Default)]
pub struct Array(Arc<RwLock<Vec<Value>>>);

impl Array {
    /// Create an empty array.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read an element; out-of-range indices yield [`Value::Null`].
    pub fn get(&self, index: usize) -> Value {
        read(&self.0).get(index).cloned().unwrap_or_default()
    }

    /// Append an element.
    pub fn push(&self, value: impl Into<Value>) {
        write(&self.0).push(value.into());
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        read(&self.0).len()
    }

    /// Returns `true` if the array has no elements.
    pub fn is_empty(&self) -> bool {
        read(&self.0).is_empty()
    }

    /// A copy of the current elements.
    pub fn snapshot(&self) -> Vec<Value> {
        read(&self.0).clone()
    }

    /// Identity comparison.
    pub fn ptr_eq(&self, other: &Array) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl From<Vec<Value>> for Array {
    fn from(items: Vec<Value>) -> Self {
        Array(Arc::new(RwLock::new(items)))
    }
}

impl<V: Into<Value>> FromIterator<V> for Array {
    fn from_iter<I: IntoIterator<Item = V>>(iter: I) -> Self {
        Array::from(iter.into_iter().map(Into::into).collect::<Vec<_>>())
    }
}

impl fmt::Debug for Array {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Array(len = {})", self.len())
    }
}
