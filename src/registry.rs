use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt::{self, Debug};
use std::io;
use std::sync::Arc;

use log::{debug, trace};
use once_cell::sync::OnceCell;
use parking_lot::{ReentrantMutex, RwLock};

use crate::codec::scalar::ScalarTable;
use crate::codec::{default, dispatch, Codec, TypeDescriptor};
use crate::error::{Error, Result};
use crate::json::{self, Value};
use crate::shape::{downcast_ref, unbox, TypeRef, Wire};

type Slot = OnceCell<Codec>;

/// Codec cache and the typed entry points.
///
/// Codecs are derived the first time a type is used and shared afterwards.
/// A registry is `Send + Sync`; share one behind an `Arc` or a `static`.
///
/// ```rust
/// use wirejson::{Registry, Wire};
///
/// #[derive(Wire, Debug, PartialEq)]
/// struct Person {
///     #[wire(rename = "Name")]
///     name: String,
///     #[wire(rename = "Age")]
///     age: Option<u32>,
/// }
///
/// let registry = Registry::new();
/// let ann = Person { name: "Ann".to_owned(), age: None };
/// assert_eq!(registry.serialize(&ann).unwrap(), r#"{"Name":"Ann"}"#);
///
/// let back: Person = registry.deserialize(r#"{"Name":"Ann","Age":5}"#).unwrap();
/// assert_eq!(back.age, Some(5));
/// ```
pub struct Registry {
    scalars: ScalarTable,
    slots: RwLock<HashMap<TypeDescriptor, Arc<Slot>>>,
    /// Published top-level codecs by type, skipping descriptor resolution.
    roots: RwLock<HashMap<TypeId, Codec>>,
    derivation: ReentrantMutex<RefCell<Derivation>>,
}

/// State of the derivation in progress, owned by the thread holding the lock.
#[derive(Default)]
struct Derivation {
    depth: usize,
    /// Codecs derived so far, published together when the outermost request
    /// succeeds.
    ready: Vec<(Arc<Slot>, Codec)>,
    inserted: Vec<TypeDescriptor>,
}

impl Registry {
    /// Registry with the built-in scalar codecs.
    pub fn new() -> Self {
        Registry::builder().build()
    }

    pub fn builder() -> RegistryBuilder {
        RegistryBuilder {
            scalars: ScalarTable::builtin(),
        }
    }

    pub(crate) fn scalars(&self) -> &ScalarTable {
        &self.scalars
    }

    /// Codec for `T` used as a top-level value.
    pub fn codec<T: Wire>(&self) -> Result<Codec> {
        let id = TypeId::of::<T>();
        if let Some(codec) = self.roots.read().get(&id) {
            return Ok(codec.clone());
        }
        let codec = self.codec_for(TypeDescriptor::of(TypeRef::of::<T>()))?;
        self.roots.write().insert(id, codec.clone());
        Ok(codec)
    }

    /// Codec for a type at a declaration site, derived on first request.
    pub(crate) fn codec_for(&self, desc: TypeDescriptor) -> Result<Codec> {
        if let Some(codec) = self.published(&desc) {
            trace!("cached codec for {:?}", desc.ty);
            return Ok(codec);
        }

        let guard = self.derivation.lock();

        // Another thread may have published it while this one waited.
        let existing = self.slots.read().get(&desc).cloned();
        if let Some(slot) = existing {
            if let Some(codec) = slot.get() {
                return Ok(codec.clone());
            }
            trace!("forwarding codec for {:?}", desc.ty);
            return Ok(Codec::forward(desc.ty.name(), Arc::downgrade(&slot)));
        }

        let slot = Arc::new(Slot::new());
        self.slots.write().insert(desc.clone(), slot.clone());
        let level = Level::enter(self, &guard, &desc);
        let result = dispatch::derive(self, &desc);
        level.close(&desc, slot, result)
    }

    /// Forgets everything the failed outermost derivation put in the cache.
    fn abandon(&self, state: &mut Derivation) {
        state.ready.clear();
        let mut slots = self.slots.write();
        for inserted in state.inserted.drain(..) {
            slots.remove(&inserted);
        }
    }

    fn published(&self, desc: &TypeDescriptor) -> Option<Codec> {
        self.slots.read().get(desc)?.get().cloned()
    }

    pub fn encode<T: Wire>(&self, value: &T) -> Result<Value> {
        self.codec::<T>()?.encode(value)
    }

    pub fn decode<T: Wire>(&self, value: &Value) -> Result<T> {
        unbox(self.codec::<T>()?.decode(value)?)
    }

    /// Encodes `value` as compact JSON text.
    pub fn serialize<T: Wire>(&self, value: &T) -> Result<String> {
        json::to_string(&self.encode(value)?)
    }

    pub fn deserialize<T: Wire>(&self, text: &str) -> Result<T> {
        self.decode(&json::from_str(text)?)
    }

    pub fn write<T: Wire, W: io::Write>(&self, writer: W, value: &T) -> Result<()> {
        json::to_writer(writer, &self.encode(value)?)
    }

    /// Reads the whole stream, then decodes it.
    pub fn read<T: Wire, R: io::Read>(&self, reader: R) -> Result<T> {
        self.decode(&json::from_reader(reader)?)
    }

    /// Builds the smallest valid value of `T` without reading any input:
    /// zero scalars, empty containers, `None`, and the first case of every
    /// union.
    pub fn build_default<T: Wire>(&self) -> Result<T> {
        let ty = TypeRef::of::<T>();
        let value = default::build(self, ty, 0).map_err(|err| rewrap(ty.name(), err))?;
        unbox(value)
    }
}

/// One nesting level of a derivation. Dropping it without `close`, as when
/// a shape or scalar factory panics, unwinds the bookkeeping the same way a
/// failure does.
struct Level<'a> {
    registry: &'a Registry,
    state: &'a RefCell<Derivation>,
    closed: bool,
}

impl<'a> Level<'a> {
    fn enter(registry: &'a Registry, state: &'a RefCell<Derivation>, desc: &TypeDescriptor) -> Self {
        {
            let mut state = state.borrow_mut();
            state.depth += 1;
            state.inserted.push(desc.clone());
        }
        Level {
            registry,
            state,
            closed: false,
        }
    }

    fn close(mut self, desc: &TypeDescriptor, slot: Arc<Slot>, result: Result<Codec>) -> Result<Codec> {
        self.closed = true;
        let mut state = self.state.borrow_mut();
        state.depth -= 1;
        let outermost = state.depth == 0;
        match result {
            Ok(codec) => {
                state.ready.push((slot, codec.clone()));
                if outermost {
                    for (slot, codec) in state.ready.drain(..) {
                        // Only the lock holder fills slots.
                        let _ = slot.set(codec);
                    }
                    state.inserted.clear();
                    debug!("derived codec for {:?}", desc.ty);
                }
                Ok(codec)
            }
            Err(err) if !outermost => Err(err),
            Err(err) => {
                self.registry.abandon(&mut state);
                debug!("no codec for {:?}: {}", desc.ty, err);
                Err(rewrap(desc.ty.name(), err))
            }
        }
    }
}

impl Drop for Level<'_> {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        if let Ok(mut state) = self.state.try_borrow_mut() {
            state.depth -= 1;
            if state.depth == 0 {
                self.registry.abandon(&mut state);
                debug!("derivation unwound, cache entries dropped");
            }
        }
    }
}

/// A failure about a nested type is reported against the requested type.
fn rewrap(top: &'static str, err: Error) -> Error {
    match err.derivation_subject() {
        Some(subject) if subject != top => Error::Unsupported {
            ty: top,
            reason: err.to_string(),
        },
        _ => err,
    }
}

impl Default for Registry {
    fn default() -> Self {
        Registry::new()
    }
}

impl Debug for Registry {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter
            .debug_struct("Registry")
            .field("codecs", &self.slots.read().len())
            .finish()
    }
}

/// Configures the scalar table of a [`Registry`].
///
/// ```rust
/// use wirejson::json::Value;
/// use wirejson::{Error, Registry};
///
/// let registry = Registry::builder()
///     .scalar::<bool>(
///         |b| Ok(Value::string(if *b { "yes" } else { "no" })),
///         |j| match j.as_str() {
///             Some("yes") => Ok(true),
///             Some("no") | None => Ok(false),
///             Some(_) => Err(Error::decode_mismatch("bool", j, "expected yes or no")),
///         },
///     )
///     .build();
///
/// assert_eq!(registry.serialize(&true).unwrap(), r#""yes""#);
/// ```
pub struct RegistryBuilder {
    scalars: ScalarTable,
}

impl RegistryBuilder {
    /// Encodes `T` with the given functions, replacing any built-in codec.
    /// The type's shape is never consulted.
    pub fn scalar<T: Any>(
        mut self,
        encode: impl Fn(&T) -> Result<Value> + Send + Sync + 'static,
        decode: impl Fn(&Value) -> Result<T> + Send + Sync + 'static,
    ) -> Self {
        let codec = Codec::new(
            move |v| encode(downcast_ref::<T>(v)?),
            move |j| Ok(Box::new(decode(j)?) as Box<dyn Any>),
        );
        self.scalars.insert_factory::<T>(move |_| codec.clone());
        self
    }

    pub fn build(self) -> Registry {
        Registry {
            scalars: self.scalars,
            slots: RwLock::new(HashMap::new()),
            roots: RwLock::new(HashMap::new()),
            derivation: ReentrantMutex::new(RefCell::new(Derivation::default())),
        }
    }
}
