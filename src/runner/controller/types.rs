//! Controller definitions.

use std::any::Any;
use std::fmt;
use std::rc::Rc;

use crate::runner::options::Options;

/// A constructed controller. Downcast with `instance.downcast_ref::<T>()`.
pub type Instance = Rc<dyn Any>;

type ConstructFn = dyn Fn(Options) -> anyhow::Result<Instance>;
type BeforeStartFn = dyn Fn(&Options, &Constructor) -> anyhow::Result<Option<Options>>;
type AfterStartFn = dyn Fn(&Instance) -> anyhow::Result<()>;

/// The constructible capability of a controller.
///
/// Cloning is cheap and clones compare equal with [`Constructor::ptr_eq`].
#[derive(Clone)]
pub struct Constructor {
    f: Rc<ConstructFn>,
}

impl Constructor {
    /// Wrap a typed constructor.
    pub fn new<T, F>(f: F) -> Self
    where
        T: Any,
        F: Fn(Options) -> anyhow::Result<T> + 'static,
    {
        Constructor {
            f: Rc::new(move |options| f(options).map(|ctrl| Rc::new(ctrl) as Instance)),
        }
    }

    /// Wrap a constructor that already produces type-erased instances.
    pub fn from_instance_fn(f: impl Fn(Options) -> anyhow::Result<Instance> + 'static) -> Self {
        Constructor { f: Rc::new(f) }
    }

    /// Build one controller instance.
    pub fn construct(&self, options: Options) -> anyhow::Result<Instance> {
        (self.f)(options)
    }

    pub fn ptr_eq(&self, other: &Constructor) -> bool {
        Rc::ptr_eq(&self.f, &other.f)
    }
}

impl fmt::Debug for Constructor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Constructor({:p})", Rc::as_ptr(&self.f) as *const ())
    }
}

/// Hook run before instantiation.
///
/// Receives the merged options and the constructor. Returning `Some(options)`
/// replaces the options handed to the constructor; `None` keeps them.
#[derive(Clone)]
pub struct BeforeStart {
    f: Rc<BeforeStartFn>,
}

impl BeforeStart {
    pub fn new(f: impl Fn(&Options, &Constructor) -> anyhow::Result<Option<Options>> + 'static) -> Self {
        BeforeStart { f: Rc::new(f) }
    }

    pub fn call(&self, options: &Options, ctor: &Constructor) -> anyhow::Result<Option<Options>> {
        (self.f)(options, ctor)
    }

    pub fn ptr_eq(&self, other: &BeforeStart) -> bool {
        Rc::ptr_eq(&self.f, &other.f)
    }
}

impl fmt::Debug for BeforeStart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BeforeStart({:p})", Rc::as_ptr(&self.f) as *const ())
    }
}

/// Hook run after instantiation. Its result never replaces the instance.
#[derive(Clone)]
pub struct AfterStart {
    f: Rc<AfterStartFn>,
}

impl AfterStart {
    pub fn new(f: impl Fn(&Instance) -> anyhow::Result<()> + 'static) -> Self {
        AfterStart { f: Rc::new(f) }
    }

    pub fn call(&self, instance: &Instance) -> anyhow::Result<()> {
        (self.f)(instance)
    }

    pub fn ptr_eq(&self, other: &AfterStart) -> bool {
        Rc::ptr_eq(&self.f, &other.f)
    }
}

impl fmt::Debug for AfterStart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AfterStart({:p})", Rc::as_ptr(&self.f) as *const ())
    }
}

/// A constructor bundled with static options and lifecycle hooks.
#[derive(Debug, Clone)]
pub struct CompositeDefinition {
    pub ctor: Constructor,
    pub options: Option<Options>,
    pub before_start: Option<BeforeStart>,
    pub after_start: Option<AfterStart>,
}

impl CompositeDefinition {
    pub fn new(ctor: Constructor) -> Self {
        CompositeDefinition {
            ctor,
            options: None,
            before_start: None,
            after_start: None,
        }
    }

    /// Static options merged over the base options and the element.
    pub fn with_options(mut self, options: Options) -> Self {
        self.options = Some(options);
        self
    }

    pub fn with_before_start(
        mut self,
        hook: impl Fn(&Options, &Constructor) -> anyhow::Result<Option<Options>> + 'static,
    ) -> Self {
        self.before_start = Some(BeforeStart::new(hook));
        self
    }

    pub fn with_after_start(mut self, hook: impl Fn(&Instance) -> anyhow::Result<()> + 'static) -> Self {
        self.after_start = Some(AfterStart::new(hook));
        self
    }
}

/// What a controller name resolves to.
#[derive(Debug, Clone)]
pub enum ControllerDefinition {
    /// Only a constructor.
    Bare(Constructor),
    /// A constructor with options and hooks.
    Composite(CompositeDefinition),
}

impl ControllerDefinition {
    pub fn ctor(&self) -> &Constructor {
        match self {
            ControllerDefinition::Bare(ctor) => ctor,
            ControllerDefinition::Composite(def) => &def.ctor,
        }
    }

    pub fn options(&self) -> Option<&Options> {
        match self {
            ControllerDefinition::Bare(_) => None,
            ControllerDefinition::Composite(def) => def.options.as_ref(),
        }
    }

    pub fn before_start(&self) -> Option<&BeforeStart> {
        match self {
            ControllerDefinition::Bare(_) => None,
            ControllerDefinition::Composite(def) => def.before_start.as_ref(),
        }
    }

    pub fn after_start(&self) -> Option<&AfterStart> {
        match self {
            ControllerDefinition::Bare(_) => None,
            ControllerDefinition::Composite(def) => def.after_start.as_ref(),
        }
    }
}

impl PartialEq for ControllerDefinition {
    fn eq(&self, other: &Self) -> bool {
        fn same<T>(a: Option<&T>, b: Option<&T>, eq: impl Fn(&T, &T) -> bool) -> bool {
            match (a, b) {
                (None, None) => true,
                (Some(a), Some(b)) => eq(a, b),
                _ => false,
            }
        }
        match (self, other) {
            (ControllerDefinition::Bare(a), ControllerDefinition::Bare(b)) => a.ptr_eq(b),
            (ControllerDefinition::Composite(a), ControllerDefinition::Composite(b)) => {
                a.ctor.ptr_eq(&b.ctor)
                    && a.options == b.options
                    && same(a.before_start.as_ref(), b.before_start.as_ref(), BeforeStart::ptr_eq)
                    && same(a.after_start.as_ref(), b.after_start.as_ref(), AfterStart::ptr_eq)
            }
            _ => false,
        }
    }
}

impl From<Constructor> for ControllerDefinition {
    fn from(ctor: Constructor) -> Self {
        ControllerDefinition::Bare(ctor)
    }
}

impl From<CompositeDefinition> for ControllerDefinition {
    fn from(def: CompositeDefinition) -> Self {
        ControllerDefinition::Composite(def)
    }
}
