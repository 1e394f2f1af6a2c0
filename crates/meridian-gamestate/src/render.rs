use std::fmt;
use std::rc::Rc;

use crate::entity::EntityState;

/// Per-entity binding through which an entity exposes its state to a
/// presentation layer.
pub trait RenderConnector {
    /// Receive the entity's current state.
    fn update(&mut self, entity: &EntityState);
}

/// Capability that builds a connector for each entity.
///
/// Supplied by a presentation layer; the universe never depends on a
/// concrete renderer.
pub trait RenderFactory {
    /// Human-readable name for logs.
    fn name(&self) -> &str;

    /// Build a connector for `entity`.
    fn connector(&self, entity: &EntityState) -> Box<dyn RenderConnector>;
}

/// The universe's current presentation binding.
#[derive(Clone, Default)]
pub enum RenderAttachment {
    /// No presentation: entities simulate but present nothing.
    #[default]
    Headless,
    /// Connectors are built by this factory.
    Factory(Rc<dyn RenderFactory>),
}

impl fmt::Debug for RenderAttachment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Headless => write!(f, "Headless"),
            Self::Factory(factory) => f.debug_tuple("Factory").field(&factory.name()).finish(),
        }
    }
}

impl RenderAttachment {
    /// Attach `factory`.
    pub fn factory(factory: Rc<dyn RenderFactory>) -> Self {
        Self::Factory(factory)
    }

    /// Whether both sides refer to the same factory instance (or are both headless).
    pub fn same_as(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Headless, Self::Headless) => true,
            (Self::Factory(a), Self::Factory(b)) => std::ptr::addr_eq(Rc::as_ptr(a), Rc::as_ptr(b)),
            _ => false,
        }
    }

    /// Whether no factory is attached.
    pub fn is_headless(&self) -> bool {
        matches!(self, Self::Headless)
    }

    /// Name of the attached factory.
    pub fn factory_name(&self) -> Option<&str> {
        match self {
            Self::Headless => None,
            Self::Factory(factory) => Some(factory.name()),
        }
    }

    pub(crate) fn build(&self, entity: &EntityState) -> Option<Box<dyn RenderConnector>> {
        match self {
            Self::Headless => None,
            Self::Factory(factory) => Some(factory.connector(entity)),
        }
    }
}

impl From<Option<Rc<dyn RenderFactory>>> for RenderAttachment {
    fn from(factory: Option<Rc<dyn RenderFactory>>) -> Self {
        factory.map_or(Self::Headless, Self::Factory)
    }
}
