//! A text "renderer" that records what each entity last presented.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use meridian_data::TilePos;
use meridian_gamestate::{EntityId, EntityState, RenderConnector, RenderFactory};

/// Where an entity was last presented, and how many times it was.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub position: TilePos,
    pub frames: u64,
}

type Frames = Rc<RefCell<BTreeMap<EntityId, Frame>>>;

#[derive(Default)]
pub struct TextRenderer {
    frames: Frames,
}

impl TextRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Presented frames per entity, including entities that have since died.
    pub fn frames(&self) -> BTreeMap<EntityId, Frame> {
        self.frames.borrow().clone()
    }
}

impl RenderFactory for TextRenderer {
    fn name(&self) -> &str {
        "text"
    }

    fn connector(&self, entity: &EntityState) -> Box<dyn RenderConnector> {
        tracing::trace!(entity = %entity.id, "text connector created");
        Box::new(TextConnector {
            frames: Rc::clone(&self.frames),
        })
    }
}

struct TextConnector {
    frames: Frames,
}

impl RenderConnector for TextConnector {
    fn update(&mut self, entity: &EntityState) {
        let mut frames = self.frames.borrow_mut();
        let frame = frames.entry(entity.id).or_insert(Frame {
            position: entity.position,
            frames: 0,
        });
        frame.position = entity.position;
        frame.frames += 1;
    }
}
