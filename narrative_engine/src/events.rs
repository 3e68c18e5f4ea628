//! Typed story events and the publish/subscribe channel.
//!
//! Every signal the core emits is a variant of [`StoryEvent`]. Components
//! own an [`EventBus`] by composition rather than inheriting emitter
//! behavior; external layers subscribe and receive each event after the
//! state change it describes has been committed.

use serde::Serialize;
use serde_json::Value;

use story_rules::{
    ChapterId, CharacterId, CinematicId, DecisionKind, EndingPath, FlagValue, MissionId,
    ObjectiveId, SceneKind,
};

/// The typed event union for the narrative core.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum StoryEvent {
    FlagChanged {
        key: String,
        previous: Option<FlagValue>,
        value: FlagValue,
    },
    RelationshipChanged {
        character: CharacterId,
        previous: f32,
        value: f32,
    },
    DecisionMade {
        key: String,
        choice: String,
        kind: Option<DecisionKind>,
    },
    EndingPathChanged {
        previous: EndingPath,
        value: EndingPath,
    },
    ResearchAdvanced {
        previous: f32,
        value: f32,
    },
    SeverityChanged {
        previous: f32,
        value: f32,
    },
    StabilizationChanged {
        previous: f32,
        value: f32,
    },
    MainProgressAdvanced {
        previous: f32,
        value: f32,
    },
    TimeAdded {
        previous: f64,
        value: f64,
    },
    TimeConsumed {
        previous: f64,
        value: f64,
    },
    FacilityUnlocked {
        facility: String,
    },
    LoreDiscovered {
        key: String,
        research_value: f32,
    },
    EvidenceCollected {
        key: String,
        research_value: f32,
    },
    LocationChanged {
        location: String,
    },
    ItemCollected {
        item: String,
    },
    ChapterCompleted {
        chapter: ChapterId,
        next: ChapterId,
    },
    QuestUpdated {
        quest: String,
    },
    /// A one-time keyed narrative trigger fired.
    StoryTriggered {
        key: String,
        data: Option<Value>,
    },
    /// A registered condition watcher fired.
    WatcherFired {
        watcher: u64,
    },

    // ----- mission tracker -------------------------------------------------
    MissionStarted {
        mission: MissionId,
    },
    ObjectiveCompleted {
        mission: MissionId,
        objective: ObjectiveId,
        progress: u8,
    },
    /// All objectives done on a mission that does not auto-complete.
    AllObjectivesCompleted {
        mission: MissionId,
    },
    MissionCompleted {
        mission: MissionId,
    },
    MissionFailed {
        mission: MissionId,
    },
    MissionTimerUpdated {
        mission: MissionId,
        remaining_seconds: u64,
    },
    ClueDiscovered {
        mission: MissionId,
        clue: String,
    },

    // ----- cinematic sequencer ---------------------------------------------
    CinematicStarted {
        cinematic: CinematicId,
    },
    SceneStarted {
        cinematic: CinematicId,
        index: usize,
        kind: SceneKind,
    },
    DecisionPointReached {
        cinematic: CinematicId,
        key: String,
        prompt: String,
    },
    DecisionResolved {
        cinematic: CinematicId,
        key: String,
        choice: String,
    },
    CinematicFinished {
        cinematic: CinematicId,
        skipped: bool,
    },
}

/// Subscription handle returned by [`EventBus::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// A publish/subscribe channel for [`StoryEvent`]s.
///
/// Handlers run in registration order. `subscribe` hands back an id that
/// `unsubscribe` accepts, so observers manage their own lifetimes.
#[derive(Default)]
pub struct EventBus {
    next_id: u64,
    subscribers: Vec<(SubscriptionId, Box<dyn FnMut(&StoryEvent)>)>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for every published event.
    pub fn subscribe(&mut self, handler: impl FnMut(&StoryEvent) + 'static) -> SubscriptionId {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.subscribers.push((id, Box::new(handler)));
        id
    }

    /// Remove a handler. Returns `false` if the id is unknown.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sub_id, _)| *sub_id != id);
        self.subscribers.len() != before
    }

    /// Deliver an event to every subscriber in registration order.
    pub fn publish(&mut self, event: &StoryEvent) {
        for (_, handler) in &mut self.subscribers {
            handler(event);
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_subscribe_and_publish() {
        let mut bus = EventBus::new();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let sink = Rc::clone(&seen);
        bus.subscribe(move |event| {
            if let StoryEvent::ItemCollected { item } = event {
                sink.borrow_mut().push(item.clone());
            }
        });

        bus.publish(&StoryEvent::ItemCollected {
            item: "virophage_sample".to_string(),
        });

        assert_eq!(seen.borrow().as_slice(), ["virophage_sample"]);
    }

    #[test]
    fn test_unsubscribe_stops_delivery() {
        let mut bus = EventBus::new();
        let count = Rc::new(RefCell::new(0));

        let sink = Rc::clone(&count);
        let id = bus.subscribe(move |_| *sink.borrow_mut() += 1);

        bus.publish(&StoryEvent::ItemCollected {
            item: "x".to_string(),
        });
        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        bus.publish(&StoryEvent::ItemCollected {
            item: "y".to_string(),
        });

        assert_eq!(*count.borrow(), 1);
    }

    #[test]
    fn test_delivery_order_follows_registration() {
        let mut bus = EventBus::new();
        let order = Rc::new(RefCell::new(Vec::new()));

        for tag in ["first", "second", "third"] {
            let sink = Rc::clone(&order);
            bus.subscribe(move |_| sink.borrow_mut().push(tag));
        }

        bus.publish(&StoryEvent::ItemCollected {
            item: "x".to_string(),
        });
        assert_eq!(order.borrow().as_slice(), ["first", "second", "third"]);
    }
}
