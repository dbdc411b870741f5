use rendezvous_shared::{EventTemplate, EventType, Intent, TimeWindow, TravelBuffer};

/// Built-in meeting templates, one per intent
#[derive(Debug, Clone)]
pub struct TemplateCatalog {
    templates: Vec<EventTemplate>,
}

impl TemplateCatalog {
    pub fn new(templates: Vec<EventTemplate>) -> Self {
        Self { templates }
    }

    pub fn builtin() -> Self {
        let buffer = |before_minutes, after_minutes| TravelBuffer {
            before_minutes,
            after_minutes,
        };

        Self::new(vec![
            EventTemplate {
                id: "coffee-chat".to_string(),
                name: "Coffee chat".to_string(),
                duration: 30,
                event_type: EventType::InPerson,
                intent: Intent::Coffee,
                preferred_time_window: TimeWindow::from_hm((7, 30), (10, 30)),
                travel_buffer: Some(buffer(15, 15)),
                allow_weekends: false,
            },
            EventTemplate {
                id: "lunch".to_string(),
                name: "Lunch".to_string(),
                duration: 60,
                event_type: EventType::InPerson,
                intent: Intent::Lunch,
                preferred_time_window: TimeWindow::from_hm((11, 0), (14, 0)),
                travel_buffer: Some(buffer(15, 15)),
                allow_weekends: false,
            },
            EventTemplate {
                id: "dinner".to_string(),
                name: "Dinner".to_string(),
                duration: 90,
                event_type: EventType::InPerson,
                intent: Intent::Dinner,
                preferred_time_window: TimeWindow::from_hm((18, 0), (21, 0)),
                travel_buffer: Some(buffer(30, 30)),
                allow_weekends: true,
            },
            EventTemplate {
                id: "quick-call".to_string(),
                name: "Quick call".to_string(),
                duration: 15,
                event_type: EventType::Video,
                intent: Intent::QuickCall,
                preferred_time_window: None,
                travel_buffer: None,
                allow_weekends: false,
            },
        ])
    }

    pub fn all(&self) -> &[EventTemplate] {
        &self.templates
    }

    pub fn get(&self, id: &str) -> Option<&EventTemplate> {
        self.templates.iter().find(|t| t.id == id)
    }

    /// The first template registered for `intent`
    pub fn for_intent(&self, intent: Intent) -> Option<&EventTemplate> {
        self.templates.iter().find(|t| t.intent == intent)
    }
}

impl Default for TemplateCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}
