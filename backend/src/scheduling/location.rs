use std::collections::HashMap;

use rand::seq::SliceRandom;
use rand::Rng;
use rendezvous_shared::Intent;

/// Fixed venue lists for in-person intents
#[derive(Debug, Clone)]
pub struct VenueCatalog {
    venues: HashMap<Intent, Vec<String>>,
}

impl VenueCatalog {
    pub fn new(venues: HashMap<Intent, Vec<String>>) -> Self {
        Self { venues }
    }

    pub fn builtin() -> Self {
        let list = |names: &[&str]| names.iter().map(|n| n.to_string()).collect::<Vec<_>>();

        let mut venues = HashMap::new();
        venues.insert(
            Intent::Coffee,
            list(&["Blue Bottle Coffee", "Starbucks Reserve", "Local Roasters"]),
        );
        venues.insert(
            Intent::Lunch,
            list(&["Sweetgreen", "The Corner Bistro", "Dim Sum Palace"]),
        );
        venues.insert(
            Intent::Dinner,
            list(&["Trattoria Roma", "The Oyster Bar", "Sakura Izakaya"]),
        );
        Self::new(venues)
    }

    pub fn venues(&self, intent: Intent) -> &[String] {
        self.venues.get(&intent).map(Vec::as_slice).unwrap_or_default()
    }

    /// Pick a venue for `intent`. `None` for intents without venues.
    pub fn suggest<R: Rng + ?Sized>(&self, intent: Intent, rng: &mut R) -> Option<String> {
        self.venues(intent).choose(rng).cloned()
    }
}

impl Default for VenueCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}
