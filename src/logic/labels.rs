//! Attack class registry
//!
//! Static mapping from model class id to display name, description and
//! recommended action, plus the inverse name -> id map used by the
//! accuracy path. Lookups are total: an id the model emits that the
//! registry has never heard of resolves to the "Unknown" placeholder
//! instead of failing.

/// Name shown for class ids outside the registry
pub const UNKNOWN_CLASS: &str = "Unknown";

/// One attack class the classifier was trained on
#[derive(Debug, Clone)]
pub struct AttackClass {
    pub id: i64,
    pub name: &'static str,
    pub description: &'static str,
    pub recommendation: &'static str,
}

/// Result of a registry lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedLabel {
    pub name: &'static str,
    pub description: &'static str,
    pub recommendation: &'static str,
}

/// Read-only class table, built once at startup and shared by reference
#[derive(Debug, Clone)]
pub struct LabelRegistry {
    classes: Vec<AttackClass>,
}

impl LabelRegistry {
    /// Registry matching the classes the bundled model was trained on
    pub fn builtin() -> Self {
        Self {
            classes: vec![
                AttackClass {
                    id: 0,
                    name: "Benign Traffic",
                    description: "Normal, harmless network traffic.",
                    recommendation: "No action needed.",
                },
                AttackClass {
                    id: 1,
                    name: "DoS Flood",
                    description: "Denial of Service attack using flooding.",
                    recommendation: "Check for abnormal traffic and block offending IPs.",
                },
                AttackClass {
                    id: 2,
                    name: "DDoS Flood",
                    description: "Distributed Denial of Service attack using flooding.",
                    recommendation: "Use DDoS mitigation services and rate limiting.",
                },
                AttackClass {
                    id: 3,
                    name: "Recon Flood",
                    description: "Reconnaissance activity using flooding.",
                    recommendation: "Monitor for scanning activity and block suspicious sources.",
                },
                AttackClass {
                    id: 4,
                    name: "MQTT Flood",
                    description: "Flooding attack targeting MQTT protocol.",
                    recommendation: "Secure MQTT brokers and monitor for unusual activity.",
                },
            ],
        }
    }

    /// Total lookup: every id has an answer, unknown ids included
    pub fn resolve(&self, id: i64) -> ResolvedLabel {
        self.classes
            .iter()
            .find(|c| c.id == id)
            .map(|c| ResolvedLabel {
                name: c.name,
                description: c.description,
                recommendation: c.recommendation,
            })
            .unwrap_or(ResolvedLabel {
                name: UNKNOWN_CLASS,
                description: "",
                recommendation: "",
            })
    }

    /// Inverse map: ground-truth display name -> class id.
    /// `None` marks an unresolvable name, which never equals any
    /// predicted id.
    pub fn id_of(&self, name: &str) -> Option<i64> {
        self.classes.iter().find(|c| c.name == name).map(|c| c.id)
    }

    /// Number of known classes
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}
