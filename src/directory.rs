//! Contacts and the static helpline directory.
//!
//! The contact list is plain data owned by the persisted
//! [`Profile`](crate::config::Profile); [`ContactBook`] wraps the two
//! mutations the app performs on it.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContactKind {
    #[serde(rename = "Police")]
    Police,
    #[serde(rename = "Trusted Contact")]
    Trusted,
    #[serde(rename = "Official Helpline")]
    Official,
    #[serde(rename = "Medical/Hospital")]
    Medical,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: String,
    pub name: String,
    pub phone: String,
    #[serde(rename = "type")]
    pub kind: ContactKind,
    pub is_whats_app: bool,
}

/// First-run contact list.
pub fn initial_contacts() -> Vec<Contact> {
    vec![
        Contact {
            id: "112-national".into(),
            name: "National Emergency".into(),
            phone: "112".into(),
            kind: ContactKind::Official,
            is_whats_app: false,
        },
        Contact {
            id: "100-police".into(),
            name: "PCR Cuttack".into(),
            phone: "100".into(),
            kind: ContactKind::Official,
            is_whats_app: false,
        },
    ]
}

/// Add/remove operations over a borrowed contact list.
pub struct ContactBook<'a> {
    contacts: &'a mut Vec<Contact>,
}

impl<'a> ContactBook<'a> {
    pub fn new(contacts: &'a mut Vec<Contact>) -> Self {
        Self { contacts }
    }

    /// Append a trusted WhatsApp contact.  Blank name or phone is ignored.
    /// Returns the new id.
    pub fn add(&mut self, name: &str, phone: &str, now_ms: u64) -> Option<String> {
        let (name, phone) = (name.trim(), phone.trim());
        if name.is_empty() || phone.is_empty() {
            return None;
        }
        let mut id = now_ms.to_string();
        // Two adds inside one millisecond would collide.
        while self.contacts.iter().any(|c| c.id == id) {
            id.push('_');
        }
        self.contacts.push(Contact {
            id: id.clone(),
            name: name.to_string(),
            phone: phone.to_string(),
            kind: ContactKind::Trusted,
            is_whats_app: true,
        });
        Some(id)
    }

    /// Remove by id.  Returns whether anything was removed.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.contacts.len();
        self.contacts.retain(|c| c.id != id);
        self.contacts.len() != before
    }

    /// Contacts reachable over WhatsApp (the ones that get the alert text).
    pub fn messaging_targets(&self) -> impl Iterator<Item = &Contact> {
        self.contacts.iter().filter(|c| c.is_whats_app)
    }
}

// ── Helpline directory ────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HelplineCategory {
    Women,
    General,
    Medical,
    Child,
    Cyber,
}

#[derive(Debug, Clone, Copy)]
pub struct Helpline {
    pub name: &'static str,
    pub number: &'static str,
    pub category: HelplineCategory,
    pub description: &'static str,
}

pub const HELPLINE_DIRECTORY: &[Helpline] = &[
    Helpline { name: "National Emergency", number: "112", category: HelplineCategory::General, description: "Police, Fire, and Medical (Unified)" },
    Helpline { name: "Women's Helpline", number: "1091", category: HelplineCategory::Women, description: "Safety and domestic help" },
    Helpline { name: "Women (Odisha)", number: "181", category: HelplineCategory::Women, description: "Odisha State Women helpline" },
    Helpline { name: "Childline", number: "1098", category: HelplineCategory::Child, description: "For children in distress" },
    Helpline { name: "Ambulance", number: "108", category: HelplineCategory::Medical, description: "Emergency medical transport" },
    Helpline { name: "Fire Department", number: "101", category: HelplineCategory::General, description: "Fire and rescue" },
    Helpline { name: "Senior Citizen", number: "14567", category: HelplineCategory::General, description: "Help for elders" },
    Helpline { name: "Cyber Crime", number: "1930", category: HelplineCategory::Cyber, description: "Report online fraud" },
    Helpline { name: "SCB Medical (Cuttack)", number: "06712305820", category: HelplineCategory::Medical, description: "Casualty department" },
];

/// Helplines for one tab of the UI shell's directory screen.
pub fn helplines_by_category(category: HelplineCategory) -> impl Iterator<Item = &'static Helpline> {
    HELPLINE_DIRECTORY.iter().filter(move |h| h.category == category)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_ignores_blank_input() {
        let mut list = initial_contacts();
        let mut book = ContactBook::new(&mut list);
        assert!(book.add("", "555", 1).is_none());
        assert!(book.add("Asha", "  ", 1).is_none());
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn add_then_remove() {
        let mut list = initial_contacts();
        let mut book = ContactBook::new(&mut list);
        let id = book.add("Asha", "+91 98765 43210", 1_700_000_000_000).unwrap();
        assert_eq!(book.messaging_targets().count(), 1);
        assert!(book.remove(&id));
        assert!(!book.remove(&id));
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn same_millisecond_adds_get_distinct_ids() {
        let mut list = Vec::new();
        let mut book = ContactBook::new(&mut list);
        let a = book.add("A", "1", 42).unwrap();
        let b = book.add("B", "2", 42).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn contact_wire_format() {
        let json = serde_json::to_string(&initial_contacts()[0]).unwrap();
        assert!(json.contains("\"type\":\"Official Helpline\""));
        assert!(json.contains("\"isWhatsApp\":false"));
    }

    #[test]
    fn medical_helplines() {
        let names: Vec<_> = helplines_by_category(HelplineCategory::Medical)
            .map(|h| h.number)
            .collect();
        assert_eq!(names, ["108", "06712305820"]);
    }
}
