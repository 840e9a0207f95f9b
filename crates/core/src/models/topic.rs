//! Thesis/practicum topics and their slot reservations

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{TopicId, UserId};
use crate::reconcile::Keyed;

/// Who published a topic
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicCreator {
    pub name: String,
    pub role: String,
    pub career: Option<String>,
}

/// An active slot reservation held by one student
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reservation {
    pub student_id: UserId,
    pub name: String,
    pub email: String,
    pub career: Option<String>,
    pub reserved_at: Option<DateTime<Utc>>,
}

/// A topic offered to students
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Topic {
    pub id: TopicId,
    pub title: String,
    pub career: String,
    pub description: String,
    pub requirements: Vec<String>,
    pub total_slots: u32,
    pub available_slots: u32,
    /// The student the list was fetched for already holds a slot here
    pub has_own_slot: bool,
    pub created_by: Option<UserId>,
    pub creator: Option<TopicCreator>,
    pub teacher_in_charge: Option<TopicCreator>,
    pub responsible_teacher: Option<UserId>,
    pub created_at: Option<DateTime<Utc>>,
    /// `None` when the server did not disclose the reservation list
    pub reservations: Option<Vec<Reservation>>,
}

/// Display state of a topic for one student
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopicAvailability {
    Reserved,
    NoSlots,
    Reserving,
    Available,
}

impl Topic {
    /// Person shown as the topic's guide
    pub fn guide(&self) -> Option<&TopicCreator> {
        self.teacher_in_charge.as_ref().or(self.creator.as_ref())
    }

    /// Re-derive `available_slots` from the reservation list when it is known
    pub fn recompute_slots(&mut self) {
        if let Some(reservations) = &self.reservations {
            let taken = u32::try_from(reservations.len()).unwrap_or(u32::MAX);
            self.available_slots = self.total_slots.saturating_sub(taken);
        }
    }

    /// Whether `student` holds one of this topic's slots
    pub fn is_reserved_by(&self, student: UserId) -> bool {
        match &self.reservations {
            Some(list) => list.iter().any(|r| r.student_id == student),
            None => self.has_own_slot,
        }
    }

    /// A student may request a topic while slots remain and they hold none
    pub fn can_request(&self, student: UserId) -> bool {
        self.available_slots > 0 && !self.is_reserved_by(student)
    }

    /// Companions a slot holder may bring along
    pub fn max_companions(&self) -> usize {
        self.total_slots.saturating_sub(1) as usize
    }

    /// Whether the companion dialog applies to `student`
    pub fn can_manage_companions(&self, student: UserId) -> bool {
        self.is_reserved_by(student) && self.total_slots > 1
    }

    /// Reservation emails other than `own_email`, trimmed, blanks dropped
    pub fn companion_emails(&self, own_email: Option<&str>) -> Vec<String> {
        let Some(list) = &self.reservations else {
            return Vec::new();
        };
        list.iter()
            .map(|r| r.email.trim())
            .filter(|email| !email.is_empty())
            .filter(|email| own_email.map_or(true, |own| !email.eq_ignore_ascii_case(own)))
            .map(String::from)
            .collect()
    }

    pub fn availability(&self, student: UserId, reserving: Option<TopicId>) -> TopicAvailability {
        if self.is_reserved_by(student) {
            TopicAvailability::Reserved
        } else if self.available_slots == 0 {
            TopicAvailability::NoSlots
        } else if reserving == Some(self.id) {
            TopicAvailability::Reserving
        } else {
            TopicAvailability::Available
        }
    }
}

impl Keyed for Topic {
    type Key = TopicId;

    fn key(&self) -> TopicId {
        self.id
    }
}

/// Payload for publishing a topic
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTopic {
    pub title: String,
    pub career: String,
    pub description: String,
    pub requirements: Vec<String>,
    pub total_slots: u32,
    pub created_by: Option<UserId>,
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn reservation(student: i64) -> Reservation {
        Reservation {
            student_id: UserId(student),
            name: format!("student {student}"),
            email: format!("s{student}@utem.cl"),
            career: None,
            reserved_at: None,
        }
    }

    pub fn topic(id: i64, total: u32, holders: &[i64]) -> Topic {
        let mut topic = Topic {
            id: TopicId(id),
            title: format!("Topic {id}"),
            career: "Informática".to_string(),
            description: String::new(),
            requirements: Vec::new(),
            total_slots: total,
            available_slots: total,
            has_own_slot: false,
            created_by: None,
            creator: None,
            teacher_in_charge: None,
            responsible_teacher: None,
            created_at: None,
            reservations: Some(holders.iter().copied().map(reservation).collect()),
        };
        topic.recompute_slots();
        topic
    }
}
